//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a single static body for every path. Responds to HEAD with
//! Content-Length (and optional naming headers) and to ranged GETs with
//! 206 Partial Content. Knobs simulate broken or slow servers.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RangeServerOptions {
    /// Status code returned for HEAD.
    pub head_status: u16,
    /// If false, HEAD omits Content-Length.
    pub send_content_length: bool,
    pub content_type: Option<&'static str>,
    pub content_disposition: Option<&'static str>,
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub support_ranges: bool,
    /// GETs whose range starts at one of these offsets always get HTTP 500.
    pub fail_range_starts: Vec<u64>,
    /// The first N GETs (across all parts) get HTTP 503.
    pub transient_failures: usize,
    /// Sleep before answering a GET.
    pub get_delay: Option<Duration>,
    /// Ranged responses carry this many bytes fewer than requested (with a
    /// matching Content-Length and Content-Range).
    pub short_by: u64,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            head_status: 200,
            send_content_length: true,
            content_type: None,
            content_disposition: None,
            support_ranges: true,
            fail_range_starts: Vec::new(),
            transient_failures: 0,
            get_delay: None,
            short_by: 0,
        }
    }
}

/// Handle to a running server. The server lives until the process exits.
pub struct RangeServer {
    base: String,
    gets: Arc<AtomicUsize>,
}

impl RangeServer {
    /// URL for `path` on this server (e.g. `url("report.pdf")`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    /// Number of GET requests received so far.
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `body` with default options.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

/// Like `start` but allows customizing server behavior.
pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let opts = Arc::new(opts);
    let gets = Arc::new(AtomicUsize::new(0));
    let gets_srv = Arc::clone(&gets);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let opts = Arc::clone(&opts);
            let gets = Arc::clone(&gets_srv);
            thread::spawn(move || handle(stream, &body, &opts, &gets));
        }
    });
    RangeServer {
        base: format!("http://127.0.0.1:{}/", port),
        gets,
    }
}

/// Returns a URL on a port nothing listens on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/file.bin", port)
}

fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    String::from_utf8(buf).ok()
}

fn handle(mut stream: TcpStream, body: &[u8], opts: &RangeServerOptions, gets: &AtomicUsize) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let request = match read_request(&mut stream) {
        Some(r) => r,
        None => return,
    };
    let (method, range) = parse_request(&request);
    let total = body.len() as u64;

    if method.eq_ignore_ascii_case("HEAD") {
        let mut response = format!("HTTP/1.1 {} {}\r\n", opts.head_status, reason(opts.head_status));
        if opts.send_content_length {
            response.push_str(&format!("Content-Length: {}\r\n", total));
        }
        if opts.support_ranges {
            response.push_str("Accept-Ranges: bytes\r\n");
        }
        push_naming_headers(&mut response, opts);
        response.push_str("Connection: close\r\n\r\n");
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if method.eq_ignore_ascii_case("GET") {
        let seen = gets.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = opts.get_delay {
            thread::sleep(delay);
        }
        if seen < opts.transient_failures {
            write_empty(&mut stream, 503);
            return;
        }
        if let Some((start, _)) = range {
            if opts.fail_range_starts.contains(&start) {
                write_empty(&mut stream, 500);
                return;
            }
        }

        let (status, content_range, slice) = match range {
            Some((start, end_incl)) if opts.support_ranges => {
                let end_incl = end_incl.min(total.saturating_sub(1));
                if start > end_incl || start >= total {
                    write_empty(&mut stream, 416);
                    return;
                }
                let end_incl = end_incl.saturating_sub(opts.short_by).max(start);
                (
                    206,
                    Some(format!("bytes {}-{}/{}", start, end_incl, total)),
                    &body[start as usize..=end_incl as usize],
                )
            }
            _ => (200, None, body),
        };

        let mut response = format!(
            "HTTP/1.1 {} {}\r\nContent-Length: {}\r\n",
            status,
            reason(status),
            slice.len()
        );
        if let Some(cr) = content_range {
            response.push_str(&format!("Content-Range: {}\r\n", cr));
        }
        push_naming_headers(&mut response, opts);
        response.push_str("Connection: close\r\n\r\n");
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(slice);
        return;
    }

    write_empty(&mut stream, 405);
}

fn push_naming_headers(response: &mut String, opts: &RangeServerOptions) {
    if let Some(ct) = opts.content_type {
        response.push_str(&format!("Content-Type: {}\r\n", ct));
    }
    if let Some(cd) = opts.content_disposition {
        response.push_str(&format!("Content-Disposition: {}\r\n", cd));
    }
}

fn write_empty(stream: &mut TcpStream, status: u16) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        status,
        reason(status)
    );
    let _ = stream.write_all(response.as_bytes());
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        206 => "Partial Content",
        404 => "Not Found",
        405 => "Method Not Allowed",
        416 => "Range Not Satisfiable",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Returns (method, optional (start, end_inclusive) for Range: bytes=X-Y).
fn parse_request(request: &str) -> (&str, Option<(u64, u64)>) {
    let mut method = "";
    let mut range = None;
    for line in request.lines() {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if method.is_empty() {
            method = line.split_whitespace().next().unwrap_or("");
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                let value = value.trim();
                if let Some(spec) = value.strip_prefix("bytes=") {
                    if let Some((a, b)) = spec.split_once('-') {
                        let start = a.trim().parse::<u64>().unwrap_or(0);
                        let end_incl = b.trim().parse::<u64>().unwrap_or(u64::MAX);
                        range = Some((start, end_incl));
                    }
                }
            }
        }
    }
    (method, range)
}
