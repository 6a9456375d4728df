//! Tests for the get and config subcommands.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_get_defaults() {
    match parse(&["splitfetch", "get", "https://example.com/file.iso"]) {
        CliCommand::Get {
            url,
            dest,
            parts,
            retries,
            timeout,
            headers,
        } => {
            assert_eq!(url, "https://example.com/file.iso");
            assert!(dest.is_none());
            assert!(parts.is_none());
            assert!(retries.is_none());
            assert!(timeout.is_none());
            assert!(headers.is_empty());
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_get_all_flags() {
    match parse(&[
        "splitfetch",
        "get",
        "https://example.com/x",
        "--dest",
        "/tmp",
        "-n",
        "8",
        "--retries",
        "5",
        "--timeout",
        "60",
        "-H",
        "Authorization: Bearer abc",
        "--header",
        "X-Trace:1",
    ]) {
        CliCommand::Get {
            url,
            dest,
            parts,
            retries,
            timeout,
            headers,
        } => {
            assert_eq!(url, "https://example.com/x");
            assert_eq!(dest.as_deref(), Some(std::path::Path::new("/tmp")));
            assert_eq!(parts, Some(8));
            assert_eq!(retries, Some(5));
            assert_eq!(timeout, Some(60));
            assert_eq!(
                headers,
                vec![
                    ("Authorization".to_string(), "Bearer abc".to_string()),
                    ("X-Trace".to_string(), "1".to_string()),
                ]
            );
        }
        _ => panic!("expected Get with flags"),
    }
}

#[test]
fn cli_rejects_malformed_header() {
    assert!(Cli::try_parse_from(["splitfetch", "get", "https://e.com/x", "-H", "no-colon"]).is_err());
    assert!(Cli::try_parse_from(["splitfetch", "get", "https://e.com/x", "-H", ": v"]).is_err());
}

#[test]
fn cli_rejects_non_numeric_parts() {
    assert!(Cli::try_parse_from(["splitfetch", "get", "https://e.com/x", "--parts", "many"]).is_err());
}

#[test]
fn cli_parse_config() {
    assert!(matches!(parse(&["splitfetch", "config"]), CliCommand::Config));
}

#[test]
fn cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["splitfetch"]).is_err());
}
