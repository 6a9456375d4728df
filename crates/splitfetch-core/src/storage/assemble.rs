//! Concatenation of part artifacts into the final output file.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::{ASSEMBLY_PREFIX, TEMP_SUFFIX};
use crate::error::DownloadError;
#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// Temp output file in the destination directory. Bytes are appended with
/// [`append_from`](Self::append_from) and the file only appears under its
/// final name after [`finalize`](Self::finalize). Dropping it unfinalized
/// removes the temp file.
pub struct AssemblyWriter {
    file: NamedTempFile,
    written: u64,
}

impl AssemblyWriter {
    /// Creates a hidden temp file next to `final_path`
    /// (e.g. `.splitfetch-XXXXXX.part`). The prefix is fixed so the temp name
    /// stays short however long the final name is.
    pub fn create_for(final_path: &Path) -> io::Result<Self> {
        let dir = final_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file = tempfile::Builder::new()
            .prefix(ASSEMBLY_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)?;
        Ok(Self { file, written: 0 })
    }

    /// Preallocate `size` bytes. On Unix tries `posix_fallocate` for real block
    /// allocation; falls back to `set_len` on failure or non-Unix.
    pub fn preallocate(&mut self, size: u64) -> io::Result<()> {
        #[cfg(unix)]
        {
            let fd = self.file.as_file().as_raw_fd();
            let r = unsafe { libc::posix_fallocate(fd, 0, size as libc::off_t) };
            if r == 0 {
                return Ok(());
            }
            tracing::debug!(errno = r, "posix_fallocate failed, falling back to set_len");
        }
        self.file.as_file().set_len(size)
    }

    /// Appends the whole content of the file at `path`.
    pub fn append_from(&mut self, path: &Path) -> io::Result<u64> {
        let mut reader = BufReader::new(File::open(path)?);
        let n = io::copy(&mut reader, self.file.as_file_mut())?;
        self.written += n;
        Ok(n)
    }

    /// Bytes appended so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Syncs and atomically renames the temp file to `final_path`, replacing
    /// any existing file there.
    pub fn finalize(self, final_path: &Path) -> io::Result<()> {
        self.file.as_file().sync_all()?;
        self.file.persist(final_path).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Concatenates `parts` (already in index order) into `final_path`, deleting
/// each part once copied. The output only appears if exactly `total_size`
/// bytes were assembled; on any failure no file exists at `final_path`.
pub fn assemble(parts: &[PathBuf], total_size: u64, final_path: &Path) -> Result<(), DownloadError> {
    let failed = |source: io::Error| DownloadError::AssemblyFailed {
        path: final_path.to_path_buf(),
        source,
    };

    let mut writer = AssemblyWriter::create_for(final_path).map_err(failed)?;
    writer.preallocate(total_size).map_err(failed)?;

    for part in parts {
        let n = writer.append_from(part).map_err(failed)?;
        tracing::debug!(part = %part.display(), bytes = n, "appended part");
        if let Err(e) = std::fs::remove_file(part) {
            tracing::warn!(part = %part.display(), "could not remove part artifact: {}", e);
        }
    }

    if writer.written() != total_size {
        return Err(failed(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "assembled {} bytes, expected {}",
                writer.written(),
                total_size
            ),
        )));
    }

    writer.finalize(final_path).map_err(failed)?;
    tracing::info!(path = %final_path.display(), bytes = total_size, "assembled output file");
    Ok(())
}
