//! Disk I/O and file lifecycle.
//!
//! Part artifacts are staged in a run-scoped hidden directory inside the
//! destination directory, so concurrent runs never share part names and the
//! final rename stays on one filesystem. Assembly concatenates the parts into
//! a preallocated temp file and renames it into place only on success.

mod assemble;
mod parts;

pub use assemble::{assemble, AssemblyWriter};
pub use parts::PartStore;

/// Suffix of the temp file that becomes the final output.
pub const TEMP_SUFFIX: &str = ".part";
/// Prefix of that temp file.
pub const ASSEMBLY_PREFIX: &str = ".splitfetch-";

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn staged_parts_assemble_in_index_order() {
        let dest = tempfile::tempdir().unwrap();
        let store = PartStore::create_in(dest.path()).unwrap();
        // Written out of order on purpose.
        fs::write(store.part_path(3), b"ghi").unwrap();
        fs::write(store.part_path(1), b"abc").unwrap();
        fs::write(store.part_path(2), b"def").unwrap();

        let final_path = dest.path().join("out.txt");
        let parts: Vec<_> = (1..=3).map(|i| store.part_path(i)).collect();
        assemble(&parts, 9, &final_path).unwrap();

        assert_eq!(fs::read(&final_path).unwrap(), b"abcdefghi");
        assert!(parts.iter().all(|p| !p.exists()));

        let staging = store.dir().to_path_buf();
        drop(store);
        assert!(!staging.exists());
        let names: Vec<_> = fs::read_dir(dest.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("out.txt")]);
    }
}
