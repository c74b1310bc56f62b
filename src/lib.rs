//! Write POSIX ustar archives in memory, one regular file per entry
//!
//! # Usage
//!
//! ## Packing files from disk
//!
//! ```rust,no_run
//! use frametar::pack;
//!
//! let files = ["000.png", "001.png"];
//! let count = pack("frames.tar", &files, None).unwrap();
//! println!("{} files archived", count);
//! ```
//!
//! ## Building an archive from buffers
//!
//! ```rust
//! use frametar::Tarball;
//!
//! let mut tar = Tarball::with_mtime(0);
//! tar.add_file("0.png", vec![0u8; 10]).unwrap();
//! let archive = tar.generate().unwrap();
//! // header + padded content + end-of-archive marker
//! assert_eq!(archive.len(), 512 + 512 + 1024);
//! ```
//!
//! ## Archiving rendered frames
//!
//! Implement [`frames::Animator`] and pass it to [`frames::archive_frames`];
//! frames are named `000.png`, `001.png`, ... in timeline order.

pub mod error;
pub mod frames;
pub mod tar;

use std::fs;
use std::path::Path;

use log::{info, warn};

pub use error::{Result, TarError};
pub use frames::{archive_frames, archive_pairs, frame_name, render_to_tarball, Animator};
pub use tar::{build_header, encode_octal, ArchiveEntry, TarArchive, Tarball};

/// Packs files into a tar archive, each stored under its base name.
///
/// Missing or unreadable inputs are skipped with a warning. With `mtime` set
/// every entry gets that timestamp, otherwise the current time.
/// Returns the number of files written to the archive.
pub fn pack<P: AsRef<Path>>(tarfile: impl AsRef<Path>, files: &[P], mtime: Option<u64>) -> Result<usize> {
    let mut tarball = match mtime {
        Some(secs) => Tarball::with_mtime(secs),
        None => Tarball::new(),
    };

    for file_path in files {
        let path = file_path.as_ref();
        if !path.exists() {
            warn!("file not found: {}", path.display());
            continue;
        }

        let data = match fs::read(path) {
            Ok(d) => d,
            Err(e) => {
                warn!("error reading {}: {}", path.display(), e);
                continue;
            }
        };

        let filename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        tarball.add_file(filename, data)?;
    }

    let archive = tarball.generate()?;
    let tarfile = tarfile.as_ref();
    fs::write(tarfile, archive.as_bytes())?;
    info!("created tar archive: {}", tarfile.display());
    Ok(tarball.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_pack() {
        let dir = tempdir().unwrap();
        let file1 = dir.path().join("file1.txt");
        let file2 = dir.path().join("file2.txt");
        let tar_path = dir.path().join("out.tar");
        fs::write(&file1, "Hello, World!").unwrap();
        fs::write(&file2, "Test content 2").unwrap();

        let count = pack(&tar_path, &[&file1, &file2], Some(0)).unwrap();
        assert_eq!(count, 2);

        let data = fs::read(&tar_path).unwrap();
        assert_eq!(data.len(), 2 * 1024 + 1024);
        assert_eq!(&data[0..9], b"file1.txt");
        assert_eq!(&data[512..525], b"Hello, World!");
        assert_eq!(&data[1024..1033], b"file2.txt");
    }

    #[test]
    fn test_pack_skips_missing() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("here.png");
        let missing = dir.path().join("gone.png");
        let tar_path = dir.path().join("out.tar");
        fs::write(&present, [1u8, 2, 3]).unwrap();

        let count = pack(&tar_path, &[&missing, &present], Some(0)).unwrap();
        assert_eq!(count, 1);
        let data = fs::read(&tar_path).unwrap();
        assert_eq!(&data[0..8], b"here.png");
    }

    #[test]
    fn test_pack_nothing() {
        let dir = tempdir().unwrap();
        let tar_path = dir.path().join("out.tar");
        let missing = dir.path().join("gone.png");
        let err = pack(&tar_path, &[missing], None).unwrap_err();
        assert!(matches!(err, TarError::EmptyArchive));
        assert!(!tar_path.exists());
    }
}
