//! In-memory ustar archive writer
//!
//! # Usage
//!
//! ```rust
//! use frametar::tar::Tarball;
//!
//! let mut tar = Tarball::with_mtime(0);
//! tar.add_file("000.png", b"frame zero".to_vec()).unwrap();
//! tar.add_file("001.png", b"frame one".to_vec()).unwrap();
//!
//! let archive = tar.generate().unwrap();
//! assert_eq!(archive.media_type(), "application/x-tar");
//! assert_eq!(archive.len() % 512, 0);
//! ```
//!
//! ## Working with headers
//!
//! ```rust
//! use frametar::tar::{build_header, calc_checksum};
//!
//! let header = build_header("file.txt", 1024, 0).unwrap();
//! assert_eq!(&header[124..136], b"00000002000\0");
//!
//! // The stored checksum is followed by NUL and a space
//! assert_eq!(&header[154..156], b"\0 ");
//! let stored = u32::from_str_radix(std::str::from_utf8(&header[148..154]).unwrap(), 8).unwrap();
//! assert_eq!(stored, calc_checksum(&header));
//! ```

use std::ops::Range;

use chrono::Utc;
use log::{debug, trace};

use crate::error::{Result, TarError};

/// Size of a header block and the unit every entry is padded to.
pub const BLOCK_SIZE: usize = 512;
/// Width of the classic header name field.
pub const NAME_LEN: usize = 100;
/// Two zero blocks terminate the archive.
pub const END_OF_ARCHIVE_LEN: usize = 2 * BLOCK_SIZE;
/// Media type of a generated archive.
pub const TAR_MEDIA_TYPE: &str = "application/x-tar";

// Header field layout
const NAME: Range<usize> = 0x000..0x064;
const MODE: Range<usize> = 0x064..0x06C;
const UID: Range<usize> = 0x06C..0x074;
const GID: Range<usize> = 0x074..0x07C;
const SIZE: Range<usize> = 0x07C..0x088;
const MTIME: Range<usize> = 0x088..0x094;
const CHECKSUM: Range<usize> = 0x094..0x09C;
const TYPEFLAG: usize = 0x09C;
const MAGIC: Range<usize> = 0x101..0x107;
const VERSION: Range<usize> = 0x107..0x109;
const UNAME: Range<usize> = 0x109..0x129;
const GNAME: Range<usize> = 0x129..0x149;

/// Encodes `n` as zero-padded octal filling `field_len - 1` digits.
///
/// The last byte of the field is left for the NUL terminator, which the
/// caller writes (or leaves as the zero it already is).
pub fn encode_octal(n: u64, field_len: usize) -> Result<String> {
    octal_field("numeric", n, field_len)
}

fn octal_field(field: &'static str, n: u64, field_len: usize) -> Result<String> {
    let width = field_len.saturating_sub(1);
    let octal = format!("{:0width$o}", n, width = width);
    if octal.len() > width {
        return Err(TarError::FieldOverflow {
            field,
            value: n,
            width,
        });
    }
    Ok(octal)
}

/// Converts a name to its single-byte representation.
///
/// Each character maps to one byte (Latin-1), so anything above U+00FF is rejected.
pub fn name_bytes(name: &str) -> Result<Vec<u8>> {
    name.chars()
        .map(|ch| {
            u8::try_from(u32::from(ch)).map_err(|_| TarError::NonAsciiName {
                name: name.to_string(),
                ch,
            })
        })
        .collect()
}

/// Copies `bytes` to the start of `field`; the rest of the field stays as it was.
fn write_field(data: &mut [u8; BLOCK_SIZE], field: Range<usize>, bytes: &[u8]) {
    let len = bytes.len().min(field.len());
    data[field.start..field.start + len].copy_from_slice(&bytes[..len]);
}

/// Builds the 512-byte header for a regular file.
pub fn build_header(name: &str, size: u64, mtime: u64) -> Result<[u8; BLOCK_SIZE]> {
    let name_raw = name_bytes(name)?;
    if name_raw.len() > NAME_LEN {
        return Err(TarError::NameTooLong {
            name: name.to_string(),
            len: name_raw.len(),
        });
    }
    let size_str = octal_field("size", size, SIZE.len())?;
    let mtime_str = octal_field("mtime", mtime, MTIME.len())?;

    let mut data = [0u8; BLOCK_SIZE];
    write_field(&mut data, NAME, &name_raw);
    write_field(&mut data, MODE, b"0000644");
    write_field(&mut data, UID, b"0000000");
    write_field(&mut data, GID, b"0000000");
    write_field(&mut data, SIZE, size_str.as_bytes());
    write_field(&mut data, MTIME, mtime_str.as_bytes());
    // summed as spaces, then overwritten below
    data[CHECKSUM].fill(b' ');
    data[TYPEFLAG] = b'0';
    // old GNU magic, as GNU tar writes it
    write_field(&mut data, MAGIC, b"ustar ");
    write_field(&mut data, VERSION, &[b' ', 0]);
    write_field(&mut data, UNAME, b"root");
    write_field(&mut data, GNAME, b"root");

    let sum = calc_checksum(&data);
    trace!("header checksum for {:?}: {:o}", name, sum);
    // six digits, then NUL, then space
    let checksum = octal_field("checksum", u64::from(sum), 7)?;
    write_field(&mut data, CHECKSUM, checksum.as_bytes());
    data[CHECKSUM.start + 6] = 0;
    data[CHECKSUM.start + 7] = b' ';
    Ok(data)
}

/// Calc checksum of the header bytes, counting the checksum field as spaces
pub fn calc_checksum(data: &[u8; BLOCK_SIZE]) -> u32 {
    data.iter()
        .enumerate()
        .map(|(i, &b)| {
            if CHECKSUM.contains(&i) {
                u32::from(b' ')
            } else {
                u32::from(b)
            }
        })
        .sum()
}

/// Number of zero bytes that bring `size` up to the next block boundary.
pub fn padding_len(size: usize) -> usize {
    (BLOCK_SIZE - size % BLOCK_SIZE) % BLOCK_SIZE
}

/// One file held by a [`Tarball`]. Immutable once added.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    name: String,
    content: Vec<u8>,
    mtime: u64,
    header: [u8; BLOCK_SIZE],
}

impl ArchiveEntry {
    fn new(name: String, content: Vec<u8>, mtime: u64) -> Result<Self> {
        let header = build_header(&name, content.len() as u64, mtime)?;
        Ok(Self {
            name,
            content,
            mtime,
            header,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn mtime(&self) -> u64 {
        self.mtime
    }

    /// The header block derived from this entry.
    pub fn header(&self) -> &[u8; BLOCK_SIZE] {
        &self.header
    }

    /// Header, content and padding together.
    pub fn block_len(&self) -> usize {
        BLOCK_SIZE + self.content.len() + padding_len(self.content.len())
    }
}

/// Builds a tar archive in memory from an ordered list of files.
///
/// Entries keep their insertion order and duplicate names are kept as-is.
/// [`Tarball::generate`] derives the output from the current entry list every
/// time it is called, so it may be called repeatedly and files may still be
/// added afterwards.
#[derive(Debug, Default, Clone)]
pub struct Tarball {
    entries: Vec<ArchiveEntry>,
    mtime: Option<u64>,
}

impl Tarball {
    /// Create an empty builder that stamps entries with the current time
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder that stamps every entry with `mtime`
    pub fn with_mtime(mtime: u64) -> Self {
        Self {
            entries: Vec::new(),
            mtime: Some(mtime),
        }
    }

    /// Add a regular file. The header is built right away, so an invalid
    /// name or an oversized file is reported here and nothing is stored.
    pub fn add_file(&mut self, name: impl Into<String>, content: impl Into<Vec<u8>>) -> Result<()> {
        let mtime = self.mtime.unwrap_or_else(now);
        let entry = ArchiveEntry::new(name.into(), content.into(), mtime)?;
        debug!("adding {:?} ({} bytes)", entry.name, entry.content.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Concatenate every entry block followed by the end-of-archive marker
    pub fn generate(&self) -> Result<TarArchive> {
        if self.entries.is_empty() {
            return Err(TarError::EmptyArchive);
        }
        let total = self
            .entries
            .iter()
            .map(ArchiveEntry::block_len)
            .sum::<usize>()
            + END_OF_ARCHIVE_LEN;
        let mut data = Vec::with_capacity(total);
        for entry in &self.entries {
            data.extend_from_slice(&entry.header);
            data.extend_from_slice(&entry.content);
            data.resize(data.len() + padding_len(entry.content.len()), 0);
        }
        data.resize(data.len() + END_OF_ARCHIVE_LEN, 0);
        debug!(
            "generated tar archive: {} entries, {} bytes",
            self.entries.len(),
            data.len()
        );
        Ok(TarArchive { data })
    }
}

fn now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

/// A finished archive stream, tagged as `application/x-tar`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarArchive {
    data: Vec<u8>,
}

impl TarArchive {
    pub fn media_type(&self) -> &'static str {
        TAR_MEDIA_TYPE
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl AsRef<[u8]> for TarArchive {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
