//! Error type shared by the archive builder and the frame wiring.

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TarError>;

/// Everything that can go wrong while building an archive.
#[derive(Debug, thiserror::Error)]
pub enum TarError {
    /// The entry name holds a character that does not fit in a single byte.
    #[error("non-ASCII character {ch:?} in file name {name:?}")]
    NonAsciiName { name: String, ch: char },

    /// The entry name does not fit in the 100-byte header name field.
    #[error("file name {name:?} is {len} bytes, the header name field holds at most 100")]
    NameTooLong { name: String, len: usize },

    /// A numeric header field cannot hold the value in octal.
    #[error("{field} value {value} does not fit in {width} octal digits")]
    FieldOverflow {
        field: &'static str,
        value: u64,
        width: usize,
    },

    /// `generate` was called before any file was added.
    #[error("cannot create empty tar archive")]
    EmptyArchive,

    /// The frame source failed to prepare itself.
    #[error("frame source failed to load: {0}")]
    Load(String),

    /// The frame source failed to produce a frame.
    #[error("frame {frame} failed to render: {reason}")]
    Render { frame: usize, reason: String },

    /// Reading inputs or writing the archive to disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
