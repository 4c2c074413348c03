//! Container format errors.

use thiserror::Error;

/// Everything that can be wrong with a colti executable image.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExeFormatError {
    /// The image is smaller than the fixed header.
    #[error("image too small for a colti header: {len} bytes")]
    TooSmall { len: usize },

    /// The magic number is not `"COLT"`.
    #[error("bad magic number 0x{found:08X} (expected 0x434F4C54)")]
    BadMagic { found: u32 },

    /// The image ends inside the section offset table.
    #[error("truncated section offset table: {count} sections declared")]
    TruncatedSectionTable { count: u16 },

    /// A section offset points outside the image.
    #[error("section {index} offset {offset} is outside the image")]
    SectionOffsetOutOfRange { index: u16, offset: u64 },

    /// A section name is missing its NUL terminator within 32 bytes.
    #[error("section {index} name is not NUL-terminated within 31 bytes")]
    UnterminatedSectionName { index: u16 },

    /// A section name exceeds the 31-byte limit (writer side).
    #[error("section name {name:?} exceeds 31 bytes")]
    SectionNameTooLong { name: String },

    /// A section name is not valid UTF-8.
    #[error("section {index} name is not valid UTF-8")]
    InvalidSectionName { index: u16 },

    /// The image ends inside a section's size field or content.
    #[error("section {index} is truncated")]
    TruncatedSection { index: u16 },
}
