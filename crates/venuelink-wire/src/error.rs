use venuelink_frame::FrameError;

/// Errors that can occur while encoding or decoding envelopes.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The discriminator does not name any known variant.
    #[error("unknown message tag {0}")]
    UnknownTag(u8),

    /// The payload ended before the variant's fields were complete.
    #[error("truncated envelope (needed {needed} more bytes, {remaining} remaining)")]
    Truncated { needed: usize, remaining: usize },

    /// Bytes were left over after the variant's fields were consumed.
    #[error("{count} trailing bytes after envelope")]
    TrailingBytes { count: usize },

    /// A string field is not valid UTF-8.
    #[error("invalid UTF-8 in {field}")]
    BadUtf8 { field: &'static str },

    /// A one-byte enum field carries a value outside its domain.
    #[error("invalid value {value} for {field}")]
    BadEnum { field: &'static str, value: u8 },

    /// A string field is too long for its 16-bit length prefix.
    #[error("{field} too long ({len} bytes, max {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
}

pub type Result<T> = std::result::Result<T, WireError>;
