/// Errors that can occur during frame encoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the 16-bit length header's capacity.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
