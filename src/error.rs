use std::fmt;

impl std::error::Error for SonifyError {}

#[derive(Debug, Clone, PartialEq)]
pub enum SonifyError {
    /// No usable audio output could be opened.
    DeviceUnavailable(String),
    /// The output stream refused to start, pause or build.
    Stream(String),
    /// A note was played before the engine had a context.
    NotInitialized,
    InvalidScale(String),
    Subscription(String),
}

impl fmt::Display for SonifyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SonifyError::DeviceUnavailable(msg) => write!(f, "Audio device unavailable: {}", msg),
            SonifyError::Stream(msg) => write!(f, "Audio stream error: {}", msg),
            SonifyError::NotInitialized => write!(f, "Audio engine is not initialized"),
            SonifyError::InvalidScale(msg) => write!(f, "Invalid scale: {}", msg),
            SonifyError::Subscription(msg) => write!(f, "Block subscription error: {}", msg),
        }
    }
}
