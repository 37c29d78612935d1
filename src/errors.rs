// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the scanning pipeline

use std::fmt;

/// Result type alias using ScanError
pub type ScanResult<T> = Result<T, ScanError>;

/// Top-level error type for the scanning pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Frame source errors
    Source(SourceError),
    /// Decoder errors
    Decode(DecodeError),
    /// Session lifecycle errors
    Session(SessionError),
    /// Configuration errors
    Config(String),
}

/// Frame source errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The underlying capture device disconnected or was revoked.
    /// Fatal to the session; retry policy belongs to the caller.
    Unavailable(String),
    /// The source was closed and will produce no further frames
    Closed,
}

/// Decoder errors
///
/// A failed decode is non-fatal to a session: it is treated as a frame
/// with zero symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The decode attempt failed outright
    Failed(String),
    /// The frame's pixel format is not supported by this decoder
    UnsupportedFormat(String),
}

/// Session lifecycle errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// start() called on a session that already left Idle
    AlreadyStarted,
    /// pause() called while not Running
    NotRunning,
    /// resume() called while not Paused
    NotPaused,
    /// Operation attempted on a closed session
    Closed,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Source(e) => write!(f, "Source error: {}", e),
            ScanError::Decode(e) => write!(f, "Decode error: {}", e),
            ScanError::Session(e) => write!(f, "Session error: {}", e),
            ScanError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Unavailable(msg) => write!(f, "Source unavailable: {}", msg),
            SourceError::Closed => write!(f, "Source closed"),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Failed(msg) => write!(f, "Decode failed: {}", msg),
            DecodeError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AlreadyStarted => write!(f, "Session already started"),
            SessionError::NotRunning => write!(f, "Session is not running"),
            SessionError::NotPaused => write!(f, "Session is not paused"),
            SessionError::Closed => write!(f, "Session is closed"),
        }
    }
}

impl std::error::Error for ScanError {}
impl std::error::Error for SourceError {}
impl std::error::Error for DecodeError {}
impl std::error::Error for SessionError {}

// Conversions from sub-errors to ScanError
impl From<SourceError> for ScanError {
    fn from(err: SourceError) -> Self {
        ScanError::Source(err)
    }
}

impl From<DecodeError> for ScanError {
    fn from(err: DecodeError) -> Self {
        ScanError::Decode(err)
    }
}

impl From<SessionError> for ScanError {
    fn from(err: SessionError) -> Self {
        ScanError::Session(err)
    }
}
