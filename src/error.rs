//! Error types for tablecast
//!
//! Every failure carries the job phase it happened in, so callers can
//! tell a bad config apart from an unreachable source or an unwritable
//! destination without parsing message text.

use std::fmt;
use thiserror::Error;

/// Phase of a job (or the transfer command) an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Reading and validating the job configuration
    Config,
    /// Attaching the source and binding the read
    Read,
    /// Applying the rename/cast projection
    Transform,
    /// Writing to the destination
    Write,
    /// SFTP file transfer
    Transfer,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Config => write!(f, "config"),
            Phase::Read => write!(f, "read"),
            Phase::Transform => write!(f, "transform"),
            Phase::Write => write!(f, "write"),
            Phase::Transfer => write!(f, "transfer"),
        }
    }
}

/// The main error type for tablecast
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing section in job config: {section}")]
    MissingSection { section: String },

    #[error("Missing required parameter: {field}")]
    MissingParameter { field: String },

    #[error("Unsupported type '{value}' (expected string, integer or timestamp)")]
    UnsupportedType { value: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Pipeline Errors
    // ============================================================================
    #[error("Source read failed: {message}")]
    Read { message: String },

    #[error("Projection failed: {message}")]
    Transform { message: String },

    #[error("Destination write failed: {message}")]
    Write { message: String },

    // ============================================================================
    // Transfer Errors
    // ============================================================================
    #[error("Transfer failed: {message}")]
    Transfer { message: String },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing section error
    pub fn missing_section(section: impl Into<String>) -> Self {
        Self::MissingSection {
            section: section.into(),
        }
    }

    /// Create a missing parameter error
    pub fn missing_parameter(field: impl Into<String>) -> Self {
        Self::MissingParameter {
            field: field.into(),
        }
    }

    /// Create an unsupported type error
    pub fn unsupported_type(value: impl Into<String>) -> Self {
        Self::UnsupportedType {
            value: value.into(),
        }
    }

    /// Create a read error
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Create a transform error
    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform {
            message: message.into(),
        }
    }

    /// Create a write error
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }

    /// Create a transfer error
    pub fn transfer(message: impl Into<String>) -> Self {
        Self::Transfer {
            message: message.into(),
        }
    }

    /// Build an error of the given phase
    pub fn in_phase(phase: Phase, message: impl Into<String>) -> Self {
        match phase {
            Phase::Config => Self::config(message),
            Phase::Read => Self::read(message),
            Phase::Transform => Self::transform(message),
            Phase::Write => Self::write(message),
            Phase::Transfer => Self::transfer(message),
        }
    }

    /// Phase this error belongs to
    pub fn phase(&self) -> Phase {
        match self {
            Error::Config { .. }
            | Error::MissingSection { .. }
            | Error::MissingParameter { .. }
            | Error::UnsupportedType { .. }
            | Error::JsonParse(_) => Phase::Config,
            Error::Read { .. } => Phase::Read,
            Error::Transform { .. } => Phase::Transform,
            Error::Write { .. } => Phase::Write,
            Error::Transfer { .. } => Phase::Transfer,
        }
    }
}

/// Result type alias for tablecast
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for tagging foreign errors with a phase and context
pub trait ResultExt<T> {
    /// Wrap the error as `phase` with a message prefix
    fn phase_context(self, phase: Phase, message: impl Into<String>) -> Result<T>;

    /// Lazy variant of [`ResultExt::phase_context`]
    fn with_phase_context<F: FnOnce() -> String>(self, phase: Phase, f: F) -> Result<T>;
}

impl<T, E: fmt::Display> ResultExt<T> for std::result::Result<T, E> {
    fn phase_context(self, phase: Phase, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::in_phase(phase, format!("{}: {e}", message.into())))
    }

    fn with_phase_context<F: FnOnce() -> String>(self, phase: Phase, f: F) -> Result<T> {
        self.map_err(|e| Error::in_phase(phase, format!("{}: {e}", f())))
    }
}
