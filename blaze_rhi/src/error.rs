//! Error types for the Blaze RHI
//!
//! This module defines the error types used throughout the RHI core and its
//! backends: resource creation failures, environment failures (missing backend
//! library or entry symbol) and contract violations reported in recoverable mode.

use std::fmt;

/// Result type for Blaze RHI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Blaze RHI errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Backend-specific error (OpenGL, Vulkan, Direct3D, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, shader, pipeline state, etc.)
    InvalidResource(String),

    /// Initialization failed (device, backend library, platform context)
    InitializationFailed(String),

    /// Caller broke an API contract (only returned when the assert mode is recoverable)
    ContractViolation(String),

    /// Feature not supported by the backend or the driver
    Unsupported(String),
}

impl Error {
    /// Returns true if this error reports a broken API contract
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Error::ContractViolation(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::ContractViolation(msg) => write!(f, "Contract violation: {}", msg),
            Error::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
