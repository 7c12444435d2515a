//! Error types for the approximation pipeline

use std::fmt;

/// Errors that can occur during configuration or diagram construction
#[derive(Debug, Clone)]
pub enum ApproxError {
    /// Configuration or input validation failed
    InvalidConfig(String),
    /// Image buffer does not match its declared dimensions
    InvalidImage(String),
    /// The triangulation backend rejected a site
    Triangulation(String),
}

impl fmt::Display for ApproxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApproxError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            ApproxError::InvalidImage(msg) => write!(f, "invalid image: {}", msg),
            ApproxError::Triangulation(msg) => write!(f, "triangulation failed: {}", msg),
        }
    }
}

impl std::error::Error for ApproxError {}

/// Result type alias for approximation operations
pub type Result<T> = std::result::Result<T, ApproxError>;
