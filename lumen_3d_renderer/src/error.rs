//! Error types for the Lumen3D render pipeline
//!
//! Only initialization and backend failures are surfaced as errors.
//! Per-frame numerical edge cases (degenerate planes, rejected luminance
//! samples, light overflow) are recovered locally and never reach this type.

use std::fmt;

/// Result type for Lumen3D operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumen3D errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error reported by the graphics device
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, shader program, etc.)
    InvalidResource(String),

    /// Initialization failed (pipeline, passes, device)
    InitializationFailed(String),

    /// Render target attachments do not form a complete framebuffer
    IncompleteRenderTarget(String),

    /// Shader program failed to compile or link
    ShaderCompilation(String),

    /// Pipeline configuration value out of range
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::IncompleteRenderTarget(msg) => write!(f, "Incomplete render target: {}", msg),
            Error::ShaderCompilation(msg) => write!(f, "Shader compilation failed: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build a `BackendError`, logging it at ERROR severity first
///
/// An explicit variant can be given before the message:
///
/// ```ignore
/// let err = engine_err!("lumen3d::TargetManager", "target '{}' missing", name);
/// let err = engine_err!("lumen3d::ShadowPass", IncompleteRenderTarget, "no depth attachment");
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $variant:ident, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::error::Error::$variant(message)
    }};
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::error::Error::BackendError(message)
    }};
}

/// Log an error and return it from the current function
///
/// Accepts the same forms as `engine_err!`.
#[macro_export]
macro_rules! engine_bail {
    ($($arg:tt)*) => {
        return Err($crate::engine_err!($($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
