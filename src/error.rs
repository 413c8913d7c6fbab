//! Crate-wide error type.
//!
//! Every failure carries a coarse [`ErrorKind`] (so callers can branch on it)
//! and a human-readable message that already names the offending file or
//! argument. The `mvd` binary maps the kind to a process exit code.

/// Broad category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File could not be opened, read or written.
    Io,
    /// File contents are malformed.
    Parse,
    /// A caller-supplied argument is out of range or inconsistent.
    InvalidArgument,
    /// Least-squares iteration did not converge.
    NoConvergence,
    /// Data files to be combined do not share the same x values.
    Combine,
}

#[derive(Clone, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub fn no_convergence(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoConvergence, message)
    }

    pub fn combine(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Combine, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Process exit code used by the `mvd` binary.
    pub fn exit_code(&self) -> u8 {
        match self.kind {
            ErrorKind::Io | ErrorKind::Parse | ErrorKind::InvalidArgument => 2,
            ErrorKind::Combine => 3,
            ErrorKind::NoConvergence => 4,
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}
