//! Error types for netlink and devlink operations.

use std::io;

/// Result type for netlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to devlink.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Kernel returned an error code.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel {
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Kernel error with operation context.
    #[error("{operation}: {message} (errno {errno})")]
    KernelWithContext {
        /// The operation that failed.
        operation: String,
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Message was truncated.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Expected message length.
        expected: usize,
        /// Actual bytes received.
        actual: usize,
    },

    /// Invalid message framing.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Invalid attribute payload.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// Generic Netlink family is not registered in the kernel.
    #[error("generic netlink family not found: {name}")]
    FamilyNotFound {
        /// The family name.
        name: String,
    },

    /// Multicast group is not advertised by the family.
    #[error("multicast group \"{group}\" not found in family {family}")]
    GroupNotFound {
        /// The family name.
        family: String,
        /// The group name.
        group: String,
    },

    /// A received attribute set violated the decode policy.
    #[error("decode error: {0}")]
    Decode(String),

    /// The startup device dump could not be turned into an index map.
    #[error("failed to create index map: {0}")]
    CacheBuild(String),

    /// Device name is not present in the index map.
    #[error("Device \"{name}\" not found")]
    DeviceNotFound {
        /// The device name that was not found.
        name: String,
    },

    /// Malformed numeric or `device/port` argument.
    #[error("{0}")]
    Parse(String),

    /// Object or command keyword did not match anything.
    #[error("{kind} \"{token}\" not found")]
    UnknownCommand {
        /// "Object" for the first level, "Command" for the verb.
        kind: &'static str,
        /// The token as typed.
        token: String,
    },

    /// Port type string is not one of `eth`, `ib`, `auto`.
    #[error("Unknown port type \"{0}\"")]
    InvalidPortType(String),
}

impl Error {
    /// Create a kernel error from an errno value.
    pub fn from_errno(errno: i32) -> Self {
        let message = io::Error::from_raw_os_error(-errno).to_string();
        Self::Kernel {
            errno: -errno,
            message,
        }
    }

    /// Add context to this error.
    ///
    /// Wraps kernel errors with operation context. Other errors are returned unchanged.
    pub fn with_context(self, operation: impl Into<String>) -> Self {
        match self {
            Self::Kernel { errno, message } => Self::KernelWithContext {
                operation: operation.into(),
                errno,
                message,
            },
            other => other,
        }
    }

    /// Check if this is a "not found" error (unknown device, ENOENT, ENODEV).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } | Self::KernelWithContext { errno, .. } => {
                matches!(*errno, 2 | 19) // ENOENT=2, ENODEV=19
            }
            Self::DeviceNotFound { .. } => true,
            _ => false,
        }
    }

    /// Check if a received message failed attribute validation.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }

    /// Check if the failure came from the socket or the kernel.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::Kernel { .. }
                | Self::KernelWithContext { .. }
                | Self::Truncated { .. }
                | Self::InvalidMessage(_)
                | Self::FamilyNotFound { .. }
                | Self::GroupNotFound { .. }
        )
    }

    /// Check if the error was caused by user input and raised before any I/O.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) | Self::UnknownCommand { .. } | Self::InvalidPortType(_)
        )
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } | Self::KernelWithContext { errno, .. } => {
                matches!(*errno, 1 | 13) // EPERM=1, EACCES=13
            }
            _ => false,
        }
    }

    /// Get the errno value if this is a kernel error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } | Self::KernelWithContext { errno, .. } => Some(*errno),
            Self::Io(e) => e.raw_os_error(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_errno() {
        let err = Error::from_errno(-1); // EPERM
        assert!(err.is_permission_denied());
        assert!(err.is_transport());
        assert_eq!(err.errno(), Some(1));
    }

    #[test]
    fn test_with_context() {
        let err = Error::from_errno(-2).with_context("splitting port swA/3"); // ENOENT
        assert!(err.is_not_found());
        let msg = err.to_string();
        assert!(msg.contains("splitting port swA/3"));
        assert!(msg.contains("No such file or directory"));
    }

    #[test]
    fn test_with_context_leaves_other_errors() {
        let err = Error::Decode("bad".into()).with_context("ignored");
        assert!(err.is_decode());
        assert_eq!(err.to_string(), "decode error: bad");
    }

    #[test]
    fn test_classification() {
        assert!(
            Error::DeviceNotFound {
                name: "swA".into()
            }
            .is_not_found()
        );
        assert!(Error::Parse("x".into()).is_usage());
        assert!(Error::InvalidPortType("fc".into()).is_usage());
        assert!(!Error::CacheBuild("x".into()).is_usage());
        assert!(!Error::Decode("x".into()).is_transport());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::DeviceNotFound {
            name: "swA".into(),
        };
        assert_eq!(err.to_string(), "Device \"swA\" not found");

        let err = Error::UnknownCommand {
            kind: "Object",
            token: "bogus".into(),
        };
        assert_eq!(err.to_string(), "Object \"bogus\" not found");

        let err = Error::InvalidPortType("fc".into());
        assert_eq!(err.to_string(), "Unknown port type \"fc\"");
    }
}
