//! Common error infrastructure for vision-core.
//!
//! Gating failures and malformed sense data are not errors: the reconciler
//! treats them as silent no-ops. What remains here are the conditions a host
//! has to hear about, classified the same way so callers can decide whether
//! to skip a token, retry, or stop.

use crate::state::{CharacterId, DetectionModeId, TokenId};
use crate::vision::VisionModeId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: host hiccups that may succeed on the next batch
/// - **Validation**: the caller referenced something that does not exist
/// - **Internal**: the host and engine disagree about shared state
/// - **Fatal**: continuing would render with undefined parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a broken invariant.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all vision-core errors.
///
/// Use `#[derive(thiserror::Error)]` for Display/Error and classify severity
/// by recoverability, not by impact.
pub trait EngineError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Failure reported by a host primitive (visibility or collision test).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("host primitive failed: {message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl EngineError for HostError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        "host_failure"
    }
}

/// Failure writing a token's perceptual configuration back to the scene.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("token {0} is not placed in the scene")]
    TokenMissing(TokenId),

    #[error("write rejected for token {token}: {reason}")]
    Rejected { token: TokenId, reason: String },
}

impl EngineError for StoreError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::TokenMissing(_) => ErrorSeverity::Validation,
            Self::Rejected { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::TokenMissing(_) => "token_missing",
            Self::Rejected { .. } => "write_rejected",
        }
    }
}

/// Errors surfaced while reconciling tokens or evaluating detection modes.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum VisionError {
    /// A selected vision mode has no registered definition.
    #[error("no vision mode definition for '{mode}' (token {token}, character {character})")]
    UnknownVisionMode {
        mode: VisionModeId,
        token: String,
        character: String,
    },

    #[error("no detection mode registered for '{0}'")]
    UnknownDetectionMode(DetectionModeId),

    #[error("token {0} not found in scene")]
    TokenNotFound(TokenId),

    #[error("character {0} not found in scene")]
    CharacterNotFound(CharacterId),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError for VisionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownVisionMode { .. } => ErrorSeverity::Fatal,
            Self::UnknownDetectionMode(_) | Self::TokenNotFound(_) | Self::CharacterNotFound(_) => {
                ErrorSeverity::Validation
            }
            Self::Host(err) => err.severity(),
            Self::Store(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownVisionMode { .. } => "unknown_vision_mode",
            Self::UnknownDetectionMode(_) => "unknown_detection_mode",
            Self::TokenNotFound(_) => "token_not_found",
            Self::CharacterNotFound(_) => "character_not_found",
            Self::Host(err) => err.error_code(),
            Self::Store(err) => err.error_code(),
        }
    }
}
