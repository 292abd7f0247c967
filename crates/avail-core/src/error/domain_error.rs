//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Channel not found: {0}")]
    ChannelNotFound(Snowflake),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Unknown league: {0}")]
    UnknownLeague(String),

    #[error("Unknown weekday: {0}")]
    UnknownWeekday(String),

    #[error("Emoji is not a recognized time slot: {0}")]
    EmojiNotRecognized(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Rejected Operations
    // =========================================================================
    #[error("Operation declined by user")]
    ConfirmationDeclined,

    #[error("Missing permission: {0}")]
    Forbidden(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    /// Network or rate-limit failure on a store call; retryable
    #[error("Store temporarily unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store error: {0}")]
    StoreError(String),

    /// Network or rate-limit failure on a chat call; retryable
    #[error("Chat service temporarily unavailable: {0}")]
    ChatUnavailable(String),

    #[error("Chat service error: {0}")]
    ChatError(String),

    #[error("Journal error: {0}")]
    JournalError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for responses and logs
    pub fn code(&self) -> &'static str {
        match self {
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::ChannelNotFound(_) => "UNKNOWN_CHANNEL",
            Self::TableNotFound(_) => "UNKNOWN_TABLE",
            Self::UnknownLeague(_) => "UNKNOWN_LEAGUE",
            Self::UnknownWeekday(_) => "UNKNOWN_WEEKDAY",
            Self::EmojiNotRecognized(_) => "UNRECOGNIZED_EMOJI",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ConfirmationDeclined => "CONFIRMATION_DECLINED",
            Self::Forbidden(_) => "MISSING_PERMISSIONS",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::StoreError(_) => "STORE_ERROR",
            Self::ChatUnavailable(_) => "CHAT_UNAVAILABLE",
            Self::ChatError(_) => "CHAT_ERROR",
            Self::JournalError(_) => "JOURNAL_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    ///
    /// Delete paths treat these as success: the row or message being gone
    /// already is the desired end state.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MessageNotFound(_) | Self::ChannelNotFound(_) | Self::TableNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownLeague(_)
                | Self::UnknownWeekday(_)
                | Self::EmojiNotRecognized(_)
                | Self::ValidationError(_)
        )
    }

    /// Check if this is a transient failure worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_) | Self::ChatUnavailable(_))
    }
}
