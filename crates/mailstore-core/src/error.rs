//! Error types for mailstore.

use thiserror::Error;

use crate::models::{AttachmentId, MessageMetadata};

/// Result type alias using mailstore's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mailstore operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A lookup miss in the current store has no legacy counterpart.
    #[error("Message not found in V1 store: {0}")]
    RecordMissing(MessageMetadata),

    /// Store backend operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Attachment body could not be resolved
    #[error("Attachment not found: {0}")]
    AttachmentNotFound(AttachmentId),

    /// Mailbox already exists
    #[error("Mailbox already exists: {0}")]
    MailboxExists(String),

    /// Mailbox does not exist
    #[error("Mailbox not found: {0}")]
    MailboxNotFound(String),

    /// Mailbox name exceeds the configured length limit
    #[error("Mailbox name too long: {0}")]
    MailboxNameTooLong(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error categories a command layer maps to client responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    NameTooLong,
    /// Storage is in a state that should be impossible; not retryable.
    InvariantViolation,
    Failure,
}

impl ErrorKind {
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, ErrorKind::InvariantViolation)
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MailboxExists(_) => ErrorKind::AlreadyExists,
            Error::MailboxNotFound(_) | Error::AttachmentNotFound(_) => ErrorKind::NotFound,
            Error::MailboxNameTooLong(_) => ErrorKind::NameTooLong,
            Error::RecordMissing(_) => ErrorKind::InvariantViolation,
            Error::Storage(_)
            | Error::Config(_)
            | Error::InvalidInput(_)
            | Error::Internal(_)
            | Error::Serialization(_)
            | Error::Io(_) => ErrorKind::Failure,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageId;
    use uuid::Uuid;

    fn metadata() -> MessageMetadata {
        MessageMetadata {
            message_id: MessageId::new(),
            mailbox_id: Uuid::nil(),
            uid: 42,
        }
    }

    #[test]
    fn test_error_display_record_missing() {
        let meta = metadata();
        let err = Error::RecordMissing(meta);
        assert!(err.to_string().starts_with("Message not found in V1 store:"));
        assert!(err.to_string().contains(&meta.message_id.to_string()));
        assert!(err.to_string().contains("uid 42"));
    }

    #[test]
    fn test_error_display_storage() {
        let err = Error::Storage("connection reset".to_string());
        assert_eq!(err.to_string(), "Storage error: connection reset");
    }

    #[test]
    fn test_error_display_mailbox_variants() {
        assert_eq!(
            Error::MailboxExists("INBOX".into()).to_string(),
            "Mailbox already exists: INBOX"
        );
        assert_eq!(
            Error::MailboxNotFound("Archive".into()).to_string(),
            "Mailbox not found: Archive"
        );
        assert_eq!(
            Error::MailboxNameTooLong("x".into()).to_string(),
            "Mailbox name too long: x"
        );
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(Error::MailboxExists("a".into()).kind(), ErrorKind::AlreadyExists);
        assert_eq!(Error::MailboxNotFound("a".into()).kind(), ErrorKind::NotFound);
        assert_eq!(
            Error::AttachmentNotFound(AttachmentId::new()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(Error::MailboxNameTooLong("a".into()).kind(), ErrorKind::NameTooLong);
        assert_eq!(Error::Storage("a".into()).kind(), ErrorKind::Failure);
        assert_eq!(Error::Internal("a".into()).kind(), ErrorKind::Failure);
    }

    #[test]
    fn test_record_missing_is_invariant_violation() {
        let kind = Error::RecordMissing(metadata()).kind();
        assert!(kind.is_invariant_violation());
        assert!(!Error::Storage("x".into()).kind().is_invariant_violation());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(ref msg) if !msg.is_empty()));
        assert_eq!(err.kind(), ErrorKind::Failure);
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
