//! Message record types shared by the store adapters and the migration engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Opaque unique identifier of a message record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    /// Generate a new time-ordered message id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for MessageId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Identifier of an attachment body held by the attachment store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(pub Uuid);

impl AttachmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttachmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Enough information to locate a message in the legacy store after a
/// lookup miss in the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub message_id: MessageId,
    pub mailbox_id: Uuid,
    pub uid: u64,
}

impl fmt::Display for MessageMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "message {} (mailbox {}, uid {})",
            self.message_id, self.mailbox_id, self.uid
        )
    }
}

// =============================================================================
// ATTACHMENTS
// =============================================================================

/// Reference from a message to one of its attachments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub attachment_id: AttachmentId,
    /// Content-ID used by inline parts.
    pub cid: Option<String>,
    pub is_inline: bool,
}

impl AttachmentRef {
    pub fn new(attachment_id: AttachmentId) -> Self {
        Self {
            attachment_id,
            cid: None,
            is_inline: false,
        }
    }

    pub fn inline(attachment_id: AttachmentId, cid: impl Into<String>) -> Self {
        Self {
            attachment_id,
            cid: Some(cid.into()),
            is_inline: true,
        }
    }
}

/// Attachment body resolved through an [`AttachmentLoader`](crate::AttachmentLoader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Single-consumption sequence of attachment references, as returned by
/// legacy full lookups. Callers that need the references more than once must
/// collect them first.
pub type AttachmentStream = Box<dyn Iterator<Item = AttachmentRef> + Send>;

// =============================================================================
// MESSAGES
// =============================================================================

/// Message content without its attachment bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageWithoutAttachment {
    pub metadata: MessageMetadata,
    pub internal_date: DateTime<Utc>,
    pub size: u64,
    pub header_octets: u64,
    pub body_start: u64,
    pub content: Vec<u8>,
}

impl MessageWithoutAttachment {
    /// Build a message from its full RFC 5322 content, splitting headers at
    /// the first blank line.
    pub fn from_content(metadata: MessageMetadata, content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        let body_start = content
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map(|p| p + 4)
            .or_else(|| content.windows(2).position(|w| w == b"\n\n").map(|p| p + 2))
            .unwrap_or(content.len());

        Self {
            metadata,
            internal_date: Utc::now(),
            size: content.len() as u64,
            header_octets: body_start as u64,
            body_start: body_start as u64,
            content,
        }
    }

    pub fn message_id(&self) -> MessageId {
        self.metadata.message_id
    }

    /// Header section of the content held. Projected lookups may hold less
    /// content than `body_start` points past; the slice is clamped.
    pub fn headers(&self) -> &[u8] {
        &self.content[..self.body_offset()]
    }

    pub fn body(&self) -> &[u8] {
        &self.content[self.body_offset()..]
    }

    fn body_offset(&self) -> usize {
        (self.body_start as usize).min(self.content.len())
    }
}

/// A complete record as stored: message content plus attachment references.
///
/// This is the unit paged out of the legacy store and written to the current
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    pub message: MessageWithoutAttachment,
    pub attachments: Vec<AttachmentRef>,
}

impl RawMessage {
    pub fn new(message: MessageWithoutAttachment, attachments: Vec<AttachmentRef>) -> Self {
        Self {
            message,
            attachments,
        }
    }

    pub fn message_id(&self) -> MessageId {
        self.message.message_id()
    }

    pub fn metadata(&self) -> &MessageMetadata {
        &self.message.metadata
    }
}

/// Outcome of a point lookup against the current store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageResult {
    /// The record already lives in the current store.
    Found(RawMessage),
    /// Not migrated yet; the metadata locates it in the legacy store.
    NotFound(MessageMetadata),
}

impl MessageResult {
    pub fn is_found(&self) -> bool {
        matches!(self, MessageResult::Found(_))
    }

    pub fn metadata(&self) -> &MessageMetadata {
        match self {
            MessageResult::Found(raw) => raw.metadata(),
            MessageResult::NotFound(metadata) => metadata,
        }
    }
}

/// How much of a message a legacy lookup should materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchType {
    Metadata,
    Headers,
    Body,
    Full,
}

/// Upper bound on the number of rows a lookup returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Limit {
    #[default]
    Unlimited,
    Limited(usize),
}

impl Limit {
    pub fn unlimited() -> Self {
        Limit::Unlimited
    }

    pub fn limited(limit: usize) -> Self {
        Limit::Limited(limit)
    }

    /// Truncate a result set to this limit.
    pub fn apply<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if let Limit::Limited(n) = self {
            items.truncate(*n);
        }
        items
    }
}

// =============================================================================
// MIGRATION RESULT
// =============================================================================

/// Aggregate status of one or more migration attempts.
///
/// Forms a commutative monoid under [`combine`](Self::combine): `Completed` is
/// the identity and `Partial` absorbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationResult {
    #[default]
    Completed,
    Partial,
}

impl MigrationResult {
    pub fn combine(self, other: MigrationResult) -> MigrationResult {
        match (self, other) {
            (MigrationResult::Completed, MigrationResult::Completed) => MigrationResult::Completed,
            _ => MigrationResult::Partial,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, MigrationResult::Completed)
    }
}

impl std::iter::Sum for MigrationResult {
    fn sum<I: Iterator<Item = MigrationResult>>(iter: I) -> Self {
        iter.fold(MigrationResult::Completed, MigrationResult::combine)
    }
}

impl FromIterator<MigrationResult> for MigrationResult {
    fn from_iter<I: IntoIterator<Item = MigrationResult>>(iter: I) -> Self {
        iter.into_iter().sum()
    }
}

impl fmt::Display for MigrationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationResult::Completed => f.write_str("COMPLETED"),
            MigrationResult::Partial => f.write_str("PARTIAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [MigrationResult; 2] = [MigrationResult::Completed, MigrationResult::Partial];

    fn metadata() -> MessageMetadata {
        MessageMetadata {
            message_id: MessageId::new(),
            mailbox_id: Uuid::new_v4(),
            uid: 7,
        }
    }

    #[test]
    fn test_completed_is_identity() {
        for x in ALL {
            assert_eq!(MigrationResult::Completed.combine(x), x);
            assert_eq!(x.combine(MigrationResult::Completed), x);
        }
    }

    #[test]
    fn test_partial_absorbs() {
        for x in ALL {
            assert_eq!(MigrationResult::Partial.combine(x), MigrationResult::Partial);
            assert_eq!(x.combine(MigrationResult::Partial), MigrationResult::Partial);
        }
    }

    #[test]
    fn test_combine_associative_and_commutative() {
        for a in ALL {
            for b in ALL {
                assert_eq!(a.combine(b), b.combine(a));
                for c in ALL {
                    assert_eq!(a.combine(b).combine(c), a.combine(b.combine(c)));
                }
            }
        }
    }

    #[test]
    fn test_sum_of_empty_is_completed() {
        let result: MigrationResult = std::iter::empty().sum();
        assert_eq!(result, MigrationResult::Completed);
    }

    #[test]
    fn test_collect_with_one_partial() {
        let result: MigrationResult = vec![
            MigrationResult::Completed,
            MigrationResult::Partial,
            MigrationResult::Completed,
        ]
        .into_iter()
        .collect();
        assert_eq!(result, MigrationResult::Partial);
    }

    #[test]
    fn test_migration_result_serde() {
        assert_eq!(
            serde_json::to_string(&MigrationResult::Partial).unwrap(),
            "\"PARTIAL\""
        );
        let parsed: MigrationResult = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(parsed, MigrationResult::Completed);
        assert_eq!(MigrationResult::Partial.to_string(), "PARTIAL");
    }

    #[test]
    fn test_from_content_splits_headers() {
        let msg = MessageWithoutAttachment::from_content(
            metadata(),
            "Subject: hi\r\nFrom: a@b.c\r\n\r\nhello",
        );
        assert_eq!(msg.headers(), b"Subject: hi\r\nFrom: a@b.c\r\n\r\n");
        assert_eq!(msg.body(), b"hello");
        assert_eq!(msg.size, msg.content.len() as u64);
    }

    #[test]
    fn test_from_content_without_body() {
        let msg = MessageWithoutAttachment::from_content(metadata(), "Subject: only headers");
        assert_eq!(msg.body(), b"");
        assert_eq!(msg.body_start, msg.size);
    }

    #[test]
    fn test_accessors_on_cleared_content() {
        let mut msg = MessageWithoutAttachment::from_content(metadata(), "Subject: a\r\n\r\nbody");
        msg.content.clear();
        assert_eq!(msg.headers(), b"");
        assert_eq!(msg.body(), b"");

        let mut msg = MessageWithoutAttachment::from_content(metadata(), "Subject: a\r\n\r\nbody");
        msg.content.truncate(4);
        assert_eq!(msg.headers(), b"Subj");
        assert_eq!(msg.body(), b"");
    }

    #[test]
    fn test_limit_apply() {
        assert_eq!(Limit::limited(2).apply(vec![1, 2, 3]), vec![1, 2]);
        assert_eq!(Limit::unlimited().apply(vec![1, 2, 3]), vec![1, 2, 3]);
    }

    #[test]
    fn test_message_result_metadata() {
        let meta = metadata();
        let miss = MessageResult::NotFound(meta);
        assert!(!miss.is_found());
        assert_eq!(miss.metadata(), &meta);

        let hit = MessageResult::Found(RawMessage::new(
            MessageWithoutAttachment::from_content(meta, "x"),
            vec![],
        ));
        assert!(hit.is_found());
        assert_eq!(hit.metadata().message_id, meta.message_id);
    }
}
