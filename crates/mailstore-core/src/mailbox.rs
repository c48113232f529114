//! Mailbox paths and the rename operation used by the command layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::defaults::MAILBOX_NAME_MAX_LEN;
use crate::error::{Error, Result};
use crate::traits::MailboxManager;

/// Name of the mailbox every user always has.
pub const INBOX: &str = "INBOX";

/// Fully qualified mailbox location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MailboxPath {
    pub namespace: String,
    pub user: String,
    pub name: String,
}

impl MailboxPath {
    /// Build a path in the private namespace, rejecting empty and over-long names.
    pub fn for_user(user: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidInput("mailbox name is empty".into()));
        }
        if name.len() > MAILBOX_NAME_MAX_LEN {
            return Err(Error::MailboxNameTooLong(name));
        }
        Ok(Self {
            namespace: "#private".into(),
            user: user.into(),
            name,
        })
    }

    pub fn inbox(user: impl Into<String>) -> Self {
        Self {
            namespace: "#private".into(),
            user: user.into(),
            name: INBOX.into(),
        }
    }

    /// INBOX is case-insensitive.
    pub fn is_inbox(&self) -> bool {
        self.name.eq_ignore_ascii_case(INBOX)
    }
}

impl fmt::Display for MailboxPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.user, self.name)
    }
}

/// Rename a mailbox. Renaming INBOX moves its content and leaves a fresh,
/// empty INBOX behind.
pub async fn rename_mailbox<M>(manager: &M, from: &MailboxPath, to: &MailboxPath) -> Result<()>
where
    M: MailboxManager + ?Sized,
{
    manager.rename_mailbox(from, to).await?;

    if from.is_inbox() && !manager.mailbox_exists(from).await? {
        manager.create_mailbox(from).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_for_user_accepts_regular_name() {
        let path = MailboxPath::for_user("alice", "Archive").unwrap();
        assert_eq!(path.name, "Archive");
        assert_eq!(path.to_string(), "#private:alice:Archive");
        assert!(!path.is_inbox());
    }

    #[test]
    fn test_for_user_rejects_long_name() {
        let name = "a".repeat(MAILBOX_NAME_MAX_LEN + 1);
        let err = MailboxPath::for_user("alice", name).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NameTooLong);
    }

    #[test]
    fn test_for_user_rejects_empty_name() {
        let err = MailboxPath::for_user("alice", "").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_inbox_is_case_insensitive() {
        assert!(MailboxPath::for_user("alice", "inbox").unwrap().is_inbox());
        assert!(MailboxPath::inbox("alice").is_inbox());
    }
}
