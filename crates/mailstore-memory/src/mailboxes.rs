//! Mailbox registry held in memory.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use mailstore_core::{Error, MailboxManager, MailboxPath, Result};

#[derive(Clone, Default)]
pub struct InMemoryMailboxManager {
    mailboxes: Arc<RwLock<BTreeSet<MailboxPath>>>,
}

impl InMemoryMailboxManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn list(&self) -> Vec<MailboxPath> {
        self.mailboxes.read().await.iter().cloned().collect()
    }
}

#[async_trait]
impl MailboxManager for InMemoryMailboxManager {
    async fn create_mailbox(&self, path: &MailboxPath) -> Result<()> {
        let mut mailboxes = self.mailboxes.write().await;
        if !mailboxes.insert(path.clone()) {
            return Err(Error::MailboxExists(path.to_string()));
        }
        Ok(())
    }

    async fn rename_mailbox(&self, from: &MailboxPath, to: &MailboxPath) -> Result<()> {
        let mut mailboxes = self.mailboxes.write().await;
        if mailboxes.contains(to) {
            return Err(Error::MailboxExists(to.to_string()));
        }
        if !mailboxes.remove(from) {
            return Err(Error::MailboxNotFound(from.to_string()));
        }
        mailboxes.insert(to.clone());
        Ok(())
    }

    async fn mailbox_exists(&self, path: &MailboxPath) -> Result<bool> {
        Ok(self.mailboxes.read().await.contains(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailstore_core::{rename_mailbox, ErrorKind};

    fn path(name: &str) -> MailboxPath {
        MailboxPath::for_user("alice", name).unwrap()
    }

    #[tokio::test]
    async fn test_create_twice_reports_exists() {
        let manager = InMemoryMailboxManager::new();
        manager.create_mailbox(&path("Work")).await.unwrap();
        let err = manager.create_mailbox(&path("Work")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn test_rename_missing_source_reports_not_found() {
        let manager = InMemoryMailboxManager::new();
        let err = rename_mailbox(&manager, &path("Nope"), &path("Other"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rename_onto_existing_reports_exists() {
        let manager = InMemoryMailboxManager::new();
        manager.create_mailbox(&path("A")).await.unwrap();
        manager.create_mailbox(&path("B")).await.unwrap();
        let err = rename_mailbox(&manager, &path("A"), &path("B"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert!(manager.mailbox_exists(&path("A")).await.unwrap());
    }

    #[tokio::test]
    async fn test_rename_moves_mailbox() {
        let manager = InMemoryMailboxManager::new();
        manager.create_mailbox(&path("A")).await.unwrap();
        rename_mailbox(&manager, &path("A"), &path("B")).await.unwrap();
        assert_eq!(manager.list().await, vec![path("B")]);
    }

    #[tokio::test]
    async fn test_rename_inbox_recreates_inbox() {
        let manager = InMemoryMailboxManager::new();
        let inbox = MailboxPath::inbox("alice");
        manager.create_mailbox(&inbox).await.unwrap();

        rename_mailbox(&manager, &inbox, &path("Old")).await.unwrap();

        assert!(manager.mailbox_exists(&inbox).await.unwrap());
        assert!(manager.mailbox_exists(&path("Old")).await.unwrap());
    }
}
