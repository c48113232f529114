//! # mailstore-core
//!
//! Core types, traits, and abstractions for the mailstore message store.
//!
//! This crate provides the record model shared by the legacy (V1) and current
//! (V2) representations, the store collaborator traits, and the error
//! taxonomy the migration engine and command layer rely on.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod mailbox;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, ErrorKind, Result};
pub use mailbox::{rename_mailbox, MailboxPath, INBOX};
pub use models::*;
pub use traits::*;
