// src/output/mod.rs
//! Everything that touches the destination vault: naming, attachments,
//! note writes and the persisted migration log.

mod attachments;
mod migration_log;
mod paths;
mod vault;
mod writer;

pub use attachments::AttachmentMaterializer;
pub use migration_log::MigrationLog;
pub use paths::{sanitize_title, sniff_extension, TitlePolicy, TitleRegistry};
pub use vault::{FsVault, Vault};
pub use writer::{finalize, ChildTally, PendingWrite, WriteOutcome};
