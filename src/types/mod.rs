//! Core type definitions for scriptsync

mod error;
mod file;
mod remote_type;
mod scan;

pub use error::{NameCollision, SyncError};
pub use file::{ProjectFile, RemoteFile, UntrackedReason};
pub use remote_type::RemoteType;
pub use scan::ProjectScan;
