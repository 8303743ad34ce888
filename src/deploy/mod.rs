//! Deployment steps run over an open remote session
//!
//! First the remote target directory is replaced, then the local data is
//! mirrored into it.

pub mod mirror;
pub mod remote;
pub mod replacer;

#[cfg(test)]
pub(crate) mod fake;

pub use mirror::{mirror, MirrorSummary};
pub use remote::{DirScope, RemoteSession};
pub use replacer::replace_remote_dir;
