//! Remote session interface used by the deploy steps

use std::path::Path;

use async_trait::async_trait;

use crate::sftp::path_utils::resolve_remote_path;
use crate::sftp::{ProgressCallback, SftpError};

/// Operations the replacer and the mirror need from the remote side
///
/// Relative paths are resolved against the client-side working directory
/// (`cwd`), which starts at the remote home directory.
#[async_trait]
pub trait RemoteSession: Send {
    /// Current remote working directory (absolute)
    fn cwd(&self) -> &str;

    fn set_cwd(&mut self, path: String);

    async fn exists(&mut self, path: &str) -> Result<bool, SftpError>;

    /// Delete a file or a directory and everything below it
    ///
    /// Returns the number of entries removed.
    async fn remove_recursive(&mut self, path: &str) -> Result<u64, SftpError>;

    /// Create a directory and any missing parent (`mkdir -p`)
    async fn make_dirs(&mut self, path: &str) -> Result<(), SftpError>;

    /// Upload a local file into the working directory under its own name
    ///
    /// Returns the number of bytes written.
    async fn upload_file(
        &mut self,
        local_path: &Path,
        preserve_times: bool,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<u64, SftpError>;
}

/// A working directory change, undone by [`DirScope::leave`]
#[must_use = "leave() restores the previous working directory"]
pub struct DirScope {
    previous: String,
}

impl DirScope {
    /// Make `path` (relative to the current one) the working directory
    pub fn enter(session: &mut dyn RemoteSession, path: &str) -> Self {
        let previous = session.cwd().to_string();
        session.set_cwd(resolve_remote_path(&previous, path));
        Self { previous }
    }

    /// Restore the working directory active before `enter`
    pub fn leave(self, session: &mut dyn RemoteSession) {
        session.set_cwd(self.previous);
    }
}
