//! In-memory remote session recording every call

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use async_trait::async_trait;

use super::remote::RemoteSession;
use crate::sftp::path_utils::{join_remote_path, remote_ancestors, resolve_remote_path};
use crate::sftp::{ProgressCallback, SftpError, TransferProgress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Exists(String),
    RemoveRecursive(String),
    MakeDirs { cwd: String, path: String },
    Upload { cwd: String, name: String, with_progress: bool },
}

pub struct FakeRemote {
    cwd: String,
    pub calls: Vec<Call>,
    pub dirs: BTreeSet<String>,
    pub files: BTreeMap<String, Vec<u8>>,
    pub mtimes: BTreeMap<String, std::time::SystemTime>,
    /// Upload of this file name fails
    pub fail_upload: Option<String>,
    pub fail_remove: bool,
}

impl FakeRemote {
    pub fn new(home: &str) -> Self {
        let mut remote = Self {
            cwd: home.to_string(),
            calls: Vec::new(),
            dirs: BTreeSet::new(),
            files: BTreeMap::new(),
            mtimes: BTreeMap::new(),
            fail_upload: None,
            fail_remove: false,
        };
        remote.add_dir(home);
        remote
    }

    pub fn add_dir(&mut self, path: &str) {
        self.dirs.extend(remote_ancestors(path));
    }

    pub fn add_file(&mut self, path: &str, content: &[u8]) {
        if let Some((parent, _)) = path.rsplit_once('/') {
            self.add_dir(parent);
        }
        self.files.insert(path.to_string(), content.to_vec());
    }

    pub fn has_dir(&self, path: &str) -> bool {
        self.dirs.contains(path)
    }

    /// Uploads only, in order, as `(cwd, name)`
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Upload { cwd, name, .. } => Some((cwd.clone(), name.clone())),
                _ => None,
            })
            .collect()
    }

    /// make_dirs calls only, in order, resolved to absolute paths
    pub fn created(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::MakeDirs { cwd, path } => Some(resolve_remote_path(cwd, path)),
                _ => None,
            })
            .collect()
    }
}

fn under(path: &str, root: &str) -> bool {
    path == root || path.starts_with(&format!("{}/", root))
}

#[async_trait]
impl RemoteSession for FakeRemote {
    fn cwd(&self) -> &str {
        &self.cwd
    }

    fn set_cwd(&mut self, path: String) {
        self.cwd = path;
    }

    async fn exists(&mut self, path: &str) -> Result<bool, SftpError> {
        self.calls.push(Call::Exists(path.to_string()));
        let path = resolve_remote_path(&self.cwd, path);
        Ok(self.dirs.contains(&path) || self.files.contains_key(&path))
    }

    async fn remove_recursive(&mut self, path: &str) -> Result<u64, SftpError> {
        self.calls.push(Call::RemoveRecursive(path.to_string()));
        let root = resolve_remote_path(&self.cwd, path);
        if self.fail_remove {
            return Err(SftpError::PermissionDenied(root));
        }
        let before = self.dirs.len() + self.files.len();
        self.dirs.retain(|d| !under(d, &root));
        self.files.retain(|f, _| !under(f, &root));
        Ok((before - self.dirs.len() - self.files.len()) as u64)
    }

    async fn make_dirs(&mut self, path: &str) -> Result<(), SftpError> {
        self.calls.push(Call::MakeDirs {
            cwd: self.cwd.clone(),
            path: path.to_string(),
        });
        let path = resolve_remote_path(&self.cwd, path);
        self.add_dir(&path);
        Ok(())
    }

    async fn upload_file(
        &mut self,
        local_path: &Path,
        preserve_times: bool,
        progress: Option<ProgressCallback<'_>>,
    ) -> Result<u64, SftpError> {
        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.calls.push(Call::Upload {
            cwd: self.cwd.clone(),
            name: name.clone(),
            with_progress: progress.is_some(),
        });

        let remote = join_remote_path(&self.cwd, &name);
        if self.fail_upload.as_deref() == Some(name.as_str()) || !self.dirs.contains(&self.cwd) {
            return Err(SftpError::Upload {
                local: local_path.to_path_buf(),
                remote,
                message: "injected failure".to_string(),
            });
        }

        let content =
            std::fs::read(local_path).map_err(|e| SftpError::local(local_path, e))?;
        let total_bytes = content.len() as u64;
        if let Some(callback) = progress {
            // two chunks, like a real transfer would report
            callback(TransferProgress {
                transferred_bytes: total_bytes / 2,
                total_bytes,
            });
            callback(TransferProgress {
                transferred_bytes: total_bytes,
                total_bytes,
            });
        }
        if preserve_times {
            let modified = std::fs::metadata(local_path)
                .and_then(|m| m.modified())
                .map_err(|e| SftpError::local(local_path, e))?;
            self.mtimes.insert(remote.clone(), modified);
        }
        self.files.insert(remote, content);
        Ok(total_bytes)
    }
}
