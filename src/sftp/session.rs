//! SFTP Session management
//!
//! Provides SFTP file operations over an authenticated SSH connection.

use std::path::Path;
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use russh_sftp::client::error::Error as SftpErrorInner;
use russh_sftp::client::SftpSession as RusshSftpSession;
use russh_sftp::protocol::{FileAttributes, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use super::error::SftpError;
use super::path_utils::{join_remote_path, remote_ancestors, resolve_remote_path};
use super::types::{ProgressCallback, TransferProgress};
use crate::deploy::RemoteSession;
use crate::ssh::SshSession;

/// Upload chunk size
const CHUNK_SIZE: usize = 64 * 1024;

/// SFTP Session wrapper
pub struct SftpSession {
    /// russh SFTP session
    sftp: RusshSftpSession,
    /// SSH connection carrying the SFTP channel
    ssh: SshSession,
    /// Current working directory
    cwd: String,
}

impl SftpSession {
    /// Open the SFTP subsystem on an SSH connection
    pub async fn open(ssh: SshSession) -> Result<Self, SftpError> {
        info!("Opening SFTP subsystem on {}", ssh.target());

        let channel = ssh
            .open_session_channel()
            .await
            .map_err(|e| SftpError::ChannelError(e.to_string()))?;

        channel.request_subsystem(true, "sftp").await.map_err(|e| {
            SftpError::SubsystemNotAvailable(format!("Failed to request SFTP subsystem: {}", e))
        })?;

        let sftp = RusshSftpSession::new(channel.into_stream())
            .await
            .map_err(|e| SftpError::SubsystemNotAvailable(e.to_string()))?;

        // Initial working directory is the login directory
        let cwd = sftp
            .canonicalize(".")
            .await
            .map_err(|e| map_sftp_error(e, "canonicalize", "."))?;

        debug!("SFTP working directory: {}", cwd);
        Ok(Self { sftp, ssh, cwd })
    }

    /// Close the SFTP channel and disconnect
    pub async fn close(self) {
        let Self { sftp, ssh, .. } = self;
        drop(sftp);
        ssh.disconnect().await;
    }

    fn resolve(&self, path: &str) -> String {
        resolve_remote_path(&self.cwd, path)
    }

    async fn delete_recursive_inner(&self, path: &str, is_dir: bool) -> Result<u64, SftpError> {
        if !is_dir {
            self.sftp
                .remove_file(path)
                .await
                .map_err(|e| map_sftp_error(e, "remove file", path))?;
            return Ok(1);
        }

        let entries = self
            .sftp
            .read_dir(path)
            .await
            .map_err(|e| map_sftp_error(e, "read dir", path))?;

        let mut deleted_count = 0u64;
        for entry in entries {
            let name = entry.file_name();
            if name == "." || name == ".." {
                continue;
            }
            let metadata = entry.metadata();
            let child_is_dir = metadata.is_dir() && !metadata.is_symlink();
            let child = join_remote_path(path, &name);
            // Boxed to avoid infinite future size
            deleted_count += Box::pin(self.delete_recursive_inner(&child, child_is_dir)).await?;
        }

        self.sftp
            .remove_dir(path)
            .await
            .map_err(|e| map_sftp_error(e, "remove dir", path))?;
        Ok(deleted_count + 1)
    }
}

#[async_trait]
impl RemoteSession for SftpSession {
    fn cwd(&self) -> &str {
        &self.cwd
    }

    fn set_cwd(&mut self, path: String) {
        self.cwd = path;
    }

    async fn exists(&mut self, path: &str) -> Result<bool, SftpError> {
        let canonical_path = self.resolve(path);
        match self.sftp.metadata(canonical_path.as_str()).await {
            Ok(_) => Ok(true),
            Err(e) => match map_sftp_error(e, "stat", &canonical_path) {
                SftpError::FileNotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn remove_recursive(&mut self, path: &str) -> Result<u64, SftpError> {
        let canonical_path = self.resolve(path);
        info!("Recursively deleting: {}", canonical_path);

        let metadata = self
            .sftp
            .metadata(canonical_path.as_str())
            .await
            .map_err(|e| map_sftp_error(e, "stat", &canonical_path))?;

        let count = self
            .delete_recursive_inner(&canonical_path, metadata.is_dir())
            .await?;
        debug!("Deleted {} entries under {}", count, canonical_path);
        Ok(count)
    }

    async fn make_dirs(&mut self, path: &str) -> Result<(), SftpError> {
        let canonical_path = self.resolve(path);

        for dir in remote_ancestors(&canonical_path) {
            match self.sftp.metadata(dir.as_str()).await {
                Ok(metadata) if metadata.is_dir() => continue,
                Ok(_) => {
                    return Err(SftpError::Remote {
                        op: "mkdir",
                        path: dir,
                        message: "exists and is not a directory".to_string(),
                    })
                }
                Err(e) => match map_sftp_error(e, "stat", &dir) {
                    SftpError::FileNotFound(_) => {}
                    other => return Err(other),
                },
            }

            debug!("Creating directory: {}", dir);
            self.sftp
                .create_dir(dir.as_str())
                .await
                .map_err(|e| map_sftp_error(e, "mkdir", &dir))?;
        }
        Ok(())
    }

    async fn upload_file(
        &mut self,
        local_path: &Path,
        preserve_times: bool,
        mut progress: Option<ProgressCallback<'_>>,
    ) -> Result<u64, SftpError> {
        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                SftpError::local(
                    local_path,
                    std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"),
                )
            })?;
        let remote_path = join_remote_path(&self.cwd, &name);
        let upload_error = |message: String| SftpError::Upload {
            local: local_path.to_path_buf(),
            remote: remote_path.clone(),
            message,
        };

        let mut local_file = tokio::fs::File::open(local_path)
            .await
            .map_err(|e| SftpError::local(local_path, e))?;
        let metadata = local_file
            .metadata()
            .await
            .map_err(|e| SftpError::local(local_path, e))?;
        let total_bytes = metadata.len();

        debug!("Uploading {:?} to {} ({} bytes)", local_path, remote_path, total_bytes);

        let mut remote_file = self
            .sftp
            .create(remote_path.as_str())
            .await
            .map_err(|e| upload_error(e.to_string()))?;

        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut transferred = 0u64;

        loop {
            let bytes_read = local_file
                .read(&mut buffer)
                .await
                .map_err(|e| SftpError::local(local_path, e))?;

            if bytes_read == 0 {
                break; // EOF
            }

            remote_file
                .write_all(&buffer[..bytes_read])
                .await
                .map_err(|e| upload_error(e.to_string()))?;

            transferred += bytes_read as u64;

            if let Some(callback) = progress.as_deref_mut() {
                callback(TransferProgress {
                    transferred_bytes: transferred,
                    total_bytes,
                });
            }
        }

        remote_file
            .shutdown()
            .await
            .map_err(|e| upload_error(e.to_string()))?;

        if preserve_times {
            let attrs = FileAttributes {
                atime: metadata.accessed().ok().and_then(unix_seconds),
                mtime: metadata.modified().ok().and_then(unix_seconds),
                ..FileAttributes::empty()
            };
            self.sftp
                .set_metadata(remote_path.as_str(), attrs)
                .await
                .map_err(|e| upload_error(format!("failed to set timestamps: {}", e)))?;
        }

        info!("Uploaded {:?} -> {} ({} bytes)", local_path, remote_path, transferred);
        Ok(transferred)
    }
}

fn unix_seconds(time: std::time::SystemTime) -> Option<u32> {
    time.duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| u32::try_from(d.as_secs()).ok())
}

/// Map SFTP errors to our error type
fn map_sftp_error(err: SftpErrorInner, op: &'static str, path: &str) -> SftpError {
    match err {
        SftpErrorInner::Status(status) if status.status_code == StatusCode::NoSuchFile => {
            SftpError::FileNotFound(path.to_string())
        }
        SftpErrorInner::Status(status) if status.status_code == StatusCode::PermissionDenied => {
            SftpError::PermissionDenied(path.to_string())
        }
        other => SftpError::Remote {
            op,
            path: path.to_string(),
            message: other.to_string(),
        },
    }
}
