//! Local tree to remote directory mirroring
//!
//! A single file is uploaded straight into the remote folder. A directory
//! is walked in pre-order; each local directory gets a remote counterpart
//! created relative to its parent's, and its regular files are uploaded
//! while that counterpart is the working directory.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use super::remote::{DirScope, RemoteSession};
use crate::error::AppError;
use crate::sftp::path_utils::to_posix_relative;
use crate::sftp::{SftpError, TransferProgress};

/// Totals of a completed mirror
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorSummary {
    pub directories: u64,
    pub files: u64,
    pub bytes: u64,
}

/// Upload `data` (file or directory) into `remote_folder`
///
/// The remote working directory is the same after return as before the
/// call, whether the mirror succeeded or not.
pub async fn mirror(
    session: &mut dyn RemoteSession,
    data: &Path,
    remote_folder: &str,
) -> Result<MirrorSummary, AppError> {
    let metadata =
        tokio::fs::metadata(data).await.map_err(|e| SftpError::local(data, e))?;

    if !metadata.is_dir() {
        return upload_single(session, data, remote_folder).await;
    }

    println!(
        "Recursively adding files & folder(s) to remote host in {}",
        remote_folder
    );

    let base = DirScope::enter(session, remote_folder);
    let mut scopes = Vec::new();
    let mut summary = MirrorSummary::default();

    let result = mirror_tree(session, data, &mut scopes, &mut summary).await;

    while let Some(scope) = scopes.pop() {
        scope.leave(session);
    }
    base.leave(session);

    result?;
    info!(
        "Mirrored {} directories, {} files ({} bytes)",
        summary.directories, summary.files, summary.bytes
    );
    Ok(summary)
}

async fn upload_single(
    session: &mut dyn RemoteSession,
    file: &Path,
    remote_folder: &str,
) -> Result<MirrorSummary, AppError> {
    let scope = DirScope::enter(session, remote_folder);

    let mut report = |progress: TransferProgress| {
        println!(
            "{} transferred out of {}",
            progress.transferred_bytes, progress.total_bytes
        );
    };
    let result = session.upload_file(file, true, Some(&mut report)).await;

    scope.leave(session);

    let bytes = result?;
    Ok(MirrorSummary {
        directories: 0,
        files: 1,
        bytes,
    })
}

/// Walk `root` and mirror it under the current working directory
///
/// `scopes` holds one entry per remote directory entered below the base;
/// the caller unwinds it.
async fn mirror_tree(
    session: &mut dyn RemoteSession,
    root: &Path,
    scopes: &mut Vec<DirScope>,
    summary: &mut MirrorSummary,
) -> Result<(), AppError> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_type().is_dir());

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            SftpError::local(path, e.into())
        })?;

        // back out of subtrees that are finished
        while scopes.len() > entry.depth() {
            if let Some(scope) = scopes.pop() {
                scope.leave(session);
            }
        }

        let relative = to_posix_relative(entry.path().strip_prefix(root).unwrap_or(Path::new("")));
        let remote_name = if entry.depth() == 0 {
            ".".to_string()
        } else {
            entry.file_name().to_string_lossy().to_string()
        };

        if entry.depth() > 0 {
            println!("Creating directory {}", relative);
        }
        session.make_dirs(&remote_name).await?;
        scopes.push(DirScope::enter(session, &remote_name));
        summary.directories += 1;

        let files = regular_files(entry.path()).await?;
        println!(
            "Changing directory to {} with {} files",
            relative,
            files.len()
        );

        for file in files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            println!("Transferring file {} in folder {}", name, relative);
            summary.bytes += session.upload_file(&file, true, None).await?;
            summary.files += 1;
        }
    }

    Ok(())
}

/// Regular files (symlinks followed) directly inside `dir`, sorted by name
async fn regular_files(dir: &Path) -> Result<Vec<PathBuf>, SftpError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| SftpError::local(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SftpError::local(dir, e))?
    {
        let path = entry.path();
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| SftpError::local(&path, e))?;
        if metadata.is_file() {
            files.push(path);
        } else if !metadata.is_dir() {
            debug!("Not a regular file, skipped: {:?}", path);
        }
    }
    files.sort();
    Ok(files)
}
