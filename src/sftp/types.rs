//! SFTP data types

/// Progress of a single file upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub transferred_bytes: u64,
    pub total_bytes: u64,
}

/// Callback invoked after every chunk written to the remote file
pub type ProgressCallback<'a> = &'a mut (dyn FnMut(TransferProgress) + Send);
