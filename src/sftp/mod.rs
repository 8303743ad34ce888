//! SFTP file transfer module
//!
//! Remote directory management and file upload over an SSH connection.

pub mod error;
pub mod path_utils;
pub mod session;
pub mod types;

pub use error::SftpError;
pub use session::SftpSession;
pub use types::{ProgressCallback, TransferProgress};
