//! SSH connection errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SshError {
    /// Address resolution, TCP connect or handshake failure
    #[error("Cannot reach {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Host key rejected: {0}")]
    HostKeyRejected(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    /// Reading or appending to the known_hosts file
    #[error("known_hosts: {0}")]
    KnownHosts(#[from] std::io::Error),

    #[error("SSH protocol error: {0}")]
    ProtocolError(String),

    /// Private key could not be read or decoded
    #[error("Unusable private key {0}")]
    KeyError(String),
}

// Required by russh for the client handler error type
impl From<russh::Error> for SshError {
    fn from(err: russh::Error) -> Self {
        SshError::ProtocolError(err.to_string())
    }
}
