//! Authenticated SSH connection

use russh::client::{Handle, Msg};
use russh::Channel;
use tracing::{debug, info, warn};

use super::client::ClientHandler;
use super::error::SshError;

/// An authenticated SSH connection, owner of the russh handle
pub struct SshSession {
    handle: Handle<ClientHandler>,
    target: String,
}

impl SshSession {
    pub fn new(handle: Handle<ClientHandler>, target: String) -> Self {
        Self { handle, target }
    }

    /// `user@host:port` this session is connected to
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Open a session channel (used for the SFTP subsystem)
    pub async fn open_session_channel(&self) -> Result<Channel<Msg>, SshError> {
        debug!("Opening session channel on {}", self.target);
        self.handle
            .channel_open_session()
            .await
            .map_err(|e| SshError::ChannelError(e.to_string()))
    }

    /// Disconnect; failures are logged since the connection is going away anyway
    pub async fn disconnect(self) {
        if let Err(e) = self
            .handle
            .disconnect(russh::Disconnect::ByApplication, "Upload finished", "en")
            .await
        {
            warn!("Failed to disconnect from {}: {}", self.target, e);
            return;
        }
        info!("Disconnected from {}", self.target);
    }
}
