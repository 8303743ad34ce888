//! SSH Client implementation using russh

use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use russh::keys::key::PrivateKeyWithHashAlg;
use russh::keys::PublicKey;
use russh::*;
use tracing::{debug, info, warn};

use super::config::SshConfig;
use super::error::SshError;
use super::known_hosts::{HostKeyVerification, KnownHostsStore};
use super::session::SshSession;

/// SSH Client handler for russh
pub struct SshClient {
    config: SshConfig,
}

impl SshClient {
    pub fn new(config: SshConfig) -> Self {
        Self { config }
    }

    /// Connect to the SSH server and return an authenticated session
    pub async fn connect(self) -> Result<SshSession, SshError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!("Connecting to SSH server at {}", addr);

        let socket_addr = resolve_addr(&self.config.host, self.config.port)?;

        let ssh_config = client::Config {
            keepalive_interval: Some(Duration::from_secs(30)),
            keepalive_max: 3,
            ..Default::default()
        };

        let known_hosts = KnownHostsStore::with_path(
            self.config
                .known_hosts
                .clone()
                .unwrap_or_else(KnownHostsStore::default_path),
        )?;
        let handler = ClientHandler::new(
            self.config.host.clone(),
            self.config.port,
            self.config.strict_host_key_checking,
            known_hosts,
        );

        let mut handle = client::connect(Arc::new(ssh_config), socket_addr, handler)
            .await
            .map_err(|e| match e {
                SshError::ProtocolError(msg) => {
                    SshError::ConnectionFailed(format!("{}: {}", addr, msg))
                }
                other => other,
            })?;

        debug!("SSH handshake completed");

        let key = russh::keys::load_secret_key(&self.config.key_path, None).map_err(|e| {
            SshError::KeyError(format!("{}: {}", self.config.key_path.display(), e))
        })?;
        let key_with_hash = PrivateKeyWithHashAlg::new(Arc::new(key), None);

        let authenticated = handle
            .authenticate_publickey(&self.config.username, key_with_hash)
            .await
            .map_err(|e| SshError::AuthenticationFailed(e.to_string()))?;

        if !authenticated.success() {
            return Err(SshError::AuthenticationFailed(format!(
                "Server rejected key {} for user {}",
                self.config.key_path.display(),
                self.config.username
            )));
        }

        info!("SSH authentication successful");

        Ok(SshSession::new(
            handle,
            format!("{}@{}", self.config.username, addr),
        ))
    }
}

/// Resolve `host` (name, IPv4 or bare IPv6 literal) to its first address
fn resolve_addr(host: &str, port: u16) -> Result<SocketAddr, SshError> {
    (host, port)
        .to_socket_addrs()
        .map_err(|e| SshError::ConnectionFailed(format!("Failed to resolve {}: {}", host, e)))?
        .next()
        .ok_or_else(|| SshError::ConnectionFailed(format!("No address found for {}", host)))
}

/// Client handler for russh callbacks
///
/// Verifies the server host key against known_hosts.
pub struct ClientHandler {
    /// Target host for key verification
    host: String,
    /// Target port
    port: u16,
    /// Strict host key checking mode
    /// - true: reject unknown/changed keys
    /// - false: accept and record unknown keys (still reject changed)
    strict: bool,
    known_hosts: KnownHostsStore,
}

impl ClientHandler {
    pub fn new(host: String, port: u16, strict: bool, known_hosts: KnownHostsStore) -> Self {
        Self {
            host,
            port,
            strict,
            known_hosts,
        }
    }
}

impl client::Handler for ClientHandler {
    type Error = SshError;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        match self
            .known_hosts
            .verify(&self.host, self.port, server_public_key)
        {
            HostKeyVerification::Verified => {
                info!("Host key verified for {}:{}", self.host, self.port);
                Ok(true)
            }
            HostKeyVerification::Unknown { fingerprint } => {
                if self.strict {
                    warn!(
                        "Unknown host key for {}:{} (fingerprint: {}). Strict mode enabled, rejecting.",
                        self.host, self.port, fingerprint
                    );
                    return Err(SshError::HostKeyRejected(format!(
                        "unknown host {}:{}. Fingerprint: {}. \
                         Add it to known_hosts or drop --strict-host-key-checking.",
                        self.host, self.port, fingerprint
                    )));
                }

                warn!(
                    "New host {}:{}, adding to known_hosts (fingerprint: {})",
                    self.host, self.port, fingerprint
                );
                if let Err(e) = self
                    .known_hosts
                    .add_host(&self.host, self.port, server_public_key)
                {
                    warn!("Failed to save host key: {}", e);
                }
                Ok(true)
            }
            HostKeyVerification::Changed {
                expected_fingerprint,
                actual_fingerprint,
            } => {
                // ALWAYS reject changed keys - potential MITM attack
                warn!(
                    "HOST KEY CHANGED for {}:{}! Expected {}, got {}. POSSIBLE MITM ATTACK!",
                    self.host, self.port, expected_fingerprint, actual_fingerprint
                );
                Err(SshError::HostKeyRejected(format!(
                    "key for {}:{} has changed! Expected: {}, Actual: {}. \
                     If the key change is legitimate, remove the old key from known_hosts",
                    self.host, self.port, expected_fingerprint, actual_fingerprint
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_ip_literals() {
        let v6 = resolve_addr("::1", 2222).unwrap();
        assert!(v6.is_ipv6());
        assert_eq!(v6.port(), 2222);

        let v4 = resolve_addr("127.0.0.1", 22).unwrap();
        assert_eq!(v4, "127.0.0.1:22".parse::<SocketAddr>().unwrap());
    }
}
