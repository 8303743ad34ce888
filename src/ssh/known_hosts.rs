//! Known hosts management for SSH host key verification

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use russh::keys::{PublicKey, PublicKeyBase64};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use super::error::SshError;

/// Result of host key verification
#[derive(Debug, Clone, PartialEq)]
pub enum HostKeyVerification {
    /// Key matches known_hosts entry
    Verified,
    /// Host not in known_hosts (first connection)
    Unknown { fingerprint: String },
    /// Key changed from known_hosts entry (potential MITM)
    Changed {
        expected_fingerprint: String,
        actual_fingerprint: String,
    },
}

/// Entry in known_hosts: (key_type, base64_key)
#[derive(Clone, Debug)]
struct HostKeyEntry {
    key_type: String,
    key_data: String,
}

/// Parsed known_hosts file
pub struct KnownHostsStore {
    /// host (or `[host]:port`) -> keys, several key types per host allowed
    hosts: HashMap<String, Vec<HostKeyEntry>>,
    /// Path to known_hosts file
    path: PathBuf,
}

impl KnownHostsStore {
    /// Path of the user's known_hosts file
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".ssh").join("known_hosts"))
            .unwrap_or_else(|| PathBuf::from("~/.ssh/known_hosts"))
    }

    /// Load the store from `path`; a missing file is an empty store
    pub fn with_path(path: PathBuf) -> Result<Self, SshError> {
        let mut store = Self {
            hosts: HashMap::new(),
            path,
        };
        store.load()?;
        Ok(store)
    }

    /// Load known_hosts file
    fn load(&mut self) -> Result<(), SshError> {
        if !self.path.exists() {
            debug!("No known_hosts file at {:?}", self.path);
            return Ok(());
        }

        let file = fs::File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut entry_count = 0;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            // Parse: hostname[,alias] keytype base64key [comment]
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                continue;
            }

            let entry = HostKeyEntry {
                key_type: parts[1].to_string(),
                key_data: parts[2].to_string(),
            };

            for hostname in parts[0].split(',') {
                // Hashed hostnames (|1|...) are not supported
                if hostname.starts_with('|') {
                    continue;
                }

                self.hosts
                    .entry(Self::normalize_hostname(hostname))
                    .or_default()
                    .push(entry.clone());
                entry_count += 1;
            }
        }

        info!(
            "Loaded {} known host entries ({} unique hosts)",
            entry_count,
            self.hosts.len()
        );
        Ok(())
    }

    /// Normalize hostname for lookup
    ///
    /// `[host]:22` is the same entry as `host`; other ports keep the bracket form.
    fn normalize_hostname(host: &str) -> String {
        let host = host.to_lowercase();
        match host.strip_prefix('[').and_then(|h| h.split_once("]:")) {
            Some((name, "22")) => name.to_string(),
            Some((name, port)) => format!("[{}]:{}", name, port),
            None => host,
        }
    }

    /// Create lookup key for host:port
    fn make_key(host: &str, port: u16) -> String {
        let host = host.to_lowercase();
        if port == 22 {
            host
        } else {
            format!("[{}]:{}", host, port)
        }
    }

    /// Compute SHA256 fingerprint of public key
    pub fn fingerprint(key: &PublicKey) -> String {
        Self::fingerprint_bytes(&key.public_key_bytes())
    }

    fn fingerprint_bytes(bytes: &[u8]) -> String {
        let hash = Sha256::digest(bytes);
        format!("SHA256:{}", BASE64.encode(hash).trim_end_matches('='))
    }

    /// Verify a host's public key
    pub fn verify(&self, host: &str, port: u16, key: &PublicKey) -> HostKeyVerification {
        let lookup_key = Self::make_key(host, port);
        let actual_key_b64 = BASE64.encode(key.public_key_bytes());
        let actual_key_type = key.algorithm().as_str().to_string();
        let fingerprint = Self::fingerprint(key);

        let Some(entries) = self.hosts.get(&lookup_key) else {
            debug!("Unknown host: {}", lookup_key);
            return HostKeyVerification::Unknown { fingerprint };
        };

        let same_type: Vec<&HostKeyEntry> = entries
            .iter()
            .filter(|e| e.key_type == actual_key_type)
            .collect();

        if same_type.iter().any(|e| e.key_data == actual_key_b64) {
            debug!(
                "Host key verified for {} (type: {})",
                lookup_key, actual_key_type
            );
            return HostKeyVerification::Verified;
        }
        if let Some(entry) = same_type.first() {
            return HostKeyVerification::Changed {
                expected_fingerprint: Self::compute_fingerprint_from_b64(&entry.key_data),
                actual_fingerprint: fingerprint,
            };
        }

        // Host known but not for this key type
        debug!(
            "Host {} known but no {} key stored, treating as new",
            lookup_key, actual_key_type
        );
        HostKeyVerification::Unknown { fingerprint }
    }

    /// Compute fingerprint from stored base64 key
    fn compute_fingerprint_from_b64(stored_b64: &str) -> String {
        match BASE64.decode(stored_b64) {
            Ok(bytes) => Self::fingerprint_bytes(&bytes),
            Err(_) => "unknown".to_string(),
        }
    }

    /// Record a new host key, in memory and in the known_hosts file
    pub fn add_host(&mut self, host: &str, port: u16, key: &PublicKey) -> Result<(), SshError> {
        let lookup_key = Self::make_key(host, port);
        let entry = HostKeyEntry {
            key_type: key.algorithm().as_str().to_string(),
            key_data: BASE64.encode(key.public_key_bytes()),
        };

        // Ensure .ssh directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{} {} {}", lookup_key, entry.key_type, entry.key_data)?;

        info!(
            "Added host key for {} (type: {}) to {:?}",
            lookup_key, entry.key_type, self.path
        );
        self.hosts.entry(lookup_key).or_default().push(entry);
        Ok(())
    }
}
