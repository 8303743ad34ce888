//! Command line arguments

use std::path::PathBuf;

use crate::config::{Field, PresetSource, Tier, DEFAULT_SETTINGS_FILE};

/// Auto upload
///
/// Replaces a remote directory over SFTP with the contents of a local file
/// or directory. Values not given on the command line are taken from the
/// settings file or asked for interactively.
#[derive(clap::Parser, Debug)]
#[command(name = "autoupload", version)]
pub struct Args {
    /// Remote host to upload files to
    #[arg(long)]
    pub host: Option<String>,
    /// SSH port of the remote host
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,
    /// Remote user name
    #[arg(long)]
    pub user: Option<String>,
    /// Private key used for authentication
    #[arg(long)]
    pub private_key: Option<PathBuf>,
    /// Local file or directory to upload
    #[arg(long)]
    pub data: Option<PathBuf>,
    /// Remote directory to replace
    #[arg(long)]
    pub remote_folder: Option<String>,
    /// Save the resolved settings without asking
    #[arg(short, long)]
    pub save: bool,
    /// Settings file location
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    pub settings_file: PathBuf,
    /// Answer yes to every question and never wait for input
    #[arg(short = 'y', long)]
    pub yes: bool,
    /// known_hosts file (default: ~/.ssh/known_hosts)
    #[arg(long, help_heading = "SSH")]
    pub known_hosts: Option<PathBuf>,
    /// Refuse hosts whose key is not already known
    #[arg(long, help_heading = "SSH")]
    pub strict_host_key_checking: bool,
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Values supplied on the command line, as the highest precedence source
    pub fn flags(&self) -> PresetSource {
        PresetSource::new(Tier::Flag)
            .with(Field::Host, self.host.as_deref())
            .with(Field::Port, self.port)
            .with(Field::User, self.user.as_deref())
            .with(Field::PrivateKey, self.private_key.as_ref().map(|p| p.display()))
            .with(Field::Data, self.data.as_ref().map(|p| p.display()))
            .with(Field::RemoteFolder, self.remote_folder.as_deref())
    }

    /// Default log filter for the requested verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory as _, Parser as _};

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["autoupload"]).unwrap();
        assert_eq!(args.settings_file, PathBuf::from("settings.json"));
        assert!(!args.save);
        assert!(!args.yes);
        assert_eq!(args.log_level(), "warn");
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "autoupload",
            "--host",
            "example.com",
            "-p",
            "2222",
            "--user",
            "deploy",
            "--private-key",
            "/keys/id",
            "--data",
            "./site",
            "--remote-folder",
            "/var/www",
            "-s",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.host.as_deref(), Some("example.com"));
        assert_eq!(args.port, Some(2222));
        assert_eq!(args.private_key, Some(PathBuf::from("/keys/id")));
        assert_eq!(args.remote_folder.as_deref(), Some("/var/www"));
        assert!(args.save);
        assert_eq!(args.log_level(), "debug");
    }

    #[test]
    fn test_port_range() {
        assert!(Args::try_parse_from(["autoupload", "--port", "0"]).is_err());
        assert!(Args::try_parse_from(["autoupload", "--port", "65536"]).is_err());
        assert!(Args::try_parse_from(["autoupload", "--port", "ssh"]).is_err());
    }
}
