//! Upload run orchestration
//!
//! settings resolution -> optional save -> connect -> replace remote
//! directory -> mirror local data -> disconnect

use tracing::{debug, info, warn};

use crate::cli::Args;
use crate::config::{PresetSource, PromptSource, SettingsResolver, SettingsStore, UploadSettings};
use crate::deploy::{mirror, replace_remote_dir, MirrorSummary, RemoteSession};
use crate::error::AppError;
use crate::prompt::{AssumeYes, Prompter, TerminalPrompter};
use crate::sftp::SftpSession;
use crate::ssh::{SshClient, SshConfig};

/// Run one upload as described by the command line
pub async fn run(args: Args) -> Result<(), AppError> {
    let store = SettingsStore::with_path(args.settings_file.clone());
    let mut prompter: Box<dyn Prompter> = if args.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalPrompter::stdio())
    };

    let settings = resolve_settings(args.flags(), &store, args.save, prompter.as_mut()).await?;
    debug!("Resolved settings: {:?}", settings);

    let config = SshConfig::from_settings(&settings)
        .with_known_hosts(args.known_hosts.clone())
        .with_strict_host_key_checking(args.strict_host_key_checking);
    let ssh = SshClient::new(config).connect().await?;
    let mut session = SftpSession::open(ssh).await?;
    println!("Connection successful to {}", settings.target());

    let outcome = tokio::select! {
        result = deploy(&mut session, &settings, prompter.as_mut()) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, closing connection");
            Err(AppError::UserAborted("interrupted".to_string()))
        }
    };

    session.close().await;

    let summary = outcome?;
    println!(
        "Upload complete: {} directories, {} files, {} bytes",
        summary.directories, summary.files, summary.bytes
    );
    Ok(())
}

/// Merge flags, saved settings and prompts, then persist when asked to
///
/// Saved settings are only used when the user agrees to load them. They are
/// written back when `save` is set, or after confirmation when a flag
/// changed a loaded value.
pub async fn resolve_settings(
    flags: PresetSource,
    store: &SettingsStore,
    save: bool,
    prompter: &mut dyn Prompter,
) -> Result<UploadSettings, AppError> {
    let loaded = if store.exists().await
        && prompter
            .confirm(&format!(
                "Do you want to load previous settings from file {} ?",
                store.path().display()
            ))
            .await?
    {
        store.load().await?
    } else {
        None
    };

    let mut resolver = SettingsResolver::new().source(flags);
    if let Some(loaded) = &loaded {
        info!("Loaded settings from {}", store.path().display());
        resolver = resolver.source(PresetSource::from_settings(loaded));
    }
    let resolution = resolver.source(PromptSource::new(prompter)).resolve().await?;

    let overridden = match &loaded {
        Some(loaded) => resolution.overrides(loaded).await,
        None => false,
    };
    let persist = save
        || (overridden
            && prompter
                .confirm("Do you want to save these settings for later use?")
                .await?);

    if persist {
        store.save(&resolution.settings).await?;
        println!("Settings successfully saved to {}", store.path().display());
    }

    Ok(resolution.settings)
}

/// Replace the remote folder, then mirror the local data into it
pub async fn deploy(
    session: &mut dyn RemoteSession,
    settings: &UploadSettings,
    prompter: &mut dyn Prompter,
) -> Result<MirrorSummary, AppError> {
    replace_remote_dir(session, &settings.remote_folder, prompter).await?;
    mirror(session, &settings.data, &settings.remote_folder).await
}
