//! Remote target directory replacement

use tracing::info;

use super::remote::RemoteSession;
use crate::error::AppError;
use crate::prompt::Prompter;

/// Wipe `remote_folder` if present and recreate it empty
///
/// The user acknowledges before anything is deleted. The directory is
/// (re)created in both cases.
pub async fn replace_remote_dir(
    session: &mut dyn RemoteSession,
    remote_folder: &str,
    prompter: &mut dyn Prompter,
) -> Result<(), AppError> {
    let existed = session.exists(remote_folder).await?;
    if existed {
        println!("Removing previous contents of directory {}", remote_folder);
    } else {
        println!("Creating remote directory {}", remote_folder);
    }

    prompter.pause("Press Enter to continue...").await?;

    if existed {
        let removed = session.remove_recursive(remote_folder).await?;
        info!("Removed {} entries from {}", removed, remote_folder);
    }

    session.make_dirs(remote_folder).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deploy::fake::{Call, FakeRemote};
    use crate::prompt::tests::ScriptedPrompter;

    #[tokio::test]
    async fn test_existing_folder_is_removed_then_recreated() {
        let mut remote = FakeRemote::new("/home/u");
        remote.add_dir("/app/old");
        remote.add_file("/app/old/index.html", b"old");
        let mut prompter = ScriptedPrompter::default();

        replace_remote_dir(&mut remote, "/app", &mut prompter)
            .await
            .unwrap();

        assert_eq!(
            remote.calls,
            vec![
                Call::Exists("/app".to_string()),
                Call::RemoveRecursive("/app".to_string()),
                Call::MakeDirs {
                    cwd: "/home/u".to_string(),
                    path: "/app".to_string()
                },
            ]
        );
        assert!(remote.has_dir("/app"));
        assert!(!remote.has_dir("/app/old"));
        assert!(remote.files.is_empty());
        assert_eq!(prompter.asked, vec!["pause:Press Enter to continue..."]);
    }

    #[tokio::test]
    async fn test_missing_folder_is_created() {
        let mut remote = FakeRemote::new("/home/u");
        let mut prompter = ScriptedPrompter::default();

        replace_remote_dir(&mut remote, "/srv/app", &mut prompter)
            .await
            .unwrap();

        assert!(!remote
            .calls
            .iter()
            .any(|c| matches!(c, Call::RemoveRecursive(_))));
        assert!(remote.has_dir("/srv"));
        assert!(remote.has_dir("/srv/app"));
    }

    #[tokio::test]
    async fn test_aborted_pause_deletes_nothing() {
        let mut remote = FakeRemote::new("/home/u");
        remote.add_file("/app/keep.txt", b"keep");
        let mut prompter =
            crate::prompt::TerminalPrompter::new(&b""[..], Vec::new());

        let err = replace_remote_dir(&mut remote, "/app", &mut prompter)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UserAborted(_)));
        assert_eq!(remote.calls, vec![Call::Exists("/app".to_string())]);
        assert!(remote.files.contains_key("/app/keep.txt"));
    }

    #[tokio::test]
    async fn test_remote_failure_aborts() {
        let mut remote = FakeRemote::new("/home/u");
        remote.add_dir("/app");
        remote.fail_remove = true;
        let mut prompter = ScriptedPrompter::default();

        let err = replace_remote_dir(&mut remote, "/app", &mut prompter)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::RemoteIoFailure(_)));
        // nothing recreated after the failed delete
        assert!(!remote
            .calls
            .iter()
            .any(|c| matches!(c, Call::MakeDirs { .. })));
    }
}
