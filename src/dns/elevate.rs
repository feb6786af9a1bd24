use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Mutex;

#[derive(Error, Debug)]
pub enum ElevateError {
    #[error("authorization was denied")]
    Denied,
    #[error("elevated command failed: {0}")]
    CommandFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ElevateError>;

const APP_NAME: &str = "DNS Switcher";

/// AppleScript error code reported when the user dismisses the
/// authorization dialog.
const USER_CANCELED: &str = "-128";

const SYSTEM_NETWORK_ICON: &str =
    "/System/Library/CoreServices/CoreTypes.bundle/Contents/Resources/NetworkIcon.icns";

fn escape_applescript_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn normalize_error_message(msg: &str) -> String {
    msg.lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Ordered icon candidates for the authorization dialog: the app bundle's
/// resources, an `assets` directory beside the executable, then the system
/// network icon.
fn dialog_icon_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        candidates.push(dir.join("../Resources/icon.icns"));
        candidates.push(dir.join("assets").join("icon.icns"));
    }
    candidates.push(PathBuf::from(SYSTEM_NETWORK_ICON));
    candidates
}

fn resolve_dialog_icon(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|path| path.is_file()).cloned()
}

/// Runs shell commands under macOS Authorization Services via `osascript`.
///
/// Each [`run_elevated`](Self::run_elevated) call raises exactly one
/// authorization prompt; callers batch related sub-commands into a single
/// `&&`-joined string so they share it. Prompts are serialized internally,
/// so at most one is ever outstanding.
pub struct PrivilegeExecutor {
    prompt: String,
    icon: Option<PathBuf>,
    gate: Mutex<()>,
}

impl PrivilegeExecutor {
    pub fn new() -> Self {
        let icon = resolve_dialog_icon(&dialog_icon_candidates());
        match &icon {
            Some(path) => tracing::debug!("authorization dialog icon: {}", path.display()),
            None => tracing::debug!("no dialog icon found, prompt will use the system default"),
        }

        Self {
            prompt: format!("{APP_NAME} wants to make changes to your network configuration."),
            icon,
            gate: Mutex::new(()),
        }
    }

    /// The icon the authorization dialog is branded with, when any
    /// candidate resolved. Absence only degrades the prompt's appearance.
    #[allow(dead_code)]
    pub fn dialog_icon(&self) -> Option<&Path> {
        self.icon.as_deref()
    }

    /// Executes `command` with administrator privileges behind one
    /// authorization prompt. Returns the command's stdout.
    ///
    /// A dismissed prompt maps to [`ElevateError::Denied`]; any other
    /// failure carries the normalized stderr of the underlying command.
    pub async fn run_elevated(&self, command: &str) -> Result<String> {
        let script = format!(
            "do shell script \"{}\" with administrator privileges with prompt \"{}\"",
            escape_applescript_string(command),
            escape_applescript_string(&self.prompt),
        );

        let _prompt = self.gate.lock().await;
        let output = Command::new("osascript")
            .args(["-e", &script])
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains(USER_CANCELED) || stderr.contains("User canceled") {
                return Err(ElevateError::Denied);
            }
            return Err(ElevateError::CommandFailed(normalize_error_message(
                &stderr,
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Default for PrivilegeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_applescript_string() {
        assert_eq!(escape_applescript_string("plain"), "plain");
        assert_eq!(
            escape_applescript_string("say \"hi\""),
            "say \\\"hi\\\""
        );
        assert_eq!(escape_applescript_string("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_normalize_error_message() {
        assert_eq!(
            normalize_error_message("  execution error: \n\n  foo (-1)  \n"),
            "execution error: foo (-1)"
        );
        assert_eq!(normalize_error_message(""), "");
    }

    #[test]
    fn test_resolve_dialog_icon_first_existing_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.icns");
        let second = dir.path().join("second.icns");
        let third = dir.path().join("third.icns");
        std::fs::write(&second, b"icns").expect("write");
        std::fs::write(&third, b"icns").expect("write");

        let resolved =
            resolve_dialog_icon(&[missing.clone(), second.clone(), third]);
        assert_eq!(resolved, Some(second));

        assert_eq!(resolve_dialog_icon(&[missing]), None);
        assert_eq!(resolve_dialog_icon(&[]), None);
    }

    #[test]
    fn test_candidates_end_with_system_icon() {
        let candidates = dialog_icon_candidates();
        assert_eq!(
            candidates.last().map(|p| p.as_path()),
            Some(Path::new(SYSTEM_NETWORK_ICON))
        );
    }

    #[tokio::test]
    #[ignore]
    async fn test_run_elevated() {
        let executor = PrivilegeExecutor::new();
        let output = executor.run_elevated("echo elevated").await;
        assert!(output.expect("should succeed").contains("elevated"));
    }
}
