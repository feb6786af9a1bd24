use thiserror::Error;
use uuid::Uuid;

use crate::dns::elevate::{ElevateError, PrivilegeExecutor};

#[derive(Error, Debug)]
pub enum PolicyError {
    #[error(transparent)]
    Elevation(#[from] ElevateError),
    #[error("sudoers document failed validation: {0}")]
    ValidationFailed(String),
    #[error("cannot determine a usable current user name")]
    MissingUser,
}

pub type Result<T> = std::result::Result<T, PolicyError>;

/// Executable the policy grants passwordless access to. The grant names the
/// absolute path; the switcher invokes it by name through the elevated
/// shell.
const NETWORKSETUP_PATH: &str = "/usr/sbin/networksetup";

/// Installed policy location. Files under /etc/sudoers.d must be mode 0440.
const SUDOERS_TARGET: &str = "/etc/sudoers.d/dns-switcher";

/// The name is interpolated into a shell command and a sudoers rule, so
/// quoting characters and whitespace are rejected outright.
fn is_safe_user_name(user: &str) -> bool {
    !user.is_empty()
        && !user.contains(|c: char| {
            c.is_whitespace() || c == '\'' || c == '"' || c == '\\' || c == '#'
        })
}

fn current_user() -> Result<String> {
    match std::env::var("USER") {
        Ok(user) if is_safe_user_name(&user) => Ok(user),
        _ => Err(PolicyError::MissingUser),
    }
}

/// Grants `user` passwordless access to networksetup, bare and with any
/// arguments. Rebuilt freshly on every install attempt.
fn build_policy_document(user: &str) -> String {
    format!(
        "# DNS Switcher - allow networksetup without password\n\
         {user} ALL=(ALL) NOPASSWD: {NETWORKSETUP_PATH}\n\
         {user} ALL=(ALL) NOPASSWD: {NETWORKSETUP_PATH} *"
    )
}

/// Write, validate, copy, chmod, cleanup, chained on `&&` so a document
/// that fails `visudo -c` is never copied into /etc/sudoers.d. The temp
/// file is orphaned only on a failed step before `rm`.
fn build_install_command(document: &str, temp_path: &str) -> String {
    [
        format!("echo '{document}' > {temp_path}"),
        format!("visudo -c -f {temp_path}"),
        format!("cp {temp_path} {SUDOERS_TARGET}"),
        format!("chmod 440 {SUDOERS_TARGET}"),
        format!("rm {temp_path}"),
    ]
    .join(" && ")
}

/// Installs the passwordless-access policy for the current user under a
/// single authorization prompt.
pub async fn install_passwordless_access(executor: &PrivilegeExecutor) -> Result<()> {
    let user = current_user()?;
    let document = build_policy_document(&user);
    let temp_path = format!("/tmp/dns-switcher-sudoers-{}", Uuid::new_v4());
    let command = build_install_command(&document, &temp_path);

    tracing::debug!("installing sudoers policy for {user}");
    match executor.run_elevated(&command).await {
        Ok(_) => {
            tracing::info!("sudoers policy installed at {SUDOERS_TARGET}");
            Ok(())
        }
        Err(ElevateError::CommandFailed(message))
            if message.contains("parse error") || message.contains("syntax error") =>
        {
            Err(PolicyError::ValidationFailed(message))
        }
        Err(e) => Err(e.into()),
    }
}
