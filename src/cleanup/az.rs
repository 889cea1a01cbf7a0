//! Thin wrappers around the `az` CLI.
//!
//! The harness drives Azure through the same CLI the deployment scripts use
//! rather than an SDK, so cleanup sees exactly what the scripts created.

use std::process::Command;

use tracing::debug;

use super::CleanupError;

/// Verify the `az` CLI is installed and on PATH.
pub fn check_az_installed() -> Result<(), CleanupError> {
    which::which("az").map_err(|_| CleanupError::AzNotFound)?;
    Ok(())
}

/// Verify an active `az login` session by running `az account show`.
pub async fn check_az_authenticated() -> Result<(), CleanupError> {
    let output = Command::new("az")
        .args(["account", "show", "--output", "none"])
        .output()
        .map_err(|e| CleanupError::CommandFailed {
            command: "az account show".to_string(),
            detail: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(CleanupError::NotAuthenticated(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(())
}

/// Run an `az` subcommand that emits JSON and return its stdout.
pub async fn az_json(args: &[&str]) -> Result<String, CleanupError> {
    debug!("Running az {}", args.join(" "));

    let output = Command::new("az")
        .args(args)
        .args(["--output", "json"])
        .output()
        .map_err(|e| CleanupError::CommandFailed {
            command: format!("az {}", args.join(" ")),
            detail: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(CleanupError::CommandFailed {
            command: format!("az {}", args.join(" ")),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|e| CleanupError::CommandFailed {
        command: format!("az {}", args.join(" ")),
        detail: format!("output is not valid UTF-8: {e}"),
    })
}

/// Run an `az` subcommand for its side effect, returning stderr on failure.
pub async fn az_run(args: &[&str]) -> Result<(), String> {
    debug!("Running az {}", args.join(" "));

    let output = match Command::new("az").args(args).output() {
        Ok(output) => output,
        Err(e) => return Err(e.to_string()),
    };

    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
    }
    Ok(())
}
