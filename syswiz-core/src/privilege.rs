//! The privilege gate that runs before the menu becomes interactive.
//!
//! One interactive elevation attempt, then the session trusts the cached
//! credentials for its whole lifetime. There is deliberately no
//! per-operation re-validation; if the sudo timestamp lapses mid-session
//! the underlying command will fail and be reported like any other
//! non-zero exit.

use std::io;
use std::process::Command;

use log::{debug, info};
use nix::unistd::Uid;

use crate::errors::{WizError, WizResult};

/// Is the process already running with an effective root identity?
pub fn is_root() -> bool {
    Uid::effective().is_root()
}

/// Acquire elevated rights, blocking until resolved.
///
/// Already root: nothing to do. Otherwise `sudo -v` validates and caches
/// credentials on the controlling terminal; this must run before the TUI
/// takes the terminal into raw mode.
///
/// # Errors
///
/// `PrivilegeDenied` when authentication fails or is cancelled,
/// `SudoMissing` when there is no sudo binary at all.
pub fn ensure_elevated() -> WizResult<()> {
    if is_root() {
        debug!("already running as root, skipping sudo validation");
        return Ok(());
    }

    info!("validating sudo credentials");
    match Command::new("sudo").arg("-v").status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => {
            debug!("sudo -v exited with {status}");
            Err(WizError::PrivilegeDenied)
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => Err(WizError::SudoMissing),
        Err(error) => Err(WizError::Io(error)),
    }
}
