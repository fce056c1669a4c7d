//! Host capability check, run before anything takes over the terminal.
//!
//! Confirms the distro is Fedora and that the dnf tool is resolvable,
//! and collects the version strings the splash screen displays. The
//! wizard core assumes this has passed and never re-verifies per
//! operation.

use std::fs;
use std::process::Command;

use anyhow::{bail, Context};

/// What the splash screen reports about the host.
#[derive(Debug, Clone)]
pub struct SystemInfo {
    pub os: String,
    pub os_version: String,
    pub dnf_version: String,
}

pub fn run(skip_distro_check: bool) -> anyhow::Result<SystemInfo> {
    let (os, os_version) = detect_distro()?;

    if !skip_distro_check && os != "fedora" {
        bail!(
            "syswiz is designed strictly for Fedora Linux.\n\
             Safety abort: detected `{os}` instead.\n\
             (Use --skip-distro-check to override on a development host.)"
        );
    }

    let dnf_version = detect_dnf_version()?;

    Ok(SystemInfo {
        os: if os == "fedora" {
            "Fedora Linux".to_string()
        } else {
            os
        },
        os_version,
        dnf_version,
    })
}

/// Parse ID= and VERSION_ID= out of /etc/os-release.
fn detect_distro() -> anyhow::Result<(String, String)> {
    let contents =
        fs::read_to_string("/etc/os-release").context("could not read /etc/os-release")?;

    let field = |name: &str| {
        contents
            .lines()
            .find_map(|line| line.strip_prefix(name))
            .map(|value| value.trim().trim_matches('"').to_string())
    };

    let id = field("ID=").unwrap_or_else(|| "unknown".to_string());
    let version = field("VERSION_ID=").unwrap_or_else(|| "?".to_string());
    Ok((id, version))
}

fn detect_dnf_version() -> anyhow::Result<String> {
    let output = Command::new("dnf")
        .arg("--version")
        .output()
        .context("dnf executable not found; syswiz cannot manage packages without it")?;

    if !output.status.success() {
        bail!("`dnf --version` failed with {}", output.status);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = stdout
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().last())
        .unwrap_or("?")
        .to_string();
    Ok(version)
}
