use std::io::stdout;

use clap::Parser;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use log::info;

use syswiz_core::catalog::Catalog;
use syswiz_core::privilege;

mod cli;
mod preflight;
mod tui;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = cli::Cli::parse();

    // Clean start.
    execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0))?;

    let system_info = preflight::run(cli.skip_distro_check)?;
    info!(
        "preflight ok: {} {} / dnf {}",
        system_info.os, system_info.os_version, system_info.dnf_version
    );

    // Fails fast on a malformed definition before any screen appears.
    let catalog = Catalog::stock()?;

    let elevate = !privilege::is_root();
    if cli.dry_run {
        info!("dry-run mode: skipping privilege validation");
    } else if let Err(err) = privilege::ensure_elevated() {
        anyhow::bail!(
            "{err}\n\
             syswiz cannot modify system packages without permissions.\n\
             Exiting gracefully."
        );
    }

    let mut app = tui::App::new(catalog, system_info, cli.dry_run, elevate);
    tui::run(&mut app)
}
