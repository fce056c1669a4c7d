use clap::Parser;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "syswiz - a transparent, guided wizard for Fedora package management"
)]
pub struct Cli {
    /// Preview commands in the wizard without ever executing them.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the Fedora distro check. Intended for development hosts only;
    /// the catalog still drives DNF.
    #[arg(long)]
    pub skip_distro_check: bool,
}
