use std::io;
use thiserror::Error;

pub type WizResult<T> = Result<T, WizError>;

#[derive(Error, Debug)]
pub enum WizError {
    #[error("Catalog integrity violation in \"{title}\": {problem}")]
    CatalogIntegrity { title: String, problem: String },

    #[error("Invalid navigation: {0}")]
    Navigation(String),

    #[error("Privilege escalation refused or failed. syswiz cannot manage packages without sudo rights.")]
    PrivilegeDenied,

    #[error("sudo executable not found on PATH")]
    SudoMissing,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
