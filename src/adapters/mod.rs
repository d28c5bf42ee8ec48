#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
pub fn run() -> Result<(), crate::error::AppError> {
    use crate::adapters::cli::{Args, execute};
    use crate::chemistry::catalog::Catalog;

    let args = Args::parse();
    let catalog = Catalog::reference();

    execute(&args, &catalog)?;

    Ok(())
}
