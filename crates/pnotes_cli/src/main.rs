//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `pnotes_core` linkage without the Flutter runtime.
//! - Print the resolved storage paths for quick local checks.

use pnotes_core::{core_version, CoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("pnotes_core version={}", core_version());
    match CoreConfig::from_env() {
        Ok(config) => {
            println!("data_dir={}", config.data_dir.display());
            println!("db_path={}", config.db_path.display());
            println!("log_dir={}", config.log_dir.display());
            println!("log_level={}", config.log_level);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("config error: {err}");
            ExitCode::FAILURE
        }
    }
}
