//! CLI smoke entry point.
//!
//! Opens an in-memory store to confirm `lcaflow_core` links and migrates.

use lcaflow_core::db::migrations::{current_version, latest_version};
use lcaflow_core::db::open_db_in_memory;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("lcaflow_core version={}", lcaflow_core::core_version());

    let conn = match open_db_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("lcaflow_core store=error error={err}");
            return ExitCode::FAILURE;
        }
    };
    match current_version(&conn) {
        Ok(version) => {
            println!("lcaflow_core schema={version}/{}", latest_version());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("lcaflow_core schema=error error={err}");
            ExitCode::FAILURE
        }
    }
}
