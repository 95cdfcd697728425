//! CLI probe for the onboarding store.
//!
//! # Responsibility
//! - Open (and migrate) an onboarding database, file or in-memory.
//! - Optionally load a station config and start file logging from it.
//! - Print crate and schema versions for quick local sanity checks.
//!
//! Usage: `onboard_cli [DB_PATH] [CONFIG_JSON]`.

use onboard_core::db::migrations::{current_user_version, latest_version};
use onboard_core::db::{open_db, open_db_in_memory};
use onboard_core::load_config;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let db_path = args.next();
    let config_path = args.next();

    if let Some(config_path) = config_path.as_deref() {
        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("onboard_core config failed: {err}");
                return ExitCode::FAILURE;
            }
        };
        if let Err(err) = config.start_logging() {
            eprintln!("onboard_core logging failed: {err}");
            return ExitCode::FAILURE;
        }
        println!(
            "onboard_core station={}/{} lang={}",
            config.center_id, config.station_id, config.language_code
        );
    }

    let opened = match db_path.as_deref() {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    };

    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("onboard_core open failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("onboard_core version={}", onboard_core::core_version());
    match current_user_version(&conn) {
        Ok(version) => {
            println!("onboard_core schema={version}/{}", latest_version());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("onboard_core schema check failed: {err}");
            ExitCode::FAILURE
        }
    }
}
