//! GiftDraw server entry point.
//!
//! # Responsibility
//! - Load configuration, start logging, open the store and serve HTTP.
//! - Exit non-zero on any startup failure.

use std::process::ExitCode;

use giftdraw_core::{core_version, init_logging, init_stderr_logging};
use giftdraw_server::{config::Config, start_server, state::AppState};
use log::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("giftdraw: configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let logging = match config.log_dir.as_deref() {
        Some(dir) => init_logging(&config.log_level, dir),
        None => init_stderr_logging(&config.log_level),
    };
    if let Err(err) = logging {
        eprintln!("giftdraw: logging error: {err}");
        return ExitCode::FAILURE;
    }

    info!("event=server_start module=server status=start version={}", core_version());
    config.describe();

    let state = match AppState::new(config) {
        Ok(state) => state,
        Err(err) => {
            error!("event=server_start module=server status=error error_code=db_open_failed error={err}");
            return ExitCode::FAILURE;
        }
    };

    match start_server(state).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_start module=server status=error error_code=serve_failed error={err}");
            ExitCode::FAILURE
        }
    }
}
