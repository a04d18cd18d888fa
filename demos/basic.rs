use serde_json::json;
use tracing::{error, warn};

use daylog::init::install_global_handlers;
use daylog::logger::get_logger;
use daylog::record::LogRequest;

fn main() {
    let logger = get_logger();
    if let Err(err) = install_global_handlers(logger) {
        eprintln!("could not install global handlers: {}", err);
    }

    logger.info(
        "starting service",
        json!({"version": "0.1.0"}),
        Some(file!()),
        Some("main"),
    );

    // These go through the global interception layer.
    warn!(attempts = 3u64, "retrying connection");
    error!(user_id = 42u64, reason = "invalid password", "authentication failed");

    // Errors handled locally can still be recorded as exceptions.
    if let Err(err) = std::fs::read_to_string("definitely-missing.toml") {
        logger.exception(LogRequest::from_error(&err));
    }

    println!("{} records logged", logger.get_log().len());
}
