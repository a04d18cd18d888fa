/// Compile-time configuration consumed by the logger.
///
/// These are deliberately constants rather than a runtime config file: the
/// logger must be usable before any configuration machinery is up. Pieces
/// that tests or embedding hosts need to override at runtime (target
/// directory, echo flag) have config structs with `Default` drawn from
/// these values.

/// Directory the daily log files are created in, relative to the working
/// directory.
pub const LOG_DIR: &str = "simple_log";

/// Suffix of generated log files, including the dot.
pub const LOG_FILE_EXT: &str = ".log";

/// `chrono` format string naming the file for the current day. This becomes
/// part of the file name, so it must not contain `/` or `.`.
pub const FILE_DATE_FORMAT: &str = "%Y_%m_%d";

/// `chrono` format string for the timestamp inside each record.
pub const RECORD_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// All timestamps (record timestamps and daily file names) are rendered in
/// UTC via `chrono::Utc`.
pub const TIMEZONE: &str = "UTC";

/// Echo every record to stdout as pretty-printed JSON.
pub const ECHO_STDOUT: bool = true;

/// Placeholder stored when a log call supplies no message.
pub const NO_MESSAGE: &str = "No message";

/// Placeholder stored when a log call supplies no params.
pub const NO_PARAMS: &str = "No parameters";
