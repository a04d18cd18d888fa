use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::config;
use crate::record::LogRecord;
use crate::sink::{LogSink, SinkError};

/// Configuration for [`FileSink`]. Defaults come from [`config`].
#[derive(Clone, Debug)]
pub struct FileSinkConfig {
    /// Directory the daily files are created in.
    pub directory: PathBuf,
    /// Suffix of generated files, including the dot.
    pub extension: String,
    /// `chrono` format string naming the file for the current day.
    pub file_date_format: String,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(config::LOG_DIR),
            extension: config::LOG_FILE_EXT.to_string(),
            file_date_format: config::FILE_DATE_FORMAT.to_string(),
        }
    }
}

/// File-backed implementation of [`LogSink`] that appends one fixed-format
/// text block per record to a single file per calendar day.
///
/// The file is opened once, in append mode, and held for the lifetime of
/// the sink; existing content from the same day is never truncated.
pub struct FileSink {
    file: Mutex<Option<File>>,
    path: Option<PathBuf>,
}

impl FileSink {
    /// Open (or create) today's log file under the configured directory,
    /// creating the directory if absent.
    ///
    /// Preparation failures are absorbed: the returned sink has no active
    /// file and accepts appends as no-ops.
    pub fn open_daily(config: &FileSinkConfig) -> Self {
        let day = Utc::now().format(&config.file_date_format).to_string();
        let path = config.directory.join(format!("{}{}", day, config.extension));

        match Self::prepare(&config.directory, &path) {
            Ok(file) => FileSink {
                file: Mutex::new(Some(file)),
                path: Some(path),
            },
            Err(_) => FileSink {
                file: Mutex::new(None),
                path: None,
            },
        }
    }

    fn prepare(directory: &Path, path: &Path) -> std::io::Result<File> {
        std::fs::create_dir_all(directory)?;
        OpenOptions::new().create(true).append(true).open(path)
    }

    /// Path of the active file, if preparation succeeded.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Render the fixed-format block for one record. The `Params:` line is
    /// written only when the caller actually supplied params.
    fn render_block(record: &LogRecord) -> String {
        let mut block = String::with_capacity(256);

        block.push_str("\t======================= START ======================= \n\n");
        block.push_str(&format!("\t\tType: {}\n", record.severity));
        block.push_str(&format!("\t\tTime: {}\n", record.timestamp));
        block.push_str(&format!(
            "\t\tFile: {}\n",
            record.source_file.as_deref().unwrap_or("")
        ));
        block.push_str(&format!(
            "\t\tMethod: {}\n",
            record.source_method.as_deref().unwrap_or("")
        ));
        block.push_str(&format!("\t\tMessage: {}\n", record.message));
        if record.has_params() {
            block.push_str(&format!("\t\tParams: {}\n", record.params));
        }
        block.push_str("\n\t======================= END ======================= \n");

        block
    }
}

impl LogSink for FileSink {
    fn append(&self, record: &LogRecord) -> Result<(), SinkError> {
        let Ok(mut guard) = self.file.lock() else {
            return Ok(());
        };

        if let Some(file) = guard.as_mut() {
            let block = Self::render_block(record);
            file.write_all(block.as_bytes())?;
            file.flush()?;
        }

        Ok(())
    }
}
