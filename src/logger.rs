use anyhow::Result;
use parking_lot::Mutex;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

pub const DEFAULT_RETENTION: usize = 10;

/// One log file per run. Lines are buffered and written on exit unless streaming.
pub struct SessionLogger {
    log_buffer: Mutex<Vec<String>>,
    log_path: PathBuf,
    log_dir: PathBuf,
    retention_count: usize,
    app_name: String,
    stream_to_stdout: bool,
}

impl SessionLogger {
    pub fn new(
        log_dir: PathBuf,
        app_name: &str,
        retention_count: usize,
        stream_to_stdout: bool,
    ) -> Result<Self> {
        fs::create_dir_all(&log_dir)?;

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let log_path = log_dir.join(format!("{}_{}.log", app_name, timestamp));

        let logger = Self {
            log_buffer: Mutex::new(Vec::new()),
            log_path,
            log_dir,
            retention_count,
            app_name: app_name.to_string(),
            stream_to_stdout,
        };

        logger.clean_old_logs()?;
        logger.log(format!("=== {} Session Started ===", app_name));

        Ok(logger)
    }

    pub fn log(&self, message: impl AsRef<str>) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let log_line = format!("[{}] {}", timestamp, message.as_ref());

        if self.stream_to_stdout {
            println!("{}", log_line);
            let _ = self.write_lines(std::iter::once(&log_line));
        } else {
            self.log_buffer.lock().push(log_line);
        }
    }

    fn write_lines<'a>(&self, lines: impl IntoIterator<Item = &'a String>) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        for line in lines {
            writeln!(file, "{}", line)?;
        }
        file.flush()?;
        Ok(())
    }

    /// Keeps the newest `retention_count - 1` logs so this session's file fits the budget.
    fn clean_old_logs(&self) -> Result<()> {
        let prefix = format!("{}_", self.app_name);
        let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = fs::read_dir(&self.log_dir)?
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                let is_ours = path.extension().and_then(|s| s.to_str()) == Some("log")
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(&prefix));
                if !is_ours {
                    return None;
                }
                let modified = entry.metadata().ok()?.modified().ok()?;
                Some((path, modified))
            })
            .collect();

        log_files.sort_by(|a, b| b.1.cmp(&a.1));

        for (path, _) in log_files.iter().skip(self.retention_count.saturating_sub(1)) {
            let _ = fs::remove_file(path);
        }

        Ok(())
    }

    pub fn flush_to_disk(&self) -> Result<()> {
        let mut buffer = self.log_buffer.lock();
        if buffer.is_empty() {
            return Ok(());
        }
        self.write_lines(buffer.iter())?;
        buffer.clear();
        Ok(())
    }

    pub fn finalize(&self) -> Result<()> {
        self.log(format!("=== {} Session Ended ===", self.app_name));
        self.flush_to_disk()
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// Feeds `tracing` events into a `SessionLogger`.
pub struct SessionLayer {
    logger: Arc<SessionLogger>,
}

impl SessionLayer {
    pub fn new(logger: Arc<SessionLogger>) -> Self {
        Self { logger }
    }

    fn wants(metadata: &Metadata<'_>) -> bool {
        let ours = metadata.target().starts_with(env!("CARGO_CRATE_NAME"));
        let threshold = if ours { Level::INFO } else { Level::WARN };
        *metadata.level() <= threshold
    }
}

impl<S: Subscriber> Layer<S> for SessionLayer {
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        Self::wants(metadata)
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let message = visitor.finish();
        let line = match *event.metadata().level() {
            Level::ERROR => format!("ERROR: {}", message),
            Level::WARN => format!("WARN: {}", message),
            Level::INFO => message,
            _ => format!("DEBUG: {}", message),
        };
        self.logger.log(line);
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: Vec<String>,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{} ({})", self.message, self.fields.join(", "))
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

static LOGGER: once_cell::sync::OnceCell<Arc<SessionLogger>> = once_cell::sync::OnceCell::new();

pub fn init_logger(
    log_dir: PathBuf,
    app_name: &str,
    retention_count: usize,
    stream_to_stdout: bool,
) -> Result<()> {
    let logger = SessionLogger::new(log_dir, app_name, retention_count, stream_to_stdout)?;
    let logger = Arc::new(logger);
    LOGGER
        .set(Arc::clone(&logger))
        .map_err(|_| anyhow::anyhow!("Logger already initialized"))?;

    let subscriber = tracing_subscriber::registry().with(SessionLayer::new(logger));
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Like `init_logger`, but an unusable log directory is not fatal: the cause goes
/// to stderr and events are written there instead. Returns whether the session
/// log file is active.
pub fn init_logger_or_stderr(
    log_dir: PathBuf,
    app_name: &str,
    retention_count: usize,
    stream_to_stdout: bool,
) -> bool {
    match init_logger(log_dir, app_name, retention_count, stream_to_stdout) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Session log unavailable, logging to stderr: {:#}", e);
            let _ = tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_max_level(Level::INFO)
                .try_init();
            false
        }
    }
}

pub fn finalize_logs() -> Result<()> {
    if let Some(logger) = LOGGER.get() {
        logger.finalize()?;
    }
    Ok(())
}

pub fn get_log_path() -> Option<PathBuf> {
    LOGGER.get().map(|logger| logger.log_path().to_path_buf())
}
