//! Tracing setup.
//!
//! The console layer is installed immediately. The general log file is
//! attached later through a reload handle, once the startup checks have
//! passed, so a run that aborts early leaves no log files behind.

use std::path::{Path, PathBuf};

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Layer, Registry};

use crate::error::{Error, Result};

type FileLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Owns the subscriber handles for the lifetime of the process.
///
/// Dropping it flushes the file writer.
pub struct LogSystem {
    file_handle: reload::Handle<Option<FileLayer>, Registry>,
    guard: Option<WorkerGuard>,
    log_file: Option<PathBuf>,
}

impl LogSystem {
    /// Install the global subscriber with console output only.
    ///
    /// `RUST_LOG` overrides the default level.
    pub fn init(debug: bool) -> Result<Self> {
        let (logs, subscriber) = Self::build(debug);
        subscriber
            .try_init()
            .map_err(|e| Error::Logging(e.to_string()))?;
        Ok(logs)
    }

    /// Build the subscriber without installing it.
    ///
    /// The file layer can only be attached while the returned subscriber is
    /// alive.
    pub fn build(debug: bool) -> (Self, impl Subscriber + Send + Sync + 'static) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level(debug)));

        let (file_layer, file_handle) = reload::Layer::new(None::<FileLayer>);

        let subscriber = tracing_subscriber::registry()
            .with(file_layer)
            .with(filter)
            .with(fmt::layer().with_target(false));

        let logs = Self {
            file_handle,
            guard: None,
            log_file: None,
        };
        (logs, subscriber)
    }

    /// Start writing to `<logs_dir>/instagram_downloader_<timestamp>.log`.
    pub fn attach_file(&mut self, logs_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(logs_dir)?;

        let name = log_file_name(chrono::Local::now());
        let appender = rolling::never(logs_dir, &name);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let layer = fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_writer(writer)
            .boxed();

        self.file_handle
            .reload(Some(layer))
            .map_err(|e| Error::Logging(e.to_string()))?;

        let path = logs_dir.join(name);
        self.guard = Some(guard);
        self.log_file = Some(path.clone());
        Ok(path)
    }

    /// Path of the general log file, once attached.
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

fn default_level(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

fn log_file_name<Tz>(now: chrono::DateTime<Tz>) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("instagram_downloader_{}.log", now.format("%Y%m%d_%H%M%S"))
}
