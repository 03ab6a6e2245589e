use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::{Context, ContextCompat, Result};
use serde::Serialize;

pub fn ensure_dirs(dirs: &[PathBuf]) -> Result<()> {
    for dir in dirs {
        fs::create_dir_all(dir).with_context(|| format!("Create {}", dir.display()))?;
    }
    Ok(())
}

pub fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Invalid filepath: {path:?}"))
}

/// Dumps the data behind a plot to `plot_data/<name>.json` next to the plot itself
pub fn write_plot_data<T: Serialize>(plot_dir: &Path, name: &str, data: &T) -> Result<PathBuf> {
    let plot_data_dir = plot_dir.join("plot_data");
    ensure_dirs(std::slice::from_ref(&plot_data_dir))?;
    let data_path = plot_data_dir.join(format!("{name}.json"));
    fs::write(&data_path, serde_json::to_string_pretty(data)?)
        .with_context(|| format!("Write {}", data_path.display()))?;
    Ok(data_path)
}

/// Runs `f` with a subscriber that records every event, returning the formatted log
#[cfg(test)]
pub(crate) fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let buffer = Buffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}
