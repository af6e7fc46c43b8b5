use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// A log file larger than this is cut down before the run appends to it
const TRIM_ABOVE_BYTES: u64 = 5 * 1024 * 1024;
/// How much of the newest output survives a trim
const RETAIN_BYTES: u64 = 1024 * 1024;

const TRIM_MARKER: &[u8] = b"--- earlier log output discarded ---\n";

/// The last `len` bytes of `path`, starting at a line boundary
fn read_tail(path: &Path, len: u64) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let total = file.metadata()?.len();
    file.seek(SeekFrom::Start(total.saturating_sub(len)))?;
    let mut tail = Vec::new();
    file.read_to_end(&mut tail)?;

    // The cut usually lands mid-line
    if let Some(newline) = tail.iter().position(|&b| b == b'\n') {
        tail.drain(..=newline);
    }
    Ok(tail)
}

/// Cut `path` down to its newest output once it grows past the trim limit.
/// Returns whether anything was discarded.
fn trim_oversized_log(path: &Path) -> io::Result<bool> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if size <= TRIM_ABOVE_BYTES {
        return Ok(false);
    }

    let tail = read_tail(path, RETAIN_BYTES)?;
    let mut file = File::create(path)?;
    file.write_all(TRIM_MARKER)?;
    file.write_all(&tail)?;
    Ok(true)
}

/// The log file behind every tracing writer; each event locks it briefly
#[derive(Clone)]
struct SharedLogFile(Arc<Mutex<File>>);

struct LogFileHandle(Arc<Mutex<File>>);

impl LogFileHandle {
    fn lock(&self) -> io::Result<MutexGuard<'_, File>> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))
    }
}

impl Write for LogFileHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedLogFile {
    type Writer = LogFileHandle;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileHandle(Arc::clone(&self.0))
    }
}

fn env_filter(level: &str) -> EnvFilter {
    let default_filter = format!("flowplan={level},flowplan_core={level}");
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter))
}

/// Install the global tracing subscriber.
///
/// Events go to stderr unless `log_file` is given, keeping stdout for the
/// report. A log file is appended to, after being cut down to its newest
/// megabyte if it has passed five. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str, log_file: Option<&Path>) -> color_eyre::Result<()> {
    let Some(log_path) = log_file else {
        tracing_subscriber::registry()
            .with(env_filter(level))
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .init();
        return Ok(());
    };

    if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let trimmed = trim_oversized_log(log_path).unwrap_or_else(|e| {
        eprintln!("warning: could not trim {}: {e}", log_path.display());
        false
    });

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let shared = SharedLogFile(Arc::new(Mutex::new(file)));

    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(
            fmt::layer()
                .with_writer(shared)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        )
        .init();

    tracing::info!(log_path = %log_path.display(), trimmed, "logging to file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_log_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flowplan.log");
        fs::write(&path, "one\ntwo\n").unwrap();

        assert!(!trim_oversized_log(&path).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");

        // Missing files are fine too
        assert!(!trim_oversized_log(&dir.path().join("absent.log")).unwrap());
    }

    #[test]
    fn test_large_log_trimmed_to_newest_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flowplan.log");
        let line = "2025 INFO flowplan_core: appreciated corpus=bank\n";
        let lines = (TRIM_ABOVE_BYTES as usize / line.len()) + 10;
        let mut content = String::with_capacity(lines * line.len() + 16);
        for _ in 0..lines {
            content.push_str(line);
        }
        content.push_str("last line\n");
        fs::write(&path, &content).unwrap();

        assert!(trim_oversized_log(&path).unwrap());

        let trimmed = fs::read(&path).unwrap();
        assert!(trimmed.starts_with(TRIM_MARKER));
        assert!(trimmed.len() as u64 <= RETAIN_BYTES + TRIM_MARKER.len() as u64);

        let text = String::from_utf8(trimmed).unwrap();
        assert!(text.ends_with("last line\n"));
        // No partial line after the marker
        let body = &text[TRIM_MARKER.len()..];
        assert!(body.starts_with(line) || body.starts_with("last line"));
    }
}
