//! A log file that rolls over once it grows past a size limit.
//!
//! The current file keeps its name; when it needs rotation it is renamed with
//! a timestamp suffix (`create_all_tables.log.20240101120000123`) and a fresh
//! file is opened. Rotated files older than the retention window are deleted
//! whenever the logger is opened.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

/// A size-based rolling log file.
#[derive(Debug)]
pub struct RollingLogger {
    path: PathBuf,
    file: File,
    written: u64,
    max_size: u64,
}

impl RollingLogger {
    /// Opens (or creates) the log file at `path`, creating missing parent
    /// directories and pruning rotated files older than `retention`.
    pub fn new(path: &Path, max_size: u64, retention: Duration) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        prune_rotated(path, retention)?;

        let file = open_append(path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path: path.to_owned(),
            file,
            written,
            max_size,
        })
    }

    fn needs_rotation(&self) -> bool {
        self.written > 0 && self.written >= self.max_size
    }

    fn flush_and_rotate(&mut self) -> io::Result<()> {
        self.flush()?;

        fs::rename(&self.path, self.rotated_path())?;

        self.file = open_append(&self.path)?;
        self.written = 0;

        Ok(())
    }

    /// First free `<path>.<timestamp>[.<n>]` name.
    fn rotated_path(&self) -> PathBuf {
        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S%3f").to_string();

        let mut candidate = with_suffix(&self.path, &stamp);
        let mut n = 1;
        while candidate.exists() {
            candidate = with_suffix(&self.path, &format!("{stamp}.{n}"));
            n += 1;
        }

        candidate
    }
}

impl Write for RollingLogger {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.needs_rotation() {
            self.flush_and_rotate()?;
        }

        let n = self.file.write(buf)?;
        self.written += n as u64;

        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{suffix}"));
    PathBuf::from(name)
}

/// Removes `<path>.*` files last modified before `now - retention`.
fn prune_rotated(path: &Path, retention: Duration) -> io::Result<()> {
    let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return Ok(());
    };

    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent.to_owned(),
        None => PathBuf::from("."),
    };

    let prefix = format!("{file_name}.");
    let cutoff = SystemTime::now().checked_sub(retention).unwrap_or(SystemTime::UNIX_EPOCH);

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_name().to_string_lossy().starts_with(&prefix) {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        if modified < cutoff {
            fs::remove_file(entry.path())?;
        }
    }

    Ok(())
}
