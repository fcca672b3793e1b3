use std::{
    fs::File,
    io::{self, BufWriter, Seek, SeekFrom, Write},
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{config::LOGGROUP_CONFIG, row::Row};

/// Destination for rendered rows. A writer may be shared by many streams, so
/// implementations take `&self` and serialise writes internally.
pub trait LogWriter: Send + Sync {
    fn write_row(&self, row: &Row) -> io::Result<()>;
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Any `io::Write` behind a mutex, e.g. an in-memory `Mutex<Vec<u8>>`.
impl<W: Write + Send> LogWriter for Mutex<W> {
    fn write_row(&self, row: &Row) -> io::Result<()> {
        writeln!(lock(self), "{row}")
    }

    fn flush(&self) -> io::Result<()> {
        lock(self).flush()
    }
}

pub struct LogFile {
    file: Mutex<BufWriter<File>>,
}

impl LogFile {
    /// Opens `path` for appending, creating it if needed.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let mut file = File::options()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        file.seek(SeekFrom::End(0))?;
        Ok(Self {
            file: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl LogWriter for LogFile {
    fn write_row(&self, row: &Row) -> io::Result<()> {
        let mut file = lock(&self.file);
        writeln!(file, "{row}")?;
        file.flush()
    }

    fn flush(&self) -> io::Result<()> {
        lock(&self.file).flush()
    }
}

#[derive(Debug)]
pub struct LogStdout {
    colored: bool,
}

impl LogStdout {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }
}

impl Default for LogStdout {
    fn default() -> Self {
        Self::new(LOGGROUP_CONFIG.color())
    }
}

impl LogWriter for LogStdout {
    fn write_row(&self, row: &Row) -> io::Result<()> {
        let line = if self.colored {
            row.colored()
        } else {
            row.to_string()
        };
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{line}")?;
        stdout.flush()
    }

    fn flush(&self) -> io::Result<()> {
        io::stdout().flush()
    }
}

#[derive(Debug)]
pub struct LogStderr {
    colored: bool,
}

impl LogStderr {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }
}

impl Default for LogStderr {
    fn default() -> Self {
        Self::new(LOGGROUP_CONFIG.color())
    }
}

impl LogWriter for LogStderr {
    fn write_row(&self, row: &Row) -> io::Result<()> {
        let line = if self.colored {
            row.colored()
        } else {
            row.to_string()
        };
        writeln!(io::stderr().lock(), "{line}")
    }
}
