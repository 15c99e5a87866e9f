use {
    crate::error::{NavError, NavResult},
    std::io::{BufRead, Write},
};

/// Line-oriented input source. Once closed, every read fails with
/// [`NavError::ReaderClosed`].
pub struct ConsoleReader<R> {
    inner: Option<R>,
}

impl<R: BufRead> ConsoleReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner: Some(inner) }
    }

    /// Reads one line without its trailing newline. `Ok(None)` means the source is exhausted.
    pub fn read_line(&mut self) -> NavResult<Option<String>> {
        let reader = self.inner.as_mut().ok_or(NavError::ReaderClosed)?;
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Drops the underlying source. Closing again does nothing.
    pub fn close(&mut self) {
        self.inner = None;
    }
}

/// Output sink that flushes after every write. Writes after [`close`](Self::close) fail with
/// [`NavError::WriterClosed`].
pub struct ConsoleWriter<W: Write> {
    inner: W,
    open: bool,
}

impl<W: Write> ConsoleWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, open: true }
    }

    pub fn write(&mut self, message: &str) -> NavResult<()> {
        if !self.open {
            return Err(NavError::WriterClosed);
        }
        self.inner.write_all(message.as_bytes())?;
        self.inner.flush()?;
        Ok(())
    }

    pub fn write_line(&mut self, message: &str) -> NavResult<()> {
        self.write(&format!("{message}\n"))
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Flushes and marks the writer closed. Closing again does nothing.
    pub fn close(&mut self) -> NavResult<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.inner.flush()?;
        Ok(())
    }

    /// The wrapped sink, e.g. the buffer a test wrote into.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }
}
