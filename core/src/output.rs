//! The process-wide output sink.
//!
//! Help, version, usage errors and not-found messages are written through an
//! [`Output`] shared by every resolution level of one app. Resolution is
//! single-threaded, so the sink uses interior mutability rather than locks.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

/// Shared writer for help and diagnostic text.
pub struct Output {
    inner: RefCell<Box<dyn Write>>,
}

impl Output {
    /// Writes to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Writes to any sink.
    pub fn new(writer: impl Write + 'static) -> Self {
        Self {
            inner: RefCell::new(Box::new(writer)),
        }
    }

    /// Creates a sink that records everything written to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdtree_core::Output;
    ///
    /// let (output, captured) = Output::capture();
    /// output.write_str("hello\n").unwrap();
    /// assert_eq!(captured.contents(), "hello\n");
    /// ```
    pub fn capture() -> (Self, Captured) {
        let captured = Captured::default();
        (Self::new(captured.clone()), captured)
    }

    /// Writes formatted text.
    pub fn write_fmt(&self, args: fmt::Arguments<'_>) -> io::Result<()> {
        self.inner.borrow_mut().write_fmt(args)
    }

    pub fn write_str(&self, text: &str) -> io::Result<()> {
        self.inner.borrow_mut().write_all(text.as_bytes())
    }

    /// Runs `f` with exclusive access to the underlying writer.
    pub fn with_writer<T>(&self, f: impl FnOnce(&mut dyn Write) -> T) -> T {
        let mut writer = self.inner.borrow_mut();
        f(writer.as_mut())
    }

    pub fn flush(&self) -> io::Result<()> {
        self.inner.borrow_mut().flush()
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::stdout()
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output").finish_non_exhaustive()
    }
}

/// Handle to text recorded by [`Output::capture`].
#[derive(Debug, Clone, Default)]
pub struct Captured {
    buffer: Rc<RefCell<Vec<u8>>>,
}

impl Captured {
    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.borrow()).into_owned()
    }

    pub fn clear(&self) {
        self.buffer.borrow_mut().clear();
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
