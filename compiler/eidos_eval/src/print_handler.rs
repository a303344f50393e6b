//! Output streams.
//!
//! Scripts write to two streams: `output` (what `print()` and `cat()`
//! produce, plus echoed top-level results) and `diagnostics` (debug-point
//! traces). Each stream is a [`PrintHandlerImpl`]: stdout or stderr for
//! embedding in a process, an in-memory buffer for tests and hosts that
//! capture output, or silent.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

/// Print handler that captures output to a buffer.
pub struct BufferPrintHandler {
    buffer: Mutex<String>,
}

impl BufferPrintHandler {
    pub fn new() -> Self {
        BufferPrintHandler {
            buffer: Mutex::new(String::new()),
        }
    }

    pub fn println(&self, msg: &str) {
        let mut buf = self.buffer.lock();
        buf.push_str(msg);
        buf.push('\n');
    }

    pub fn print(&self, msg: &str) {
        self.buffer.lock().push_str(msg);
    }

    pub fn get_output(&self) -> String {
        self.buffer.lock().clone()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Default for BufferPrintHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Destination of one output stream.
pub enum PrintHandlerImpl {
    Stdout,
    Stderr,
    Buffer(BufferPrintHandler),
    Silent,
}

impl PrintHandlerImpl {
    /// Write `msg` followed by a newline.
    pub fn println(&self, msg: &str) {
        match self {
            Self::Stdout => {
                let mut out = std::io::stdout().lock();
                // A closed stdout is not the script's failure.
                let _ = writeln!(out, "{msg}");
            }
            Self::Stderr => {
                let _ = writeln!(std::io::stderr().lock(), "{msg}");
            }
            Self::Buffer(h) => h.println(msg),
            Self::Silent => {}
        }
    }

    /// Write `msg` as is.
    pub fn print(&self, msg: &str) {
        match self {
            Self::Stdout => {
                let mut out = std::io::stdout().lock();
                let _ = write!(out, "{msg}");
                let _ = out.flush();
            }
            Self::Stderr => {
                let _ = write!(std::io::stderr().lock(), "{msg}");
            }
            Self::Buffer(h) => h.print(msg),
            Self::Silent => {}
        }
    }

    /// Captured text; empty for handlers that do not capture.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(h) => h.get_output(),
            Self::Stdout | Self::Stderr | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(h) = self {
            h.clear();
        }
    }
}

/// Shared print handler.
pub type SharedPrintHandler = Arc<PrintHandlerImpl>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Stdout)
}

pub fn stderr_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Stderr)
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Buffer(BufferPrintHandler::new()))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Silent)
}

/// The two streams a script writes to.
#[derive(Clone)]
pub struct OutputStreams {
    pub output: SharedPrintHandler,
    pub diagnostics: SharedPrintHandler,
}

impl OutputStreams {
    /// `output` to stdout, `diagnostics` to stderr.
    pub fn stdio() -> Self {
        OutputStreams {
            output: stdout_handler(),
            diagnostics: stderr_handler(),
        }
    }

    /// Both streams captured in separate buffers.
    pub fn buffered() -> Self {
        OutputStreams {
            output: buffer_handler(),
            diagnostics: buffer_handler(),
        }
    }

    pub fn silent() -> Self {
        OutputStreams {
            output: silent_handler(),
            diagnostics: silent_handler(),
        }
    }
}

impl Default for OutputStreams {
    fn default() -> Self {
        Self::stdio()
    }
}
