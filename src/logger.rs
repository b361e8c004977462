use alloc::string::String;
use core::fmt::{self, Display, Formatter, Write};

use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

/// Ring buffer keeping the most recent log output
pub struct LogBuffer {
    buffer: Option<&'static mut [u8]>,
    index: usize,
}

impl LogBuffer {
    pub const fn new() -> Self {
        Self { buffer: None, index: 0 }
    }

    pub fn with_buffer(buffer: &'static mut [u8]) -> Self {
        Self { buffer: Some(buffer), index: 0 }
    }
}

impl Write for LogBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let buffer = match self.buffer.as_mut() {
            Some(buffer) if buffer.len() > 0 => buffer,
            _ => return Ok(()),
        };
        let size = buffer.len();
        let mut bytes = s.as_bytes();
        if bytes.len() > size {
            self.index += bytes.len() - size;
            bytes = &bytes[bytes.len() - size..];
        }
        let index = self.index % size;
        let partial_size = core::cmp::min(size - index, bytes.len());
        buffer[index..index + partial_size].copy_from_slice(&bytes[..partial_size]);
        buffer[..bytes.len() - partial_size].copy_from_slice(&bytes[partial_size..]);
        self.index += bytes.len();
        Ok(())
    }
}

impl Display for LogBuffer {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let buffer = match self.buffer.as_ref() {
            Some(buffer) if buffer.len() > 0 => buffer,
            _ => return Ok(()),
        };
        if self.index <= buffer.len() {
            return write!(f, "{}", String::from_utf8_lossy(&buffer[..self.index]));
        }
        let index = self.index % buffer.len();
        write!(f, "{}", String::from_utf8_lossy(&buffer[index..]))?;
        write!(f, "{}", String::from_utf8_lossy(&buffer[..index]))
    }
}

static LOG_BUFFER: Mutex<LogBuffer> = Mutex::new(LogBuffer::new());

pub struct Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut log_buffer = LOG_BUFFER.lock();
        writeln!(log_buffer, "[{:5}] {}", record.level(), record.args()).ok();
    }

    fn flush(&self) {}
}

static LOGGER: Logger = Logger;

pub fn init(buffer: &'static mut [u8], level: LevelFilter) {
    *LOG_BUFFER.lock() = LogBuffer::with_buffer(buffer);
    log::set_max_level(level);
    log::set_logger(&LOGGER).ok();
}

pub fn dump<W: Write>(w: &mut W) -> fmt::Result {
    write!(w, "{}", *LOG_BUFFER.lock())
}

mod test {
    #[allow(unused_imports)]
    use alloc::vec;

    #[test]
    fn test_log_buffer_wrap() {
        use core::fmt::Write;

        use super::LogBuffer;

        let buffer = std::boxed::Box::leak(std::boxed::Box::new([0u8; 8]));
        let mut log_buffer = LogBuffer::with_buffer(&mut buffer[..]);
        write!(log_buffer, "abcdef").unwrap();
        assert_eq!(alloc::format!("{}", log_buffer), "abcdef");
        write!(log_buffer, "ghij").unwrap();
        assert_eq!(alloc::format!("{}", log_buffer), "cdefghij");
        write!(log_buffer, "0123456789").unwrap();
        assert_eq!(alloc::format!("{}", log_buffer), "23456789");
    }

    #[test]
    fn test_empty_log_buffer() {
        use core::fmt::Write;

        use super::LogBuffer;

        let mut log_buffer = LogBuffer::new();
        write!(log_buffer, "dropped").unwrap();
        assert_eq!(alloc::format!("{}", log_buffer), "");
    }

    #[test]
    #[serial_test::serial]
    fn test_logger() {
        use crate::config::LogLevel;

        let buffer = std::boxed::Box::leak(std::vec![0u8; 4096].into_boxed_slice());
        super::init(buffer, LogLevel::Info.into());
        info!("waypoint logger {}", 42);
        debug!("filtered out");
        let mut output = alloc::string::String::new();
        super::dump(&mut output).unwrap();
        assert!(output.contains("[INFO ] waypoint logger 42\n"));
        assert!(!output.contains("filtered out"));
    }
}
