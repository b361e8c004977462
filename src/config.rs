use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use hal::io::Read;
use log::LevelFilter;

use crate::sys::fs::{File, Media};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub log_level: LogLevel,
    /// Non-volatile cell holding the active waypoint index
    pub cursor_address: u16,
    /// Route file on the media
    pub route: String,
    /// Start over when the stored index is past the end of the loaded route
    pub restart_completed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            cursor_address: 0,
            route: "route.json".into(),
            restart_completed: false,
        }
    }
}

pub fn read_config<E>(reader: &mut dyn Read<Error = E>) -> Option<Config> {
    let mut bytes = Vec::new();
    let mut buffer = [0u8; 128];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(size) => bytes.extend_from_slice(&buffer[..size]),
            Err(_) => return None,
        }
    }
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice(&bytes) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Config ignored: {}", e);
            None
        }
    }
}

/// Falls back to defaults when the file is absent or unreadable
pub fn load(media: &dyn Media, path: &str) -> Config {
    let config = match File::open(media, path) {
        Ok(mut file) => read_config(&mut file),
        Err(e) => {
            info!("No config at {}: {}", path, e);
            None
        }
    };
    config.unwrap_or_default()
}

impl Config {
    pub fn write_config<W: fmt::Write>(&self, w: &mut W) -> fmt::Result {
        let string = serde_json::to_string_pretty(self).map_err(|_| fmt::Error)?;
        w.write_str(&string)
    }
}

mod test {
    #[test]
    fn test_read_config() {
        use super::{read_config, Config, LogLevel};

        let mut bytes = &br#"{"log-level": "DEBUG", "cursor-address": 16, "route": "a.json"}"#[..];
        let config = read_config(&mut bytes).unwrap();
        let expected = Config {
            log_level: LogLevel::Debug,
            cursor_address: 16,
            route: "a.json".into(),
            restart_completed: false,
        };
        assert_eq!(config, expected);
    }

    #[test]
    fn test_read_bad_config() {
        use super::read_config;

        assert_eq!(read_config(&mut &b""[..]), None);
        assert_eq!(read_config(&mut &b"log-level: DEBUG"[..]), None);
    }

    #[test]
    fn test_config_round_trip() {
        use super::{load, Config, LogLevel};
        use crate::sys::fs::{MemoryMedia, OpenOptions};

        let media = MemoryMedia::new();
        assert_eq!(load(&media, "config.json"), Config::default());

        let mut config = Config::default();
        config.log_level = LogLevel::Trace;
        config.restart_completed = true;
        let options = OpenOptions::default().write(true).create(true);
        let mut file = options.open(&media, "config.json").unwrap();
        config.write_config(&mut file).unwrap();
        drop(file);
        assert_eq!(load(&media, "config.json"), config);
    }
}
