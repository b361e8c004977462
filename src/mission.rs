use core::fmt;

use hal::persist::ByteStore;

use crate::config::Config;
use crate::navigation::{LoadError, WaypointSequencer};
use crate::sys::fs::Media;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error<E> {
    Store(E),
    Load(LoadError),
}

impl<E: fmt::Display> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Store(e) => write!(f, "waypoint index store: {}", e),
            Self::Load(e) => write!(f, "route load: {}", e),
        }
    }
}

/// Bring up the sequencer after a reset: restore the persisted index, then
/// load the configured route from `media`.
pub fn resume<S: ByteStore>(
    config: &Config,
    store: S,
    media: &dyn Media,
) -> Result<WaypointSequencer<S>, Error<S::Error>> {
    let address = config.cursor_address;
    let mut sequencer = WaypointSequencer::new(store, address).map_err(Error::Store)?;
    if let Err(e) = sequencer.load_from_source(media, &config.route) {
        error!("Load route {} failed: {}", config.route, e);
        return Err(Error::Load(e));
    }
    info!("Route {} loaded with {} waypoints", config.route, sequencer.len());
    if !sequencer.has_next() && config.restart_completed {
        info!("Route completed at {}, start over", sequencer.status());
        sequencer.reset().map_err(Error::Store)?;
    }
    info!("Route progress {}", sequencer.progress());
    Ok(sequencer)
}

mod test {
    #[cfg(test)]
    const ROUTE: &[u8] = br#"{"waypoints": [[37.7749, -122.4194], [37.8044, -122.2712]]}"#;

    #[test]
    fn test_resume() {
        use super::resume;
        use crate::config::Config;
        use crate::datastructures::Waypoint;
        use crate::sys::fs::MemoryMedia;
        use crate::sys::persist::MemoryStore;

        let media = MemoryMedia::new();
        media.insert("route.json", ROUTE);
        let mut store = MemoryStore::<8>::new();
        let config = Config { cursor_address: 3, ..Default::default() };

        let mut sequencer = resume(&config, &mut store, &media).unwrap();
        assert_eq!(sequencer.current(), Some(Waypoint::new(37.7749, -122.4194)));
        sequencer.advance().unwrap();
        drop(sequencer);

        let mut sequencer = resume(&config, &mut store, &media).unwrap();
        assert_eq!(sequencer.current(), Some(Waypoint::new(37.8044, -122.2712)));
        sequencer.advance().unwrap();
        drop(sequencer);

        let sequencer = resume(&config, &mut store, &media).unwrap();
        assert!(!sequencer.has_next());
        drop(sequencer);
        assert_eq!(store.cells()[3], 2);
    }

    #[test]
    fn test_restart_completed() {
        use hal::persist::ByteStore;

        use super::resume;
        use crate::config::Config;
        use crate::sys::fs::MemoryMedia;
        use crate::sys::persist::MemoryStore;

        let media = MemoryMedia::new();
        media.insert("route.json", ROUTE);
        let mut store = MemoryStore::<1>::new();
        store.write_byte(0, 2).unwrap();
        let config = Config { restart_completed: true, ..Default::default() };
        let sequencer = resume(&config, &mut store, &media).unwrap();
        assert!(sequencer.has_next());
        assert_eq!(sequencer.index(), 0);
    }

    #[test]
    fn test_resume_failure() {
        use super::{resume, Error};
        use crate::config::Config;
        use crate::navigation::LoadError;
        use crate::sys::fs::MemoryMedia;
        use crate::sys::persist::{MemoryStore, OutOfRange};

        let media = MemoryMedia::new();
        let config = Config::default();
        let result = resume(&config, MemoryStore::<1>::new(), &media);
        assert_eq!(result.err(), Some(Error::Load(LoadError::SourceUnavailable)));

        let config = Config { cursor_address: 1, ..Default::default() };
        let result = resume(&config, MemoryStore::<1>::new(), &media);
        assert_eq!(result.err(), Some(Error::Store(OutOfRange(1))));
    }

    #[test]
    fn test_error_display() {
        use alloc::format;

        use super::Error;
        use crate::navigation::LoadError;
        use crate::sys::persist::OutOfRange;

        let error: Error<OutOfRange> = Error::Load(LoadError::SourceUnavailable);
        assert_eq!(format!("{}", error), "route load: waypoint source unavailable");
        let error = Error::<OutOfRange>::Store(OutOfRange(3));
        assert_eq!(format!("{}", error), "waypoint index store: address 3 out of range");
    }
}
