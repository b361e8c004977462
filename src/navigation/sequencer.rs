use alloc::vec::Vec;
use core::fmt::{self, Write};

use hal::persist::ByteStore;
use heapless::String;

use super::cursor::{CursorSlot, MAX_INDEX};
use super::error::{AdvanceError, LoadError};
use super::route;
use crate::datastructures::Waypoint;
use crate::sys::fs::{File, Media};

/// Enough for "255/" followed by any `usize`
pub const STATUS_CAPACITY: usize = 24;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize)]
pub struct Progress {
    pub index: u8,
    pub total: usize,
    pub waypoint: Option<Waypoint>,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        serde_json_core_fmt::to_fmt(f, self)
    }
}

/// Ordered waypoints plus the index of the active one.
///
/// The index is written through to a [`ByteStore`] on every change, so a
/// sequencer constructed against the same store after a reset resumes where
/// the previous one stopped. Waypoints are not persisted and have to be
/// loaded again.
pub struct WaypointSequencer<S> {
    waypoints: Vec<Waypoint>,
    slot: CursorSlot<S>,
    index: u8,
}

impl<S: ByteStore> WaypointSequencer<S> {
    /// A stored index is adopted as is, even when it turns out to be beyond
    /// the route loaded afterwards.
    pub fn new(store: S, address: u16) -> Result<Self, S::Error> {
        let mut slot = CursorSlot::new(store, address);
        let index = match slot.load()? {
            Some(index) => {
                debug!("Resuming at waypoint #{}", index);
                index
            }
            None => {
                info!("No waypoint index stored at address {}, start over", address);
                slot.store(0)?;
                0
            }
        };
        Ok(Self { waypoints: Vec::new(), slot, index })
    }

    fn set_index(&mut self, index: u8) -> Result<(), S::Error> {
        self.slot.store(index)?;
        self.index = index;
        Ok(())
    }

    fn check_length(&self) {
        if self.waypoints.len() > MAX_INDEX as usize {
            warn!("Route of {} waypoints only tracked up to #{}", self.waypoints.len(), MAX_INDEX);
        }
    }

    /// Append waypoints read from a file on `media`
    pub fn load_from_source(&mut self, media: &dyn Media, path: &str) -> Result<(), LoadError> {
        let mut file = File::open(media, path).map_err(|e| {
            warn!("Unable to open {}: {}", path, e);
            LoadError::SourceUnavailable
        })?;
        let text = file.read_to_string()?;
        file.close();
        self.load_from_text(&text)
    }

    /// Append decoded waypoints in document order. Stops at the first
    /// malformed entry, keeping what was appended before it.
    pub fn load_from_text(&mut self, text: &str) -> Result<(), LoadError> {
        let route = route::decode(text)?;
        debug!("Loading {} waypoints", route.len());
        for (i, point) in route.points().enumerate() {
            match point {
                Ok(waypoint) => self.waypoints.push(waypoint),
                Err(e) => {
                    warn!("Waypoint #{} rejected: {}", i, e);
                    self.check_length();
                    return Err(e);
                }
            }
        }
        self.check_length();
        Ok(())
    }

    pub fn load_from_memory(&mut self, waypoints: &[Waypoint]) -> Result<(), LoadError> {
        self.waypoints.extend_from_slice(waypoints);
        self.check_length();
        Ok(())
    }

    /// `None` once the route is complete
    pub fn current(&self) -> Option<Waypoint> {
        self.waypoints.get(self.index as usize).copied()
    }

    /// Moving past the last waypoint completes the route. An index of
    /// [`MAX_INDEX`] cannot be moved further, `Saturated` is returned and
    /// nothing changes.
    pub fn advance(&mut self) -> Result<(), AdvanceError<S::Error>> {
        if self.index >= MAX_INDEX {
            warn!("Waypoint index saturated at {}", MAX_INDEX);
            return Err(AdvanceError::Saturated);
        }
        self.set_index(self.index + 1).map_err(AdvanceError::Store)
    }

    pub fn reset(&mut self) -> Result<(), S::Error> {
        self.set_index(0)
    }

    pub fn has_next(&self) -> bool {
        (self.index as usize) < self.waypoints.len()
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints[..]
    }

    /// Position counted from 1 over total, e.g. "2/5"
    pub fn status(&self) -> String<STATUS_CAPACITY> {
        let mut status = String::new();
        write!(status, "{}/{}", self.index as usize + 1, self.waypoints.len()).ok();
        status
    }

    pub fn progress(&self) -> Progress {
        Progress { index: self.index, total: self.waypoints.len(), waypoint: self.current() }
    }

    pub fn dump<W: Write>(&self, w: &mut W) -> fmt::Result {
        writeln!(w, "Size: {}", self.waypoints.len())?;
        for (i, waypoint) in self.waypoints.iter().enumerate() {
            writeln!(w, "Waypoint #{}: {}", i, waypoint)?;
        }
        writeln!(w, "Index: {}", self.index)
    }

    pub fn into_store(self) -> S {
        self.slot.into_inner()
    }
}

mod test {
    #[cfg(test)]
    use crate::datastructures::Waypoint;
    #[cfg(test)]
    use crate::sys::persist::OutOfRange;

    #[cfg(test)]
    const ROUTE: [Waypoint; 3] =
        [Waypoint::new(1.0, 2.0), Waypoint::new(3.0, -4.5), Waypoint::new(-5.25, 6.0)];

    #[test]
    fn test_first_run() {
        use super::WaypointSequencer;
        use crate::sys::persist::MemoryStore;

        let mut sequencer = WaypointSequencer::new(MemoryStore::<4>::new(), 2).unwrap();
        assert_eq!(sequencer.index(), 0);
        sequencer.load_from_memory(&ROUTE).unwrap();
        assert_eq!(sequencer.current(), Some(ROUTE[0]));
        assert!(sequencer.has_next());
        assert_eq!(sequencer.into_store().cells(), &[0xFF, 0xFF, 0, 0xFF]);
    }

    #[test]
    fn test_advance_to_end() {
        use super::WaypointSequencer;
        use crate::sys::persist::MemoryStore;

        let mut sequencer = WaypointSequencer::new(MemoryStore::<1>::new(), 0).unwrap();
        sequencer.load_from_memory(&ROUTE).unwrap();
        for waypoint in ROUTE.iter() {
            assert!(sequencer.has_next());
            assert_eq!(sequencer.current(), Some(*waypoint));
            sequencer.advance().unwrap();
        }
        assert!(!sequencer.has_next());
        assert_eq!(sequencer.current(), None);
        assert_eq!(sequencer.index(), 3);
        sequencer.advance().unwrap();
        assert!(!sequencer.has_next());
        assert_eq!(sequencer.index(), 4);
    }

    #[test]
    fn test_reset() {
        use hal::persist::ByteStore;

        use super::WaypointSequencer;
        use crate::sys::persist::MemoryStore;

        let mut store = MemoryStore::<1>::new();
        store.write_byte(0, 200).unwrap();
        let mut sequencer = WaypointSequencer::new(store, 0).unwrap();
        sequencer.load_from_memory(&ROUTE).unwrap();
        assert_eq!(sequencer.index(), 200);
        assert!(!sequencer.has_next());
        sequencer.reset().unwrap();
        assert_eq!(sequencer.index(), 0);
        assert!(sequencer.has_next());
        assert_eq!(sequencer.into_store().cells(), &[0]);
    }

    #[test]
    fn test_resume_after_power_cycle() {
        use super::WaypointSequencer;
        use crate::sys::persist::MemoryStore;

        let mut store = MemoryStore::<16>::new();
        let mut sequencer = WaypointSequencer::new(&mut store, 9).unwrap();
        sequencer.load_from_memory(&ROUTE).unwrap();
        sequencer.advance().unwrap();
        sequencer.advance().unwrap();
        drop(sequencer);

        let sequencer = WaypointSequencer::new(&mut store, 9).unwrap();
        assert_eq!(sequencer.index(), 2);
        assert!(sequencer.is_empty());
        assert!(!sequencer.has_next());
    }

    /// Steps taken, how the walk ended and the stored index
    #[cfg(test)]
    fn run_route(size: usize) -> (usize, Result<(), super::AdvanceError<OutOfRange>>, u8) {
        use super::WaypointSequencer;
        use crate::sys::persist::MemoryStore;

        let route: alloc::vec::Vec<_> = (0..size).map(|i| Waypoint::new(i as f64, 0.0)).collect();
        let mut sequencer = WaypointSequencer::new(MemoryStore::<1>::new(), 0).unwrap();
        sequencer.load_from_memory(&route).unwrap();
        let mut steps = 0;
        let result = loop {
            if !sequencer.has_next() {
                break Ok(());
            }
            if let Err(e) = sequencer.advance() {
                break Err(e);
            }
            steps += 1;
        };
        (steps, result, sequencer.into_store().cells()[0])
    }

    #[test]
    fn test_longest_route_completes() {
        use super::MAX_INDEX;

        assert_eq!(run_route(MAX_INDEX as usize), (254, Ok(()), MAX_INDEX));
    }

    #[test]
    fn test_index_saturates() {
        use hal::persist::ByteStore;

        use super::{AdvanceError, WaypointSequencer, MAX_INDEX};
        use crate::sys::persist::MemoryStore;

        assert_eq!(run_route(255), (254, Err(AdvanceError::Saturated), MAX_INDEX));
        assert_eq!(run_route(300), (254, Err(AdvanceError::Saturated), MAX_INDEX));

        let mut store = MemoryStore::<1>::new();
        store.write_byte(0, MAX_INDEX).unwrap();
        let mut sequencer = WaypointSequencer::new(store, 0).unwrap();
        assert_eq!(sequencer.advance(), Err(AdvanceError::Saturated));
        assert_eq!(sequencer.index(), MAX_INDEX);
        assert_eq!(sequencer.into_store().cells(), &[MAX_INDEX]);
    }

    #[test]
    fn test_store_failure() {
        use super::WaypointSequencer;
        use crate::sys::persist::{MemoryStore, OutOfRange};

        let result = WaypointSequencer::new(MemoryStore::<1>::new(), 1);
        assert_eq!(result.err(), Some(OutOfRange(1)));
    }

    #[test]
    fn test_load_from_text() {
        use super::WaypointSequencer;
        use crate::sys::persist::MemoryStore;

        let mut sequencer = WaypointSequencer::new(MemoryStore::<1>::new(), 0).unwrap();
        sequencer.load_from_text(r#"{"waypoints": [[1.0, 2.0], [3.0, -4.5]]}"#).unwrap();
        sequencer.reset().unwrap();
        assert_eq!(sequencer.len(), 2);
        assert_eq!(sequencer.current(), Some(Waypoint::new(1.0, 2.0)));

        sequencer.load_from_text(r#"{"waypoints": [[7, 8]]}"#).unwrap();
        assert_eq!(sequencer.waypoints()[2], Waypoint::new(7.0, 8.0));
    }

    #[test]
    fn test_malformed_waypoint() {
        use super::{LoadError, WaypointSequencer};
        use crate::sys::persist::MemoryStore;

        let mut sequencer = WaypointSequencer::new(MemoryStore::<1>::new(), 0).unwrap();
        let result = sequencer.load_from_text(r#"{"waypoints": [[1.0]]}"#);
        assert_eq!(result, Err(LoadError::MalformedWaypoint));
        assert!(sequencer.is_empty());

        let text = r#"{"waypoints": [[1.0, 2.0], [3.0], [5.0, 6.0]]}"#;
        assert_eq!(sequencer.load_from_text(text), Err(LoadError::MalformedWaypoint));
        assert_eq!(sequencer.waypoints(), &[Waypoint::new(1.0, 2.0)]);
    }

    #[test]
    fn test_load_from_source() {
        use super::{LoadError, WaypointSequencer};
        use crate::sys::fs::MemoryMedia;
        use crate::sys::persist::MemoryStore;

        let media = MemoryMedia::new();
        media.insert("route.json", br#"{"waypoints": [[1.0, 2.0], [3.0, -4.5]]}"#);
        media.insert("broken.json", b"{\"waypoints\": [[1.0, 2.0]");
        let mut sequencer = WaypointSequencer::new(MemoryStore::<1>::new(), 0).unwrap();
        let result = sequencer.load_from_source(&media, "missing.json");
        assert_eq!(result, Err(LoadError::SourceUnavailable));
        let result = sequencer.load_from_source(&media, "broken.json");
        assert_eq!(result, Err(LoadError::DecodeError));
        assert!(sequencer.is_empty());
        sequencer.load_from_source(&media, "route.json").unwrap();
        assert_eq!(sequencer.waypoints(), &ROUTE[..2]);
    }

    #[test]
    fn test_load_empty_slice() {
        use super::WaypointSequencer;
        use crate::sys::persist::MemoryStore;

        let mut sequencer = WaypointSequencer::new(MemoryStore::<1>::new(), 0).unwrap();
        sequencer.load_from_memory(&ROUTE[..1]).unwrap();
        assert_eq!(sequencer.load_from_memory(&[]), Ok(()));
        assert_eq!(sequencer.waypoints(), &ROUTE[..1]);
    }

    #[test]
    fn test_status() {
        use super::WaypointSequencer;
        use crate::sys::persist::MemoryStore;

        let mut sequencer = WaypointSequencer::new(MemoryStore::<1>::new(), 0).unwrap();
        assert_eq!(sequencer.status().as_str(), "1/0");
        sequencer.load_from_memory(&ROUTE).unwrap();
        sequencer.load_from_memory(&ROUTE[..2]).unwrap();
        sequencer.advance().unwrap();
        assert_eq!(sequencer.status().as_str(), "2/5");
    }

    #[test]
    fn test_dump() {
        use super::WaypointSequencer;
        use crate::sys::persist::MemoryStore;

        let mut sequencer = WaypointSequencer::new(MemoryStore::<1>::new(), 0).unwrap();
        sequencer.load_from_memory(&ROUTE[..2]).unwrap();
        sequencer.advance().unwrap();
        let mut output = alloc::string::String::new();
        sequencer.dump(&mut output).unwrap();
        let expected = "Size: 2\nWaypoint #0: 1, 2\nWaypoint #1: 3, -4.5\nIndex: 1\n";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_progress() {
        use serde_json::json;

        use super::WaypointSequencer;
        use crate::sys::persist::MemoryStore;

        let mut sequencer = WaypointSequencer::new(MemoryStore::<1>::new(), 0).unwrap();
        sequencer.load_from_memory(&ROUTE[..1]).unwrap();
        let expected = json!({
            "index": 0,
            "total": 1,
            "waypoint": {"latitude": 1.0, "longitude": 2.0},
        });
        assert_eq!(expected, serde_json::to_value(&sequencer.progress()).unwrap());
        sequencer.advance().unwrap();
        let expected = json!({"index": 1, "total": 1, "waypoint": null});
        assert_eq!(expected, serde_json::to_value(&sequencer.progress()).unwrap());
    }
}
