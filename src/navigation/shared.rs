use core::cell::RefCell;

use critical_section::Mutex;
use hal::persist::ByteStore;
use heapless::String;

use super::error::AdvanceError;
use super::sequencer::{WaypointSequencer, STATUS_CAPACITY};
use crate::datastructures::Waypoint;

/// Sequencer reachable from both the main loop and interrupt handlers.
///
/// Every operation runs inside a critical section across reading, updating
/// and persisting the index, so a handler never observes or preempts a half
/// done update. A closure passed to [`SharedSequencer::with`] must not call
/// back into the same `SharedSequencer`.
pub struct SharedSequencer<S>(Mutex<RefCell<WaypointSequencer<S>>>);

impl<S: ByteStore> SharedSequencer<S> {
    pub fn new(sequencer: WaypointSequencer<S>) -> Self {
        Self(Mutex::new(RefCell::new(sequencer)))
    }

    pub fn with<R, F: FnOnce(&mut WaypointSequencer<S>) -> R>(&self, f: F) -> R {
        critical_section::with(|cs| f(&mut self.0.borrow_ref_mut(cs)))
    }

    pub fn current(&self) -> Option<Waypoint> {
        self.with(|sequencer| sequencer.current())
    }

    pub fn has_next(&self) -> bool {
        self.with(|sequencer| sequencer.has_next())
    }

    pub fn advance(&self) -> Result<(), AdvanceError<S::Error>> {
        self.with(|sequencer| sequencer.advance())
    }

    pub fn reset(&self) -> Result<(), S::Error> {
        self.with(|sequencer| sequencer.reset())
    }

    pub fn status(&self) -> String<STATUS_CAPACITY> {
        self.with(|sequencer| sequencer.status())
    }

    /// Advance only if `waypoint` is still the active one, so a stale arrival
    /// notification does not skip a waypoint.
    pub fn arrive(&self, waypoint: &Waypoint) -> Result<bool, AdvanceError<S::Error>> {
        self.with(|sequencer| {
            if sequencer.current().as_ref() != Some(waypoint) {
                return Ok(false);
            }
            sequencer.advance()?;
            Ok(true)
        })
    }

    pub fn into_inner(self) -> WaypointSequencer<S> {
        self.0.into_inner().into_inner()
    }
}

mod test {
    #[test]
    fn test_shared_sequencer() {
        use std::sync::Arc;
        use std::thread;

        use super::SharedSequencer;
        use crate::datastructures::Waypoint;
        use crate::navigation::WaypointSequencer;
        use crate::sys::persist::MemoryStore;

        let mut sequencer = WaypointSequencer::new(MemoryStore::<1>::new(), 0).unwrap();
        let route: alloc::vec::Vec<_> = (0..64).map(|i| Waypoint::new(i as f64, 0.0)).collect();
        sequencer.load_from_memory(&route).unwrap();
        let shared = Arc::new(SharedSequencer::new(sequencer));
        let handles: alloc::vec::Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..16 {
                        shared.advance().unwrap();
                    }
                })
            })
            .collect();
        handles.into_iter().for_each(|h| h.join().unwrap());
        assert!(!shared.has_next());
        assert_eq!(shared.status().as_str(), "65/64");
        let sequencer = Arc::try_unwrap(shared).ok().unwrap().into_inner();
        assert_eq!(sequencer.into_store().cells(), &[64]);
    }

    #[test]
    fn test_stale_arrival() {
        use super::SharedSequencer;
        use crate::datastructures::Waypoint;
        use crate::navigation::WaypointSequencer;
        use crate::sys::persist::MemoryStore;

        let route = [Waypoint::new(1.0, 1.0), Waypoint::new(2.0, 2.0)];
        let mut sequencer = WaypointSequencer::new(MemoryStore::<1>::new(), 0).unwrap();
        sequencer.load_from_memory(&route).unwrap();
        let shared = SharedSequencer::new(sequencer);
        assert_eq!(shared.arrive(&route[0]), Ok(true));
        assert_eq!(shared.arrive(&route[0]), Ok(false));
        assert_eq!(shared.current(), Some(route[1]));
        shared.with(|s| s.reset()).unwrap();
        assert_eq!(shared.current(), Some(route[0]));
    }

    #[test]
    fn test_advance_while_main_loop_reads() {
        use std::sync::{mpsc, Arc};
        use std::thread;

        use super::SharedSequencer;
        use crate::datastructures::Waypoint;
        use crate::navigation::WaypointSequencer;
        use crate::sys::persist::MemoryStore;

        let route = [Waypoint::new(1.0, 1.0), Waypoint::new(2.0, 2.0)];
        let mut sequencer = WaypointSequencer::new(MemoryStore::<1>::new(), 0).unwrap();
        sequencer.load_from_memory(&route).unwrap();
        let shared = Arc::new(SharedSequencer::new(sequencer));

        let (started, wait_started) = mpsc::channel();
        let handler = {
            let shared = shared.clone();
            thread::spawn(move || {
                wait_started.recv().unwrap();
                shared.advance().unwrap();
            })
        };
        let waypoint = shared.with(|sequencer| {
            started.send(()).unwrap();
            thread::sleep(std::time::Duration::from_millis(10));
            sequencer.current()
        });
        handler.join().unwrap();
        assert_eq!(waypoint, Some(route[0]));
        assert_eq!(shared.current(), Some(route[1]));
        assert_eq!(shared.status().as_str(), "2/2");
    }
}
