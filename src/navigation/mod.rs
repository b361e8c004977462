pub mod cursor;
pub mod error;
pub mod route;
pub mod sequencer;
pub mod shared;

pub use cursor::{CursorSlot, MAX_INDEX};
pub use error::{AdvanceError, LoadError};
pub use sequencer::{Progress, WaypointSequencer};
pub use shared::SharedSequencer;
