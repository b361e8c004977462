pub mod waypoint;

pub use waypoint::Waypoint;
