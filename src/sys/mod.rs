pub mod fs;
pub mod persist;
