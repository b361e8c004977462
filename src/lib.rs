#![no_std]

extern crate alloc;
extern crate critical_section;
#[macro_use]
extern crate derive_more;
extern crate hal;
extern crate heapless;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;
extern crate serde_json;
extern crate spin;

pub mod config;
pub mod datastructures;
pub mod logger;
pub mod mission;
pub mod navigation;
pub mod sys;

#[cfg(test)]
extern crate std;

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;
