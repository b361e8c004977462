#![no_std]

extern crate hal;
#[macro_use]
extern crate log;

pub mod eeprom;

#[cfg(test)]
extern crate std;

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;
