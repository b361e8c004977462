#![no_std]

pub mod flash;
pub mod io;
pub mod persist;
