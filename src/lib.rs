//! # Serial to SPI-master bridge
//!
//! This crate contains all functionality for the serial/SPI bridge
//! firmware in library form. The bridge couples a byte-oriented
//! serial link, a SPI master bus and a peer request line: serial
//! bytes are forwarded out over SPI, and request line edges trigger
//! a SPI read that is forwarded back out over serial.
#![cfg_attr(test, allow(unused_imports))]
#![cfg_attr(target_arch = "arm", no_std)]

#[cfg(feature = "stm32f446")]
pub use stm32f4::stm32f446 as stm32pac;

#[cfg(target_arch = "arm")]
use panic_semihosting as _;

extern crate static_assertions;

#[macro_use]
pub mod utilities {
    pub mod guard;
    mod macros;
}

pub mod hal;
pub mod devices;
pub mod drivers;
pub mod ports;
pub mod error;
