//! Test doubles for every hal interface, available on host builds only.
pub mod error;
pub mod exti;
pub mod gpio;
pub mod serial;
pub mod spi;
