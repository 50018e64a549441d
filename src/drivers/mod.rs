//! Driver implementations for all supported platforms. They offer
//! a safe API, and are
//! [typestate](https://rust-embedded.github.io/book/static-guarantees/typestate-programming.html)
//! based whenever possible.

#[cfg(feature = "stm32f4_any")]
pub mod stm32f4 {
    #[macro_use]
    pub mod gpio;
    pub mod exti;
    pub mod rcc;
    pub mod serial;
    pub mod spi;
}
