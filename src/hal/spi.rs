//! Traits for Serial Peripheral Interface implementation.

/// Allows the transmission and reception of a word in full duplex.
///
/// A full transaction is a `transmit` followed by a `receive`; the word
/// clocked in arrives on the same clock edges that shift the transmitted
/// word out. Implementations report completion through `nb`, so the
/// caller decides the polling strategy (spin, bounded wait, or an
/// interrupt-driven completion).
pub trait FullDuplex<WORD> {
    type Error;

    /// Clocks out a word. `None` transmits an implementation defined
    /// filler word, for transactions that exist only to generate clock
    /// edges. Returns `WouldBlock` until the transmit register is empty
    /// and the bus has gone idle.
    fn transmit(&mut self, word: Option<WORD>) -> nb::Result<(), Self::Error>;

    /// Must be called after transmit (full duplex operation). Returns
    /// `WouldBlock` until the received word is ready and the bus has
    /// gone idle.
    fn receive(&mut self) -> nb::Result<WORD, Self::Error>;
}
