//! RAII guard that calls a given function when constructed,
//! and another when it drops out of scope.
//!
//! Useful for ensuring resource cleanup no matter the return
//! path. The bridge uses it to frame SPI transactions with the
//! chip select line: the line is asserted when the guard is
//! constructed and released when it drops, including on the
//! error path of a stalled transaction.
//!
//! Example
//! ```
//! # use busbridge_lib::hal::gpio::{InputPin, OutputPin};
//! # use busbridge_lib::hal::doubles::gpio::MockPin;
//! # use busbridge_lib::utilities::guard::Guard;
//! # let mut pin = MockPin::default();
//! {
//!     // Pin is driven low as soon as the guard is constructed, and
//!     // held protected by the guard (as it has exclusive access to it)
//!     Guard::new(&mut pin, OutputPin::set_low, OutputPin::set_high);
//! }
//! // Guard has dropped out of scope here, so the pin is high again
//! assert!(pin.is_high());
//! ```

use core::marker::PhantomData;

pub struct Guard<'a, T, F, G>
where
    F: FnOnce(&mut T),
    G: FnOnce(&mut T),
{
    item: &'a mut T,
    on_exit: Option<G>,
    _marker: PhantomData<F>,
}

impl<'a, T, F, G> Guard<'a, T, F, G>
where
    F: FnOnce(&mut T),
    G: FnOnce(&mut T),
{
    pub fn new(item: &'a mut T, on_entry: F, on_exit: G) -> Self {
        on_entry(item);
        Self { item, on_exit: Some(on_exit), _marker: PhantomData::default() }
    }
}

impl<'a, T, F, G> Drop for Guard<'a, T, F, G>
where
    F: FnOnce(&mut T),
    G: FnOnce(&mut T),
{
    fn drop(&mut self) { self.on_exit.take().unwrap()(self.item); }
}
