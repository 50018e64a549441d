//! SPI master driver.
//!
//! The chip select line is deliberately *not* managed here: the
//! board wires it as a plain GPIO output owned by whoever frames
//! transactions, so slave management is disabled in hardware.
use crate::{
    drivers::stm32f4::gpio::*,
    hal::spi::FullDuplex,
    stm32pac::{RCC, SPI1},
};
use core::{marker::PhantomData, mem::size_of};
use static_assertions::const_assert;

/// Peripheral clock divider as a power of two. The reference board
/// runs the bus at pclk2 / 64, slow enough that any attached peer
/// can follow without flow control.
pub const BAUD_RATE_DIVIDER: u8 = 5; // log2(64) - 1

// The BR register field is three bits wide.
const_assert!(BAUD_RATE_DIVIDER <= 0b111);

mod private {
    #[doc(hidden)]
    pub trait Sealed {}
}

/// Sealed traits for all SPI capable pins.
pub unsafe trait MisoPin<SPI>: private::Sealed {}
pub unsafe trait MosiPin<SPI>: private::Sealed {}
pub unsafe trait SckPin<SPI>: private::Sealed {}

macro_rules! seal_pins { ($function:ty: [$($pin:ty,)+]) => {
    $(
        unsafe impl $function for $pin {}
        impl private::Sealed for $pin {}
    )+
};}

#[cfg(feature = "stm32f446")]
seal_pins!(SckPin<SPI1>: [gpioa::Pa5<AF5>,]);
#[cfg(feature = "stm32f446")]
seal_pins!(MisoPin<SPI1>: [gpioa::Pa6<AF5>,]);
#[cfg(feature = "stm32f446")]
seal_pins!(MosiPin<SPI1>: [gpioa::Pa7<AF5>,]);

/// Marker trait for a tuple of pins that work for a given SPI.
pub trait Pins<SPI> {}

impl<SPI, MISO, MOSI, SCK> Pins<SPI> for (MISO, MOSI, SCK)
where
    MISO: MisoPin<SPI>,
    MOSI: MosiPin<SPI>,
    SCK: SckPin<SPI>,
{
}

/// SPI abstraction
pub struct Spi<SPI, PINS, WORD> {
    spi: SPI,
    _pins: PINS,
    _word: PhantomData<WORD>,
    awaiting_receive: bool,
}

#[derive(Debug)]
pub enum FullDuplexSpiError {
    OutOfOrderOperation,
}

impl From<FullDuplexSpiError> for crate::error::Error {
    fn from(_: FullDuplexSpiError) -> Self {
        crate::error::Error::DriverError("Out of order SPI operation")
    }
}

/// Clock polarity and phase.
pub enum Mode {
    Zero,
    One,
    Two,
    Three,
}

macro_rules! hal_spi_impl {
    ($(
        $SPIX:ident: ($word: tt, $spiX:ident, $apbXenr:ident, $spiXen:ident)
    )+) => {
        $(
            impl<PINS> Spi<$SPIX, PINS, $word> {
                pub fn $spiX(
                    spi: $SPIX, pins: PINS, mode: Mode, divider: u8
                ) -> Self
                    where PINS: Pins<$SPIX>,
                {
                    // NOTE(safety) This executes only during initialisation.
                    let rcc = unsafe { &(*RCC::ptr()) };

                    // Enable clock for SPI
                    rcc.$apbXenr.modify(|_, w| w.$spiXen().set_bit());

                    // Baud rate divider
                    spi.cr1.modify(|_, w| unsafe { w.br().bits(divider) });

                    // Mode bits
                    match mode {
                        Mode::Zero => spi.cr1.modify(|_, w| w.cpol().clear_bit().cpha().clear_bit()),
                        Mode::One => spi.cr1.modify(|_, w| w.cpol().clear_bit().cpha().set_bit()),
                        Mode::Two => spi.cr1.modify(|_, w| w.cpol().set_bit().cpha().clear_bit()),
                        Mode::Three => spi.cr1.modify(|_, w| w.cpol().set_bit().cpha().set_bit()),
                    }

                    // Chip select is firmware-driven GPIO: software slave
                    // management stays disabled, with the output-enable bit
                    // keeping the peripheral in master mode.
                    spi.cr1.modify(|_, w| w.ssm().clear_bit().lsbfirst().clear_bit());
                    spi.cr2.modify(|_, w| w.ssoe().set_bit());

                    // Word length
                    match size_of::<$word>() {
                        1 => spi.cr1.modify(|_, w| w.dff().clear_bit()),
                        2 => spi.cr1.modify(|_, w| w.dff().set_bit()),
                        _ => panic!("Unsupported word size"),
                    }

                    // Master mode and enable
                    spi.cr1.modify(|_, w| w.mstr().set_bit().spe().set_bit());

                    Self { spi, _pins: pins, _word: PhantomData, awaiting_receive: false }
                }

                pub fn is_ready_to_transmit(&self) -> bool {
                    self.spi.sr.read().txe().bit_is_set() && !self.awaiting_receive
                }

                pub fn is_ready_to_receive(&self) -> bool {
                    self.spi.sr.read().rxne().bit_is_set() && self.awaiting_receive
                }

                pub fn is_busy(&self) -> bool {
                    self.spi.sr.read().bsy().bit_is_set()
                }
            }

            impl<PINS> FullDuplex<$word> for Spi<$SPIX, PINS, $word> {
                type Error = FullDuplexSpiError;

                fn transmit(&mut self, word: Option<$word>) -> nb::Result<(), Self::Error> {
                    if self.awaiting_receive {
                        return Err(nb::Error::Other(FullDuplexSpiError::OutOfOrderOperation))
                    }

                    // Transmit register empty and bus idle before clocking out
                    if !self.is_ready_to_transmit() || self.is_busy() {
                        return Err(nb::Error::WouldBlock);
                    }

                    let word = word.unwrap_or(0) as u16;
                    // NOTE(safety) Write limited to the data register
                    self.spi.dr.write(|w| unsafe { w.dr().bits(word) });
                    self.awaiting_receive = true;
                    Ok(())
                }

                fn receive(&mut self) -> nb::Result<$word, Self::Error> {
                    if !self.awaiting_receive {
                        return Err(nb::Error::Other(FullDuplexSpiError::OutOfOrderOperation))
                    }

                    // The received word is ready once the shift completes and
                    // the busy flag drops; only then is the transaction over
                    // on the wire, including the final clock edges.
                    if !self.is_ready_to_receive() || self.is_busy() {
                        return Err(nb::Error::WouldBlock);
                    }

                    self.awaiting_receive = false;
                    Ok(self.spi.dr.read().dr().bits() as $word)
                }
            }
        )+
    }
}

hal_spi_impl!(
    SPI1: (u8, spi1, apb2enr, spi1en)
);
