//! USART implementation.
use crate::{
    drivers::stm32f4::{gpio::*, rcc},
    hal::serial,
    stm32pac::{RCC, USART2},
};

/// Extension trait to wrap a USART peripheral into a more useful
/// high level abstraction.
pub trait UsartExt<PINS> {
    /// The wrapping type
    type Serial;

    fn constrain(
        self,
        pins: PINS,
        config: config::Config,
        clocks: rcc::Clocks,
    ) -> Result<Self::Serial, config::InvalidConfig>;
}

mod private {
    #[doc(hidden)]
    pub trait Sealed {}
}

/// Sealed trait for all pins that can be TX for each USART.
/// This can't be implemented by the library user: All available
/// pins should already be implemented internally.
pub unsafe trait TxPin<USART>: private::Sealed {}

/// Sealed trait for all pins that can be RX for each USART.
/// This can't be implemented by the library user: All available
/// pins should already be implemented internally.
pub unsafe trait RxPin<USART>: private::Sealed {}

macro_rules! seal_pins { ($function:ty: [$($pin:ty,)+]) => {
    $(
        unsafe impl $function for $pin {}
        impl private::Sealed for $pin {}
    )+
};}

// List of all pins capable of being configured as certain USART
// functions. NOTE: This is not configuration! there's no need
// to remove items from these lists once complete.
#[cfg(feature = "stm32f446")]
seal_pins!(TxPin<USART2>: [gpioa::Pa2<AF7>,]);
#[cfg(feature = "stm32f446")]
seal_pins!(RxPin<USART2>: [gpioa::Pa3<AF7>,]);

/// Serial error
#[derive(Debug, Copy, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Framing error
    Framing,
    /// Noise error
    Noise,
    /// RX buffer overrun
    Overrun,
    /// Parity check error
    Parity,
}

impl From<Error> for crate::error::Error {
    fn from(_: Error) -> Self { crate::error::Error::DriverError("Serial line error") }
}

/// Interrupt event
pub enum Event {
    /// New data has been received
    Rxne,
    /// New data can be sent
    Txe,
    /// Idle line state detected
    Idle,
}

pub mod config {
    //! Configuration required to construct a new USART instance.
    //!
    //! # Example
    //! ```ignore
    //! let (usart, tx, rx) = (peripherals.USART2, gpioa.pa2, gpioa.pa3);
    //! let config = serial::config::Config::default().baudrate(Bps(9600));
    //! let mut serial = usart.constrain((tx, rx), config, clocks).unwrap();
    //! ```

    use crate::hal::time::{Bps, U32Ext};

    pub enum WordLength {
        DataBits8,
        DataBits9,
    }

    pub enum Parity {
        ParityNone,
        ParityEven,
        ParityOdd,
    }

    pub enum StopBits {
        #[doc = "1 stop bit"]
        STOP1,
        #[doc = "0.5 stop bits"]
        STOP0P5,
        #[doc = "2 stop bits"]
        STOP2,
        #[doc = "1.5 stop bits"]
        STOP1P5,
    }

    pub struct Config {
        pub baudrate: Bps,
        pub wordlength: WordLength,
        pub parity: Parity,
        pub stopbits: StopBits,
    }

    impl Config {
        pub fn baudrate(mut self, baudrate: Bps) -> Self {
            self.baudrate = baudrate;
            self
        }

        pub fn parity_none(mut self) -> Self {
            self.parity = Parity::ParityNone;
            self
        }

        pub fn stopbits(mut self, stopbits: StopBits) -> Self {
            self.stopbits = stopbits;
            self
        }
    }

    #[derive(Debug)]
    pub struct InvalidConfig;

    impl Default for Config {
        fn default() -> Config {
            let baudrate = 9_600_u32.bps();
            Config {
                baudrate,
                wordlength: WordLength::DataBits8,
                parity: Parity::ParityNone,
                stopbits: StopBits::STOP1,
            }
        }
    }
}

/// Marker trait for a tuple of pins that work for a given USART.
/// Automatically implemented for any tuple (A, B) where A is
/// a TxPin and B is a RxPin.
pub trait Pins<USART> {}

impl<USART, TX, RX> Pins<USART> for (TX, RX)
where
    TX: TxPin<USART>,
    RX: RxPin<USART>,
{
}

/// Serial abstraction
pub struct Serial<USART, PINS> {
    usart: USART,
    pins: PINS,
}

macro_rules! hal_usart_impl {
    ($(
        $USARTX:ident: ($usartX:ident, $apbXenr:ident, $usartXen:ident, $pclkX:ident),
    )+) => {
        $(
            impl<PINS> Serial<$USARTX, PINS> {
                pub fn $usartX(
                    usart: $USARTX,
                    pins: PINS,
                    config: config::Config,
                    clocks: rcc::Clocks,
                ) -> Result<Self, config::InvalidConfig>
                where
                    PINS: Pins<$USARTX>,
                {
                    use self::config::*;

                    // NOTE(safety) This executes only during initialisation
                    let rcc = unsafe { &(*RCC::ptr()) };

                    // Enable clock for USART
                    rcc.$apbXenr.modify(|_, w| w.$usartXen().set_bit());

                    let extended_divider = (clocks.$pclkX().0 << 4) / config.baudrate.0;
                    let mantissa = extended_divider >> 8;
                    let fraction = (extended_divider - (mantissa << 8)) >> 4;

                    // NOTE(safety) uses .bits for ease of writing a whole word.
                    // No reserved or read-only bits in this register
                    usart.brr.write(|w| unsafe { w.bits((mantissa << 4) | fraction) });

                    // Stop bit configuration; other advanced features stay disabled
                    usart.cr2.write(|w| unsafe {
                        w.stop().bits(match config.stopbits {
                            StopBits::STOP1 => 0b00,
                            StopBits::STOP0P5 => 0b01,
                            StopBits::STOP2 => 0b10,
                            StopBits::STOP1P5 => 0b11,
                        })
                    });
                    usart.cr3.reset();

                    // Enable transmission and receiving
                    // and configure frame
                    usart.cr1.write(|w| {
                        w.ue()
                            .set_bit()
                            .te()
                            .set_bit()
                            .re()
                            .set_bit()
                            .m()
                            .bit(match config.wordlength {
                                WordLength::DataBits8 => false,
                                WordLength::DataBits9 => true,
                            })
                            .pce()
                            .bit(match config.parity {
                                Parity::ParityNone => false,
                                _ => true,
                            })
                            .ps()
                            .bit(match config.parity {
                                Parity::ParityOdd => true,
                                _ => false,
                            })
                    });

                    Ok(Serial { usart, pins })
                }

                /// Starts listening for an interrupt event
                pub fn listen(&mut self, event: Event) {
                    match event {
                        Event::Rxne => {
                            self.usart.cr1.modify(|_, w| w.rxneie().set_bit())
                        },
                        Event::Txe => {
                            self.usart.cr1.modify(|_, w| w.txeie().set_bit())
                        },
                        Event::Idle => {
                            self.usart.cr1.modify(|_, w| w.idleie().set_bit())
                        },
                    }
                }

                /// Stop listening for an interrupt event
                pub fn unlisten(&mut self, event: Event) {
                    match event {
                        Event::Rxne => {
                            self.usart.cr1.modify(|_, w| w.rxneie().clear_bit())
                        },
                        Event::Txe => {
                            self.usart.cr1.modify(|_, w| w.txeie().clear_bit())
                        },
                        Event::Idle => {
                            self.usart.cr1.modify(|_, w| w.idleie().clear_bit())
                        },
                    }
                }

                /// Return true if the tx register is empty (and can accept data)
                pub fn is_txe(&self) -> bool {
                    // NOTE(Safety) Atomic read on stateless register
                    unsafe { (*$USARTX::ptr()).sr.read().txe().bit_is_set() }
                }

                /// Return true if the rx register is not empty (and can be read)
                pub fn is_rxne(&self) -> bool {
                    // NOTE(Safety) Atomic read on stateless register
                    unsafe { (*$USARTX::ptr()).sr.read().rxne().bit_is_set() }
                }

                pub fn release(self) -> ($USARTX, PINS) {
                    (self.usart, self.pins)
                }
            }

            impl<PINS> serial::Read<u8> for Serial<$USARTX, PINS> {
                type Error = Error;

                fn read(&mut self) -> nb::Result<u8, Error> {
                    // NOTE(Safety) Atomic read on stateless register
                    let sr = unsafe { (*$USARTX::ptr()).sr.read() };

                    // Any error requires the dr to be read to clear
                    if sr.pe().bit_is_set()
                        || sr.fe().bit_is_set()
                        || sr.nf().bit_is_set()
                        || sr.ore().bit_is_set()
                    {
                        // NOTE(Safety) Atomic read on stateless register
                        unsafe { (*$USARTX::ptr()).dr.read() };
                    }

                    Err(if sr.pe().bit_is_set() {
                        nb::Error::Other(Error::Parity)
                    } else if sr.fe().bit_is_set() {
                        nb::Error::Other(Error::Framing)
                    } else if sr.nf().bit_is_set() {
                        nb::Error::Other(Error::Noise)
                    } else if sr.ore().bit_is_set() {
                        nb::Error::Other(Error::Overrun)
                    } else if sr.rxne().bit_is_set() {
                        // Reading the data register is also what acknowledges
                        // the receive-not-empty flag to the hardware
                        return Ok(unsafe { (*$USARTX::ptr()).dr.read().dr().bits() as u8 });
                    } else {
                        nb::Error::WouldBlock
                    })
                }
            }

            impl<PINS> serial::Write<u8> for Serial<$USARTX, PINS> {
                type Error = Error;

                fn write(&mut self, word: u8) -> nb::Result<(), Error> {
                    // NOTE(Safety) Atomic read with no side effects
                    let sr = unsafe { (*$USARTX::ptr()).sr.read() };

                    if sr.txe().bit_is_set() {
                        // NOTE(Safety) Atomic write to a data register
                        unsafe { (*$USARTX::ptr()).dr.write(|w| w.dr().bits(word as u16)) };
                        Ok(())
                    } else {
                        Err(nb::Error::WouldBlock)
                    }
                }
            }
        )+
    }
}

macro_rules! instances {
    ($(
        $USARTX:ident: ($usartX:ident, $apbXenr:ident, $usartXen:ident, $pclkX:ident),
    )+) => {
        hal_usart_impl! {
            $( $USARTX: ($usartX, $apbXenr, $usartXen, $pclkX), )+
        }

        $(
            impl<PINS> UsartExt<PINS> for $USARTX
            where
                PINS: Pins<$USARTX>, {
                type Serial = Serial<$USARTX, PINS>;

                fn constrain(self,
                    pins: PINS,
                    config: config::Config,
                    clocks: rcc::Clocks,
                ) -> Result<Self::Serial, config::InvalidConfig> {
                    Serial::$usartX(self, pins, config, clocks)
                }
            }
        )+
    }
}

// Type definition macros. NOTE: This is not configuration! No
// need to remove these if unused, they exist only in the type
// system at this point.
instances! {
    USART2: (usart2, apb1enr, usart2en, pclk1),
}
