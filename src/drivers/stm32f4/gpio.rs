//! GPIO driver based on typestates. Only the modes this project
//! drives pins in are modelled: alternate function (serial and bus
//! signals), push-pull output (chip select) and pulled-up input
//! (request line).
use core::marker::PhantomData;

/// Extension trait to split a GPIO peripheral into independent pins.
pub trait GpioExt {
    /// The type the GPIO block splits into
    type Pins;

    /// Splits the GPIO block into independent pins, enabling its
    /// peripheral clock in the process
    fn split(self) -> Self::Pins;
}

/// Input mode (type state)
pub struct Input<MODE> {
    _mode: PhantomData<MODE>,
}
/// Floating input (type state)
pub struct Floating;
/// Pulled up input (type state)
pub struct PullUp;

/// Output mode (type state)
pub struct Output<MODE> {
    _mode: PhantomData<MODE>,
}
/// Push pull output (type state)
pub struct PushPull;

/// Alternate function 5 (type state)
pub struct AF5;
/// Alternate function 7 (type state)
pub struct AF7;

macro_rules! gpio {
    ($GPIOX:ident, $gpiox:ident, $gpioen:ident, [
        $($PXi:ident: ($pxi:ident, $i:expr),)+
    ]) => {
        /// GPIO port module, holding its split pins.
        pub mod $gpiox {
            use core::marker::PhantomData;
            use crate::hal::gpio::{InputPin, OutputPin};
            use crate::stm32pac::{$GPIOX, RCC};
            use super::{AF5, AF7, Floating, GpioExt, Input, Output, PullUp, PushPull};

            /// Pins exposed by this port after splitting.
            pub struct Pins {
                $(
                    pub $pxi: $PXi<Input<Floating>>,
                )+
            }

            impl GpioExt for $GPIOX {
                type Pins = Pins;

                fn split(self) -> Pins {
                    // NOTE(safety) This executes only during initialisation.
                    let rcc = unsafe { &(*RCC::ptr()) };
                    rcc.ahb1enr.modify(|_, w| w.$gpioen().set_bit());

                    Pins {
                        $(
                            $pxi: $PXi { _mode: PhantomData },
                        )+
                    }
                }
            }

            $(
                /// Pin with typestate mode
                pub struct $PXi<MODE> {
                    _mode: PhantomData<MODE>,
                }

                impl<MODE> $PXi<MODE> {
                    // NOTE(safety) All register writes below are
                    // read-modify-write cycles limited to this pin's
                    // field, performed during initialisation only.

                    fn set_moder(bits: u32) {
                        let gpio = unsafe { &(*$GPIOX::ptr()) };
                        gpio.moder.modify(|r, w| unsafe {
                            w.bits((r.bits() & !(0b11 << ($i * 2))) | (bits << ($i * 2)))
                        });
                    }

                    fn set_alternate_function(af: u32) {
                        let gpio = unsafe { &(*$GPIOX::ptr()) };
                        if $i < 8 {
                            gpio.afrl.modify(|r, w| unsafe {
                                w.bits(
                                    (r.bits() & !(0b1111 << (($i % 8) * 4)))
                                        | (af << (($i % 8) * 4)),
                                )
                            });
                        } else {
                            gpio.afrh.modify(|r, w| unsafe {
                                w.bits(
                                    (r.bits() & !(0b1111 << (($i % 8) * 4)))
                                        | (af << (($i % 8) * 4)),
                                )
                            });
                        }
                    }

                    fn set_high_speed() {
                        let gpio = unsafe { &(*$GPIOX::ptr()) };
                        gpio.ospeedr.modify(|r, w| unsafe {
                            w.bits((r.bits() & !(0b11 << ($i * 2))) | (0b10 << ($i * 2)))
                        });
                    }

                    /// Configures the pin as alternate function 5 (SPI).
                    pub fn into_alternate_af5(self) -> $PXi<AF5> {
                        Self::set_alternate_function(5);
                        Self::set_high_speed();
                        Self::set_moder(0b10);
                        $PXi { _mode: PhantomData }
                    }

                    /// Configures the pin as alternate function 7 (USART).
                    pub fn into_alternate_af7(self) -> $PXi<AF7> {
                        Self::set_alternate_function(7);
                        Self::set_high_speed();
                        Self::set_moder(0b10);
                        $PXi { _mode: PhantomData }
                    }

                    /// Configures the pin as a push-pull output.
                    pub fn into_push_pull_output(self) -> $PXi<Output<PushPull>> {
                        let gpio = unsafe { &(*$GPIOX::ptr()) };
                        gpio.otyper.modify(|r, w| unsafe { w.bits(r.bits() & !(1 << $i)) });
                        Self::set_moder(0b01);
                        $PXi { _mode: PhantomData }
                    }

                    /// Configures the pin as a pulled-up input.
                    pub fn into_pull_up_input(self) -> $PXi<Input<PullUp>> {
                        let gpio = unsafe { &(*$GPIOX::ptr()) };
                        gpio.pupdr.modify(|r, w| unsafe {
                            w.bits((r.bits() & !(0b11 << ($i * 2))) | (0b01 << ($i * 2)))
                        });
                        Self::set_moder(0b00);
                        $PXi { _mode: PhantomData }
                    }
                }

                impl OutputPin for $PXi<Output<PushPull>> {
                    fn set_low(&mut self) {
                        // NOTE(safety) Atomic write to a set/reset register.
                        let gpio = unsafe { &(*$GPIOX::ptr()) };
                        gpio.bsrr.write(|w| unsafe { w.bits(1 << ($i + 16)) });
                    }

                    fn set_high(&mut self) {
                        // NOTE(safety) Atomic write to a set/reset register.
                        let gpio = unsafe { &(*$GPIOX::ptr()) };
                        gpio.bsrr.write(|w| unsafe { w.bits(1 << $i) });
                    }
                }

                impl<MODE> InputPin for $PXi<Input<MODE>> {
                    fn is_high(&self) -> bool {
                        // NOTE(safety) Atomic read with no side effects.
                        let gpio = unsafe { &(*$GPIOX::ptr()) };
                        gpio.idr.read().bits() & (1 << $i) != 0
                    }

                    fn is_low(&self) -> bool { !self.is_high() }
                }
            )+
        }
    };
}

// Pin definition lists. NOTE: This is not configuration! There is no
// need to remove pins from these lists once complete; they exist only
// in the type system until converted.
gpio!(GPIOA, gpioa, gpioaen, [
    Pa2: (pa2, 2),
    Pa3: (pa3, 3),
    Pa5: (pa5, 5),
    Pa6: (pa6, 6),
    Pa7: (pa7, 7),
]);

gpio!(GPIOB, gpiob, gpioben, [
    Pb6: (pb6, 6),
]);

gpio!(GPIOC, gpioc, gpiocen, [
    Pc7: (pc7, 7),
]);
