use crate::{
    hal::time::{Hertz, MegaHertz},
    stm32pac::{FLASH, RCC},
};

/// Frozen clock frequencies
///
/// The existence of this value indicates that the clock configuration can no longer be changed
#[derive(Clone, Copy, Debug)]
pub struct Clocks {
    hclk: Hertz,
    pclk1: Hertz,
    pclk2: Hertz,
    sysclk: Hertz,
}

impl Clocks {
    pub fn hclk(&self) -> Hertz { self.hclk }

    pub fn pclk1(&self) -> Hertz { self.pclk1 }

    pub fn pclk2(&self) -> Hertz { self.pclk2 }

    pub fn sysclk(&self) -> Hertz { self.sysclk }

    /// Hardcoded values for the f446, fed from the 8MHz ST-LINK
    /// clock output (HSE bypass on the Nucleo board).
    #[cfg(feature = "stm32f446")]
    pub fn hardcoded(flash: FLASH, rcc: RCC) -> Self {
        // NOTE(Safety): All unsafe blocks in this function refer to using the "bits()"
        // method for easy writing.
        flash.acr.write(|w| {
            unsafe { w.latency().bits(5) }; // 168Mhz -> 5 wait states at 3.3v
            w.prften().set_bit()
        });

        rcc.cr.modify(|_, w| w.hsebyp().set_bit().hseon().set_bit());
        while rcc.cr.read().hserdy().bit_is_clear() {}

        rcc.pllcfgr.write(|w| unsafe {
            w.pllsrc().set_bit(); // HSE input to PLL
            w.pllm().bits(4); // 8MHz / 4 = 2MHz VCO input
            w.plln().bits(168); // 2MHz * 168 = 336MHz VCO output
            w.pllp().bits(0); // 336MHz / 2 = 168MHz (pllp = (divider / 2) >> 1)
            w.pllq().bits(7) // 336MHz / 7 = 48MHz
        });

        rcc.cr.modify(|_, w| w.pllon().set_bit());
        while rcc.cr.read().pllrdy().bit_is_clear() {}

        rcc.cfgr.modify(|_, w| unsafe {
            w.ppre1().bits(0b101); // Divided by 4
            w.ppre2().bits(0b100); // Divided by 2
            w.hpre().bits(0b000); // Divided by 1
            w.sw().bits(0b10) // PLL source
        });

        while rcc.cfgr.read().sws().bits() != 0b10 {}
        Self {
            hclk: MegaHertz(168).into(),
            pclk1: MegaHertz(42).into(),
            pclk2: MegaHertz(84).into(),
            sysclk: MegaHertz(168).into(),
        }
    }
}
