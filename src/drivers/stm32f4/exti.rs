//! External interrupt driver for the peer request line.
//!
//! Wraps a single EXTI line configured for falling-edge detection.
//! The pending latch survives until explicitly acknowledged, so an
//! edge arriving while its handler runs is deferred, never dropped.
use crate::{
    hal::exti::EdgeDetect,
    stm32pac::{EXTI, RCC, SYSCFG},
};

/// GPIO port feeding an EXTI line, as encoded in the SYSCFG
/// external interrupt configuration registers.
#[derive(Copy, Clone, Debug)]
pub enum Port {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

/// A single falling-edge EXTI line, consumed as an owned handle.
///
/// Owning the `EXTI` peripheral outright is deliberate: this project
/// uses exactly one external interrupt line, so there is no register
/// sharing to arbitrate.
pub struct RequestLine {
    exti: EXTI,
    line: u8,
}

impl RequestLine {
    /// Routes the given port/line pair through SYSCFG, arms the
    /// falling-edge trigger and unmasks the line at the EXTI level.
    /// NVIC configuration stays with the caller.
    pub fn falling(exti: EXTI, syscfg: SYSCFG, port: Port, line: u8) -> Self {
        debug_assert!(line < 16);

        // NOTE(safety) This executes only during initialisation.
        let rcc = unsafe { &(*RCC::ptr()) };
        rcc.apb2enr.modify(|_, w| w.syscfgen().set_bit());

        // Four port selection fields per configuration register.
        let field_shift = (line % 4) * 4;
        let field_mask = 0b1111u32 << field_shift;
        let field_bits = (port as u32) << field_shift;

        // NOTE(safety) Read-modify-write limited to this line's field.
        match line / 4 {
            0 => syscfg.exticr1.modify(|r, w| unsafe {
                w.bits((r.bits() & !field_mask) | field_bits)
            }),
            1 => syscfg.exticr2.modify(|r, w| unsafe {
                w.bits((r.bits() & !field_mask) | field_bits)
            }),
            2 => syscfg.exticr3.modify(|r, w| unsafe {
                w.bits((r.bits() & !field_mask) | field_bits)
            }),
            _ => syscfg.exticr4.modify(|r, w| unsafe {
                w.bits((r.bits() & !field_mask) | field_bits)
            }),
        };

        // NOTE(safety) Read-modify-write limited to this line's bit.
        exti.ftsr.modify(|r, w| unsafe { w.bits(r.bits() | (1 << line)) });
        exti.imr.modify(|r, w| unsafe { w.bits(r.bits() | (1 << line)) });

        Self { exti, line }
    }

    pub fn line(&self) -> u8 { self.line }
}

impl EdgeDetect for RequestLine {
    fn is_pending(&self) -> bool {
        self.exti.pr.read().bits() & (1 << self.line) != 0
    }

    fn clear_pending(&mut self) {
        // The pending register clears by writing one to the bit.
        // NOTE(safety) Write limited to this line's bit.
        self.exti.pr.write(|w| unsafe { w.bits(1 << self.line) });
    }
}
