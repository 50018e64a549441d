//! Firmware entry point and interrupt dispatch.
//!
//! The bridge does no work outside of interrupts: after construction
//! and the startup identification string, the core sleeps and the two
//! ISRs below route hardware events into the device. The NVIC
//! guarantees at most one handler runs at a time; both handlers go
//! through the same critical-section protected slot, which also
//! satisfies the borrow checker's view of the shared bridge.
#![cfg_attr(test, allow(unused_attributes))]
#![cfg_attr(all(not(test), target_arch = "arm"), no_std)]
#![cfg_attr(target_arch = "arm", no_main)]

#[allow(unused_imports)]
use cortex_m_rt::entry;

#[cfg(target_arch = "arm")]
mod firmware {
    use busbridge_lib::{
        error::Error,
        ports::nucleo_f446re::bridge::{BoardConfig, PortBridge},
        stm32pac::{self, interrupt, Interrupt},
    };
    use core::cell::RefCell;
    use cortex_m::interrupt::Mutex;
    use defmt_rtt as _;

    /// Priorities within the shared NVIC grouping. The request line
    /// outranks serial receive, so a peer with data pending is
    /// serviced ahead of a queued outbound byte.
    const REQUEST_PRIORITY: u8 = 32;
    const SERIAL_PRIORITY: u8 = 64;

    /// Single owner slot for the constructed bridge. Only the two
    /// ISRs touch it after startup, always inside a critical section.
    static BRIDGE: Mutex<RefCell<Option<PortBridge>>> = Mutex::new(RefCell::new(None));

    pub fn run() -> ! {
        let peripherals = stm32pac::Peripherals::take().unwrap();
        let mut cortex = cortex_m::Peripherals::take().unwrap();

        let mut bridge = match PortBridge::port(peripherals, BoardConfig::default()) {
            Ok(bridge) => bridge,
            Err(_) => {
                defmt::error!("Bridge construction failed; halting.");
                panic!();
            }
        };

        if bridge.announce().is_err() {
            defmt::warn!("Identification string could not be sent");
        }

        cortex_m::interrupt::free(|cs| BRIDGE.borrow(cs).replace(Some(bridge)));

        // NOTE(safety) Priorities are set before unmasking, while no
        // handler can fire yet.
        unsafe {
            cortex.NVIC.set_priority(Interrupt::EXTI9_5, REQUEST_PRIORITY);
            cortex.NVIC.set_priority(Interrupt::USART2, SERIAL_PRIORITY);
            cortex_m::peripheral::NVIC::unmask(Interrupt::EXTI9_5);
            cortex_m::peripheral::NVIC::unmask(Interrupt::USART2);
        }

        defmt::info!("Bridge initialised");

        loop {
            cortex_m::asm::wfi();
        }
    }

    fn service<F: FnOnce(&mut PortBridge) -> Result<(), Error>>(handler: F) {
        cortex_m::interrupt::free(|cs| {
            if let Some(bridge) = BRIDGE.borrow(cs).borrow_mut().as_mut() {
                if let Err(error) = handler(bridge) {
                    defmt::warn!("Event service failed: {:?}", error);
                }
            }
        });
    }

    #[interrupt]
    fn USART2() {
        service(PortBridge::on_serial_byte);
    }

    #[interrupt]
    fn EXTI9_5() {
        service(PortBridge::on_request);
    }
}

#[cfg(target_arch = "arm")]
#[entry]
fn main() -> ! {
    firmware::run()
}

#[cfg(not(target_arch = "arm"))]
fn main() {}
