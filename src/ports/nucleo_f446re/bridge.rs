//! Bridge construction for the Nucleo-F446RE target.
use super::pin_configuration::*;
use crate::devices::bridge::Bridge;
use crate::drivers::stm32f4::{
    exti::{Port, RequestLine},
    gpio::GpioExt,
    rcc::Clocks,
    serial::{self, Event, UsartExt},
    spi::{self, Spi},
};
use crate::error::Error;
use crate::hal::time::{Bps, U32Ext};
use crate::stm32pac;

/// Fully constructed bridge for this board.
pub type PortBridge = Bridge<BridgeSpi, ChipSelect, BridgeRequest, BridgeSerial>;

/// EXTI line wired to the request pin (PC7).
pub const REQUEST_LINE: u8 = 7;

/// Numeric board parameters, populated at startup and injected into
/// construction. The pin map itself lives in `pin_configuration` as
/// types; everything the hardware variant used to select through
/// conditional compilation that is genuinely a *value* belongs here.
pub struct BoardConfig {
    pub serial_baud: Bps,
    pub bus_mode: spi::Mode,
    pub bus_divider: u8,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            serial_baud: 9_600_u32.bps(),
            // Clock idle low, data sampled on the second edge.
            bus_mode: spi::Mode::One,
            bus_divider: spi::BAUD_RATE_DIVIDER,
        }
    }
}

impl Bridge<BridgeSpi, ChipSelect, BridgeRequest, BridgeSerial> {
    /// Brings up clocks, pins and peripherals, and assembles the
    /// bridge. Leaves NVIC configuration to the caller; after this
    /// returns, the serial receive interrupt and the request line
    /// are armed at the peripheral level.
    pub fn port(peripherals: stm32pac::Peripherals, config: BoardConfig) -> Result<Self, Error> {
        let clocks = Clocks::hardcoded(peripherals.FLASH, peripherals.RCC);

        let gpioa = peripherals.GPIOA.split();
        let gpiob = peripherals.GPIOB.split();
        let gpioc = peripherals.GPIOC.split();

        let tx: SerialTx = gpioa.pa2.into_alternate_af7();
        let rx: SerialRx = gpioa.pa3.into_alternate_af7();
        let sck: BusSck = gpioa.pa5.into_alternate_af5();
        let miso: BusMiso = gpioa.pa6.into_alternate_af5();
        let mosi: BusMosi = gpioa.pa7.into_alternate_af5();
        let chip_select: ChipSelect = gpiob.pb6.into_push_pull_output();
        let _request_pin: RequestPin = gpioc.pc7.into_pull_up_input();

        let serial_config = serial::config::Config::default().baudrate(config.serial_baud);
        let mut serial = peripherals
            .USART2
            .constrain((tx, rx), serial_config, clocks)
            .map_err(|_| Error::ConfigurationError("Invalid serial configuration"))?;
        serial.listen(Event::Rxne);

        let spi = Spi::spi1(
            peripherals.SPI1,
            (miso, mosi, sck),
            config.bus_mode,
            config.bus_divider,
        );

        let request = RequestLine::falling(
            peripherals.EXTI,
            peripherals.SYSCFG,
            Port::C,
            REQUEST_LINE,
        );

        Ok(Bridge::new(spi, chip_select, request, serial))
    }
}
