//! Pin map for the Nucleo-F446RE Arduino header.
//!
//! * D13/D12/D11 (PA5/PA6/PA7) carry the SPI bus signals.
//! * D10 (PB6) is the chip select, driven as a plain output.
//! * D9 (PC7) is the peer request line, pulled up, falling edge.
//! * D1/D0 (PA2/PA3) carry USART2 TX/RX towards the host.
use crate::drivers::stm32f4::{
    exti::RequestLine,
    gpio::{gpioa::*, gpiob::*, gpioc::*, Input, Output, PullUp, PushPull, AF5, AF7},
    serial::Serial,
    spi::Spi,
};
use crate::stm32pac::{SPI1, USART2};

pub type SerialTx = Pa2<AF7>;
pub type SerialRx = Pa3<AF7>;
pub type SerialPins = (SerialTx, SerialRx);

pub type BusSck = Pa5<AF5>;
pub type BusMiso = Pa6<AF5>;
pub type BusMosi = Pa7<AF5>;
pub type BusPins = (BusMiso, BusMosi, BusSck);

pub type ChipSelect = Pb6<Output<PushPull>>;
pub type RequestPin = Pc7<Input<PullUp>>;

pub type BridgeSerial = Serial<USART2, SerialPins>;
pub type BridgeSpi = Spi<SPI1, BusPins, u8>;
pub type BridgeRequest = RequestLine;
