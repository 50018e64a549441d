//! Generic serial/SPI bridge device.
//!
//! This module contains all bridge functionality, with the exception
//! of how to construct one. Construction is handled by the `port`
//! module as it depends on board specific information.
//!
//! The bridge owns the SPI master, the chip select line, the request
//! line latch and the serial link. It does no work on its own: each
//! public operation corresponds to exactly one hardware event, routed
//! here by the interrupt dispatch in the binary. The dispatch contract
//! is that at most one operation is ever active at a time; the same
//! physical bus and chip select line are shared between both event
//! paths, so transactions must never overlap.
use crate::{
    error::Error,
    hal::{exti::EdgeDetect, gpio::OutputPin, serial, spi::FullDuplex},
    utilities::guard::Guard,
};

/// Byte clocked out during a peer-requested read. Its value is a
/// don't-care; the transaction exists only to generate the clock
/// edges the peer needs to shift its reply out.
const PLACEHOLDER_BYTE: u8 = 0x00;

/// Identification string emitted once over serial after startup.
const GREETING: &str = "Master\r\n";

/// Default number of status polls before a bus or serial operation is
/// declared stalled. Transactions complete within a few peripheral
/// clock cycles at the configured divisors, so this is generous.
const POLL_BUDGET: u32 = 100_000;

pub struct Bridge<SPI, CS, REQ, SRL> {
    spi: SPI,
    chip_select: CS,
    request: REQ,
    serial: SRL,
    poll_budget: u32,
}

impl<SPI, CS, REQ, SRL> Bridge<SPI, CS, REQ, SRL>
where
    SPI: FullDuplex<u8>,
    CS: OutputPin,
    REQ: EdgeDetect,
    SRL: serial::Read<u8> + serial::Write<u8>,
    Error: From<SPI::Error>
        + From<<SRL as serial::Read<u8>>::Error>
        + From<<SRL as serial::Write<u8>>::Error>,
{
    /// Constructs a bridge from its four owned peripheral handles.
    /// The chip select line is released immediately; it stays released
    /// except inside a single transaction.
    pub fn new(spi: SPI, mut chip_select: CS, request: REQ, serial: SRL) -> Self {
        chip_select.set_high();
        Self { spi, chip_select, request, serial, poll_budget: POLL_BUDGET }
    }

    /// Overrides the number of polls allowed before an operation
    /// reports [`Error::TransportStall`].
    pub fn poll_budget(mut self, budget: u32) -> Self {
        self.poll_budget = budget;
        self
    }

    /// Emits the identification string over the serial link. Called
    /// once after startup, before interrupts are enabled; no bus
    /// transaction is involved.
    pub fn announce(&mut self) -> Result<(), Error> {
        for &byte in GREETING.as_bytes() {
            self.write_serial(byte)?;
        }
        Ok(())
    }

    /// Services one received serial byte: reads it out of the receive
    /// register (which is also the hardware acknowledgement) and
    /// forwards it over the bus. The peer's reply is discarded; this
    /// path is fire-and-forget by design.
    ///
    /// If no byte is actually pending the call is a no-op, so a
    /// spurious invocation never produces a bus transaction.
    pub fn on_serial_byte(&mut self) -> Result<(), Error> {
        let byte = match self.serial.read() {
            Ok(byte) => byte,
            Err(nb::Error::WouldBlock) => return Ok(()),
            Err(nb::Error::Other(error)) => return Err(error.into()),
        };
        self.exchange(byte)?;
        Ok(())
    }

    /// Services one latched request edge. The latch is acknowledged
    /// first, so an edge arriving mid-service stays pending instead of
    /// being lost, then a placeholder byte is clocked out to read the
    /// peer's reply, which goes out over the serial link.
    pub fn on_request(&mut self) -> Result<(), Error> {
        self.request.clear_pending();
        let reply = self.exchange(PLACEHOLDER_BYTE)?;
        self.write_serial(reply)
    }

    /// Releases the peripheral handles.
    pub fn release(self) -> (SPI, CS, REQ, SRL) {
        (self.spi, self.chip_select, self.request, self.serial)
    }

    /// Performs one full-duplex bus transaction: chip select is
    /// asserted strictly before the byte is clocked out, and released
    /// strictly after the hardware confirms completion (or after the
    /// poll budget runs out, so a wedged peer cannot hold the line).
    fn exchange(&mut self, byte: u8) -> Result<u8, Error> {
        let budget = self.poll_budget;
        let Self { spi, chip_select, .. } = self;
        let _select = Guard::new(chip_select, CS::set_low, CS::set_high);
        poll_bounded(budget, || spi.transmit(Some(byte)))?;
        poll_bounded(budget, || spi.receive())
    }

    fn write_serial(&mut self, byte: u8) -> Result<(), Error> {
        let budget = self.poll_budget;
        let serial = &mut self.serial;
        poll_bounded(budget, || serial.write(byte))
    }
}

/// Spins on a non-blocking operation until it completes, fails, or
/// exceeds its poll budget. The bound turns a transport that never
/// reports completion into a reportable error rather than a hang.
fn poll_bounded<T, E>(
    budget: u32,
    mut operation: impl FnMut() -> nb::Result<T, E>,
) -> Result<T, Error>
where
    Error: From<E>,
{
    for _ in 0..budget {
        match operation() {
            Ok(value) => return Ok(value),
            Err(nb::Error::WouldBlock) => continue,
            Err(nb::Error::Other(error)) => return Err(error.into()),
        }
    }
    Err(Error::TransportStall)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::doubles::{
        error::FakeError, exti::MockRequestLine, gpio::MockPin, serial::MockSerial, spi::MockSpi,
    };
    use crate::hal::gpio::InputPin;
    use std::{cell::RefCell, rc::Rc, vec::Vec};

    /// Shared event log, letting tests assert the relative order of
    /// chip select, bus and serial operations across doubles.
    type Log = Rc<RefCell<Vec<BusEvent>>>;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum BusEvent {
        Selected,
        Clocked(u8),
        Completed,
        Released,
        SerialOut(u8),
    }

    struct LoggingPin {
        log: Log,
    }

    impl OutputPin for LoggingPin {
        fn set_low(&mut self) { self.log.borrow_mut().push(BusEvent::Selected); }
        fn set_high(&mut self) { self.log.borrow_mut().push(BusEvent::Released); }
    }

    struct LoggingSpi {
        log: Log,
        reply: u8,
    }

    impl FullDuplex<u8> for LoggingSpi {
        type Error = FakeError;

        fn transmit(&mut self, word: Option<u8>) -> nb::Result<(), Self::Error> {
            self.log.borrow_mut().push(BusEvent::Clocked(word.unwrap_or(0)));
            Ok(())
        }

        fn receive(&mut self) -> nb::Result<u8, Self::Error> {
            self.log.borrow_mut().push(BusEvent::Completed);
            Ok(self.reply)
        }
    }

    struct LoggingSerial {
        log: Log,
        to_read: Option<u8>,
    }

    impl serial::Read<u8> for LoggingSerial {
        type Error = FakeError;

        fn read(&mut self) -> nb::Result<u8, Self::Error> {
            self.to_read.take().ok_or(nb::Error::WouldBlock)
        }
    }

    impl serial::Write<u8> for LoggingSerial {
        type Error = FakeError;

        fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
            self.log.borrow_mut().push(BusEvent::SerialOut(word));
            Ok(())
        }
    }

    fn logging_bridge(
        reply: u8,
        to_read: Option<u8>,
    ) -> (Bridge<LoggingSpi, LoggingPin, MockRequestLine, LoggingSerial>, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let bridge = Bridge::new(
            LoggingSpi { log: log.clone(), reply },
            LoggingPin { log: log.clone() },
            MockRequestLine::latched(),
            LoggingSerial { log: log.clone(), to_read },
        );
        // Drop the chip select release recorded during construction.
        log.borrow_mut().clear();
        (bridge, log)
    }

    #[test]
    fn serial_bytes_are_forwarded_to_the_bus_verbatim() {
        // Given
        let pending: Vec<u8> = (0..=255).collect();
        let serial = MockSerial::with_pending(&pending);
        let mut bridge =
            Bridge::new(MockSpi::new(), MockPin::default(), MockRequestLine::default(), serial);

        // When
        for _ in 0..=255 {
            bridge.on_serial_byte().unwrap();
        }

        // Then
        let (spi, _, _, serial) = bridge.release();
        assert_eq!(pending, spi.sent.into_iter().collect::<Vec<u8>>());
        assert!(serial.written.is_empty());
    }

    #[test]
    fn chip_select_frames_the_forwarding_transaction() {
        // Given
        let (mut bridge, log) = logging_bridge(0xAA, Some(0x42));

        // When
        bridge.on_serial_byte().unwrap();

        // Then
        assert_eq!(
            *log.borrow(),
            [BusEvent::Selected, BusEvent::Clocked(0x42), BusEvent::Completed, BusEvent::Released]
        );
    }

    #[test]
    fn forwarded_reply_is_discarded_with_no_serial_echo() {
        // Given
        let mut spi = MockSpi::new();
        spi.to_receive.push_back(0xAA);
        let serial = MockSerial::with_pending(&[0x42]);
        let mut bridge =
            Bridge::new(spi, MockPin::default(), MockRequestLine::default(), serial);

        // When
        bridge.on_serial_byte().unwrap();

        // Then
        let (spi, _, _, serial) = bridge.release();
        assert_eq!(spi.sent, [0x42]);
        assert!(serial.written.is_empty());
    }

    #[test]
    fn spurious_serial_event_produces_no_transaction() {
        // Given
        let mut bridge = Bridge::new(
            MockSpi::new(),
            MockPin::default(),
            MockRequestLine::default(),
            MockSerial::default(),
        );

        // When
        bridge.on_serial_byte().unwrap();

        // Then
        let (spi, _, _, _) = bridge.release();
        assert!(spi.sent.is_empty());
    }

    #[test]
    fn request_edge_reads_peer_byte_and_forwards_it_over_serial() {
        // Given
        let mut spi = MockSpi::new();
        spi.to_receive.push_back(0x7E);
        let mut bridge = Bridge::new(
            spi,
            MockPin::default(),
            MockRequestLine::latched(),
            MockSerial::default(),
        );

        // When
        bridge.on_request().unwrap();

        // Then
        let (spi, _, request, serial) = bridge.release();
        assert_eq!(spi.sent, [PLACEHOLDER_BYTE]);
        assert_eq!(serial.written, [0x7E]);
        assert_eq!(request.clears, 1);
        assert!(!request.pending);
    }

    #[test]
    fn request_transaction_completes_before_the_serial_forward() {
        // Given
        let (mut bridge, log) = logging_bridge(0x7E, None);

        // When
        bridge.on_request().unwrap();

        // Then
        assert_eq!(
            *log.borrow(),
            [
                BusEvent::Selected,
                BusEvent::Clocked(0x00),
                BusEvent::Completed,
                BusEvent::Released,
                BusEvent::SerialOut(0x7E),
            ]
        );
    }

    #[test]
    fn back_to_back_edges_produce_two_distinct_transactions() {
        // Given
        let mut spi = MockSpi::new();
        spi.to_receive.push_back(0x11);
        spi.to_receive.push_back(0x22);
        let mut bridge = Bridge::new(
            spi,
            MockPin::default(),
            MockRequestLine::latched(),
            MockSerial::default(),
        );

        // When
        bridge.on_request().unwrap();
        bridge.on_request().unwrap();

        // Then
        let (spi, _, request, serial) = bridge.release();
        assert_eq!(spi.sent, [PLACEHOLDER_BYTE, PLACEHOLDER_BYTE]);
        assert_eq!(serial.written, [0x11, 0x22]);
        assert_eq!(request.clears, 2);
    }

    #[test]
    fn startup_emits_the_identification_string_and_nothing_else() {
        // Given
        let mut bridge = Bridge::new(
            MockSpi::new(),
            MockPin::default(),
            MockRequestLine::default(),
            MockSerial::default(),
        );

        // When
        bridge.announce().unwrap();

        // Then
        let (spi, _, _, serial) = bridge.release();
        assert_eq!(serial.written, b"Master\r\n");
        assert!(spi.sent.is_empty());
    }

    #[test]
    fn stalled_bus_reports_transport_stall_and_releases_chip_select() {
        // Given
        let mut spi = MockSpi::new();
        spi.stalled = true;
        let serial = MockSerial::with_pending(&[0x42]);
        let mut bridge =
            Bridge::new(spi, MockPin::default(), MockRequestLine::default(), serial)
                .poll_budget(16);

        // When
        let result = bridge.on_serial_byte();

        // Then
        assert_eq!(result, Err(Error::TransportStall));
        let (_, chip_select, _, _) = bridge.release();
        assert!(chip_select.is_high());
        assert_eq!(chip_select.changes.last(), Some(&true));
    }
}
