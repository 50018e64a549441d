use super::error::FakeError;
use crate::hal::serial;
use std::collections::VecDeque;
use std::vec::Vec;

/// Serial double that records every written byte and serves reads
/// from a scripted queue. An empty queue reads as `WouldBlock`,
/// mirroring a receive register with its pending flag clear.
#[derive(Debug, Default)]
pub struct MockSerial {
    pub to_read: VecDeque<u8>,
    pub written: Vec<u8>,
}

impl MockSerial {
    pub fn with_pending(bytes: &[u8]) -> Self {
        Self { to_read: bytes.iter().cloned().collect(), written: Vec::new() }
    }
}

impl serial::Read<u8> for MockSerial {
    type Error = FakeError;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.to_read.pop_front().ok_or(nb::Error::WouldBlock)
    }
}

impl serial::Write<u8> for MockSerial {
    type Error = FakeError;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.written.push(word);
        Ok(())
    }
}
