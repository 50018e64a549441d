//! Error type for the bridge firmware as a whole.
//!
//! Unlike the specific driver errors, this error contains textual
//! descriptions of the problem as it is meant to be directly
//! reported through the serial link.
use crate::hal::serial::Write;
use crate::{uprint, uprintln};
use core::fmt::Debug;

#[derive(Debug, Copy, Clone, PartialEq, Eq, defmt::Format)]
pub enum Error {
    /// Error caused by a low level peripheral driver
    DriverError(&'static str),
    /// Error caused by a faulty configuration
    ConfigurationError(&'static str),
    /// A bus transaction exceeded its poll budget without the
    /// hardware reporting completion
    TransportStall,
}

/// Exposes a report_unwrap() method that behaves like
/// unwrap(), but also reports any errors via serial before panicking.
pub trait ReportOnUnwrap<T, S: Write<u8>>
where
    S::Error: Debug,
{
    fn report_unwrap(self, serial: &mut S) -> T;
}

impl<T, S: Write<u8>> ReportOnUnwrap<T, S> for Result<T, Error>
where
    S::Error: Debug,
{
    fn report_unwrap(self, serial: &mut S) -> T {
        match self {
            Ok(value) => value,
            Err(error) => {
                error.report(serial);
                panic!();
            }
        }
    }
}

impl Error {
    /// Reports error via abstract serial device
    pub fn report<S: Write<u8>>(&self, serial: &mut S)
    where
        S::Error: Debug,
    {
        match self {
            Error::DriverError(text) => {
                uprint!(serial, "[DriverError] -> ");
                uprintln!(serial, text);
            }
            Error::ConfigurationError(text) => {
                uprint!(serial, "[ConfigurationError] -> ");
                uprintln!(serial, text);
            }
            Error::TransportStall => {
                uprintln!(serial, "[TransportStall] -> Bus transaction never completed");
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::doubles::serial::MockSerial;

    #[test]
    fn driver_errors_report_their_category_and_description() {
        // Given
        let mut serial = MockSerial::default();
        let error = Error::DriverError("Serial line error");

        // When
        error.report(&mut serial);

        // Then
        assert_eq!(serial.written, b"[DriverError] -> Serial line error\r\n");
    }

    #[test]
    #[should_panic]
    fn report_unwrap_reports_and_panics_on_failure() {
        // Given
        let mut serial = MockSerial::default();
        let failure: Result<(), Error> = Err(Error::ConfigurationError("Invalid baud rate"));

        // When / Then
        failure.report_unwrap(&mut serial);
    }

    #[test]
    fn transport_stalls_report_without_a_description() {
        // Given
        let mut serial = MockSerial::default();

        // When
        Error::TransportStall.report(&mut serial);

        // Then
        assert_eq!(
            serial.written,
            &b"[TransportStall] -> Bus transaction never completed\r\n"[..]
        );
    }
}
