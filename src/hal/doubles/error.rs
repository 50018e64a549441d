use crate::error::Error;

#[derive(Debug, Copy, Clone)]
pub struct FakeError;

impl From<FakeError> for Error {
    fn from(_error: FakeError) -> Self {
        Error::DriverError("A fake error occurred [TESTING ONLY]")
    }
}
