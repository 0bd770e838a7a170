//! `std::io` adapters for [`RollingBuffer`].

use std::io;

use crate::{
    RollingBuffer,
    error::{BufferError, TransferError},
};

impl<S> io::Read for RollingBuffer<S>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    /// End of data is reported as `Ok(0)`.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match RollingBuffer::read(self, buf) {
            Ok(n) => Ok(n),
            Err(BufferError::Eof) => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

impl<S> io::BufRead for RollingBuffer<S>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Exposes the active read segment without copying. After wraparound the
    /// remaining bytes are exposed once this segment is consumed.
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(match self.head() {
            Some(span) => &self.bytes()[span.range()],
            None => &[],
        })
    }

    fn consume(&mut self, amt: usize) {
        if let Some(span) = self.head() {
            self.advance(amt.min(span.len()));
        }
    }
}

impl<S> io::Write for RollingBuffer<S>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Accepts as much as fits; `Ok(0)` when full.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(RollingBuffer::write(self, buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl From<BufferError> for io::Error {
    fn from(e: BufferError) -> Self {
        let kind = match e {
            BufferError::Eof => io::ErrorKind::UnexpectedEof,
            BufferError::Full => io::ErrorKind::WriteZero,
            BufferError::NothingToUnread => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, e)
    }
}

impl From<TransferError<io::Error>> for io::Error {
    fn from(e: TransferError<io::Error>) -> Self {
        match e {
            TransferError::Sink { source, .. } => source,
            TransferError::Eof => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            TransferError::Stalled { .. } => io::Error::new(io::ErrorKind::WriteZero, e),
        }
    }
}
