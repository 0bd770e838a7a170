//! Streaming between a [`RollingBuffer`] and external byte producers and
//! consumers.
//!
//! [`ByteSource`] and [`ByteSink`] are the two capabilities the buffer
//! consumes. With the `std` feature every [`std::io::Read`] is a source and
//! every [`std::io::Write`] is a sink. Without it, `&[u8]` and `Vec<u8>` are
//! provided with the same behavior.

use alloc::vec;

use tracing::{debug, trace};

use crate::{RollingBuffer, error::TransferError};

/// Something that can produce bytes on request.
pub trait ByteSource {
    /// Error reported when production fails.
    type Error;

    /// Fills a prefix of `dst` with whatever is available right now and
    /// returns its length. `Ok(0)` means nothing was available.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn pull(&mut self, dst: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Something that can accept bytes, possibly fewer than offered.
pub trait ByteSink {
    /// Error reported when the sink fails.
    type Error;

    /// Accepts a prefix of `src` and returns its length.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn push(&mut self, src: &[u8]) -> Result<usize, Self::Error>;
}

#[cfg(feature = "std")]
impl<R: std::io::Read + ?Sized> ByteSource for R {
    type Error = std::io::Error;

    fn pull(&mut self, dst: &mut [u8]) -> Result<usize, Self::Error> {
        self.read(dst)
    }
}

#[cfg(feature = "std")]
impl<W: std::io::Write + ?Sized> ByteSink for W {
    type Error = std::io::Error;

    fn push(&mut self, src: &[u8]) -> Result<usize, Self::Error> {
        self.write(src)
    }
}

#[cfg(not(feature = "std"))]
impl ByteSource for &[u8] {
    type Error = core::convert::Infallible;

    fn pull(&mut self, dst: &mut [u8]) -> Result<usize, Self::Error> {
        let n = dst.len().min(self.len());
        let (head, rest) = self.split_at(n);
        dst[..n].copy_from_slice(head);
        *self = rest;
        Ok(n)
    }
}

#[cfg(not(feature = "std"))]
impl ByteSink for alloc::vec::Vec<u8> {
    type Error = core::convert::Infallible;

    fn push(&mut self, src: &[u8]) -> Result<usize, Self::Error> {
        self.extend_from_slice(src);
        Ok(src.len())
    }
}

impl<S> RollingBuffer<S>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Pulls once from `source` into the free space and returns the number of
    /// bytes added.
    ///
    /// The pull is bounded by [`free`](Self::free) and is not repeated, so a
    /// source that trickles data fills the buffer only partially; call again
    /// to keep filling. A full buffer returns `Ok(0)` without touching the
    /// source. When the free space is contiguous the source writes straight
    /// into the backing array.
    ///
    /// A pull that yields nothing leaves the buffer exactly as it was,
    /// including segment anchors, so an [`unread_byte`](Self::unread_byte)
    /// that was possible before is still possible after.
    ///
    /// # Errors
    ///
    /// The source's error, unchanged. The buffer is left exactly as it was:
    /// no bytes are added and no segment is re-anchored or handed off.
    pub fn read_from<R>(&mut self, source: &mut R) -> Result<usize, R::Error>
    where
        R: ByteSource + ?Sized,
    {
        let free = self.free();
        let mark = self.write_mark();
        let Some(room) = self.tail() else {
            return Ok(0);
        };

        if room.len() == free {
            let pulled = match source.pull(&mut self.bytes_mut()[room.clone()]) {
                Ok(n) => n.min(free),
                Err(err) => {
                    self.rewind(mark);
                    return Err(err);
                }
            };
            if pulled == 0 {
                self.rewind(mark);
                return Ok(0);
            }
            self.commit(pulled);
            trace!(pulled, free, "pulled into contiguous free space");
            return Ok(pulled);
        }

        // Free space wraps; stage it so the source still sees one request.
        let mut scratch = vec![0u8; free];
        let pulled = match source.pull(&mut scratch) {
            Ok(n) => n.min(free),
            Err(err) => {
                self.rewind(mark);
                return Err(err);
            }
        };
        if pulled == 0 {
            self.rewind(mark);
            return Ok(0);
        }
        let written = self.write(&scratch[..pulled]);
        trace!(pulled, free, "pulled into wrapped free space");
        Ok(written)
    }

    /// Sends every held byte to `sink`, oldest first, straight from the
    /// backing array.
    ///
    /// Partial acceptance is handled by offering the remainder again. Returns
    /// the number of bytes sent, which on success is the whole previous
    /// [`len`](Self::len).
    ///
    /// # Errors
    ///
    /// - [`TransferError::Eof`] when the buffer is empty.
    /// - [`TransferError::Stalled`] when the sink accepts nothing.
    /// - [`TransferError::Sink`] when the sink fails.
    ///
    /// Both failure variants carry the cumulative count already sent; those
    /// bytes are consumed, the rest stay buffered.
    pub fn write_to<W>(&mut self, sink: &mut W) -> Result<usize, TransferError<W::Error>>
    where
        W: ByteSink + ?Sized,
    {
        if self.is_empty() {
            return Err(TransferError::Eof);
        }
        let mut transferred = 0;
        while let Some(span) = self.head() {
            match sink.push(&self.bytes()[span.range()]) {
                Ok(0) => {
                    debug!(transferred, pending = self.len(), "sink stalled");
                    return Err(TransferError::Stalled { transferred });
                }
                Ok(n) => {
                    let n = n.min(span.len());
                    self.advance(n);
                    transferred += n;
                    trace!(n, transferred, "sink accepted");
                }
                Err(source) => {
                    debug!(transferred, pending = self.len(), "sink failed");
                    return Err(TransferError::Sink {
                        transferred,
                        source,
                    });
                }
            }
        }
        Ok(transferred)
    }
}
