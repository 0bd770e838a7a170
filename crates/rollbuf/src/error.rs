use thiserror::Error;

/// Conditions reported by the byte-level operations of
/// [`RollingBuffer`](crate::RollingBuffer).
///
/// None of these are fatal: the buffer is left exactly as it was before the
/// failing call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// The buffer holds no unread bytes.
    #[error("end of buffered data")]
    Eof,
    /// Every byte of capacity is occupied.
    #[error("buffer is full")]
    Full,
    /// The active read segment is already at its anchor; there is no earlier
    /// byte to restore.
    #[error("no previously read byte to unread")]
    NothingToUnread,
}

/// Failure of [`RollingBuffer::write_to`](crate::RollingBuffer::write_to).
///
/// `transferred` is the cumulative number of bytes the sink accepted before
/// the transfer stopped. Those bytes have already left the buffer.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TransferError<E> {
    /// The buffer was empty when the transfer started.
    #[error("end of buffered data")]
    Eof,
    /// The sink accepted zero bytes of a non-empty offer.
    #[error("sink stalled after {transferred} bytes")]
    Stalled {
        /// Bytes delivered before the sink stalled.
        transferred: usize,
    },
    /// The sink reported an error.
    #[error("sink failed after {transferred} bytes: {source}")]
    Sink {
        /// Bytes delivered before the error.
        transferred: usize,
        /// The sink's error, unmodified.
        #[source]
        source: E,
    },
}

impl<E> TransferError<E> {
    /// Bytes delivered to the sink before the transfer stopped.
    #[must_use]
    pub fn transferred(&self) -> usize {
        match self {
            Self::Eof => 0,
            Self::Stalled { transferred } | Self::Sink { transferred, .. } => *transferred,
        }
    }
}
