//! A fixed-capacity rolling byte buffer.
//!
//! [`RollingBuffer`] is a FIFO staging area for bytes that sits between a
//! producer and a consumer: a socket and a frame decoder, a file and a
//! tokenizer. Its storage is allocated (or supplied) once and reused by
//! wrapping around, so steady-state operation never allocates.
//!
//! Occupied bytes are tracked as at most two contiguous segments of the
//! backing array rather than as a head index and a length. Reads, writes,
//! [`next_bytes`](RollingBuffer::next_bytes) and the streaming operations
//! [`read_from`](RollingBuffer::read_from) and
//! [`write_to`](RollingBuffer::write_to) all move whole segments.
//!
//! ```rust
//! use rollbuf::{BufferError, RollingBuffer};
//!
//! let mut buf = RollingBuffer::new(4);
//! assert_eq!(buf.write(b"abcdef"), 4);
//! assert_eq!(buf.read_byte(), Ok(b'a'));
//! buf.unread_byte()?;
//! assert_eq!(buf.read_byte(), Ok(b'a'));
//! assert_eq!(buf.next_bytes(8).as_ref(), b"bcd");
//! assert_eq!(buf.read_byte(), Err(BufferError::Eof));
//! # Ok::<(), BufferError>(())
//! ```
//!
//! # Features
//!
//! - `std` (default): implements `std::io::{Read, BufRead, Write}` for the
//!   buffer and makes every reader a [`ByteSource`] and every writer a
//!   [`ByteSink`].
//! - `fuzzing`: exposes `RollingBuffer::check_invariants`.

#![no_std]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod buffer;
mod error;
#[cfg(feature = "std")]
mod io;
mod segment;
mod stream;

#[cfg(test)]
mod tests;

pub use buffer::{DEFAULT_CAPACITY, RollingBuffer};
pub use error::{BufferError, TransferError};
pub use segment::SlotState;
pub use stream::{ByteSink, ByteSource};
