use alloc::{borrow::Cow, boxed::Box, vec};
use core::{fmt, ops::Range};

use tracing::trace;

use crate::{
    error::BufferError,
    segment::{Selector, SlotState, Span},
};

/// Capacity used by [`RollingBuffer::default`].
pub const DEFAULT_CAPACITY: usize = 4096;

/// A fixed-capacity FIFO byte buffer that reuses its storage by wrapping
/// around.
///
/// Bytes are appended at the tail with [`write`](Self::write) and consumed
/// from the head with [`read`](Self::read), [`next_bytes`](Self::next_bytes)
/// or [`write_to`](Self::write_to). The backing storage is allocated (or
/// supplied) once and never resized.
///
/// Internally the occupied bytes form at most two contiguous segments of the
/// backing array. Bulk operations move whole segments at a time, so no
/// per-byte index arithmetic happens on the hot path.
///
/// Writes never fail for lack of room; they report how many bytes were
/// accepted.
///
/// ```rust
/// use rollbuf::RollingBuffer;
///
/// let mut buf = RollingBuffer::new(8);
/// assert_eq!(buf.write(b"hello world"), 8);
///
/// let mut out = [0u8; 5];
/// assert_eq!(buf.read(&mut out), Ok(5));
/// assert_eq!(&out, b"hello");
///
/// // The freed space at the front is reused.
/// assert_eq!(buf.write(b"!!!!!!"), 5);
/// assert_eq!(buf.as_slices(), (&b" wo"[..], &b"!!!!!"[..]));
/// ```
pub struct RollingBuffer<S = Box<[u8]>> {
    storage: S,
    capacity: usize,
    slots: [Option<Span>; 2],
    read_sel: Selector,
    write_sel: Selector,
}

impl RollingBuffer {
    /// Creates an empty buffer holding at most `capacity` bytes.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_storage(vec![0u8; capacity].into_boxed_slice())
    }
}

impl Default for RollingBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<S> RollingBuffer<S>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Creates an empty buffer over caller-supplied storage.
    ///
    /// The storage length becomes the capacity. Whatever it contains is
    /// treated as free space.
    ///
    /// ```rust
    /// use rollbuf::RollingBuffer;
    ///
    /// let mut buf = RollingBuffer::with_storage([0u8; 16]);
    /// assert_eq!(buf.capacity(), 16);
    /// assert!(buf.is_empty());
    /// ```
    pub fn with_storage(storage: S) -> Self {
        let capacity = storage.as_ref().len();
        Self {
            storage,
            capacity,
            slots: [None, None],
            read_sel: Selector::default(),
            write_sel: Selector::default(),
        }
    }

    /// Returns the backing storage, discarding any held bytes.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Total number of bytes the buffer can hold. Fixed for its lifetime.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of unread bytes currently held.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().map(|span| span.len()).sum()
    }

    /// Number of bytes that can be written before the buffer is full.
    #[inline]
    pub fn free(&self) -> usize {
        self.capacity - self.len()
    }

    /// Whether the buffer holds no unread bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every byte of capacity is occupied.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Drops every held byte and forgets both segment anchors.
    ///
    /// After `clear` there is nothing to unread.
    pub fn clear(&mut self) {
        self.slots = [None, None];
        self.read_sel = Selector::default();
        self.write_sel = Selector::default();
    }

    /// States of the two slots, in slot order.
    pub fn slot_states(&self) -> [SlotState; 2] {
        self.slots.map(|slot| SlotState::of(slot, self.capacity))
    }

    /// The unread bytes in FIFO order, as at most two slices.
    ///
    /// The second slice is non-empty only when the held bytes wrap around the
    /// end of the backing array. Nothing is consumed.
    pub fn as_slices(&self) -> (&[u8], &[u8]) {
        let bytes = self.bytes();
        let front = self.slots[self.read_sel.index()].filter(|span| !span.is_empty());
        let back = self.slots[self.read_sel.flip().index()].filter(|span| !span.is_empty());
        match (front, back) {
            (Some(a), Some(b)) => (&bytes[a.range()], &bytes[b.range()]),
            (Some(a), None) | (None, Some(a)) => (&bytes[a.range()], &[]),
            (None, None) => (&[], &[]),
        }
    }

    /// Appends as much of `src` as fits and returns the number of bytes
    /// accepted.
    ///
    /// Bytes beyond the free space are dropped; a full buffer accepts `0`.
    pub fn write(&mut self, src: &[u8]) -> usize {
        let want = src.len().min(self.free());
        let mut written = 0;
        while written < want {
            let Some(room) = self.tail() else { break };
            let take = (want - written).min(room.len());
            self.bytes_mut()[room.start..room.start + take]
                .copy_from_slice(&src[written..written + take]);
            self.commit(take);
            written += take;
        }
        written
    }

    /// Appends one byte.
    ///
    /// # Errors
    ///
    /// [`BufferError::Full`] when there is no free space; the byte is
    /// dropped.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), BufferError> {
        if self.write(&[byte]) == 1 {
            Ok(())
        } else {
            Err(BufferError::Full)
        }
    }

    /// Moves up to `dst.len()` of the oldest bytes into `dst`.
    ///
    /// Returns how many bytes were copied, which is less than `dst.len()`
    /// only when the buffer ran dry.
    ///
    /// # Errors
    ///
    /// [`BufferError::Eof`] when the buffer is empty. Nothing is modified.
    pub fn read(&mut self, dst: &mut [u8]) -> Result<usize, BufferError> {
        if self.is_empty() {
            return Err(BufferError::Eof);
        }
        let want = dst.len().min(self.len());
        let mut read = 0;
        while read < want {
            let Some(span) = self.head() else { break };
            let take = (want - read).min(span.len());
            dst[read..read + take].copy_from_slice(&self.bytes()[span.start..span.start + take]);
            self.advance(take);
            read += take;
        }
        Ok(read)
    }

    /// Consumes the oldest byte.
    ///
    /// # Errors
    ///
    /// [`BufferError::Eof`] when the buffer is empty.
    pub fn read_byte(&mut self) -> Result<u8, BufferError> {
        let mut byte = [0u8];
        self.read(&mut byte)?;
        Ok(byte[0])
    }

    /// Restores the most recently consumed byte so it is read again next.
    ///
    /// No bytes are copied; the active read segment is widened by one.
    ///
    /// # Errors
    ///
    /// - [`BufferError::Full`] when the buffer is full, since the slot behind
    ///   the segment belongs to the other segment.
    /// - [`BufferError::NothingToUnread`] when the active read segment is
    ///   unanchored or already starts at offset zero, e.g. on a fresh buffer
    ///   or after repeated unreads.
    pub fn unread_byte(&mut self) -> Result<(), BufferError> {
        if self.is_full() {
            return Err(BufferError::Full);
        }
        match &mut self.slots[self.read_sel.index()] {
            Some(span) if span.start > 0 => {
                span.start -= 1;
                Ok(())
            }
            _ => Err(BufferError::NothingToUnread),
        }
    }

    /// Consumes up to `n` of the oldest bytes and returns them.
    ///
    /// When the bytes lie within one segment the result borrows the backing
    /// array directly. When they straddle the wraparound point they are
    /// copied into a fresh allocation. Returns an empty slice when the
    /// buffer is empty.
    ///
    /// ```rust
    /// use std::borrow::Cow;
    /// use rollbuf::RollingBuffer;
    ///
    /// let mut buf = RollingBuffer::new(4);
    /// buf.write(b"abcd");
    /// assert!(matches!(buf.next_bytes(3), Cow::Borrowed(b"abc")));
    /// buf.write(b"ef");
    /// assert_eq!(buf.next_bytes(3).into_owned(), b"def");
    /// ```
    pub fn next_bytes(&mut self, n: usize) -> Cow<'_, [u8]> {
        let n = n.min(self.len());
        let Some(span) = self.head() else {
            return Cow::Borrowed(&[]);
        };
        if n <= span.len() {
            self.advance(n);
            return Cow::Borrowed(&self.bytes()[span.start..span.start + n]);
        }

        trace!(n, front = span.len(), "next_bytes spans both segments, copying");
        let mut out = vec![0u8; n];
        let copied = self.read(&mut out).unwrap_or(0);
        out.truncate(copied);
        Cow::Owned(out)
    }

    #[inline]
    pub(crate) fn bytes(&self) -> &[u8] {
        &self.storage.as_ref()[..self.capacity]
    }

    #[inline]
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.storage.as_mut()[..self.capacity]
    }

    /// The non-empty segment the next read drains, flipping the read selector
    /// off an exhausted slot. `None` only when the buffer is empty.
    pub(crate) fn head(&mut self) -> Option<Span> {
        if self.is_empty() {
            return None;
        }
        for _ in 0..2 {
            if let Some(span) = self.slots[self.read_sel.index()] {
                if !span.is_empty() {
                    return Some(span);
                }
            }
            trace!(from = self.read_sel.index(), "read slot exhausted, switching");
            self.read_sel = self.read_sel.flip();
        }
        None
    }

    /// Marks `n` bytes at the front of the active read segment as consumed.
    #[inline]
    pub(crate) fn advance(&mut self, n: usize) {
        if let Some(span) = &mut self.slots[self.read_sel.index()] {
            debug_assert!(n <= span.len());
            span.start += n;
        }
    }

    /// The contiguous free range the next write lands in, switching the write
    /// selector off a saturated slot and anchoring unused slots at offset
    /// zero. `None` only when the buffer is full.
    pub(crate) fn tail(&mut self) -> Option<Range<usize>> {
        let free = self.free();
        if free == 0 {
            return None;
        }
        for _ in 0..2 {
            let idx = self.write_sel.index();
            let span = match self.slots[idx] {
                Some(span) if !(span.is_empty() && span.end == self.capacity) => span,
                _ => {
                    trace!(slot = idx, "anchoring write slot at offset zero");
                    self.slots[idx] = Some(Span::ANCHOR);
                    Span::ANCHOR
                }
            };
            if span.end < self.capacity {
                // Bounded by the free total: when this slot sits below the
                // other segment, that is exactly the gap up to its start.
                return Some(span.end..(span.end + free).min(self.capacity));
            }
            trace!(from = idx, "write slot saturated, switching");
            self.write_sel = self.write_sel.flip();
        }
        None
    }

    /// Captures the write-side bookkeeping so a [`tail`](Self::tail) that is
    /// followed by no [`commit`](Self::commit) can be undone.
    #[inline]
    pub(crate) fn write_mark(&self) -> WriteMark {
        WriteMark {
            slots: self.slots,
            write_sel: self.write_sel,
        }
    }

    /// Restores a [`WriteMark`]. Only valid while nothing has been committed
    /// since it was taken.
    #[inline]
    pub(crate) fn rewind(&mut self, mark: WriteMark) {
        debug_assert_eq!(self.len(), mark.slots.iter().flatten().map(|s| s.len()).sum::<usize>());
        self.slots = mark.slots;
        self.write_sel = mark.write_sel;
    }

    /// Marks `n` bytes after the active write segment as written.
    #[inline]
    pub(crate) fn commit(&mut self, n: usize) {
        if let Some(span) = &mut self.slots[self.write_sel.index()] {
            debug_assert!(span.end + n <= self.capacity);
            span.end += n;
        }
    }

    /// Panics if the segment bookkeeping is inconsistent.
    ///
    /// Checks that both segments lie within the array, do not overlap, and
    /// together hold no more than the capacity.
    #[cfg(any(test, feature = "fuzzing"))]
    pub fn check_invariants(&self) {
        for span in self.slots.iter().flatten() {
            assert!(span.start <= span.end, "inverted segment {span:?}");
            assert!(span.end <= self.capacity, "segment {span:?} past capacity {}", self.capacity);
        }
        if let [Some(a), Some(b)] = self.slots {
            assert!(!a.overlaps(b), "segments overlap: {a:?} and {b:?}");
        }
        assert!(self.len() <= self.capacity);
        assert_eq!(self.len() + self.free(), self.capacity);
        let (front, back) = self.as_slices();
        assert_eq!(front.len() + back.len(), self.len());
    }
}

/// Slot anchors and write selector as they were before a speculative
/// [`RollingBuffer::tail`].
#[derive(Clone, Copy)]
pub(crate) struct WriteMark {
    slots: [Option<Span>; 2],
    write_sel: Selector,
}

struct SlotDebug(Option<Span>, usize);

impl fmt::Debug for SlotDebug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None => f.write_str("Unanchored"),
            Some(span) => write!(f, "{:?}({:?})", SlotState::of(self.0, self.1), span.range()),
        }
    }
}

impl<S> fmt::Debug for RollingBuffer<S>
where
    S: AsRef<[u8]> + AsMut<[u8]>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b] = self.slots;
        f.debug_struct("RollingBuffer")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("slots", &[SlotDebug(a, self.capacity), SlotDebug(b, self.capacity)])
            .field("read", &self.read_sel)
            .field("write", &self.write_sel)
            .finish()
    }
}
