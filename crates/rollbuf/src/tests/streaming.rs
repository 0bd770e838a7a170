use alloc::{format, vec, vec::Vec};
use std::io;

use rstest::rstest;

use crate::{RollingBuffer, TransferError};

/// Sink that accepts at most `per_call` bytes each time and optionally fails
/// once `fail_after` bytes have been accepted.
struct Trickle {
    per_call: usize,
    fail_after: Option<usize>,
    received: Vec<u8>,
    calls: usize,
}

impl Trickle {
    fn new(per_call: usize) -> Self {
        Trickle {
            per_call,
            fail_after: None,
            received: Vec::new(),
            calls: 0,
        }
    }
}

impl io::Write for Trickle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.calls += 1;
        if self.fail_after.is_some_and(|limit| self.received.len() >= limit) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away"));
        }
        let n = buf.len().min(self.per_call);
        self.received.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Source that hands out at most `per_call` bytes per pull and counts pulls.
struct Dribble<'a> {
    data: &'a [u8],
    per_call: usize,
    pulls: usize,
}

impl io::Read for Dribble<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.pulls += 1;
        let n = buf.len().min(self.per_call).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

struct Broken;

impl io::Read for Broken {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
    }
}

/// A 10-byte buffer holding "0123456789"-style bytes split across both
/// segments: six at the array end, four wrapped to the front.
fn wrapped() -> RollingBuffer {
    let mut buf = RollingBuffer::new(10);
    buf.write(b"xxxx012345");
    buf.read(&mut [0u8; 4]).unwrap();
    buf.write(b"6789");
    assert_ne!(buf.as_slices().1.len(), 0);
    buf
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(6)]
#[case(64)]
fn write_to_delivers_in_order_with_partial_sinks(#[case] per_call: usize) {
    let mut buf = wrapped();
    let mut sink = Trickle::new(per_call);

    assert_eq!(buf.write_to(&mut sink).ok(), Some(10));
    assert_eq!(sink.received, b"0123456789");
    assert!(buf.is_empty());
    assert_eq!(sink.calls, 6usize.div_ceil(per_call) + 4usize.div_ceil(per_call));
}

#[test]
fn write_to_on_empty_buffer_is_eof() {
    let mut buf = RollingBuffer::new(4);
    let mut sink = Trickle::new(4);
    assert!(matches!(buf.write_to(&mut sink), Err(TransferError::Eof)));
    assert_eq!(sink.calls, 0);
}

#[test]
fn write_to_reports_cumulative_count_on_sink_error() {
    let mut buf = wrapped();
    let mut sink = Trickle::new(3);
    sink.fail_after = Some(7);

    let err = buf.write_to(&mut sink).unwrap_err();
    assert_eq!(err.transferred(), 9);
    match err {
        TransferError::Sink {
            transferred,
            source,
        } => {
            assert_eq!(transferred, 9);
            assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
        }
        other => panic!("expected sink error, got {other:?}"),
    }

    // Accepted bytes are gone; the rest is still buffered.
    assert_eq!(sink.received, b"012345678");
    assert_eq!(buf.next_bytes(10).as_ref(), b"9");
}

#[test]
fn write_to_stops_on_stalled_sink() {
    let mut buf = wrapped();
    let mut sink = Trickle::new(0);
    assert!(matches!(
        buf.write_to(&mut sink),
        Err(TransferError::Stalled { transferred: 0 })
    ));
    assert_eq!(buf.len(), 10);
}

#[test]
fn read_from_is_a_single_bounded_pull() {
    let data: Vec<u8> = (0..32).collect();
    let mut buf = RollingBuffer::new(16);
    let mut source = Dribble {
        data: &data,
        per_call: 5,
        pulls: 0,
    };

    assert_eq!(buf.read_from(&mut source).unwrap(), 5);
    assert_eq!(source.pulls, 1);
    assert_eq!(buf.read_from(&mut source).unwrap(), 5);
    assert_eq!(buf.read_from(&mut source).unwrap(), 5);
    assert_eq!(buf.read_from(&mut source).unwrap(), 1);
    assert!(buf.is_full());

    assert_eq!(buf.read_from(&mut source).unwrap(), 0);
    assert_eq!(source.pulls, 4, "full buffer must not pull");
    assert_eq!(buf.next_bytes(16).as_ref(), &data[..16]);
}

#[test]
fn read_from_fills_wrapped_free_space_in_one_pull() {
    let mut buf = RollingBuffer::new(8);
    buf.write(b"abcdef");
    buf.read(&mut [0u8; 4]).unwrap();
    // "ef" at [4, 6); free space is [6, 8) plus [0, 4).

    let mut source = Dribble {
        data: b"123456789",
        per_call: 64,
        pulls: 0,
    };
    assert_eq!(buf.read_from(&mut source).unwrap(), 6);
    assert_eq!(source.pulls, 1);
    assert!(buf.is_full());
    assert_eq!(buf.as_slices(), (&b"ef12"[..], &b"3456"[..]));
}

#[test]
fn read_from_propagates_source_error() {
    let mut buf = RollingBuffer::new(8);
    buf.write(b"ab");
    let err = buf.read_from(&mut Broken).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    assert_eq!(buf.next_bytes(8).as_ref(), b"ab");
}

#[test]
fn failed_read_from_keeps_unread_available() {
    let mut buf = RollingBuffer::new(4);
    buf.write(b"abcd");
    buf.read(&mut [0u8; 4]).unwrap();

    assert!(buf.read_from(&mut Broken).is_err());
    assert_eq!(buf.unread_byte(), Ok(()));
    assert_eq!(buf.read_byte(), Ok(b'd'));
}

#[test]
fn dry_read_from_keeps_unread_available() {
    let mut buf = RollingBuffer::new(4);
    buf.write(b"abcd");
    buf.read(&mut [0u8; 4]).unwrap();

    assert_eq!(buf.read_from(&mut &b""[..]).ok(), Some(0));
    assert_eq!(buf.unread_byte(), Ok(()));
    assert_eq!(buf.read_byte(), Ok(b'd'));
}

#[rstest]
#[case::drained_at_array_end(b"abcd", 4)]
#[case::saturated_front_consumed(b"abcd", 2)]
#[case::free_space_wraps(b"abc", 2)]
#[case::fresh(b"", 0)]
fn read_from_without_bytes_leaves_layout_untouched(#[case] fill: &[u8], #[case] consume: usize) {
    let mut buf = RollingBuffer::new(4);
    buf.write(fill);
    if consume > 0 {
        buf.read(&mut vec![0u8; consume]).unwrap();
    }
    let before = format!("{buf:?}");

    assert!(buf.read_from(&mut Broken).is_err());
    assert_eq!(format!("{buf:?}"), before);
    assert_eq!(buf.read_from(&mut &b""[..]).ok(), Some(0));
    assert_eq!(format!("{buf:?}"), before);
    buf.check_invariants();
}

#[test]
fn buffers_chain_through_streaming() {
    let mut upstream = RollingBuffer::new(6);
    let mut downstream = RollingBuffer::new(4);
    upstream.write(b"hello!");

    let mut out = Vec::new();
    while !upstream.is_empty() || !downstream.is_empty() {
        downstream.read_from(&mut upstream).unwrap();
        let mut chunk = vec![0u8; 3];
        let n = downstream.read(&mut chunk).unwrap_or(0);
        out.extend_from_slice(&chunk[..n]);
    }
    assert_eq!(out, b"hello!");
}
