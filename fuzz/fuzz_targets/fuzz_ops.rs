#![no_main]
use std::collections::VecDeque;

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use rollbuf::{BufferError, RollingBuffer};

#[derive(Debug, Arbitrary)]
enum Op {
    Write(Vec<u8>),
    WriteByte(u8),
    Read(u8),
    ReadByte,
    Unread,
    Next(u8),
    ReadFrom(Vec<u8>),
    /// Drain through a sink that takes at most `n + 1` bytes per call.
    WriteTo(u8),
    Clear,
}

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    ops: Vec<Op>,
}

/// Accepts a bounded prefix of every offer.
struct Narrow {
    per_call: usize,
    received: Vec<u8>,
}

impl std::io::Write for Narrow {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = buf.len().min(self.per_call);
        self.received.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn run(input: Input) {
    let capacity = usize::from(input.capacity);
    let mut buf = RollingBuffer::new(capacity);
    let mut model: VecDeque<u8> = VecDeque::new();
    let mut consumed: Vec<u8> = Vec::new();

    for op in input.ops {
        match op {
            Op::Write(data) => {
                let n = buf.write(&data);
                assert_eq!(n, data.len().min(capacity - model.len()));
                model.extend(&data[..n]);
            }
            Op::WriteByte(b) => {
                if buf.write_byte(b).is_ok() {
                    model.push_back(b);
                } else {
                    assert_eq!(model.len(), capacity);
                }
            }
            Op::Read(n) => {
                let mut out = vec![0u8; usize::from(n)];
                if let Ok(k) = buf.read(&mut out) {
                    for &b in &out[..k] {
                        assert_eq!(model.pop_front(), Some(b));
                        consumed.push(b);
                    }
                } else {
                    assert!(model.is_empty());
                }
            }
            Op::ReadByte => match buf.read_byte() {
                Ok(b) => {
                    assert_eq!(model.pop_front(), Some(b));
                    consumed.push(b);
                }
                Err(e) => {
                    assert_eq!(e, BufferError::Eof);
                    assert!(model.is_empty());
                }
            },
            Op::Unread => {
                if buf.unread_byte().is_ok() {
                    let b = consumed.pop().expect("restored a byte never read");
                    model.push_front(b);
                }
            }
            Op::Next(n) => {
                let view = buf.next_bytes(usize::from(n)).into_owned();
                for b in view {
                    assert_eq!(model.pop_front(), Some(b));
                    consumed.push(b);
                }
            }
            Op::ReadFrom(data) => {
                let mut source: &[u8] = &data;
                let n = buf.read_from(&mut source).expect("slice source");
                model.extend(&data[..n]);
            }
            Op::WriteTo(n) => {
                let mut sink = Narrow {
                    per_call: usize::from(n) + 1,
                    received: Vec::new(),
                };
                let sent = buf.write_to(&mut sink).unwrap_or(0);
                assert_eq!(sent, sink.received.len());
                for b in sink.received {
                    assert_eq!(model.pop_front(), Some(b));
                    consumed.push(b);
                }
                assert!(model.is_empty());
            }
            Op::Clear => {
                buf.clear();
                model.clear();
                consumed.clear();
            }
        }

        buf.check_invariants();
        let (front, back) = buf.as_slices();
        assert!(front.iter().chain(back).eq(model.iter()));
    }
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    if let Ok(input) = Input::arbitrary(&mut u) {
        run(input);
    }
});
