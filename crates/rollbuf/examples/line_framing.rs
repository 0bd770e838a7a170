//! Splits a byte stream into newline-delimited frames using a small
//! [`RollingBuffer`] as the staging area between the transport and the
//! framer.
//!
//! The "transport" below hands out bytes in irregular bursts, much like a
//! non-blocking socket. The framer pulls whatever is available with
//! `read_from`, then peels complete lines off the front. A partial line is
//! left in place; the buffer simply wraps around to make room for the rest.
//!
//! Run with
//!
//! ```bash
//! cargo run -p rollbuf --example line_framing
//! ```

use std::io::{self, Read};

use rollbuf::RollingBuffer;

/// A reader that yields at most one burst per call.
struct Bursty<'a> {
    bursts: std::slice::Iter<'a, &'a [u8]>,
}

impl Read for Bursty<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(burst) = self.bursts.next() else {
            return Ok(0);
        };
        // Bursts in this demo never exceed the free space.
        let n = burst.len().min(buf.len());
        buf[..n].copy_from_slice(&burst[..n]);
        Ok(n)
    }
}

/// Removes the first complete line from `buf`, without its terminator.
fn next_frame(buf: &mut RollingBuffer) -> Option<Vec<u8>> {
    let (front, back) = buf.as_slices();
    let newline = front
        .iter()
        .chain(back)
        .position(|&b| b == b'\n')?;
    let mut frame = buf.next_bytes(newline + 1).into_owned();
    frame.pop();
    Some(frame)
}

fn main() -> io::Result<()> {
    let bursts: [&[u8]; 6] = [
        b"GET /index",
        b".html\nHost: exa",
        b"mple.org\nAc",
        b"cept: */*\n",
        b"\n",
        b"",
    ];
    let mut transport = Bursty {
        bursts: bursts.iter(),
    };
    let mut staging = RollingBuffer::new(32);

    loop {
        let pulled = staging.read_from(&mut transport)?;
        while let Some(frame) = next_frame(&mut staging) {
            if frame.is_empty() {
                println!("<end of headers>");
            } else {
                println!("frame: {}", String::from_utf8_lossy(&frame));
            }
        }
        if pulled == 0 {
            break;
        }
    }

    if !staging.is_empty() {
        println!("{} unterminated bytes left", staging.len());
    }
    Ok(())
}
