#[cfg(feature = "std")]
mod streaming;
