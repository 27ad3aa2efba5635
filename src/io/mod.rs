//! Audio I/O modules
//!
//! Audio decoding using Symphonia and per-channel sample buffers.

pub mod decoder;
pub mod sample_buffer;
