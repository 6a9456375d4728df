//! Range math and part planning.
//!
//! Splits `[0, total_size)` into N contiguous inclusive byte ranges and
//! renders them as HTTP `Range` header values.

mod range;

pub use range::{plan_ranges, ByteRange};
