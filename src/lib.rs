//! Read a numbered series of segment files (`clip7.dat`, `clip8.dat`, …) as
//! one seekable byte stream, while segments keep appearing at the end of the
//! series and disappearing from its start.

pub mod error;
pub mod floatcat;
pub mod pattern;
pub mod provider;
pub mod raw;
pub mod segment;

pub use error::{FloatcatError, Result};
pub use floatcat::{FloatingConcat, StreamInfo, Whence};
pub use pattern::SegmentPattern;
pub use provider::{Direction, SegmentProvider, SegmentStream, Step};
pub use raw::{FsProvider, RAW};
