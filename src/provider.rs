//! The single-segment stream abstraction floatcat is built on.
//!
//! A [`SegmentProvider`] knows how to probe for and open one segment; the
//! [`SegmentStream`] it hands back is read, seeked, sized and closed by the
//! navigator. [`crate::raw::FsProvider`] is the filesystem implementation.

use std::io::{self, Read, Seek};

/// One open segment.
pub trait SegmentStream: Read + Seek {
    /// Current length of the segment in bytes. May grow between calls.
    fn size(&mut self) -> io::Result<u64>;

    /// Release the segment, reporting failures that a plain drop would hide.
    fn close(self) -> io::Result<()>;
}

/// Opens segments by path.
pub trait SegmentProvider {
    type Stream: SegmentStream;

    fn open(&self, path: &str) -> io::Result<Self::Stream>;

    /// Cheap point-in-time existence check, no handle is kept.
    fn exists(&self, path: &str) -> bool;
}

/// Direction of a navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    #[inline]
    pub fn delta(self) -> i64 {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Outcome of a navigation step that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The neighbouring segment does not exist, nothing changed.
    NotFound,
    /// The neighbouring segment is now the current one.
    Switched,
}
