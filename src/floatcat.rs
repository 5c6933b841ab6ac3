//! **Floating concat stream**
//!
//! [`FloatingConcat`] presents a numbered series of segment files
//! (`clip7.dat`, `clip8.dat`, …) as one logical byte stream implementing
//! [`Read`] and [`Seek`]. Segments are discovered lazily by probing the
//! neighbour of the current one, so the series may grow at its end or lose
//! segments at its start while the stream is open.
//!
//! Only one segment is open at a time. The logical position is
//! `segment_start + local offset`, where `segment_start` accumulates the sizes
//! of the segments crossed before the current one, as they were when crossed.

mod navigator;
mod reader;
mod seeker;

pub use seeker::Whence;

use std::io::{self, Read, Seek, SeekFrom};

use log::{debug, info};
use serde::Serialize;

use crate::error::{FloatcatError, Result};
use crate::pattern::SegmentPattern;
use crate::provider::SegmentProvider;
use crate::raw::FsProvider;
use crate::segment::Segment;

/// Logical offset 0 is the start of the segment the stream was opened on.
/// Segments numbered below it stay out of reach even when they exist: seeking
/// before offset 0 clamps to it. To read older segments, open the oldest one,
/// e.g. the first entry of [`SegmentPattern::discover`].
pub struct FloatingConcat<P: SegmentProvider = FsProvider> {
    provider: P,
    /// The one open segment.
    current: Segment<P::Stream>,
    /// Index embedded in the current segment's path.
    index: i64,
    /// Index of the segment the stream was opened on, logical offset 0.
    origin_index: i64,
    pattern: SegmentPattern,
    /// Bytes in every segment crossed before the current one.
    segment_start: u64,
    /// Set when a segment transition failed half way.
    poisoned: bool,
}

/// Snapshot of the stream bookkeeping.
#[derive(Debug, Clone, Serialize)]
pub struct StreamInfo {
    pub template: String,
    pub index: i64,
    pub segment_path: String,
    pub segment_size: u64,
    pub segment_start: u64,
    pub position: u64,
    pub known_len: u64,
}

impl FloatingConcat<FsProvider> {
    /// Open the stream on the local filesystem, starting at the segment named
    /// by `path`.
    ///
    /// ```no_run
    /// # use floatcat::FloatingConcat;
    /// # use std::io::Read;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut stream = FloatingConcat::open("/captures/clip0007.dat")?;
    /// let mut head = [0u8; 188];
    /// stream.read_exact(&mut head)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with(FsProvider, path)
    }
}

impl<P: SegmentProvider> FloatingConcat<P> {
    /// Open the stream through a custom provider.
    ///
    /// # Errors
    ///
    /// Pattern errors from [`SegmentPattern::derive`], and
    /// [`FloatcatError::SegmentNotFound`] or [`FloatcatError::Io`] if the
    /// initial segment cannot be opened.
    pub fn open_with(provider: P, path: &str) -> Result<Self> {
        let (pattern, index) = SegmentPattern::derive(path)?;
        let first = pattern.render(index);

        if !provider.exists(&first) {
            return Err(FloatcatError::SegmentNotFound(first));
        }
        let current = Segment::open(&provider, &first)?;
        debug!(
            "Opened floating concat on '{}' (index {}, {} bytes)",
            first,
            index,
            current.size()
        );

        Ok(FloatingConcat {
            provider,
            current,
            index,
            origin_index: index,
            pattern,
            segment_start: 0,
            poisoned: false,
        })
    }

    /// Close the current segment, reporting the close result.
    pub fn close(self) -> Result<()> {
        debug!("Closing floating concat at '{}'", self.current.path());
        self.current.close()
    }

    #[inline]
    pub fn index(&self) -> i64 {
        self.index
    }

    #[inline]
    pub fn segment_start(&self) -> u64 {
        self.segment_start
    }

    #[inline]
    pub fn current_path(&self) -> &str {
        self.current.path()
    }

    #[inline]
    pub fn pattern(&self) -> &SegmentPattern {
        &self.pattern
    }

    /// Logical length known without probing: everything crossed so far plus
    /// the cached size of the current segment.
    #[inline]
    pub fn known_len(&self) -> u64 {
        self.segment_start + self.current.size()
    }

    /// Absolute logical position. Never navigates.
    pub fn position(&mut self) -> Result<u64> {
        self.check_usable()?;
        Ok(self.segment_start + self.current.position()?)
    }

    pub fn info(&mut self) -> Result<StreamInfo> {
        let position = self.position()?;
        Ok(StreamInfo {
            template: self.pattern.template(),
            index: self.index,
            segment_path: self.current.path().to_string(),
            segment_size: self.current.size(),
            segment_start: self.segment_start,
            position,
            known_len: self.known_len(),
        })
    }

    /// Outputs a human-readable summary to the current `log` subscriber.
    pub fn print_info(&mut self) -> Result<()> {
        let info = self.info()?;
        info!("Floating Concat Stream Information:");
        info!("  Template: {}", info.template);
        info!("  Current Segment: {} (index {})", info.segment_path, info.index);
        info!("  Segment Size: {} bytes", info.segment_size);
        info!("  Segment Start: 0x{:x}", info.segment_start);
        info!("  Position: 0x{:x}", info.position);
        info!("  Known Length: {} bytes", info.known_len);
        Ok(())
    }

    #[inline]
    fn check_usable(&self) -> Result<()> {
        if self.poisoned {
            Err(FloatcatError::Poisoned)
        } else {
            Ok(())
        }
    }
}

// ===== std::io trait implementations =======================================
impl<P: SegmentProvider> Read for FloatingConcat<P> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_segments(buf)?)
    }
}

impl<P: SegmentProvider> Seek for FloatingConcat<P> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(self.seek_whence(pos.into())?)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position()?)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers shared by the stream unit tests.

    use std::fs;
    use std::path::Path;

    /// Write `prefix{index}.dat` for every `(index, size)`, filling each
    /// segment with a byte pattern that encodes its index and offset.
    pub fn write_segments(dir: &Path, prefix: &str, segments: &[(i64, usize)]) -> Vec<u8> {
        let mut all = Vec::new();
        for (index, size) in segments {
            let data = segment_bytes(*index, *size);
            fs::write(dir.join(format!("{}{}.dat", prefix, index)), &data).unwrap();
            all.extend_from_slice(&data);
        }
        all
    }

    pub fn segment_bytes(index: i64, size: usize) -> Vec<u8> {
        (0..size)
            .map(|i| (index as u8).wrapping_mul(31).wrapping_add(i as u8))
            .collect()
    }

    pub fn path_of(dir: &Path, prefix: &str, index: i64) -> String {
        dir.join(format!("{}{}.dat", prefix, index))
            .to_str()
            .unwrap()
            .to_string()
    }
}
