//! Translating logical seeks into navigation steps plus one local seek.

use std::io::SeekFrom;
use std::str::FromStr;

use log::{debug, warn};

use super::FloatingConcat;
use crate::error::{FloatcatError, Result};
use crate::provider::{Direction, SegmentProvider, Step};

/// Seek origin, the stream's counterpart to [`SeekFrom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Start(u64),
    Current(i64),
    End(i64),
}

impl Whence {
    /// Build from a C style `whence` code (`0` set, `1` cur, `2` end).
    pub fn from_raw(whence: i32, offset: i64) -> Result<Whence> {
        match whence {
            0 => Self::start(offset),
            1 => Ok(Whence::Current(offset)),
            2 => Ok(Whence::End(offset)),
            other => Err(FloatcatError::InvalidSeekMode(other.to_string())),
        }
    }

    /// Build from a mode name: `set`/`start`, `cur`/`current`, `end`, or
    /// their numeric codes.
    pub fn from_name(mode: &str, offset: i64) -> Result<Whence> {
        match mode.parse::<WhenceMode>()? {
            WhenceMode::Start => Self::start(offset),
            WhenceMode::Current => Ok(Whence::Current(offset)),
            WhenceMode::End => Ok(Whence::End(offset)),
        }
    }

    fn start(offset: i64) -> Result<Whence> {
        u64::try_from(offset)
            .map(Whence::Start)
            .map_err(|_| FloatcatError::InvalidSeekMode(format!("start offset {}", offset)))
    }
}

impl From<SeekFrom> for Whence {
    fn from(pos: SeekFrom) -> Self {
        match pos {
            SeekFrom::Start(o) => Whence::Start(o),
            SeekFrom::Current(o) => Whence::Current(o),
            SeekFrom::End(o) => Whence::End(o),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WhenceMode {
    Start,
    Current,
    End,
}

impl FromStr for WhenceMode {
    type Err = FloatcatError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "set" | "start" | "0" => Ok(WhenceMode::Start),
            "cur" | "current" | "1" => Ok(WhenceMode::Current),
            "end" | "2" => Ok(WhenceMode::End),
            _ => Err(FloatcatError::InvalidSeekMode(s.to_string())),
        }
    }
}

impl<P: SegmentProvider> FloatingConcat<P> {
    /// Seek the logical stream and return the absolute position reached.
    ///
    /// Targets before the origin clamp to `0`. Targets past the last existing
    /// segment clamp to its end, after re-reading its size in case it grew.
    pub fn seek_whence(&mut self, whence: Whence) -> Result<u64> {
        self.check_usable()?;
        debug!("Seeking to {:?}", whence);

        match whence {
            Whence::Start(target) => {
                let target = i64::try_from(target).map_err(|_| {
                    FloatcatError::InvalidSeekMode(format!("start offset {}", target))
                })?;
                let current = self.position()?;
                let current = i64::try_from(current).map_err(|_| {
                    FloatcatError::InvalidSeekMode(format!("current position {}", current))
                })?;
                self.seek_relative(target - current)
            }
            Whence::Current(delta) => self.seek_relative(delta),
            Whence::End(delta) => {
                while self.step(Direction::Forward)? == Step::Switched {}
                let size = self.current.refresh_size()?;
                // seek_relative expects a valid local offset to start from.
                self.current.rewind()?;
                let delta = (size as i64).checked_add(delta).ok_or_else(|| {
                    FloatcatError::InvalidSeekMode(format!("end offset {}", delta))
                })?;
                self.seek_relative(delta)
            }
        }
    }

    /// Move `delta` bytes from the current local offset, crossing into
    /// neighbouring segments as needed.
    ///
    /// A target exactly on a segment boundary lands at offset 0 of the later
    /// segment, when that segment exists.
    pub(crate) fn seek_relative(&mut self, mut delta: i64) -> Result<u64> {
        let offset = self.current.position()? as i64;

        while offset.saturating_add(delta) < 0 {
            let before = self.segment_start;
            match self.step(Direction::Backward)? {
                Step::NotFound => {
                    warn!(
                        "Seek before the first segment, clamping to 0x{:x}",
                        self.segment_start
                    );
                    let local = self.current.rewind()?;
                    return Ok(self.segment_start + local);
                }
                Step::Switched => {
                    delta = delta.saturating_add((before - self.segment_start) as i64)
                }
            }
        }

        loop {
            let target = offset.saturating_add(delta);
            if target < self.current.size() as i64 {
                break;
            }
            // The segment may have grown since it was sized.
            let size = self.current.refresh_size()?;
            if target < size as i64 {
                break;
            }

            let before = self.segment_start;
            match self.step(Direction::Forward)? {
                Step::NotFound => {
                    let target = target as u64;
                    if target > size {
                        warn!(
                            "Seek past the last segment, clamping to 0x{:x}",
                            self.segment_start + size
                        );
                    }
                    let local = self.current.seek_to(target.min(size))?;
                    return Ok(self.segment_start + local);
                }
                Step::Switched => {
                    delta = delta.saturating_sub((self.segment_start - before) as i64)
                }
            }
        }

        let local = self.current.seek_to((offset + delta) as u64)?;
        Ok(self.segment_start + local)
    }
}
