//! Moving between neighbouring segments.
//!
//! [`FloatingConcat::step`] is the only place where the open segment is
//! replaced and where `index` and `segment_start` change.

use log::{debug, error, warn};

use super::FloatingConcat;
use crate::error::{FloatcatError, Result};
use crate::provider::{Direction, SegmentProvider, Step};
use crate::segment::Segment;

impl<P: SegmentProvider> FloatingConcat<P> {
    /// Make the neighbouring segment in `direction` current, if it exists.
    ///
    /// Returns [`Step::NotFound`] without touching any state when the
    /// neighbour is absent. Existence is a point-in-time probe: a neighbour
    /// deleted between the probe and the open (a rotating window retreating
    /// under us) surfaces as [`FloatcatError::Io`], with the old segment
    /// still current.
    ///
    /// The new segment is fully opened, sized and rewound before it replaces
    /// the old one. Only closing the outgoing segment can fail after the
    /// swap; that poisons the stream.
    pub(crate) fn step(&mut self, direction: Direction) -> Result<Step> {
        self.check_usable()?;

        // Position 0 is the start of the segment the stream was opened on,
        // earlier segments are outside the stream.
        if direction == Direction::Backward && self.index == self.origin_index {
            debug!("Segment index {} is the stream origin", self.index);
            return Ok(Step::NotFound);
        }

        let next_index = self.index.checked_add(direction.delta()).ok_or_else(|| {
            FloatcatError::IndexOutOfRange(format!("{} {:?}", self.index, direction))
        })?;
        let candidate = self.pattern.render(next_index);

        if !self.provider.exists(&candidate) {
            debug!("No segment at '{}' ({:?})", candidate, direction);
            return Ok(Step::NotFound);
        }

        let outgoing_size = self.current.refresh_size()?;

        let mut incoming = match Segment::open(&self.provider, &candidate) {
            Ok(segment) => segment,
            Err(e) => {
                warn!("Segment '{}' vanished between probe and open", candidate);
                return Err(e);
            }
        };
        incoming.rewind()?;

        let segment_start = match direction {
            Direction::Forward => self.segment_start + outgoing_size,
            Direction::Backward => {
                if incoming.size() > self.segment_start {
                    warn!(
                        "Segment '{}' grew after it was crossed, clamping segment start to 0",
                        candidate
                    );
                }
                self.segment_start.saturating_sub(incoming.size())
            }
        };

        let outgoing = std::mem::replace(&mut self.current, incoming);
        self.segment_start = segment_start;
        self.index = next_index;

        debug!(
            "Switched to segment '{}' (index {}, {} bytes, segment_start 0x{:x})",
            self.current.path(),
            self.index,
            self.current.size(),
            self.segment_start
        );

        if let Err(e) = outgoing.close() {
            error!("Could not close segment during transition: {}", e);
            self.poisoned = true;
            return Err(e);
        }
        Ok(Step::Switched)
    }
}
