//! Sequential reads across segment boundaries.

use log::{debug, warn};

use super::FloatingConcat;
use crate::error::Result;
use crate::provider::{Direction, SegmentProvider, Step};

impl<P: SegmentProvider> FloatingConcat<P> {
    /// Fill `buf` from the current position, moving on to the following
    /// segments as each one is drained.
    ///
    /// Returns the number of bytes copied. `Ok(0)` (for a non-empty `buf`)
    /// means end of stream: the current segment is drained and no next
    /// segment exists yet. A later call may return data again if the last
    /// segment grows or a new segment appears.
    ///
    /// An error after some bytes were copied is dropped in favour of the
    /// partial count; the failing operation will fail again on the next call.
    pub fn read_segments(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.check_usable()?;

        let mut total = 0;
        while total < buf.len() {
            let read = match self.current.read(&mut buf[total..]) {
                Ok(read) => read,
                Err(e) if total > 0 => {
                    warn!("Read interrupted after {} bytes: {}", total, e);
                    break;
                }
                Err(e) => return Err(e),
            };

            if read > 0 {
                total += read;
                continue;
            }

            // Current segment drained.
            match self.step(Direction::Forward) {
                Ok(Step::Switched) => {}
                Ok(Step::NotFound) => {
                    debug!("End of stream at index {}", self.index);
                    break;
                }
                Err(e) if total > 0 => {
                    warn!("Read interrupted after {} bytes: {}", total, e);
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }
}
