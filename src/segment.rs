//! Segment handle: one open [`SegmentStream`] plus its cached length.

use std::io::SeekFrom;

use crate::error::{FloatcatError, Result};
use crate::provider::{SegmentProvider, SegmentStream};

pub struct Segment<S> {
    path: String,
    stream: S,
    /// Length seen at open time or at the last [`Segment::refresh_size`].
    size: u64,
}

impl<S: SegmentStream> Segment<S> {
    /// Open `path` through `provider` and cache its size.
    ///
    /// If the size cannot be queried the freshly opened stream is closed
    /// again before the error is returned.
    pub fn open<P>(provider: &P, path: &str) -> Result<Self>
    where
        P: SegmentProvider<Stream = S>,
    {
        let mut stream = provider
            .open(path)
            .map_err(|e| FloatcatError::io(path, e))?;

        match stream.size() {
            Ok(size) => Ok(Segment {
                path: path.to_string(),
                stream,
                size,
            }),
            Err(e) => {
                // The size error is the one worth reporting.
                let _ = stream.close();
                Err(FloatcatError::io(path, e))
            }
        }
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Re-query the length, the file may have grown since it was opened.
    pub fn refresh_size(&mut self) -> Result<u64> {
        self.size = self.stream.size().map_err(|e| self.error(e))?;
        Ok(self.size)
    }

    /// Local offset of the cursor inside this segment.
    pub fn position(&mut self) -> Result<u64> {
        self.stream.stream_position().map_err(|e| self.error(e))
    }

    pub fn seek_to(&mut self, offset: u64) -> Result<u64> {
        self.stream
            .seek(SeekFrom::Start(offset))
            .map_err(|e| self.error(e))
    }

    #[inline]
    pub fn rewind(&mut self) -> Result<u64> {
        self.seek_to(0)
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.stream.read(buf).map_err(|e| self.error(e))
    }

    pub fn close(self) -> Result<()> {
        let Segment { path, stream, .. } = self;
        stream.close().map_err(|e| FloatcatError::io(&path, e))
    }

    fn error(&self, source: std::io::Error) -> FloatcatError {
        FloatcatError::io(&self.path, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::FsProvider;
    use std::fs;

    #[test]
    fn test_open_caches_size_and_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seg5.bin");
        fs::write(&path, b"0123456789").unwrap();

        let mut segment = Segment::open(&FsProvider, path.to_str().unwrap()).unwrap();
        assert_eq!(segment.size(), 10);
        assert_eq!(segment.seek_to(4).unwrap(), 4);

        let mut buf = [0u8; 3];
        assert_eq!(segment.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"456");
        assert_eq!(segment.position().unwrap(), 7);
        assert_eq!(segment.rewind().unwrap(), 0);

        fs::write(&path, b"0123456789abcdef").unwrap();
        assert_eq!(segment.size(), 10);
        assert_eq!(segment.refresh_size().unwrap(), 16);
        segment.close().unwrap();
    }

    #[test]
    fn test_open_missing_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seg6.bin");
        let path = path.to_str().unwrap();

        match Segment::open(&FsProvider, path) {
            Err(FloatcatError::Io { path: p, source }) => {
                assert_eq!(p, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            _ => panic!("expected an IO error"),
        }
    }
}
