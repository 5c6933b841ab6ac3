//! RAW segment files
//!
//! This module provides [`RAW`], a thin wrapper around [`std::fs::File`] that
//! implements [`SegmentStream`], and [`FsProvider`], the [`SegmentProvider`]
//! opening such files from the local filesystem.
//!

use std::{
    fs::{self, File},
    io::{self, Read, Seek, SeekFrom},
    path::Path,
};

use log::debug;

use crate::provider::{SegmentProvider, SegmentStream};

/// One segment file opened read-only.
pub struct RAW {
    /// The underlying file handle.
    pub file: File,
}

impl RAW {
    /// Opens the file at `file_path` and returns a new [`RAW`] wrapper.
    ///
    /// # Errors
    ///
    /// Returns any [`io::Error`] produced by [`File::open`], e.g. when the
    /// path does not exist or the process lacks sufficient permissions.
    pub fn new(file_path: &str) -> Result<RAW, io::Error> {
        let path = Path::new(file_path);
        let file = File::open(path)?;
        Ok(RAW { file })
    }
}

impl Read for RAW {
    /// Forwards to [`File::read`]. Returns `0` at the current end of file,
    /// later calls may return more data if the file grows.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for RAW {
    /// Seeks within the underlying file, delegating to [`File::seek`].
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl SegmentStream for RAW {
    /// Queries the file metadata, so growth since opening is visible.
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Read-only handles have nothing to flush, dropping the descriptor is enough.
    fn close(self) -> io::Result<()> {
        drop(self.file);
        Ok(())
    }
}

/// Filesystem [`SegmentProvider`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FsProvider;

impl SegmentProvider for FsProvider {
    type Stream = RAW;

    fn open(&self, path: &str) -> io::Result<RAW> {
        debug!("Opening segment file: {}", path);
        RAW::new(path)
    }

    /// A regular file is present at `path`. Permissions are only checked by
    /// the subsequent [`FsProvider::open`].
    fn exists(&self, path: &str) -> bool {
        fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
    }
}
