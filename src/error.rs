//! Error taxonomy shared by every floatcat module.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FloatcatError {
    #[error("No segment index (decimal digit run) found in path '{0}'")]
    NoSegmentIndex(String),

    #[error("Segment template is {len} bytes long, maximum is {max}")]
    TemplateTooLong { len: usize, max: usize },

    #[error("Segment index '{0}' does not fit a 64-bit integer")]
    IndexOutOfRange(String),

    #[error("Segment not found: {0}")]
    SegmentNotFound(String),

    #[error("IO error on segment '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid seek mode: {0}")]
    InvalidSeekMode(String),

    #[error("Stream is unusable after a failed segment transition")]
    Poisoned,

    #[error("Glob error: {0}")]
    Glob(String),
}

impl FloatcatError {
    pub(crate) fn io(path: &str, source: io::Error) -> Self {
        FloatcatError::Io {
            path: path.to_string(),
            source,
        }
    }
}

impl From<FloatcatError> for io::Error {
    fn from(err: FloatcatError) -> Self {
        let kind = match &err {
            FloatcatError::Io { source, .. } => source.kind(),
            FloatcatError::SegmentNotFound(_) => io::ErrorKind::NotFound,
            FloatcatError::Poisoned | FloatcatError::Glob(_) => io::ErrorKind::Other,
            FloatcatError::NoSegmentIndex(_)
            | FloatcatError::TemplateTooLong { .. }
            | FloatcatError::IndexOutOfRange(_)
            | FloatcatError::InvalidSeekMode(_) => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, err)
    }
}

pub type Result<T> = std::result::Result<T, FloatcatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_kind_mapping() {
        let err: io::Error = FloatcatError::SegmentNotFound("a1.dat".into()).into();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);

        let err: io::Error = FloatcatError::InvalidSeekMode("7".into()).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let inner = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: io::Error = FloatcatError::io("a2.dat", inner).into();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(err.to_string().contains("a2.dat"));
    }
}
