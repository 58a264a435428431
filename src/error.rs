use crate::raster::RasterError;
use std::fmt;
use std::io;

pub type MosaicResult<T> = Result<T, MosaicError>;

#[derive(Debug)]
pub enum MosaicError {
    InvalidArgument(String),
    InvalidState(String),
    ReferenceSystemUnavailable(i32),
    IoFailure(io::Error),
    DecodeFailure {
        column: i64,
        row: i64,
        zoom: u32,
        reason: String,
    },
    RasterizationError(RasterError),
}

impl fmt::Display for MosaicError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MosaicError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
            MosaicError::InvalidState(msg) => write!(f, "Invalid state: {msg}"),
            MosaicError::ReferenceSystemUnavailable(srid) => {
                write!(f, "Reference system unavailable for srid {srid}")
            }
            MosaicError::IoFailure(e) => write!(f, "Archive I/O failure: {e}"),
            MosaicError::DecodeFailure {
                column,
                row,
                zoom,
                reason,
            } => write!(
                f,
                "Failed to decode tile ({column}, {row}) at zoom {zoom}: {reason}"
            ),
            e => write!(f, "{:?}", e),
        }
    }
}

impl std::error::Error for MosaicError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MosaicError::IoFailure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MosaicError {
    fn from(e: io::Error) -> Self {
        MosaicError::IoFailure(e)
    }
}

impl From<RasterError> for MosaicError {
    fn from(e: RasterError) -> Self {
        MosaicError::RasterizationError(e)
    }
}
