// Error type shared by the I/O layers (loader, store, output).
//
// The aggregation engine in `reports` never returns errors; malformed data
// degrades to zero contributions there instead.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{collection} index {index} out of range (len {len})")]
    IndexOutOfRange {
        collection: &'static str,
        index: usize,
        len: usize,
    },

    #[error("no funding data loaded")]
    NoData,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Error::Io {
            source,
            path: path.into(),
        }
    }
}

// Allow `?` on std::io::Error where the path is not at hand.
impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}
