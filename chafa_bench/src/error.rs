use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load renderer library {path}: {source}")]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },
    #[error("renderer library {path} is missing symbol `{symbol}`: {source}")]
    MissingSymbol {
        path: PathBuf,
        symbol: String,
        #[source]
        source: libloading::Error,
    },
    #[error("renderer call `{0}` failed")]
    ExternalCall(&'static str),
    #[error("renderer returned text that is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("invalid benchmark configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid image geometry: {0}")]
    InvalidImage(String),
    #[error("image codec error for {path}: {source}")]
    Codec {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid results JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no baseline results found at {path}; run the baseline benchmark first")]
    MissingBaseline { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
