use thiserror::Error;

/// Fatal errors. Anything here ends the process.
#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("could not install the log subscriber: {0}")]
    LogInit(#[from] tracing_subscriber::util::TryInitError),
}

pub type Result<T> = std::result::Result<T, Error>;
