//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] egismoc_core::Error),
    
    #[error("Transport error: {0}")]
    Transport(#[from] egismoc_transport::Error),
    
    #[error("Type error: {0}")]
    Types(#[from] egismoc_types::Error),
    
    #[error("Protocol error: {0}")]
    Protocol(String),
    
    #[error("Invalid print data: {0}")]
    DataInvalid(String),
    
    #[error("Print is already enrolled")]
    DataDuplicate,
    
    #[error("Device storage is full")]
    DataFull,
    
    #[error("No enrolled prints on the device")]
    DataNotFound,
    
    #[error("Another task is already running: {0}")]
    Busy(&'static str),
    
    #[error("Device not open")]
    NotOpen,
    
    #[error("Device already open")]
    AlreadyOpen,
    
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// Check if the error is about print data or device storage contents
    pub fn is_data_error(&self) -> bool {
        match self {
            Error::DataInvalid(_)
            | Error::DataDuplicate
            | Error::DataFull
            | Error::DataNotFound => true,
            Error::Core(e) => e.is_data_error(),
            _ => false,
        }
    }

    /// Check if the same operation may succeed when simply run again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Cancelled
                | Error::Busy(_)
                | Error::Transport(egismoc_transport::Error::Timeout { .. })
        )
    }

    /// Check if the device must be closed and opened again
    pub fn requires_reopen(&self) -> bool {
        match self {
            Error::NotOpen => true,
            Error::Transport(e) => e.requires_reopen(),
            _ => false,
        }
    }
}
