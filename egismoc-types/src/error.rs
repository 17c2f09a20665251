//! Errors raised while building or decoding print metadata

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Finger code outside the 0-10 range
    #[error("Unknown finger code: {0}")]
    UnknownFinger(u8),

    /// Text does not carry the driver's user id prefix
    #[error("Not a driver user id: {0:?}")]
    ForeignUserId(String),

    #[error("Invalid user id {field} field: {value:?}")]
    InvalidUserIdField { field: &'static str, value: String },
}

impl Error {
    /// Check if the error came from parsing a user id
    pub fn is_user_id_error(&self) -> bool {
        matches!(self, Error::ForeignUserId(_) | Error::InvalidUserIdField { .. })
    }
}
