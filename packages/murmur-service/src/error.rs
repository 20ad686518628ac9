pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		Self::InvalidRequest { message: message.into() }
	}
}

impl From<murmur_storage::Error> for Error {
	fn from(err: murmur_storage::Error) -> Self {
		match err {
			murmur_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			murmur_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			murmur_storage::Error::NotFound(message) => Self::NotFound { message },
			murmur_storage::Error::Conflict(message) => Self::Conflict { message },
			murmur_storage::Error::Decode(message) | murmur_storage::Error::Unavailable(message) =>
				Self::Storage { message },
		}
	}
}
