/// Error type for the library.
///
/// This library is defining 2 error types:
/// - {Error}: is the main error type for the library and the one the users of the library will interact with.
/// - {DriverError}: is the error type that the drivers will use to return errors. Only developers of drivers will
///   interact with this error type.
#[derive(Debug)]
pub enum Error {
    /// The owning connection was marked unusable while translating a driver failure.
    ConnectionBroken {
        error: Box<dyn std::error::Error + Send + Sync>,
    },

    DriverNotFound {
        scheme: String,
    },

    InternalError {
        error: Box<dyn std::error::Error + Send + Sync>,
    },

    InvalidParameterCount {
        expected: usize,
        actual: usize,
    },

    InvalidUri {
        uri: String,
        reason: String,
    },

    /// The statement was closed and can no longer perform operations on its delegate.
    StatementClosed,

    /// `unwrap` was asked for a type neither the delegate nor its nested chain supports.
    UnsupportedUnwrapTarget {
        type_name: String,
    },

    /// An error reported by the underlying driver that doesn't fit in any of the other error types.
    DriverError {
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<crate::driver::DriverError> for Error {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        match err.downcast::<Error>() {
            Ok(error) => *error,
            Err(error) => Error::DriverError { error },
        }
    }
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        Error::InternalError { error: Box::new(e) }
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::InternalError { error: e.into() }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ConnectionBroken { error } => write!(f, "Connection is broken: {}", error),
            Error::DriverNotFound { scheme } => write!(f, "No driver found for scheme: {}", scheme),
            Error::InternalError { error } => write!(f, "{}", error),
            Error::InvalidParameterCount { expected, actual } => {
                write!(f, "Invalid parameter count: expected {}, actual {}", expected, actual)
            }
            Error::InvalidUri { uri, reason } => write!(f, "Invalid URI: {} (reason: {})", uri, reason),
            Error::StatementClosed => write!(f, "Statement is closed"),
            Error::UnsupportedUnwrapTarget { type_name } => {
                write!(f, "Wrapped statement is not an instance of {}", type_name)
            }
            Error::DriverError { error } => write!(f, "{}", error),
        }
    }
}

impl std::error::Error for Error {}
