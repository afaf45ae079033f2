#![forbid(unsafe_code)]

pub mod clock;
pub mod connection;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod factory;
pub mod macros;
pub mod options;
pub mod parameters;
pub mod statement;
pub mod trace;

/// The mock module is only available when running test or when the `mock` feature is enabled.
/// It provides a mock implementation of the driver traits to be used in tests.
#[cfg(any(test, feature = "mock"))]
pub mod mock;

/// The error type used across the library.
///
/// All errors produced by this crate are supposed to be {{Error}}. Only the drivers are allowed to
/// return their own error type {{DriverError}} which will be then converted to an {{Error}} by the
/// owning connection's translation hook.
pub type Error = error::Error;

/// A specialized `Result` type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Return a clean version of the input statement for logging purposes.
///
/// Newlines and the indentation following them are collapsed into a single space so the statement
/// fits on one log line. A single-line statement is returned unchanged.
pub fn clean_statement(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' {
            result.push(' ');
            while matches!(chars.peek(), Some(' ') | Some('\t')) {
                chars.next();
            }
        } else {
            result.push(c);
        }
    }

    result
}
