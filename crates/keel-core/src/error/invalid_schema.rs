use super::Error;

/// Error when a schema descriptor is invalid or used in a way it does not
/// support.
///
/// This occurs when:
/// - A schema declares more than one identity field, or two fields share a name
/// - A delta refers to a field that does not exist in the previous version
/// - An identity-only operation (update, load by id) runs on a schema without one
/// - A version newer than the current one is requested
///
/// These are programming errors: they fail fast and are never retried.
#[derive(Debug)]
pub(super) struct InvalidSchema {
    message: Box<str>,
}

impl std::error::Error for InvalidSchema {}

impl core::fmt::Display for InvalidSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid schema: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidSchema(InvalidSchema {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid schema error.
    pub fn is_invalid_schema(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidSchema(_))
    }
}
