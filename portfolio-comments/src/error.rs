//! Errors

use std::fmt;
use std::io;

/// The main error type of the library
#[derive(Debug)]
pub enum Error {
    /// An error related to performing a HTTP request, including non-success statuses
    Http(reqwest::Error),
    /// An attempt was made to convert data into a string that was not valid UTF-8
    InvalidStr,
    /// An I/O error
    Io(io::Error),
    /// An attempt to parse a string that was not a valid URL
    Url(url::ParseError),
    /// A response body was not the JSON the backend is expected to send
    Json(serde_json::Error),
    /// User home directory could not be determined
    HomeNotFound,
    /// An error related to maintaining the cookie store
    CookieStore,
    /// A delete control was used that does not carry a comment identifier
    MissingCommentId,
    /// A comment timestamp was in none of the accepted encodings
    InvalidTimestamp(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(err) => write!(f, "HTTP error: {}", err),
            Error::InvalidStr => f.write_str("response body was not valid UTF-8"),
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Url(err) => write!(f, "invalid URL: {}", err),
            Error::Json(err) => write!(f, "unexpected response body: {}", err),
            Error::HomeNotFound => f.write_str("unable to determine home directory of user"),
            Error::CookieStore => f.write_str("unable to load or save the cookie store"),
            Error::MissingCommentId => f.write_str("comment has no identifier to delete by"),
            Error::InvalidTimestamp(raw) => write!(f, "unrecognised timestamp '{}'", raw),
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Error::Url(error)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
