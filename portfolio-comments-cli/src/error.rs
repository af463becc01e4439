use portfolio_comments::url;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    Comments(portfolio_comments::Error),
    Open(opener::OpenError),
    /// Work on the runtime ended without producing a result
    Aborted,
    /// Some of the requests a command made failed, they have been reported already
    Failed(usize),
}

impl From<portfolio_comments::Error> for Error {
    fn from(err: portfolio_comments::Error) -> Self {
        Error::Comments(err)
    }
}

impl From<opener::OpenError> for Error {
    fn from(err: opener::OpenError) -> Self {
        Error::Open(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Comments(portfolio_comments::Error::Io(err))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Comments(portfolio_comments::Error::Url(err))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Comments(err) => write!(f, "{}", err),
            Error::Open(err) => write!(f, "unable to open browser: {}", err),
            Error::Aborted => f.write_str("the request was aborted"),
            Error::Failed(1) => f.write_str("1 request failed"),
            Error::Failed(count) => write!(f, "{} requests failed", count),
        }
    }
}
