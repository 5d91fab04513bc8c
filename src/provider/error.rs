use std::convert::From;
use std::error;
use std::fmt;
use std::io;

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: Option<String>,
}

#[derive(Debug)]
pub enum ErrorKind {
    FeedUnavailable,
    FeedStatus(u16),
    FeedParse,
    ConfigParse,
    ConfigMissing,
    IOError(io::Error),
}

impl Error {
    pub fn new(kind: ErrorKind, msg: &str) -> Self {
        Error {
            kind,
            message: Some(msg.to_owned()),
        }
    }

    pub fn with_msg(mut self, message: &str) -> Self {
        self.message = Some(message.to_owned());
        self
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            kind,
            message: None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(io_error: io::Error) -> Error {
        Error::from(ErrorKind::IOError(io_error))
    }
}

impl From<serde_json::Error> for Error {
    fn from(json_error: serde_json::Error) -> Error {
        Error::new(
            ErrorKind::FeedParse,
            &format!("Could not parse feed: {}", json_error),
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(http_error: reqwest::Error) -> Error {
        match http_error.status() {
            Some(status) => Error::new(
                ErrorKind::FeedStatus(status.as_u16()),
                &http_error.to_string(),
            ),
            None => Error::new(ErrorKind::FeedUnavailable, &http_error.to_string()),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(toml_error: toml::de::Error) -> Error {
        Error::new(ErrorKind::ConfigParse, &toml_error.to_string())
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        if let ErrorKind::IOError(err) = err.kind {
            err
        } else {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                err.message.unwrap_or("invalid format".to_owned()),
            )
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {}", self.kind.as_str(), msg),
            None => write!(f, "{}", self.kind.as_str()),
        }
    }
}

impl error::Error for Error {}

impl ErrorKind {
    pub fn as_str(&self) -> String {
        match self {
            ErrorKind::FeedUnavailable => "holiday feed unreachable".to_owned(),
            ErrorKind::FeedStatus(code) => format!("holiday feed answered with status {}", code),
            ErrorKind::FeedParse => "invalid holiday feed format".to_owned(),
            ErrorKind::ConfigParse => "invalid configuration".to_owned(),
            ErrorKind::ConfigMissing => "missing configuration".to_owned(),
            ErrorKind::IOError(err) => err.to_string(),
        }
    }
}
