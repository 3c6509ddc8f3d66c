use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),
    #[error("sheet access failed: {0}")]
    SheetAccess(#[from] SheetError),
    #[error("could not fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("could not parse page: {0}")]
    Parse(#[from] ParseError),
}

impl Error {
    pub fn fetch(url: &str, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Fetch {
            url: url.to_owned(),
            source: source.into(),
        }
    }

    /// Errors that only spoil the current row; everything else ends the run.
    pub fn is_row_local(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Parse(_))
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("cannot read credentials file {path}: {source}")]
    ReadKey {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed service account key: {0}")]
    DecodeKey(#[from] serde_json::Error),
    #[error("cannot sign token request: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("token request rejected with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("bad request url: {0}")]
    Url(#[from] url::ParseError),
    #[error("{0} cannot take path segments")]
    NotABase(String),
    #[error("{status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("no spreadsheet named {0:?} is shared with the service account")]
    SpreadsheetNotFound(String),
    #[error("spreadsheet has no worksheet named {0:?}")]
    WorksheetNotFound(String),
    #[error("header row has no {0:?} column")]
    MissingHeader(&'static str),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("<meta property=\"og:type\"> not found")]
    NoPageType,
    #[error("unrecognised page type {0:?}")]
    UnknownPageType(String),
}
