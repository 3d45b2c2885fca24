use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid receiver kind: {0} (expected 1/lecturer or 3/group)")]
    InvalidReceiverKind(String),

    #[error("Timetable request failed with HTTP status {status}")]
    TimetableFetch { status: u16 },

    #[error("Malformed lesson timestamp '{value}': {source}")]
    MalformedTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Lesson ends at {end} but starts at {start}")]
    InvalidLessonInterval {
        start: chrono::NaiveDateTime,
        end: chrono::NaiveDateTime,
    },

    #[error("Timetable is empty, nothing to sync")]
    EmptyTimetable,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parsing failed: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("CalDAV error{}: {message}", http_status_suffix(.status))]
    CalDav { status: Option<u16>, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network timeout")]
    Timeout,
}

impl Error {
    /// 通用的请求错误处理
    pub(crate) fn from_request(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(error)
        }
    }

    pub(crate) fn caldav(status: Option<reqwest::StatusCode>, message: impl Into<String>) -> Self {
        Self::CalDav {
            status: status.map(|s| s.as_u16()),
            message: message.into(),
        }
    }
}

fn http_status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;
