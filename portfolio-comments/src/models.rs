//! Records exchanged with the comments backend

use std::convert::TryFrom;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Layouts of the Java default date text
///
/// JDK 8 writes `Jun 10, 2020 3:04:05 PM`, JDK 9 and later `Jun 10, 2020, 3:04:05 PM`.
const JAVA_DATE_FORMATS: [&str; 2] = ["%b %d, %Y, %I:%M:%S %p", "%b %d, %Y %I:%M:%S %p"];

/// Opaque, stable identifier of a comment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

/// A comment as listed by the `/data` endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: Option<CommentId>,
    #[serde(rename = "userName")]
    pub author: String,
    #[serde(rename = "userEmail", default)]
    pub contact: Option<String>,
    pub date: Timestamp,
    #[serde(rename = "content")]
    pub text: String,
    #[serde(default)]
    pub emotion: Emotion,
    /// Whether the current viewer may delete this comment
    #[serde(rename = "isAbleToDelete", default)]
    pub can_delete: bool,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

/// The mood a commenter picked, shown as a glyph next to their name
///
/// Any tag outside the known set reads as `Happy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum Emotion {
    Happy,
    Laughing,
    Surprised,
    Sad,
}

/// Point in time a comment was submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "RawTimestamp")]
pub struct Timestamp(NaiveDateTime);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
}

/// The `/user` response
#[derive(Debug, Deserialize)]
pub struct UserStatus {
    pub loggedin: String,
    #[serde(rename = "loginUrl", default)]
    pub login_url: Option<String>,
    #[serde(rename = "logoutUrl", default)]
    pub logout_url: Option<String>,
}

/// Whether the viewer has a session with the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    LoggedIn { logout_url: Option<String> },
    LoggedOut { login_url: Option<String> },
}

/// Values of the page-level controls that every request forwards verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControls {
    /// Value of the "number of comments to show" selector
    pub comments_number: String,
    /// Value of the page identifier field
    pub page: String,
    /// Path of the page as seen by the browser, used for the login query
    pub path: String,
}

/// A comment submission, sent as a multipart form
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub author: String,
    pub text: String,
    pub emotion: Emotion,
    pub page: String,
    /// Sent as the `image` part
    pub image: Option<Attachment>,
}

/// A file uploaded along with a comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Emotion {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "laughing" => Emotion::Laughing,
            "surprised" => Emotion::Surprised,
            "sad" => Emotion::Sad,
            _ => Emotion::Happy,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Laughing => "laughing",
            Emotion::Surprised => "surprised",
            Emotion::Sad => "sad",
        }
    }
}

impl Default for Emotion {
    fn default() -> Self {
        Emotion::Happy
    }
}

impl From<Option<String>> for Emotion {
    fn from(tag: Option<String>) -> Self {
        tag.map(|tag| Emotion::from_tag(&tag)).unwrap_or_default()
    }
}

impl FromStr for Emotion {
    type Err = std::convert::Infallible;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Ok(Emotion::from_tag(tag))
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Timestamp {
    pub fn new(datetime: NaiveDateTime) -> Self {
        Timestamp(datetime)
    }

    pub fn from_millis(millis: i64) -> Result<Self, Error> {
        Utc.timestamp_millis_opt(millis)
            .single()
            .map(|datetime| Timestamp(datetime.naive_utc()))
            .ok_or_else(|| Error::InvalidTimestamp(millis.to_string()))
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    /// Accepts RFC 3339 or the Java default date text
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Timestamp(datetime.naive_local()));
        }

        // JDK 20 and later put a narrow no-break space before AM/PM
        let normalised = raw.replace('\u{202f}', " ");
        JAVA_DATE_FORMATS
            .iter()
            .filter_map(|format| NaiveDateTime::parse_from_str(&normalised, format).ok())
            .next()
            .map(Timestamp)
            .ok_or_else(|| Error::InvalidTimestamp(raw.to_string()))
    }
}

impl TryFrom<RawTimestamp> for Timestamp {
    type Error = Error;

    fn try_from(raw: RawTimestamp) -> Result<Self, Self::Error> {
        match raw {
            RawTimestamp::Millis(millis) => Timestamp::from_millis(millis),
            RawTimestamp::Text(text) => text.parse(),
        }
    }
}

impl NewComment {
    /// The text fields of the form, in the order the page lays them out
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.clone()),
            ("author", self.author.clone()),
            ("text", self.text.clone()),
            ("emotion", self.emotion.as_str().to_string()),
        ]
    }
}

impl Attachment {
    /// Read the file at `path` into memory
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image")
            .to_string();

        Ok(Attachment { file_name, bytes })
    }
}

impl UserStatus {
    pub fn into_login_state(self) -> LoginState {
        if self.loggedin == "true" {
            LoginState::LoggedIn {
                logout_url: self.logout_url,
            }
        } else {
            LoginState::LoggedOut {
                login_url: self.login_url,
            }
        }
    }
}

impl LoginState {
    pub fn is_logged_in(&self) -> bool {
        match self {
            LoginState::LoggedIn { .. } => true,
            LoginState::LoggedOut { .. } => false,
        }
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_deserialize_comment() {
        let json = r#"{
            "content": "Nice portfolio!",
            "userName": "Ada",
            "userEmail": "ada@example.com",
            "date": "Jun 10, 2020 3:04:05 PM",
            "emotion": "laughing",
            "isAbleToDelete": true,
            "id": "3f0c6a2e",
            "imageUrl": "/serve/abc"
        }"#;

        let comment: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.id, Some(CommentId("3f0c6a2e".to_string())));
        assert_eq!(comment.author, "Ada");
        assert_eq!(comment.contact.as_ref().map(String::as_str), Some("ada@example.com"));
        assert_eq!(comment.text, "Nice portfolio!");
        assert_eq!(comment.emotion, Emotion::Laughing);
        assert!(comment.can_delete);
        assert_eq!(comment.image_url.as_ref().map(String::as_str), Some("/serve/abc"));
    }

    #[test]
    fn test_deserialize_sparse_comment() {
        // Gson leaves out null fields entirely
        let json = r#"{"content": "hi", "userName": "Bob", "date": 1591801445000}"#;

        let comment: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(comment.id, None);
        assert_eq!(comment.contact, None);
        assert_eq!(comment.emotion, Emotion::Happy);
        assert!(!comment.can_delete);
        assert_eq!(comment.image_url, None);
    }

    #[test]
    fn test_unknown_emotion_is_happy() {
        assert_eq!(Emotion::from_tag("suprised"), Emotion::Happy);
        assert_eq!(Emotion::from_tag(""), Emotion::Happy);
        assert_eq!(Emotion::from(None::<String>), Emotion::Happy);

        let emotion: Emotion = serde_json::from_str("null").unwrap();
        assert_eq!(emotion, Emotion::Happy);
        let emotion: Emotion = serde_json::from_str(r#""angry""#).unwrap();
        assert_eq!(emotion, Emotion::Happy);
        let emotion: Emotion = serde_json::from_str(r#""sad""#).unwrap();
        assert_eq!(emotion, Emotion::Sad);
    }

    #[test]
    fn test_timestamp_encodings() {
        let java: Timestamp = "Jun 10, 2020 3:04:05 PM".parse().unwrap();
        let java_nnbsp: Timestamp = "Jun 10, 2020 3:04:05\u{202f}PM".parse().unwrap();
        let rfc: Timestamp = "2020-06-10T15:04:05Z".parse().unwrap();
        let millis = Timestamp::from_millis(1_591_801_445_000).unwrap();

        let jdk9: Timestamp = "Jun 10, 2020, 3:04:05 PM".parse().unwrap();
        let jdk20: Timestamp = "Jun 10, 2020, 3:04:05\u{202f}PM".parse().unwrap();

        assert_eq!(java, rfc);
        assert_eq!(java_nnbsp, rfc);
        assert_eq!(jdk9, rfc);
        assert_eq!(jdk20, rfc);
        assert_eq!(millis, rfc);
        assert_eq!(rfc.naive().month(), 6);
        assert_eq!(rfc.naive().day(), 10);
        assert_eq!(rfc.naive().year(), 2020);
    }

    #[test]
    fn test_deserialize_list_with_mixed_dates() {
        let json = r#"[
            {"content": "first", "userName": "Ada", "date": "2020-06-10T15:04:05Z"},
            {"content": "second", "userName": "Bob", "date": "Jun 10, 2020, 3:04:05\u202fPM"}
        ]"#;

        let comments: Vec<Comment> = serde_json::from_str(json).unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].date, comments[1].date);
    }

    #[test]
    fn test_invalid_timestamp() {
        match "yesterday".parse::<Timestamp>() {
            Err(Error::InvalidTimestamp(raw)) => assert_eq!(raw, "yesterday"),
            other => panic!("expected invalid timestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_login_state() {
        let status: UserStatus =
            serde_json::from_str(r#"{"loggedin": "true", "logoutUrl": "L"}"#).unwrap();
        assert_eq!(
            status.into_login_state(),
            LoginState::LoggedIn {
                logout_url: Some("L".to_string())
            }
        );

        let status: UserStatus =
            serde_json::from_str(r#"{"loggedin": "false", "loginUrl": "/_ah/login"}"#).unwrap();
        let state = status.into_login_state();
        assert!(!state.is_logged_in());
        assert_eq!(
            state,
            LoginState::LoggedOut {
                login_url: Some("/_ah/login".to_string())
            }
        );
    }

    #[test]
    fn test_new_comment_form_fields() {
        let comment = NewComment {
            author: "Ada".to_string(),
            text: "Hello".to_string(),
            emotion: Emotion::Surprised,
            page: "career".to_string(),
            image: None,
        };

        let fields = comment.fields();
        assert!(fields.contains(&("emotion", "surprised".to_string())));
        assert!(fields.contains(&("page", "career".to_string())));
        assert!(fields.contains(&("author", "Ada".to_string())));
    }

    #[test]
    fn test_read_attachment() {
        let path = std::env::temp_dir().join("portfolio-comments-attachment.png");
        fs::write(&path, b"not really a png").unwrap();

        let attachment = Attachment::read(&path).unwrap();
        assert_eq!(attachment.file_name, "portfolio-comments-attachment.png");
        assert_eq!(attachment.bytes, b"not really a png".to_vec());

        fs::remove_file(&path).unwrap();
        assert!(Attachment::read(&path).is_err());
    }
}
