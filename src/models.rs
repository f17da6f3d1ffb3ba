// Data models for hwtrack

use crate::error::{Result, TrackerError};
use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar-date format used for element dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub type UserId = i64;
pub type ElementId = i64;

/// Parse an element date, failing with `MalformedDate`
pub fn parse_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|source| TrackerError::MalformedDate {
        date: date.to_string(),
        source,
    })
}

/// Opaque bearer credential issued at registration
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keep tokens out of debug logs
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(..)")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registered account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub token: Token,
}

/// Tracked homework/quiz/test entry as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementType,
    pub lesson: Lesson,
    pub date: String,
    pub comment: Option<String>,
    pub state: ElementState,
    pub owner_id: UserId,
}

impl Element {
    pub fn parsed_date(&self) -> Result<NaiveDate> {
        parse_date(&self.date)
    }
}

/// Payload for creating an element; the store assigns id and owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewElement {
    #[serde(rename = "type")]
    pub kind: ElementType,
    pub lesson: Lesson,
    pub date: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default = "ElementState::initial")]
    pub state: ElementState,
}

impl NewElement {
    /// Check the date up front instead of waiting for the sorter to reject it
    pub fn validate_date(&self) -> Result<NaiveDate> {
        parse_date(&self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    #[serde(rename = "homework")]
    Homework,
    #[serde(rename = "kartk", alias = "quiz")]
    Quiz,
    #[serde(rename = "sprawdz", alias = "test")]
    Test,
}

impl ElementType {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Homework => "homework",
            ElementType::Quiz => "kartk",
            ElementType::Test => "sprawdz",
        }
    }

    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "homework" => Some(ElementType::Homework),
            "kartk" | "quiz" => Some(ElementType::Quiz),
            "sprawdz" | "test" => Some(ElementType::Test),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementState {
    Work,
    Done,
}

impl ElementState {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementState::Work => "work",
            ElementState::Done => "done",
        }
    }

    pub fn initial() -> Self {
        ElementState::Work
    }

    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "work" => Some(ElementState::Work),
            "done" => Some(ElementState::Done),
            _ => None,
        }
    }
}

/// School subjects an element can be tagged with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lesson {
    #[serde(rename = "niemiecki")]
    German,
    #[serde(rename = "angielski")]
    English,
    #[serde(rename = "polski")]
    Polish,
    #[serde(rename = "strony internetowe")]
    Websites,
    #[serde(rename = "angielski zawodowy")]
    VocationalEnglish,
    #[serde(rename = "informatyka")]
    ComputerScience,
    #[serde(rename = "bhp")]
    WorkSafety,
    #[serde(rename = "biologia")]
    Biology,
    #[serde(rename = "edb")]
    SafetyEducation,
    #[serde(rename = "religia")]
    Religion,
    #[serde(rename = "fizyka")]
    Physics,
    #[serde(rename = "geografia")]
    Geography,
    #[serde(rename = "biznes i zarządzanie")]
    Business,
    #[serde(rename = "historia")]
    History,
    #[serde(rename = "chemia")]
    Chemistry,
    #[serde(rename = "podstawy informatyki")]
    ComputingBasics,
    #[serde(rename = "inne")]
    Other,
}

impl Lesson {
    pub const ALL: [Lesson; 17] = [
        Lesson::German,
        Lesson::English,
        Lesson::Polish,
        Lesson::Websites,
        Lesson::VocationalEnglish,
        Lesson::ComputerScience,
        Lesson::WorkSafety,
        Lesson::Biology,
        Lesson::SafetyEducation,
        Lesson::Religion,
        Lesson::Physics,
        Lesson::Geography,
        Lesson::Business,
        Lesson::History,
        Lesson::Chemistry,
        Lesson::ComputingBasics,
        Lesson::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Lesson::German => "niemiecki",
            Lesson::English => "angielski",
            Lesson::Polish => "polski",
            Lesson::Websites => "strony internetowe",
            Lesson::VocationalEnglish => "angielski zawodowy",
            Lesson::ComputerScience => "informatyka",
            Lesson::WorkSafety => "bhp",
            Lesson::Biology => "biologia",
            Lesson::SafetyEducation => "edb",
            Lesson::Religion => "religia",
            Lesson::Physics => "fizyka",
            Lesson::Geography => "geografia",
            Lesson::Business => "biznes i zarządzanie",
            Lesson::History => "historia",
            Lesson::Chemistry => "chemia",
            Lesson::ComputingBasics => "podstawy informatyki",
            Lesson::Other => "inne",
        }
    }

    fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|lesson| lesson.as_str() == s)
    }
}

/// Display, FromStr and TEXT column mapping for the tagged fields
macro_rules! text_column {
    ($ty:ty, $field:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = TrackerError;

            fn from_str(s: &str) -> Result<Self> {
                Self::from_wire(s).ok_or_else(|| TrackerError::InvalidValue {
                    field: $field,
                    value: s.to_string(),
                })
            }
        }

        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let text = value.as_str()?;
                text.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_column!(ElementType, "type");
text_column!(ElementState, "state");
text_column!(Lesson, "lesson");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_type_wire_names() {
        assert_eq!(serde_json::to_string(&ElementType::Quiz).unwrap(), "\"kartk\"");
        assert_eq!(serde_json::to_string(&ElementType::Test).unwrap(), "\"sprawdz\"");

        let parsed: ElementType = serde_json::from_str("\"test\"").unwrap();
        assert_eq!(parsed, ElementType::Test);
        assert_eq!("quiz".parse::<ElementType>().unwrap(), ElementType::Quiz);
        assert_eq!("homework".parse::<ElementType>().unwrap(), ElementType::Homework);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = "essay".parse::<ElementType>().unwrap_err();
        assert!(matches!(err, TrackerError::InvalidValue { field: "type", .. }));
        assert!("pending".parse::<ElementState>().is_err());
        assert!("astronomia".parse::<Lesson>().is_err());
    }

    #[test]
    fn test_lesson_names_are_unique() {
        for lesson in Lesson::ALL {
            assert_eq!(lesson.as_str().parse::<Lesson>().unwrap(), lesson);
            let json = serde_json::to_string(&lesson).unwrap();
            assert_eq!(json, format!("\"{}\"", lesson.as_str()));
        }
    }

    #[test]
    fn test_new_element_defaults() {
        let json = r#"{"type":"homework","lesson":"biznes i zarządzanie","date":"2025-01-05"}"#;
        let element: NewElement = serde_json::from_str(json).unwrap();
        assert_eq!(element.kind, ElementType::Homework);
        assert_eq!(element.lesson, Lesson::Business);
        assert_eq!(element.state, ElementState::Work);
        assert!(element.comment.is_none());
        assert!(element.validate_date().is_ok());
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("2025-01-05").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());

        let err = parse_date("2026-15-16").unwrap_err();
        assert!(matches!(err, TrackerError::MalformedDate { ref date, .. } if date == "2026-15-16"));
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = Token::new("secret-value");
        assert_eq!(format!("{:?}", token), "Token(..)");
        assert_eq!(token.to_string(), "secret-value");
    }

    #[test]
    fn test_user_serialization_skips_password() {
        let user = User {
            id: 1,
            username: "rys".to_string(),
            password: "kowalski".to_string(),
            token: Token::new("t"),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("kowalski"));
    }
}
