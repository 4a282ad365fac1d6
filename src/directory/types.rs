//! Records served by the listing endpoints

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::Listing;

/// Accepts `"12"` or `12` for identifiers
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

/// A homework file published by a teacher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub file_name: String,
    pub file_url: String,
    pub file_type: String,
}

impl Listing for HomeworkRecord {
    const PATH: &'static str = "/api/recuperer";
    const REQUIRES_AUTH: bool = true;
}

/// A file the student already handed in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub file_name: String,
    pub submitted_at: DateTime<Utc>,
    pub file_url: String,
}

impl SubmissionRecord {
    /// Calendar day shown in the history list
    pub fn submitted_on(&self) -> NaiveDate {
        self.submitted_at.date_naive()
    }
}

impl Listing for SubmissionRecord {
    const PATH: &'static str = "/api/recupererCorrection";
    const REQUIRES_AUTH: bool = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_homework_record_from_backend_json() {
        let record: HomeworkRecord = serde_json::from_str(
            r#"{"id":7,"fileName":"maths.pdf","fileUrl":"https://s3/maths.pdf","fileType":"application/pdf"}"#,
        )
        .unwrap();
        assert_eq!(record.id, "7");
        assert_eq!(record.file_name, "maths.pdf");
    }

    #[test]
    fn test_submission_date() {
        let record: SubmissionRecord = serde_json::from_str(
            r#"{"id":"s1","fileName":"copie","submittedAt":"2025-03-14T09:30:00Z","fileUrl":"https://s3/copie"}"#,
        )
        .unwrap();
        assert_eq!(
            record.submitted_on(),
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
        );
    }
}
