use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

use crate::{
    task::{DEFAULT_CATEGORY, DEFAULT_STATUS, MAX_TAGS},
    task_error::TaskError,
    task_priority::TaskPriority,
};

/// Task fields as they arrive on the wire, for both create and partial update.
///
/// Every field is optional. For `description`, `dueDate` and `tags` an explicit
/// `null` is distinct from absence: `Some(None)` means "clear it". The other
/// fields cannot be cleared, so `null` there is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    #[serde(default, deserialize_with = "not_null", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "not_null", skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "not_null", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "not_null", skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "not_null", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Option<TagsInput>>,
}

/// Tags may be sent as a list or as one comma-separated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

/// Normalized field values. `None` means "not touched".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<String>,
    pub completed: Option<bool>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl TaskFields {
    pub fn with_title(title: impl Into<String>) -> Self {
        TaskFields {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// The single normalization step shared by create and update: trims text,
    /// replaces blank category/status with their defaults, caps tags and
    /// parses the due date. Absent fields stay absent.
    pub fn normalize(self) -> Result<TaskChanges, TaskError> {
        let title = match self.title {
            Some(title) => {
                let title = title.trim();
                if title.is_empty() {
                    return Err(TaskError::Validation("Title is required".to_string()));
                }
                Some(title.to_string())
            }
            None => None,
        };

        let due_date = match self.due_date {
            Some(Some(raw)) => Some(parse_due_date(&raw)?),
            Some(None) => Some(None),
            None => None,
        };

        Ok(TaskChanges {
            title,
            description: self
                .description
                .map(|d| d.map(|d| d.trim().to_string()).unwrap_or_default()),
            due_date,
            priority: self.priority,
            status: self.status.map(|s| or_default(&s, DEFAULT_STATUS)),
            completed: self.completed,
            category: self.category.map(|c| or_default(&c, DEFAULT_CATEGORY)),
            tags: self.tags.map(|t| normalize_tags(t.unwrap_or(TagsInput::List(Vec::new())))),
        })
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn not_null<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)?
        .map(Some)
        .ok_or_else(|| D::Error::custom("null is not allowed for this field"))
}

fn or_default(value: &str, default: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Trim each tag, drop blanks, keep the first `MAX_TAGS`.
pub fn normalize_tags(input: TagsInput) -> Vec<String> {
    let raw = match input {
        TagsInput::List(tags) => tags,
        TagsInput::Csv(joined) => joined.split(',').map(str::to_string).collect(),
    };
    raw.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .take(MAX_TAGS)
        .map(str::to_string)
        .collect()
}

/// Accepts RFC 3339, a zone-less `YYYY-MM-DDTHH:MM[:SS]` (read as UTC) or a
/// bare `YYYY-MM-DD` (midnight UTC). An empty string clears the date.
pub fn parse_due_date(raw: &str) -> Result<Option<DateTime<Utc>>, TaskError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(naive.and_utc()));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Some(naive.and_utc()))
        .ok_or_else(|| TaskError::Validation(format!("Invalid due date: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn fields(json: &str) -> TaskFields {
        serde_json::from_str(json).unwrap()
    }

    #[rstest]
    #[case(r#"{"title":""}"#)]
    #[case(r#"{"title":"   "}"#)]
    #[case(r#"{"title":"\t\n"}"#)]
    fn blank_title_is_a_validation_error(#[case] json: &str) {
        assert_eq!(
            fields(json).normalize().unwrap_err(),
            TaskError::Validation("Title is required".into())
        );
    }

    #[test]
    fn absent_fields_stay_untouched() {
        let changes = fields(r#"{"completed":false}"#).normalize().unwrap();
        assert_eq!(
            changes,
            TaskChanges {
                completed: Some(false),
                ..Default::default()
            }
        );
    }

    #[test]
    fn null_is_distinct_from_absent() {
        let f = fields(r#"{"description":null,"dueDate":null,"tags":null}"#);
        assert_eq!(f.description, Some(None));
        assert_eq!(f.due_date, Some(None));
        assert_eq!(f.tags, Some(None));

        let changes = f.normalize().unwrap();
        assert_eq!(changes.description, Some(String::new()));
        assert_eq!(changes.due_date, Some(None));
        assert_eq!(changes.tags, Some(Vec::new()));
    }

    #[rstest]
    #[case(r#"{"title":null}"#)]
    #[case(r#"{"priority":null}"#)]
    #[case(r#"{"status":null}"#)]
    #[case(r#"{"completed":null}"#)]
    #[case(r#"{"category":null}"#)]
    fn null_is_rejected_where_nothing_can_be_cleared(#[case] json: &str) {
        let err = serde_json::from_str::<TaskFields>(json).unwrap_err();
        assert!(err.to_string().contains("null is not allowed"), "{err}");
    }

    #[test]
    fn twelve_tags_keep_first_ten() {
        let tags: Vec<String> = (1..=12).map(|i| format!("t{i}")).collect();
        let changes = TaskFields {
            tags: Some(Some(TagsInput::List(tags))),
            ..Default::default()
        }
        .normalize()
        .unwrap();

        let kept = changes.tags.unwrap();
        assert_eq!(kept.len(), MAX_TAGS);
        assert_eq!(kept.first().map(String::as_str), Some("t1"));
        assert_eq!(kept.last().map(String::as_str), Some("t10"));
    }

    #[test]
    fn tags_are_trimmed_and_blanks_dropped_before_capping() {
        let changes = fields(r#"{"tags":" a ,, b,   ,c "}"#).normalize().unwrap();
        assert_eq!(changes.tags.unwrap(), vec!["a", "b", "c"]);

        let mut list = vec!["".to_string(); 5];
        list.extend((1..=10).map(|i| format!(" x{i} ")));
        let changes = fields(&serde_json::json!({ "tags": list }).to_string())
            .normalize()
            .unwrap();
        let kept = changes.tags.unwrap();
        assert_eq!(kept.len(), 10);
        assert_eq!(kept[0], "x1");
    }

    #[rstest]
    #[case(r#"{"category":"  Work "}"#, "Work")]
    #[case(r#"{"category":""}"#, DEFAULT_CATEGORY)]
    #[case(r#"{"category":"   "}"#, DEFAULT_CATEGORY)]
    fn category_is_trimmed_or_defaulted(#[case] json: &str, #[case] expected: &str) {
        assert_eq!(fields(json).normalize().unwrap().category.unwrap(), expected);
    }

    #[test]
    fn blank_status_falls_back_to_default() {
        let changes = fields(r#"{"status":" "}"#).normalize().unwrap();
        assert_eq!(changes.status.unwrap(), DEFAULT_STATUS);
    }

    #[rstest]
    #[case("2026-03-01", Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())]
    #[case("2026-03-01T09:30", Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap())]
    #[case("2026-03-01T09:30:15", Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 15).unwrap())]
    #[case("2026-03-01T09:30:00+02:00", Utc.with_ymd_and_hms(2026, 3, 1, 7, 30, 0).unwrap())]
    #[case("2026-03-01T09:30:00.000Z", Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap())]
    fn due_date_formats(#[case] raw: &str, #[case] expected: DateTime<Utc>) {
        assert_eq!(parse_due_date(raw).unwrap(), Some(expected));
    }

    #[test]
    fn empty_due_date_clears() {
        assert_eq!(parse_due_date("").unwrap(), None);
        let changes = fields(r#"{"dueDate":""}"#).normalize().unwrap();
        assert_eq!(changes.due_date, Some(None));
    }

    #[test]
    fn garbage_due_date_is_rejected() {
        assert!(matches!(parse_due_date("next tuesday"), Err(TaskError::Validation(_))));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let f = fields(r#"{"title":"x","owner":"00000000-0000-0000-0000-000000000001","id":"abc"}"#);
        assert_eq!(f, TaskFields::with_title("x"));
    }

    #[test]
    fn serializes_only_present_fields() {
        let patch = TaskFields {
            completed: Some(false),
            due_date: Some(None),
            ..Default::default()
        };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, serde_json::json!({ "completed": false, "dueDate": null }));
    }
}
