//! Objective models shared by the remote client, the progress cache and the
//! instance lifecycle.

use serde::{Deserialize, Deserializer, Serialize};

/// An objective as served by the remote progress service.
///
/// The remote stores progress loosely: older records carry an integer, some
/// a string, newer ones a bool. `Name` may be null on malformed rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveRecord {
    #[serde(rename = "Id")]
    pub id: i64,

    #[serde(rename = "Name", default)]
    pub name: Option<String>,

    #[serde(rename = "Progress", default, deserialize_with = "lenient_progress")]
    pub progress: bool,

    /// Display order assigned by the remote.
    #[serde(rename = "Orded", default)]
    pub order: i64,
}

impl ObjectiveRecord {
    pub fn new(id: i64, name: impl Into<String>, progress: bool) -> Self {
        Self {
            id,
            name: Some(name.into()),
            progress,
            order: id,
        }
    }

    /// The record's name when it is present and non-empty.
    pub fn valid_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Project onto the local progress view, if the record is usable.
    pub fn to_progress(&self) -> Option<ProgressRecord> {
        self.valid_name().map(|name| ProgressRecord {
            name: name.to_string(),
            completed: self.progress,
        })
    }
}

/// Local view of one objective's completion flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub name: String,
    pub completed: bool,
}

fn lenient_progress<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Int(i64),
        Text(String),
        Null(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Bool(b) => b,
        Raw::Int(i) => i != 0,
        Raw::Text(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
        Raw::Null(()) => false,
    })
}

/// Case-sensitive equality first, ASCII case-insensitive as fallback.
///
/// Only used to look up representations; state is always keyed by the
/// exact name.
pub fn names_match(candidate: &str, objective: &str) -> bool {
    candidate == objective || candidate.eq_ignore_ascii_case(objective)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_bool_progress() {
        let json = r#"[{"Id":1,"Name":"Intro","Progress":true,"Orded":2}]"#;
        let records: Vec<ObjectiveRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].name.as_deref(), Some("Intro"));
        assert!(records[0].progress);
        assert_eq!(records[0].order, 2);
    }

    #[test]
    fn test_deserialize_lenient_progress() {
        let json = r#"[
            {"Id":1,"Name":"a","Progress":1},
            {"Id":2,"Name":"b","Progress":0},
            {"Id":3,"Name":"c","Progress":"true"},
            {"Id":4,"Name":"d","Progress":null},
            {"Id":5,"Name":"e"}
        ]"#;
        let records: Vec<ObjectiveRecord> = serde_json::from_str(json).unwrap();
        let flags: Vec<bool> = records.iter().map(|r| r.progress).collect();
        assert_eq!(flags, vec![true, false, true, false, false]);
    }

    #[test]
    fn test_null_or_empty_name_is_unusable() {
        let json = r#"[{"Id":1,"Name":null,"Progress":true},{"Id":2,"Name":"","Progress":true}]"#;
        let records: Vec<ObjectiveRecord> = serde_json::from_str(json).unwrap();
        assert!(records.iter().all(|r| r.to_progress().is_none()));
    }

    #[test]
    fn test_names_match() {
        assert!(names_match("Door", "Door"));
        assert!(names_match("door", "Door"));
        assert!(!names_match("Doors", "Door"));
    }
}
