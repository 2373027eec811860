use serde::{Deserialize, Deserializer, Serialize};

/// A single catalog entry (e.g., "COMP1511: Programming Fundamentals").
///
/// Serialized in camelCase. Deserialization also accepts the upstream catalog
/// field names (`course_code`, `course_name`, `uoc`) and tolerates `null`s and
/// comma-separated `terms`/`modes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    /// Unique course code, e.g. "COMP1511"
    #[serde(alias = "course_code")]
    pub code: String,
    /// Course title, e.g. "Programming Fundamentals"
    #[serde(default, alias = "course_name", deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default)]
    pub faculty: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub campus: Option<String>,
    /// Career code, e.g. "UGRD", "PGRD"
    #[serde(default)]
    pub career: Option<String>,
    #[serde(default, alias = "uoc")]
    pub credit_units: Option<f64>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub terms: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub modes: Vec<String>,
}

impl CourseRecord {
    /// Minimal record with only a code and name; remaining fields empty.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            faculty: None,
            school: None,
            campus: None,
            career: None,
            credit_units: None,
            terms: Vec::new(),
            modes: Vec::new(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    One(String),
    Many(Vec<Option<String>>),
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match Option::<StringOrList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(StringOrList::One(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        Some(StringOrList::Many(items)) => items.into_iter().flatten().collect(),
    };
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_upstream_shape() {
        let json = r#"{
            "course_code": "COMP1511",
            "course_name": "Programming Fundamentals",
            "uoc": 6,
            "faculty": "Faculty of Engineering",
            "school": "School of Computer Science and Engineering",
            "campus": "Sydney",
            "career": "UGRD",
            "terms": "T1, T2, T3",
            "modes": ["In Person", "Online"]
        }"#;
        let course: CourseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(course.code, "COMP1511");
        assert_eq!(course.name, "Programming Fundamentals");
        assert_eq!(course.credit_units, Some(6.0));
        assert_eq!(course.career.as_deref(), Some("UGRD"));
        assert_eq!(course.terms, vec!["T1", "T2", "T3"]);
        assert_eq!(course.modes, vec!["In Person", "Online"]);
    }

    #[test]
    fn test_deserialize_nulls_and_missing_fields() {
        let json = r#"{"course_code": "MATH1131", "course_name": null, "terms": null, "faculty": null}"#;
        let course: CourseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(course.code, "MATH1131");
        assert!(course.name.is_empty());
        assert!(course.faculty.is_none());
        assert!(course.school.is_none());
        assert!(course.terms.is_empty());
        assert!(course.modes.is_empty());
    }

    #[test]
    fn test_camel_case_output_reads_back() {
        let mut course = CourseRecord::new("COMP2521", "Data Structures and Algorithms");
        course.credit_units = Some(6.0);
        let json = serde_json::to_value(&course).unwrap();
        assert_eq!(json["code"], "COMP2521");
        assert_eq!(json["creditUnits"], 6.0);
        let back: CourseRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, course);
    }
}
