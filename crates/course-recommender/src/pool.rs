use std::collections::HashSet;

use course_common::model::CourseRecord;

/// Build the candidate pool from catalog records.
///
/// Drops any course whose code was requested or resolved as completed, any
/// course sharing a (case-insensitive) name with a completed course, and
/// repeated codes after their first occurrence. Catalog order is preserved.
pub fn build_pool(
    catalog: Vec<CourseRecord>,
    completed: &[CourseRecord],
    requested_codes: &[String],
) -> Vec<CourseRecord> {
    let excluded_codes: HashSet<&str> = requested_codes
        .iter()
        .map(String::as_str)
        .chain(completed.iter().map(|c| c.code.as_str()))
        .collect();
    let completed_names: HashSet<String> = completed
        .iter()
        .map(|c| c.name.to_lowercase())
        .collect();

    let mut seen = HashSet::new();
    catalog
        .into_iter()
        .filter(|c| !excluded_codes.contains(c.code.as_str()))
        .filter(|c| !completed_names.contains(&c.name.to_lowercase()))
        .filter(|c| seen.insert(c.code.clone()))
        .collect()
}
