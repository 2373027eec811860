use course_common::api::CourseOption;
use course_common::model::CourseRecord;

pub const SEARCH_LIMIT: usize = 5;

/// Case-insensitive substring match on code or name, sorted by code, first
/// [`SEARCH_LIMIT`] hits. An empty query matches every course.
pub fn search_courses(courses: &[CourseRecord], query: &str) -> Vec<CourseOption> {
    let needle = query.trim().to_lowercase();

    let mut hits: Vec<&CourseRecord> = courses
        .iter()
        .filter(|c| {
            needle.is_empty()
                || c.code.to_lowercase().contains(&needle)
                || c.name.to_lowercase().contains(&needle)
        })
        .collect();
    hits.sort_by(|a, b| a.code.cmp(&b.code));

    hits.into_iter()
        .take(SEARCH_LIMIT)
        .map(|c| CourseOption {
            value: c.code.clone(),
            label: format!("{}: {}", c.code, c.name),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<CourseRecord> {
        vec![
            CourseRecord::new("MATH1131", "Mathematics 1A"),
            CourseRecord::new("COMP2521", "Data Structures and Algorithms"),
            CourseRecord::new("COMP1511", "Programming Fundamentals"),
            CourseRecord::new("COMP1521", "Computer Systems Fundamentals"),
            CourseRecord::new("COMP3121", "Algorithm Design and Analysis"),
            CourseRecord::new("COMP6080", "Web Front-End Programming"),
            CourseRecord::new("COMP9021", "Principles of Programming"),
        ]
    }

    #[test]
    fn test_matches_code_case_insensitively() {
        let hits = search_courses(&catalog(), "comp15");
        let codes: Vec<&str> = hits.iter().map(|h| h.value.as_str()).collect();
        assert_eq!(codes, vec!["COMP1511", "COMP1521"]);
        assert_eq!(hits[0].label, "COMP1511: Programming Fundamentals");
    }

    #[test]
    fn test_matches_name() {
        let hits = search_courses(&catalog(), "PROGRAMMING");
        let codes: Vec<&str> = hits.iter().map(|h| h.value.as_str()).collect();
        assert_eq!(codes, vec!["COMP1511", "COMP6080", "COMP9021"]);
    }

    #[test]
    fn test_limits_and_sorts_results() {
        let hits = search_courses(&catalog(), "comp");
        let codes: Vec<&str> = hits.iter().map(|h| h.value.as_str()).collect();
        assert_eq!(codes, vec!["COMP1511", "COMP1521", "COMP2521", "COMP3121", "COMP6080"]);

        let hits = search_courses(&catalog(), "  ");
        assert_eq!(hits.len(), SEARCH_LIMIT);
        assert_eq!(hits[0].value, "COMP1511");
    }

    #[test]
    fn test_no_match() {
        assert!(search_courses(&catalog(), "chemistry").is_empty());
    }
}
