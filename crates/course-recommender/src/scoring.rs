/// Candidate scoring against a learner's completed courses.
///
/// Each completed course contributes a weighted sum of four signals; the
/// candidate's score is the mean contribution, clamped to [0, 1]. The weights
/// sum to 1.0 and are fixed.
use course_common::model::CourseRecord;

use crate::text::jaccard;

pub const SCHOOL_WEIGHT: f64 = 0.40;
pub const FACULTY_WEIGHT: f64 = 0.25;
pub const CAREER_WEIGHT: f64 = 0.15;
pub const NAME_WEIGHT: f64 = 0.20;

/// Decimal places kept on reported scores.
const SCORE_SCALE: f64 = 10_000.0;

/// A candidate course with its aggregate similarity to the completed set.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub course: CourseRecord,
    pub score: f64,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn same_text(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn same_trimmed(a: &str, b: &str) -> bool {
    same_text(a.trim(), b.trim())
}

/// 1.0 when both schools are present and equal ignoring case, else 0.
/// Surrounding whitespace is significant here.
pub fn school_match(a: Option<&str>, b: Option<&str>) -> f64 {
    match (present(a), present(b)) {
        (Some(a), Some(b)) if same_text(a, b) => 1.0,
        _ => 0.0,
    }
}

/// Exact faculty match scores 1.0; otherwise partial credit by token overlap
/// ("Faculty of Engineering" vs "Engineering").
pub fn faculty_similarity(a: Option<&str>, b: Option<&str>) -> f64 {
    let (Some(a), Some(b)) = (present(a), present(b)) else {
        return 0.0;
    };
    if same_trimmed(a, b) {
        1.0
    } else {
        jaccard(a, b)
    }
}

/// Career codes are a short enumeration, so no partial credit.
pub fn career_similarity(a: Option<&str>, b: Option<&str>) -> f64 {
    match (present(a), present(b)) {
        (Some(a), Some(b)) if same_trimmed(a, b) => 1.0,
        _ => 0.0,
    }
}

/// Weighted similarity of one candidate to one completed course.
pub fn pair_score(candidate: &CourseRecord, completed: &CourseRecord) -> f64 {
    SCHOOL_WEIGHT * school_match(candidate.school.as_deref(), completed.school.as_deref())
        + FACULTY_WEIGHT
            * faculty_similarity(candidate.faculty.as_deref(), completed.faculty.as_deref())
        + CAREER_WEIGHT * career_similarity(candidate.career.as_deref(), completed.career.as_deref())
        + NAME_WEIGHT * jaccard(&candidate.name, &completed.name)
}

/// Mean pair score across the completed courses, clamped to [0, 1].
pub fn score_candidate(candidate: &CourseRecord, completed: &[CourseRecord]) -> f64 {
    if completed.is_empty() {
        return 0.0;
    }
    let total: f64 = completed.iter().map(|c| pair_score(candidate, c)).sum();
    (total / completed.len() as f64).clamp(0.0, 1.0)
}

/// Round to four decimal places, the precision scores are tiered and reported at.
pub fn round_score(score: f64) -> f64 {
    (score * SCORE_SCALE).round() / SCORE_SCALE
}

/// Score every candidate, keeping the pool's order.
pub fn score_pool(pool: Vec<CourseRecord>, completed: &[CourseRecord]) -> Vec<ScoredCandidate> {
    pool.into_iter()
        .map(|course| {
            let score = round_score(score_candidate(&course, completed));
            ScoredCandidate { course, score }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(code: &str, name: &str, school: &str, faculty: &str, career: &str) -> CourseRecord {
        let mut record = CourseRecord::new(code, name);
        record.school = Some(school.to_string());
        record.faculty = Some(faculty.to_string());
        record.career = Some(career.to_string());
        record
    }

    fn comp1511() -> CourseRecord {
        course("COMP1511", "Programming Fundamentals", "CSE", "Engineering", "UGRD")
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total = SCHOOL_WEIGHT + FACULTY_WEIGHT + CAREER_WEIGHT + NAME_WEIGHT;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_faculty_similarity() {
        assert_eq!(faculty_similarity(Some("Engineering"), Some(" engineering ")), 1.0);
        let partial = faculty_similarity(Some("Faculty of Engineering"), Some("Engineering"));
        assert!((partial - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(faculty_similarity(None, Some("Engineering")), 0.0);
        assert_eq!(faculty_similarity(Some(""), Some("")), 0.0);
        assert_eq!(faculty_similarity(Some("Science"), Some("Arts")), 0.0);
    }

    #[test]
    fn test_career_similarity_is_binary() {
        assert_eq!(career_similarity(Some("UGRD"), Some(" ugrd")), 1.0);
        assert_eq!(career_similarity(Some("UGRD"), Some("PGRD")), 0.0);
        assert_eq!(career_similarity(Some("UGRD"), None), 0.0);
        assert_eq!(career_similarity(Some(""), Some("")), 0.0);
    }

    #[test]
    fn test_school_match() {
        assert_eq!(school_match(Some("CSE"), Some("cse")), 1.0);
        assert_eq!(school_match(Some("CSE"), Some("Mathematics")), 0.0);
        assert_eq!(school_match(None, None), 0.0);
        assert_eq!(school_match(Some(""), Some("")), 0.0);
    }

    #[test]
    fn test_school_match_does_not_trim() {
        assert_eq!(school_match(Some(" CSE"), Some("cse")), 0.0);
        assert_eq!(school_match(Some("CSE "), Some("CSE")), 0.0);
        assert_eq!(school_match(Some("CSE "), Some("cse ")), 1.0);
        // faculty and career still compare trimmed
        assert_eq!(career_similarity(Some("UGRD "), Some(" ugrd")), 1.0);
        assert_eq!(faculty_similarity(Some(" Science"), Some("science ")), 1.0);
    }

    #[test]
    fn test_follow_on_course_scores_strongly() {
        let candidate = course("COMP2521", "Programming Fundamentals II", "CSE", "Engineering", "UGRD");
        let score = score_candidate(&candidate, &[comp1511()]);
        // 0.40 + 0.25 + 0.15 + 0.20 * 2/3
        assert!((score - (0.8 + 0.2 * 2.0 / 3.0)).abs() < 1e-9);
        assert!(score >= 0.85);
        assert_eq!(round_score(score), 0.9333);
    }

    #[test]
    fn test_identical_candidate_scores_one() {
        let twin = course("COMP1911", "Programming Fundamentals", "CSE", "Engineering", "UGRD");
        let score = score_candidate(&twin, &[comp1511(), comp1511()]);
        assert!((score - 1.0).abs() < 1e-9);
        assert!(score <= 1.0);
        assert_eq!(round_score(score), 1.0);
    }

    #[test]
    fn test_unrelated_candidate_scores_zero() {
        let candidate = course("HIST1001", "Medieval Europe", "Humanities", "Arts", "PGRD");
        assert_eq!(score_candidate(&candidate, &[comp1511()]), 0.0);
        let bare = CourseRecord::new("XXXX0000", "");
        assert_eq!(score_candidate(&bare, &[comp1511()]), 0.0);
    }

    #[test]
    fn test_score_is_mean_over_completed() {
        let candidate = course("COMP2521", "Data Structures", "CSE", "Engineering", "UGRD");
        let maths = course("MATH1131", "Mathematics 1A", "Mathematics", "Science", "UGRD");
        // Against COMP1511: 0.40 + 0.25 + 0.15 = 0.80. Against MATH1131: career only = 0.15.
        let score = score_candidate(&candidate, &[comp1511(), maths]);
        assert!((score - 0.475).abs() < 1e-9);
    }

    #[test]
    fn test_empty_completed_scores_zero() {
        assert_eq!(score_candidate(&comp1511(), &[]), 0.0);
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let completed = vec![
            comp1511(),
            course("MATH1131", "Mathematics 1A", "Mathematics", "Science", "UGRD"),
            course("ARTS1000", "", "", "", ""),
        ];
        let candidates = vec![
            comp1511(),
            course("MATH1231", "Mathematics 1B", "Mathematics", "Faculty of Science", "UGRD"),
            course("ZZZZ9999", "!!!", "", "", ""),
            CourseRecord::new("EMPTY0000", ""),
        ];
        for scored in score_pool(candidates, &completed) {
            assert!((0.0..=1.0).contains(&scored.score), "{} scored {}", scored.course.code, scored.score);
        }
    }

    #[test]
    fn test_round_score() {
        assert_eq!(round_score(0.123456), 0.1235);
        assert_eq!(round_score(0.6), 0.6);
        assert_eq!(round_score(0.0), 0.0);
    }
}
