use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    /// Codes of the courses the learner has completed, e.g. ["COMP1511"].
    #[serde(default, alias = "completedCourseCodes")]
    pub completed_courses: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedCourse {
    pub code: String,
    pub name: String,
    pub faculty: Option<String>,
    pub school: Option<String>,
    pub campus: Option<String>,
    pub career: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationMeta {
    pub candidates_considered: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub strong: Vec<RecommendedCourse>,
    pub moderate: Vec<RecommendedCourse>,
    pub weak: Vec<RecommendedCourse>,
    pub meta: RecommendationMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseSearchParams {
    #[serde(default)]
    pub q: String,
}

/// One course search hit, shaped for a select widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseOption {
    /// Course code
    pub value: String,
    /// "CODE: Name"
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveCompletedCoursesRequest {
    pub courses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCoursesResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub completed_courses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub redis: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
