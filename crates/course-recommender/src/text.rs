/// Token-bag text similarity over course names and faculty names.
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Lowercase the text and split it on every run of characters outside `[a-z0-9]`.
pub fn tokenize(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    SEPARATOR
        .split(&lowered)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Jaccard index of the two token sets. Zero when either side has no tokens.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let a = tokenize(a);
    let b = tokenize(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(&b).count();
    let union = a.len() + b.len() - shared;
    shared as f64 / union as f64
}
