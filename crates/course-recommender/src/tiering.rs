/// Partition of scored candidates into confidence tiers.
///
/// - strong: score >= 0.6
/// - moderate: 0.4 <= score < 0.6
/// - weak: 0.2 <= score < 0.4
///
/// Anything below 0.2 is dropped. Each tier keeps at most five candidates,
/// highest score first, ties in pool order.
use crate::scoring::ScoredCandidate;

pub const STRONG_THRESHOLD: f64 = 0.6;
pub const MODERATE_THRESHOLD: f64 = 0.4;
pub const WEAK_THRESHOLD: f64 = 0.2;
pub const TIER_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Strong,
    Moderate,
    Weak,
}

impl Tier {
    pub fn for_score(score: f64) -> Option<Tier> {
        if score >= STRONG_THRESHOLD {
            Some(Tier::Strong)
        } else if score >= MODERATE_THRESHOLD {
            Some(Tier::Moderate)
        } else if score >= WEAK_THRESHOLD {
            Some(Tier::Weak)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tiering {
    pub strong: Vec<ScoredCandidate>,
    pub moderate: Vec<ScoredCandidate>,
    pub weak: Vec<ScoredCandidate>,
}

impl Tiering {
    fn bucket(&mut self, tier: Tier) -> &mut Vec<ScoredCandidate> {
        match tier {
            Tier::Strong => &mut self.strong,
            Tier::Moderate => &mut self.moderate,
            Tier::Weak => &mut self.weak,
        }
    }

    pub fn len(&self) -> usize {
        self.strong.len() + self.moderate.len() + self.weak.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn partition(mut scored: Vec<ScoredCandidate>) -> Tiering {
    // sort_by is stable, so equal scores keep pool order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut tiering = Tiering::default();
    for candidate in scored {
        let Some(tier) = Tier::for_score(candidate.score) else {
            continue;
        };
        let bucket = tiering.bucket(tier);
        if bucket.len() < TIER_LIMIT {
            bucket.push(candidate);
        }
    }
    tiering
}
