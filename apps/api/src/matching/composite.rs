//! Composite ("AI") score: blends the weighted match percentage with mandatory
//! skill coverage so a high percentage earned on easy optional skills cannot
//! hide missing mandatory ones.

use serde::{Deserialize, Serialize};

use crate::matching::policy::{round_to, MandatoryCoverage, ScoringPolicy};
use crate::matching::skill_match::{MatchDetail, MatchStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Good fit")]
    GoodFit,
    #[serde(rename = "Needs training")]
    NeedsTraining,
    #[serde(rename = "Not recommended")]
    NotRecommended,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::GoodFit => "Good fit",
            Recommendation::NeedsTraining => "Needs training",
            Recommendation::NotRecommended => "Not recommended",
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Recommendation::GoodFit => "Candidate meets or exceeds most skill requirements.",
            Recommendation::NeedsTraining => {
                "Candidate has foundational skills but would benefit from upskilling."
            }
            Recommendation::NotRecommended => "Significant skill gaps exist for this role.",
        }
    }

    pub fn for_score(score: f64, policy: &ScoringPolicy) -> Self {
        if score >= policy.good_fit_min {
            Recommendation::GoodFit
        } else if score >= policy.needs_training_min {
            Recommendation::NeedsTraining
        } else {
            Recommendation::NotRecommended
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub mandatory_matched: usize,
    pub mandatory_total: usize,
    pub mandatory_score: f64,
    pub ai_score: f64,
    pub recommendation: Recommendation,
    pub recommendation_reason: String,
}

/// Computes the composite score from the scorer's detail list.
///
/// Without mandatory skills the mandatory component equals the match
/// percentage, so the composite collapses to the match percentage itself.
pub fn composite_score(
    match_percentage: f64,
    details: &[MatchDetail],
    policy: &ScoringPolicy,
) -> CompositeScore {
    let mandatory_total = details.iter().filter(|d| d.is_mandatory).count();
    let mandatory_matched = details
        .iter()
        .filter(|d| d.is_mandatory && is_covered(d.match_status, policy.mandatory_coverage))
        .count();

    let mandatory_score = if mandatory_total > 0 {
        mandatory_matched as f64 / mandatory_total as f64 * 100.0
    } else {
        match_percentage
    };

    let ai_score = round_to(
        match_percentage * policy.match_weight + mandatory_score * policy.mandatory_weight,
        2,
    );
    let recommendation = Recommendation::for_score(ai_score, policy);

    CompositeScore {
        mandatory_matched,
        mandatory_total,
        mandatory_score,
        ai_score,
        recommendation,
        recommendation_reason: recommendation.reason().to_string(),
    }
}

fn is_covered(status: MatchStatus, coverage: MandatoryCoverage) -> bool {
    match coverage {
        MandatoryCoverage::AnyOwned => status != MatchStatus::Missing,
        MandatoryCoverage::MeetsMinimum => status == MatchStatus::Full,
    }
}
