//! Scoring policy: every threshold and blend weight the matching engine uses.
//!
//! Tune values here; the scorers and the ranking pipeline only read them
//! through `ScoringPolicy`.

use serde::{Deserialize, Serialize};

/// One partial-credit band: a ratio at or above `min_ratio` earns `points`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min_ratio: f64,
    pub points: f64,
}

/// Ordered partial-credit bands (highest ratio first) with a floor for
/// anything below the last band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandTable {
    pub bands: Vec<Band>,
    pub floor: f64,
}

impl BandTable {
    pub fn points(&self, ratio: f64) -> f64 {
        self.bands
            .iter()
            .find(|b| ratio >= b.min_ratio)
            .map(|b| b.points)
            .unwrap_or(self.floor)
    }
}

/// What counts as a "covered" mandatory skill in the composite score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MandatoryCoverage {
    /// Any owned skill (status other than `Missing`).
    #[default]
    AnyOwned,
    /// Only skills that meet the minimum years (status `Full`).
    MeetsMinimum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    // Structured requirement matching
    pub mandatory_multiplier: f64,
    /// Share of the minimum that still counts as a near miss.
    pub near_miss_ratio: f64,
    pub near_miss_credit: f64,
    /// Multiplier applied to the years ratio below the near-miss line.
    pub shortfall_credit: f64,

    // Composite score
    pub match_weight: f64,
    pub mandatory_weight: f64,
    pub mandatory_coverage: MandatoryCoverage,
    pub good_fit_min: f64,
    pub needs_training_min: f64,

    pub learning_limit: usize,

    // Free-text ranking
    pub skill_specific_bands: BandTable,
    pub total_experience_bands: BandTable,
    pub full_points: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            mandatory_multiplier: 2.0,
            near_miss_ratio: 0.8,
            near_miss_credit: 0.7,
            shortfall_credit: 0.5,
            match_weight: 0.6,
            mandatory_weight: 0.4,
            mandatory_coverage: MandatoryCoverage::AnyOwned,
            good_fit_min: 80.0,
            needs_training_min: 60.0,
            learning_limit: 5,
            skill_specific_bands: BandTable {
                bands: vec![
                    Band { min_ratio: 0.8, points: 70.0 },
                    Band { min_ratio: 0.6, points: 50.0 },
                    Band { min_ratio: 0.4, points: 30.0 },
                ],
                floor: 10.0,
            },
            total_experience_bands: BandTable {
                bands: vec![
                    Band { min_ratio: 0.7, points: 60.0 },
                    Band { min_ratio: 0.5, points: 40.0 },
                ],
                floor: 20.0,
            },
            full_points: 100.0,
        }
    }
}

/// Rounds half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Clamps a percentage into [0, 100] and rounds it.
pub fn clamp_percentage(value: f64, places: i32) -> f64 {
    round_to(value.clamp(0.0, 100.0), places)
}
