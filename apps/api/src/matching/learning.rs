//! Maps unmet skill gaps to suggested learning resources.

use crate::matching::skill_match::SkillGap;
use crate::models::skill::LearningResource;

/// Picks at most `limit` active resources tagged with a gap's skill.
///
/// Skill names are compared exactly (case-sensitive), as stored in the
/// taxonomy. Resources follow gap order; within one gap the best rated come
/// first. Unrated resources sort last.
pub fn suggest_learning(
    gaps: &[SkillGap],
    resources: &[LearningResource],
    limit: usize,
) -> Vec<LearningResource> {
    let mut suggestions: Vec<LearningResource> = Vec::new();

    for gap in gaps {
        let mut for_gap: Vec<&LearningResource> = resources
            .iter()
            .filter(|r| r.is_active && r.skill_name == gap.skill_name)
            .collect();
        for_gap.sort_by(|a, b| {
            b.rating
                .unwrap_or(f64::MIN)
                .total_cmp(&a.rating.unwrap_or(f64::MIN))
        });

        for resource in for_gap {
            if suggestions.len() >= limit {
                return suggestions;
            }
            if suggestions.iter().all(|s| s.resource_id != resource.resource_id) {
                suggestions.push(resource.clone());
            }
        }
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::resource;

    fn gap(name: &str, years: f64) -> SkillGap {
        SkillGap {
            skill_name: name.to_string(),
            gap_years: years,
        }
    }

    #[test]
    fn test_no_gaps_no_suggestions() {
        let resources = vec![resource(1, 1, "Rust", Some(4.5), true)];
        assert!(suggest_learning(&[], &resources, 5).is_empty());
    }

    #[test]
    fn test_no_matching_resources_is_empty_not_error() {
        let resources = vec![resource(1, 1, "Rust", Some(4.5), true)];
        assert!(suggest_learning(&[gap("Go", 2.0)], &resources, 5).is_empty());
    }

    #[test]
    fn test_inactive_resources_are_skipped() {
        let resources = vec![
            resource(1, 1, "Rust", Some(4.9), false),
            resource(2, 1, "Rust", Some(3.0), true),
        ];
        let picked = suggest_learning(&[gap("Rust", 1.0)], &resources, 5);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].resource_id, 2);
    }

    #[test]
    fn test_name_match_is_case_sensitive() {
        let resources = vec![resource(1, 1, "rust", Some(4.0), true)];
        assert!(suggest_learning(&[gap("Rust", 1.0)], &resources, 5).is_empty());
    }

    #[test]
    fn test_capped_at_limit() {
        let resources: Vec<_> = (1..=8)
            .map(|i| resource(i, 1, "Kubernetes", Some(4.0), true))
            .collect();
        let picked = suggest_learning(&[gap("Kubernetes", 3.0)], &resources, 5);
        assert_eq!(picked.len(), 5);
    }

    #[test]
    fn test_best_rated_first_within_gap_and_gap_order_kept() {
        let resources = vec![
            resource(1, 2, "AWS", Some(3.5), true),
            resource(2, 1, "Python", None, true),
            resource(3, 1, "Python", Some(4.8), true),
            resource(4, 2, "AWS", Some(4.9), true),
        ];
        let picked = suggest_learning(&[gap("Python", 1.0), gap("AWS", 2.0)], &resources, 5);
        let ids: Vec<i32> = picked.iter().map(|r| r.resource_id).collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }
}
