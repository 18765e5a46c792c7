//! Parsed query: structured form of a free-text search, as produced by the
//! external parsing service or the keyword fallback.
//!
//! Decoding is forgiving: any field that is missing, null, or of an
//! unexpected shape falls back to its default instead of failing the request.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison applied between an employee's years and the requested minimum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceOperator {
    Gt,
    #[default]
    Gte,
    Lt,
    Lte,
    Eq,
}

impl ExperienceOperator {
    /// Unknown operators degrade to `gte`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "gt" | ">" => ExperienceOperator::Gt,
            "lt" | "<" => ExperienceOperator::Lt,
            "lte" | "<=" => ExperienceOperator::Lte,
            "eq" | "=" | "==" => ExperienceOperator::Eq,
            _ => ExperienceOperator::Gte,
        }
    }

    pub fn holds(&self, actual: f64, required: f64) -> bool {
        match self {
            ExperienceOperator::Gt => actual > required,
            ExperienceOperator::Gte => actual >= required,
            ExperienceOperator::Lt => actual < required,
            ExperienceOperator::Lte => actual <= required,
            ExperienceOperator::Eq => (actual - required).abs() < f64::EPSILON,
        }
    }
}

impl<'de> Deserialize<'de> for ExperienceOperator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(s)) => ExperienceOperator::parse_lenient(&s),
            _ => ExperienceOperator::default(),
        })
    }
}

/// Which years a "N years" constraint refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceBasis {
    SkillSpecific,
    #[default]
    Total,
}

impl<'de> Deserialize<'de> for ExperienceBasis {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(s)) if s.trim().eq_ignore_ascii_case("skill_specific") => {
                ExperienceBasis::SkillSpecific
            }
            _ => ExperienceBasis::Total,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceContext {
    #[serde(rename = "type", default)]
    pub kind: ExperienceBasis,
    #[serde(default, deserialize_with = "lenient")]
    pub skill: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    #[serde(default, deserialize_with = "lenient")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub category_skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub min_years_experience: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub max_years_experience: Option<f64>,
    #[serde(default)]
    pub experience_operator: ExperienceOperator,
    #[serde(default, deserialize_with = "lenient")]
    pub experience_context: Option<ExperienceContext>,
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub availability_status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub skill_levels: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub roles: Vec<String>,
}

impl ParsedQuery {
    /// Explicit skills followed by category skills, de-duplicated
    /// case-insensitively, first spelling wins.
    pub fn target_skills(&self) -> Vec<String> {
        let mut targets: Vec<String> = Vec::new();
        for name in self.skills.iter().chain(self.category_skills.iter()) {
            let name = name.trim();
            if name.is_empty() || targets.iter().any(|t| t.eq_ignore_ascii_case(name)) {
                continue;
            }
            targets.push(name.to_string());
        }
        targets
    }

    /// Explicit skills, trimmed and de-duplicated.
    pub fn explicit_skills(&self) -> Vec<String> {
        let mut explicit: Vec<String> = Vec::new();
        for name in &self.skills {
            let name = name.trim();
            if name.is_empty() || explicit.iter().any(|t| t.eq_ignore_ascii_case(name)) {
                continue;
            }
            explicit.push(name.to_string());
        }
        explicit
    }

    /// Category skills that were not also named explicitly.
    pub fn category_only_skills(&self) -> Vec<String> {
        let explicit = self.explicit_skills();
        self.target_skills()
            .into_iter()
            .filter(|t| !explicit.iter().any(|e| e.eq_ignore_ascii_case(t)))
            .collect()
    }

    pub fn location_filter(&self) -> Option<&str> {
        non_blank(self.location.as_deref())
    }

    pub fn availability_filter(&self) -> Option<&str> {
        non_blank(self.availability_status.as_deref())
    }

    pub fn experience_basis(&self) -> ExperienceBasis {
        self.experience_context
            .as_ref()
            .map(|c| c.kind)
            .unwrap_or_default()
    }

    /// Skill explicitly named by the experience context, if any.
    pub fn context_skill(&self) -> Option<&str> {
        self.experience_context
            .as_ref()
            .and_then(|c| non_blank(c.skill.as_deref()))
    }

    /// A positive minimum, if one was requested.
    pub fn min_years(&self) -> Option<f64> {
        self.min_years_experience.filter(|y| *y > 0.0)
    }

    pub fn max_years(&self) -> Option<f64> {
        self.max_years_experience.filter(|y| *y >= 0.0)
    }
}

/// Response envelope of the parsing service's `/parse` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseQueryResult {
    #[serde(default, deserialize_with = "lenient")]
    pub original_query: String,
    #[serde(default, deserialize_with = "lenient")]
    pub parsed: ParsedQuery,
    #[serde(default, deserialize_with = "lenient")]
    pub applied_filters: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub skills_found: u32,
    #[serde(default, deserialize_with = "lenient")]
    pub error: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Decodes `T` from whatever JSON is present; null or mistyped values yield `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_parse_result_deserializes() {
        let json = r#"{
            "original_query": "5+ years Python developers in Chennai",
            "parsed": {
                "skills": ["Python"],
                "categories": [],
                "category_skills": [],
                "min_years_experience": 5,
                "max_years_experience": null,
                "experience_operator": "gte",
                "experience_context": {"type": "skill_specific", "skill": "Python", "reason": "years precede skill"},
                "location": "Chennai",
                "availability_status": null,
                "skill_levels": ["Expert"],
                "roles": ["developer"],
                "certifications": [],
                "companies": []
            },
            "applied_filters": ["Skills: Python"],
            "skills_found": 1
        }"#;

        let result: ParseQueryResult = serde_json::from_str(json).unwrap();
        assert!(result.error.is_none());
        assert_eq!(result.parsed.skills, vec!["Python"]);
        assert_eq!(result.parsed.min_years_experience, Some(5.0));
        assert_eq!(result.parsed.experience_basis(), ExperienceBasis::SkillSpecific);
        assert_eq!(result.parsed.context_skill(), Some("Python"));
        assert_eq!(result.parsed.location_filter(), Some("Chennai"));
        assert_eq!(result.parsed.roles, vec!["developer"]);
    }

    #[test]
    fn test_missing_and_null_fields_default() {
        let json = r#"{"parsed": {"skills": null, "experience_operator": null}}"#;
        let result: ParseQueryResult = serde_json::from_str(json).unwrap();
        assert!(result.parsed.skills.is_empty());
        assert_eq!(result.parsed.experience_operator, ExperienceOperator::Gte);
        assert!(result.parsed.experience_context.is_none());
        assert_eq!(result.parsed.experience_basis(), ExperienceBasis::Total);
    }

    #[test]
    fn test_mistyped_fields_degrade_instead_of_failing() {
        let json = r#"{
            "parsed": {
                "skills": "Python",
                "min_years_experience": "five",
                "experience_operator": "roughly",
                "experience_context": {"type": "career"},
                "location": 42
            },
            "skills_found": "many"
        }"#;
        let result: ParseQueryResult = serde_json::from_str(json).unwrap();
        assert!(result.parsed.skills.is_empty());
        assert_eq!(result.parsed.min_years_experience, None);
        assert_eq!(result.parsed.experience_operator, ExperienceOperator::Gte);
        assert_eq!(result.parsed.experience_basis(), ExperienceBasis::Total);
        assert_eq!(result.parsed.location, None);
        assert_eq!(result.skills_found, 0);
    }

    #[test]
    fn test_error_payload_is_surfaced() {
        let result: ParseQueryResult =
            serde_json::from_str(r#"{"error": "model not loaded"}"#).unwrap();
        assert_eq!(result.error.as_deref(), Some("model not loaded"));
    }

    #[test]
    fn test_operator_semantics() {
        assert!(ExperienceOperator::Lt.holds(4.0, 5.0));
        assert!(!ExperienceOperator::Lt.holds(5.0, 5.0));
        assert!(ExperienceOperator::Lte.holds(5.0, 5.0));
        assert!(ExperienceOperator::Gt.holds(5.5, 5.0));
        assert!(!ExperienceOperator::Gt.holds(5.0, 5.0));
        assert!(ExperienceOperator::Gte.holds(5.0, 5.0));
        assert!(ExperienceOperator::Eq.holds(5.0, 5.0));
        assert!(!ExperienceOperator::Eq.holds(5.1, 5.0));
    }

    #[test]
    fn test_operator_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ExperienceOperator::Lte).unwrap(), r#""lte""#);
    }

    #[test]
    fn test_target_skills_merge_and_dedup() {
        let query = ParsedQuery {
            skills: vec!["React".into(), "Node.js".into()],
            category_skills: vec!["react".into(), "Vue".into(), " ".into()],
            ..Default::default()
        };
        assert_eq!(query.target_skills(), vec!["React", "Node.js", "Vue"]);
        assert_eq!(query.category_only_skills(), vec!["Vue"]);
    }

    #[test]
    fn test_non_positive_min_years_is_no_constraint() {
        let query = ParsedQuery {
            min_years_experience: Some(0.0),
            ..Default::default()
        };
        assert_eq!(query.min_years(), None);
    }
}
