use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub application_id: i32,
    pub requirement_id: i32,
    pub employee_id: i32,
    pub cover_letter: Option<String>,
    pub match_percentage: Option<f64>,
    pub ai_score: Option<f64>,
    pub ai_recommendation: Option<String>,
    pub status: String, // Pending, Accepted, Rejected, Shortlisted
    pub applied_date: DateTime<Utc>,
    pub reviewed_date: Option<DateTime<Utc>>,
}

/// Values for an application insert; ids and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub requirement_id: i32,
    pub employee_id: i32,
    pub cover_letter: Option<String>,
    pub match_percentage: f64,
    pub ai_score: f64,
    pub ai_recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SearchHistoryRow {
    pub search_id: i32,
    pub searched_by_id: i32,
    pub search_query: String,
    pub filters: Value,
    pub result_count: i32,
    pub search_date: DateTime<Utc>,
    pub is_saved: bool,
    pub saved_search_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSearchHistory {
    pub searched_by_id: i32,
    pub search_query: String,
    pub filters: Value,
    pub result_count: i32,
    pub is_saved: bool,
    pub saved_search_name: Option<String>,
}
