pub mod mentions;

use crate::error::ApiError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl MentionStatus {
    /// Lifecycle order.
    pub const ALL: [MentionStatus; 4] = [
        MentionStatus::Pending,
        MentionStatus::Processing,
        MentionStatus::Completed,
        MentionStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MentionStatus::Pending => "pending",
            MentionStatus::Processing => "processing",
            MentionStatus::Completed => "completed",
            MentionStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for MentionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    pub status: MentionStatus,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Only meaningful once the mention is completed.
    #[serde(default)]
    pub analysis_result: Option<serde_json::Value>,
    /// Only meaningful once the mention has failed.
    #[serde(default)]
    pub error_message: Option<String>,
}

impl Mention {
    /// Typed view of the analysis payload, when it has the usual shape.
    pub fn analysis(&self) -> Option<MentionAnalysis> {
        if self.status != MentionStatus::Completed {
            return None;
        }
        let value = self.analysis_result.as_ref()?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn failure(&self) -> Option<&str> {
        if self.status != MentionStatus::Failed {
            return None;
        }
        self.error_message.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MentionAnalysis {
    pub product: String,
    pub sentiment: String,
    pub needs_response: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub support_ticket_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_mentions: u64,
    #[serde(default)]
    pub by_status: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_sentiment: BTreeMap<String, u64>,
}

impl Summary {
    /// `None` when the backend did not report the status at all.
    pub fn status_count(&self, status: MentionStatus) -> Option<u64> {
        self.by_status.get(status.as_str()).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMention {
    pub text: String,
    pub source: Option<String>,
}

/// The REST backend that owns mentions.
#[async_trait]
pub trait MentionsApi: Send + Sync {
    /// Most recent mentions, newest first.
    async fn list_mentions(&self, limit: usize) -> Result<Vec<Mention>, ApiError>;

    async fn summary(&self) -> Result<Summary, ApiError>;

    async fn create_mention(&self, mention: &NewMention) -> Result<Mention, ApiError>;

    async fn get_mention(&self, id: &str) -> Result<Mention, ApiError>;
}

/// Accepts RFC 3339, or a naive ISO-8601 timestamp taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
