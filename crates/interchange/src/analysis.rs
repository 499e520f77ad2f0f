//! Structured business analysis produced by the external description
//! analyzer. The matcher consumes it; nothing in this workspace produces it.

use serde::{Deserialize, Serialize};

/// Structured reading of a free-text business description.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionAnalysis {
    pub business_context: BusinessContext,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub user_roles: Vec<String>,
    #[serde(default)]
    pub key_features: Vec<String>,
    /// Analyzer's own confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BusinessContext {
    /// Free-form business type, e.g. "saas" or "marketplace".
    #[serde(rename = "type")]
    pub business_type: String,
    /// Free-form maturity term, e.g. "mvp", "scaling", "mature".
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub primary_features: Vec<String>,
    #[serde(default)]
    pub target_audience: Vec<String>,
    #[serde(default)]
    pub monetization_model: String,
}
