use serde::{Deserialize, Deserializer, Serialize};

/// The model's own rating of a query; never computed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Medium,
    Complex,
}

impl Complexity {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "simple" => Complexity::Simple,
            "complex" => Complexity::Complex,
            _ => Complexity::Medium,
        }
    }
}

// Unknown or non-string labels from the model fall back to medium.
impl<'de> Deserialize<'de> for Complexity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Complexity::from_label).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Auto,
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    #[default]
    Standard,
    Performance,
    Readability,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Auto => "auto",
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl OptimizationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationLevel::Standard => "standard",
            OptimizationLevel::Performance => "performance",
            OptimizationLevel::Readability => "readability",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimization_level: Option<OptimizationLevel>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSqlRequest {
    #[serde(default)]
    pub natural_language_query: String,
    pub database: Option<String>,
    pub subject: Option<String>,
    pub analysis_type: Option<String>,
    pub options: Option<GenerateOptions>,
}

impl GenerateSqlRequest {
    pub const DEFAULT_DATABASE: &'static str = "MySQL";

    pub fn database(&self) -> &str {
        self.database
            .as_deref()
            .filter(|db| !db.trim().is_empty())
            .unwrap_or(Self::DEFAULT_DATABASE)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformSqlRequest {
    #[serde(default)]
    pub original_sql: String,
    #[serde(default)]
    pub target_database: String,
    pub optimization_level: Option<OptimizationLevel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplainSqlRequest {
    #[serde(default)]
    pub sql: String,
}

const DEFAULT_EXECUTION_TIME: u64 = 1000;

fn default_execution_time() -> u64 {
    DEFAULT_EXECUTION_TIME
}

// Model replies use null as often as omission.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any JSON number is accepted and rounded. Zero, negative or non-numeric
/// estimates become the default.
fn lenient_execution_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let millis = value
        .as_f64()
        .filter(|ms| ms.is_finite())
        .map(f64::round)
        .filter(|ms| *ms >= 1.0)
        .map_or(DEFAULT_EXECUTION_TIME, |ms| ms.min(u64::MAX as f64) as u64);
    Ok(millis)
}

fn lenient_rating<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or_else(PerformanceReport::default_rating))
}

/// Parsed model output for generate and transform calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSqlResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub sql: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default = "default_execution_time", deserialize_with = "lenient_execution_time")]
    pub estimated_execution_time: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used_tables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownSection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub section: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    #[serde(default = "PerformanceReport::default_rating", deserialize_with = "lenient_rating")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestions: Vec<String>,
}

impl PerformanceReport {
    fn default_rating() -> f64 {
        5.0
    }
}

impl Default for PerformanceReport {
    fn default() -> Self {
        Self {
            rating: Self::default_rating(),
            suggestions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainSqlResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub breakdown: Vec<BreakdownSection>,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default, deserialize_with = "null_as_default")]
    pub performance: PerformanceReport,
}
