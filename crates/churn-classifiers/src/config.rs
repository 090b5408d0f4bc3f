use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use chrono::NaiveDate;
use itertools_num::linspace;
use serde::{Deserialize, Serialize};

use crate::data_handling::DEFAULT_DATE_FORMATS;
use crate::error::{ChurnError, Result};
use crate::scoring::CostBenefit;

/// Top-level configuration for a model-selection run.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct ChurnConfig {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    /// When set, an HTML profit-curve report is written here.
    pub report_path: Option<PathBuf>,
    pub label: LabelRule,
    pub model: ModelConfig,
    pub pipeline: PipelineConfig,
    pub search: SearchConfig,
    pub cost_benefit: CostBenefit,
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("data/churn_train.csv"),
            test_path: PathBuf::from("data/churn_test.csv"),
            report_path: None,
            label: LabelRule::default(),
            model: ModelConfig::default(),
            pipeline: PipelineConfig::default(),
            search: SearchConfig::default(),
            cost_benefit: CostBenefit::default(),
        }
    }
}

impl ChurnConfig {
    /// Reject configurations the search cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        self.pipeline.weekday_flags.validate()
    }
}

/// Load a run configuration from a JSON file. Missing fields take defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<ChurnConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: ChurnConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config: {}", path.as_ref().display()))?;
    Ok(config)
}

/// How churn labels are derived from a record.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct LabelRule {
    /// Date column compared against the cutoff.
    pub column: String,
    /// Records whose date precedes this day are churned (label 1).
    pub cutoff: NaiveDate,
    pub date_formats: Vec<String>,
}

impl Default for LabelRule {
    fn default() -> Self {
        Self {
            column: "last_trip_date".to_string(),
            cutoff: NaiveDate::from_ymd_opt(2014, 6, 1).unwrap_or(NaiveDate::MIN),
            date_formats: default_date_formats(),
        }
    }
}

fn default_date_formats() -> Vec<String> {
    DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect()
}

/// Classifier configuration.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ModelConfig {
    pub learning_rate: f64,

    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported classifiers and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    Logistic {
        max_iter: usize,
        /// L2 penalty strength.
        alpha: f64,
        tol: f64,
        fit_intercept: bool,
    },
    GBDT {
        max_depth: u32,
        num_boost_round: u32,
        debug: bool,
        training_optimization_level: u8,
        loss_type: String,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::Logistic {
            max_iter: 1000,
            alpha: 0.01,
            tol: 1e-6,
            fit_intercept: true,
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "logistic" | "logistic_regression" => Ok(ModelType::default()),
            "gbdt" => Ok(ModelType::GBDT {
                max_depth: 4,
                num_boost_round: 50,
                debug: false,
                training_optimization_level: 2,
                loss_type: "LogLikelyhood".to_string(),
            }),
            _ => Err(format!(
                "Unknown model type: {}. Expected 'logistic' or 'gbdt'",
                s
            )),
        }
    }
}

impl ModelConfig {
    pub fn new(learning_rate: f64, model_type: ModelType) -> Self {
        Self {
            learning_rate,
            model_type,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            model_type: ModelType::default(),
        }
    }
}

/// Parameters of the fixed transform chain.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub type_normalizer: TypeNormalizerConfig,
    pub weekday_flags: WeekdayFlagConfig,
    pub categorical: CategoricalExpanderConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct TypeNormalizerConfig {
    pub categorical_columns: Vec<String>,
    pub date_columns: Vec<String>,
    pub date_formats: Vec<String>,
    /// Level given to missing cells of the categorical columns.
    pub missing_level: String,
}

impl Default for TypeNormalizerConfig {
    fn default() -> Self {
        Self {
            categorical_columns: vec!["city".to_string(), "phone".to_string()],
            date_columns: vec!["last_trip_date".to_string(), "signup_date".to_string()],
            date_formats: default_date_formats(),
            missing_level: "nan".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct WeekdayFlagConfig {
    /// Percentage of activity on weekdays, 0..=100.
    pub source_column: String,
    pub weekend_column: String,
    pub weekday_column: String,
    /// `weekend_column` is 1.0 when the percentage is strictly below this.
    pub weekend_below: f64,
    /// `weekday_column` is 1.0 when the percentage is strictly above this.
    pub weekday_above: f64,
}

impl Default for WeekdayFlagConfig {
    fn default() -> Self {
        Self {
            source_column: "weekday_pct".to_string(),
            weekend_column: "Weekend".to_string(),
            weekday_column: "Weekday".to_string(),
            weekend_below: 10.0,
            weekday_above: 90.0,
        }
    }
}

impl WeekdayFlagConfig {
    fn validate(&self) -> Result<()> {
        if self.weekend_below > self.weekday_above {
            return Err(ChurnError::InvalidConfig(format!(
                "weekend_below ({}) must not exceed weekday_above ({})",
                self.weekend_below, self.weekday_above
            )));
        }
        Ok(())
    }
}

/// What the categorical expander does with a level it did not see at fit.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Fail with `SchemaMismatch`.
    #[default]
    Error,
    /// Emit all-zero indicators for the row.
    Ignore,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct CategoricalExpanderConfig {
    pub separator: String,
    pub unknown_category: UnknownCategoryPolicy,
}

impl Default for CategoricalExpanderConfig {
    fn default() -> Self {
        Self {
            separator: "_".to_string(),
            unknown_category: UnknownCategoryPolicy::Error,
        }
    }
}

/// A named list of columns exposed to the classifier.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FeatureSubset {
    pub name: String,
    pub columns: Vec<String>,
}

impl FeatureSubset {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// The three increasingly rich candidate subsets.
    pub fn defaults() -> Vec<FeatureSubset> {
        let base = vec!["avg_dist", "trips_in_first_30_days", "city", "phone"];
        let mut luxury = base.clone();
        luxury.push("luxury_car_user");
        let mut weekday = luxury.clone();
        weekday.extend(["Weekday", "Weekend"]);
        vec![
            FeatureSubset::new("base", &base),
            FeatureSubset::new("luxury", &luxury),
            FeatureSubset::new("weekday", &weekday),
        ]
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct CrossValidationConfig {
    pub n_folds: usize,
    /// Shuffle each class before dealing rows to folds.
    pub shuffle: bool,
    pub seed: u64,
}

impl Default for CrossValidationConfig {
    fn default() -> Self {
        Self {
            n_folds: 3,
            shuffle: false,
            seed: 42,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub thresholds: Vec<f64>,
    pub feature_subsets: Vec<FeatureSubset>,
    pub cross_validation: CrossValidationConfig,
    /// Evaluate candidates on the rayon pool.
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            thresholds: default_thresholds(),
            feature_subsets: FeatureSubset::defaults(),
            cross_validation: CrossValidationConfig::default(),
            parallel: true,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.thresholds.is_empty() {
            return Err(ChurnError::InvalidConfig(
                "at least one threshold is required".to_string(),
            ));
        }
        if let Some(&t) = self
            .thresholds
            .iter()
            .find(|t| !(0.0..=1.0).contains(*t))
        {
            return Err(ChurnError::InvalidThreshold(t));
        }
        if self.feature_subsets.is_empty() {
            return Err(ChurnError::InvalidConfig(
                "at least one feature subset is required".to_string(),
            ));
        }
        if let Some(subset) = self.feature_subsets.iter().find(|s| s.columns.is_empty()) {
            return Err(ChurnError::InvalidConfig(format!(
                "feature subset '{}' names no columns",
                subset.name
            )));
        }
        if self.cross_validation.n_folds < 2 {
            return Err(ChurnError::InvalidConfig(format!(
                "cross-validation needs at least 2 folds, got {}",
                self.cross_validation.n_folds
            )));
        }
        Ok(())
    }
}

/// Nine evenly spaced thresholds, 0.1 through 0.9.
pub fn default_thresholds() -> Vec<f64> {
    linspace(0.1f64, 0.9, 9)
        .map(|t| (t * 100.0).round() / 100.0)
        .collect()
}
