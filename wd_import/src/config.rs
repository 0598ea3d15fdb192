use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::{OpeningConfigSnafu, ParsingConfigSnafu, WdResult};

/// Name of the optional override file consulted by
/// [`ImportConfig::load_or_default`].
pub const CONFIG_FILE_NAME: &str = "workday_config.json";

/// Import configuration: header synonyms and structural parameters.
///
/// Every field carries a default, and deserialization merges provided keys
/// over the defaults field by field. A partial or drifting override file
/// therefore degrades gracefully instead of failing the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub column_headers: ColumnHeaders,
    pub optional_headers: OptionalHeaders,
    /// 1-based row holding the column titles. Row 1 of the Workday export
    /// is a free-text title banner.
    pub header_row: usize,
    pub request_types: RequestTypes,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            column_headers: ColumnHeaders::default(),
            optional_headers: OptionalHeaders::default(),
            header_row: 2,
            request_types: RequestTypes::default(),
        }
    }
}

/// Acceptable header texts for each required field, case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnHeaders {
    pub about: Vec<String>,
    pub from_name: Vec<String>,
    pub question: Vec<String>,
    pub feedback: Vec<String>,
    pub asked_by: Vec<String>,
    pub request_type: Vec<String>,
    pub date: Vec<String>,
}

impl Default for ColumnHeaders {
    fn default() -> Self {
        ColumnHeaders {
            about: strings(&["about", "recipient", "employee", "for"]),
            from_name: strings(&["from", "provider", "given by", "reviewer"]),
            question: strings(&["question"]),
            feedback: strings(&["feedback", "response", "answer", "comments"]),
            asked_by: strings(&["asked by", "requested by", "requester"]),
            request_type: strings(&["type", "request type"]),
            date: strings(&["date", "response date", "submitted"]),
        }
    }
}

/// Header texts for fields whose absence is not worth a warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionalHeaders {
    pub about_id: Vec<String>,
    pub from_id: Vec<String>,
    pub feedback_also_given_to: Vec<String>,
}

impl Default for OptionalHeaders {
    fn default() -> Self {
        OptionalHeaders {
            about_id: strings(&["about id", "recipient id", "employee id"]),
            from_id: strings(&["from id", "provider id", "reviewer id"]),
            feedback_also_given_to: strings(&["feedback also given to", "also given to"]),
        }
    }
}

/// Canonical labels for the two feedback-request types, used by the row
/// consistency check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestTypes {
    #[serde(rename = "self")]
    pub self_requested: String,
    pub others: String,
}

impl Default for RequestTypes {
    fn default() -> Self {
        RequestTypes {
            self_requested: "Requested by Self".to_string(),
            others: "Requested by Others".to_string(),
        }
    }
}

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

impl ImportConfig {
    /// Reads a configuration override from `path`.
    pub fn load(path: &Path) -> WdResult<ImportConfig> {
        let display = path.display().to_string();
        let contents = fs::read_to_string(path).context(OpeningConfigSnafu {
            path: display.clone(),
        })?;
        serde_json::from_str(&contents).context(ParsingConfigSnafu { path: display })
    }

    /// Returns the override found as `workday_config.json` in `dir`, or the
    /// built-in defaults. A missing file is routine; a malformed one is
    /// logged and ignored rather than failing the run.
    pub fn load_or_default(dir: &Path) -> ImportConfig {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return ImportConfig::default();
        }
        match ImportConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring unreadable {}: {}", CONFIG_FILE_NAME, e);
                ImportConfig::default()
            }
        }
    }
}
