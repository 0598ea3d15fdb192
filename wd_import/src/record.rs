use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::structured::parse_structured;

/// One feedback event imported from a Workday export.
///
/// Records are written once by the pipeline and never mutated afterwards.
/// A record is either *structured* (the feedback text carried a `[TENETS]`
/// marker block, recovered into the id lists and prose fields) or *generic*
/// free text, in which case both id lists stay empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkdayRecord {
    pub about: String,
    pub from_name: String,
    pub question: Option<String>,
    /// Full free-text response as exported.
    pub feedback: Option<String>,
    pub asked_by: Option<String>,
    /// "Requested by Self" or "Requested by Others"; used for consistency
    /// checking only, not enforced structurally.
    pub request_type: Option<String>,
    /// When the response was submitted; `None` if the cell was unparseable.
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_structured: bool,
    #[serde(default)]
    pub strength_ids: Vec<String>,
    #[serde(default)]
    pub improvement_ids: Vec<String>,
    pub strength_prose: Option<String>,
    pub improvement_prose: Option<String>,
}

/// Deduplication identity: two records with equal keys are the same logical
/// feedback event, whatever the rest of their content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub about: String,
    pub from_name: String,
    pub question: Option<String>,
    pub date: Option<NaiveDateTime>,
}

impl WorkdayRecord {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            about: self.about.clone(),
            from_name: self.from_name.clone(),
            question: self.question.clone(),
            date: self.date,
        }
    }

    /// Runs the structured-feedback extractor against the feedback text and
    /// fills in the structured fields. Returns whether a marker block was
    /// found.
    pub fn apply_structured(&mut self) -> bool {
        match self.feedback.as_deref().and_then(parse_structured) {
            Some(parsed) => {
                self.is_structured = true;
                self.strength_ids = parsed.strength_ids;
                self.improvement_ids = parsed.improvement_ids;
                self.strength_prose = parsed.strength_prose;
                self.improvement_prose = parsed.improvement_prose;
                true
            }
            None => {
                self.is_structured = false;
                self.strength_ids = Vec::new();
                self.improvement_ids = Vec::new();
                false
            }
        }
    }
}
