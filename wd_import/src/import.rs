use std::path::Path;

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, info};
use serde::Serialize;
use serde_json::json;

use crate::columns::{detect_columns, header_texts};
use crate::config::ImportConfig;
use crate::record::WorkdayRecord;
use crate::rows::{cell_text, validate_row, RowOutcome};
use crate::store::{FeedbackStore, InsertError};

/// Statistics and diagnostics for one import run.
///
/// `errors` non-empty means the run failed (entirely, for container-level
/// failures, or partially, for isolated row-level failures); `warnings`
/// record soft degradations and never affect success.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub imported: u64,
    pub skipped_duplicates: u64,
    pub skipped_empty: u64,
    pub structured_count: u64,
    pub generic_count: u64,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ImportResult {
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Flat key-value document for relaying to an operator.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "success": self.success(),
            "imported": self.imported,
            "skipped_duplicates": self.skipped_duplicates,
            "skipped_empty": self.skipped_empty,
            "structured_count": self.structured_count,
            "generic_count": self.generic_count,
            "warnings": self.warnings,
            "errors": self.errors,
        })
    }
}

/// Imports a Workday XLSX export into `store`.
///
/// Never returns an error: open/parse failures and missing mandatory
/// columns are captured into the result's `errors` with no rows processed,
/// and once row iteration begins, individual row failures are isolated and
/// never abort the batch. With `config` unset, `workday_config.json` is
/// looked up in the working directory.
pub fn import_xlsx(
    path: &str,
    store: &mut dyn FeedbackStore,
    config: Option<&ImportConfig>,
) -> ImportResult {
    let loaded;
    let config = match config {
        Some(c) => c,
        None => {
            loaded = ImportConfig::load_or_default(Path::new("."));
            &loaded
        }
    };

    let mut result = ImportResult::default();

    let mut workbook: Xlsx<_> = match open_workbook(path) {
        Ok(wb) => wb,
        Err(e) => {
            result
                .errors
                .push(format!("Failed to open XLSX file: {}", e));
            return result;
        }
    };

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet = match sheet_names
        .iter()
        .find(|name| name.to_lowercase().contains("feedback"))
    {
        Some(name) => name.clone(),
        None => match sheet_names.first() {
            Some(first) => {
                result
                    .warnings
                    .push(format!("No 'Feedback' sheet found, using '{}'", first));
                first.clone()
            }
            None => {
                result
                    .errors
                    .push("Failed to open XLSX file: workbook has no worksheets".to_string());
                return result;
            }
        },
    };

    let range = match workbook.worksheet_range(&sheet) {
        Some(Ok(range)) => range,
        Some(Err(e)) => {
            result
                .errors
                .push(format!("Failed to read sheet '{}': {}", sheet, e));
            return result;
        }
        None => {
            result
                .errors
                .push(format!("Failed to read sheet '{}'", sheet));
            return result;
        }
    };
    info!(
        "import_xlsx: {}: importing sheet '{}' ({} rows)",
        path,
        sheet,
        range.height()
    );

    run_range(&range, store, config, &mut result);
    result
}

/// Runs the row-level pass against an already-opened sheet range. Exposed
/// so callers (and tests) can drive synthetic ranges without a file.
pub fn import_range(
    range: &Range<DataType>,
    store: &mut dyn FeedbackStore,
    config: &ImportConfig,
) -> ImportResult {
    let mut result = ImportResult::default();
    run_range(range, store, config, &mut result);
    result
}

fn run_range(
    range: &Range<DataType>,
    store: &mut dyn FeedbackStore,
    config: &ImportConfig,
    result: &mut ImportResult,
) {
    // calamine ranges may not start at the sheet's first row; header_row is
    // 1-based over the whole sheet.
    let offset = range.start().map(|(r, _)| r as usize).unwrap_or(0);
    let rows: Vec<&[DataType]> = range.rows().collect();

    let header_idx = config
        .header_row
        .checked_sub(1)
        .and_then(|r| r.checked_sub(offset));
    let headers: Vec<String> = header_idx
        .and_then(|i| rows.get(i))
        .map(|row| header_texts(row))
        .unwrap_or_default();

    let (mapping, column_warnings) = detect_columns(&headers, config);
    result.warnings.extend(column_warnings);

    if mapping.from_name.is_none() {
        result
            .errors
            .push("Cannot import: 'From'/'Provider' column not found in spreadsheet".to_string());
        return;
    }
    if mapping.about.is_none() {
        result
            .errors
            .push("Cannot import: 'About'/'Recipient' column not found in spreadsheet".to_string());
        return;
    }

    let mut feedback_also_given_to_used = false;
    let first_data_idx = header_idx.map(|i| i + 1).unwrap_or(0);

    for (idx, row) in rows.iter().enumerate().skip(first_data_idx) {
        let row_num = offset + idx + 1;

        if cell_text(row, mapping.feedback_also_given_to).is_some() {
            feedback_also_given_to_used = true;
        }

        match validate_row(row, row_num, &mapping, config) {
            RowOutcome::Reject(message) => {
                result.errors.push(message);
                continue;
            }
            RowOutcome::SkipEmpty => {
                result.skipped_empty += 1;
                continue;
            }
            RowOutcome::Accept => {}
        }

        let mut record = WorkdayRecord {
            about: cell_text(row, mapping.about).unwrap_or_default(),
            from_name: cell_text(row, mapping.from_name).unwrap_or_default(),
            question: cell_text(row, mapping.question),
            feedback: cell_text(row, mapping.feedback),
            asked_by: cell_text(row, mapping.asked_by),
            request_type: cell_text(row, mapping.request_type),
            date: parse_date(row, mapping.date),
            is_structured: false,
            strength_ids: Vec::new(),
            improvement_ids: Vec::new(),
            strength_prose: None,
            improvement_prose: None,
        };
        record.apply_structured();
        debug!("run_range: row {}: {:?}", row_num, record);

        let structured = record.is_structured;
        match store.insert(record) {
            Ok(()) => {
                result.imported += 1;
                if structured {
                    result.structured_count += 1;
                } else {
                    result.generic_count += 1;
                }
            }
            Err(InsertError::Duplicate { .. }) => {
                result.skipped_duplicates += 1;
            }
            Err(e) => {
                // The store stopped accepting writes; the remaining rows
                // cannot be imported.
                result.errors.push(format!("Row {}: {}", row_num, e));
                break;
            }
        }
    }

    if result.skipped_empty > 0 {
        result.warnings.push(format!(
            "Skipped {} empty/incomplete rows (possibly pending feedback requests)",
            result.skipped_empty
        ));
    }
    if feedback_also_given_to_used {
        result.warnings.push(
            "Some entries have 'Feedback Also Given To' values - this column is not currently supported"
                .to_string(),
        );
    }
}

fn parse_date(row: &[DataType], idx: Option<usize>) -> Option<NaiveDateTime> {
    let cell = idx.and_then(|i| row.get(i))?;
    match cell {
        DataType::DateTime(_) => cell.as_datetime(),
        DataType::String(s) => parse_iso_datetime(s.trim()),
        _ => None,
    }
}

// Accepts the ISO-8601 renderings seen in exports. Anything else yields an
// absent date, never an error.
fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
