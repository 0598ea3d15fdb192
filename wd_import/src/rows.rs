use calamine::DataType;

use crate::columns::ColumnMapping;
use crate::config::ImportConfig;

/// Decision for one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Accept,
    /// No reviewer yet: the export keeps placeholder rows for feedback
    /// requests that were sent but never answered.
    SkipEmpty,
    /// Semantic inconsistency between About, Asked By and Type. The message
    /// names the row and the conflicting values.
    Reject(String),
}

/// Cell text at a mapped position. Absent columns, out-of-range positions
/// and empty-after-trim strings all yield `None`; numeric cells render via
/// their display form.
pub(crate) fn cell_text(row: &[DataType], idx: Option<usize>) -> Option<String> {
    let cell = idx.and_then(|i| row.get(i))?;
    match cell {
        DataType::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) => Some(f.to_string()),
        DataType::Bool(b) => Some(b.to_string()),
        // Datetime, error and empty cells carry no usable text.
        _ => None,
    }
}

/// Validates a single data row. `row_num` is the 1-based sheet position,
/// used only for error messages.
pub fn validate_row(
    row: &[DataType],
    row_num: usize,
    mapping: &ColumnMapping,
    config: &ImportConfig,
) -> RowOutcome {
    if cell_text(row, mapping.from_name).is_none() {
        return RowOutcome::SkipEmpty;
    }

    let about = cell_text(row, mapping.about);
    let asked_by = cell_text(row, mapping.asked_by);
    let request_type = cell_text(row, mapping.request_type);

    // The consistency check needs all three fields; partial data is not
    // grounds for rejection.
    if let (Some(about), Some(asked_by), Some(request_type)) = (about, asked_by, request_type) {
        let types = &config.request_types;
        if about == asked_by && request_type != types.self_requested {
            return RowOutcome::Reject(format!(
                "Row {}: Data inconsistency - About '{}' matches Asked By but Type is '{}' (expected '{}')",
                row_num, about, request_type, types.self_requested
            ));
        }
        if about != asked_by && request_type != types.others {
            return RowOutcome::Reject(format!(
                "Row {}: Data inconsistency - About '{}' differs from Asked By '{}' but Type is '{}' (expected '{}')",
                row_num, about, asked_by, request_type, types.others
            ));
        }
    }

    RowOutcome::Accept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> ColumnMapping {
        ColumnMapping {
            about: Some(0),
            from_name: Some(1),
            asked_by: Some(2),
            request_type: Some(3),
            ..ColumnMapping::default()
        }
    }

    fn row(cells: &[Option<&str>]) -> Vec<DataType> {
        cells
            .iter()
            .map(|c| match c {
                Some(s) => DataType::String(s.to_string()),
                None => DataType::Empty,
            })
            .collect()
    }

    #[test]
    fn empty_from_name_is_silent_skip() {
        let r = row(&[Some("John Doe"), None, Some("John Doe"), Some("Requested by Self")]);
        assert_eq!(
            validate_row(&r, 5, &mapping(), &ImportConfig::default()),
            RowOutcome::SkipEmpty
        );
    }

    #[test]
    fn consistent_self_request_accepted() {
        let r = row(&[
            Some("John Doe"),
            Some("Jane Smith"),
            Some("John Doe"),
            Some("Requested by Self"),
        ]);
        assert_eq!(
            validate_row(&r, 5, &mapping(), &ImportConfig::default()),
            RowOutcome::Accept
        );
    }

    #[test]
    fn consistent_others_request_accepted() {
        let r = row(&[
            Some("John Doe"),
            Some("Jane Smith"),
            Some("Manager Name"),
            Some("Requested by Others"),
        ]);
        assert_eq!(
            validate_row(&r, 5, &mapping(), &ImportConfig::default()),
            RowOutcome::Accept
        );
    }

    #[test]
    fn self_match_with_others_type_rejected() {
        let r = row(&[
            Some("John Doe"),
            Some("Jane Smith"),
            Some("John Doe"),
            Some("Requested by Others"),
        ]);
        match validate_row(&r, 5, &mapping(), &ImportConfig::default()) {
            RowOutcome::Reject(message) => {
                assert!(message.to_lowercase().contains("inconsistency"));
                assert!(message.contains("Row 5"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn differing_names_with_self_type_rejected() {
        let r = row(&[
            Some("John Doe"),
            Some("Jane Smith"),
            Some("Manager Name"),
            Some("Requested by Self"),
        ]);
        match validate_row(&r, 7, &mapping(), &ImportConfig::default()) {
            RowOutcome::Reject(message) => {
                assert!(message.contains("Manager Name"));
                assert!(message.contains("Requested by Others"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn partial_data_is_never_rejected() {
        // Missing asked_by.
        let r = row(&[Some("John Doe"), Some("Jane Smith"), None, Some("Requested by Self")]);
        assert_eq!(
            validate_row(&r, 5, &mapping(), &ImportConfig::default()),
            RowOutcome::Accept
        );
        // Missing request_type.
        let r = row(&[Some("John Doe"), Some("Jane Smith"), Some("John Doe"), None]);
        assert_eq!(
            validate_row(&r, 5, &mapping(), &ImportConfig::default()),
            RowOutcome::Accept
        );
    }

    #[test]
    fn cell_text_handles_missing_and_short_rows() {
        let r = row(&[Some("value1"), Some("value2")]);
        assert_eq!(cell_text(&r, Some(1)), Some("value2".to_string()));
        assert_eq!(cell_text(&r, None), None);
        assert_eq!(cell_text(&r, Some(5)), None);
        assert_eq!(cell_text(&[DataType::String("  ".to_string())], Some(0)), None);
    }
}
