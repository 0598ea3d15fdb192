use calamine::DataType;
use log::debug;

use crate::config::ImportConfig;

/// Zero-based column positions detected from the header row. Built once per
/// sheet and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    pub about: Option<usize>,
    pub from_name: Option<usize>,
    pub question: Option<usize>,
    pub feedback: Option<usize>,
    pub asked_by: Option<usize>,
    pub request_type: Option<usize>,
    pub date: Option<usize>,
    pub about_id: Option<usize>,
    pub from_id: Option<usize>,
    pub feedback_also_given_to: Option<usize>,
}

/// Trimmed, lowercased header texts for one row. Non-string cells render via
/// their display form so positions stay aligned with the sheet.
pub fn header_texts(row: &[DataType]) -> Vec<String> {
    row.iter()
        .map(|cell| match cell {
            DataType::String(s) => s.trim().to_lowercase(),
            DataType::Empty => String::new(),
            other => other.to_string().trim().to_lowercase(),
        })
        .collect()
}

type Strategy = fn(&[String], &[String]) -> Option<usize>;

// Tried in order for required fields. Exact wins over prefix so that a
// loosely-worded neighbour cannot shadow the real column.
const REQUIRED_STRATEGIES: [Strategy; 2] = [match_exact, match_prefix];

fn match_exact(headers: &[String], synonyms: &[String]) -> Option<usize> {
    headers
        .iter()
        .position(|h| synonyms.iter().any(|name| name == h))
}

// Workday exports place decorative photo columns next to the real data
// ("About Photo" before "About"), so the prefix pass skips anything
// mentioning "photo".
fn match_prefix(headers: &[String], synonyms: &[String]) -> Option<usize> {
    headers.iter().position(|h| {
        !h.contains("photo") && synonyms.iter().any(|name| h.starts_with(name.as_str()))
    })
}

fn match_substring(headers: &[String], synonyms: &[String]) -> Option<usize> {
    headers
        .iter()
        .position(|h| synonyms.iter().any(|name| h.contains(name.as_str())))
}

fn find_required(headers: &[String], synonyms: &[String]) -> Option<usize> {
    let lowered = lowercase(synonyms);
    REQUIRED_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(headers, &lowered))
}

fn find_optional(headers: &[String], synonyms: &[String]) -> Option<usize> {
    match_substring(headers, &lowercase(synonyms))
}

fn lowercase(synonyms: &[String]) -> Vec<String> {
    synonyms.iter().map(|s| s.to_lowercase()).collect()
}

/// Computes the column mapping for a header row.
///
/// `headers` must already be trimmed and lowercased (see [`header_texts`]).
/// Missing optional fields are silent; missing required fields produce
/// warnings, and `about` additionally falls back to the first non-empty
/// header that is not a photo column. The orchestrator promotes a still
/// missing `from_name` or `about` to a fatal error.
pub fn detect_columns(headers: &[String], config: &ImportConfig) -> (ColumnMapping, Vec<String>) {
    let required = &config.column_headers;
    let optional = &config.optional_headers;
    let mut warnings: Vec<String> = Vec::new();

    let mut mapping = ColumnMapping {
        about: find_required(headers, &required.about),
        from_name: find_required(headers, &required.from_name),
        question: find_required(headers, &required.question),
        feedback: find_required(headers, &required.feedback),
        asked_by: find_required(headers, &required.asked_by),
        request_type: find_required(headers, &required.request_type),
        date: find_required(headers, &required.date),
        about_id: find_optional(headers, &optional.about_id),
        from_id: find_optional(headers, &optional.from_id),
        feedback_also_given_to: find_optional(headers, &optional.feedback_also_given_to),
    };
    debug!(
        "detect_columns: headers: {:?} mapping: {:?}",
        headers, mapping
    );

    if mapping.about.is_none() {
        warnings.push(
            "Could not find 'About'/'Recipient' column - using first non-photo column".to_string(),
        );
        mapping.about = headers
            .iter()
            .position(|h| !h.is_empty() && !h.contains("photo"));
    }
    if mapping.from_name.is_none() {
        warnings.push("Could not find 'From'/'Provider' column - required for import".to_string());
    }
    if mapping.feedback.is_none() {
        warnings.push("Could not find 'Feedback'/'Response' column".to_string());
    }

    (mapping, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.trim().to_lowercase()).collect()
    }

    #[test]
    fn detects_standard_workday_headers() {
        let hs = headers(&[
            "About Photo",
            "About",
            "Feedback Also Given To",
            "From Photo",
            "From",
            "Question",
            "Feedback",
            "Asked By",
            "Type",
            "Date",
        ]);
        let (mapping, warnings) = detect_columns(&hs, &ImportConfig::default());

        assert_eq!(mapping.about, Some(1));
        assert_eq!(mapping.from_name, Some(4));
        assert_eq!(mapping.question, Some(5));
        assert_eq!(mapping.feedback, Some(6));
        assert_eq!(mapping.asked_by, Some(7));
        assert_eq!(mapping.request_type, Some(8));
        assert_eq!(mapping.date, Some(9));
        assert_eq!(mapping.feedback_also_given_to, Some(2));
        assert!(warnings.is_empty());
    }

    #[test]
    fn exact_match_wins_over_photo_neighbour() {
        let hs = headers(&["About Photo", "About"]);
        let (mapping, _) = detect_columns(&hs, &ImportConfig::default());
        assert_eq!(mapping.about, Some(1));
    }

    #[test]
    fn prefix_fallback_skips_photo_columns() {
        // No exact "about" header: the synonym "recipient" must win over the
        // photo column even though the photo column comes first.
        let hs = headers(&["About Photo", "Recipient"]);
        let (mapping, _) = detect_columns(&hs, &ImportConfig::default());
        assert_eq!(mapping.about, Some(1));
    }

    #[test]
    fn detects_alternative_column_names() {
        let hs = headers(&["Recipient", "Provider", "Comments", "Submitted"]);
        let (mapping, _) = detect_columns(&hs, &ImportConfig::default());

        assert_eq!(mapping.about, Some(0));
        assert_eq!(mapping.from_name, Some(1));
        assert_eq!(mapping.feedback, Some(2));
        assert_eq!(mapping.date, Some(3));
    }

    #[test]
    fn missing_from_column_warns() {
        let hs = headers(&["About", "Random Column"]);
        let (mapping, warnings) = detect_columns(&hs, &ImportConfig::default());

        assert_eq!(mapping.about, Some(0));
        assert_eq!(mapping.from_name, None);
        assert!(warnings.iter().any(|w| w.contains("From")));
    }

    #[test]
    fn about_falls_back_to_first_non_photo_header() {
        let hs = headers(&["About Photo", "Interesting"]);
        let (mapping, warnings) = detect_columns(&hs, &ImportConfig::default());

        assert_eq!(mapping.about, Some(1));
        assert!(warnings.iter().any(|w| w.contains("non-photo")));
    }

    #[test]
    fn optional_fields_match_by_substring_without_warning() {
        let hs = headers(&["About", "From", "Feedback", "Employee ID Number"]);
        let (mapping, warnings) = detect_columns(&hs, &ImportConfig::default());

        assert_eq!(mapping.about_id, Some(3));
        assert!(warnings.is_empty());
    }

    #[test]
    fn header_texts_lowercases_and_keeps_positions() {
        let row = vec![
            DataType::String("  About  ".to_string()),
            DataType::Empty,
            DataType::Float(3.0),
            DataType::String("FROM".to_string()),
        ];
        assert_eq!(header_texts(&row), vec!["about", "", "3", "from"]);
    }
}
