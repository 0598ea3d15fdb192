use once_cell::sync::Lazy;
use regex::Regex;

/// Payload recovered from a `[TENETS]` marker block and the prose around it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredFeedback {
    /// Tenet ids from the "Strengths:" line, in original order, duplicates
    /// preserved.
    pub strength_ids: Vec<String>,
    /// Tenet ids from the "Improvements:" line.
    pub improvement_ids: Vec<String>,
    pub strength_prose: Option<String>,
    pub improvement_prose: Option<String>,
}

// The line order inside the block is fixed: Strengths before Improvements.
// A block with the lines reversed does not match and the entry is treated
// as generic.
static MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[TENETS\]\s*Strengths:\s*([^\n]*)\s*Improvements:\s*([^\n]*)\s*\[/TENETS\]")
        .unwrap()
});

static STRENGTH_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)Strengths?:\s*(.*?)(?:Areas?\s+for\s+Improvement|\z)").unwrap());

static IMPROVEMENT_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)Areas?\s+for\s+Improvement:\s*(.*)").unwrap());

/// Detects the marker block in a feedback text. Returns `None` when the
/// text carries no block, i.e. the entry is generic free text.
///
/// The prose sections are looked up independently of the block, in the text
/// following it; either may be absent, which is a soft parse failure and
/// not an error.
pub fn parse_structured(text: &str) -> Option<StructuredFeedback> {
    let captures = MARKER.captures(text)?;
    let marker = captures.get(0)?;

    let strength_ids = split_ids(captures.get(1).map_or("", |m| m.as_str()));
    let improvement_ids = split_ids(captures.get(2).map_or("", |m| m.as_str()));

    let after_marker = text[marker.end()..].trim();
    let strength_prose = section_text(&STRENGTH_SECTION, after_marker);
    let improvement_prose = section_text(&IMPROVEMENT_SECTION, after_marker);

    Some(StructuredFeedback {
        strength_ids,
        improvement_ids,
        strength_prose,
        improvement_prose,
    })
}

fn split_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn section_text(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_id_lists() {
        let strengths = vec!["t1", "t2", "t3"];
        let improvements = vec!["t4", "t5"];
        let text = format!(
            "[TENETS]\nStrengths: {}\nImprovements: {}\n[/TENETS]",
            strengths.join(","),
            improvements.join(",")
        );

        let parsed = parse_structured(&text).unwrap();
        assert_eq!(parsed.strength_ids, strengths);
        assert_eq!(parsed.improvement_ids, improvements);
    }

    #[test]
    fn plain_text_is_generic() {
        assert!(parse_structured("John is always helpful.").is_none());
        assert!(parse_structured("").is_none());
        // Mentioning strengths without the block does not qualify.
        assert!(parse_structured("Strengths: being nice").is_none());
    }

    #[test]
    fn tags_are_case_insensitive() {
        let text = "[tenets]\nStrengths: a, b, c\nImprovements: d\n[/tenets]\n\nSome text here.";
        let parsed = parse_structured(text).unwrap();
        assert_eq!(parsed.strength_ids, vec!["a", "b", "c"]);
        assert_eq!(parsed.improvement_ids, vec!["d"]);
    }

    #[test]
    fn reversed_line_order_is_generic() {
        let text = "[TENETS]\nImprovements: t4\nStrengths: t1\n[/TENETS]";
        assert!(parse_structured(text).is_none());
    }

    #[test]
    fn tokens_are_trimmed_and_empties_dropped() {
        let text = "[TENETS]\nStrengths:  t1 , , t2,\nImprovements:\n[/TENETS]";
        let parsed = parse_structured(text).unwrap();
        assert_eq!(parsed.strength_ids, vec!["t1", "t2"]);
        assert!(parsed.improvement_ids.is_empty());
    }

    #[test]
    fn duplicates_are_preserved_in_order() {
        let text = "[TENETS]\nStrengths: t1,t2,t1\nImprovements: t3\n[/TENETS]";
        let parsed = parse_structured(text).unwrap();
        assert_eq!(parsed.strength_ids, vec!["t1", "t2", "t1"]);
    }

    #[test]
    fn extracts_prose_sections_after_the_block() {
        let text = "[TENETS]\nStrengths: tenet1, tenet2, tenet3\nImprovements: tenet4, tenet5\n[/TENETS]\n\n\
            Strengths:\n\u{2022} Test Tenet 1\n\u{2022} Test Tenet 2\n\n\
            John consistently demonstrates excellence in these areas.\n\n\
            Areas for Improvement:\n\u{2022} Test Tenet 4\n\n\
            These represent growth opportunities.";

        let parsed = parse_structured(text).unwrap();
        let strengths = parsed.strength_prose.unwrap();
        let improvements = parsed.improvement_prose.unwrap();
        assert!(strengths.contains("excellence"));
        assert!(!strengths.contains("growth opportunities"));
        assert!(improvements.contains("growth opportunities"));
    }

    #[test]
    fn missing_prose_sections_are_soft() {
        let text = "[TENETS]\nStrengths: t1\nImprovements: t2\n[/TENETS]\n\nGreat job.";
        let parsed = parse_structured(text).unwrap();
        assert_eq!(parsed.strength_prose, None);
        assert_eq!(parsed.improvement_prose, None);
    }

    #[test]
    fn tolerates_whitespace_around_block_and_commas() {
        let text = "  \n[TENETS]\nStrengths:   t1 ,  t2  \nImprovements:  t3\n[/TENETS]  \n";
        let parsed = parse_structured(text).unwrap();
        assert_eq!(parsed.strength_ids, vec!["t1", "t2"]);
        assert_eq!(parsed.improvement_ids, vec!["t3"]);
    }
}
