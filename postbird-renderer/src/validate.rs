//! Front-matter checks run before a document is allowed into delivery.

/// Delimiter that opens and closes the front-matter block.
pub const DELIMITER: &str = "---";

const RECOMMENDED_KEYS: &[&str] = &["title", "date", "draft"];

/// Outcome of [`validate_document`]. Errors block delivery; warnings don't.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Split `content` into its front-matter lines, if a well-formed block
/// (opening and closing delimiter) is present.
fn front_matter_lines(content: &str) -> Option<Vec<&str>> {
    let mut lines = content.lines();
    if lines.next()?.trim_end() != DELIMITER {
        return None;
    }
    let mut block = Vec::new();
    for line in lines {
        if line.trim_end() == DELIMITER {
            return Some(block);
        }
        block.push(line);
    }
    None
}

fn key_of(line: &str) -> Option<&str> {
    let (key, _) = line.split_once(':')?;
    let key = key.trim();
    (!key.is_empty() && !key.starts_with('#')).then_some(key)
}

/// Check that `content` starts with a closed front-matter block and carries
/// the recommended keys.
pub fn validate_document(content: &str) -> ValidationReport {
    let mut report = ValidationReport::default();
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    if !content.starts_with(DELIMITER) {
        report
            .errors
            .push("missing front matter delimiter".to_string());
        return report;
    }
    let Some(block) = front_matter_lines(content) else {
        report
            .errors
            .push("front matter block is not closed".to_string());
        return report;
    };

    let keys: Vec<&str> = block.iter().filter_map(|l| key_of(l)).collect();
    for wanted in RECOMMENDED_KEYS {
        if !keys.contains(wanted) {
            report
                .warnings
                .push(format!("missing recommended field: {wanted}"));
        }
    }
    report
}

/// The `title` value from the front-matter block, unquoted.
pub fn front_matter_title(content: &str) -> Option<String> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let block = front_matter_lines(content)?;
    let line = block.iter().find(|l| key_of(l) == Some("title"))?;
    let (_, raw) = line.split_once(':')?;
    let raw = raw.trim();
    let value = if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        raw[1..raw.len() - 1]
            .replace("\\\"", "\"")
            .replace("\\\\", "\\")
    } else if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        raw[1..raw.len() - 1].replace("''", "'")
    } else {
        raw.to_string()
    };
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "---\ntitle: \"Test\"\ndate: 2025-03-01T08:30:00Z\ndraft: false\n---\n\nbody\n";

    #[test]
    fn well_formed_document_is_valid_without_warnings() {
        let report = validate_document(GOOD);
        assert!(report.is_valid());
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn missing_delimiter_is_an_error() {
        let report = validate_document("title: Test\n\nbody\n");
        assert!(!report.is_valid());
        assert_eq!(report.errors, vec!["missing front matter delimiter"]);
    }

    #[test]
    fn unclosed_block_is_an_error() {
        let report = validate_document("---\ntitle: Test\n\nbody\n");
        assert_eq!(report.errors, vec!["front matter block is not closed"]);
    }

    #[test]
    fn missing_keys_are_warnings() {
        let report = validate_document("---\ntitle: Test\n---\nbody\n");
        assert!(report.is_valid());
        assert_eq!(
            report.warnings,
            vec![
                "missing recommended field: date",
                "missing recommended field: draft"
            ]
        );
    }

    #[test]
    fn keys_in_body_do_not_count() {
        let report = validate_document("---\ntitle: T\n---\ndate: not front matter\n");
        assert!(report
            .warnings
            .contains(&"missing recommended field: date".to_string()));
    }

    #[test]
    fn title_extraction_unquotes() {
        assert_eq!(front_matter_title(GOOD).as_deref(), Some("Test"));
        assert_eq!(
            front_matter_title("---\ntitle: \"Say \\\"hi\\\"\"\n---\n").as_deref(),
            Some("Say \"hi\"")
        );
        assert_eq!(
            front_matter_title("---\ntitle: 'It''s here'\n---\n").as_deref(),
            Some("It's here")
        );
        assert_eq!(
            front_matter_title("---\ntitle: Plain words\n---\n").as_deref(),
            Some("Plain words")
        );
    }

    #[test]
    fn title_missing_or_empty_is_none() {
        assert_eq!(front_matter_title("no front matter"), None);
        assert_eq!(front_matter_title("---\ndate: x\n---\n"), None);
        assert_eq!(front_matter_title("---\ntitle: \"\"\n---\n"), None);
    }
}
