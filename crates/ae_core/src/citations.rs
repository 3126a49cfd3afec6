use crate::types::ReferenceDocument;

pub const REFERENCES_HEADING: &str = "## References";

/// Renders the block appended after an enhanced body: a blank line, the
/// References heading, then one `- [title](url)` line per reference.
pub fn build_citation_block(references: &[ReferenceDocument]) -> String {
    let lines = references
        .iter()
        .map(|r| format!("- [{}]({})", r.title.trim(), r.url.trim()))
        .collect::<Vec<_>>()
        .join("\n");

    format!("\n\n{}\n\n{}", REFERENCES_HEADING, lines)
}

/// Returns true when `content` already carries a References heading line.
pub fn is_enhanced(content: &str) -> bool {
    content.lines().any(|line| {
        let line = line.trim();
        line.starts_with('#') && line.trim_start_matches('#').trim().eq_ignore_ascii_case("references")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs() -> Vec<ReferenceDocument> {
        vec![
            ReferenceDocument {
                title: "How Chatbots Work".to_string(),
                url: "https://site.example/blog/how-chatbots-work".to_string(),
                content: "body".to_string(),
            },
            ReferenceDocument {
                title: "  Live Chat vs Bots ".to_string(),
                url: "https://other.example/2024/01/live-chat".to_string(),
                content: "body".to_string(),
            },
        ]
    }

    #[test]
    fn test_citation_block_format() {
        let block = build_citation_block(&refs());
        assert_eq!(
            block,
            "\n\n## References\n\n\
             - [How Chatbots Work](https://site.example/blog/how-chatbots-work)\n\
             - [Live Chat vs Bots](https://other.example/2024/01/live-chat)"
        );
        assert_eq!(block.lines().filter(|l| l.starts_with("- [")).count(), 2);
    }

    #[test]
    fn test_citation_block_is_deterministic() {
        let references = refs();
        assert_eq!(build_citation_block(&references), build_citation_block(&references));
    }

    #[test]
    fn test_is_enhanced() {
        assert!(is_enhanced("Body\n\n## References\n\n- [a](b)"));
        assert!(is_enhanced("# References\n- [a](b)"));
        assert!(!is_enhanced("We cite many references in this text."));
        assert!(!is_enhanced(""));
    }
}
