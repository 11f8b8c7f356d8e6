use crate::config::NormalizerConfig;
use crate::types::OutlineNode;
use regex::Regex;
use std::sync::OnceLock;

const FOOTNOTE_PREFIX: &str = "Footnote ";

fn footnote_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"^Footnote (\d+):").expect("static regex"))
}

/// Turns raw extracted body text into readable markdown.
///
/// The pipeline runs in a fixed order: footnote definitions, then paragraphs and
/// title emphasis, then footnote back-references. Footnote numbering only moves
/// forward, so the last seen number is passed in and handed back by every call.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    #[must_use]
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalize one body of text. Returns the text and the last footnote number seen.
    #[must_use]
    pub fn normalize(&self, text: &str, last_footnote: u32) -> (String, u32) {
        let (text, last_footnote) = self.mark_footnotes(text, last_footnote);
        let text = self.format_paragraphs(&text);
        let text = self.link_footnotes(&text);
        (text, last_footnote)
    }

    /// Normalize every node of a tree in document order (node, then its children).
    pub fn normalize_tree(&self, node: &mut OutlineNode, last_footnote: u32) -> u32 {
        let mut last = last_footnote;
        if !node.text.is_empty() {
            let (text, next) = self.normalize(&node.text, last);
            node.text = text;
            last = next;
        }
        for child in &mut node.children {
            last = self.normalize_tree(child, last);
        }
        last
    }

    fn mark_footnotes(&self, text: &str, mut last: u32) -> (String, u32) {
        let mut out = Vec::new();
        for line in text.split('\n') {
            let number = Some(line)
                .filter(|l| !l.is_empty() && l.bytes().all(|b| b.is_ascii_digit()))
                .and_then(|l| l.parse::<u32>().ok());
            match number {
                Some(n) if n > last && n <= last.saturating_add(self.config.max_footnote_jump) => {
                    last = n;
                    out.push(String::new());
                    out.push(format!("{FOOTNOTE_PREFIX}{n}:"));
                }
                _ => out.push(line.to_string()),
            }
        }
        (out.join("\n"), last)
    }

    fn format_paragraphs(&self, text: &str) -> String {
        let lines: Vec<&str> = text.split('\n').map(str::trim).collect();
        let mut out = String::with_capacity(text.len() + lines.len());
        let mut paragraph_start = true;

        for (i, &line) in lines.iter().enumerate() {
            let next = lines.get(i + 1).copied().unwrap_or("");

            if paragraph_start {
                if let Some(rest) = line.strip_prefix("Comments.") {
                    out.push_str(&format!("*Comments.*{rest}\n"));
                } else if let Some(rest) = line.strip_prefix("Response.") {
                    out.push_str(&format!("*Response.*{rest}\n"));
                } else if self.is_title(line) {
                    out.push_str(&format!("**{line}**\n\n"));
                } else {
                    out.push_str(line);
                    out.push('\n');
                }
            } else {
                out.push_str(line);
                out.push('\n');
            }

            paragraph_start = line.is_empty() || (ends_sentence(line) && starts_sentence(next));
            if paragraph_start {
                out.push('\n');
            }
        }

        out
    }

    fn is_title(&self, line: &str) -> bool {
        !line.is_empty()
            && line.chars().count() < self.config.max_title_len
            && line
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_whitespace())
    }

    fn link_footnotes(&self, text: &str) -> String {
        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let markers: Vec<(usize, String)> = lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| {
                footnote_marker()
                    .captures(line)
                    .map(|caps| (i, caps[1].to_string()))
            })
            .collect();

        for (marker_line, number) in markers {
            let reference = match Regex::new(&format!(r"(\S+){number}([\s.]|$)")) {
                Ok(regex) => regex,
                Err(err) => {
                    log::warn!("Skipping footnote {number}: {err}");
                    continue;
                }
            };
            let start = marker_line.saturating_sub(self.config.footnote_lookback_lines);
            let hit = (start..marker_line)
                .rev()
                .find(|&i| reference.is_match(&lines[i]));
            match hit {
                Some(i) => lines[i] = superscript_last(&reference, &lines[i], &number),
                None => log::debug!("Footnote {number} has no reference in range"),
            }
        }

        lines.join("\n")
    }
}

/// Wrap the reference nearest the end of `line`; earlier matches are left alone.
fn superscript_last(reference: &Regex, line: &str, number: &str) -> String {
    let Some(caps) = reference.captures_iter(line).last() else {
        return line.to_string();
    };
    let Some(whole) = caps.get(0) else {
        return line.to_string();
    };
    format!(
        "{}{}<sup>{number}</sup>{}{}",
        &line[..whole.start()],
        &caps[1],
        &caps[2],
        &line[whole.end()..]
    )
}

fn ends_sentence(line: &str) -> bool {
    line.ends_with(|c: char| matches!(c, '.' | '"' | '\u{201d}'))
}

/// Upper-case or caseless first character. Digits and quotes open a sentence too,
/// so a line like `2023 rule` after a full stop starts a paragraph.
fn starts_sentence(line: &str) -> bool {
    line.chars().next().is_some_and(|c| !c.is_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn normalizer() -> Normalizer {
        Normalizer::new(NormalizerConfig::default())
    }

    #[test]
    fn footnote_numbers_within_window_become_markers() {
        let (text, last) = normalizer().mark_footnotes("body\n3\nmore\n112\n4", 2);
        assert_eq!(last, 4);
        assert_eq!(text, "body\n\nFootnote 3:\nmore\n112\n\nFootnote 4:");
    }

    #[test]
    fn stale_or_far_numbers_are_untouched() {
        let (text, last) = normalizer().mark_footnotes("5\n30", 5);
        assert_eq!(last, 5);
        assert_eq!(text, "5\n30");
    }

    #[test]
    fn titles_and_labels_at_paragraph_start() {
        let text = normalizer()
            .format_paragraphs("PURPOSE\n\nComments. Several commenters asked.\nResponse. We agree.");
        assert_eq!(
            text,
            "**PURPOSE**\n\n\n\n\
             *Comments.* Several commenters asked.\n\n\
             *Response.* We agree.\n"
        );
    }

    #[test]
    fn continuation_lines_stay_in_paragraph() {
        let text = normalizer().format_paragraphs("The rule applies\nto developers.\nIt starts now.");
        assert_eq!(text, "The rule applies\nto developers.\n\nIt starts now.\n");
    }

    #[test]
    fn upper_case_line_mid_paragraph_is_not_a_title() {
        let text = normalizer().format_paragraphs("applies to\nONC HIT");
        assert_eq!(text, "applies to\nONC HIT\n");
    }

    #[test]
    fn footnote_reference_is_superscripted() {
        let input = "Use of the drug7. was reviewed\nline two\nline three\nline four\nline five\n7";
        let (text, last) = normalizer().normalize(input, 0);
        assert_eq!(last, 7);
        assert!(text.contains("drug<sup>7</sup>."), "got: {text}");
        assert!(text.contains("Footnote 7:"));
    }

    #[test]
    fn nearest_reference_wins_and_others_untouched() {
        let input = "first cite2 here\nsection 12 of 2023\nsecond cite2 here\n2";
        let (text, _) = normalizer().normalize(input, 1);
        assert!(text.contains("first cite2 here"), "got: {text}");
        assert!(text.contains("second cite<sup>2</sup> here"), "got: {text}");
        assert!(text.contains("section 12 of 2023"), "got: {text}");
    }

    #[test]
    fn reference_outside_lookback_is_not_linked() {
        let config = NormalizerConfig {
            footnote_lookback_lines: 2,
            ..NormalizerConfig::default()
        };
        let input = "far cite3.\na\nb\nc\nd\n3";
        let (text, _) = Normalizer::new(config).normalize(input, 0);
        assert!(text.contains("far cite3."), "got: {text}");
        assert!(!text.contains("<sup>"));
    }

    #[test]
    fn counter_threads_through_tree() {
        let mut root = OutlineNode::root();
        root.children
            .push(OutlineNode::new("I. A", "see note1 here\n1", vec![0]));
        root.children
            .push(OutlineNode::new("II. B", "1\nsee note2 here\n2", vec![1]));

        let last = normalizer().normalize_tree(&mut root, 0);

        assert_eq!(last, 2);
        assert!(root.children[0].text.contains("Footnote 1:"));
        // "1" again in the next node is below the running counter, so it stays a number.
        assert!(!root.children[1].text.contains("Footnote 1:"));
        assert!(root.children[1].text.contains("Footnote 2:"));
        assert!(root.children[1].text.contains("note<sup>2</sup>"));
    }

    #[test]
    fn only_the_reference_nearest_the_marker_line_end_is_linked() {
        let (text, _) = normalizer().normalize("see item7 and table7 here\nx\n7", 0);
        assert_eq!(text.matches("<sup>7</sup>").count(), 1, "got: {text}");
        assert!(text.contains("see item7 and table<sup>7</sup> here"), "got: {text}");
    }

    #[test]
    fn caseless_line_after_full_stop_starts_paragraph() {
        let text = normalizer()
            .format_paragraphs("The rule ends.\n2023 brings more.\nIt ends.\nand continues.");
        assert_eq!(
            text,
            "The rule ends.\n\n2023 brings more.\n\nIt ends.\nand continues.\n"
        );
    }
}
