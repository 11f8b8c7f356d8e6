use crate::assembler::TreeAssembler;
use crate::config::ParserConfig;
use crate::error::{OutlineError, Result};
use crate::successors::{candidate_label, resolve_successor, LabelBoundary};
use crate::types::{OutlineNode, OutlinePath, RawNode};
use regex::{Regex, RegexBuilder};
use std::path::Path;

/// Carried state of an outline scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserState {
    /// Path of the most recently opened node
    pub path: OutlinePath,

    /// Opened nodes with their paths, in document order. Starts with the root.
    pub processed: Vec<(RawNode, OutlinePath)>,
}

impl Default for ParserState {
    fn default() -> Self {
        Self::new()
    }
}

impl ParserState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: Vec::new(),
            processed: vec![(RawNode::default(), Vec::new())],
        }
    }

    /// Append body text to the most recently opened node
    pub fn push_body(&mut self, text: &str) {
        if let Some((node, _)) = self.processed.last_mut() {
            node.text.push_str(text);
        }
    }

    /// Open a node at `path` and make it current
    pub fn open(&mut self, title: impl Into<String>, path: OutlinePath) {
        self.path.clone_from(&path);
        self.processed.push((RawNode::heading(title), path));
    }

    /// Hand the collected nodes to the tree assembler
    #[must_use]
    pub fn into_tree(self) -> OutlineNode {
        TreeAssembler::assemble(self.processed)
    }
}

/// Outline parser for plain text, one unit per line
pub struct OutlineParser {
    config: ParserConfig,
    strip: Vec<Regex>,
}

impl OutlineParser {
    /// Create a parser, compiling the configured cleanup patterns
    pub fn new(config: ParserConfig) -> Result<Self> {
        config.validate().map_err(OutlineError::invalid_config)?;
        let strip = config
            .strip_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .dot_matches_new_line(true)
                    .multi_line(true)
                    .build()
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { config, strip })
    }

    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a document into an outline tree
    #[must_use]
    pub fn parse_str(&self, content: &str) -> OutlineNode {
        let cleaned = self.clean(content);
        let state = self.scan(cleaned.lines());
        log::debug!(
            "Outline scan opened {} headings",
            state.processed.len().saturating_sub(1)
        );
        state.into_tree()
    }

    /// Parse a document from disk
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<OutlineNode> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.parse_str(&content))
    }

    /// Remove form feeds and configured boilerplate
    #[must_use]
    pub fn clean(&self, content: &str) -> String {
        let mut cleaned = if self.config.strip_form_feeds {
            content.replace('\u{c}', "")
        } else {
            content.to_string()
        };
        for regex in &self.strip {
            cleaned = regex.replace_all(&cleaned, "").into_owned();
        }
        cleaned
    }

    /// Fold the units into a [`ParserState`]
    pub fn scan<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> ParserState {
        lines
            .into_iter()
            .fold(ParserState::new(), |state, line| self.step(state, line))
    }

    fn step(&self, mut state: ParserState, line: &str) -> ParserState {
        if !line.contains('.') {
            state.push_body(line);
            state.push_body("\n");
            return state;
        }

        let label = candidate_label(line, LabelBoundary::PeriodSpace);
        match resolve_successor(&state.path, &label, self.config.lookahead) {
            Some(path) => {
                log::debug!("Heading {label} at {path:?}");
                state.open(line, path);
            }
            None => {
                state.push_body(line);
                state.push_body("\n");
            }
        }
        state
    }
}
