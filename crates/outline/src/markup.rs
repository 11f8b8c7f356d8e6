//! Structured-markup variant of the outline parser.
//!
//! Transcribed pages arrive as HTML whose heading levels cannot be trusted: a model
//! transcribing page 40 has no idea that `"C."` sits three levels deep. The numbering
//! in the element text is used instead, exactly like the plain-text parser, and the
//! markup is rewritten so each recognised heading becomes `h{depth}` with a
//! `data-path` attribute. Headings that fit nowhere are demoted to `h6`.
//!
//! Both the scan and the rewrite run over the `lol_html` token stream, so the n-th
//! visited element of one pass is the n-th of the other even when the markup is
//! malformed. The tree is then read back from the rewritten markup.

use crate::assembler::TreeAssembler;
use crate::config::ParserConfig;
use crate::error::{OutlineError, Result};
use crate::render::path_json;
use crate::successors::{candidate_label, resolve_successor, LabelBoundary};
use crate::types::{OutlineNode, OutlinePath, RawNode};
use lol_html::{doc_text, element, HtmlRewriter, Settings};
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Elements whose text may open an outline node
const HEADING_CANDIDATES: [&str; 9] = ["h1", "h2", "h3", "h4", "h5", "b", "i", "u", "p"];

const PATH_ATTRIBUTE: &str = "data-path";

/// Result of parsing a markup document
#[derive(Debug, Clone)]
pub struct MarkupOutline {
    /// Rewritten markup with canonical headings
    pub html: String,

    /// Outline read back from [`Self::html`]
    pub tree: OutlineNode,
}

impl MarkupOutline {
    #[must_use]
    pub fn into_tree(self) -> OutlineNode {
        self.tree
    }
}

/// Outline parser for HTML transcriptions
pub struct MarkupParser {
    config: ParserConfig,
}

impl MarkupParser {
    pub fn new(config: ParserConfig) -> Result<Self> {
        config.validate().map_err(OutlineError::invalid_config)?;
        Ok(Self { config })
    }

    /// Parse and rewrite a markup document
    pub fn parse_str(&self, html: &str) -> Result<MarkupOutline> {
        let html = strip_code_fences(html);
        let decisions = self.analyse(&scan(&html)?);
        let rewritten = rewrite(&html, &decisions)?;
        log::debug!(
            "Markup outline: {} of {} candidate elements opened nodes",
            decisions.iter().filter(|d| d.is_some()).count(),
            decisions.len()
        );
        let tree = outline_from_annotated_markup(&rewritten)?;
        Ok(MarkupOutline {
            html: rewritten,
            tree,
        })
    }

    /// Decide, per visited element, which path (if any) it opens
    fn analyse(&self, visited: &[Visited]) -> Vec<Option<OutlinePath>> {
        let mut current: OutlinePath = Vec::new();
        visited
            .iter()
            .map(|element| {
                if !HEADING_CANDIDATES.contains(&element.name.as_str()) {
                    return None;
                }
                let label = candidate_label(&element.text, LabelBoundary::Period);
                let path = resolve_successor(&current, &label, self.config.lookahead)?;
                current.clone_from(&path);
                Some(path)
            })
            .collect()
    }
}

/// Rebuild an outline from markup previously rewritten by [`MarkupParser`].
///
/// Elements carrying `data-path` open nodes; paragraphs and tables become body text
/// of the node opened last.
pub fn outline_from_annotated_markup(html: &str) -> Result<OutlineNode> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("h1, h2, h3, h4, h5, h6, p, table")
        .map_err(|err| OutlineError::markup(format!("invalid selector: {err:?}")))?;

    let mut entries: Vec<(RawNode, OutlinePath)> = vec![(RawNode::default(), Vec::new())];
    for element in document.select(&selector) {
        if let Some(raw_path) = element.value().attr(PATH_ATTRIBUTE) {
            match serde_json::from_str::<OutlinePath>(raw_path) {
                Ok(path) => {
                    entries.push((RawNode::heading(element_text(&element)), path));
                    continue;
                }
                Err(err) => log::warn!("Ignoring malformed {PATH_ATTRIBUTE}={raw_path:?}: {err}"),
            }
        }
        if is_body_element(element.value().name()) && !inside_table(&element) {
            if let Some((node, _)) = entries.last_mut() {
                node.text.push_str(&element.html());
                node.text.push('\n');
            }
        }
    }

    Ok(TreeAssembler::assemble(entries))
}

/// A visited element in stream order, with the text seen before its end tag
#[derive(Debug, Default)]
struct Visited {
    name: String,
    text: String,
}

#[derive(Debug, Default)]
struct Scan {
    visited: Vec<Visited>,
    /// Indexes into `visited` still waiting for their end tag
    open: Vec<usize>,
}

fn lock(scan: &Mutex<Scan>) -> MutexGuard<'_, Scan> {
    scan.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Collect every visited element with its text. An element whose end tag never
/// arrives keeps collecting text until the end of the document.
fn scan(html: &str) -> Result<Vec<Visited>> {
    let state = Arc::new(Mutex::new(Scan::default()));
    let element_scan = Arc::clone(&state);
    let text_scan = Arc::clone(&state);

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("*", move |el| {
                let name = el.tag_name().to_ascii_lowercase();
                if !is_visited(&name) {
                    return Ok(());
                }
                let index = {
                    let mut scan = lock(&element_scan);
                    let index = scan.visited.len();
                    scan.visited.push(Visited {
                        name,
                        text: String::new(),
                    });
                    scan.open.push(index);
                    index
                };

                let end_scan = Arc::clone(&element_scan);
                match el.end_tag_handlers() {
                    Some(handlers) => handlers.push(Box::new(move |_end| {
                        lock(&end_scan).open.retain(|&i| i != index);
                        Ok(())
                    })),
                    None => lock(&element_scan).open.retain(|&i| i != index),
                }
                Ok(())
            })],
            document_content_handlers: vec![doc_text!(move |chunk| {
                let mut scan = lock(&text_scan);
                let Scan { visited, open } = &mut *scan;
                for &index in open.iter() {
                    visited[index].text.push_str(chunk.as_str());
                }
                Ok(())
            })],
            ..Settings::default()
        },
        |_: &[u8]| {},
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|err| OutlineError::markup(err.to_string()))?;
    rewriter
        .end()
        .map_err(|err| OutlineError::markup(err.to_string()))?;

    let visited = std::mem::take(&mut lock(&state).visited);
    Ok(visited
        .into_iter()
        .map(|element| Visited {
            text: element.text.trim().to_string(),
            ..element
        })
        .collect())
}

fn rewrite(html: &str, decisions: &[Option<OutlinePath>]) -> Result<String> {
    let mut output = Vec::with_capacity(html.len());
    let mut visited = 0usize;

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("*", |el| {
                let name = el.tag_name().to_ascii_lowercase();
                if is_visited(&name) {
                    let decision = decisions.get(visited).cloned().flatten();
                    visited += 1;
                    if let Some(path) = decision {
                        el.set_tag_name(&format!("h{}", path.len()))?;
                        el.set_attribute(PATH_ATTRIBUTE, &path_json(&path))?;
                        return Ok(());
                    }
                }
                if is_heading(&name) {
                    el.set_tag_name("h6")?;
                }
                Ok(())
            })],
            ..Settings::default()
        },
        |chunk: &[u8]| output.extend_from_slice(chunk),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|err| OutlineError::markup(err.to_string()))?;
    rewriter
        .end()
        .map_err(|err| OutlineError::markup(err.to_string()))?;

    if visited != decisions.len() {
        return Err(OutlineError::markup(format!(
            "rewrite visited {visited} candidate elements, scan saw {}",
            decisions.len()
        )));
    }

    String::from_utf8(output).map_err(|err| OutlineError::markup(err.to_string()))
}

fn strip_code_fences(html: &str) -> String {
    html.replace("```html", "").replace("```", "")
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn is_visited(name: &str) -> bool {
    HEADING_CANDIDATES.contains(&name) || name == "table"
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn is_body_element(name: &str) -> bool {
    matches!(name, "p" | "table")
}

fn inside_table(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .any(|node| node.value().as_element().is_some_and(|e| e.name() == "table"))
}
