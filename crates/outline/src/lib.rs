//! # Regsum Outline
//!
//! Outline reconstruction for flat, numbered legal and regulatory documents.
//!
//! Regulatory text arrives as a linear stream of lines (plain text) or of marked-up
//! elements (transcribed HTML). Headings carry legal numbering (`IV.`, `C.`, `7.`,
//! `g.`, `xi.`) but no explicit nesting. The parser recovers the nesting by
//! predicting, from the current position, which labels may legally come next.
//!
//! ## Architecture
//!
//! ```text
//! Document
//!     │
//!     ├──> Cleanup (form feeds, running headers)
//!     │
//!     ├──> Outline Parser (fold over units)
//!     │    ├─> Enumerate successor paths of the current path
//!     │    ├─> Label each successor (Numbering Classifier)
//!     │    └─> First matching successor opens a node, otherwise body text
//!     │
//!     ├──> Tree Assembler
//!     │    └─> Path-keyed insertion with placeholder scaffolding
//!     │
//!     └──> Text Normalizer
//!          ├─> Footnote definitions
//!          ├─> Paragraphs and title emphasis
//!          └─> Footnote back-references
//! ```
//!
//! ## Example
//!
//! ```rust
//! use regsum_outline::{OutlineParser, ParserConfig};
//!
//! let parser = OutlineParser::new(ParserConfig::default()).unwrap();
//! let root = parser.parse_str("I. Intro\nbody\nA. Sub\nII. Next");
//!
//! assert_eq!(root.children.len(), 2);
//! assert_eq!(root.children[0].children[0].title, "A. Sub");
//! assert_eq!(root.children[1].path, vec![1]);
//! ```

mod assembler;
mod config;
mod error;
mod markup;
mod normalizer;
mod numbering;
mod parser;
mod render;
mod successors;
mod types;

pub use assembler::TreeAssembler;
pub use config::{NormalizerConfig, ParserConfig};
pub use error::{OutlineError, Result};
pub use markup::{outline_from_annotated_markup, MarkupOutline, MarkupParser};
pub use normalizer::Normalizer;
pub use numbering::{label_for, parse_roman, to_roman, MAX_LABELLED_DEPTH};
pub use parser::{OutlineParser, ParserState};
pub use render::render_markdown;
pub use successors::{candidate_label, resolve_successor, successors, LabelBoundary};
pub use types::{KeyPoint, OutlineNode, OutlinePath, RawNode, Summary, SummaryOutcome};
