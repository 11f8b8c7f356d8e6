use serde::{Deserialize, Serialize};

/// Position of a node at each depth of the outline. The root has an empty path.
pub type OutlinePath = Vec<usize>;

/// A node of the reconstructed outline
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutlineNode {
    /// Heading line or element text (empty for the root and for placeholders)
    pub title: String,

    /// Body text collected under the heading
    #[serde(default)]
    pub text: String,

    /// Position in the outline; its length is the node's depth
    #[serde(default)]
    pub path: OutlinePath,

    /// Children in document order
    #[serde(default)]
    pub children: Vec<OutlineNode>,

    /// Summary attached by the summarization walk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryOutcome>,
}

impl OutlineNode {
    /// Create a node at `path`
    pub fn new(title: impl Into<String>, text: impl Into<String>, path: OutlinePath) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            path,
            children: Vec::new(),
            summary: None,
        }
    }

    /// Empty root node
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Structural scaffolding for a position no heading has claimed (yet)
    #[must_use]
    pub fn placeholder(path: OutlinePath) -> Self {
        Self::new(String::new(), String::new(), path)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        !self.is_root() && self.title.is_empty() && self.text.is_empty()
    }

    /// Number of nodes in this subtree, including this one
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }

    /// Look up a descendant by path relative to this node
    #[must_use]
    pub fn get(&self, relative: &[usize]) -> Option<&Self> {
        relative
            .iter()
            .try_fold(self, |node, &index| node.children.get(index))
    }

    pub fn get_mut(&mut self, relative: &[usize]) -> Option<&mut Self> {
        relative
            .iter()
            .try_fold(self, |node, &index| node.children.get_mut(index))
    }

    /// This node's text followed by the full text of every child, newline separated
    #[must_use]
    pub fn total_text(&self) -> String {
        let mut text = self.text.clone();
        for child in &self.children {
            text.push('\n');
            text.push_str(&child.total_text());
        }
        text
    }

    /// Pre-order iterator over this subtree
    pub fn iter(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// Heading and body collected by a parser before tree assembly
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawNode {
    pub title: String,
    pub text: String,
}

impl RawNode {
    pub fn heading(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: String::new(),
        }
    }
}

/// Structured result returned by the summarization service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Markdown summary
    pub summary: String,

    /// Markdown list of changes relative to the proposed rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes_from_proposal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_points_by_audience: Option<Vec<KeyPoint>>,
}

impl Summary {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            changes_from_proposal: None,
            key_points_by_audience: None,
        }
    }

    /// Flatten every field into plain text, one entry per line
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        let mut text = self.summary.clone();
        if let Some(changes) = &self.changes_from_proposal {
            text.push('\n');
            text.push_str(changes);
        }
        for point in self.key_points_by_audience.iter().flatten() {
            text.push('\n');
            text.push_str(&point.audience);
            text.push_str(": ");
            text.push_str(&point.point);
        }
        text
    }
}

/// A key point aimed at one audience (e.g. `regulator`, `patient`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyPoint {
    pub audience: String,
    pub point: String,
}

/// Terminal state of a node's summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SummaryOutcome {
    Completed(Summary),
    /// The service failed or answered with something that is not a [`Summary`]
    Failed { failed: String },
}

impl SummaryOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            failed: reason.into(),
        }
    }

    #[must_use]
    pub fn summary(&self) -> Option<&Summary> {
        match self {
            Self::Completed(summary) => Some(summary),
            Self::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}
