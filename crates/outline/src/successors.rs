use crate::numbering::label_for;
use crate::types::OutlinePath;

/// Where a unit's candidate label ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelBoundary {
    /// Up to the first `". "`, falling back to the first period (plain text lines)
    PeriodSpace,
    /// Up to the first period (markup elements)
    Period,
}

/// Every path that may legally follow `path`, in the order they are tried.
///
/// Descending candidates come first (`path + [0]`, `path + [1]`, ...), then, for each
/// ancestor level from the deepest to the shallowest, the next `lookahead` siblings
/// at that level. Skipping ahead tolerates small gaps in the numbering.
#[must_use]
pub fn successors(path: &[usize], lookahead: usize) -> Vec<OutlinePath> {
    let mut out = Vec::with_capacity(lookahead * (path.len() + 1));

    for index in 0..lookahead {
        let mut candidate = path.to_vec();
        candidate.push(index);
        out.push(candidate);
    }

    for level in (0..path.len()).rev() {
        for step in 1..=lookahead {
            let mut candidate = path[..level].to_vec();
            candidate.push(path[level] + step);
            out.push(candidate);
        }
    }

    out
}

/// Label a unit claims for itself, e.g. `"IV. Scope of rule"` → `"IV."`
#[must_use]
pub fn candidate_label(unit: &str, boundary: LabelBoundary) -> String {
    let unit = unit.trim();
    let head = match boundary {
        LabelBoundary::PeriodSpace => unit
            .split_once(". ")
            .or_else(|| unit.split_once('.'))
            .map_or(unit, |(head, _)| head),
        LabelBoundary::Period => unit.split_once('.').map_or(unit, |(head, _)| head),
    };
    format!("{head}.")
}

/// First successor of `path` whose expected label equals `label` exactly
#[must_use]
pub fn resolve_successor(path: &[usize], label: &str, lookahead: usize) -> Option<OutlinePath> {
    let bare = label.strip_suffix('.')?;
    successors(path, lookahead).into_iter().find(|candidate| {
        let Some((&index, _)) = candidate.split_last() else {
            return false;
        };
        label_for(candidate.len() - 1, index).is_some_and(|expected| expected == bare)
    })
}
