use crate::types::OutlineNode;

/// Deepest heading level emitted; deeper nodes reuse it.
const MAX_HEADING_LEVEL: usize = 5;

/// Render a tree as markdown with HTML headings that carry each node's path.
///
/// The node passed in is treated as the document root: its own title is not
/// emitted, its children become `<H1>` headings.
#[must_use]
pub fn render_markdown(root: &OutlineNode) -> String {
    let mut out = String::new();
    write_node(root, 0, &mut out);
    out
}

fn write_node(node: &OutlineNode, depth: usize, out: &mut String) {
    if depth > 0 {
        let level = depth.min(MAX_HEADING_LEVEL);
        out.push_str(&format!(
            "<H{level} data-path='{}'>{}</H{level}>\n\n",
            path_json(&node.path),
            node.title
        ));
        if !node.text.is_empty() {
            out.push_str(&node.text);
            out.push_str("\n\n");
        }
    }

    for child in &node.children {
        write_node(child, depth + 1, out);
    }
}

pub(crate) fn path_json(path: &[usize]) -> String {
    let parts: Vec<String> = path.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(","))
}
