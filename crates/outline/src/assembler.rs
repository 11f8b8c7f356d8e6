use crate::types::{OutlineNode, RawNode};

/// Builds an outline tree from path-addressed nodes.
///
/// Missing positions along a path are filled with placeholders (empty title) so a
/// node can be stored at any path. Inserting at a placeholder's path fills it in and
/// keeps whatever was already scaffolded beneath it.
pub struct TreeAssembler {
    root: OutlineNode,
}

impl Default for TreeAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: OutlineNode::root(),
        }
    }

    /// Assemble a whole parse result
    pub fn assemble<I>(entries: I) -> OutlineNode
    where
        I: IntoIterator<Item = (RawNode, Vec<usize>)>,
    {
        let mut assembler = Self::new();
        for (node, path) in entries {
            assembler.insert(node, &path);
        }
        assembler.finish()
    }

    /// Store `node` at `path`, scaffolding any missing ancestors or earlier siblings
    pub fn insert(&mut self, node: RawNode, path: &[usize]) {
        let Some((&last, parents)) = path.split_last() else {
            self.root.title = node.title;
            self.root.text = node.text;
            return;
        };

        let mut current = &mut self.root;
        for (depth, &segment) in parents.iter().enumerate() {
            ensure_slot(current, segment, &path[..depth]);
            current = &mut current.children[segment];
        }
        ensure_slot(current, last, parents);

        let slot = &mut current.children[last];
        if !slot.is_placeholder() {
            log::debug!("Replacing outline node at {path:?} ({:?})", slot.title);
        }
        slot.title = node.title;
        slot.text = node.text;
    }

    #[must_use]
    pub fn finish(self) -> OutlineNode {
        self.root
    }
}

fn ensure_slot(parent: &mut OutlineNode, index: usize, parent_path: &[usize]) {
    while parent.children.len() <= index {
        let mut path = parent_path.to_vec();
        path.push(parent.children.len());
        parent.children.push(OutlineNode::placeholder(path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(title: &str, text: &str) -> RawNode {
        RawNode {
            title: title.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn appends_in_document_order() {
        let root = TreeAssembler::assemble(vec![
            (raw("", "preamble\n"), vec![]),
            (raw("I. A", ""), vec![0]),
            (raw("A. B", ""), vec![0, 0]),
            (raw("II. C", ""), vec![1]),
        ]);
        assert_eq!(root.text, "preamble\n");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].children[0].path, vec![0, 0]);
        assert_eq!(root.children[1].title, "II. C");
    }

    #[test]
    fn scaffolds_missing_levels_and_siblings() {
        let root = TreeAssembler::assemble(vec![(raw("2. deep", "x"), vec![1, 0, 1])]);

        assert_eq!(root.count(), 6);
        assert!(root.children[0].is_placeholder());
        assert_eq!(root.children[0].path, vec![0]);
        let middle = &root.children[1];
        assert!(middle.is_placeholder());
        assert_eq!(middle.children[0].path, vec![1, 0]);
        let leaf_parent = &middle.children[0];
        assert!(leaf_parent.children[0].is_placeholder());
        assert_eq!(leaf_parent.children[1].title, "2. deep");
        assert_eq!(leaf_parent.children[1].path, vec![1, 0, 1]);
    }

    #[test]
    fn filling_placeholder_keeps_children() {
        let mut assembler = TreeAssembler::new();
        assembler.insert(raw("A. child", ""), &[0, 0]);
        assembler.insert(raw("I. parent", "body"), &[0]);
        let root = assembler.finish();

        assert_eq!(root.children[0].title, "I. parent");
        assert_eq!(root.children[0].text, "body");
        assert_eq!(root.children[0].children[0].title, "A. child");
    }

    #[test]
    fn child_paths_extend_parent_paths() {
        let root = TreeAssembler::assemble(vec![
            (raw("I.", ""), vec![0]),
            (raw("C.", ""), vec![0, 2]),
            (raw("1.", ""), vec![0, 2, 0]),
            (raw("III.", ""), vec![2]),
        ]);
        for node in root.iter() {
            for (index, child) in node.children.iter().enumerate() {
                assert_eq!(child.depth(), node.depth() + 1);
                assert_eq!(&child.path[..node.depth()], node.path.as_slice());
                assert_eq!(child.path.last(), Some(&index));
            }
        }
    }
}
