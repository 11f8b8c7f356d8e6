use pretty_assertions::assert_eq;
use regsum_outline::{
    render_markdown, Normalizer, NormalizerConfig, OutlineNode, OutlineParser, ParserConfig,
};

fn parse(content: &str) -> OutlineNode {
    OutlineParser::new(ParserConfig::default())
        .expect("default config is valid")
        .parse_str(content)
}

fn assert_paths_consistent(root: &OutlineNode) {
    for node in root.iter() {
        for (index, child) in node.children.iter().enumerate() {
            assert_eq!(child.depth(), node.depth() + 1, "depth of {:?}", child.title);
            assert!(
                child.path.starts_with(&node.path),
                "{:?} does not extend {:?}",
                child.path,
                node.path
            );
            assert_eq!(child.path.last(), Some(&index));
        }
    }
}

#[test]
fn nests_headings_by_numbering() {
    let root = parse("I. Intro\nbody\nA. Sub\nmore body\nII. Next");

    assert_eq!(root.children.len(), 2);
    let intro = &root.children[0];
    assert_eq!(intro.title, "I. Intro");
    assert_eq!(intro.path, vec![0]);
    assert_eq!(intro.depth(), 1);
    assert_eq!(intro.text, "body\n");

    let sub = &intro.children[0];
    assert_eq!(sub.title, "A. Sub");
    assert_eq!(sub.path, vec![0, 0]);
    assert_eq!(sub.text, "more body\n");

    let next = &root.children[1];
    assert_eq!(next.title, "II. Next");
    assert_eq!(next.path, vec![1]);
    assert!(next.children.is_empty());
}

#[test]
fn five_levels_and_back_out() {
    let doc = "\
Preamble line
I. Background
A. Statutory Basis
1. Cures Act
a. Section 4002
i. Conditions of certification
ii. Maintenance
b. Section 4003
2. HITECH
B. Regulatory History
III. Provisions
";
    let root = parse(doc);
    assert_paths_consistent(&root);

    assert_eq!(root.text, "Preamble line\n");
    let titles: Vec<(&str, Vec<usize>)> = root
        .iter()
        .skip(1)
        .filter(|n| !n.is_placeholder())
        .map(|n| (n.title.as_str(), n.path.clone()))
        .collect();
    assert_eq!(
        titles,
        vec![
            ("I. Background", vec![0]),
            ("A. Statutory Basis", vec![0, 0]),
            ("1. Cures Act", vec![0, 0, 0]),
            ("a. Section 4002", vec![0, 0, 0, 0]),
            ("i. Conditions of certification", vec![0, 0, 0, 0, 0]),
            ("ii. Maintenance", vec![0, 0, 0, 0, 1]),
            ("b. Section 4003", vec![0, 0, 0, 1]),
            ("2. HITECH", vec![0, 0, 1]),
            ("B. Regulatory History", vec![0, 1]),
            ("III. Provisions", vec![2]),
        ]
    );

    // "II." never appeared, so its slot is scaffolding.
    assert!(root.children[1].is_placeholder());
    assert_eq!(root.children[1].path, vec![1]);
}

#[test]
fn body_lines_never_reach_root_after_first_heading() {
    let root = parse("I. Only\nfirst\nsecond. With period\nZZ. not a label");
    assert_eq!(root.text, "");
    assert_eq!(
        root.children[0].text,
        "first\nsecond. With period\nZZ. not a label\n"
    );
}

#[test]
fn normalize_then_render() {
    let doc = "\
I. Background
The rule covers certified health IT7.
It applies broadly.
7
See statute.
";
    let mut root = parse(doc);
    let last = Normalizer::new(NormalizerConfig::default()).normalize_tree(&mut root, 6);
    assert_eq!(last, 7);

    let text = &root.children[0].text;
    assert!(text.contains("IT<sup>7</sup>."), "got: {text}");
    assert!(text.contains("Footnote 7:"), "got: {text}");

    let md = render_markdown(&root);
    assert!(md.starts_with("<H1 data-path='[0]'>I. Background</H1>"));
    assert!(md.contains("Footnote 7:"));
}
