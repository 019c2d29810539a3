//! Property-based tests for the envelope parser
//!
//! These use proptest to verify:
//! 1. Arbitrary input never panics: any byte soup either parses or errors
//! 2. Generated element trees round through `parse` with the structural
//!    invariants intact (no singleton lists, counts preserved, order kept)

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use einvoice::{from_str, parse, Element, FieldMap, Value};

fn read_root(xml: &str) -> Result<Element, TestCaseError> {
    from_str(xml)
        .map(|doc| doc.root)
        .map_err(|err| TestCaseError::fail(err.to_string()))
}

fn parse_root(root: &Element) -> Result<FieldMap, TestCaseError> {
    parse(root).map_err(|err| TestCaseError::fail(err.to_string()))
}

/// A generated XML element: tag plus either text or child elements
#[derive(Clone, Debug)]
enum Tree {
    Leaf { tag: String, text: String },
    Branch { tag: String, children: Vec<Tree> },
}

impl Tree {
    fn tag(&self) -> &str {
        match self {
            Self::Leaf { tag, .. } | Self::Branch { tag, .. } => tag,
        }
    }

    fn render(&self, out: &mut String) {
        match self {
            Self::Leaf { tag, text } => {
                out.push('<');
                out.push_str(tag);
                out.push('>');
                out.push_str(text);
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            Self::Branch { tag, children } => {
                out.push('<');
                out.push_str(tag);
                out.push('>');
                for child in children {
                    child.render(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    /// Total number of elements in the tree, excluding the root itself
    fn descendant_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 0,
            Self::Branch { children, .. } => children
                .iter()
                .map(|c| 1 + c.descendant_count())
                .sum(),
        }
    }
}

fn arb_tag() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z]{0,7}"
}

fn arb_text() -> impl Strategy<Value = String> {
    "[ a-zA-Z0-9.,-]{0,12}"
}

fn arb_tree() -> impl Strategy<Value = Tree> {
    let leaf = (arb_tag(), arb_text()).prop_map(|(tag, text)| Tree::Leaf { tag, text });
    leaf.prop_recursive(3, 24, 5, |inner| {
        (arb_tag(), prop::collection::vec(inner, 1..5))
            .prop_map(|(tag, children)| Tree::Branch { tag, children })
    })
}

/// Count mapping entries as elements: a list stands for its items
fn represented_elements(value: &Value) -> usize {
    match value {
        Value::Scalar(_) => 0,
        Value::List(items) => items.iter().map(|v| 1 + represented_elements(v)).sum(),
        Value::Object(map) => map
            .values()
            .map(|v| match v {
                Value::List(items) => items.iter().map(|i| 1 + represented_elements(i)).sum(),
                other => 1 + represented_elements(other),
            })
            .sum(),
    }
}

fn assert_no_singleton_lists(value: &Value) {
    match value {
        Value::List(items) => {
            assert!(items.len() >= 2, "singleton list in parser output");
            items.iter().for_each(assert_no_singleton_lists);
        }
        Value::Object(map) => map.values().for_each(assert_no_singleton_lists),
        Value::Scalar(_) => {}
    }
}

proptest! {
    #[test]
    fn prop_reader_never_panics(input in "\\PC{0,200}") {
        let _ = from_str(&input);
    }

    #[test]
    fn prop_reader_accepts_rendered_trees(tree in arb_tree()) {
        let mut xml = String::new();
        tree.render(&mut xml);
        prop_assert!(from_str(&xml).is_ok());
    }

    #[test]
    fn prop_parse_preserves_element_count(tree in arb_tree()) {
        let mut xml = String::new();
        tree.render(&mut xml);
        let root = read_root(&xml)?;
        // Mixed content cannot be generated, so parse always succeeds.
        let map = parse_root(&root)?;

        let body = map.get(root.local_name()).cloned();
        prop_assert!(body.is_some());
        if let Some(body) = body {
            prop_assert_eq!(represented_elements(&body), tree.descendant_count());
        }
    }

    #[test]
    fn prop_no_singleton_lists(tree in arb_tree()) {
        let mut xml = String::new();
        tree.render(&mut xml);
        let map = parse_root(&read_root(&xml)?)?;
        for value in map.values() {
            assert_no_singleton_lists(value);
        }
    }

    #[test]
    fn prop_parse_is_deterministic(tree in arb_tree()) {
        let mut xml = String::new();
        tree.render(&mut xml);
        let root = read_root(&xml)?;
        prop_assert_eq!(parse_root(&root)?, parse_root(&root)?);
    }

    #[test]
    fn prop_repeated_siblings_keep_order(count in 2usize..6) {
        let mut xml = String::from("<Invoice>");
        for i in 0..count {
            xml.push_str(&format!("<Note>note {i}</Note>"));
        }
        xml.push_str("</Invoice>");

        let map = parse_root(&read_root(&xml)?)?;
        let notes: Vec<String> = map
            .get_path(&["Invoice", "Note"])
            .and_then(Value::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(|v| v.as_scalar().map(str::to_string))
            .collect();

        let expected: Vec<String> = (0..count).map(|i| format!("note {i}")).collect();
        prop_assert_eq!(notes, expected);
    }
}
