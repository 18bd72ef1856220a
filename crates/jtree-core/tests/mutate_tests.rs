use jtree_core::{Document, NodeId, TreeError};

fn parse(json: &str) -> Document {
    Document::parse_str(json).expect("parse failed")
}

fn root(doc: &Document) -> NodeId {
    doc.root_id().expect("document has a root")
}

fn at(doc: &Document, path: &str) -> NodeId {
    doc.root()
        .path(path)
        .id()
        .unwrap_or_else(|| panic!("no node at {path}"))
}

fn render(doc: &Document) -> String {
    doc.root().to_string()
}

/// Every child of every container reports the position it is stored at.
fn assert_positions(doc: &Document) {
    for (node, _) in doc.root().walk().unwrap() {
        for (i, child) in node.children().iter().enumerate() {
            assert_eq!(child.parent(), node, "parent link of {}", child.self_path());
            if node.is_array() {
                assert_eq!(child.self_index(), i);
            } else {
                assert_eq!(child.self_key(), node.children_keys()[i]);
                assert_eq!(node.key(child.self_key()), *child);
            }
        }
    }
}

// ============================================================================
// Append
// ============================================================================

#[test]
fn append_string_to_array() {
    let mut doc = parse(r#"["a","b"]"#);
    let c = doc.new_string("c");
    doc.append(root(&doc), c).unwrap();
    assert_eq!(render(&doc), r#"["a","b","c"]"#);
    assert_eq!(doc.node(c).self_index(), 2);
    assert_eq!(doc.node(c).parent(), doc.root());
}

#[test]
fn append_to_object_is_invalid_operation() {
    let mut doc = parse("{}");
    let n = doc.new_null();
    assert!(matches!(
        doc.append(root(&doc), n),
        Err(TreeError::InvalidOperation(_))
    ));
}

#[test]
fn append_attached_node_is_rejected() {
    let mut doc = parse(r#"{"a":[],"b":1}"#);
    let b = at(&doc, "$.b");
    assert!(matches!(
        doc.append(at(&doc, "$.a"), b),
        Err(TreeError::AlreadyAttached)
    ));
    assert_eq!(render(&doc), r#"{"a":[],"b":1}"#);
}

#[test]
fn append_into_own_subtree_is_rejected() {
    let mut doc = Document::new();
    let outer = doc.new_array();
    let inner = doc.new_array();
    doc.append(outer, inner).unwrap();
    assert!(matches!(
        doc.append(inner, outer),
        Err(TreeError::InvalidOperation(_))
    ));
    assert!(matches!(
        doc.append(outer, outer),
        Err(TreeError::InvalidOperation(_))
    ));
}

#[test]
fn document_root_cannot_be_attached() {
    let mut doc = parse(r#"{"a":1}"#);
    let holder = doc.new_array();
    assert!(matches!(
        doc.append(holder, root(&doc)),
        Err(TreeError::AlreadyAttached)
    ));
    let object = doc.new_object();
    assert!(matches!(
        doc.set(object, "k", root(&doc)),
        Err(TreeError::AlreadyAttached)
    ));
    assert!(!doc.root().parent().exists());
    assert!(doc.node(holder).is_empty());
    assert!(doc.node(object).is_empty());
}

#[test]
fn former_root_can_be_attached_after_set_root() {
    let mut doc = parse("[1]");
    let old_root = root(&doc);
    let new_root = doc.new_array();
    doc.set_root(new_root).unwrap();
    doc.append(new_root, old_root).unwrap();
    assert_eq!(render(&doc), "[[1]]");
    assert_positions(&doc);
}

#[test]
fn append_scalar_shorthand() {
    let mut doc = parse("[]");
    let r = root(&doc);
    doc.append_scalar(r, 1).unwrap();
    doc.append_scalar(r, 2.5).unwrap();
    doc.append_scalar(r, "s").unwrap();
    doc.append_scalar(r, true).unwrap();
    doc.append_scalar(r, ()).unwrap();
    assert_eq!(render(&doc), r#"[1,2.5,"s",true,null]"#);
}

// ============================================================================
// Set
// ============================================================================

#[test]
fn set_new_key_appends() {
    let mut doc = parse(r#"{"a":1}"#);
    let v = doc.new_bool(true);
    let displaced = doc.set(root(&doc), "b", v).unwrap();
    assert_eq!(displaced, None);
    assert_eq!(render(&doc), r#"{"a":1,"b":true}"#);
    assert_eq!(doc.node(v).self_key(), "b");
}

#[test]
fn set_existing_key_keeps_position_and_detaches_old_child() {
    let mut doc = parse(r#"{"a":1,"b":2,"c":3}"#);
    let old = at(&doc, "$.b");
    let new = doc.new_string("two");
    let displaced = doc.set(root(&doc), "b", new).unwrap();
    assert_eq!(displaced, Some(old));
    assert_eq!(render(&doc), r#"{"a":1,"b":"two","c":3}"#);
    assert!(!doc.node(old).parent().exists());
    assert_eq!(doc.node(new).self_key(), "b");
    assert_positions(&doc);

    // The displaced child is free to be attached elsewhere.
    doc.set(root(&doc), "d", old).unwrap();
    assert_eq!(render(&doc), r#"{"a":1,"b":"two","c":3,"d":2}"#);
}

#[test]
fn set_on_array_is_invalid_operation() {
    let mut doc = parse("[]");
    let n = doc.new_null();
    assert!(matches!(
        doc.set(root(&doc), "k", n),
        Err(TreeError::InvalidOperation(_))
    ));
}

#[test]
fn set_scalar_shorthand() {
    let mut doc = parse(r#"{"a":1}"#);
    let r = root(&doc);
    let old = doc.set_scalar(r, "a", "one").unwrap();
    assert!(old.is_some());
    doc.set_scalar(r, "b", -4).unwrap();
    assert_eq!(render(&doc), r#"{"a":"one","b":-4}"#);
}

// ============================================================================
// Remove
// ============================================================================

#[test]
fn remove_key_scenario() {
    let mut doc = parse(r#"{"a":1,"b":2}"#);
    let removed = doc.remove_key(root(&doc), "a").unwrap();
    assert_eq!(render(&doc), r#"{"b":2}"#);
    assert_eq!(doc.node(removed).as_i64().unwrap(), 1);
    assert!(!doc.node(removed).parent().exists());
    assert_positions(&doc);
}

#[test]
fn remove_key_shifts_later_members() {
    let mut doc = parse(r#"{"a":1,"b":2,"c":3,"d":4}"#);
    doc.remove_key(root(&doc), "b").unwrap();
    assert_eq!(doc.root().children_keys(), vec!["a", "c", "d"]);
    assert_eq!(doc.root().key("d").self_key(), "d");
    assert_positions(&doc);
}

#[test]
fn remove_missing_key_is_invalid_key() {
    let mut doc = parse(r#"{"a":1}"#);
    assert!(matches!(
        doc.remove_key(root(&doc), "zz"),
        Err(TreeError::InvalidKey(ref k)) if k == "zz"
    ));
}

#[test]
fn remove_idx_shifts_left() {
    let mut doc = parse("[0,1,2,3]");
    let removed = doc.remove_idx(root(&doc), 1).unwrap();
    assert_eq!(render(&doc), "[0,2,3]");
    assert_eq!(doc.node(removed).as_i64().unwrap(), 1);
    assert_eq!(doc.root().idx(2).self_index(), 2);
    assert_positions(&doc);
}

#[test]
fn remove_idx_out_of_range_is_never_clamped() {
    let mut doc = parse("[0]");
    assert!(matches!(
        doc.remove_idx(root(&doc), 1),
        Err(TreeError::InvalidIndex(1))
    ));
    assert_eq!(render(&doc), "[0]");
}

#[test]
fn remove_dispatches_on_parent_kind() {
    let mut doc = parse(r#"{"a":[1,2,3],"b":true}"#);
    doc.remove(at(&doc, "$.a[0]")).unwrap();
    doc.remove(at(&doc, "$.b")).unwrap();
    assert_eq!(render(&doc), r#"{"a":[2,3]}"#);
    assert_positions(&doc);
}

#[test]
fn remove_detached_node_is_no_parent() {
    let mut doc = parse("[]");
    assert!(matches!(doc.remove(root(&doc)), Err(TreeError::NoParent)));
}

#[test]
fn removed_node_can_be_reattached() {
    let mut doc = parse(r#"{"from":[1,2],"to":[]}"#);
    let item = at(&doc, "$.from[1]");
    doc.remove(item).unwrap();
    doc.append(at(&doc, "$.to"), item).unwrap();
    assert_eq!(render(&doc), r#"{"from":[1],"to":[2]}"#);
}

// ============================================================================
// Replace
// ============================================================================

#[test]
fn replace_idx_takes_position() {
    let mut doc = parse(r#"["a","b","c"]"#);
    let x = doc.new_string("x");
    let old = doc.replace_idx(root(&doc), 1, x).unwrap();
    assert_eq!(render(&doc), r#"["a","x","c"]"#);
    assert_eq!(doc.node(x).self_index(), 1);
    assert!(!doc.node(old).parent().exists());
}

#[test]
fn replace_idx_out_of_range() {
    let mut doc = parse("[1]");
    let x = doc.new_null();
    assert!(matches!(
        doc.replace_idx(root(&doc), 5, x),
        Err(TreeError::InvalidIndex(5))
    ));
}

#[test]
fn replace_idx_with_attached_node_is_rejected() {
    let mut doc = parse("[1,2]");
    let second = at(&doc, "$[1]");
    assert!(matches!(
        doc.replace_idx(root(&doc), 0, second),
        Err(TreeError::AlreadyAttached)
    ));
}

#[test]
fn replace_keeps_object_key() {
    let mut doc = parse(r#"{"a":1,"b":{"c":2},"d":3}"#);
    let b = at(&doc, "$.b");
    let new = doc.parse_fragment("[true]").unwrap();
    doc.replace(b, new).unwrap();
    assert_eq!(render(&doc), r#"{"a":1,"b":[true],"d":3}"#);
    assert_eq!(doc.node(new).self_key(), "b");
    assert!(!doc.node(b).parent().exists());
    assert_positions(&doc);
}

#[test]
fn replace_with_scalar_shorthand() {
    let mut doc = parse(r#"[{"a":1}]"#);
    let new = doc.replace_with_scalar(at(&doc, "$[0]"), "gone").unwrap();
    assert_eq!(render(&doc), r#"["gone"]"#);
    assert_eq!(doc.node(new).self_index(), 0);
}

#[test]
fn replace_detached_node_is_no_parent() {
    let mut doc = parse("[]");
    let a = doc.new_null();
    let b = doc.new_null();
    assert!(matches!(doc.replace(a, b), Err(TreeError::NoParent)));
}

#[test]
fn replace_with_ancestor_is_rejected() {
    let mut doc = Document::new();
    let outer = doc.new_array();
    let inner = doc.new_array();
    let leaf = doc.new_null();
    doc.append(outer, inner).unwrap();
    doc.append(inner, leaf).unwrap();
    assert!(matches!(
        doc.replace(leaf, outer),
        Err(TreeError::InvalidOperation(_))
    ));
}

// ============================================================================
// Key sorting
// ============================================================================

#[test]
fn sort_keys_scenario() {
    let mut doc = parse(r#"{"c":1,"a":2,"b":3}"#);
    doc.sort_keys(root(&doc)).unwrap();
    assert_eq!(render(&doc), r#"{"a":2,"b":3,"c":1}"#);
    assert_positions(&doc);
}

#[test]
fn sort_keys_on_empty_object_is_noop() {
    let mut doc = parse("{}");
    doc.sort_keys(root(&doc)).unwrap();
    assert_eq!(render(&doc), "{}");
}

#[test]
fn sort_keys_on_array_is_invalid_operation() {
    let mut doc = parse("[3,1]");
    assert!(matches!(
        doc.sort_keys(root(&doc)),
        Err(TreeError::InvalidOperation(_))
    ));
}

#[test]
fn sort_tree_keys_leaves_arrays_alone() {
    let mut doc = parse(r#"{"z":[{"y":1,"x":2},3,1],"a":{"c":{"f":1,"e":2},"b":0}}"#);
    doc.sort_tree_keys(root(&doc)).unwrap();
    assert_eq!(
        render(&doc),
        r#"{"a":{"b":0,"c":{"e":2,"f":1}},"z":[{"x":2,"y":1},3,1]}"#
    );
    assert_positions(&doc);
}

#[test]
fn sort_tree_keys_on_subtree_only() {
    let mut doc = parse(r#"{"b":{"d":1,"c":2},"a":0}"#);
    doc.sort_tree_keys(at(&doc, "$.b")).unwrap();
    assert_eq!(render(&doc), r#"{"b":{"c":2,"d":1},"a":0}"#);
}

#[test]
fn sort_tree_keys_on_scalar_is_noop() {
    let mut doc = parse("5");
    doc.sort_tree_keys(root(&doc)).unwrap();
    assert_eq!(render(&doc), "5");
}
