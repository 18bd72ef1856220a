/// Property tests for the structural invariants kept by the mutation engine.
///
/// Random sequences of edits are applied to an array and to an object, side
/// by side with a plain `Vec` model. After every step the tree must agree with
/// the model and every child must report the position it is stored at.
use jtree_core::{Document, NodeId, NodeRef};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum ArrayOp {
    Append(i64),
    RemoveIdx(usize),
    ReplaceIdx(usize, i64),
    RemoveNode(usize),
}

#[derive(Debug, Clone)]
enum ObjectOp {
    Set(u8, i64),
    RemoveKey(u8),
    Replace(u8, i64),
    SortKeys,
}

fn arb_array_op() -> impl Strategy<Value = ArrayOp> {
    prop_oneof![
        3 => any::<i64>().prop_map(|v| ArrayOp::Append(v % 1000)),
        2 => (0usize..12).prop_map(ArrayOp::RemoveIdx),
        2 => (0usize..12, any::<i64>()).prop_map(|(i, v)| ArrayOp::ReplaceIdx(i, v % 1000)),
        1 => (0usize..12).prop_map(ArrayOp::RemoveNode),
    ]
}

fn arb_object_op() -> impl Strategy<Value = ObjectOp> {
    prop_oneof![
        4 => (0u8..10, any::<i64>()).prop_map(|(k, v)| ObjectOp::Set(k, v % 1000)),
        2 => (0u8..10).prop_map(ObjectOp::RemoveKey),
        2 => (0u8..10, any::<i64>()).prop_map(|(k, v)| ObjectOp::Replace(k, v % 1000)),
        1 => Just(ObjectOp::SortKeys),
    ]
}

fn key_name(k: u8) -> String {
    format!("k{k}")
}

fn check_array(array: NodeRef<'_>, model: &[i64]) -> Result<(), TestCaseError> {
    prop_assert_eq!(array.len(), model.len());
    for (i, child) in array.children().iter().enumerate() {
        prop_assert_eq!(child.self_index(), i);
        prop_assert_eq!(child.parent(), array);
        prop_assert_eq!(child.as_i64().unwrap(), model[i]);
    }
    Ok(())
}

fn check_object(object: NodeRef<'_>, model: &[(String, i64)]) -> Result<(), TestCaseError> {
    prop_assert_eq!(object.len(), model.len());
    let keys: Vec<&str> = model.iter().map(|(k, _)| k.as_str()).collect();
    prop_assert_eq!(object.children_keys(), keys);
    for (child, (key, value)) in object.children().iter().zip(model) {
        prop_assert_eq!(child.self_key(), key.as_str());
        prop_assert_eq!(object.key(key), *child);
        prop_assert_eq!(child.parent(), object);
        prop_assert_eq!(child.as_i64().unwrap(), *value);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn array_positions_stay_contiguous(ops in prop::collection::vec(arb_array_op(), 0..40)) {
        let mut doc = Document::new();
        let array = doc.new_array();
        let mut model: Vec<i64> = Vec::new();

        for op in ops {
            match op {
                ArrayOp::Append(v) => {
                    doc.append_scalar(array, v).unwrap();
                    model.push(v);
                }
                ArrayOp::RemoveIdx(i) => {
                    let result = doc.remove_idx(array, i);
                    if i < model.len() {
                        let removed = result.unwrap();
                        prop_assert!(!doc.node(removed).parent().exists());
                        model.remove(i);
                    } else {
                        prop_assert!(result.is_err());
                    }
                }
                ArrayOp::ReplaceIdx(i, v) => {
                    let node = doc.new_int(v);
                    let result = doc.replace_idx(array, i, node);
                    if i < model.len() {
                        prop_assert!(!doc.node(result.unwrap()).parent().exists());
                        model[i] = v;
                    } else {
                        prop_assert!(result.is_err());
                        prop_assert!(!doc.node(node).parent().exists());
                    }
                }
                ArrayOp::RemoveNode(i) => {
                    if let Some(child) = doc.node(array).idx(i).id() {
                        doc.remove(child).unwrap();
                        model.remove(i);
                    }
                }
            }
            check_array(doc.node(array), &model)?;
        }
    }

    #[test]
    fn object_key_map_stays_bijective(ops in prop::collection::vec(arb_object_op(), 0..40)) {
        let mut doc = Document::new();
        let object = doc.new_object();
        let mut model: Vec<(String, i64)> = Vec::new();

        for op in ops {
            match op {
                ObjectOp::Set(k, v) => {
                    let key = key_name(k);
                    let displaced = doc.set_scalar(object, &key, v).unwrap();
                    match model.iter_mut().find(|(name, _)| *name == key) {
                        Some(entry) => {
                            prop_assert!(!doc.node(displaced.unwrap()).parent().exists());
                            entry.1 = v;
                        }
                        None => {
                            prop_assert!(displaced.is_none());
                            model.push((key, v));
                        }
                    }
                }
                ObjectOp::RemoveKey(k) => {
                    let key = key_name(k);
                    let result = doc.remove_key(object, &key);
                    match model.iter().position(|(name, _)| *name == key) {
                        Some(pos) => {
                            prop_assert!(result.is_ok());
                            model.remove(pos);
                        }
                        None => prop_assert!(result.is_err()),
                    }
                }
                ObjectOp::Replace(k, v) => {
                    let key = key_name(k);
                    if let Some(child) = doc.node(object).key(&key).id() {
                        doc.replace_with_scalar(child, v).unwrap();
                        if let Some(entry) = model.iter_mut().find(|(name, _)| *name == key) {
                            entry.1 = v;
                        }
                    }
                }
                ObjectOp::SortKeys => {
                    doc.sort_keys(object).unwrap();
                    model.sort_by(|a, b| a.0.cmp(&b.0));
                }
            }
            check_object(doc.node(object), &model)?;
        }
    }

    /// Sorting a whole tree orders every object and keeps every array.
    #[test]
    fn sort_tree_keys_orders_all_objects(
        keys in prop::collection::vec("[a-e]{1,2}", 1..8),
        values in prop::collection::vec(0i64..100, 1..8),
    ) {
        let mut doc = Document::new();
        let root = doc.new_object();
        doc.set_root(root).unwrap();
        let list = doc.new_array();
        doc.set(root, "list", list).unwrap();
        for (i, key) in keys.iter().enumerate() {
            let inner = doc.new_object();
            doc.append(list, inner).unwrap();
            for (j, v) in values.iter().enumerate() {
                doc.set_scalar(inner, &format!("{key}{j}"), *v).unwrap();
            }
            doc.set_scalar(root, key, i as i64).unwrap();
        }
        let before: Vec<String> = doc.node(list).children().iter().map(|n| n.to_string()).collect();

        doc.sort_tree_keys(root).unwrap();

        for (node, _) in doc.root().walk().unwrap() {
            if node.is_object() {
                let keys = node.children_keys();
                let mut sorted = keys.clone();
                sorted.sort_unstable();
                prop_assert_eq!(keys, sorted);
            }
        }
        let after = doc.node(list).children();
        prop_assert_eq!(after.len(), before.len());
        for (node, text) in after.iter().zip(&before) {
            let reparsed = Document::parse_str(text).unwrap();
            let mut expected_keys = reparsed.root().children_keys();
            expected_keys.sort_unstable();
            prop_assert_eq!(node.children_keys(), expected_keys);
        }
    }
}
