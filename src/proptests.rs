use super::*;

use proptest::prelude::*;
use std::collections::HashMap;

fn leaf_value(node: &Node) -> i64 {
    node.scalar()
        .and_then(Scalar::as_integer)
        .expect("integer leaf")
}

#[derive(Clone, Debug)]
enum ArrayOp {
    Append(i64),
    InsertAt(usize, i64),
    SwapAt(usize, i64),
    RemoveAt(usize),
    RemoveValue(usize),
}

fn array_ops_strategy() -> impl Strategy<Value = Vec<ArrayOp>> {
    let op = prop_oneof![
        4 => any::<i64>().prop_map(ArrayOp::Append),
        2 => (0usize..12, any::<i64>()).prop_map(|(idx, v)| ArrayOp::InsertAt(idx, v)),
        2 => (0usize..12, any::<i64>()).prop_map(|(idx, v)| ArrayOp::SwapAt(idx, v)),
        2 => (0usize..12).prop_map(ArrayOp::RemoveAt),
        1 => (0usize..12).prop_map(ArrayOp::RemoveValue),
    ];
    prop::collection::vec(op, 0..=200)
}

#[derive(Clone, Debug)]
enum HashOp {
    Insert(String, i64),
    Remove(String),
    Get(String),
}

fn hash_ops_strategy() -> impl Strategy<Value = Vec<HashOp>> {
    // A small key pool makes repeats (hits, duplicate inserts, double
    // removes) common.
    let key = (0u8..16).prop_map(|i| format!("key-{i}"));
    let op = prop_oneof![
        4 => (key.clone(), any::<i64>()).prop_map(|(k, v)| HashOp::Insert(k, v)),
        2 => key.clone().prop_map(HashOp::Remove),
        2 => key.prop_map(HashOp::Get),
    ];
    prop::collection::vec(op, 0..=200)
}

#[derive(Clone, Debug)]
enum Shape {
    Leaf,
    Array(Vec<Shape>),
    Hash(Vec<Shape>),
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    Just(Shape::Leaf).prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Shape::Array),
            prop::collection::vec(inner, 0..4).prop_map(Shape::Hash),
        ]
    })
}

fn build(shape: &Shape, node_count: &mut usize) -> Node {
    *node_count += 1;
    match shape {
        Shape::Leaf => Node::leaf(1312_i64),
        Shape::Array(children) => {
            let mut node = Node::alloc(Kind::Array).unwrap();
            for child in children {
                node.append(build(child, node_count)).unwrap();
            }
            node
        }
        Shape::Hash(children) => {
            let mut node = Node::alloc(Kind::Hash).unwrap();
            for (i, child) in children.iter().enumerate() {
                node.insert_key(&format!("child-{i}"), build(child, node_count))
                    .unwrap();
            }
            node
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn array_matches_vec_model(ops in array_ops_strategy()) {
        let mut node = Node::alloc(Kind::Array).unwrap();
        let mut model: Vec<i64> = Vec::new();

        for op in ops {
            match op {
                ArrayOp::Append(v) => {
                    node.append(Node::leaf(v)).unwrap();
                    model.push(v);
                }
                ArrayOp::InsertAt(idx, v) => {
                    let result = node.insert_at(idx, Node::leaf(v));
                    if idx < model.len() {
                        result.unwrap();
                        model.insert(idx, v);
                    } else {
                        let rejected = result.unwrap_err();
                        prop_assert_eq!(rejected.error, Error::InvalidParams);
                        prop_assert_eq!(leaf_value(&rejected.child), v);
                    }
                }
                ArrayOp::SwapAt(idx, v) => {
                    match node.swap_at(idx, Node::leaf(v)) {
                        Ok(old) => {
                            prop_assert!(idx < model.len());
                            prop_assert_eq!(leaf_value(&old), model[idx]);
                            model[idx] = v;
                        }
                        Err(rejected) => {
                            prop_assert!(idx >= model.len());
                            prop_assert_eq!(rejected.error, Error::InvalidParams);
                        }
                    }
                }
                ArrayOp::RemoveAt(idx) => {
                    match node.remove_at(idx) {
                        Ok(child) => {
                            prop_assert!(idx < model.len());
                            prop_assert_eq!(leaf_value(&child), model.remove(idx));
                        }
                        Err(error) => {
                            prop_assert!(idx >= model.len());
                            prop_assert_eq!(error, Error::InvalidParams);
                        }
                    }
                }
                ArrayOp::RemoveValue(i) => {
                    if model.is_empty() {
                        continue;
                    }
                    let idx = i % model.len();
                    let target = NodeRef::of(node.get(idx).unwrap());
                    let removed = node.remove_value(target).unwrap();
                    prop_assert_eq!(leaf_value(&removed), model.remove(idx));
                }
            }
            prop_assert_eq!(node.len(), model.len());
        }

        for (idx, expected) in model.iter().enumerate() {
            prop_assert_eq!(leaf_value(node.get(idx).unwrap()), *expected);
        }
        prop_assert!(node.get(model.len()).is_none());
    }

    #[test]
    fn hash_matches_map_model(ops in hash_ops_strategy()) {
        let mut node = Node::alloc(Kind::Hash).unwrap();
        let mut model: HashMap<String, i64> = HashMap::new();
        let mut capacity_floor = 0;

        for op in ops {
            match op {
                HashOp::Insert(key, v) => {
                    let result = node.insert_key(&key, Node::leaf(v));
                    if model.contains_key(&key) {
                        // A resident key collides with itself; the table must
                        // refuse and stay intact.
                        let rejected = result.unwrap_err();
                        prop_assert_eq!(rejected.error, Error::AllocFailed);
                        prop_assert_eq!(leaf_value(&rejected.child), v);
                    } else {
                        result.unwrap();
                        model.insert(key, v);
                    }
                }
                HashOp::Remove(key) => match (node.remove_key(&key), model.remove(&key)) {
                    (Ok(child), Some(v)) => prop_assert_eq!(leaf_value(&child), v),
                    (Err(error), None) => prop_assert_eq!(error, Error::NotFound),
                    (got, want) => prop_assert!(false, "mismatch: {:?} vs {:?}", got, want),
                },
                HashOp::Get(key) => {
                    prop_assert_eq!(
                        node.get_key(&key).map(leaf_value),
                        model.get(&key).copied()
                    );
                }
            }

            prop_assert_eq!(node.len(), model.len());

            // Capacity only ever ratchets up.
            let capacity = match &node {
                Node::Hash(store) => store.capacity(),
                _ => unreachable!(),
            };
            prop_assert!(capacity >= capacity_floor);
            capacity_floor = capacity;
        }

        for (key, v) in &model {
            prop_assert_eq!(node.get_key(key).map(leaf_value), Some(*v));
        }

        // Tearing the tree down visits the root plus every remaining child.
        let expected = model.len() + 1;
        let report = node.release();
        prop_assert_eq!(report.into_result(), Ok(expected));
    }

    #[test]
    fn release_visits_every_node_once(shape in shape_strategy()) {
        let mut node_count = 0;
        let root = build(&shape, &mut node_count);

        let report = root.release();
        prop_assert_eq!(report.released, node_count);
        prop_assert_eq!(report.failed, 0);
        prop_assert!(report.first_error.is_none());
    }
}
