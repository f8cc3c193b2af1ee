use crate::error::{Error, Result};
use crate::types::{FlatRecord, FlattenConfig, Scalar, Shape};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

/// A pending node on the traversal stack
struct Frame {
    path: String,
    depth: usize,
    value: Value,
}

/// Flattens one hierarchical record into a single level of path keys
#[derive(Debug, Clone, Default)]
pub struct Flattener {
    config: FlattenConfig,
}

impl Flattener {
    pub fn new(config: FlattenConfig) -> Result<Self> {
        config.validate()?;
        Ok(Flattener { config })
    }

    pub fn config(&self) -> &FlattenConfig {
        &self.config
    }

    /// Flatten a JSON value into a path-keyed record
    ///
    /// Leaves come out in depth-first order, objects in member order and
    /// arrays in index order. Empty objects and arrays contribute nothing.
    /// A bare scalar yields a single entry under the empty key.
    pub fn flatten(&self, value: Value) -> Result<FlatRecord> {
        let mut record = FlatRecord::with_capacity(16);
        let mut stack = vec![Frame {
            path: String::new(),
            depth: 0,
            value,
        }];

        while let Some(Frame { path, depth, value }) = stack.pop() {
            if depth > self.config.max_depth {
                // The rejected subtree can be arbitrarily deep
                dismantle(std::iter::once(value).chain(stack.into_iter().map(|f| f.value)));
                return Err(Error::DepthLimitExceeded {
                    path,
                    max_depth: self.config.max_depth,
                });
            }

            // Children are pushed in reverse so they pop in input order
            match Shape::of(value) {
                Shape::Object(obj) => {
                    for (key, child) in obj.into_iter().rev() {
                        stack.push(Frame {
                            path: self.child_path(&path, depth, &key),
                            depth: depth + 1,
                            value: child,
                        });
                    }
                }
                Shape::Array(arr) => {
                    for (idx, child) in arr.into_iter().enumerate().rev() {
                        stack.push(Frame {
                            path: self.child_path(&path, depth, &idx.to_string()),
                            depth: depth + 1,
                            value: child,
                        });
                    }
                }
                Shape::Scalar(scalar) => self.record_leaf(&mut record, path, scalar),
            }
        }

        trace!(leaves = record.len(), "flattened record");
        Ok(record)
    }

    /// Flatten any serializable value
    ///
    /// Fails with `InvalidNodeKind` when the value has no object/array/scalar
    /// representation, e.g. a map keyed by tuples.
    pub fn flatten_serialize<T: Serialize + ?Sized>(&self, value: &T) -> Result<FlatRecord> {
        let value = serde_json::to_value(value).map_err(|e| Error::InvalidNodeKind {
            path: String::new(),
            reason: e.to_string(),
        })?;
        self.flatten(value)
    }

    fn child_path(&self, prefix: &str, depth: usize, segment: &str) -> String {
        if depth == 0 {
            return segment.to_string();
        }
        let mut path =
            String::with_capacity(prefix.len() + self.config.separator.len() + segment.len());
        path.push_str(prefix);
        path.push_str(&self.config.separator);
        path.push_str(segment);
        path
    }

    fn record_leaf(&self, record: &mut FlatRecord, path: String, scalar: Scalar) {
        if record.contains_key(&path) {
            // Later write wins
            debug!(path = %path, "path key collision, overwriting earlier leaf");
        }
        record.insert(path, scalar);
    }
}

/// Drop values without recursing, so nesting depth cannot exhaust the call stack
fn dismantle(values: impl IntoIterator<Item = Value>) {
    let mut pending: Vec<Value> = values.into_iter().collect();
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(arr) => pending.extend(arr),
            Value::Object(obj) => pending.extend(obj.into_iter().map(|(_, child)| child)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn flatten(value: Value) -> FlatRecord {
        Flattener::default().flatten(value).unwrap()
    }

    #[test]
    fn test_nested_object() {
        let record = flatten(json!({"a": 1, "b": {"c": 2}}));

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a"), Some(&Scalar::from(1i64)));
        assert_eq!(record.get("b.c"), Some(&Scalar::from(2i64)));
    }

    #[test]
    fn test_array_indices() {
        let record = flatten(json!({"a": [10, 20]}));

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a.0", "a.1"]);
        assert_eq!(record.get("a.0"), Some(&Scalar::from(10i64)));
        assert_eq!(record.get("a.1"), Some(&Scalar::from(20i64)));
    }

    #[test]
    fn test_bare_scalar_root() {
        let record = flatten(json!(42));

        assert_eq!(record.len(), 1);
        assert_eq!(record.get(""), Some(&Scalar::from(42i64)));
    }

    #[test]
    fn test_empty_containers_contribute_nothing() {
        assert!(flatten(json!({})).is_empty());
        assert!(flatten(json!([])).is_empty());

        let record = flatten(json!({"a": {}, "b": [], "c": 1}));
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["c"]);
    }

    #[test]
    fn test_explicit_null_is_a_leaf() {
        let record = flatten(json!({"a": null, "b": [null]}));

        assert_eq!(record.get("a"), Some(&Scalar::Null));
        assert_eq!(record.get("b.0"), Some(&Scalar::Null));
    }

    #[test]
    fn test_depth_first_order() {
        let record = flatten(json!({
            "z": 1,
            "m": {"y": [true, {"k": "v"}], "x": null},
            "a": "last"
        }));

        assert_eq!(
            record.keys().collect::<Vec<_>>(),
            vec!["z", "m.y.0", "m.y.1.k", "m.x", "a"]
        );
    }

    #[test]
    fn test_empty_keys() {
        let record = flatten(json!({"": 1, "a": {"": 2}}));

        assert_eq!(record.get(""), Some(&Scalar::from(1i64)));
        assert_eq!(record.get("a."), Some(&Scalar::from(2i64)));
    }

    #[test]
    fn test_collision_later_write_wins() {
        let record = flatten(json!({"a.b": 1, "a": {"b": 2}}));

        assert_eq!(record.len(), 1);
        assert_eq!(record.get("a.b"), Some(&Scalar::from(2i64)));
    }

    #[test]
    fn test_custom_separator() {
        let flattener = Flattener::new(FlattenConfig::default().with_separator("__")).unwrap();
        let record = flattener.flatten(json!({"a": {"b": [1]}})).unwrap();

        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a__b__0"]);
    }

    #[test]
    fn test_depth_limit() {
        let flattener = Flattener::new(FlattenConfig::default().with_max_depth(2)).unwrap();

        assert!(flattener.flatten(json!({"a": {"b": 1}})).is_ok());

        let err = flattener.flatten(json!({"a": {"b": {"c": 1}}})).unwrap_err();
        match err {
            Error::DepthLimitExceeded { path, max_depth } => {
                assert_eq!(path, "a.b.c");
                assert_eq!(max_depth, 2);
            }
            other => panic!("Expected DepthLimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let mut value = json!("leaf");
        for _ in 0..100_000 {
            value = Value::Array(vec![value]);
        }

        let flattener = Flattener::new(FlattenConfig::default().with_max_depth(200_000)).unwrap();
        let record = flattener.flatten(value).unwrap();
        assert_eq!(record.len(), 1);

        let mut shallow = json!(1);
        for _ in 0..600 {
            shallow = Value::Array(vec![shallow]);
        }
        assert!(matches!(
            Flattener::default().flatten(shallow),
            Err(Error::DepthLimitExceeded { max_depth: 512, .. })
        ));
    }

    #[test]
    fn test_depth_error_on_very_deep_input() {
        let mut value = json!(1);
        for _ in 0..1_000_000 {
            value = Value::Array(vec![value]);
        }

        match Flattener::default().flatten(value) {
            Err(Error::DepthLimitExceeded { path, max_depth }) => {
                assert_eq!(max_depth, 512);
                assert_eq!(path.split('.').count(), 513);
            }
            other => panic!("Expected DepthLimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_depth_error_with_deep_pending_siblings() {
        let mut deep = json!("leaf");
        for _ in 0..300_000 {
            deep = Value::Array(vec![deep]);
        }
        let mut too_deep = json!(1);
        for _ in 0..600 {
            too_deep = Value::Object([("k".to_string(), too_deep)].into_iter().collect());
        }

        // The over-deep branch pops first; the deep sibling is still queued
        let payload = Value::Array(vec![too_deep, deep]);
        let flattener = Flattener::new(FlattenConfig::default().with_max_depth(100)).unwrap();
        assert!(matches!(
            flattener.flatten(payload),
            Err(Error::DepthLimitExceeded { max_depth: 100, .. })
        ));
    }

    #[test]
    fn test_config_accessor() {
        let flattener = Flattener::new(FlattenConfig::default().with_separator("/")).unwrap();
        assert_eq!(flattener.config().separator, "/");
        assert_eq!(flattener.config().max_depth, 512);
    }

    #[test]
    fn test_flatten_serialize() {
        #[derive(Serialize)]
        struct User {
            name: String,
            tags: Vec<&'static str>,
        }

        let user = User {
            name: "Alice".to_string(),
            tags: vec!["admin"],
        };
        let record = Flattener::default().flatten_serialize(&user).unwrap();

        assert_eq!(record.get("name"), Some(&Scalar::from("Alice")));
        assert_eq!(record.get("tags.0"), Some(&Scalar::from("admin")));
    }

    #[test]
    fn test_invalid_node_kind() {
        let mut grid = HashMap::new();
        grid.insert((0, 1), "cell");

        let err = Flattener::default().flatten_serialize(&grid).unwrap_err();
        assert!(matches!(err, Error::InvalidNodeKind { .. }));
    }
}
