//! Chart values: parsing `values.yaml` and overlays, and merging them.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValuesParseError {
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error("values must be a mapping at the top level")]
    NotAMapping,
}

/// Parse a values document.
///
/// Empty documents and `null` yield an empty mapping; any other non-mapping
/// document is rejected.
pub fn parse_values(content: &str) -> Result<Value, ValuesParseError> {
    if content.trim().is_empty() {
        return Ok(Value::Mapping(Mapping::new()));
    }

    let values: Value = serde_yaml::from_str(content)?;

    match values {
        Value::Null => Ok(Value::Mapping(Mapping::new())),
        Value::Mapping(_) => Ok(values),
        _ => Err(ValuesParseError::NotAMapping),
    }
}

/// Merge `overlay` onto `base`.
///
/// Mappings merge key by key, recursively. Any other overlay value replaces
/// the base value, lists included. A `null` in the overlay deletes the key.
/// Existing keys keep their position so output stays stable.
pub fn merge_values(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(mut base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                if value.is_null() {
                    base.remove(&key);
                    continue;
                }
                match base.get_mut(&key) {
                    Some(existing) => {
                        let current = std::mem::take(existing);
                        *existing = merge_values(current, value);
                    }
                    None => {
                        base.insert(key, value);
                    }
                }
            }
            Value::Mapping(base)
        }
        (_, overlay) => overlay,
    }
}

/// Look up a dotted path (e.g. `image.repository`).
#[cfg(test)]
pub(crate) fn get<'a>(values: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = values;
    for part in path.split('.') {
        match current {
            Value::Mapping(map) => {
                current = map.get(Value::String(part.to_string()))?;
            }
            _ => return None,
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_overlay_is_empty_mapping() {
        assert_eq!(parse_values("").unwrap(), Value::Mapping(Mapping::new()));
        assert_eq!(parse_values("  \n").unwrap(), Value::Mapping(Mapping::new()));
        assert_eq!(parse_values("~").unwrap(), Value::Mapping(Mapping::new()));
    }

    #[test]
    fn test_non_mapping_rejected() {
        assert!(matches!(parse_values("- a\n- b\n"), Err(ValuesParseError::NotAMapping)));
        assert!(parse_values("invalid: [yaml").is_err());
    }

    #[test]
    fn test_merge_nested() {
        let base = parse_values(
            r#"
image:
  repository: quay.io/dexidp/dex
  tag: v2.24.0
replicaCount: 1
config:
  connectors: []
"#,
        )
        .unwrap();
        let overlay = parse_values(
            r#"
image:
  tag: v2.25.0
config:
  connectors:
    - id: github
"#,
        )
        .unwrap();

        let merged = merge_values(base, overlay);
        assert_eq!(
            get(&merged, "image.repository"),
            Some(&Value::String("quay.io/dexidp/dex".to_string()))
        );
        assert_eq!(
            get(&merged, "image.tag"),
            Some(&Value::String("v2.25.0".to_string()))
        );
        assert_eq!(get(&merged, "replicaCount"), Some(&Value::Number(1.into())));
        match get(&merged, "config.connectors") {
            Some(Value::Sequence(items)) => assert_eq!(items.len(), 1),
            other => panic!("unexpected connectors value: {:?}", other),
        }
    }

    #[test]
    fn test_merge_preserves_key_order() {
        let base = parse_values("a: 1\nb: 2\nc: 3\n").unwrap();
        let overlay = parse_values("a: 10\nd: 4\n").unwrap();
        let merged = merge_values(base, overlay);
        let keys: Vec<_> = merged
            .as_mapping()
            .unwrap()
            .keys()
            .map(|k| k.as_str().unwrap().to_string())
            .collect();
        assert_eq!(keys, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_null_deletes_key() {
        let base = parse_values("resources:\n  limits:\n    cpu: 100m\nkeep: true\n").unwrap();
        let overlay = parse_values("resources: null\n").unwrap();
        let merged = merge_values(base, overlay);
        assert!(get(&merged, "resources").is_none());
        assert!(get(&merged, "keep").is_some());
    }

    #[test]
    fn test_get_missing_path() {
        let values = parse_values("a:\n  b: 1\n").unwrap();
        assert!(get(&values, "a.c").is_none());
        assert!(get(&values, "a.b.c").is_none());
    }
}
