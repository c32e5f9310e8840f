//! Resolver settings: which declared names count as containers.
//!
//! Every field has a default, so a partial `settings` section (or file) only
//! needs to name what it changes.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

pub const OBJECT_TYPE: &str = "java.lang.Object";

const COLLECTION_ROOTS: &[&str] = &[
    "java.util.Collection",
    "java.util.List",
    "java.util.Set",
    "java.util.SortedSet",
    "java.util.Queue",
    "java.util.Deque",
    "java.util.ArrayList",
    "java.util.LinkedList",
    "java.util.HashSet",
    "java.util.LinkedHashSet",
    "java.util.TreeSet",
];

const STREAM_ROOTS: &[&str] = &["java.util.stream.Stream"];

const MAP_ROOTS: &[&str] = &[
    "java.util.Map",
    "java.util.HashMap",
    "java.util.LinkedHashMap",
    "java.util.TreeMap",
    "java.util.SortedMap",
    "java.util.concurrent.ConcurrentMap",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fully-qualified name substituted for raw or narrowed components.
    pub object_type: String,
    pub collection_types: IndexSet<String>,
    pub stream_types: IndexSet<String>,
    pub map_types: IndexSet<String>,
}

impl Default for Settings {
    fn default() -> Self {
        fn names(xs: &[&str]) -> IndexSet<String> {
            xs.iter().map(|s| s.to_string()).collect()
        }
        Self {
            object_type: OBJECT_TYPE.to_string(),
            collection_types: names(COLLECTION_ROOTS),
            stream_types: names(STREAM_ROOTS),
            map_types: names(MAP_ROOTS),
        }
    }
}

impl Settings {
    /// Union container roots; a non-default object type from `other` wins.
    pub fn merge(&mut self, other: Settings) {
        if other.object_type != OBJECT_TYPE {
            self.object_type = other.object_type;
        }
        self.collection_types.extend(other.collection_types);
        self.stream_types.extend(other.stream_types);
        self.map_types.extend(other.map_types);
    }

    pub fn is_collection_root(&self, name: &str) -> bool {
        self.collection_types.contains(name)
    }

    pub fn is_stream_root(&self, name: &str) -> bool {
        self.stream_types.contains(name)
    }

    pub fn is_map_root(&self, name: &str) -> bool {
        self.map_types.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_keep_defaults() {
        let s: Settings = serde_json::from_str(r#"{ "map_types": ["com.acme.Dict"] }"#).unwrap();
        assert_eq!(s.object_type, OBJECT_TYPE);
        assert!(s.is_map_root("com.acme.Dict"));
        assert!(!s.is_map_root("java.util.Map"));
        assert!(s.is_collection_root("java.util.List"));
    }

    #[test]
    fn merge_unions_roots() {
        let mut s = Settings::default();
        let mut extra = Settings::default();
        extra.stream_types.insert("reactor.core.publisher.Flux".into());
        s.merge(extra);
        assert!(s.is_stream_root("reactor.core.publisher.Flux"));
        assert!(s.is_stream_root("java.util.stream.Stream"));
        assert_eq!(s.object_type, OBJECT_TYPE);
    }
}
