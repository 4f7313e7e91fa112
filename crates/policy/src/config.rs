//! The configuration contract the builder reads from.

use std::collections::{BTreeMap, HashMap};

/// A key/value configuration source with typed accessors.
///
/// Lookups must not have side effects the sandbox would need to grant;
/// implementations are expected to be fully loaded before `build` runs.
pub trait ConfigSource {
    /// The value of `key` exactly as stored, if set.
    fn raw(&self, key: &str) -> Option<&str>;

    /// The trimmed value of `key`. A blank value counts as unset, which
    /// lets a higher-precedence layer clear a key set further down.
    fn string(&self, key: &str) -> Option<String> {
        self.raw(key)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.string(key).unwrap_or_else(|| default.to_string())
    }

    /// `true` and `yes` (any case) are true. Anything else, including an
    /// absent key, is false.
    fn bool_or_false(&self, key: &str) -> bool {
        self.string(key).is_some_and(|value| {
            value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes")
        })
    }
}

impl ConfigSource for BTreeMap<String, String> {
    fn raw(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl ConfigSource for HashMap<String, String> {
    fn raw(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_string_or_default() {
        let config = source(&[("listen.url", "http://0.0.0.0:8080")]);
        assert_eq!(
            config.string_or("listen.url", "http://localhost:8000"),
            "http://0.0.0.0:8080"
        );
        assert_eq!(config.string_or("database.url", ""), "");
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = source(&[
            ("auth.server.base.uri", ""),
            ("listen.url", "   "),
            ("database.url", " jdbc:hsqldb:file:.hsql/db \t"),
        ]);
        assert_eq!(config.raw("auth.server.base.uri"), Some(""));
        assert!(config.string("auth.server.base.uri").is_none());
        assert_eq!(
            config.string_or("listen.url", "http://localhost:8000"),
            "http://localhost:8000"
        );
        assert_eq!(
            config.string("database.url").as_deref(),
            Some("jdbc:hsqldb:file:.hsql/db")
        );
    }

    #[test]
    fn test_bool_or_false() {
        let config = source(&[
            ("a", "true"),
            ("b", " YES "),
            ("c", "false"),
            ("d", "maybe"),
            ("e", "1"),
            ("f", "on"),
        ]);
        assert!(config.bool_or_false("a"));
        assert!(config.bool_or_false("b"));
        assert!(!config.bool_or_false("c"));
        assert!(!config.bool_or_false("d"));
        assert!(!config.bool_or_false("e"));
        assert!(!config.bool_or_false("f"));
        assert!(!config.bool_or_false("missing"));
    }

    #[test]
    fn test_hash_map_source() {
        let mut config = HashMap::new();
        config.insert("auth.server.base.uri".to_string(), "http://auth:8081".to_string());
        assert_eq!(
            config.string("auth.server.base.uri").as_deref(),
            Some("http://auth:8081")
        );
        assert!(config.string("listen.url").is_none());
    }
}
