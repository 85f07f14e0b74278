use serde_json::{Map, Value, json};
use std::time::Duration;

/// Viewer configuration as a JSON object with dotted-path access.
///
/// `ViewerConfig::default()` carries the built-in defaults; user overrides are layered on top
/// with [`ViewerConfig::deep_merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig(Value);

impl Default for ViewerConfig {
    fn default() -> Self {
        Self(default_config_value())
    }
}

pub fn default_config_value() -> Value {
    json!({
        "canvas": { "width": 800.0, "height": 600.0 },
        "force": {
            "gravity": 0.05,
            "charge": -180.0,
            "linkDistance": 130.0,
            "linkStrength": 1.0,
            "friction": 0.9,
            "seed": 1
        },
        "perspective": { "skewX": -25.0, "scaleY": 0.6, "padding": 50.0 },
        "tunnel": { "curveMagnitude": 30.0 },
        "logical": { "colorSeed": 42 },
        "cache": { "freshnessMs": 2000 }
    })
}

impl ViewerConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Defaults with `overrides` merged on top.
    pub fn with_overrides(overrides: &Value) -> Self {
        let mut cfg = Self::default();
        cfg.deep_merge(overrides);
        cfg
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn get(&self, dotted_path: &str) -> Option<&Value> {
        let mut cur = &self.0;
        for segment in dotted_path.split('.') {
            cur = cur.as_object()?.get(segment)?;
        }
        Some(cur)
    }

    pub fn get_str(&self, dotted_path: &str) -> Option<&str> {
        self.get(dotted_path)?.as_str()
    }

    pub fn get_bool(&self, dotted_path: &str) -> Option<bool> {
        self.get(dotted_path)?.as_bool()
    }

    pub fn get_f64(&self, dotted_path: &str) -> Option<f64> {
        self.get(dotted_path)?.as_f64()
    }

    pub fn get_u64(&self, dotted_path: &str) -> Option<u64> {
        self.get(dotted_path)?.as_u64()
    }

    pub fn set_value(&mut self, dotted_path: &str, value: Value) {
        // Configs are objects; coerce anything else so this never panics on user input.
        if !self.0.is_object() {
            self.0 = Value::Object(Map::new());
        }

        let Value::Object(ref mut root) = self.0 else {
            return;
        };
        let mut cur: &mut Map<String, Value> = root;
        let mut segments = dotted_path.split('.').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_none() {
                cur.insert(seg.to_string(), value);
                return;
            }
            let slot = cur.entry(seg).or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(next) = slot.as_object_mut() else {
                return;
            };
            cur = next;
        }
    }

    pub fn deep_merge(&mut self, other: &Value) {
        deep_merge_value(&mut self.0, other);
    }

    pub fn cache_options(&self) -> CacheOptions {
        let defaults = CacheOptions::default();
        CacheOptions {
            freshness: self
                .get_u64("cache.freshnessMs")
                .map(Duration::from_millis)
                .unwrap_or(defaults.freshness),
        }
    }
}

fn deep_merge_value(base: &mut Value, incoming: &Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(in_map)) => {
            for (key, in_value) in in_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge_value(base_value, in_value),
                    None => {
                        base_map.insert(key.clone(), in_value.clone());
                    }
                }
            }
        }
        (base_slot, in_value) => {
            *base_slot = in_value.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// How long a fetched payload is served from the cache before it is fetched again.
    pub freshness: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            freshness: Duration::from_millis(2000),
        }
    }
}
