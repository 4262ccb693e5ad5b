use crate::model::Fields;

use serde_json::Value;

/// Ambient key-value pairs travelling with a unit of work (request id, user,
/// job name...). Only keys the [`Logger`](crate::Logger) was told about are
/// copied into records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogContext {
  values: Fields,
}

impl LogContext {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns a copy of this context with `key` set.
  pub fn with(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    let mut next = self.clone();
    next.values.insert(key.into(), value.into());
    next
  }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
    self.values.insert(key.into(), value.into());
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.values.get(key)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn with_leaves_parent_untouched() {
    let parent = LogContext::new().with("request_id", "r-1");
    let child = parent.with("user", 42);
    assert!(parent.get("user").is_none());
    assert_eq!(child.get("request_id"), Some(&json!("r-1")));
    assert_eq!(child.get("user"), Some(&json!(42)));
  }
}
