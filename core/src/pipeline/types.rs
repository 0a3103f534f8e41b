use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single run input: free text or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Text(String),
    List(Vec<String>),
}

impl InputValue {
    /// Text substituted into templates; list items are joined by `", "`.
    pub fn render(&self) -> String {
        match self {
            InputValue::Text(s) => s.clone(),
            InputValue::List(items) => items.join(", "),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            InputValue::Text(s) => s.trim().is_empty(),
            InputValue::List(items) => items.iter().all(|s| s.trim().is_empty()),
        }
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        InputValue::Text(s.to_string())
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        InputValue::Text(s)
    }
}

impl From<Vec<String>> for InputValue {
    fn from(items: Vec<String>) -> Self {
        InputValue::List(items)
    }
}

/// Placeholder name -> value mapping for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inputs(BTreeMap<String, InputValue>);

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<InputValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&InputValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &InputValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Output of one task within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub task_id: String,
    pub raw_text: String,
    pub rendered_at: DateTime<Utc>,
}

impl ExecutionResult {
    pub fn new(task_id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            raw_text: raw_text.into(),
            rendered_at: Utc::now(),
        }
    }
}

/// A task after placeholder substitution, as handed to its agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTask {
    pub task_id: String,
    pub description: String,
    pub expected_output: String,
}

/// Record of a completed pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    pub run_id: String,
    pub inputs: Inputs,
    pub results: Vec<ExecutionResult>,
    pub final_output: String,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_renders_comma_joined() {
        let v = InputValue::List(vec!["Tokyo".into(), "Kyoto".into()]);
        assert_eq!(v.render(), "Tokyo, Kyoto");
        assert!(!v.is_blank());
        assert!(InputValue::List(vec![]).is_blank());
        assert!(InputValue::List(vec!["  ".into()]).is_blank());
        assert!(InputValue::Text(" \t".into()).is_blank());
    }

    #[test]
    fn test_inputs_deserialize_untagged() {
        let inputs: Inputs =
            serde_json::from_str(r#"{"origin": "Singapore", "cities": ["Tokyo", "Kyoto"]}"#)
                .unwrap();
        assert_eq!(inputs.get("origin"), Some(&InputValue::Text("Singapore".into())));
        assert_eq!(
            inputs.get("cities").map(InputValue::render).as_deref(),
            Some("Tokyo, Kyoto")
        );
    }
}
