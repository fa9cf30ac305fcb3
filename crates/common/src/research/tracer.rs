//! Append-only trace of a research run

use crate::metrics;
use crate::models::{ResearchStep, StepType};
use chrono::Utc;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};

/// Accumulates step records in execution order
#[derive(Debug, Default)]
pub struct StepTracer {
    steps: Vec<ResearchStep>,
}

impl StepTracer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step that began at `started` and ends now.
    ///
    /// `input` and `output` are expected to be JSON objects; any other value
    /// is stored under a `value` key.
    pub fn record(&mut self, step_type: StepType, input: Value, output: Value, started: Instant) {
        self.record_elapsed(step_type, input, output, started.elapsed());
    }

    /// Append a step whose duration was measured by the caller
    pub fn record_elapsed(&mut self, step_type: StepType, input: Value, output: Value, elapsed: Duration) {
        let duration_ms = elapsed.as_millis() as u64;

        metrics::record_step(step_type.as_str(), elapsed.as_secs_f64());
        tracing::debug!(step_type = %step_type, duration_ms, index = self.steps.len(), "Step recorded");

        self.steps.push(ResearchStep {
            step_type,
            input_data: into_object(input),
            output_data: into_object(output),
            timestamp: Utc::now(),
            duration_ms,
        });
    }

    pub fn steps(&self) -> &[ResearchStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of recorded steps of one type
    pub fn into_steps(self) -> Vec<ResearchStep> {
        self.steps
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_steps_keep_execution_order() {
        let mut tracer = StepTracer::new();
        assert!(tracer.is_empty());

        let started = Instant::now();
        tracer.record(StepType::Search, json!({"query": "q", "source": "websearch"}), json!({"results_count": 5}), started);
        tracer.record(StepType::Search, json!({"query": "q", "source": "mcp"}), json!({"results_count": 3}), started);
        tracer.record(StepType::Analysis, json!({"prompt": "p"}), json!({"analysis": "a"}), started);

        assert_eq!(tracer.len(), 3);
        assert_eq!(tracer.steps()[1].input_data["source"], json!("mcp"));

        let steps = tracer.into_steps();
        assert_eq!(steps[2].step_type, StepType::Analysis);
        assert!(steps[0].timestamp <= steps[2].timestamp);
    }

    #[test]
    fn test_non_object_payloads_are_wrapped() {
        let mut tracer = StepTracer::new();
        tracer.record(StepType::Fetch, json!("doc_1"), Value::Null, Instant::now());

        let step = &tracer.steps()[0];
        assert_eq!(step.input_data["value"], json!("doc_1"));
        assert!(step.output_data.is_empty());
    }

    #[test]
    fn test_caller_measured_duration() {
        let mut tracer = StepTracer::new();
        tracer.record_elapsed(StepType::Search, json!({}), json!({}), Duration::from_millis(1250));
        assert_eq!(tracer.steps()[0].duration_ms, 1250);
    }
}
