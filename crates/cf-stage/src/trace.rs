//! SpinTrace — The complete event timeline of one spin
//!
//! A trace captures everything a render sink saw, in order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{SpinEvent, SpinEventKind};
use crate::stage::SpinPhase;

/// A complete trace of spin events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinTrace {
    /// Unique identifier for this trace
    pub trace_id: String,

    /// Case identifier the spin was opened for
    #[serde(default)]
    pub case_id: Option<String>,

    /// All events in chronological order
    pub events: Vec<SpinEvent>,

    /// When this trace was recorded
    pub recorded_at: DateTime<Utc>,

    /// Custom metadata
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl SpinTrace {
    /// Create a new empty trace
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            case_id: None,
            events: Vec::new(),
            recorded_at: Utc::now(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Set case ID
    pub fn with_case(mut self, case_id: impl Into<String>) -> Self {
        self.case_id = Some(case_id.into());
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn push(&mut self, event: SpinEvent) {
        self.events.push(event);
    }

    /// Record an event at a timestamp
    pub fn record(&mut self, kind: SpinEventKind, timestamp_ms: f64) {
        self.events.push(SpinEvent::new(kind, timestamp_ms));
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Get total duration in milliseconds
    pub fn duration_ms(&self) -> f64 {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0.0,
        }
    }

    /// Get events by type name
    pub fn events_by_type(&self, type_name: &str) -> Vec<&SpinEvent> {
        self.events
            .iter()
            .filter(|e| e.type_name() == type_name)
            .collect()
    }

    pub fn has_event(&self, type_name: &str) -> bool {
        self.events.iter().any(|e| e.type_name() == type_name)
    }

    /// Phases entered, in order
    pub fn phases(&self) -> Vec<SpinPhase> {
        self.events
            .iter()
            .filter_map(|e| match e.kind {
                SpinEventKind::PhaseChanged { to, .. } => Some(to),
                _ => None,
            })
            .collect()
    }

    pub fn frame_count(&self) -> usize {
        self.events_by_type("frame").len()
    }

    /// Offset of the last rendered frame
    pub fn final_offset(&self) -> Option<f64> {
        self.events.iter().rev().find_map(|e| match e.kind {
            SpinEventKind::Frame { offset, .. } => Some(offset),
            _ => None,
        })
    }

    /// Index reported by the settle read-back
    pub fn settled_index(&self) -> Option<usize> {
        self.events.iter().rev().find_map(|e| match e.kind {
            SpinEventKind::Settled { centered } => centered,
            _ => None,
        })
    }

    /// Name of the emitted item, if the spin resolved
    pub fn resolved_item(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|e| match &e.kind {
            SpinEventKind::Resolved { item, .. } => Some(item.as_str()),
            _ => None,
        })
    }

    /// Validate trace has the required lifecycle
    pub fn validate(&self) -> TraceValidation {
        let phases = self.phases();
        let ordered = phases
            .windows(2)
            .all(|pair| pair[0].can_transition_to(pair[1]));
        let resolved = self.events_by_type("resolved");

        TraceValidation {
            has_sequence: self.has_event("sequence_built"),
            phases_ordered: ordered,
            reached_done: phases.last() == Some(&SpinPhase::Done),
            was_abandoned: self.has_event("abandoned"),
            resolved_count: resolved.len(),
            monotonic_time: self
                .events
                .windows(2)
                .all(|pair| pair[1].timestamp_ms >= pair[0].timestamp_ms),
        }
    }

    /// Get summary of trace
    pub fn summary(&self) -> TraceSummary {
        TraceSummary {
            trace_id: self.trace_id.clone(),
            case_id: self.case_id.clone(),
            event_count: self.events.len(),
            frame_count: self.frame_count(),
            duration_ms: self.duration_ms(),
            settled_index: self.settled_index(),
            resolved_item: self.resolved_item().map(str::to_string),
        }
    }
}

/// Validation result for a trace
#[derive(Debug, Clone, Default)]
pub struct TraceValidation {
    pub has_sequence: bool,
    pub phases_ordered: bool,
    pub reached_done: bool,
    pub was_abandoned: bool,
    pub resolved_count: usize,
    pub monotonic_time: bool,
}

impl TraceValidation {
    /// A valid trace built its reel, moved legally between phases and
    /// resolved exactly once.
    pub fn is_valid(&self) -> bool {
        self.has_sequence
            && self.phases_ordered
            && self.monotonic_time
            && self.resolved_count == 1
            && (self.reached_done || self.was_abandoned)
    }

    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();

        if !self.has_sequence {
            warnings.push("Missing SEQUENCE_BUILT event");
        }
        if !self.phases_ordered {
            warnings.push("Phases out of order");
        }
        if !self.monotonic_time {
            warnings.push("Timestamps go backwards");
        }
        if self.resolved_count == 0 {
            warnings.push("Spin never resolved");
        }
        if self.resolved_count > 1 {
            warnings.push("Spin resolved more than once");
        }
        if !self.reached_done && !self.was_abandoned {
            warnings.push("Spin neither finished nor abandoned");
        }

        warnings
    }
}

/// Summary of a trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSummary {
    pub trace_id: String,
    pub case_id: Option<String>,
    pub event_count: usize,
    pub frame_count: usize,
    pub duration_ms: f64,
    pub settled_index: Option<usize>,
    pub resolved_item: Option<String>,
}
