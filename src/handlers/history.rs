//! Threat observers and the bounded threat history.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{ShieldConfig, DEFAULT_HISTORY_CAPACITY};
use crate::detector::{DetectionResult, RiskLevel, ThreatType};
use crate::sanitizer::escape_sql;

/// Characters of input kept in an event preview
const PREVIEW_CHARS: usize = 64;

/// Preview recorded for sensitive fields
pub const REDACTED_PREVIEW: &str = "[redacted]";

/// One unsafe input seen by a guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreatEvent {
    /// Field name, when known
    pub field: Option<String>,
    /// Escaped, truncated copy of the input
    pub input_preview: String,
    /// Aggregate risk
    pub risk_level: RiskLevel,
    /// Number of findings
    pub threat_count: usize,
    /// Distinct finding types, in first-seen order
    pub threat_types: Vec<ThreatType>,
    /// When the event was recorded
    pub at: DateTime<Utc>,
}

impl ThreatEvent {
    /// Build an event from a detection result
    pub fn new(field: Option<&str>, input: &str, detection: &DetectionResult) -> Self {
        let head: String = input.chars().take(PREVIEW_CHARS).collect();
        Self::with_preview(field, escape_sql(&head), detection)
    }

    /// Build an event that carries no part of the input
    pub fn redacted(field: Option<&str>, detection: &DetectionResult) -> Self {
        Self::with_preview(field, REDACTED_PREVIEW.to_string(), detection)
    }

    fn with_preview(field: Option<&str>, input_preview: String, detection: &DetectionResult) -> Self {
        let mut threat_types = Vec::new();
        for threat in &detection.threats {
            if !threat_types.contains(&threat.threat_type) {
                threat_types.push(threat.threat_type);
            }
        }

        Self {
            field: field.map(str::to_string),
            input_preview,
            risk_level: detection.risk_level,
            threat_count: detection.threats.len(),
            threat_types,
            at: Utc::now(),
        }
    }
}

/// Receives threat events from guards and handlers
pub trait ThreatObserver: Send + Sync {
    /// Called once per unsafe input
    fn on_threat(&self, event: &ThreatEvent);
}

impl<F> ThreatObserver for F
where
    F: Fn(&ThreatEvent) + Send + Sync,
{
    fn on_threat(&self, event: &ThreatEvent) {
        self(event);
    }
}

/// Counts by risk level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistorySummary {
    /// Events held
    pub total: usize,
    /// High-risk events
    pub high: usize,
    /// Medium-risk events
    pub medium: usize,
    /// Low-risk events
    pub low: usize,
}

/// Thread-safe ring buffer of the most recent threat events
#[derive(Debug)]
pub struct ThreatHistory {
    capacity: usize,
    events: Mutex<VecDeque<ThreatEvent>>,
}

impl Default for ThreatHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ThreatHistory {
    /// Create a history keeping at most `capacity` events
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Create a history sized by the configured capacity
    pub fn from_config(config: &ShieldConfig) -> Self {
        Self::new(config.history_capacity)
    }

    /// Maximum events held
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an event, evicting the oldest when full
    pub fn record(&self, event: ThreatEvent) {
        if self.capacity == 0 {
            return;
        }
        if let Ok(mut events) = self.events.lock() {
            if events.len() == self.capacity {
                events.pop_front();
            }
            events.push_back(event);
        }
    }

    /// Up to `n` most recent events, newest first
    pub fn recent(&self, n: usize) -> Vec<ThreatEvent> {
        self.events
            .lock()
            .map(|events| events.iter().rev().take(n).cloned().collect())
            .unwrap_or_default()
    }

    /// Events held
    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    /// True when no events are held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all events
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }

    /// Counts by risk level
    pub fn summary(&self) -> HistorySummary {
        let mut summary = HistorySummary::default();
        if let Ok(events) = self.events.lock() {
            for event in events.iter() {
                summary.total += 1;
                match event.risk_level {
                    RiskLevel::High => summary.high += 1,
                    RiskLevel::Medium => summary.medium += 1,
                    RiskLevel::Low => summary.low += 1,
                    RiskLevel::None => {},
                }
            }
        }
        summary
    }
}

impl ThreatObserver for ThreatHistory {
    fn on_threat(&self, event: &ThreatEvent) {
        self.record(event.clone());
    }
}
