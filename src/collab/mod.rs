//! Collaborator seams — contracts for the external systems that sit
//! around the core (process monitoring, event logging, availability
//! probes). The core never depends on their behavior beyond these
//! traits; the provided implementations are inert.

use serde_json::Value;
use tracing::debug;

/// Reports whether a named process is alive and can ask for a restart.
/// Restart requests are fire-and-forget; no success guarantee is returned.
pub trait ProcessMonitor {
    fn is_alive(&self, process_name: &str) -> bool;
    fn request_restart(&self, process_name: &str);
}

/// Receives `(event_type, source, data)` notifications. No return value.
pub trait EventSink {
    fn notify(&self, event_type: &str, source: &str, data: &Value);
}

/// A generic external system whose only contract is availability.
pub trait ExternalSystem {
    fn is_available(&self) -> bool;
}

/// Process monitor that sees no processes and restarts nothing.
pub struct NoopProcessMonitor;

impl ProcessMonitor for NoopProcessMonitor {
    fn is_alive(&self, _process_name: &str) -> bool {
        false
    }

    fn request_restart(&self, _process_name: &str) {}
}

/// Event sink that drops every notification.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn notify(&self, _event_type: &str, _source: &str, _data: &Value) {}
}

/// Event sink that forwards notifications to the tracing subscriber.
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn notify(&self, event_type: &str, source: &str, data: &Value) {
        debug!("event '{}' from {}: {}", event_type, source, data);
    }
}

/// An external system that is never available.
pub struct AbsentSystem;

impl ExternalSystem for AbsentSystem {
    fn is_available(&self) -> bool {
        false
    }
}
