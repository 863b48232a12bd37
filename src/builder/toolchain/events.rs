//! Toolchain change notifications.
//!
//! Toolchains do not know who stores them. Whoever does attaches a
//! [`ToolchainObserver`] and receives a [`ToolchainEvent`] for every
//! accepted mutation.

use std::sync::mpsc::Sender;
use std::sync::Mutex;

use serde::Serialize;

use crate::core::detection::Detection;

/// A change to a toolchain.
///
/// Events carry everything needed to act on them; no lookup of the
/// toolchain is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason")]
pub enum ToolchainEvent {
    /// The display name changed.
    #[serde(rename = "display-name-changed")]
    DisplayNameChanged {
        /// Instance id
        id: String,
        /// Type id
        type_id: String,
        /// Effective display name after the change
        display_name: String,
    },

    /// The detection provenance changed.
    #[serde(rename = "detection-changed")]
    DetectionChanged {
        /// Instance id
        id: String,
        /// Type id
        type_id: String,
        /// New provenance
        detection: Detection,
    },

    /// A kind-specific setting (e.g., the compiler path) changed.
    #[serde(rename = "configuration-changed")]
    ConfigurationChanged {
        /// Instance id
        id: String,
        /// Type id
        type_id: String,
    },
}

impl ToolchainEvent {
    /// Instance id of the changed toolchain.
    pub fn id(&self) -> &str {
        match self {
            ToolchainEvent::DisplayNameChanged { id, .. }
            | ToolchainEvent::DetectionChanged { id, .. }
            | ToolchainEvent::ConfigurationChanged { id, .. } => id,
        }
    }

    /// Type id of the changed toolchain.
    pub fn type_id(&self) -> &str {
        match self {
            ToolchainEvent::DisplayNameChanged { type_id, .. }
            | ToolchainEvent::DetectionChanged { type_id, .. }
            | ToolchainEvent::ConfigurationChanged { type_id, .. } => type_id,
        }
    }
}

/// Receiver of toolchain change notifications.
pub trait ToolchainObserver: Send + Sync {
    /// Called once for every accepted mutation.
    fn notify_update(&self, event: &ToolchainEvent);
}

impl ToolchainObserver for Sender<ToolchainEvent> {
    fn notify_update(&self, event: &ToolchainEvent) {
        // A dropped receiver means nobody is listening any more.
        let _ = self.send(event.clone());
    }
}

/// Observer that records every event it receives.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<ToolchainEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far, oldest first.
    pub fn events(&self) -> Vec<ToolchainEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ToolchainObserver for EventLog {
    fn notify_update(&self, event: &ToolchainEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}

/// Observer that logs every event at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ToolchainObserver for TracingObserver {
    fn notify_update(&self, event: &ToolchainEvent) {
        tracing::debug!("toolchain {} ({}) updated: {:?}", event.id(), event.type_id(), event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renamed(name: &str) -> ToolchainEvent {
        ToolchainEvent::DisplayNameChanged {
            id: "{1}".into(),
            type_id: "gcc".into(),
            display_name: name.into(),
        }
    }

    #[test]
    fn test_event_log_records_in_order() {
        let log = EventLog::new();
        assert!(log.is_empty());

        log.notify_update(&renamed("a"));
        log.notify_update(&renamed("b"));

        assert_eq!(log.events(), vec![renamed("a"), renamed("b")]);
    }

    #[test]
    fn test_channel_observer() {
        let (tx, rx) = std::sync::mpsc::channel();
        tx.notify_update(&renamed("a"));
        assert_eq!(rx.recv().unwrap(), renamed("a"));

        drop(rx);
        tx.notify_update(&renamed("b"));
    }

    #[test]
    fn test_event_json() {
        let json = serde_json::to_string(&ToolchainEvent::DetectionChanged {
            id: "{1}".into(),
            type_id: "clang".into(),
            detection: Detection::Auto,
        })
        .unwrap();
        assert!(json.contains("\"reason\":\"detection-changed\""));
        assert!(json.contains("\"detection\":\"auto\""));
    }
}
