//! Synthesis tracing boundary.
//!
//! Tracing is optional, injected by the caller, and must not affect synthesis
//! results.

use crate::classify::Origin;
use derive_more::Display;
use std::sync::Mutex;

///
/// SynthesisTraceSink
///

pub trait SynthesisTraceSink: Send + Sync {
    fn on_event(&self, event: SynthesisEvent);
}

///
/// StrategyKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum StrategyKind {
    PassThrough,
    Nested,
    Opaque,
}

///
/// SynthesisEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SynthesisEvent {
    Classified {
        key: String,
        origin: Origin,
        serializable: bool,
    },
    ClassificationReused {
        key: String,
    },
    Described {
        type_name: String,
        fields: usize,
    },
    DtoStarted {
        dto: String,
        source: String,
    },
    DtoReused {
        dto: String,
        pending: bool,
    },
    FieldPlanned {
        dto: String,
        field: String,
        strategy: StrategyKind,
    },
    MapperCreated {
        mapper: String,
        dto: String,
    },
    UsedMapperAdded {
        mapper: String,
        used: String,
    },
    CodecCreated {
        mapper: String,
        key: String,
        serialize: String,
        deserialize: String,
    },
    CodecReused {
        mapper: String,
        key: String,
    },
    DtoFinished {
        dto: String,
        fields: usize,
    },
    DtoAbandoned {
        dto: String,
        reason: String,
    },
}

///
/// RecordingSink
/// keeps every event in order; useful for diagnostics and tests
///

#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SynthesisEvent>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all recorded events, leaving the sink empty.
    pub fn take(&self) -> Vec<SynthesisEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }
}

impl SynthesisTraceSink for RecordingSink {
    fn on_event(&self, event: SynthesisEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
