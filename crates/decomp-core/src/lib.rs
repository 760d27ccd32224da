//! DTO and mapper synthesis engine.
//!
//! Given a catalog of declared types, synthesizes for any local type a
//! boundary-friendly DTO and a bidirectional mapper contract. All state of a
//! run lives in a [`SynthesisContext`]; the [`Synthesizer`] itself only holds
//! borrowed, read-only collaborators.

pub mod api;
pub mod classify;
pub mod context;
pub mod describe;
pub mod dto;
pub mod error;
pub mod mapper;
#[cfg(any(test, feature = "runtime"))]
pub mod runtime;
pub mod stmt;
pub mod trace;

use crate::trace::{SynthesisEvent, SynthesisTraceSink};
use decomp_config::DecompConfig;
use decomp_schema::model::TypeModel;

// re-exports
pub use context::{SynthesisContext, SynthesisRun};
pub use error::SynthesisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        Synthesizer,
        classify::{FieldType, Origin},
        context::{SynthesisContext, SynthesisRun},
        describe::{ClassDescriptor, Field},
        dto::{DtoDefinition, DtoField, FieldStrategy, Synthesized},
        error::SynthesisError,
        mapper::{Direction, MapperDefinition},
        trace::{SynthesisEvent, SynthesisTraceSink},
    };
}

///
/// Synthesizer
///
/// Borrowed collaborators for synthesis: the type model, configuration and an
/// optional trace sink. Cheap to copy; one instance may drive any number of
/// independent contexts.
///

#[derive(Clone, Copy)]
pub struct Synthesizer<'a> {
    model: &'a dyn TypeModel,
    config: &'a DecompConfig,
    trace: Option<&'a dyn SynthesisTraceSink>,
}

impl<'a> Synthesizer<'a> {
    #[must_use]
    pub const fn new(model: &'a dyn TypeModel, config: &'a DecompConfig) -> Self {
        Self {
            model,
            config,
            trace: None,
        }
    }

    #[must_use]
    pub const fn with_trace(mut self, sink: &'a dyn SynthesisTraceSink) -> Self {
        self.trace = Some(sink);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &'a DecompConfig {
        self.config
    }

    #[must_use]
    pub const fn model(&self) -> &'a dyn TypeModel {
        self.model
    }

    fn emit(&self, event: SynthesisEvent) {
        if let Some(sink) = self.trace {
            sink.on_event(event);
        }
    }
}
