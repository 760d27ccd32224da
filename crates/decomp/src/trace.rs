use decomp_core::trace::{SynthesisEvent, SynthesisTraceSink};

///
/// TracingSink
/// forwards synthesis events to `tracing` at debug level
///

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl SynthesisTraceSink for TracingSink {
    fn on_event(&self, event: SynthesisEvent) {
        match event {
            SynthesisEvent::Classified {
                key,
                origin,
                serializable,
            } => {
                tracing::debug!(target: "decomp::classify", %key, %origin, serializable, "classified");
            }
            SynthesisEvent::DtoStarted { dto, source } => {
                tracing::debug!(target: "decomp::dto", %dto, %source, "dto started");
            }
            SynthesisEvent::FieldPlanned {
                dto,
                field,
                strategy,
            } => {
                tracing::debug!(target: "decomp::dto", %dto, %field, %strategy, "field planned");
            }
            SynthesisEvent::CodecCreated {
                mapper,
                key,
                serialize,
                deserialize,
            } => {
                tracing::debug!(
                    target: "decomp::mapper",
                    %mapper,
                    %key,
                    %serialize,
                    %deserialize,
                    "codec created"
                );
            }
            SynthesisEvent::DtoFinished { dto, fields } => {
                tracing::debug!(target: "decomp::dto", %dto, fields, "dto finished");
            }
            SynthesisEvent::DtoAbandoned { dto, reason } => {
                tracing::debug!(target: "decomp::dto", %dto, %reason, "dto abandoned");
            }
            other => tracing::debug!(target: "decomp", event = ?other),
        }
    }
}
