use crate::{Error, TracingSink, load_catalog};
use decomp_config::DecompConfig;
use decomp_core::{
    SynthesisContext, SynthesisError, SynthesisRun, Synthesizer, dto::Synthesized,
    trace::SynthesisTraceSink,
};
use decomp_schema::{catalog::TypeCatalog, model::TypeModel};
use serde::Serialize;
use std::path::Path;

///
/// Decomp
///
/// A loaded catalog together with the configuration synthesis runs under.
///

#[derive(Clone, Debug)]
pub struct Decomp {
    catalog: TypeCatalog,
    config: DecompConfig,
}

impl Decomp {
    #[must_use]
    pub const fn new(catalog: TypeCatalog, config: DecompConfig) -> Self {
        Self { catalog, config }
    }

    /// Load a catalog file and, when given, a configuration file.
    pub fn open(catalog: impl AsRef<Path>, config: Option<&Path>) -> Result<Self, Error> {
        let catalog = load_catalog(catalog)?;
        let config = match config {
            Some(path) => DecompConfig::load(path)?,
            None => DecompConfig::default(),
        };

        Ok(Self::new(catalog, config))
    }

    #[must_use]
    pub const fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &DecompConfig {
        &self.config
    }

    /// Synthesize every requested type in one run, reporting events to
    /// `tracing`.
    #[must_use]
    pub fn synthesize<'n>(
        &self,
        names: impl IntoIterator<Item = &'n str>,
        target_package: &str,
    ) -> Batch {
        self.synthesize_with(names, target_package, &TracingSink)
    }

    /// Synthesize every requested type in one run with a caller-supplied
    /// sink. A failing request never aborts the rest of the batch.
    #[must_use]
    pub fn synthesize_with<'n>(
        &self,
        names: impl IntoIterator<Item = &'n str>,
        target_package: &str,
        sink: &dyn SynthesisTraceSink,
    ) -> Batch {
        let synth = Synthesizer::new(&self.catalog, &self.config).with_trace(sink);
        let mut ctx = SynthesisContext::new();

        let entries = synth
            .synthesize_all(&mut ctx, names, target_package)
            .into_iter()
            .map(|(name, result)| BatchEntry { name, result })
            .collect::<Vec<_>>();

        let failed = entries.iter().filter(|e| e.result.is_err()).count();
        tracing::debug!(
            target: "decomp",
            requested = entries.len(),
            failed,
            "synthesis batch finished"
        );

        Batch {
            entries,
            run: ctx.finish(),
        }
    }

    /// Synthesize every local type whose instances carry state, in name order.
    #[must_use]
    pub fn synthesize_local(&self, target_package: &str) -> Batch {
        let names = self
            .catalog
            .type_names()
            .filter(|name| {
                self.catalog
                    .declaration(name)
                    .is_some_and(|decl| decl.kind.has_instance_state())
            })
            .collect::<Vec<_>>();

        self.synthesize(names, target_package)
    }
}

///
/// BatchEntry
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchEntry {
    pub name: String,
    pub result: Result<Synthesized, SynthesisError>,
}

///
/// Batch
/// per-request results plus the frozen run they share
///

#[derive(Debug)]
pub struct Batch {
    pub entries: Vec<BatchEntry>,
    pub run: SynthesisRun,
}

impl Batch {
    /// Successful requests in request order.
    pub fn succeeded(&self) -> impl Iterator<Item = (&str, &Synthesized)> {
        self.entries
            .iter()
            .filter_map(|e| e.result.as_ref().ok().map(|s| (e.name.as_str(), s)))
    }

    /// Failed requests in request order.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &SynthesisError)> {
        self.entries
            .iter()
            .filter_map(|e| e.result.as_ref().err().map(|err| (e.name.as_str(), err)))
    }

    pub fn summary(&self) -> Result<BatchSummary, Error> {
        Ok(BatchSummary {
            requested: self.entries.len(),
            synthesized: self.succeeded().count(),
            failures: self
                .failures()
                .map(|(name, err)| (name.to_string(), err.to_string()))
                .collect(),
            dtos: self.run.dtos().count(),
            mappers: self.run.mappers().count(),
            fingerprint: self.run.fingerprint()?,
        })
    }
}

///
/// BatchSummary
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BatchSummary {
    pub requested: usize,
    pub synthesized: usize,
    pub failures: Vec<(String, String)>,
    pub dtos: usize,
    pub mappers: usize,
    pub fingerprint: String,
}
