//! Selection of the parse/serialize binding for a format and version

use fhirgate_engine::{
    EngineResult, FhirEngine, FhirVersion, ParseMode, ParsedResource, Resource, ResourceFormat,
};
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};

/// Parses one input format for one FHIR version.
///
/// Implementations are shared by all in-flight requests and must not keep
/// per-call state.
pub trait FormatBinding: Send + Sync {
    fn format(&self) -> ResourceFormat;

    fn version(&self) -> FhirVersion;

    fn parse(&self, content: &str, mode: ParseMode) -> EngineResult<ParsedResource>;

    /// Write a resource in any format; `target` need not match [`Self::format`]
    fn serialize(
        &self,
        resource: &Resource,
        target: ResourceFormat,
        pretty: bool,
    ) -> EngineResult<String>;
}

/// Binding backed by the built-in engine
pub struct EngineBinding {
    engine: Arc<FhirEngine>,
    format: ResourceFormat,
}

impl EngineBinding {
    pub fn new(engine: Arc<FhirEngine>, format: ResourceFormat) -> Self {
        Self { engine, format }
    }
}

impl FormatBinding for EngineBinding {
    fn format(&self) -> ResourceFormat {
        self.format
    }

    fn version(&self) -> FhirVersion {
        self.engine.version()
    }

    fn parse(&self, content: &str, mode: ParseMode) -> EngineResult<ParsedResource> {
        self.engine.parse(content, self.format, mode)
    }

    fn serialize(
        &self,
        resource: &Resource,
        target: ResourceFormat,
        pretty: bool,
    ) -> EngineResult<String> {
        self.engine.serialize(resource, target, pretty)
    }
}

const SLOTS: [(ResourceFormat, FhirVersion); 4] = [
    (ResourceFormat::Json, FhirVersion::R4),
    (ResourceFormat::Json, FhirVersion::R5),
    (ResourceFormat::Xml, FhirVersion::R4),
    (ResourceFormat::Xml, FhirVersion::R5),
];

fn slot(format: ResourceFormat, version: FhirVersion) -> usize {
    match (format, version) {
        (ResourceFormat::Json, FhirVersion::R4) => 0,
        (ResourceFormat::Json, FhirVersion::R5) => 1,
        (ResourceFormat::Xml, FhirVersion::R4) => 2,
        (ResourceFormat::Xml, FhirVersion::R5) => 3,
    }
}

/// Holds a binding for every format and version pair.
///
/// Completeness is checked when the dispatcher is built, so lookups on the
/// request path cannot fail.
#[derive(Clone)]
pub struct Dispatcher {
    bindings: Vec<Arc<dyn FormatBinding>>,
}

impl Dispatcher {
    /// Dispatcher over the built-in engine for all supported versions
    pub fn new() -> CoreResult<Self> {
        Self::builder().with_engines()?.build()
    }

    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    pub fn binding(&self, format: ResourceFormat, version: FhirVersion) -> &dyn FormatBinding {
        self.bindings[slot(format, version)].as_ref()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("bindings", &self.bindings.len())
            .finish()
    }
}

#[derive(Default)]
pub struct DispatcherBuilder {
    slots: [Option<Arc<dyn FormatBinding>>; 4],
}

impl DispatcherBuilder {
    /// Register engine bindings for both formats of every supported version
    pub fn with_engines(mut self) -> CoreResult<Self> {
        for version in FhirVersion::ALL {
            let engine = FhirEngine::new(version)
                .map_err(|e| CoreError::engine_unavailable(version, &e))?;
            let engine = Arc::new(engine);
            for format in ResourceFormat::ALL {
                self = self.binding(Arc::new(EngineBinding::new(engine.clone(), format)));
            }
        }
        Ok(self)
    }

    /// Register a binding, replacing any earlier one for the same pair
    pub fn binding(mut self, binding: Arc<dyn FormatBinding>) -> Self {
        let index = slot(binding.format(), binding.version());
        self.slots[index] = Some(binding);
        self
    }

    pub fn build(self) -> CoreResult<Dispatcher> {
        let mut bindings = Vec::with_capacity(SLOTS.len());
        for ((format, version), binding) in SLOTS.into_iter().zip(self.slots) {
            let binding = binding.ok_or_else(|| {
                CoreError::unsupported(format, version, "no binding registered")
            })?;
            bindings.push(binding);
        }
        tracing::debug!(bindings = bindings.len(), "Dispatcher ready");
        Ok(Dispatcher { bindings })
    }
}
