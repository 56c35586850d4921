use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::error_code::InterceptorErrors;
use crate::interceptor::builtin;
use crate::interceptor::chain::InterceptorChain;
use crate::interceptor::lifecycle::ManagedInterceptor;
use crate::interceptor::Interceptor;
use crate::stage_error::{Param, StageError};

/// Creates a fresh interceptor instance per activation
pub type InterceptorFactory = Arc<dyn Fn() -> Box<dyn Interceptor> + Send + Sync>;

/// A hidden interceptor as declared in host configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterceptorDefinition {
    /// Registered interceptor name
    pub name: String,
    /// Optional requirement on the registered version, e.g. `^1.2`
    #[serde(default)]
    pub version: Option<VersionReq>,
    /// Parameters handed to `init`
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

impl InterceptorDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            parameters: HashMap::new(),
        }
    }

    pub fn with_version(mut self, version: VersionReq) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

/// Registration metadata for one interceptor type
#[derive(Clone)]
pub struct InterceptorDescriptor {
    name: String,
    version: Version,
    description: String,
    factory: InterceptorFactory,
}

impl InterceptorDescriptor {
    pub fn new<F>(name: impl Into<String>, version: Version, description: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Interceptor> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            version,
            description: description.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn instantiate(&self) -> Box<dyn Interceptor> {
        (self.factory)()
    }
}

impl fmt::Debug for InterceptorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorDescriptor")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("description", &self.description)
            .finish()
    }
}

/// Registry for interceptor types known to the host
#[derive(Debug, Default)]
pub struct InterceptorRegistry {
    descriptors: HashMap<String, InterceptorDescriptor>,
}

impl InterceptorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the framework's built-in interceptors
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for descriptor in builtin::descriptors() {
            // Built-in names are distinct
            if let Err(e) = registry.register(descriptor) {
                log::error!("Failed to register built-in interceptor: {}", e);
            }
        }
        registry
    }

    /// Register an interceptor type
    pub fn register(&mut self, descriptor: InterceptorDescriptor) -> Result<()> {
        if self.descriptors.contains_key(descriptor.name()) {
            return Err(Error::Registry {
                name: descriptor.name().to_string(),
                message: "interceptor already registered".to_string(),
            });
        }
        log::debug!("Registered interceptor '{}' v{}", descriptor.name(), descriptor.version());
        self.descriptors.insert(descriptor.name().to_string(), descriptor);
        Ok(())
    }

    pub fn has(&self, name: &str) -> bool {
        self.descriptors.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&InterceptorDescriptor> {
        self.descriptors.get(name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// All descriptors, sorted by name
    pub fn descriptors(&self) -> Vec<&InterceptorDescriptor> {
        let mut all: Vec<_> = self.descriptors.values().collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    /// Instantiate the interceptor a definition refers to
    pub fn create(&self, definition: &InterceptorDefinition) -> Result<Box<dyn Interceptor>> {
        let descriptor = self.get(&definition.name).ok_or_else(|| {
            StageError::new(InterceptorErrors::Interceptor0001, [Param::from(&definition.name)])
        })?;

        if let Some(requirement) = &definition.version {
            if !requirement.matches(descriptor.version()) {
                return Err(StageError::new(
                    InterceptorErrors::Interceptor0002,
                    [
                        Param::from(&definition.name),
                        Param::from(descriptor.version().to_string()),
                        Param::from(requirement.to_string()),
                    ],
                )
                .into());
            }
        }

        Ok(descriptor.instantiate())
    }

    /// Build an uninitialized chain, in definition order
    pub fn build_chain(&self, definitions: &[InterceptorDefinition]) -> Result<InterceptorChain> {
        let mut chain = InterceptorChain::new();
        for definition in definitions {
            let interceptor = self.create(definition)?;
            chain.push(ManagedInterceptor::new(
                definition.name.clone(),
                interceptor,
                definition.parameters.clone(),
            ));
        }
        Ok(chain)
    }
}
