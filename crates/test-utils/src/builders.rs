#![allow(dead_code)]

use std::collections::BTreeMap;

use omrbench::registry::{ModelSpec, RawRegistryFile, Registry};

/// Builder for `Registry` to simplify test setup.
pub struct RegistryBuilder {
    raw: RawRegistryFile,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawRegistryFile::default(),
        }
    }

    pub fn with_model(mut self, spec: ModelSpec) -> Self {
        self.raw.model.push(spec);
        self
    }

    pub fn build(self) -> Registry {
        Registry::try_from(self.raw).expect("Failed to build valid registry from builder")
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ModelSpec`.
///
/// Defaults: working dir and environment named after the id, format `txt`,
/// no output pattern (stdout capture).
pub struct ModelSpecBuilder {
    spec: ModelSpec,
}

impl ModelSpecBuilder {
    pub fn new(id: &str, command: &str) -> Self {
        Self {
            spec: ModelSpec {
                id: id.to_string(),
                description: format!("test model {id}"),
                command: command.to_string(),
                working_dir: id.to_string(),
                environment: id.to_string(),
                output_format: "txt".to_string(),
                output_pattern: None,
                env_vars: BTreeMap::new(),
                python_version: None,
                huggingface_model: None,
                deprecated: false,
                requires_auth: false,
                requires_model: false,
                model_note: None,
                ready: None,
            },
        }
    }

    pub fn working_dir(mut self, dir: &str) -> Self {
        self.spec.working_dir = dir.to_string();
        self
    }

    pub fn environment(mut self, env: &str) -> Self {
        self.spec.environment = env.to_string();
        self
    }

    pub fn output_format(mut self, format: &str) -> Self {
        self.spec.output_format = format.to_string();
        self
    }

    pub fn output_pattern(mut self, pattern: &str) -> Self {
        self.spec.output_pattern = Some(pattern.to_string());
        self
    }

    pub fn env_var(mut self, key: &str, value: &str) -> Self {
        self.spec.env_vars.insert(key.to_string(), value.to_string());
        self
    }

    pub fn requires_model(mut self, note: &str) -> Self {
        self.spec.requires_model = true;
        self.spec.model_note = Some(note.to_string());
        self
    }

    pub fn deprecated(mut self, val: bool) -> Self {
        self.spec.deprecated = val;
        self
    }

    pub fn build(self) -> ModelSpec {
        self.spec
    }
}
