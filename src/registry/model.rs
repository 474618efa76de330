// src/registry/model.rs

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Deserialize;

use crate::errors::{OmrError, Result};

/// Identifier of a registered model, e.g. `"homr"` or `"SMT-plusplus"`.
pub type ModelId = String;

/// Registry file as read from TOML, before validation.
///
/// ```toml
/// [[model]]
/// id = "cadenCV"
/// description = "Python OMR with MIDI output"
/// command = "python main.py {input}"
/// working_dir = "cadenCV"
/// environment = "cadenCV"
/// output_format = "midi"
/// output_pattern = "output/*.mid"
/// ```
///
/// An array of tables keeps the file order, which is also the default run
/// order.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawRegistryFile {
    #[serde(default)]
    pub model: Vec<ModelSpec>,
}

/// Invocation metadata for one OMR model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSpec {
    pub id: ModelId,

    #[serde(default)]
    pub description: String,

    /// Shell command template. Known placeholders: `{input}`,
    /// `{output_dir}`, `{device}`, `{model}`, `{vocabulary}`.
    pub command: String,

    /// Working directory, relative to the runner's base directory.
    pub working_dir: String,

    /// Name of the isolated environment the command runs in.
    pub environment: String,

    /// Opaque format tag copied into the report (`musicxml`, `abc`, ...).
    pub output_format: String,

    /// Literal path or glob (may contain `{input_stem}`). `None` means the
    /// model prints its result on stdout.
    #[serde(default)]
    pub output_pattern: Option<String>,

    /// Extra variables layered over the runner's own environment.
    #[serde(default)]
    pub env_vars: BTreeMap<String, String>,

    #[serde(default)]
    pub python_version: Option<String>,

    #[serde(default)]
    pub huggingface_model: Option<String>,

    #[serde(default)]
    pub deprecated: bool,

    /// Needs an authenticated model hub login before it can download weights.
    #[serde(default)]
    pub requires_auth: bool,

    /// Needs a pre-trained model file that is not bundled; always skipped.
    #[serde(default)]
    pub requires_model: bool,

    #[serde(default)]
    pub model_note: Option<String>,

    /// Explicit readiness for `--list-models`; derived from the flags when
    /// absent.
    #[serde(default)]
    pub ready: Option<bool>,
}

impl ModelSpec {
    /// Whether the model is expected to run without extra setup.
    pub fn is_ready(&self) -> bool {
        self.ready
            .unwrap_or(!self.requires_model && !self.deprecated)
    }

    /// Message recorded for a model skipped because of `requires_model`.
    pub fn prerequisite_note(&self) -> &str {
        self.model_note
            .as_deref()
            .unwrap_or("Model requires additional setup")
    }
}

/// Validated, immutable model registry.
///
/// Lookups are by id; iteration follows registration order.
#[derive(Debug, Clone)]
pub struct Registry {
    models: Vec<ModelSpec>,
    index: HashMap<ModelId, usize>,
}

impl Registry {
    /// Construct without validation. Only for the built-in table and for
    /// `TryFrom<RawRegistryFile>` after validation has passed.
    pub(crate) fn new_unchecked(models: Vec<ModelSpec>) -> Self {
        let index = models
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.clone(), i))
            .collect();
        Self { models, index }
    }

    pub fn get(&self, id: &str) -> Result<&ModelSpec> {
        self.index
            .get(id)
            .map(|&i| &self.models[i])
            .ok_or_else(|| OmrError::UnknownModel(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn list_identifiers(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.id.as_str()).collect()
    }

    pub fn models(&self) -> &[ModelSpec] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Resolve a requested id list to specs, failing on the first unknown
    /// or repeated id.
    ///
    /// `None` selects every model in registry order. Nothing is executed
    /// here, so a bad list aborts the run before any model starts. Each id
    /// owns one output directory and one report entry, hence no repeats.
    pub fn select(&self, requested: Option<&[String]>) -> Result<Vec<&ModelSpec>> {
        let Some(ids) = requested else {
            return Ok(self.models.iter().collect());
        };

        let mut seen = HashSet::new();
        let mut picked = Vec::with_capacity(ids.len());
        for id in ids {
            let spec = self.get(id)?;
            if !seen.insert(spec.id.as_str()) {
                return Err(OmrError::ConfigError(format!(
                    "model '{id}' requested more than once"
                )));
            }
            picked.push(spec);
        }
        Ok(picked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str) -> ModelSpec {
        ModelSpec {
            id: id.to_string(),
            description: String::new(),
            command: "run {input}".to_string(),
            working_dir: id.to_string(),
            environment: id.to_string(),
            output_format: "abc".to_string(),
            output_pattern: None,
            env_vars: BTreeMap::new(),
            python_version: None,
            huggingface_model: None,
            deprecated: false,
            requires_auth: false,
            requires_model: false,
            model_note: None,
            ready: None,
        }
    }

    #[test]
    fn readiness_is_derived_from_flags() {
        let mut m = spec("a");
        assert!(m.is_ready());
        m.deprecated = true;
        assert!(!m.is_ready());
        m.ready = Some(true);
        assert!(m.is_ready());
    }

    #[test]
    fn select_keeps_requested_order_and_rejects_unknown() {
        let reg = Registry::new_unchecked(vec![spec("a"), spec("b"), spec("c")]);

        let picked = reg
            .select(Some(&["c".to_string(), "a".to_string()]))
            .unwrap();
        let ids: Vec<&str> = picked.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);

        match reg.select(Some(&["a".to_string(), "zzz".to_string()])) {
            Err(OmrError::UnknownModel(id)) => assert_eq!(id, "zzz"),
            other => panic!("expected UnknownModel, got {other:?}"),
        }
    }

    #[test]
    fn select_rejects_repeated_ids() {
        let reg = Registry::new_unchecked(vec![spec("homr"), spec("oemer")]);
        let requested = ["homr".to_string(), "oemer".to_string(), "homr".to_string()];
        match reg.select(Some(&requested)) {
            Err(OmrError::ConfigError(msg)) => assert!(msg.contains("'homr'")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn select_none_returns_registry_order() {
        let reg = Registry::new_unchecked(vec![spec("b"), spec("a")]);
        let ids: Vec<&str> = reg.select(None).unwrap().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
