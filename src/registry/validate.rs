// src/registry/validate.rs

use std::collections::HashSet;

use regex::Regex;

use crate::registry::model::{ModelSpec, RawRegistryFile, Registry};
use crate::errors::{OmrError, Result};

/// Placeholders the command builder knows how to fill.
pub const COMMAND_PLACEHOLDERS: &[&str] = &["input", "output_dir", "device", "model", "vocabulary"];

/// Placeholders the output locator knows how to fill.
pub const PATTERN_PLACEHOLDERS: &[&str] = &["input_stem"];

impl TryFrom<RawRegistryFile> for Registry {
    type Error = OmrError;

    fn try_from(raw: RawRegistryFile) -> std::result::Result<Self, Self::Error> {
        validate_registry(&raw)?;
        Ok(Registry::new_unchecked(raw.model))
    }
}

/// Check a raw registry for the invariants the runner relies on.
pub fn validate_registry(raw: &RawRegistryFile) -> Result<()> {
    ensure_has_models(raw)?;
    validate_identifiers(raw)?;

    let placeholder = Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| OmrError::ConfigError(format!("placeholder regex: {e}")))?;

    for spec in raw.model.iter() {
        validate_model(spec, &placeholder)?;
    }
    Ok(())
}

fn ensure_has_models(raw: &RawRegistryFile) -> Result<()> {
    if raw.model.is_empty() {
        return Err(OmrError::ConfigError(
            "registry must contain at least one [[model]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_identifiers(raw: &RawRegistryFile) -> Result<()> {
    let mut seen = HashSet::new();
    for spec in raw.model.iter() {
        let id = spec.id.as_str();
        // The id doubles as the per-model output directory name.
        if id.trim().is_empty() || id.contains(['/', '\\', ',']) || id == "." || id == ".." {
            return Err(OmrError::ConfigError(format!(
                "invalid model id '{id}' (must be a non-empty name without path separators or commas)"
            )));
        }
        if !seen.insert(id) {
            return Err(OmrError::ConfigError(format!(
                "duplicate model id '{id}'"
            )));
        }
    }
    Ok(())
}

fn validate_model(spec: &ModelSpec, placeholder: &Regex) -> Result<()> {
    if spec.command.trim().is_empty() {
        return Err(OmrError::ConfigError(format!(
            "model '{}' has an empty command",
            spec.id
        )));
    }
    if spec.environment.trim().is_empty() {
        return Err(OmrError::ConfigError(format!(
            "model '{}' has an empty environment name",
            spec.id
        )));
    }

    check_placeholders(&spec.id, "command", &spec.command, COMMAND_PLACEHOLDERS, placeholder)?;
    if let Some(pattern) = &spec.output_pattern {
        check_placeholders(&spec.id, "output_pattern", pattern, PATTERN_PLACEHOLDERS, placeholder)?;
    }

    if spec.requires_model && spec.ready == Some(true) {
        return Err(OmrError::ConfigError(format!(
            "model '{}' cannot be both `requires_model` and `ready`",
            spec.id
        )));
    }
    Ok(())
}

fn check_placeholders(
    id: &str,
    field: &str,
    template: &str,
    allowed: &[&str],
    placeholder: &Regex,
) -> Result<()> {
    for cap in placeholder.captures_iter(template) {
        let name = &cap[1];
        if !allowed.contains(&name) {
            return Err(OmrError::ConfigError(format!(
                "model '{id}' uses unknown placeholder '{{{name}}}' in `{field}` (allowed: {})",
                allowed.join(", ")
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn spec(id: &str, command: &str) -> ModelSpec {
        ModelSpec {
            id: id.to_string(),
            description: String::new(),
            command: command.to_string(),
            working_dir: id.to_string(),
            environment: id.to_string(),
            output_format: "musicxml".to_string(),
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

    fn raw(models: Vec<ModelSpec>) -> RawRegistryFile {
        RawRegistryFile { model: models }
    }

    #[test]
    fn accepts_every_known_placeholder() {
        let mut m = spec("ok", "run {input} {output_dir} {device} {model} {vocabulary}");
        m.output_pattern = Some("out/{input_stem}.xml".to_string());
        assert!(validate_registry(&raw(vec![m])).is_ok());
    }

    #[test]
    fn rejects_path_like_ids() {
        for id in ["a/b", "..", "x,y", " "] {
            let err = validate_registry(&raw(vec![spec(id, "run {input}")])).unwrap_err();
            assert!(matches!(err, OmrError::ConfigError(_)), "id {id:?} accepted");
        }
    }

    #[test]
    fn pattern_placeholders_are_checked_separately() {
        let mut m = spec("p", "run {input}");
        m.output_pattern = Some("{input}.xml".to_string());
        let err = validate_registry(&raw(vec![m])).unwrap_err();
        assert!(matches!(err, OmrError::ConfigError(ref msg) if msg.contains("output_pattern")));
    }

    #[test]
    fn prerequisite_models_cannot_be_ready() {
        let mut m = spec("tf", "run {model} {input}");
        m.requires_model = true;
        m.ready = Some(true);
        assert!(validate_registry(&raw(vec![m])).is_err());
    }

    #[test]
    fn blank_environment_is_rejected() {
        let mut m = spec("e", "run {input}");
        m.environment = "  ".to_string();
        assert!(validate_registry(&raw(vec![m])).is_err());
    }
}
