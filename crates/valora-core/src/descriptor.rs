//! # Descriptor Loading
//!
//! Turns a descriptor document into a loaded [`Case`]:
//!
//! 1. Parse the text as JSON or YAML into a `serde_json::Value`.
//! 2. Validate the value against the embedded schema.
//! 3. Decode each `requisitos` entry, dispatching on its `tipo` tag.
//! 4. Build each requirement through its validating constructor.
//! 5. Check that every source entry produced exactly one requirement.
//!
//! Any failure yields [`ValoraError::MalformedDescriptor`] and no case.
//!
//! ```text
//! { "caso": { "nombre": "...", "descripcion": "...", "requisitos": [
//!     { "tipo": "Booleano",   "nombre": "...", "descripcion": "...", "valor_deseado": true },
//!     { "tipo": "Porcentaje", "nombre": "...", "descripcion": "...", "valor_minimo": 0.3, "valor_maximo": 0.7 },
//!     { "tipo": "Numero",     "nombre": "...", "descripcion": "...", "valor_minimo": 5, "valor_maximo": 10 } ] } }
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::case::Case;
use crate::error::ValoraError;
use crate::requirement::Requirement;
use crate::schema::DescriptorSchema;

/// Serialization format of a descriptor document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DescriptorFormat {
    #[default]
    Json,
    Yaml,
}

impl DescriptorFormat {
    /// Pick the format from a file extension: `.yaml`/`.yml` is YAML,
    /// everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

// ─── Document Shape ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct DescriptorDocument {
    caso: CaseEntry,
}

#[derive(Debug, Deserialize)]
struct CaseEntry {
    nombre: String,
    descripcion: String,
    requisitos: Vec<JsonValue>,
}

/// One `requisitos` entry, selected by its `tipo` tag.
#[derive(Debug, Deserialize)]
#[serde(tag = "tipo")]
enum RequirementEntry {
    #[serde(rename = "Booleano")]
    Boolean {
        nombre: String,
        descripcion: String,
        valor_deseado: bool,
    },
    #[serde(rename = "Porcentaje")]
    Percentage {
        nombre: String,
        descripcion: String,
        valor_minimo: f64,
        valor_maximo: f64,
    },
    #[serde(rename = "Numero")]
    Number {
        nombre: String,
        descripcion: String,
        valor_minimo: f64,
        valor_maximo: f64,
    },
}

impl RequirementEntry {
    fn build(self) -> Result<Requirement, ValoraError> {
        match self {
            Self::Boolean {
                nombre,
                descripcion,
                valor_deseado,
            } => Requirement::boolean(nombre, descripcion, valor_deseado),
            Self::Percentage {
                nombre,
                descripcion,
                valor_minimo,
                valor_maximo,
            } => Requirement::percentage(nombre, descripcion, valor_minimo, valor_maximo),
            Self::Number {
                nombre,
                descripcion,
                valor_minimo,
                valor_maximo,
            } => Requirement::number(nombre, descripcion, valor_minimo, valor_maximo),
        }
    }
}

// ─── Parsing ─────────────────────────────────────────────────────────

/// Parse a descriptor document into a loaded case.
///
/// `source_name` labels the document in error messages.
///
/// # Errors
///
/// Returns [`ValoraError::MalformedDescriptor`] for unparseable text,
/// schema violations, unknown kinds and illegal bounds.
pub fn parse(text: &str, format: DescriptorFormat, source_name: &str) -> Result<Case, ValoraError> {
    let malformed = |reason: String| ValoraError::MalformedDescriptor {
        source_name: source_name.to_string(),
        reason,
    };

    let document = match format {
        DescriptorFormat::Json => {
            serde_json::from_str::<JsonValue>(text).map_err(|e| malformed(format!("invalid JSON: {e}")))?
        }
        DescriptorFormat::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(text).map_err(|e| malformed(format!("invalid YAML: {e}")))?;
            yaml_to_json(yaml).map_err(|e| malformed(format!("invalid YAML: {e}")))?
        }
    };

    let schema = DescriptorSchema::new().map_err(malformed)?;
    schema
        .validate(&document)
        .map_err(|violations| malformed(format!("schema violations: {violations}")))?;

    let DescriptorDocument { caso } =
        serde_json::from_value(document).map_err(|e| malformed(e.to_string()))?;

    let source_count = caso.requisitos.len();
    let mut requirements = Vec::with_capacity(source_count);
    for (i, raw) in caso.requisitos.into_iter().enumerate() {
        let entry: RequirementEntry = serde_json::from_value(raw)
            .map_err(|e| malformed(format!("requisitos[{i}]: {e}")))?;
        let requirement = entry
            .build()
            .map_err(|e| malformed(format!("requisitos[{i}]: {e}")))?;
        if requirement.bounds().is_inverted() {
            tracing::warn!(
                source = source_name,
                requirement = requirement.name(),
                "minimum exceeds maximum; requirement can never pass"
            );
        }
        requirements.push(requirement);
    }

    if requirements.len() != source_count {
        return Err(malformed(format!(
            "built {} requirements from {} entries",
            requirements.len(),
            source_count
        )));
    }

    Ok(Case::with_requirements(caso.nombre, caso.descripcion, requirements))
}

/// YAML descriptors are validated and decoded through their JSON form.
/// Mapping keys must be strings and numbers must be finite.
fn yaml_to_json(yaml: serde_yaml::Value) -> Result<JsonValue, String> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => JsonValue::Null,
        Yaml::Bool(b) => JsonValue::Bool(b),
        Yaml::Number(n) => match n.as_i64() {
            Some(i) => JsonValue::from(i),
            None => n
                .as_f64()
                .and_then(serde_json::Number::from_f64)
                .map(JsonValue::Number)
                .ok_or_else(|| format!("number {n} is not finite"))?,
        },
        Yaml::String(s) => JsonValue::String(s),
        Yaml::Sequence(items) => JsonValue::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(map) => JsonValue::Object(
            map.into_iter()
                .map(|(key, value)| match key {
                    Yaml::String(key) => Ok((key, yaml_to_json(value)?)),
                    other => Err(format!("mapping key {other:?} is not a string")),
                })
                .collect::<Result<_, String>>()?,
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}
