//! Packaging per-type model files into a single bundle.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::Utc;
use tracing::info;
use typeschema_core::{TypeDescriptor, TypeModelPackage, validate_package};

use crate::error::{LoaderError, Result};
use crate::loader::{ModelFormat, model_files_in, read_model_file};

/// Expands directories and files into a sorted, de-duplicated list of model
/// files.
///
/// # Errors
///
/// Returns [`LoaderError::InvalidInput`] if no inputs are given, an input
/// does not exist, or nothing was found, and
/// [`LoaderError::UnsupportedExtension`] for a file that is neither JSON nor
/// YAML.
pub fn collect_model_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if inputs.is_empty() {
        return Err(LoaderError::InvalidInput(
            "no model paths were provided".to_string(),
        ));
    }

    let mut paths = BTreeSet::new();

    for input in inputs {
        if input.is_dir() {
            paths.extend(model_files_in(input)?);
            continue;
        }

        if input.is_file() {
            if ModelFormat::from_path(input).is_none() {
                return Err(LoaderError::UnsupportedExtension(input.clone()));
            }
            paths.insert(input.clone());
            continue;
        }

        return Err(LoaderError::InvalidInput(format!(
            "model path '{}' does not exist",
            input.display()
        )));
    }

    if paths.is_empty() {
        return Err(LoaderError::InvalidInput(
            "no model files found in the provided paths".to_string(),
        ));
    }

    Ok(paths.into_iter().collect())
}

/// Reads per-type model files into a validated [`TypeModelPackage`] stamped
/// with the current time.
///
/// # Errors
///
/// Returns read and parse errors of the files, or
/// [`LoaderError::Validation`] with the first structural problem of the
/// package.
pub fn bundle_model_files(
    paths: &[PathBuf],
    version: &str,
    name: Option<String>,
    description: Option<String>,
) -> Result<TypeModelPackage> {
    let mut types = Vec::with_capacity(paths.len());
    for path in paths {
        let descriptor: TypeDescriptor = read_model_file(path)?;
        types.push(descriptor);
    }

    let mut package = TypeModelPackage::new(version);
    package.name = name;
    package.description = description;
    package.generated_at = Some(Utc::now().to_rfc3339());
    package.types = types;

    // Bundles omit the builtin primitives; references to them still resolve.
    let errors = validate_package(&with_builtins(&package));
    if let Some(first) = errors.first() {
        return Err(LoaderError::Validation(first.to_string()));
    }

    info!(types = package.type_count(), "bundled type model");
    Ok(package)
}

fn with_builtins(package: &TypeModelPackage) -> TypeModelPackage {
    let mut checked = package.clone();
    let declared: BTreeSet<&str> = package.types.iter().map(|t| t.identity.as_str()).collect();
    let builtins = typeschema_core::BUILTIN_PRIMITIVES
        .iter()
        .filter(|(identity, _)| !declared.contains(identity))
        .map(|(identity, primitive)| TypeDescriptor::primitive(identity, *primitive));
    checked.types.extend(builtins);
    checked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_requires_inputs() {
        assert!(matches!(
            collect_model_paths(&[]),
            Err(LoaderError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_collect_missing_path() {
        let err = collect_model_paths(&[PathBuf::from("/nonexistent/model")]).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_collect_dedups_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.yml");
        let b = dir.path().join("b.json");
        std::fs::write(&a, "identity: x.A\nmembers: []\n").unwrap();
        std::fs::write(&b, r#"{"identity": "x.B", "members": []}"#).unwrap();

        let paths = collect_model_paths(&[b.clone(), dir.path().to_path_buf()]).unwrap();
        assert_eq!(paths, vec![a, b]);
    }

    #[test]
    fn test_bundle_stamps_time_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("user.json");
        std::fs::write(
            &user,
            r#"{"identity": "x.User", "members": [{"name": "id", "type": "integer", "nullable": false}]}"#,
        )
        .unwrap();

        let package =
            bundle_model_files(&[user.clone()], "1.2.0", Some("users".into()), None).unwrap();
        assert_eq!(package.version, "1.2.0");
        assert_eq!(package.type_count(), 1);
        assert!(package.generated_at.is_some());

        let broken = dir.path().join("broken.json");
        std::fs::write(
            &broken,
            r#"{"identity": "x.Broken", "members": [{"name": "owner", "type": "x.Missing"}]}"#,
        )
        .unwrap();
        let err = bundle_model_files(&[user, broken], "1.2.0", None, None).unwrap_err();
        assert!(matches!(err, LoaderError::Validation(_)));
    }
}
