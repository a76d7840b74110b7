//! Type model loading with builder pattern and fallback chains.
//!
//! Provides [`ModelDatabase`] for loading the descriptors a reflection tool
//! exported and [`ModelDatabaseBuilder`] for trying several sources in
//! order.
//!
//! # Loading patterns
//!
//! ```no_run
//! use typeschema_loader::ModelDatabase;
//!
//! // One descriptor per *.json / *.yaml / *.yml file
//! let db = ModelDatabase::from_dir("model/").unwrap();
//! assert!(db.contains("com.example.Person"));
//!
//! // A single TypeModelPackage bundle
//! let db = ModelDatabase::from_bundle("model.json").unwrap();
//!
//! // Fallback chain
//! let db = ModelDatabase::builder()
//!     .from_dir("model/")
//!     .from_bundle("model.yaml")
//!     .build()
//!     .unwrap();
//! ```
//!
//! Every database starts with the built-in `string`, `integer`, `number` and
//! `boolean` primitives; model files may redefine them.

use std::collections::{BTreeSet, HashSet};
use std::ffi::OsStr;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;
use typeschema_core::{
    TypeDescriptor, TypeGraph, TypeModelPackage, ValidationError, validate_graph,
};

use crate::error::{LoaderError, Result};

/// Describes where a [`ModelDatabase`] was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// A directory of per-type model files.
    Directory(PathBuf),
    /// A single [`TypeModelPackage`] file.
    Bundle(PathBuf),
    /// A fallback chain of sources.
    Multiple(Vec<ModelSource>),
}

/// Serialization format of a model file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    /// `.json`
    Json,
    /// `.yaml` or `.yml`
    Yaml,
}

impl ModelFormat {
    /// Detects the format of a path from its extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use typeschema_loader::ModelFormat;
    ///
    /// assert_eq!(ModelFormat::from_path("a/User.yml"), Some(ModelFormat::Yaml));
    /// assert_eq!(ModelFormat::from_path("model.json"), Some(ModelFormat::Json));
    /// assert_eq!(ModelFormat::from_path("notes.txt"), None);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        match path.as_ref().extension().and_then(OsStr::to_str) {
            Some("json") => Some(Self::Json),
            Some("yaml" | "yml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Reads one JSON or YAML document, picking the parser by extension.
///
/// # Errors
///
/// Returns [`LoaderError::UnsupportedExtension`] for other extensions, or
/// the I/O or parse error of the file.
pub fn read_model_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = ModelFormat::from_path(path)
        .ok_or_else(|| LoaderError::UnsupportedExtension(path.to_path_buf()))?;
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let value = match format {
        ModelFormat::Json => serde_json::from_reader(reader)?,
        ModelFormat::Yaml => serde_yaml::from_reader(reader)?,
    };
    Ok(value)
}

/// Returns the model files of a directory in sorted order.
pub(crate) fn model_files_in(dir: &Path) -> Result<BTreeSet<PathBuf>> {
    let mut paths = BTreeSet::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && ModelFormat::from_path(&path).is_some() {
            paths.insert(path);
        }
    }
    Ok(paths)
}

/// A loaded type model.
///
/// # Examples
///
/// ```no_run
/// use typeschema_loader::ModelDatabase;
///
/// let db = ModelDatabase::from_dir("model/").unwrap();
/// println!("Loaded {} types", db.len());
///
/// for identity in db.identities() {
///     println!("  {identity}");
/// }
/// ```
#[derive(Debug)]
pub struct ModelDatabase {
    graph: TypeGraph,
    source: ModelSource,
}

impl ModelDatabase {
    /// Returns a new [`ModelDatabaseBuilder`] for configuring a fallback chain.
    pub fn builder() -> ModelDatabaseBuilder {
        ModelDatabaseBuilder::new()
    }

    /// Loads one [`TypeDescriptor`] from every `*.json`, `*.yaml` and `*.yml`
    /// file in a directory, in sorted path order.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::IoError`] if the directory or a file cannot be
    /// read, a parse error for malformed files, or
    /// [`LoaderError::DuplicateType`] if two files share an identity.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut descriptors = Vec::new();
        for file in model_files_in(path)? {
            debug!(file = %file.display(), "loading type descriptor");
            let descriptor: TypeDescriptor = read_model_file(&file)?;
            descriptors.push(descriptor);
        }

        Ok(Self {
            graph: graph_from(descriptors)?,
            source: ModelSource::Directory(path.to_path_buf()),
        })
    }

    /// Loads a single [`TypeModelPackage`] file (JSON or YAML by extension).
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::IoError`] if the file cannot be read, a parse
    /// error if it is malformed, or [`LoaderError::DuplicateType`] if the
    /// package lists an identity twice.
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(file = %path.display(), "loading type model bundle");
        let package: TypeModelPackage = read_model_file(path)?;

        Ok(Self {
            graph: graph_from(package.types)?,
            source: ModelSource::Bundle(path.to_path_buf()),
        })
    }

    /// Loads a directory with [`from_dir`](Self::from_dir) and anything else
    /// with [`from_bundle`](Self::from_bundle).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::from_dir(path)
        } else {
            Self::from_bundle(path)
        }
    }

    /// Looks up a descriptor by identity.
    pub fn get(&self, identity: &str) -> Option<&TypeDescriptor> {
        self.graph.get(identity)
    }

    /// Returns `true` if the model contains `identity`.
    pub fn contains(&self, identity: &str) -> bool {
        self.graph.contains(identity)
    }

    /// Returns the number of descriptors, built-in primitives included.
    pub fn len(&self) -> usize {
        self.graph.len()
    }

    /// Returns `true` if the model contains no descriptors.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Returns an iterator over identities in load order.
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.graph.identities()
    }

    /// Returns the loaded graph.
    pub fn graph(&self) -> &TypeGraph {
        &self.graph
    }

    /// Consumes the database into its graph.
    pub fn into_graph(self) -> TypeGraph {
        self.graph
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    /// Checks the loaded graph for structural problems.
    pub fn validate(&self) -> Vec<ValidationError> {
        validate_graph(&self.graph)
    }
}

fn graph_from(descriptors: Vec<TypeDescriptor>) -> Result<TypeGraph> {
    let mut graph = TypeGraph::with_primitives();
    let mut seen: HashSet<String> = HashSet::new();

    for descriptor in descriptors {
        if !seen.insert(descriptor.identity.clone()) {
            return Err(LoaderError::DuplicateType(descriptor.identity));
        }
        graph.insert(descriptor);
    }
    Ok(graph)
}

/// Builder for constructing a [`ModelDatabase`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`LoaderError::NoSourcesAvailable`] is returned.
#[derive(Debug, Default)]
pub struct ModelDatabaseBuilder {
    sources: Vec<ModelSource>,
}

impl ModelDatabaseBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory of per-type model files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(ModelSource::Directory(path.into()));
        self
    }

    /// Adds a [`TypeModelPackage`] file as a source.
    pub fn from_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(ModelSource::Bundle(path.into()));
        self
    }

    /// Attempts to load the model from configured sources in order.
    pub fn build(self) -> Result<ModelDatabase> {
        if self.sources.is_empty() {
            return Err(LoaderError::NoSourcesAvailable);
        }

        let all_sources = self.sources.clone();

        for source in &self.sources {
            let result = match source {
                ModelSource::Directory(path) => ModelDatabase::from_dir(path),
                ModelSource::Bundle(path) => ModelDatabase::from_bundle(path),
                ModelSource::Multiple(_) => continue,
            };

            match result {
                Ok(mut db) => {
                    db.source = ModelSource::Multiple(all_sources);
                    return Ok(db);
                }
                Err(err) => debug!(source = ?source, error = %err, "model source failed"),
            }
        }

        Err(LoaderError::NoSourcesAvailable)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use typeschema_core::MemberDescriptor;

    fn write_json(dir: &Path, file: &str, descriptor: &TypeDescriptor) {
        let mut f = std::fs::File::create(dir.join(file)).unwrap();
        serde_json::to_writer_pretty(&mut f, descriptor).unwrap();
        f.flush().unwrap();
    }

    #[test]
    fn test_from_dir_mixed_formats() {
        let dir = tempfile::tempdir().unwrap();
        write_json(
            dir.path(),
            "b_person.json",
            &TypeDescriptor::object("a.Person").with_member(MemberDescriptor::required("age", "integer")),
        );
        std::fs::write(
            dir.path().join("a_color.yaml"),
            "identity: a.Color\nenum_constants: [RED, GREEN]\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let db = ModelDatabase::from_dir(dir.path()).unwrap();
        assert_eq!(db.len(), 6);
        let custom: Vec<&str> = db.identities().skip(4).collect();
        assert_eq!(custom, vec!["a.Color", "a.Person"]);
        assert_eq!(db.source(), &ModelSource::Directory(dir.path().to_path_buf()));
        assert!(db.validate().is_empty());
    }

    #[test]
    fn test_from_dir_rejects_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), "one.json", &TypeDescriptor::object("a.User"));
        write_json(dir.path(), "two.json", &TypeDescriptor::object("a.User"));

        let err = ModelDatabase::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, LoaderError::DuplicateType(id) if id == "a.User"));
    }

    #[test]
    fn test_primitives_can_be_redefined() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("string.yml"),
            "identity: string\nprimitive: string\ndescription: Text\n",
        )
        .unwrap();

        let db = ModelDatabase::from_dir(dir.path()).unwrap();
        assert_eq!(db.len(), 4);
        assert_eq!(db.get("string").unwrap().description.as_deref(), Some("Text"));
    }

    #[test]
    fn test_read_model_file_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.toml");
        std::fs::write(&path, "").unwrap();
        let err = read_model_file::<TypeModelPackage>(&path).unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedExtension(_)));
    }

    #[test]
    fn test_from_path_dispatches() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("model.json");
        std::fs::write(&bundle, r#"{"version": "1.0.0", "types": []}"#).unwrap();

        let db = ModelDatabase::from_path(&bundle).unwrap();
        assert!(matches!(db.source(), ModelSource::Bundle(_)));

        let empty = tempfile::tempdir().unwrap();
        let db = ModelDatabase::from_path(empty.path()).unwrap();
        assert!(matches!(db.source(), ModelSource::Directory(_)));
    }

    #[test]
    fn test_builder_empty() {
        let err = ModelDatabase::builder().build().unwrap_err();
        assert!(matches!(err, LoaderError::NoSourcesAvailable));
    }
}
