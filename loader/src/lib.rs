//! Loading of exported type models.
//!
//! A reflection tool exports one [`TypeDescriptor`](typeschema_core::TypeDescriptor)
//! per file, or a whole [`TypeModelPackage`](typeschema_core::TypeModelPackage)
//! bundle, in JSON or YAML. This crate turns either into a
//! [`TypeGraph`](typeschema_core::TypeGraph) the engine can walk, and packs
//! per-type files into bundles.
//!
//! # Quick start
//!
//! ```no_run
//! use typeschema_loader::{ModelDatabase, bundle_model_files, collect_model_paths};
//!
//! // Directory first, bundle as fallback
//! let db = ModelDatabase::builder()
//!     .from_dir("model/")
//!     .from_bundle("model.json")
//!     .build()
//!     .unwrap();
//! assert!(db.validate().is_empty());
//!
//! // Pack a directory into a bundle
//! let paths = collect_model_paths(&["model/".into()]).unwrap();
//! let package = bundle_model_files(&paths, "1.0.0", None, None).unwrap();
//! println!("{} types", package.type_count());
//! ```

mod bundle;
mod error;
mod loader;

pub use bundle::{bundle_model_files, collect_model_paths};
pub use error::{LoaderError, Result};
pub use loader::{ModelDatabase, ModelDatabaseBuilder, ModelFormat, ModelSource, read_model_file};
