use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};
use typeschema_core::TypeGraph;
use typeschema_engine::{
    GeneratorConfig, NullableStyle, SchemaDocument, SchemaDraft, SchemaGenerator,
    SupplierRegistry, definition_name,
};
use typeschema_loader::{ModelDatabase, ModelFormat, bundle_model_files, collect_model_paths};

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI-specific draft enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliDraft {
    #[value(name = "draft-04")]
    Draft04,
    #[value(name = "draft-06")]
    Draft06,
    #[value(name = "draft-07")]
    Draft07,
    #[value(name = "2019-09")]
    Draft201909,
    #[value(name = "2020-12")]
    Draft202012,
}

impl From<CliDraft> for SchemaDraft {
    fn from(draft: CliDraft) -> Self {
        match draft {
            CliDraft::Draft04 => Self::Draft04,
            CliDraft::Draft06 => Self::Draft06,
            CliDraft::Draft07 => Self::Draft07,
            CliDraft::Draft201909 => Self::Draft201909,
            CliDraft::Draft202012 => Self::Draft202012,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliNullableStyle {
    Omit,
    OneOfNull,
}

impl From<CliNullableStyle> for NullableStyle {
    fn from(style: CliNullableStyle) -> Self {
        match style {
            CliNullableStyle::Omit => Self::Omit,
            CliNullableStyle::OneOfNull => Self::OneOfNull,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

impl CliOutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "typeschema")]
#[command(about = "Generate JSON Schema documents from static type models")]
#[command(version)]
struct Cli {
    /// Log debug output to stderr (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate schema documents for one or more root types.
    Generate(GenerateArgs),
    /// Check a type model for dangling references and malformed types.
    Validate(ValidateArgs),
    /// Bundle per-type model files into a TypeModelPackage file.
    Bundle(BundleArgs),
    /// Write the default generator configuration as YAML.
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Model directory or bundle file.
    #[arg(long)]
    model: PathBuf,
    /// Identity of a root type; repeat for several documents.
    #[arg(long, required = true)]
    root: Vec<String>,
    /// Generator configuration YAML file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Target draft (overrides the configuration file).
    #[arg(long)]
    draft: Option<CliDraft>,
    /// Rendering of nullable members (overrides the configuration file).
    #[arg(long)]
    nullable_style: Option<CliNullableStyle>,
    /// Output file for one root, output directory for several.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Emit JSON without indentation.
    #[arg(long)]
    compact: bool,
    /// Supplier whose fragment is the content of a JSON file (name=<file>).
    #[arg(long = "supplier", value_name = "NAME=FILE")]
    suppliers: Vec<String>,
    /// Number of parallel generation jobs (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Model directory or bundle file.
    #[arg(long)]
    model: PathBuf,
}

#[derive(Debug, Args)]
struct BundleArgs {
    /// Model files and/or directories containing model files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output bundle path (.json, .yaml or .yml).
    #[arg(long)]
    output: PathBuf,
    /// Optional bundle name metadata.
    #[arg(long)]
    name: Option<String>,
    /// Optional bundle description metadata.
    #[arg(long)]
    description: Option<String>,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Output YAML path.
    #[arg(long)]
    output: PathBuf,
    /// Overwrite an existing file.
    #[arg(long)]
    force: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(cli.verbose) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Validate(args) => run_validate(args),
        Command::Bundle(args) => run_bundle(args),
        Command::InitConfig(args) => run_init_config(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) -> Result<(), String> {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| format!("Failed to initialize tracing subscriber: {err}"))
}

// ---------------------------------------------------------------------------
// generate command
// ---------------------------------------------------------------------------

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let database = load_model(&args.model)?;

    let mut config = match &args.config {
        Some(path) => GeneratorConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    if let Some(draft) = args.draft {
        config.draft = draft.into();
    }
    if let Some(style) = args.nullable_style {
        config.nullable_style = style.into();
    }

    let suppliers = load_suppliers(&args.suppliers)?;
    let generator = SchemaGenerator::new(database.into_graph())
        .with_config(config)
        .with_suppliers(suppliers);

    let mut seen = HashSet::new();
    let roots: Vec<&str> = args
        .root
        .iter()
        .map(String::as_str)
        .filter(|root| seen.insert(*root))
        .collect();

    if let [root] = roots.as_slice() {
        let document = generator.generate(root).map_err(|e| e.to_string())?;
        let text = render_document(&document, args.format, args.compact)?;
        match &args.output {
            Some(path) => {
                write_file(path, &text)?;
                println!("Wrote schema for '{root}' to '{}'.", path.display());
            }
            None => println!("{text}"),
        }
        return Ok(());
    }

    generate_many(&generator, &roots, &args)
}

fn generate_many(
    generator: &SchemaGenerator,
    roots: &[&str],
    args: &GenerateArgs,
) -> Result<(), String> {
    use rayon::prelude::*;

    let output_dir = args
        .output
        .as_ref()
        .ok_or_else(|| "--output <dir> is required when generating several roots".to_string())?;
    fs::create_dir_all(output_dir).map_err(|err| {
        format!(
            "Failed to create output directory '{}': {err}",
            output_dir.display()
        )
    })?;

    let stems = output_stems(
        generator.graph(),
        roots,
        generator.config().qualified_definition_names,
    );
    let extension = args.format.extension();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.unwrap_or(0))
        .build()
        .map_err(|e| format!("Failed to create thread pool: {e}"))?;

    let outcomes: Vec<Result<PathBuf, String>> = pool.install(|| {
        roots
            .par_iter()
            .zip(stems.par_iter())
            .map(|(root, stem)| {
                let document = generator
                    .generate(root)
                    .map_err(|e| format!("{root}: {e}"))?;
                let text = render_document(&document, args.format, args.compact)?;
                let path = output_dir.join(format!("{stem}.schema.{extension}"));
                fs::write(&path, text)
                    .map_err(|e| format!("Failed to write '{}': {e}", path.display()))?;
                Ok(path)
            })
            .collect()
    });

    let mut written = 0usize;
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(path) => {
                debug!(file = %path.display(), "wrote schema");
                written += 1;
            }
            Err(err) => failures.push(err),
        }
    }

    println!(
        "Generated {written} schema(s) into '{}'.",
        output_dir.display()
    );

    if failures.is_empty() {
        return Ok(());
    }
    for failure in &failures {
        eprintln!("  {failure}");
    }
    Err(format!("{} root(s) failed to generate", failures.len()))
}

/// File stems for each root: the definition name, or the qualified name when
/// two roots would otherwise share a file.
fn output_stems(graph: &TypeGraph, roots: &[&str], qualified: bool) -> Vec<String> {
    let names: Vec<String> = roots
        .iter()
        .map(|root| match graph.get(root) {
            Some(descriptor) => definition_name(descriptor, qualified),
            None => (*root).to_string(),
        })
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &names {
        *counts.entry(name.as_str()).or_default() += 1;
    }

    roots
        .iter()
        .zip(&names)
        .map(|(root, name)| match graph.get(root) {
            Some(descriptor) if counts[name.as_str()] > 1 => definition_name(descriptor, true),
            _ => name.clone(),
        })
        .collect()
}

fn load_suppliers(entries: &[String]) -> Result<SupplierRegistry, String> {
    let mut registry = SupplierRegistry::new();

    for entry in entries {
        let Some((name, file)) = entry
            .split_once('=')
            .filter(|(name, file)| !name.is_empty() && !file.is_empty())
        else {
            return Err(format!(
                "Invalid --supplier '{entry}': expected NAME=FILE"
            ));
        };

        let raw = fs::read_to_string(file)
            .map_err(|e| format!("Failed to read supplier file '{file}': {e}"))?;
        let fragment: Value = serde_json::from_str(&raw)
            .map_err(|e| format!("Failed to parse supplier file '{file}': {e}"))?;

        debug!(supplier = name, file, "registered supplier");
        registry.register(name, move || Ok(fragment.clone()));
    }

    Ok(registry)
}

fn render_document(
    document: &SchemaDocument,
    format: CliOutputFormat,
    compact: bool,
) -> Result<String, String> {
    match format {
        CliOutputFormat::Json if compact => Ok(document.to_json_string()),
        CliOutputFormat::Json => Ok(document.to_pretty_string()),
        CliOutputFormat::Yaml => serde_yaml::to_string(document)
            .map_err(|e| format!("Failed to serialize schema as YAML: {e}")),
    }
}

// ---------------------------------------------------------------------------
// validate command
// ---------------------------------------------------------------------------

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let database = load_model(&args.model)?;
    let errors = database.validate();

    if let Some(first) = errors.first() {
        for error in errors.iter().skip(1) {
            eprintln!("  {error}");
        }
        return Err(match errors.len() {
            1 => first.to_string(),
            n => format!("{first} (and {} more)", n - 1),
        });
    }

    println!(
        "Validated {} type(s) from '{}'.",
        database.len(),
        args.model.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// bundle command
// ---------------------------------------------------------------------------

fn run_bundle(args: BundleArgs) -> Result<(), String> {
    let paths = collect_model_paths(&args.inputs).map_err(|e| e.to_string())?;
    let package = bundle_model_files(&paths, PACKAGE_VERSION, args.name, args.description)
        .map_err(|e| e.to_string())?;

    let raw = match ModelFormat::from_path(&args.output) {
        Some(ModelFormat::Yaml) => serde_yaml::to_string(&package)
            .map_err(|err| format!("Failed to serialize model bundle: {err}"))?,
        _ => serde_json::to_string_pretty(&package)
            .map_err(|err| format!("Failed to serialize model bundle: {err}"))?,
    };
    write_file(&args.output, &raw)?;

    info!(types = package.type_count(), "bundle written");
    println!(
        "Bundled {} type(s) into '{}'.",
        package.type_count(),
        args.output.display()
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// init-config command
// ---------------------------------------------------------------------------

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "'{}' already exists (use --force to overwrite)",
            args.output.display()
        ));
    }
    create_parent_dir(&args.output)?;

    GeneratorConfig::default()
        .save(&args.output)
        .map_err(|e| format!("Failed to write '{}': {e}", args.output.display()))?;

    println!("Wrote default configuration to '{}'.", args.output.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_model(path: &Path) -> Result<ModelDatabase, String> {
    ModelDatabase::from_path(path)
        .map_err(|e| format!("Failed to load model '{}': {e}", path.display()))
}

fn create_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), String> {
    create_parent_dir(path)?;
    fs::write(path, contents).map_err(|err| format!("Failed to write '{}': {err}", path.display()))
}
