use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::{Value, json};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path =
            std::env::temp_dir().join(format!("typeschema_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn typeschema(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_typeschema"))
        .args(args)
        .output()
        .expect("failed to run typeschema")
}

fn write_json(dir: &TempDir, file: &str, value: &Value) -> PathBuf {
    let path = dir.join(file);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).expect("failed to write file");
    path
}

/// Person, Status and a polymorphic Animal hierarchy as per-type files.
fn write_model(dir: &TempDir) {
    write_json(
        dir,
        "Person.json",
        &json!({
            "identity": "com.example.Person",
            "members": [
                {"name": "name", "type": "string", "overrides": {"supplier": "name-pattern"}},
                {"name": "age", "type": "integer", "nullable": false},
                {"name": "status", "type": "com.example.Status"}
            ]
        }),
    );
    write_json(
        dir,
        "Status.json",
        &json!({"identity": "com.example.Status", "enum_constants": ["ACTIVE", "RETIRED"]}),
    );
    write_json(
        dir,
        "Animal.json",
        &json!({
            "identity": "zoo.Animal",
            "polymorphism": {
                "property": "kind",
                "subtypes": [
                    {"subtype": "zoo.Cat", "value": "cat"},
                    {"subtype": "zoo.Dog", "value": "dog"}
                ]
            }
        }),
    );
    write_json(
        dir,
        "Cat.json",
        &json!({"identity": "zoo.Cat", "members": [{"name": "lives", "type": "integer", "nullable": false}]}),
    );
    write_json(
        dir,
        "Dog.json",
        &json!({"identity": "zoo.Dog", "members": [{"name": "owner", "type": "string"}]}),
    );
}

fn write_supplier(dir: &TempDir) -> PathBuf {
    write_json(dir, "pattern.json", &json!({"pattern": "^[A-Z][a-z]+$"}))
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[test]
fn generate_single_root_to_stdout() {
    let model = TempDir::new("gen_stdout_model");
    let suppliers = TempDir::new("gen_stdout_suppliers");
    write_model(&model);
    let supplier = write_supplier(&suppliers);
    let supplier_arg = format!("name-pattern={}", supplier.display());

    let output = typeschema(&[
        "generate",
        "--model",
        model.path().to_str().unwrap(),
        "--root",
        "com.example.Person",
        "--supplier",
        &supplier_arg,
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let schema = stdout_json(&output);
    assert_eq!(schema["$schema"], "http://json-schema.org/draft-07/schema#");
    assert_eq!(schema["$ref"], "#/definitions/Person");
    let person = &schema["definitions"]["Person"];
    assert_eq!(person["required"], json!(["age"]));
    assert_eq!(person["properties"]["name"]["pattern"], "^[A-Z][a-z]+$");
    assert_eq!(person["properties"]["status"], json!({"$ref": "#/definitions/Status"}));
    assert_eq!(
        schema["definitions"]["Status"]["enum"],
        json!(["ACTIVE", "RETIRED"])
    );
}

#[test]
fn generate_missing_supplier_fails() {
    let model = TempDir::new("gen_missing_supplier");
    write_model(&model);

    let output = typeschema(&[
        "generate",
        "--model",
        model.path().to_str().unwrap(),
        "--root",
        "com.example.Person",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("name-pattern"), "stderr: {stderr}");
    assert!(stderr.contains("Person.name"), "stderr: {stderr}");
}

#[test]
fn generate_with_draft_flag_uses_defs() {
    let model = TempDir::new("gen_draft_model");
    write_model(&model);

    let output = typeschema(&[
        "generate",
        "--model",
        model.path().to_str().unwrap(),
        "--root",
        "zoo.Animal",
        "--draft",
        "2020-12",
        "--compact",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim().lines().count(), 1, "compact output spans lines");

    let schema = stdout_json(&output);
    assert_eq!(schema["$ref"], "#/$defs/Animal");
    assert_eq!(
        schema["$defs"]["Animal"]["oneOf"],
        json!([{"$ref": "#/$defs/Cat"}, {"$ref": "#/$defs/Dog"}])
    );
    assert_eq!(schema["$defs"]["Cat"]["properties"]["kind"], json!({"const": "cat"}));
    assert_eq!(schema["$defs"]["Cat"]["required"], json!(["kind", "lives"]));
}

#[test]
fn generate_several_roots_into_directory() {
    let model = TempDir::new("gen_many_model");
    let output_dir = TempDir::new("gen_many_out");
    let suppliers = TempDir::new("gen_many_suppliers");
    write_model(&model);
    let supplier = write_supplier(&suppliers);
    let supplier_arg = format!("name-pattern={}", supplier.display());

    let output = typeschema(&[
        "generate",
        "--model",
        model.path().to_str().unwrap(),
        "--root",
        "com.example.Person",
        "--root",
        "zoo.Animal",
        "--root",
        "com.example.Status",
        "--supplier",
        &supplier_arg,
        "--output",
        output_dir.path().to_str().unwrap(),
        "--jobs",
        "2",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    for stem in ["Person", "Animal", "Status"] {
        let path = output_dir.join(&format!("{stem}.schema.json"));
        let raw = fs::read_to_string(&path).expect("schema file missing");
        let schema: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(schema["$ref"], format!("#/definitions/{stem}"));
    }
}

#[test]
fn generate_several_roots_requires_output() {
    let model = TempDir::new("gen_many_no_out");
    write_model(&model);

    let output = typeschema(&[
        "generate",
        "--model",
        model.path().to_str().unwrap(),
        "--root",
        "zoo.Cat",
        "--root",
        "zoo.Dog",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--output"));
}

#[test]
fn generate_unknown_root_fails() {
    let model = TempDir::new("gen_unknown_root");
    write_model(&model);

    let output = typeschema(&[
        "generate",
        "--model",
        model.path().to_str().unwrap(),
        "--root",
        "com.example.Missing",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error:"), "stderr: {stderr}");
    assert!(stderr.contains("com.example.Missing"), "stderr: {stderr}");
}

#[test]
fn generate_yaml_output_file() {
    let model = TempDir::new("gen_yaml_model");
    let out = TempDir::new("gen_yaml_out");
    write_model(&model);
    let target = out.join("nested/dog.yaml");

    let output = typeschema(&[
        "generate",
        "--model",
        model.path().to_str().unwrap(),
        "--root",
        "zoo.Dog",
        "--format",
        "yaml",
        "--output",
        target.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let raw = fs::read_to_string(&target).expect("yaml output missing");
    let schema: Value = serde_yaml::from_str(&raw).unwrap();
    assert_eq!(schema["definitions"]["Dog"]["properties"]["kind"]["const"], "dog");
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_reports_type_count() {
    let model = TempDir::new("validate_ok");
    write_model(&model);

    let output = typeschema(&["validate", "--model", model.path().to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Validated"));
}

#[test]
fn validate_fails_on_dangling_reference() {
    let model = TempDir::new("validate_dangling");
    write_json(
        &model,
        "Order.json",
        &json!({"identity": "shop.Order", "members": [{"name": "customer", "type": "shop.Customer"}]}),
    );

    let output = typeschema(&["validate", "--model", model.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("shop.Customer"));
}

// ---------------------------------------------------------------------------
// bundle
// ---------------------------------------------------------------------------

#[test]
fn bundle_then_generate_from_bundle() {
    let model = TempDir::new("bundle_model");
    let out = TempDir::new("bundle_out");
    write_model(&model);
    let bundle = out.join("zoo.yaml");

    let output = typeschema(&[
        "bundle",
        model.path().to_str().unwrap(),
        "--output",
        bundle.to_str().unwrap(),
        "--name",
        "zoo",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Bundled 5 type(s)"));

    let package: Value = serde_yaml::from_str(&fs::read_to_string(&bundle).unwrap()).unwrap();
    assert_eq!(package["name"], "zoo");
    assert!(package["generated_at"].is_string());

    let output = typeschema(&[
        "generate",
        "--model",
        bundle.to_str().unwrap(),
        "--root",
        "zoo.Cat",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_json(&output)["$ref"], "#/definitions/Cat");
}

// ---------------------------------------------------------------------------
// init-config
// ---------------------------------------------------------------------------

#[test]
fn init_config_writes_loadable_defaults() {
    let dir = TempDir::new("init_config");
    let model = TempDir::new("init_config_model");
    write_model(&model);
    let config = dir.join("typeschema.yaml");

    let output = typeschema(&["init-config", "--output", config.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let raw = fs::read_to_string(&config).unwrap();
    assert!(raw.contains("draft: draft-07"), "config: {raw}");

    let output = typeschema(&["init-config", "--output", config.to_str().unwrap()]);
    assert!(!output.status.success(), "existing config must not be overwritten");

    fs::write(&config, raw.replace("draft-07", "draft-04")).unwrap();
    let output = typeschema(&[
        "generate",
        "--model",
        model.path().to_str().unwrap(),
        "--root",
        "zoo.Animal",
        "--config",
        config.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let schema = stdout_json(&output);
    assert_eq!(schema["$schema"], "http://json-schema.org/draft-04/schema#");
    assert_eq!(schema["definitions"]["Dog"]["properties"]["kind"], json!({"enum": ["dog"]}));
}
