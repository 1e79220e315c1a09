//! Integration tests for the build driver.
//!
//! Tests validate:
//! - End-to-end generation from metadata files on disk
//! - Output directory reconciliation (stale cleanup, unchanged files)
//! - Fatal errors for unreadable modules
//! - Configuration loading

use std::path::{Path, PathBuf};

use pdkgen_build::{build, BuildConfig, BuildError, BuildRequest};
use pdkgen_metadata::{MetadataError, MethodDef, ModuleMetadata, TypeDef};
use pdkgen_types::{DiagnosticCode, PrimitiveKind};
use tempfile::TempDir;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

const BOILERPLATE: &str = "// env stuff\n";

fn sample_app() -> ModuleMetadata {
    ModuleMetadata::new("SampleApp").with_type(
        TypeDef::new("MyNamespace", "MyClass")
            .with_method(MethodDef::new("Run", PrimitiveKind::Void).export(None))
            .with_method(
                MethodDef::new("DoSomething", PrimitiveKind::Void)
                    .with_param("p1", PrimitiveKind::I32)
                    .import("host", Some("do_something")),
            ),
    )
}

fn sample_lib() -> ModuleMetadata {
    ModuleMetadata::new("SampleLib").with_type(
        TypeDef::new("Lib", "Functions")
            .with_method(MethodDef::new("LibRun", PrimitiveKind::Void).export(Some("lib_run"))),
    )
}

struct Workspace {
    _dir: TempDir,
    bin: PathBuf,
    out: PathBuf,
}

impl Workspace {
    fn new(modules: &[ModuleMetadata]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        for m in modules {
            std::fs::write(bin.join(format!("{}.json", m.name)), m.to_json()).unwrap();
        }
        let out = dir.path().join("obj").join("glue");
        Self { _dir: dir, bin, out }
    }

    fn request(&self, root: &str, config: BuildConfig) -> BuildRequest {
        BuildRequest {
            module_path: self.bin.join(format!("{root}.json")),
            output_dir: self.out.clone(),
            boilerplate: BOILERPLATE.to_string(),
            config,
        }
    }

    fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.out.join(name)).unwrap()
    }
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ══════════════════════════════════════════════════════════════════════════════
// End to end
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn build_writes_all_files_into_a_new_directory() {
    let ws = Workspace::new(&[sample_app()]);
    let report = build(&ws.request("SampleApp", BuildConfig::default())).unwrap();

    assert_eq!(listing(&ws.out), vec!["env.c", "exports.c", "host.c"]);
    let mut written = report.written.clone();
    written.sort();
    assert_eq!(written, vec!["env.c", "exports.c", "host.c"]);
    assert!(report.unchanged.is_empty());
    assert!(report.removed.is_empty());
    assert!(!report.has_errors());

    assert_eq!(ws.read("env.c"), BOILERPLATE);
    assert!(ws.read("host.c").contains("void do_something(int32_t p1) {"));
    assert!(ws.read("exports.c").contains("int Run(void)"));
}

#[test]
fn references_come_from_config() {
    let ws = Workspace::new(&[sample_app().with_reference("SampleLib"), sample_lib()]);
    let config = BuildConfig::from_json(r#"{ "references": ["SampleLib"] }"#).unwrap();
    build(&ws.request("SampleApp", config)).unwrap();
    let exports = ws.read("exports.c");
    assert!(exports.contains("int lib_run(void)"));
    assert!(exports.contains("lookup_dotnet_method(\"SampleLib.dll\", \"Lib\", \"Functions\", \"LibRun\", -1)"));
    assert!(exports.find("int lib_run(void)").unwrap() < exports.find("int Run(void)").unwrap());
}

#[test]
fn reference_outside_the_set_contributes_nothing() {
    let ws = Workspace::new(&[sample_app().with_reference("SampleLib"), sample_lib()]);
    build(&ws.request("SampleApp", BuildConfig::default())).unwrap();
    assert!(!ws.read("exports.c").contains("lib_run"));
}

#[test]
fn module_dir_overrides_reference_lookup() {
    let ws = Workspace::new(&[sample_app().with_reference("SampleLib")]);
    let refs = ws.bin.parent().unwrap().join("refs");
    std::fs::create_dir_all(&refs).unwrap();
    std::fs::write(refs.join("SampleLib.json"), sample_lib().to_json()).unwrap();

    let config = BuildConfig {
        references: ["SampleLib".to_string()].into(),
        module_dir: Some(refs),
        ..BuildConfig::default()
    };
    build(&ws.request("SampleApp", config)).unwrap();
    assert!(ws.read("exports.c").contains("int lib_run(void)"));
}

#[test]
fn diagnostics_are_reported_without_failing_the_build() {
    let app = ModuleMetadata::new("SampleApp").with_type(
        TypeDef::new("Ns", "T").with_method(
            MethodDef::new("Add", PrimitiveKind::I32)
                .with_param("a", PrimitiveKind::I32)
                .export(None),
        ),
    );
    let ws = Workspace::new(&[app]);
    let report = build(&ws.request("SampleApp", BuildConfig::default())).unwrap();
    assert!(report.has_errors());
    assert_eq!(report.diagnostics.entries[0].code, DiagnosticCode::EXPORT_HAS_PARAMETERS);
    assert!(!ws.read("exports.c").contains("int Add(void)"));
}

#[test]
fn scan_diagnostics_are_included() {
    let app = ModuleMetadata::new("SampleApp").with_type(
        TypeDef::new("Ns", "T").with_method(
            MethodDef::new("Both", PrimitiveKind::Void)
                .export(None)
                .import("host", None),
        ),
    );
    let ws = Workspace::new(&[app]);
    let report = build(&ws.request("SampleApp", BuildConfig::default())).unwrap();
    assert_eq!(report.diagnostics.entries[0].code, DiagnosticCode::CONFLICTING_MARKERS);
    assert_eq!(listing(&ws.out), vec!["env.c"]);
}

// ══════════════════════════════════════════════════════════════════════════════
// Reconciliation
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn stale_generated_files_are_removed() {
    let ws = Workspace::new(&[sample_app()]);
    std::fs::create_dir_all(&ws.out).unwrap();
    std::fs::write(ws.out.join("old_host.c"), "// stale").unwrap();
    std::fs::write(ws.out.join("notes.txt"), "keep me").unwrap();

    let report = build(&ws.request("SampleApp", BuildConfig::default())).unwrap();

    assert_eq!(report.removed, vec!["old_host.c"]);
    assert_eq!(listing(&ws.out), vec!["env.c", "exports.c", "host.c", "notes.txt"]);
}

#[test]
fn file_with_a_generated_name_is_overwritten_not_removed() {
    let ws = Workspace::new(&[sample_app()]);
    std::fs::create_dir_all(&ws.out).unwrap();
    std::fs::write(ws.out.join("host.c"), "// hand edited").unwrap();

    let report = build(&ws.request("SampleApp", BuildConfig::default())).unwrap();
    assert!(report.removed.is_empty());
    assert!(report.written.contains(&"host.c".to_string()));
    assert!(ws.read("host.c").contains("do_something_import"));
}

#[test]
fn second_build_leaves_files_unchanged() {
    let ws = Workspace::new(&[sample_app()]);
    let request = ws.request("SampleApp", BuildConfig::default());
    let first = build(&request).unwrap();
    let before: Vec<String> = ["env.c", "exports.c", "host.c"].iter().map(|n| ws.read(n)).collect();

    let second = build(&request).unwrap();
    assert!(second.written.is_empty());
    let mut unchanged = second.unchanged.clone();
    unchanged.sort();
    assert_eq!(unchanged, vec!["env.c", "exports.c", "host.c"]);

    let after: Vec<String> = ["env.c", "exports.c", "host.c"].iter().map(|n| ws.read(n)).collect();
    assert_eq!(before, after);
    assert_eq!(first.files().count(), second.files().count());
}

#[test]
fn dropping_all_exports_removes_the_export_file() {
    let ws = Workspace::new(&[sample_app()]);
    build(&ws.request("SampleApp", BuildConfig::default())).unwrap();

    let no_exports = ModuleMetadata::new("SampleApp");
    std::fs::write(ws.bin.join("SampleApp.json"), no_exports.to_json()).unwrap();
    let report = build(&ws.request("SampleApp", BuildConfig::default())).unwrap();

    assert_eq!(report.removed, vec!["exports.c", "host.c"]);
    assert_eq!(listing(&ws.out), vec!["env.c"]);
}

#[test]
fn custom_extension_only_cleans_its_own_files() {
    let ws = Workspace::new(&[sample_app()]);
    std::fs::create_dir_all(&ws.out).unwrap();
    std::fs::write(ws.out.join("legacy.c"), "").unwrap();
    std::fs::write(ws.out.join("legacy.inc"), "").unwrap();

    let config = BuildConfig::from_json(r#"{ "extension": "inc" }"#).unwrap();
    let report = build(&ws.request("SampleApp", config)).unwrap();
    assert_eq!(report.removed, vec!["legacy.inc"]);
    assert_eq!(
        listing(&ws.out),
        vec!["env.inc", "exports.inc", "host.inc", "legacy.c"]
    );
}

#[test]
fn builds_are_byte_identical() {
    let ws = Workspace::new(&[sample_app()]);
    let request = ws.request("SampleApp", BuildConfig::default());
    build(&request).unwrap();
    let first = ws.read("exports.c");
    for i in 0..20 {
        std::fs::remove_dir_all(&ws.out).unwrap();
        build(&request).unwrap();
        assert_eq!(ws.read("exports.c"), first, "iteration {i} produced different output");
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Fatal errors
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn missing_root_module_is_fatal() {
    let ws = Workspace::new(&[]);
    let err = build(&ws.request("SampleApp", BuildConfig::default())).unwrap_err();
    assert!(matches!(err, BuildError::Metadata(MetadataError::Io { .. })));
    assert!(!ws.out.exists());
}

#[test]
fn missing_reference_is_fatal_and_writes_nothing() {
    let ws = Workspace::new(&[sample_app().with_reference("SampleLib")]);
    let config = BuildConfig::from_json(r#"{ "references": ["SampleLib"] }"#).unwrap();
    let err = build(&ws.request("SampleApp", config)).unwrap_err();
    assert!(matches!(
        err,
        BuildError::Metadata(MetadataError::MissingModule { ref name, .. }) if name == "SampleLib"
    ));
    assert!(!ws.out.exists());
}

#[test]
fn malformed_root_module_is_fatal() {
    let ws = Workspace::new(&[]);
    std::fs::write(ws.bin.join("SampleApp.json"), "{ \"name\": 4 }").unwrap();
    let err = build(&ws.request("SampleApp", BuildConfig::default())).unwrap_err();
    assert!(matches!(err, BuildError::Metadata(MetadataError::Malformed { .. })));
}

#[test]
fn host_module_that_is_not_a_file_name_is_a_diagnostic() {
    let app = ModuleMetadata::new("SampleApp").with_type(
        TypeDef::new("Ns", "T")
            .with_method(MethodDef::new("Escape", PrimitiveKind::Void).import("../up", Some("escape")))
            .with_method(MethodDef::new("Stay", PrimitiveKind::Void).import("host", Some("stay"))),
    );
    let ws = Workspace::new(&[app]);
    let report = build(&ws.request("SampleApp", BuildConfig::default())).unwrap();

    assert_eq!(listing(&ws.out), vec!["env.c", "host.c"]);
    assert!(!ws.out.parent().unwrap().join("up.c").exists());
    assert_eq!(report.diagnostics.entries.len(), 1);
    assert_eq!(report.diagnostics.entries[0].code, DiagnosticCode::INVALID_FILE_NAME);
}

#[test]
fn host_module_named_exports_does_not_overwrite_the_export_file() {
    let app = ModuleMetadata::new("SampleApp").with_type(
        TypeDef::new("Ns", "T")
            .with_method(MethodDef::new("Ping", PrimitiveKind::Void).import("exports", Some("ping")))
            .with_method(MethodDef::new("Run", PrimitiveKind::Void).export(None)),
    );
    let ws = Workspace::new(&[app]);
    let report = build(&ws.request("SampleApp", BuildConfig::default())).unwrap();

    assert_eq!(listing(&ws.out), vec!["env.c", "exports.c"]);
    assert!(ws.read("exports.c").contains("int Run(void)"));
    assert_eq!(report.diagnostics.entries[0].code, DiagnosticCode::FILE_NAME_COLLISION);
    assert_eq!(report.written.len(), 2);
}

#[test]
fn config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(pdkgen_build::CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        r#"{ "reserved_module": "extism", "module_aliases": {}, "references": ["A", "B"] }"#,
    )
    .unwrap();
    let config = BuildConfig::load(&path).unwrap();
    assert_eq!(config.glue.reserved_module, "extism");
    assert!(config.glue.module_aliases.is_empty());
    assert_eq!(config.references.len(), 2);
}
