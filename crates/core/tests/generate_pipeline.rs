use std::fs;
use std::path::{Path, PathBuf};

use omfsig_core::config::GeneratorConfig;
use omfsig_core::fingerprint::Diagnostic;
use omfsig_core::services::toolchain::{LibraryToolchain, ToolError, WatcomToolchain};
use omfsig_core::services::{generate_from_library, generate_from_listings, GenerateError};
use omfsig_core::store::SignatureStore;
use tempfile::tempdir;

const ALPHA: &str = "Module: alpha
Segment: _TEXT BYTE USE16 00000001 bytes
0000  alpha_:
0000  C3          ret

Routine Size: 1 byte
";

const BETA: &str = "Module: beta
Segment: _TEXT BYTE USE16 00000003 bytes
0000  beta_:
0000  B0 01       mov   al,1
0002  C3          ret

Routine Size: 5 byte
";

/// Writes canned listings instead of running the Watcom tools.
struct CannedToolchain {
    listings: Vec<(&'static str, &'static str)>,
}

impl LibraryToolchain for CannedToolchain {
    fn extract(&self, _library: &Path, workdir: &Path) -> Result<Vec<PathBuf>, ToolError> {
        let mut objects = Vec::new();
        for (name, _) in &self.listings {
            let object = workdir.join(format!("{name}.o"));
            fs::write(&object, b"obj").map_err(|source| ToolError::Io { path: object.clone(), source })?;
            objects.push(object);
        }
        Ok(objects)
    }

    fn disassemble(&self, object: &Path, _workdir: &Path) -> Result<PathBuf, ToolError> {
        let stem = object.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let (_, body) = self.listings.iter().find(|(name, _)| *name == stem).expect("known object");
        let listing = object.with_extension("lst");
        fs::write(&listing, body).map_err(|source| ToolError::Io { path: listing.clone(), source })?;
        Ok(listing)
    }

    fn name(&self) -> &'static str {
        "canned"
    }
}

#[test]
fn listings_directory_is_processed_in_name_order() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("b.lst"), BETA).unwrap();
    fs::write(dir.path().join("a.lst"), ALPHA).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let report = generate_from_listings(dir.path(), &GeneratorConfig::default()).unwrap();
    let names: Vec<_> = report.modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["alpha", "beta"]);
    assert_eq!(report.fingerprint_count(), 1);
    assert!(matches!(report.diagnostics[..], [Diagnostic::SizeMismatch { ref routine, .. }] if routine.as_str() == "beta_"));

    let text = report.to_signature_text();
    assert!(text.starts_with("alpha\t_TEXT\tUSE16\n\talpha_\t"));
    assert!(!text.contains("beta"), "segment without accepted routines is omitted");
}

#[test]
fn library_pipeline_uses_the_toolchain() {
    let dir = tempdir().unwrap();
    let library = dir.path().join("clib.lib");
    fs::write(&library, b"lib").unwrap();
    let toolchain = CannedToolchain { listings: vec![("alpha", ALPHA), ("beta", BETA)] };

    let report = generate_from_library(&toolchain, &library, &GeneratorConfig::default()).unwrap();
    assert_eq!(report.modules.len(), 2);
    let stored = SignatureStore::read(&report.to_signature_text()).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].label, "alpha_");
}

#[test]
fn latin1_listing_is_decoded() {
    let dir = tempdir().unwrap();
    let mut bytes = ALPHA.replace("alpha_:", "caf\u{e9}_:").chars().map(|c| c as u8).collect::<Vec<u8>>();
    bytes.push(b'\n');
    fs::write(dir.path().join("x.lst"), bytes).unwrap();

    let report = generate_from_listings(dir.path(), &GeneratorConfig::default()).unwrap();
    assert_eq!(report.segments().next().unwrap().routines[0].name, "caf\u{e9}_");
}

#[test]
fn broken_listing_aborts_the_run() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.lst"), "Segment: _TEXT BYTE USE16 0 bytes\n").unwrap();
    let err = generate_from_listings(dir.path(), &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, GenerateError::Listing { .. }), "unexpected error: {err}");
}

#[test]
fn missing_library_is_reported() {
    let toolchain = WatcomToolchain::new("wlib", "wdis");
    let err = generate_from_library(&toolchain, Path::new("does_not_exist.lib"), &GeneratorConfig::default())
        .unwrap_err();
    assert!(matches!(err, GenerateError::MissingLibrary(_)));
}

#[test]
fn unavailable_tool_is_a_tool_error() {
    let dir = tempdir().unwrap();
    let library = dir.path().join("clib.lib");
    fs::write(&library, b"lib").unwrap();
    let toolchain = WatcomToolchain::new(dir.path().join("no-such-wlib"), dir.path().join("no-such-wdis"));

    let err = generate_from_library(&toolchain, &library, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, GenerateError::Tool(ToolError::Spawn { .. })), "unexpected error: {err}");
}

#[cfg(unix)]
#[test]
fn failing_tool_exit_is_a_tool_error() {
    let dir = tempdir().unwrap();
    let library = dir.path().join("clib.lib");
    fs::write(&library, b"lib").unwrap();
    let toolchain = WatcomToolchain::new("/bin/false", "/bin/false");

    let err = generate_from_library(&toolchain, &library, &GeneratorConfig::default()).unwrap_err();
    assert!(matches!(err, GenerateError::Tool(ToolError::Failed { .. })), "unexpected error: {err}");
    assert!(err.to_string().contains("/bin/false"), "unexpected error: {err}");
}

#[test]
fn trap_table_fixup_runs_before_parsing() {
    let dir = tempdir().unwrap();
    let listing = "Module: intxa386
Segment: _TEXT BYTE USE32 00000020 bytes
0170  __int34_:
0170  CD 34 C3 CD 35 C3
0176  ?? garbage
0180  CD 3E       int   0x3e

Routine Size: 32 byte
";
    fs::write(dir.path().join("intxa386.lst"), listing).unwrap();
    let report = generate_from_listings(dir.path(), &GeneratorConfig::default()).unwrap();
    let routine = &report.segments().next().unwrap().routines[0];
    assert_eq!(routine.byte_size, 32);
    assert_eq!(routine.opcodes.iter().filter(|op| op.mnemonic == "int").count(), 11);
}
