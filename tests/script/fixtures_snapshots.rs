use std::fs;
use std::path::{Path, PathBuf};

use gcvm::runtime::GcConfig;
use gcvm::script::run_source;

fn discover_fixtures(root: &Path) -> Vec<PathBuf> {
    let entries = fs::read_dir(root)
        .unwrap_or_else(|e| panic!("failed to read fixture directory `{}`: {e}", root.display()));

    let mut fixtures: Vec<PathBuf> = entries
        .map(|entry| {
            entry
                .unwrap_or_else(|e| panic!("failed to read fixture entry: {e}"))
                .path()
        })
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("gcs"))
        .collect();
    fixtures.sort();
    fixtures
}

fn fixture_transcript(path: &Path, rel: &str) -> String {
    let source = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read fixture `{}`: {e}", path.display()));
    let body = match run_source(&source, GcConfig::default()) {
        Ok(report) => report.render_text(),
        Err(err) => format!("== error ==\n{err}\n"),
    };
    format!("Fixture: {rel}\n{body}")
}

#[test]
fn fixture_transcript_snapshots() {
    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let fixtures_root = workspace_root.join("fixtures");
    let fixtures = discover_fixtures(&fixtures_root);
    assert!(
        !fixtures.is_empty(),
        "no .gcs fixtures found under `{}`",
        fixtures_root.display()
    );

    for fixture in fixtures {
        let rel = fixture
            .strip_prefix(workspace_root)
            .unwrap_or(&fixture)
            .to_string_lossy()
            .replace('\\', "/");
        let snapshot = fixture
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("fixture")
            .to_string();
        let transcript = fixture_transcript(&fixture, &rel);

        insta::with_settings!({
            snapshot_path => "snapshots/fixtures",
            prepend_module_to_snapshot => false,
            omit_expression => true,
        }, {
            insta::assert_snapshot!(snapshot, transcript);
        });
    }
}
