use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn rk_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("rk");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let docs_dir = root.join("docs");
    fs::create_dir_all(&docs_dir).unwrap();
    fs::write(
        docs_dir.join("digger_bees.md"),
        "Digger bees are solitary ground-nesting bees. They live in burrows \
         they dig in dry, sandy soil, often on south-facing slopes.",
    )
    .unwrap();
    fs::write(
        docs_dir.join("carpenter_bees.md"),
        "Carpenter bees bore tunnels into dead wood, bamboo, and structural \
         timbers to lay their eggs.",
    )
    .unwrap();
    fs::write(
        docs_dir.join("ladybugs.md"),
        "Ladybugs are small beetles that feed on aphids and overwinter in \
         large clusters under bark and leaf litter.",
    )
    .unwrap();
    fs::write(
        docs_dir.join("fireflies.md"),
        "Fireflies produce light through a chemical reaction in their lower \
         abdomen, flashing in patterns to attract mates.",
    )
    .unwrap();

    let config_content = format!(
        r#"[collection]
path = "{root}/data/collection.json"

[ingest]
docs_dir = "{root}/docs"

[chunking]
max_tokens = 500

[provider]
backend = "local-inference"
model = "llama3.1"
base_url = "http://localhost:11434/v1"
"#,
        root = root.display()
    );

    let config_path = config_dir.join("ragkit.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_rk(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = rk_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run rk binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn ingest(config_path: &Path) {
    let (stdout, stderr, success) = run_rk(config_path, &["ingest", "--skip-embeddings"]);
    assert!(
        success,
        "ingest failed: stdout={}, stderr={}",
        stdout, stderr
    );
}

#[test]
fn test_ingest_writes_collection() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_rk(&config_path, &["ingest", "--skip-embeddings"]);
    assert!(
        success,
        "ingest failed: stdout={}, stderr={}",
        stdout, stderr
    );
    assert!(stdout.contains("scanned files: 4"));
    assert!(tmp.path().join("data/collection.json").exists());
}

#[test]
fn test_ingest_dry_run_writes_nothing() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, _, success) = run_rk(
        &config_path,
        &["ingest", "--skip-embeddings", "--dry-run"],
    );
    assert!(success);
    assert!(stdout.contains("dry run"));
    assert!(!tmp.path().join("data/collection.json").exists());
}

#[test]
fn test_keyword_search_ranks_digger_doc_first() {
    let (_tmp, config_path) = setup_test_env();
    ingest(&config_path);

    let (stdout, stderr, success) = run_rk(
        &config_path,
        &["search", "where do digger bees live?", "--mode", "keyword"],
    );
    assert!(
        success,
        "search failed: stdout={}, stderr={}",
        stdout, stderr
    );
    let first = stdout.lines().next().unwrap_or("");
    assert!(
        first.contains("digger_bees.md-1"),
        "expected digger_bees.md-1 first, got: {}",
        stdout
    );
}

#[test]
fn test_keyword_search_no_matches_prints_no_results() {
    let (_tmp, config_path) = setup_test_env();
    ingest(&config_path);

    let (stdout, _, success) = run_rk(
        &config_path,
        &["search", "zxqv plumbing", "--mode", "keyword"],
    );
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_keyword_search_respects_limit() {
    let (_tmp, config_path) = setup_test_env();
    ingest(&config_path);

    let (stdout, _, success) = run_rk(
        &config_path,
        &["search", "bees", "--mode", "keyword", "--limit", "1"],
    );
    assert!(success);
    let result_lines = stdout.lines().filter(|l| l.contains(".md-")).count();
    assert_eq!(result_lines, 1, "expected one result, got: {}", stdout);
}

#[test]
fn test_hybrid_search_fails_without_embedding_provider() {
    let (_tmp, config_path) = setup_test_env();
    ingest(&config_path);

    let (stdout, stderr, success) = run_rk(&config_path, &["search", "bees", "--mode", "hybrid"]);
    assert!(!success, "hybrid should fail: stdout={}", stdout);
    assert!(stderr.contains("disabled"), "stderr: {}", stderr);
}

#[test]
fn test_get_prints_document() {
    let (_tmp, config_path) = setup_test_env();
    ingest(&config_path);

    let (stdout, stderr, success) = run_rk(&config_path, &["get", "fireflies.md-1"]);
    assert!(success, "get failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("fireflies.md-1:"));
    assert!(stdout.contains("chemical reaction"));
}

#[test]
fn test_get_unknown_id_fails() {
    let (_tmp, config_path) = setup_test_env();
    ingest(&config_path);

    let (_, stderr, success) = run_rk(&config_path, &["get", "missing.md-9"]);
    assert!(!success);
    assert!(stderr.contains("missing.md-9"));
}

#[test]
fn test_search_before_ingest_suggests_ingest() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_rk(&config_path, &["search", "bees", "--mode", "keyword"]);
    assert!(!success);
    assert!(stderr.contains("rk ingest"), "stderr: {}", stderr);
}
