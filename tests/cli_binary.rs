//! Tests that drive the compiled `repo-map` binary.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn repo_map() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_repo-map"));
    command
        .env_remove("REPO_MAP_API_KEY")
        .env_remove("OPENROUTER_API_KEY")
        .env("RUST_LOG", "repo_map=warn");
    command
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = repo_map()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start repo-map");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn map_file(root: &Path) -> std::path::PathBuf {
    let root = fs::canonicalize(root).unwrap();
    let name = root.file_name().unwrap().to_string_lossy().to_string();
    root.join(format!("{}_repo_map.md", name))
}

fn sample_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("main.py"), "def main():\n    pass\n").unwrap();
    temp_dir
}

// ============================================================================
// Exit Codes
// ============================================================================

mod exit_codes {
    use super::*;

    #[test]
    fn test_invalid_root_exits_with_one() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let output = repo_map()
            .args([missing.to_str().unwrap(), "--yes"])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(1));
    }

    #[test]
    fn test_declining_exits_cleanly_without_output() {
        let repo = sample_repo();
        let output = run_with_stdin(&[repo.path().to_str().unwrap()], "n\n");

        assert_eq!(output.status.code(), Some(0));
        assert!(String::from_utf8_lossy(&output.stdout).contains("Do you want to proceed?"));
        assert!(!map_file(repo.path()).exists());
    }

    #[test]
    fn test_missing_argument_is_a_usage_error() {
        let output = repo_map().output().unwrap();
        assert!(!output.status.success());
    }
}

// ============================================================================
// Mapping
// ============================================================================

mod mapping {
    use super::*;

    #[test]
    fn test_yes_flag_writes_artifacts() {
        let repo = sample_repo();
        let output = repo_map()
            .args([repo.path().to_str().unwrap(), "--yes", "--no-enrich"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let map = fs::read_to_string(map_file(repo.path())).unwrap();
        assert!(map.contains("└── main.py (Python)\n"));
        assert!(map.contains("Functions: ['main']"));
        assert!(repo.path().join(".repo_map_structure.json").exists());
        assert!(repo.path().join(".repo-map-cache.db").exists());
    }

    #[test]
    fn test_confirming_at_the_prompt_runs_the_pipeline() {
        let repo = sample_repo();
        let output = run_with_stdin(&[repo.path().to_str().unwrap(), "--no-enrich"], "maybe\n\n");

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("Invalid input"));
        assert!(map_file(repo.path()).exists());
    }

    #[test]
    fn test_custom_cache_location() {
        let repo = sample_repo();
        let db_dir = TempDir::new().unwrap();
        let db = db_dir.path().join("map-cache.db");

        let output = repo_map()
            .args([
                repo.path().to_str().unwrap(),
                "-y",
                "--no-enrich",
                "--cache",
                db.to_str().unwrap(),
            ])
            .output()
            .unwrap();

        assert!(output.status.success());
        assert!(db.exists());
        assert!(!repo.path().join(".repo-map-cache.db").exists());
    }
}
