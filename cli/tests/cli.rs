use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CONFIG: &str = r#"
[bundles]
web = ["web/**/*.ts", "!**/*.test.ts"]

[bundles.docs]
include = "docs/"
index = false
prompt = "Summarize these docs."
"#;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write fixture");
}

fn fixture() -> TempDir {
    let temp = tempfile::tempdir().expect("tempdir");
    let root = temp.path();
    write(root, "srcpack.toml", CONFIG);
    write(root, "web/app.ts", "export const app = 1;\n");
    write(root, "web/app.test.ts", "test();\n");
    write(root, "web/util.ts", "a\nb\n");
    write(root, "docs/intro.md", "# Intro\n");
    temp
}

fn srcpack(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("srcpack").expect("binary exists");
    cmd.current_dir(root)
        .env_remove("PROJECT_ROOT")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_displays_usage() {
    let temp = tempfile::tempdir().expect("tempdir");
    srcpack(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn generate_writes_every_bundle_to_default_outfiles() {
    let temp = fixture();
    srcpack(temp.path())
        .arg("generate")
        .assert()
        .success()
        .stdout(predicate::str::contains("web").and(predicate::str::contains("docs")));

    let web = fs::read_to_string(temp.path().join(".srcpack/web.txt")).expect("web bundle");
    assert_eq!(
        web,
        "# Index (2 files)\n\
         # [1]  web/app.ts  L6-L6 (1 line)\n\
         # [2]  web/util.ts  L8-L9 (2 lines)\n\
         \n\
         #==> [1] web/app.ts <==\n\
         export const app = 1;\n\
         #==> [2] web/util.ts <==\n\
         a\n\
         b"
    );

    let docs = fs::read_to_string(temp.path().join(".srcpack/docs.txt")).expect("docs bundle");
    assert_eq!(
        docs,
        "Summarize these docs.\n\n---\n\n#==> [1] docs/intro.md <==\n# Intro"
    );
}

#[test]
fn generate_from_nested_directory_finds_config() {
    let temp = fixture();
    srcpack(&temp.path().join("web"))
        .args(["generate", "web"])
        .assert()
        .success();
    assert!(temp.path().join(".srcpack/web.txt").is_file());
    assert!(!temp.path().join(".srcpack/docs.txt").exists());
}

#[test]
fn generate_stdout_and_no_index() {
    let temp = fixture();
    srcpack(temp.path())
        .args(["generate", "web", "--stdout", "--no-index"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#==> [1] web/app.ts <=="))
        .stdout(predicate::str::contains("# Index").not());
    assert!(!temp.path().join(".srcpack").exists());
}

#[test]
fn dry_run_writes_nothing() {
    let temp = fixture();
    srcpack(temp.path())
        .args(["g", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry run"));
    assert!(!temp.path().join(".srcpack").exists());
}

#[test]
fn unknown_bundle_fails_with_config_exit_code() {
    let temp = fixture();
    srcpack(temp.path())
        .args(["generate", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown bundle"));
}

#[test]
fn missing_config_is_reported() {
    let temp = tempfile::tempdir().expect("tempdir");
    srcpack(temp.path())
        .arg("generate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("srcpack.toml"));
}

#[test]
fn missing_prompt_file_fails_only_that_bundle() {
    let temp = fixture();
    write(
        temp.path(),
        "srcpack.toml",
        "[bundles]\nweb = \"web/*.ts\"\n[bundles.bad]\ninclude = \"docs/\"\nprompt = \"./missing.md\"\n",
    );
    srcpack(temp.path())
        .arg("generate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("bad"));
    assert!(temp.path().join(".srcpack/web.txt").is_file());
    assert!(!temp.path().join(".srcpack/bad.txt").exists());
}

#[test]
fn quick_bundles_patterns_without_config() {
    let temp = tempfile::tempdir().expect("tempdir");
    write(temp.path(), "src/main.rs", "fn main() {}\n");
    write(temp.path(), "src/gen.rs", "// generated\n");
    write(temp.path(), ".gitignore", "target/\n");
    write(temp.path(), "target/out.rs", "ignored\n");

    srcpack(temp.path())
        .args(["quick", "**/*.rs", "!src/gen.rs"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "# Index (1 file)\n# [1]  src/main.rs  L5-L5 (1 line)\n\n#==> [1] src/main.rs <==\nfn main() {}",
        ));
}

#[test]
fn quick_with_prompt_and_no_index() {
    let temp = tempfile::tempdir().expect("tempdir");
    write(temp.path(), "a.txt", "hello\n");
    srcpack(temp.path())
        .args(["q", "a.txt", "--no-index", "--prompt", "Explain."])
        .assert()
        .success()
        .stdout("Explain.\n\n---\n\n#==> [1] a.txt <==\nhello\n");
}

#[test]
fn metrics_json_reports_line_ranges() {
    let temp = fixture();
    srcpack(temp.path())
        .args(["metrics", "web", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"startLine\": 8"))
        .stdout(predicate::str::contains("\"fileCount\": 2"));
}

#[test]
fn debug_json_lists_patterns_and_files() {
    let temp = fixture();
    srcpack(temp.path())
        .args(["debug", "web", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"**/*.test.ts\""))
        .stdout(predicate::str::contains("\"web/util.ts\""))
        .stdout(predicate::str::contains("web/app.test.ts").not());
}

#[test]
fn completion_prints_script() {
    let temp = tempfile::tempdir().expect("tempdir");
    srcpack(temp.path())
        .args(["completion", "--shell", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("srcpack"));
}
