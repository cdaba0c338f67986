use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const ANCHOR: &str = "\n\n---\n\n## What Could Go Wrong";
const ADDITION: &str = "\n\n**Choosing your stance.** Document it.\n";
const MARKER: &str = "Choosing your stance";
const UNPATCHED: &str = "Tolerance is a product decision.\n\n---\n\n## What Could Go Wrong\n\nThings break.\n";

fn write_file(path: &Path, contents: &str) {
    fs::write(path, contents.as_bytes()).unwrap();
}

fn read_file(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

fn docpatch(base: &Path, name: &str, extra: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_docpatch");
    Command::new(bin)
        .args(extra)
        .arg("--base")
        .arg(base)
        .arg(name)
        .arg("--anchor")
        .arg(ANCHOR)
        .arg("--addition")
        .arg(ADDITION)
        .arg("--marker")
        .arg(MARKER)
        .output()
        .unwrap()
}

#[test]
fn docpatch_expands_once_then_skips() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Topic_233.md");
    write_file(&file, UNPATCHED);

    let out = docpatch(dir.path(), "Topic_233.md", &[]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "expanded Topic_233.md\n");

    let expanded = read_file(&file);
    assert_eq!(
        expanded,
        format!("Tolerance is a product decision.{ADDITION}{ANCHOR}\n\nThings break.\n")
    );

    let out = docpatch(dir.path(), "Topic_233.md", &[]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "already expanded Topic_233.md\n"
    );
    assert_eq!(read_file(&file), expanded);
}

#[test]
fn docpatch_dry_run_does_not_write() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("t.md");
    write_file(&file, UNPATCHED);

    let out = docpatch(dir.path(), "t.md", &["--dry-run"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "would expand t.md\n");

    // File unchanged.
    assert_eq!(read_file(&file), UNPATCHED);
}

#[test]
fn docpatch_rust_log_enables_info_events() {
    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("t.md"), UNPATCHED);

    let bin = env!("CARGO_BIN_EXE_docpatch");
    let out = Command::new(bin)
        .env("RUST_LOG", "info")
        .arg("--base")
        .arg(dir.path())
        .arg("t.md")
        .arg("--anchor")
        .arg(ANCHOR)
        .arg("--addition")
        .arg(ADDITION)
        .arg("--marker")
        .arg(MARKER)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("patch applied"), "stderr: {stderr}");
}

#[test]
fn docpatch_logs_nothing_by_default() {
    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("t.md"), UNPATCHED);

    let bin = env!("CARGO_BIN_EXE_docpatch");
    let out = Command::new(bin)
        .env_remove("RUST_LOG")
        .arg("--base")
        .arg(dir.path())
        .arg("t.md")
        .arg("--anchor")
        .arg(ANCHOR)
        .arg("--addition")
        .arg(ADDITION)
        .arg("--marker")
        .arg(MARKER)
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stderr).unwrap(), "");
}

#[test]
fn docpatch_missing_anchor_fails_and_leaves_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("t.md");
    write_file(&file, "A\nB");

    let out = docpatch(dir.path(), "t.md", &[]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("anchor not found"), "stderr: {stderr}");

    assert_eq!(read_file(&file), "A\nB");
}

#[test]
fn docpatch_missing_document_fails() {
    let dir = TempDir::new().unwrap();
    let out = docpatch(dir.path(), "absent.md", &[]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("document not found: absent.md"), "stderr: {stderr}");
}

#[test]
fn docpatch_rejects_name_outside_base() {
    let dir = TempDir::new().unwrap();
    let out = docpatch(dir.path(), "../escape.md", &[]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn docpatch_rejects_binary_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("f.bin"), b"a\0b\n").unwrap();

    let out = docpatch(dir.path(), "f.bin", &[]);
    assert!(!out.status.success());
}

#[test]
fn docpatch_reads_addition_from_file() {
    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("d.md"), "A\n---\nB");
    let addition = dir.path().join("addition.txt");
    write_file(&addition, "X\n");

    let bin = env!("CARGO_BIN_EXE_docpatch");
    let out = Command::new(bin)
        .arg("--base")
        .arg(dir.path())
        .arg("d.md")
        .arg("--anchor")
        .arg("---\nB")
        .arg("--addition-file")
        .arg(&addition)
        .arg("--marker")
        .arg("X")
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(read_file(&dir.path().join("d.md")), "A\nX\n---\nB");
}

#[test]
fn docpatch_stdin_mode_prints_patched_text() {
    let bin = env!("CARGO_BIN_EXE_docpatch");
    let mut child = Command::new(bin)
        .arg("--stdin")
        .arg("-")
        .arg("--anchor")
        .arg("---\nB")
        .arg("--addition")
        .arg("X\n")
        .arg("--marker")
        .arg("X")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    {
        let stdin = child.stdin.as_mut().unwrap();
        stdin.write_all(b"A\n---\nB").unwrap();
    }

    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "A\nX\n---\nB");
}

#[test]
fn docgen_runs_manifest_and_is_idempotent() {
    let base = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    write_file(&base.path().join("Topic_233.md"), UNPATCHED);

    fs::create_dir(work.path().join("payloads")).unwrap();
    write_file(
        &work.path().join("payloads/feed.md"),
        "# News Feed: Fan-out, Ranking, Scale\n",
    );
    let manifest = work.path().join("manifest.json");
    let json = serde_json::json!({
        "patches": [
            {"document": "Topic_233.md", "anchor": ANCHOR, "addition": ADDITION, "marker": MARKER}
        ],
        "documents": [
            {"name": "Topic_234.md", "content": "# Distributed Cache at Scale\n"},
            {"name": "Topic_235.md", "source": "payloads/feed.md"}
        ]
    });
    write_file(&manifest, &json.to_string());

    let bin = env!("CARGO_BIN_EXE_docgen");
    let out = Command::new(bin)
        .arg("--base")
        .arg(base.path())
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "expanded Topic_233.md\ncreated Topic_234.md\ncreated Topic_235.md\n"
    );
    assert_eq!(
        read_file(&base.path().join("Topic_234.md")),
        "# Distributed Cache at Scale\n"
    );
    assert_eq!(
        read_file(&base.path().join("Topic_235.md")),
        "# News Feed: Fan-out, Ranking, Scale\n"
    );
    let expanded = read_file(&base.path().join("Topic_233.md"));

    let out = Command::new(bin)
        .arg("--base")
        .arg(base.path())
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8(out.stdout)
        .unwrap()
        .starts_with("already expanded Topic_233.md\n"));
    assert_eq!(read_file(&base.path().join("Topic_233.md")), expanded);
}

#[test]
fn docgen_reports_failed_entry_and_continues() {
    let base = TempDir::new().unwrap();
    write_file(&base.path().join("t.md"), "no anchor here\n");
    let manifest = base.path().join("manifest.json");
    let json = serde_json::json!({
        "patches": [{"document": "t.md", "anchor": "---", "addition": "X\n", "marker": "X"}],
        "documents": [{"name": "fresh.md", "content": "C"}]
    });
    write_file(&manifest, &json.to_string());

    let bin = env!("CARGO_BIN_EXE_docgen");
    let out = Command::new(bin)
        .arg("--base")
        .arg(base.path())
        .arg(&manifest)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "created fresh.md\n");
    assert!(String::from_utf8(out.stderr)
        .unwrap()
        .contains("error: failed t.md: cannot patch t.md"));
    assert_eq!(read_file(&base.path().join("t.md")), "no anchor here\n");
    assert_eq!(read_file(&base.path().join("fresh.md")), "C");
}

#[test]
fn docgen_rejects_invalid_manifest() {
    let base = TempDir::new().unwrap();
    let manifest = base.path().join("manifest.json");
    write_file(&manifest, "{ not json");

    let bin = env!("CARGO_BIN_EXE_docgen");
    let out = Command::new(bin)
        .arg("--base")
        .arg(base.path())
        .arg(&manifest)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn docgen_dry_run_prints_forecast_and_writes_nothing() {
    let base = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    write_file(&base.path().join("Topic_233.md"), UNPATCHED);
    let manifest = work.path().join("manifest.json");
    let json = serde_json::json!({
        "patches": [
            {"document": "Topic_233.md", "anchor": ANCHOR, "addition": ADDITION, "marker": MARKER}
        ],
        "documents": [{"name": "Topic_234.md", "content": "# Distributed Cache at Scale\n"}]
    });
    write_file(&manifest, &json.to_string());

    let bin = env!("CARGO_BIN_EXE_docgen");
    let out = Command::new(bin)
        .arg("--dry-run")
        .arg("--base")
        .arg(base.path())
        .arg(&manifest)
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "would expand Topic_233.md\nwould create Topic_234.md\n"
    );
    assert_eq!(read_file(&base.path().join("Topic_233.md")), UNPATCHED);
    assert!(!base.path().join("Topic_234.md").exists());
}

#[test]
fn docpatch_missing_addition_file_reports_cause() {
    let dir = TempDir::new().unwrap();
    write_file(&dir.path().join("d.md"), "A\n---\nB");

    let bin = env!("CARGO_BIN_EXE_docpatch");
    let out = Command::new(bin)
        .arg("--base")
        .arg(dir.path())
        .arg("d.md")
        .arg("--anchor")
        .arg("---\nB")
        .arg("--addition-file")
        .arg(dir.path().join("absent.txt"))
        .arg("--marker")
        .arg("X")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("failed to read addition file"), "stderr: {stderr}");
    assert!(stderr.contains("os error"), "stderr: {stderr}");
    assert_eq!(read_file(&dir.path().join("d.md")), "A\n---\nB");
}
