#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::process::Command;

fn flagprune() -> Command {
    Command::new(env!("CARGO_BIN_EXE_flagprune"))
}

fn write_config(dir: &std::path::Path, toml: &str) -> std::path::PathBuf {
    let path = dir.join("flagprune.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[test]
fn rewrites_simple_if_else_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        &dir,
        "[flags.new_feature]\nvalue = true\n\n[patterns]\nmethods = [\"*.isEnabled\"]\n",
    );
    let target = dir.path().join("a.ts");
    fs::write(
        &target,
        "if (FeatureFlagService.isEnabled('new_feature')) { doNew(); } else { doOld(); }",
    )
    .unwrap();

    let output = flagprune()
        .args(["-c", config.to_str().unwrap(), "-t", target.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Modified"), "stdout: {stdout}");

    let rewritten = fs::read_to_string(&target).unwrap();
    assert_eq!(rewritten, "doNew();");
}

#[test]
fn dry_run_reports_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        &dir,
        "[flags.experimental]\nvalue = false\n\n[patterns]\nmethods = [\"*.isEnabled\"]\n",
    );
    let target = dir.path().join("a.ts");
    let original = "if (flags.isEnabled('experimental')) { runX(); }";
    fs::write(&target, original).unwrap();

    let output = flagprune()
        .args([
            "-c",
            config.to_str().unwrap(),
            "-t",
            target.to_str().unwrap(),
            "--dry-run",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Would modify"), "stdout: {stdout}");

    let unchanged = fs::read_to_string(&target).unwrap();
    assert_eq!(unchanged, original, "dry-run must not write the file");
}

#[test]
fn walks_directory_and_skips_excluded_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(
        &dir,
        "[flags.new_feature]\nvalue = true\n\n[patterns]\nmethods = [\"*.isEnabled\"]\n",
    );

    let src_dir = dir.path().join("src");
    fs::create_dir_all(&src_dir).unwrap();
    let included = src_dir.join("a.ts");
    let excluded = src_dir.join("a.generated.ts");
    let body = "if (flags.isEnabled('new_feature')) { yes(); } else { no(); }";
    fs::write(&included, body).unwrap();
    fs::write(&excluded, body).unwrap();

    let output = flagprune()
        .args([
            "-c",
            config.to_str().unwrap(),
            "-t",
            src_dir.to_str().unwrap(),
            "-e",
            "*.generated.ts",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&included).unwrap(), "yes();");
    assert_eq!(fs::read_to_string(&excluded).unwrap(), body, "excluded file must be untouched");
}

#[test]
fn unrelated_source_is_left_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "[flags.unrelated]\nvalue = true\n");
    let target = dir.path().join("a.ts");
    let original = "function helper() { return other(); }";
    fs::write(&target, original).unwrap();

    let output = flagprune()
        .args(["-c", config.to_str().unwrap(), "-t", target.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Modified"), "stdout: {stdout}");
    assert_eq!(fs::read_to_string(&target).unwrap(), original);
}

#[test]
fn invalid_config_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "version = \"1\"\n");
    let target = dir.path().join("a.ts");
    fs::write(&target, "const x = 1;").unwrap();

    let output = flagprune()
        .args(["-c", config.to_str().unwrap(), "-t", target.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn missing_target_file_reports_error_but_exits_zero_for_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, "[flags.x]\nvalue = true\n");
    let missing = dir.path().join("does_not_exist.ts");

    let output = flagprune()
        .args(["-c", config.to_str().unwrap(), "-t", missing.to_str().unwrap()])
        .output()
        .unwrap();

    // Per-file errors never abort the run; there is simply nothing to
    // process since walkdir finds no file at a nonexistent path.
    assert!(output.status.success());
}
