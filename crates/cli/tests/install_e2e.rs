//! CLI integration tests driving the compiled `skillsync` binary.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use skillsync_test_utils::TestFixture;

fn run_cli(args: &[&str]) -> Result<Output> {
    let bin_path = env!("CARGO_BIN_EXE_skillsync");
    Command::new(bin_path)
        .args(args)
        .output()
        .context("Failed to execute skillsync")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command should succeed\nSTDOUT:\n{}\nSTDERR:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn given_library_when_install_then_content_and_manifest_exist() -> Result<()> {
    // GIVEN a library with one skill and one command
    let fixture = TestFixture::new()?;
    fixture.create_skill("tdd", "# TDD skill\n")?;
    fixture.write_library_file("commands/pr.md", "# PR command\n")?;

    // WHEN the user runs `skillsync install <src> <dest>`
    let output = run_cli(&[
        "install",
        path_str(&fixture.library),
        path_str(&fixture.install_root),
    ])?;
    assert_success(&output);

    // THEN the content is placed and the summary reports two creations
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Created:       2"), "stdout:\n{stdout}");
    assert_eq!(
        fs::read_to_string(fixture.installed("skills/tdd/SKILL.md"))?,
        "# TDD skill\n"
    );
    assert!(fixture
        .project_dir()
        .join(".skillsync-manifest")
        .exists());
    Ok(())
}

#[test]
fn install_then_uninstall_leaves_project_clean() -> Result<()> {
    let fixture = TestFixture::new()?;
    fixture.create_skill("tdd", "# TDD")?;

    assert_success(&run_cli(&[
        "install",
        path_str(&fixture.library),
        path_str(&fixture.install_root),
    ])?);

    let output = run_cli(&["uninstall", path_str(&fixture.install_root)])?;
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Removed: 1"), "stdout:\n{stdout}");

    assert!(!fixture.installed("skills/tdd").exists());
    assert!(!fixture.project_dir().join(".skillsync-manifest").exists());
    Ok(())
}

#[test]
fn dry_run_install_writes_nothing_but_reports() -> Result<()> {
    let fixture = TestFixture::new()?;
    fixture.create_skill("tdd", "# TDD")?;

    let output = run_cli(&[
        "install",
        path_str(&fixture.library),
        path_str(&fixture.install_root),
        "--dry-run",
    ])?;
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Dry run"), "stdout:\n{stdout}");
    assert!(stdout.contains("Created:       1"), "stdout:\n{stdout}");
    assert!(!fixture.install_root.exists());
    Ok(())
}

#[test]
fn divergent_file_without_force_is_skipped_and_preserved() -> Result<()> {
    let fixture = TestFixture::new()?;
    fixture.write_library_file("commands/pr.md", "upstream")?;
    fixture.write_installed_file("commands/pr.md", "local tweaks")?;

    let output = run_cli(&[
        "install",
        path_str(&fixture.library),
        path_str(&fixture.install_root),
    ])?;
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Repo-specific: 1"), "stdout:\n{stdout}");
    assert_eq!(
        fs::read_to_string(fixture.installed("commands/pr.md"))?,
        "local tweaks"
    );
    Ok(())
}

#[test]
fn conflicting_placement_flags_abort_before_mutation() -> Result<()> {
    let fixture = TestFixture::new()?;
    fixture.create_skill("tdd", "# TDD")?;

    let output = run_cli(&[
        "install",
        path_str(&fixture.library),
        path_str(&fixture.install_root),
        "--copy",
        "--symlink",
    ])?;
    assert!(!output.status.success());
    assert!(!fixture.install_root.exists());
    Ok(())
}

#[test]
fn backup_without_force_aborts_with_named_flags() -> Result<()> {
    let fixture = TestFixture::new()?;
    fixture.create_skill("tdd", "# TDD")?;

    let output = run_cli(&[
        "install",
        path_str(&fixture.library),
        path_str(&fixture.install_root),
        "--backup",
    ])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--backup"), "stderr:\n{stderr}");
    assert!(stderr.contains("--force"), "stderr:\n{stderr}");
    assert!(!fixture.install_root.exists());
    Ok(())
}

#[test]
fn json_format_emits_machine_readable_summary() -> Result<()> {
    let fixture = TestFixture::new()?;
    fixture.write_library_file("commands/pr.md", "# PR")?;

    let output = run_cli(&[
        "install",
        path_str(&fixture.library),
        path_str(&fixture.install_root),
        "--format",
        "json",
    ])?;
    assert_success(&output);

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(parsed["created"], 1);
    assert_eq!(parsed["errored"], 0);
    Ok(())
}

#[test]
fn update_from_snapshot_pulls_changes() -> Result<()> {
    let fixture = TestFixture::new()?;
    fixture.create_skill("known", "v1")?;
    let upstream = fixture.tempdir.path().join("upstream");
    fs::create_dir_all(upstream.join("skills/known"))?;
    fs::write(upstream.join("skills/known/SKILL.md"), "v2")?;

    let output = run_cli(&[
        "update",
        path_str(&fixture.library),
        "--from",
        path_str(&upstream),
    ])?;
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("updated: skills/known"), "stdout:\n{stdout}");
    assert_eq!(
        fs::read_to_string(fixture.library.join("skills/known/SKILL.md"))?,
        "v2"
    );
    Ok(())
}

#[test]
fn list_shows_discovered_items() -> Result<()> {
    let fixture = TestFixture::new()?;
    fixture.create_skill_with_frontmatter("tdd", "Red/green loop", "# Body")?;
    fixture.write_library_file("agents/reviewer.md", "# Reviewer")?;

    let output = run_cli(&["list", path_str(&fixture.library)])?;
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("skill"), "stdout:\n{stdout}");
    assert!(stdout.contains("tdd"), "stdout:\n{stdout}");
    assert!(stdout.contains("agent"), "stdout:\n{stdout}");
    assert!(stdout.contains("2 item(s)"), "stdout:\n{stdout}");
    Ok(())
}
