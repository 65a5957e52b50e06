use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

mod helpers;
use helpers::*;

/// The binary, run from `cwd` so that config lookup and the log file stay
/// inside the test directory.
fn bin_cmd(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("viloc").unwrap();
    cmd.current_dir(cwd).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn workspace() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let module = dir.path().join("quan_ly_van_ban");
    write_module(&module);
    (dir, module)
}

#[test]
fn help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    bin_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("format")
                .and(predicate::str::contains("replace"))
                .and(predicate::str::contains("propagate"))
                .and(predicate::str::contains("mark")),
        );
}

#[test]
fn propagate_rewrites_sources_but_not_the_catalog() {
    let (dir, module) = workspace();
    bin_cmd(dir.path())
        .args(["propagate", module.to_str().unwrap(), "--from", "Xác nhận", "--to", "Confirm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of"));

    assert_eq!(
        read(module.join("views/van_ban.xml")),
        "<button string=\"Confirm\"/>\n<span>In</span>\n"
    );
    assert!(read(module.join("models/van_ban.py")).contains("LABEL = 'Confirm'"));
    assert_eq!(read(module.join("i18n/vi_VN.po")), CATALOG);
}

#[test]
fn propagate_json_report() {
    let (dir, module) = workspace();
    let out = bin_cmd(dir.path())
        .args([
            "propagate",
            module.to_str().unwrap(),
            "--from",
            "Xác nhận",
            "--to",
            "Can't confirm",
            "--dry-run",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["old_text"], "Xác nhận");
    assert_eq!(report["rewritten"].as_array().unwrap().len(), 2);
    // dry run leaves the files alone
    assert!(read(module.join("models/van_ban.py")).contains("LABEL = 'Xác nhận'"));
}

#[test]
fn format_with_glossary_swaps_and_propagates() {
    let (dir, module) = workspace();
    let glossary = write_glossary(dir.path());
    bin_cmd(dir.path())
        .args([
            "--quiet",
            "format",
            module.to_str().unwrap(),
            "--provider",
            "glossary",
            "--glossary",
            glossary.to_str().unwrap(),
            "--classifier",
            "charset",
            "--backup",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 swapped"));

    let po = read(module.join("i18n/vi_VN.po"));
    assert!(po.contains("msgid \"Confirm\"\nmsgstr \"Xác nhận\""));
    assert!(po.contains("msgid \"Print\"\nmsgstr \"In\""));
    assert_eq!(read(module.join("i18n/vi_VN.po.bak")), CATALOG);
    assert_eq!(
        read(module.join("views/van_ban.xml")),
        "<button string=\"Confirm\"/>\n<span>In</span>\n"
    );
}

#[test]
fn format_dry_run_json_changes_nothing() {
    let (dir, module) = workspace();
    let glossary = write_glossary(dir.path());
    let out = bin_cmd(dir.path())
        .args([
            "format",
            module.to_str().unwrap(),
            "--provider",
            "glossary",
            "--glossary",
            glossary.to_str().unwrap(),
            "--classifier",
            "charset",
            "--dry-run",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(out.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(summary["swapped"], 1);
    assert_eq!(summary["written"], false);
    assert_eq!(read(module.join("i18n/vi_VN.po")), CATALOG);
    assert!(read(module.join("views/van_ban.xml")).contains("Xác nhận"));
}

#[test]
fn format_without_catalog_fails() {
    let dir = tempfile::tempdir().unwrap();
    let glossary = write_glossary(dir.path());
    bin_cmd(dir.path())
        .args([
            "format",
            dir.path().to_str().unwrap(),
            "--provider",
            "glossary",
            "--glossary",
            glossary.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("catalog not found"));
}

#[test]
fn unknown_provider_is_rejected() {
    let (dir, module) = workspace();
    bin_cmd(dir.path())
        .args(["format", module.to_str().unwrap(), "--provider", "deepl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown provider"));
}

#[test]
fn replace_writes_msgids_back_into_sources() {
    let (dir, module) = workspace();
    bin_cmd(dir.path())
        .args(["replace", module.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 translated entries"));
    assert_eq!(
        read(module.join("views/van_ban.xml")),
        "<button string=\"Xác nhận\"/>\n<span>Print</span>\n"
    );
}

#[test]
fn mark_names_wraps_and_adds_import() {
    let (dir, module) = workspace();
    std::fs::write(module.join("__manifest__.py"), "{'name': 'Quản lý văn bản'}\n").unwrap();
    bin_cmd(dir.path())
        .args(["mark", "names", module.to_str().unwrap()])
        .assert()
        .success();

    let py = read(module.join("models/van_ban.py"));
    assert!(py.starts_with("from odoo import _, models\n"));
    assert!(py.contains("{'name': _('Văn bản đến')}"));
    assert_eq!(read(module.join("__manifest__.py")), "{'name': 'Quản lý văn bản'}\n");
}

#[test]
fn mark_validation_is_idempotent() {
    let (dir, module) = workspace();
    let path = module.join("models/checks.py");
    std::fs::write(
        &path,
        "from odoo.exceptions import ValidationError\n\ndef check():\n    raise ValidationError('Ngày không hợp lệ')\n",
    )
    .unwrap();
    for _ in 0..2 {
        bin_cmd(dir.path())
            .args(["mark", "validation", module.to_str().unwrap()])
            .assert()
            .success();
    }
    let py = read(&path);
    assert_eq!(py.matches("_('Ngày không hợp lệ')").count(), 1);
    assert_eq!(py.matches("from odoo import _").count(), 1);
}

#[test]
fn mark_markup_wraps_vietnamese_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notify.py");
    std::fs::write(
        &path,
        "body = f\"<b>Người gửi:</b> {sender} <span>OK</span>\"\nself.notify(title='Thông báo')\n",
    )
    .unwrap();
    bin_cmd(dir.path())
        .args(["mark", "markup", path.to_str().unwrap(), "--classifier", "charset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 literal(s) wrapped"));
    let py = read(&path);
    assert!(py.contains("<b>{_(\"Người gửi:\")}</b>"));
    assert!(py.contains("<span>OK</span>"));
    assert!(py.contains("title=_(\"Thông báo\")"));
}

#[test]
fn log_file_is_written() {
    let (dir, module) = workspace();
    bin_cmd(dir.path())
        .args(["propagate", module.to_str().unwrap(), "--from", "In", "--to", "Print"])
        .assert()
        .success();
    let log = read(dir.path().join("logs/viloc.log"));
    assert!(log.contains("command_start"));
}
