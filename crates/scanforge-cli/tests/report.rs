//! End-to-end CLI tests with a fake compiler.

#![cfg(unix)]

use assert_cmd::Command;
use camino::Utf8PathBuf;
use predicates::prelude::*;
use scanforge_test_util::{
    sample_catalog_json, sample_infra_csv, sample_webapp_export, write_fake_compiler,
    write_template_tree,
};

struct Fixture {
    _tmp: tempfile::TempDir,
    root: Utf8PathBuf,
    compiler: Utf8PathBuf,
}

fn fixture(compiler_body: &str) -> Fixture {
    let tmp = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");

    let scans = root.join("scans");
    std::fs::create_dir_all(&scans).expect("mkdir");
    std::fs::write(
        scans.join("alpha.json"),
        sample_webapp_export("https://alpha.example.com"),
    )
    .expect("write scan");
    std::fs::write(scans.join("servers.csv"), sample_infra_csv()).expect("write csv");

    std::fs::write(root.join("catalog.json"), sample_catalog_json()).expect("write catalog");
    write_template_tree(&root.join("template"));
    let compiler = write_fake_compiler(&root.join("bin"), "fakelatex", compiler_body);

    Fixture {
        _tmp: tmp,
        root,
        compiler,
    }
}

fn report_cmd(fixture: &Fixture) -> Command {
    let mut cmd = Command::cargo_bin("scanforge").expect("binary builds");
    cmd.current_dir(&fixture.root).args([
        "--template-dir",
        fixture.root.join("template").as_str(),
        "--compiler",
        fixture.compiler.as_str(),
        "report",
        "--webapp-dir",
        fixture.root.join("scans").as_str(),
        "--infra-dir",
        fixture.root.join("scans").as_str(),
        "--webapp-catalog",
        fixture.root.join("catalog.json").as_str(),
        "--infra-catalog",
        fixture.root.join("catalog.json").as_str(),
        "--out",
        fixture.root.join("out").as_str(),
        "--org-name",
        "Department of Health",
        "--acronym",
        "DoH",
    ]);
    cmd
}

#[test]
fn report_compiles_and_prints_the_artifact() {
    let fixture = fixture("touch main.pdf\nexit 0");

    report_cmd(&fixture)
        .assert()
        .success()
        .stdout(predicate::str::contains("compiled:"))
        .stdout(predicate::str::contains("summary:"));

    assert!(fixture.root.join("out/document/main.pdf").exists());
    assert!(fixture.root.join("out/summary.json").exists());
    assert!(fixture.root.join("out/compile.log").exists());
}

#[test]
fn missing_assets_exit_with_the_diagnostic_code() {
    let fixture = fixture(
        "echo '! LaTeX Error: File `assets/images/xss-proof.png'\"'\"' not found.'\nexit 1",
    );

    report_cmd(&fixture)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unresolved image references"))
        .stderr(predicate::str::contains("assets/images/xss-proof.png"));
}

#[test]
fn silent_failure_is_reported_distinctly() {
    let fixture = fixture("exit 0");

    report_cmd(&fixture)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("produced no artifact"));
}

#[test]
fn extract_prints_canonical_findings() {
    let fixture = fixture("exit 0");

    let mut cmd = Command::cargo_bin("scanforge").expect("binary builds");
    cmd.args([
        "extract",
        "--file",
        fixture.root.join("scans/alpha.json").as_str(),
        "--format",
        "webapp",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Cross-Site Scripting (Reflected)"))
    .stdout(predicate::str::contains("https://alpha.example.com/search?q=test"))
    // Informational findings never make it into canonical output.
    .stdout(predicate::str::contains("Server Version Disclosure").not());
}
