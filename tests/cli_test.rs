use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn tscat() -> Command {
    let mut cmd = Command::cargo_bin("tscat").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("TSCAT_LOG");
    cmd
}

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/languages")
}

fn fixture(name: &str) -> PathBuf {
    fixtures().join(name)
}

#[test]
fn test_help_flag() {
    tscat()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Qt translation catalogues"))
        .stdout(predicate::str::contains("USAGE:"));
}

#[test]
fn test_version_flag() {
    tscat()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_requires_subcommand() {
    tscat().assert().failure();
}

#[test]
fn test_empty_search_text_fails() {
    tscat()
        .args(["search", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("search text cannot be empty"))
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_search_human_output() {
    tscat()
        .args(["search", "load file", "--dir"])
        .arg(fixtures())
        .assert()
        .success()
        .stdout(predicate::str::contains("de.ts (de) ==="))
        .stdout(predicate::str::contains("-> Datei laden"))
        .stdout(predicate::str::contains("-> Charger un fichier"))
        .stdout(predicate::str::contains("-> 加载文件"));
}

#[test]
fn test_search_simple_output() {
    tscat()
        .args(["search", "Output Engine", "--simple", "--dir"])
        .arg(fixtures())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "de.ts:17:ConfigureAudio:Output Engine: ''\n",
        ));
}

#[test]
fn test_search_json_output() {
    let output = tscat()
        .args(["search", "Wert", "--json", "--dir"])
        .arg(fixtures())
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["query"], "Wert");
    assert_eq!(json["hits"][0]["field"], "translation");
    assert_eq!(json["hits"][0]["entry"]["source"], "Value");
}

#[test]
fn test_search_no_matches() {
    tscat()
        .args(["search", "nonexistent text", "--dir"])
        .arg(fixtures())
        .assert()
        .success()
        .stdout(predicate::str::contains("No matches found for 'nonexistent text'"));
}

#[test]
fn test_lookup() {
    tscat()
        .arg("lookup")
        .arg(fixture("de.ts"))
        .args(["GMainWindow", "Load File"])
        .assert()
        .success()
        .stdout("Datei laden\n");

    // unfinished falls back to the source text
    tscat()
        .arg("lookup")
        .arg(fixture("de.ts"))
        .args(["ConfigureAudio", "Output Engine"])
        .assert()
        .success()
        .stdout("Output Engine\n");
}

#[test]
fn test_lookup_with_comment_and_count() {
    tscat()
        .arg("lookup")
        .arg(fixture("de.ts"))
        .args(["ConfigureAudio", "%1%", "--comment", "Volume percentage (e.g. 50%)"])
        .assert()
        .success()
        .stdout("%1%\n");

    tscat()
        .arg("lookup")
        .arg(fixture("de.ts"))
        .args(["GMainWindow", "%n file(s) remaining", "-n", "3"])
        .assert()
        .success()
        .stdout("%n Dateien verbleibend\n");
}

#[test]
fn test_stats() {
    tscat()
        .arg("stats")
        .arg(fixture("de.ts"))
        .arg(fixture("fr.ts"))
        .assert()
        .success()
        .stdout(predicate::str::contains("[de] 11 messages: 9 finished, 2 unfinished"))
        .stdout(predicate::str::contains(" 66.7% "));
}

#[test]
fn test_stats_json() {
    let output = tscat()
        .args(["stats", "--json"])
        .arg(fixture("zh_CN.ts"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["language"], "zh_CN");
    assert_eq!(json[0]["stats"]["total"], 2);
    assert_eq!(json[0]["completion"], 100.0);
}

#[test]
fn test_check_clean_and_broken() {
    tscat()
        .arg("check")
        .arg(fixture("de.ts"))
        .assert()
        .success()
        .stdout(predicate::str::contains("de.ts: ok"));

    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("it.ts");
    fs::write(&broken, "<TS version=\"2.1\" language=\"it\">\n<context>\n").unwrap();
    tscat()
        .arg("check")
        .arg(&broken)
        .arg(fixture("fr.ts"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("it.ts"))
        .stdout(predicate::str::contains("fr.ts: ok"));
}

#[test]
fn test_check_placeholder_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("de.ts");
    fs::write(
        &file,
        r#"<TS version="2.1" language="de">
<context>
    <name>GMainWindow</name>
    <message>
        <source>Loading shaders %1 / %2</source>
        <translation>Lade Shader %1</translation>
    </message>
</context>
</TS>
"#,
    )
    .unwrap();
    tscat()
        .args(["check", "--simple"])
        .arg(&file)
        .assert()
        .failure()
        .stdout(predicate::str::contains(":4:error:placeholder-mismatch:"));
}

#[test]
fn test_fmt_roundtrip() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("de.ts");
    fs::copy(fixture("de.ts"), &file).unwrap();

    // the fixture keeps the header on one line, so it is not canonical
    tscat().args(["fmt", "--check"]).arg(&file).assert().failure();
    tscat().arg("fmt").arg(&file).assert().success();
    tscat().args(["fmt", "--check"]).arg(&file).assert().success();

    tscat()
        .arg("lookup")
        .arg(&file)
        .args(["GMainWindow", "&File"])
        .assert()
        .success()
        .stdout("&Datei\n");
}

#[test]
fn test_merge() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("template.ts");
    fs::write(
        &template,
        r#"<TS version="2.1">
<context>
    <name>GMainWindow</name>
    <message>
        <source>Load File</source>
        <translation type="unfinished"></translation>
    </message>
    <message>
        <source>Close</source>
        <translation type="unfinished"></translation>
    </message>
</context>
</TS>
"#,
    )
    .unwrap();
    let out = dir.path().join("fr.ts");

    tscat()
        .arg("merge")
        .arg(&template)
        .arg(fixture("fr.ts"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 kept, 1 added, 0 revived, 1 vanished, 1 dropped"));

    let merged = fs::read_to_string(&out).unwrap();
    assert!(merged.contains("<source>Close</source>"));
    assert!(merged.contains("<translation type=\"vanished\">CTRL+F</translation>"));
    assert!(!merged.contains("Save State"));
}

#[test]
fn test_locales() {
    tscat()
        .arg("locales")
        .arg(fixtures())
        .assert()
        .success()
        .stdout(predicate::str::contains("de"))
        .stdout(predicate::str::contains("zh_CN"));

    tscat()
        .arg("locales")
        .arg(fixtures())
        .args(["--resolve", "zh-TW"])
        .assert()
        .success()
        .stdout("zh-TW -> zh_CN (zh_CN)\n");

    tscat()
        .arg("locales")
        .arg(fixtures())
        .args(["--resolve", "ja"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Available: de, fr, zh_CN"));
}

#[test]
fn test_locales_from_environment() {
    tscat()
        .arg("locales")
        .arg(fixtures())
        .arg("--system")
        .env("LC_ALL", "fr_CA.UTF-8")
        .assert()
        .success()
        .stdout("fr_CA.UTF-8 -> fr (fr)\n");
}

#[test]
fn test_log_level_writes_to_stderr() {
    tscat()
        .args(["--log-level", "debug", "lookup"])
        .arg(fixture("fr.ts"))
        .args(["GMainWindow", "Load File"])
        .assert()
        .success()
        .stdout("Charger un fichier\n")
        .stderr(predicate::str::contains("loaded"));
}

#[test]
fn test_fmt_and_merge_keep_dependencies() {
    let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/formats/ru_metadata.ts");
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("ru_RU.ts");
    fs::copy(&source, &file).unwrap();

    tscat().args(["fmt", "--check"]).arg(&file).assert().success();

    let out = dir.path().join("merged.ts");
    tscat()
        .arg("merge")
        .arg(&file)
        .arg(&file)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();
    let merged = fs::read_to_string(&out).unwrap();
    assert!(merged.contains("<dependencies>\n<dependency catalog=\"qtbase_ru\"/>\n"));
    assert!(merged.contains("<extra-po-flags>qt-format</extra-po-flags>"));
}
