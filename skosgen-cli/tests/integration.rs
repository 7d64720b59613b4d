use assert_cmd::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// `skosgen` running inside an isolated temp directory.
fn skosgen_cmd(work_dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("skosgen");
    cmd.current_dir(work_dir.path());
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    cmd
}

const SKILLS: &str = "\
conceptUri,preferredLabel,altLabels,description
http://data.europa.eu/esco/skill/A1,Kochen,Garen|Zubereiten,Speisen zubereiten
http://data.europa.eu/esco/skill/B2,Backen,,
http://data.europa.eu/esco/skill/C3,Braten,,
";

const HIERARCHY: &str = "\
conceptUri,broaderUri
http://data.europa.eu/esco/skill/B2,http://data.europa.eu/esco/skill/A1
http://data.europa.eu/esco/skill/Z9,http://data.europa.eu/esco/skill/A1
";

const GREEN: &str = "\
conceptUri
http://data.europa.eu/esco/skill/A1
http://data.europa.eu/esco/skill/C3
";

fn write_sources(tmp: &TempDir) {
    fs::write(tmp.path().join("skills.csv"), SKILLS).unwrap();
    fs::write(tmp.path().join("hierarchy.csv"), HIERARCHY).unwrap();
    fs::write(tmp.path().join("green.csv"), GREEN).unwrap();
}

// ============================================================================
// Global flags
// ============================================================================

#[test]
fn version_flag() {
    cargo_bin_cmd!("skosgen")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("skosgen"));
}

#[test]
fn help_lists_commands() {
    cargo_bin_cmd!("skosgen")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("clean"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn verbose_quiet_conflict() {
    cargo_bin_cmd!("skosgen")
        .args(["--verbose", "--quiet", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

// ============================================================================
// init
// ============================================================================

#[test]
fn init_writes_config_and_refuses_overwrite() {
    let tmp = TempDir::new().unwrap();
    skosgen_cmd(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default configuration"));
    let text = fs::read_to_string(tmp.path().join("skosgen.toml")).unwrap();
    assert!(text.contains("base_uri = "));

    skosgen_cmd(&tmp)
        .arg("init")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already exists"));

    skosgen_cmd(&tmp).args(["init", "--force"]).assert().success();
}

// ============================================================================
// build
// ============================================================================

#[test]
fn build_writes_turtle_and_summary() {
    let tmp = TempDir::new().unwrap();
    write_sources(&tmp);

    skosgen_cmd(&tmp)
        .args([
            "build",
            "--primary",
            "skills.csv",
            "--hierarchy",
            "hierarchy.csv",
            "--collection",
            "green=green.csv",
            "--created",
            "2024-05-01",
            "-o",
            "skills.ttl",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("3  concepts"))
        .stdout(predicate::str::contains("orphan relations"))
        .stdout(predicate::str::contains("Wrote skills.ttl"));

    let ttl = fs::read_to_string(tmp.path().join("skills.ttl")).unwrap();
    let base = "http://w3id.org/openeduhub/vocabs/escoSkills/";
    assert!(ttl.contains("@prefix skos: <http://www.w3.org/2004/02/skos/core#> ."));
    assert!(ttl.contains(&format!("<{base}A1> a skos:Concept")));
    assert!(ttl.contains("skos:altLabel \"Zubereiten\"@de"));
    assert!(ttl.contains(&format!("skos:broader <{base}A1>")));
    assert!(ttl.contains(&format!("<{base}collections/green> a skos:Collection")));
    assert!(ttl.contains("\"2024-05-01\"^^xsd:date"));
    assert!(!ttl.contains("Z9"));
}

#[test]
fn build_is_deterministic() {
    let tmp = TempDir::new().unwrap();
    write_sources(&tmp);
    for out in ["a.ttl", "b.ttl"] {
        skosgen_cmd(&tmp)
            .args([
                "-q",
                "build",
                "--primary",
                "skills.csv",
                "--hierarchy",
                "hierarchy.csv",
                "--created",
                "2024-05-01",
                "-o",
                out,
            ])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }
    let a = fs::read(tmp.path().join("a.ttl")).unwrap();
    let b = fs::read(tmp.path().join("b.ttl")).unwrap();
    assert_eq!(a, b);
}

#[test]
fn build_writes_cleaned_output_and_json_changelog() {
    let tmp = TempDir::new().unwrap();
    write_sources(&tmp);

    skosgen_cmd(&tmp)
        .args([
            "build",
            "--primary",
            "skills.csv",
            "--created",
            "2024-05-01",
            "-o",
            "raw.ttl",
            "--cleaned",
            "clean.ttl",
            "--changelog",
            "changes.json",
            "--changelog-format",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("reconciled"));

    // Generated output is already in canonical form.
    let raw = fs::read_to_string(tmp.path().join("raw.ttl")).unwrap();
    let cleaned = fs::read_to_string(tmp.path().join("clean.ttl")).unwrap();
    assert_eq!(raw, cleaned);

    let log: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("changes.json")).unwrap())
            .unwrap();
    assert_eq!(log["entries"].as_array().map(Vec::len), Some(0));
    assert_eq!(log["triples_before"], log["triples_after"]);
}

#[test]
fn build_reads_config_file_and_flags_override_it() {
    let tmp = TempDir::new().unwrap();
    write_sources(&tmp);
    fs::write(
        tmp.path().join("skosgen.toml"),
        "base_uri = \"http://example.org/from-file/\"\nlocale_tag = \"en\"\n",
    )
    .unwrap();

    skosgen_cmd(&tmp)
        .args([
            "-q",
            "build",
            "--primary",
            "skills.csv",
            "--base-uri",
            "http://example.org/from-flag/",
            "--created",
            "2024-05-01",
            "-o",
            "out.ttl",
        ])
        .assert()
        .success();

    let ttl = fs::read_to_string(tmp.path().join("out.ttl")).unwrap();
    assert!(ttl.contains("<http://example.org/from-flag/A1>"));
    assert!(!ttl.contains("from-file"));
    assert!(ttl.contains("\"Kochen\"@en"));
}

#[test]
fn build_fails_on_missing_primary_column() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("skills.csv"), "conceptUri,label\nA1,Kochen\n").unwrap();

    skosgen_cmd(&tmp)
        .args(["build", "--primary", "skills.csv", "-o", "out.ttl"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing required column"));
    assert!(!tmp.path().join("out.ttl").exists());
}

#[test]
fn build_drops_unusable_auxiliary_source() {
    let tmp = TempDir::new().unwrap();
    write_sources(&tmp);
    fs::write(tmp.path().join("bad.csv"), "child,parent\nB2,A1\n").unwrap();

    skosgen_cmd(&tmp)
        .args([
            "build",
            "--primary",
            "skills.csv",
            "--hierarchy",
            "bad.csv",
            "--created",
            "2024-05-01",
            "-o",
            "out.ttl",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("dropped bad.csv"));
    assert!(tmp.path().join("out.ttl").exists());
}

#[test]
fn build_rejects_malformed_collection_flag() {
    let tmp = TempDir::new().unwrap();
    write_sources(&tmp);
    skosgen_cmd(&tmp)
        .args([
            "build",
            "--primary",
            "skills.csv",
            "--collection",
            "green.csv",
            "-o",
            "out.ttl",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected <tag>=<csv>"));
}

#[test]
fn build_rejects_malformed_base_uri() {
    let tmp = TempDir::new().unwrap();
    write_sources(&tmp);
    skosgen_cmd(&tmp)
        .args([
            "build",
            "--primary",
            "skills.csv",
            "--base-uri",
            "not a uri",
            "-o",
            "out.ttl",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("malformed base URI"));
}

#[test]
fn missing_primary_file_fails_with_summary() {
    let tmp = TempDir::new().unwrap();
    skosgen_cmd(&tmp)
        .args(["build", "--primary", "nope.csv", "-o", "out.ttl"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nope.csv: cannot read"))
        .stdout(predicate::str::contains("dropped nope.csv (primary)"))
        .stdout(predicate::str::contains("0  concepts"));
    assert!(!tmp.path().join("out.ttl").exists());
}

#[test]
fn build_continues_when_auxiliary_file_is_missing() {
    let tmp = TempDir::new().unwrap();
    write_sources(&tmp);

    skosgen_cmd(&tmp)
        .args([
            "build",
            "--primary",
            "skills.csv",
            "--hierarchy",
            "missing.csv",
            "--collection",
            "green=absent.csv",
            "--created",
            "2024-05-01",
            "-o",
            "out.ttl",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("dropped missing.csv (hierarchy)"))
        .stdout(predicate::str::contains("dropped absent.csv (collection 'green')"))
        .stdout(predicate::str::contains("3  concepts"));

    let ttl = fs::read_to_string(tmp.path().join("out.ttl")).unwrap();
    assert!(ttl.contains("skos:prefLabel \"Backen\"@de"));
    assert!(!ttl.contains("skos:broader"));
}

#[test]
fn usage_error_still_ends_with_summary() {
    let tmp = TempDir::new().unwrap();
    write_sources(&tmp);
    skosgen_cmd(&tmp)
        .args(["build", "--primary", "skills.csv", "--collection", "green", "-o", "out.ttl"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Sources"))
        .stdout(predicate::str::contains("Build"));
}

#[test]
fn group_tables_anchor_broader_edges() {
    let tmp = TempDir::new().unwrap();
    write_sources(&tmp);
    fs::write(
        tmp.path().join("groups.csv"),
        "conceptUri,preferredLabel,altLabels,description,code\n\
         http://data.europa.eu/esco/skill/S1,Lebensmittel zubereiten,,,S1\n",
    )
    .unwrap();
    fs::write(
        tmp.path().join("pillar.csv"),
        "conceptUri,broaderUri\n\
         http://data.europa.eu/esco/skill/A1,http://data.europa.eu/esco/skill/S1\n",
    )
    .unwrap();

    skosgen_cmd(&tmp)
        .args([
            "build",
            "--primary",
            "skills.csv",
            "--group",
            "groups.csv",
            "--hierarchy",
            "pillar.csv",
            "--created",
            "2024-05-01",
            "-o",
            "out.ttl",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("4  concepts"))
        .stdout(predicate::str::contains("1  accepted relations"))
        .stdout(predicate::str::contains("orphan relations").not());

    let base = "http://w3id.org/openeduhub/vocabs/escoSkills/";
    let ttl = fs::read_to_string(tmp.path().join("out.ttl")).unwrap();
    assert!(ttl.contains(&format!("<{base}S1> a skos:Concept")));
    assert!(ttl.contains(&format!("skos:broader <{base}S1>")));
    assert!(ttl.contains(&format!("skos:narrower <{base}A1>")));
}

// ============================================================================
// clean
// ============================================================================

const DAMAGED: &str = "\
@prefix skos: <http://www.w3.org/2004/02/skos/core#> .

<http://w3id.org/openeduhub/vocabs/escoSkills/A1> a skos:Concept ;
    skos:prefLabel \"Kochen\"@de .

<https://w3id.org/openeduhub/vocabs/escoSkills/A1> skos:prefLabel \"Kochen\"@DE ;
    skos:altLabel \"Garen\"@de .
";

#[test]
fn clean_merges_and_logs_changes() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("in.ttl"), DAMAGED).unwrap();

    skosgen_cmd(&tmp)
        .args([
            "clean",
            "in.ttl",
            "-o",
            "out.ttl",
            "--changelog",
            "changes.txt",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("reconciled"));

    let out = fs::read_to_string(tmp.path().join("out.ttl")).unwrap();
    assert!(!out.contains("https://"));
    assert_eq!(out.matches("skos:prefLabel").count(), 1);
    assert!(out.contains("skos:altLabel \"Garen\"@de"));

    let log = fs::read_to_string(tmp.path().join("changes.txt")).unwrap();
    assert!(log.contains("duplicate"));
    assert!(log.contains("merged into block at line 3"));
    assert!(log.contains("; reconciled"));
}

#[test]
fn clean_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("in.ttl"), DAMAGED).unwrap();

    skosgen_cmd(&tmp)
        .args(["-q", "clean", "in.ttl", "-o", "once.ttl"])
        .assert()
        .success();
    skosgen_cmd(&tmp)
        .args([
            "-q",
            "clean",
            "once.ttl",
            "-o",
            "twice.ttl",
            "--changelog",
            "second.json",
            "--changelog-format",
            "json",
        ])
        .assert()
        .success();

    let once = fs::read_to_string(tmp.path().join("once.ttl")).unwrap();
    let twice = fs::read_to_string(tmp.path().join("twice.ttl")).unwrap();
    assert_eq!(once, twice);
    let log: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("second.json")).unwrap())
            .unwrap();
    assert_eq!(log["entries"].as_array().map(Vec::len), Some(0));
}

#[test]
fn clean_decodes_with_configured_candidates() {
    let tmp = TempDir::new().unwrap();
    let text = "@prefix skos: <http://www.w3.org/2004/02/skos/core#> .\n\n\
                <http://w3id.org/openeduhub/vocabs/escoSkills/A1> a skos:Concept ;\n    \
                skos:prefLabel \"K\u{fc}che\"@de .\n";

    // UTF-8 with a byte-order mark.
    let mut bom = vec![0xEF, 0xBB, 0xBF];
    bom.extend_from_slice(text.as_bytes());
    fs::write(tmp.path().join("bom.ttl"), bom).unwrap();

    // Windows-1252: u-umlaut is the single byte 0xFC.
    let cp1252: Vec<u8> = text
        .chars()
        .map(|c| if c == '\u{fc}' { 0xFC } else { c as u8 })
        .collect();
    fs::write(tmp.path().join("cp1252.ttl"), cp1252).unwrap();

    for (input, output) in [("bom.ttl", "bom.out.ttl"), ("cp1252.ttl", "cp1252.out.ttl")] {
        skosgen_cmd(&tmp)
            .args(["-q", "clean", input, "-o", output])
            .assert()
            .success();
        let cleaned = fs::read_to_string(tmp.path().join(output)).unwrap();
        assert_eq!(cleaned, text, "{input}");
    }
}

#[test]
fn clean_reports_undecodable_input() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("skosgen.toml"), "encoding_candidates = [\"utf-8\"]\n").unwrap();
    fs::write(tmp.path().join("in.ttl"), [b'<', 0xFF, b'>']).unwrap();

    skosgen_cmd(&tmp)
        .args(["clean", "in.ttl", "-o", "out.ttl"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not decodable with any candidate encoding"));
}

#[test]
fn clean_rejects_unparseable_input() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("in.ttl"), "<a> <b> \"unterminated .\n").unwrap();

    skosgen_cmd(&tmp)
        .args(["clean", "in.ttl", "-o", "out.ttl"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not readable as Turtle"));
}
