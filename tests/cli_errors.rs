#![cfg(feature = "cli")]

use approx::assert_relative_eq;
use predicates::prelude::*;

#[test]
fn cli_fails_without_any_input() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mineral_rs");
    cmd.arg("direct");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Missing input data"));
}

#[test]
fn cli_direct_with_inline_json() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mineral_rs");
    let inputs = serde_json::json!({
        "profile": { "gh": 120.0, "alk": 50.0, "ca_share": 0.7, "sal": 0.0, "sal_salt": "NaCl" },
        "unit_mode": "caco3",
        "batch_l": 2.0
    })
    .to_string();

    cmd.arg("--json").arg("direct").arg("--inputs-json").arg(inputs);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"g_per_l\""))
        .stdout(predicate::str::contains("CaCl2·2H2O"));
}

#[test]
fn cli_solve_reads_document_from_stdin() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mineral_rs");
    let doc = serde_json::json!({
        "targets": { "Ca": 30.0, "SO4": 50.0 },
        "unit_mode": "mass",
        "salts": ["CaCl2.2H2O", "NaCl"],
        "batch_l": 1.0
    })
    .to_string();

    cmd.arg("--json").arg("solve").arg("--input").arg("-").write_stdin(doc);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"residual_sq\""))
        .stdout(predicate::str::contains("\"status\""));
}

#[test]
fn cli_applies_presets_in_text_mode() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mineral_rs");
    cmd.arg("concentrate").arg("--preset").arg("sca mid");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("MgSO4·7H2O"))
        .stdout(predicate::str::contains("Grams for bottle"))
        .stdout(predicate::str::contains("Total"));
}

#[test]
fn cli_rejects_unknown_preset() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mineral_rs");
    cmd.arg("stock").arg("--preset").arg("Turkish coffee");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown preset"));
}

#[test]
fn cli_rejects_out_of_range_calcium_share_unless_permissive() {
    let inputs = serde_json::json!({ "profile": { "ca_share": 1.4 } }).to_string();

    let mut strict = assert_cmd::cargo::cargo_bin_cmd!("mineral_rs");
    strict.arg("direct").arg("--inputs-json").arg(&inputs);
    strict
        .assert()
        .failure()
        .stderr(predicate::str::contains("Calcium share"));

    let mut permissive = assert_cmd::cargo::cargo_bin_cmd!("mineral_rs");
    permissive
        .arg("--permissive")
        .arg("direct")
        .arg("--inputs-json")
        .arg(&inputs);
    permissive.assert().success();
}

#[test]
fn cli_rejects_negative_batch() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mineral_rs");
    cmd.arg("solve")
        .arg("--inputs-json")
        .arg(r#"{"targets": {"ca": 10.0}, "batch_l": -1.0}"#);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for 'batch_l'"));
}

#[test]
fn cli_reports_invalid_json_for_inputs_json() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mineral_rs");
    cmd.arg("direct").arg("--inputs-json").arg("{not valid json}");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON for --inputs-json"));
}

#[test]
fn cli_reports_invalid_json_in_file() {
    use std::fs::File;
    use std::io::Write as _;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let file_path = dir.path().join("bad.json");
    let mut f = File::create(&file_path).unwrap();
    writeln!(f, "this is not json").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mineral_rs");
    cmd.arg("stock").arg("--input").arg(file_path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON in input document"));
}

#[test]
fn cli_lists_catalog() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mineral_rs");
    cmd.arg("salts");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Na3C6H5O7·2H2O"))
        .stdout(predicate::str::contains("CO3="));
}

#[test]
fn cli_preset_keeps_document_fields_it_does_not_set() {
    let inputs = serde_json::json!({ "profile": { "sal": 30.0, "sal_salt": "KCl" } }).to_string();
    let mut direct = assert_cmd::cargo::cargo_bin_cmd!("mineral_rs");
    let out = direct
        .arg("--json")
        .arg("direct")
        .arg("--inputs-json")
        .arg(&inputs)
        .arg("--preset")
        .arg("SCA mid")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let plan: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(plan["lines"][3]["component"], "salinity");
    assert_eq!(plan["lines"][3]["salt"], "KCl");

    let inputs = serde_json::json!({
        "targets": { "SO4": 80.0, "Cl": 40.0 },
        "unit_mode": "mass",
        "salts": ["CaSO4·2H2O", "MgSO4·7H2O", "NaHCO3", "CaCl2·2H2O"]
    })
    .to_string();
    let mut solve = assert_cmd::cargo::cargo_bin_cmd!("mineral_rs");
    let out = solve
        .arg("--json")
        .arg("solve")
        .arg("--inputs-json")
        .arg(&inputs)
        .arg("--preset")
        .arg("SCA mid")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let plan: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let target = &plan["report"]["target"];
    assert_eq!(target["so4"], 80.0);
    assert_eq!(target["cl"], 40.0);
    assert_relative_eq!(target["hco3"].as_f64().unwrap(), 40.0 * 61.016 / 50.0, max_relative = 1e-12);
}

#[test]
fn cli_rejects_unsupported_salinity_salt_unless_permissive() {
    let inputs = serde_json::json!({ "profile": { "sal": 20.0, "sal_salt": "Na2SO4" } }).to_string();

    let mut strict = assert_cmd::cargo::cargo_bin_cmd!("mineral_rs");
    strict.arg("direct").arg("--inputs-json").arg(&inputs);
    strict
        .assert()
        .failure()
        .stderr(predicate::str::contains("Salinity salt must be NaCl or KCl"));

    let mut permissive = assert_cmd::cargo::cargo_bin_cmd!("mineral_rs");
    permissive
        .arg("--permissive")
        .arg("direct")
        .arg("--inputs-json")
        .arg(&inputs);
    permissive
        .assert()
        .success()
        .stdout(predicate::str::contains("Na2SO4"));
}
