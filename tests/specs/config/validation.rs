//! `campers run` specs that fail during RESOLVE, before any cloud call
//! is made (§4.H1, §8 property 4/S4).

use crate::prelude::Project;

#[test]
fn missing_required_fields_exit_with_code_2() {
    let project = Project::empty();
    project.file("campers.yaml", "defaults: {}\n");

    project
        .campers()
        .args(["run"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicates::str::contains("region"));
}

/// S4: `startup_script` without `sync_paths` must fail validation before
/// any provider call — there is no credential or region in this config,
/// so reaching the Compute Adapter would fail differently (exit 1, no
/// mention of `startup_script`).
#[test]
fn startup_script_without_sync_paths_fails_validation() {
    let project = Project::empty();
    project.file(
        "campers.yaml",
        r#"
defaults:
  region: us-east-1
  instance_type: t3.medium
  startup_script: "echo hi"
"#,
    );

    project
        .campers()
        .arg("run")
        .assert()
        .failure()
        .code(2)
        .stderr(predicates::str::contains("startup_script"));
}

#[test]
fn conflicting_playbook_keys_fail_validation() {
    let project = Project::empty();
    project.file(
        "campers.yaml",
        r#"
defaults:
  region: us-east-1
  instance_type: t3.medium
  ansible_playbook: solo.yml
  ansible_playbooks: [a.yml, b.yml]
"#,
    );

    project.campers().arg("run").assert().failure().code(2);
}

#[test]
fn unknown_profile_fails_validation_with_available_names() {
    let project = Project::empty();
    project.file(
        "campers.yaml",
        r#"
defaults:
  region: us-east-1
  instance_type: t3.medium
camps:
  gpu-box: {}
"#,
    );

    project
        .campers()
        .args(["run", "missing-camp"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicates::str::contains("gpu-box"));
}

#[test]
fn cli_overrides_win_over_profile_and_file_defaults() {
    let project = Project::empty();
    project.file(
        "campers.yaml",
        r#"
defaults:
  region: us-east-1
  instance_type: t3.medium
camps:
  gpu-box:
    instance_type: g5.xlarge
"#,
    );

    // `startup_script` is rejected before any region/provider lookup,
    // so this is still a pure RESOLVE-phase assertion: the override
    // reaches validation and the error names the overridden field.
    project
        .campers()
        .args(["run", "gpu-box", "--disk-size", "0"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicates::str::contains("disk_size"));
}
