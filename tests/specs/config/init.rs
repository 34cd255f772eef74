//! `campers init` specs.

use crate::prelude::Project;

#[test]
fn writes_a_starter_config() {
    let project = Project::empty();
    project.campers().arg("init").assert().success();

    let contents = std::fs::read_to_string(project.path().join("campers.yaml")).expect("read campers.yaml");
    assert!(contents.contains("defaults:"));
    assert!(contents.contains("instance_type"));
}

#[test]
fn refuses_to_overwrite_without_force() {
    let project = Project::empty();
    project.file("campers.yaml", "defaults:\n  region: us-east-1\n");

    project
        .campers()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicates::str::contains("--force"));
}

#[test]
fn force_overwrites_existing_config() {
    let project = Project::empty();
    project.file("campers.yaml", "defaults:\n  region: us-east-1\n");

    project.campers().args(["init", "--force"]).assert().success();

    let contents = std::fs::read_to_string(project.path().join("campers.yaml")).expect("read campers.yaml");
    assert!(contents.contains("generated by `campers init`"));
}
