use assert_cmd::Command;
use predicates::prelude::*;

const HOSTS: [&str; 8] = [
    "--source-host",
    "https://github.com",
    "--source-user",
    "alice",
    "--destination-host",
    "https://ghe.example.com",
    "--destination-user",
    "bob",
];

fn git_mover() -> Command {
    let mut cmd = Command::cargo_bin("git-mover").unwrap();
    cmd.env_remove("RUST_LOG")
        .env("GIT_MOVER_SOURCE_TOKEN", "src-token")
        .env("GIT_MOVER_DESTINATION_TOKEN", "dst-token");
    cmd
}

#[test]
fn test_help_lists_data_types() {
    git_mover()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("branches, deploy_keys, releases"));
}

#[test]
fn test_version() {
    git_mover()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("git-mover"));
}

#[test]
fn test_missing_arguments_exit_1() {
    git_mover().assert().code(1);
}

#[test]
fn test_missing_token_exit_1() {
    let mut cmd = Command::cargo_bin("git-mover").unwrap();
    cmd.env_remove("GIT_MOVER_SOURCE_TOKEN")
        .env_remove("GIT_MOVER_DESTINATION_TOKEN")
        .args(["acme/widgets", "."])
        .args(HOSTS)
        .arg("--clone")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--source-token"));
}

#[test]
fn test_invalid_repository_name_exit_1() {
    git_mover()
        .args(["acme/widgets/extra", "."])
        .args(HOSTS)
        .arg("--clone")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a valid repository name"));
}

#[test]
fn test_mismatched_repository_lists_exit_1() {
    git_mover()
        .args(["a/x,a/y", "b/x"])
        .args(HOSTS)
        .arg("--github-data")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Number of source repositories specified (2) does not equal the number of destination repositories (1)",
        ));
}

#[test]
fn test_plain_http_host_exit_1() {
    git_mover()
        .args(["acme/widgets", "."])
        .args([
            "--source-host",
            "http://github.com",
            "--source-user",
            "alice",
            "--destination-host",
            "https://ghe.example.com",
            "--destination-user",
            "bob",
        ])
        .arg("--clone")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("HTTPS"));
}

#[test]
fn test_no_action_exit_1() {
    git_mover()
        .args(["acme/widgets", "."])
        .args(HOSTS)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Action not specified"));
}

#[test]
fn test_unknown_data_type_exit_1() {
    git_mover()
        .args(["acme/widgets", "."])
        .args(HOSTS)
        .args(["--github-data", "wikis"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown GitHub data type 'wikis'"));
}

#[test]
fn test_camel_case_options_accepted() {
    git_mover()
        .args(["acme/widgets", "."])
        .args([
            "--sourceHost",
            "https://github.com",
            "--sourceUserName",
            "alice",
            "--destinationHost",
            "https://ghe.example.com",
            "--destinationUserName",
            "bob",
            "--githubData",
            "bogus",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown GitHub data type 'bogus'"));
}

#[test]
fn test_clone_without_git_exit_2() {
    git_mover()
        .env("PATH", "")
        .args(["acme/widgets", "."])
        .args(HOSTS)
        .arg("--clone")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("git"));
}
