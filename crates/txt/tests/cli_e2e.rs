#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn txt(&self) -> Command {
        let mut cmd = Command::new(cargo_bin("txt"));
        cmd.env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env_remove("TXT_DATA_DIR")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .arg("--db")
            .arg(self.dir.path().join("data"));
        cmd
    }
}

#[test]
fn add_list_and_view() {
    let env = Env::new();
    env.txt()
        .args(["add", "buy", "milk"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added T1"));
    env.txt()
        .args(["add", "call mom"])
        .assert()
        .success();

    env.txt()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("T1").and(predicate::str::contains("call mom")))
        .stdout(predicate::str::contains("T2").and(predicate::str::contains("buy milk")));

    env.txt()
        .args(["view", "T2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("buy milk"));
}

#[test]
fn naked_invocation_lists() {
    let env = Env::new();
    env.txt()
        .assert()
        .success()
        .stdout(predicate::str::contains("No messages found."));
}

#[test]
fn duplicate_add_warns_but_succeeds() {
    let env = Env::new();
    env.txt().args(["add", "same"]).assert().success();
    env.txt()
        .args(["add", "same"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not inserted"));
    env.txt()
        .args(["count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn add_reads_stdin() {
    let env = Env::new();
    env.txt()
        .arg("add")
        .write_stdin("from a pipe\n")
        .assert()
        .success();
    env.txt()
        .args(["view", "T1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from a pipe"));
}

#[test]
fn toggle_alias_and_delete() {
    let env = Env::new();
    env.txt().args(["add", "keep this"]).assert().success();
    env.txt()
        .args(["alias", "T1", "keeper"])
        .assert()
        .success()
        .stdout(predicate::str::contains("keeper"));

    env.txt()
        .args(["toggle", "keeper"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved to permanent as P1"));

    env.txt()
        .args(["view", "P1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("keep this"));

    env.txt().args(["delete", "keeper"]).assert().success();
    env.txt()
        .args(["view", "keeper"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Not found: keeper"));
}

#[test]
fn reserved_alias_fails() {
    let env = Env::new();
    env.txt().args(["add", "x"]).assert().success();
    env.txt()
        .args(["alias", "T1", "P2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reserved"));
}

#[test]
fn json_output() {
    let env = Env::new();
    env.txt().args(["add", "json me"]).assert().success();
    let out = env.txt().args(["--json", "list"]).output().unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(value["listed"][0]["msg"], "json me");
    assert_eq!(value["listed"][0]["index"], 1);
    assert_eq!(value["listed"][0]["cat"], "Temporary");
}

#[test]
fn search_across_buckets() {
    let env = Env::new();
    env.txt().args(["add", "Oat milk"]).assert().success();
    env.txt().args(["add", "bread"]).assert().success();
    env.txt()
        .args(["search", "MILK"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Oat milk"))
        .stdout(predicate::str::contains("bread").not());
    env.txt()
        .args(["search", "tea"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No match"));
}

#[test]
fn config_set_and_show() {
    let env = Env::new();
    env.txt()
        .args(["config", "set", "time-offset", "-5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Time offset changed"));
    env.txt()
        .args(["config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("time-offset     -5"));
    env.txt()
        .args(["config", "set", "temp-limit", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));
    env.txt()
        .args(["config", "set", "key-max-age", "99999999999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));
}

#[test]
fn key_and_password() {
    let env = Env::new();
    env.txt()
        .args(["key", "show", "-p", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Wrong password"));

    let out = env
        .txt()
        .args(["--json", "key", "new", "-p", "abc"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let key = value["key"]["key"].as_str().unwrap().to_string();

    env.txt()
        .args(["key", "check", &key])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
    env.txt()
        .args(["key", "check", "nope"])
        .assert()
        .failure();

    env.txt()
        .args(["password", "--current", "abc", "--new", "s3cret"])
        .assert()
        .success();
    env.txt()
        .args(["key", "show", "-p", "s3cret"])
        .assert()
        .success()
        .stdout(predicate::str::contains(key));
}
