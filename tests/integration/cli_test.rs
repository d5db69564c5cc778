use assert_cmd::Command;
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::Stdio;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn data_file(&self) -> PathBuf {
        self.dir.path().join("decisions.json")
    }

    /// A command against this workspace's data file with a clean environment.
    fn tracker(&self, seed: &str) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("tracker-cli").unwrap();
        cmd.current_dir(self.dir.path())
            .env("TRACKER_SEED", seed)
            .env_remove("TRACKER_DATA_FILE")
            .env_remove("CONTEXT_HUB_URL")
            .env_remove("CONTEXT_HUB_KEY")
            .arg("--data-file")
            .arg(self.data_file());
        cmd
    }

    /// The same invocation as [`Workspace::tracker`], as a plain process
    /// that can be spawned and killed.
    fn tracker_process(&self, seed: &str) -> std::process::Command {
        #[allow(deprecated)]
        let bin = assert_cmd::cargo::cargo_bin("tracker-cli");
        let mut cmd = std::process::Command::new(bin);
        cmd.current_dir(self.dir.path())
            .env("TRACKER_SEED", seed)
            .env_remove("TRACKER_DATA_FILE")
            .env_remove("CONTEXT_HUB_URL")
            .env_remove("CONTEXT_HUB_KEY")
            .arg("--data-file")
            .arg(self.data_file())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }

    fn list_json(&self, seed: &str) -> Value {
        let output = self.tracker(seed).args(["--json", "list"]).output().unwrap();
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

#[test]
fn add_to_builtin_seed_continues_numbering() {
    let ws = Workspace::new();
    ws.tracker("builtin")
        .args(["add", "-d", "Тест: новый партнёр", "--block", "sales"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Added decision P-05"));

    let state = ws.list_json("builtin");
    assert_eq!(state["decisions"].as_array().unwrap().len(), 28);
    assert!(ws.data_file().exists());
}

#[test]
fn add_to_empty_seed_starts_at_one() {
    let ws = Workspace::new();
    let output = ws
        .tracker("empty")
        .args(["--json", "add", "-d", "Платёжный календарь", "--block", "finance"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let out: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(out["id"], "F-01");
}

#[test]
fn add_rejects_unknown_block() {
    let ws = Workspace::new();
    ws.tracker("empty")
        .args(["add", "-d", "x", "--block", "legal"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("error:"));
    assert!(!ws.data_file().exists());
}

#[test]
fn add_rejects_duplicate_id() {
    let ws = Workspace::new();
    ws.tracker("empty")
        .args(["add", "-d", "first", "--id", "O-07"])
        .assert()
        .success();
    ws.tracker("empty")
        .args(["add", "-d", "second", "--id", "O-07"])
        .assert()
        .failure();
}

#[test]
fn update_status_is_recorded_in_history() {
    let ws = Workspace::new();
    ws.tracker("builtin")
        .args(["update", "O-01", "--status", "done"])
        .assert()
        .success()
        .stdout(predicates::str::contains("overdue -> done"));

    let output = ws
        .tracker("builtin")
        .args(["--json", "history"])
        .output()
        .unwrap();
    let history: Value = serde_json::from_slice(&output.stdout).unwrap();
    let last = &history[0];
    assert_eq!(last["action"], "status_change");
    assert_eq!(last["id"], "O-01");
    assert_eq!(last["from"], "overdue");
    assert_eq!(last["to"], "done");
}

#[test]
fn update_unknown_id_fails() {
    let ws = Workspace::new();
    ws.tracker("empty")
        .args(["update", "S-42", "--status", "done"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("S-42"));
}

#[test]
fn list_filters_by_block_and_status() {
    let ws = Workspace::new();
    let output = ws
        .tracker("builtin")
        .args(["--json", "list", "--block", "ops"])
        .output()
        .unwrap();
    let out: Value = serde_json::from_slice(&output.stdout).unwrap();
    let decisions = out["decisions"].as_array().unwrap();
    assert_eq!(decisions.len(), 2);
    assert!(decisions.iter().all(|d| d["block"] == "ops"));

    ws.tracker("empty")
        .args(["list", "--status", "done"])
        .assert()
        .success()
        .stdout(predicates::str::contains("No matching decisions."));
}

#[test]
fn history_is_empty_on_fresh_store() {
    let ws = Workspace::new();
    ws.tracker("empty")
        .arg("history")
        .assert()
        .success()
        .stdout(predicates::str::contains("No history yet."));
}

#[test]
fn pull_without_key_is_a_soft_failure() {
    let ws = Workspace::new();
    ws.tracker("builtin")
        .arg("pull")
        .assert()
        .success()
        .stdout(predicates::str::contains("not configured"));
    assert!(!ws.data_file().exists());
}

#[test]
fn push_against_unreachable_hub_skips_everything() {
    let ws = Workspace::new();
    ws.tracker("empty")
        .args(["add", "-d", "Протокол эскалации"])
        .assert()
        .success();

    ws.tracker("empty")
        .env("CONTEXT_HUB_KEY", "hub-key")
        .args(["--hub-url", "http://127.0.0.1:9", "push"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Pushed 0 decisions"))
        .stdout(predicates::str::contains("O-01 skipped"));
}

#[test]
fn status_reports_unconfigured_hub() {
    let ws = Workspace::new();
    let output = ws
        .tracker("builtin")
        .args(["--json", "status"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let out: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(out["configured"], false);
    assert_eq!(out["hub_ok"], false);
    assert_eq!(out["local_total"], 27);
    assert_eq!(out["linked"], 0);
    assert_eq!(out["local_only"], 27);
}

#[test]
fn pull_merges_remote_decisions() {
    let server = MockServer::start();
    let listing = server.mock(|when, then| {
        when.method(GET)
            .path("/api/decisions")
            .query_param("limit", "200")
            .header("Authorization", "Bearer hub-key");
        then.status(200).json_body(json!({"decisions": [
            {"id": "h-1", "title": "Новый канал продаж", "domain": "marketing",
             "status": "active", "responsible": "Рэшад", "createdAt": "2026-03-01T10:00:00Z"},
            {"id": "h-2", "title": "Закрыть склад", "domain": "logistics", "status": "archived"}
        ]}));
    });

    let ws = Workspace::new();
    ws.tracker("empty")
        .env("CONTEXT_HUB_KEY", "hub-key")
        .args(["--hub-url", &server.base_url(), "pull"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Pulled 2 new decisions"));
    listing.assert();

    let state = ws.list_json("empty");
    let decisions = state["decisions"].as_array().unwrap();
    assert_eq!(decisions.len(), 2);
    let sales = decisions.iter().find(|d| d["hub_id"] == "h-1").unwrap();
    assert_eq!(sales["id"], "P-01");
    assert_eq!(sales["block"], "sales");
    assert_eq!(sales["date_created"], "2026-03-01");
    assert_eq!(sales["source"], "Context Hub");
    let ops = decisions.iter().find(|d| d["hub_id"] == "h-2").unwrap();
    assert_eq!(ops["status"], "done");

    // A second pull finds nothing new.
    ws.tracker("empty")
        .env("CONTEXT_HUB_KEY", "hub-key")
        .args(["--hub-url", &server.base_url(), "pull"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Pulled 0 new decisions"));
    assert_eq!(ws.list_json("empty")["decisions"].as_array().unwrap().len(), 2);
}

#[test]
fn push_links_local_decisions() {
    let server = MockServer::start();
    let extract = server.mock(|when, then| {
        when.method(POST).path("/api/decisions/extract");
        then.status(200).json_body(json!({
            "extracted": {"title": "Протокол эскалации", "domain": "operations"},
            "missingFields": ["deadline"]
        }));
    });
    let draft = server.mock(|when, then| {
        when.method(POST).path("/api/decisions/draft");
        then.status(200).json_body(json!({"draftId": "d-9"}));
    });
    let confirm = server.mock(|when, then| {
        when.method(POST)
            .path("/api/decisions/draft/d-9/confirm")
            .json_body(json!({"userId": "kamilla", "userName": "Камилла"}));
        then.status(200).json_body(json!({"id": "hub-77"}));
    });

    let ws = Workspace::new();
    ws.tracker("empty")
        .args(["add", "-d", "Протокол эскалации", "--responsible", "Паша"])
        .assert()
        .success();

    ws.tracker("empty")
        .env("CONTEXT_HUB_KEY", "hub-key")
        .args(["--hub-url", &server.base_url(), "push"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Pushed 1 decisions"))
        .stdout(predicates::str::contains("O-01 -> hub-77"));
    extract.assert();
    draft.assert();
    confirm.assert();

    let state = ws.list_json("empty");
    assert_eq!(state["decisions"][0]["hub_id"], "hub-77");
    let last = state["history"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["action"], "sync_push");
    assert_eq!(last["count"], 1);

    // Linked decisions are never pushed again.
    ws.tracker("empty")
        .env("CONTEXT_HUB_KEY", "hub-key")
        .args(["--hub-url", &server.base_url(), "push"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Pushed 0 decisions"));
    extract.assert_hits(1);
}

#[test]
fn killed_push_leaves_the_store_writable() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/decisions/extract");
        then.status(200)
            .delay(Duration::from_secs(10))
            .json_body(json!({"extracted": {"title": "first"}}));
    });

    let ws = Workspace::new();
    ws.tracker("empty")
        .args(["add", "-d", "first"])
        .assert()
        .success();

    let mut push = ws
        .tracker_process("empty")
        .env("CONTEXT_HUB_KEY", "hub-key")
        .args(["--hub-url", &server.base_url(), "push"])
        .spawn()
        .unwrap();
    thread::sleep(Duration::from_secs(2));
    push.kill().unwrap();
    push.wait().unwrap();

    ws.tracker("empty")
        .args(["add", "-d", "second"])
        .assert()
        .success()
        .stdout(predicates::str::contains("Added decision O-02"));
    ws.tracker("empty")
        .args(["update", "O-01", "--status", "done"])
        .assert()
        .success();
}
