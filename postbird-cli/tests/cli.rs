use std::path::{Path, PathBuf};
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn git(cwd: &Path, args: &[&str]) -> String {
    let out = StdCommand::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("spawn git");
    assert!(
        out.status.success(),
        "git {args:?}: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

/// Scratch space with a seeded bare remote, a config file pointing at it,
/// and an isolated HOME.
struct Env {
    root: TempDir,
    bare: PathBuf,
    config: PathBuf,
}

impl Env {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let bare = root.path().join("blog.git");
        git(root.path(), &["init", "--bare", bare.to_str().unwrap()]);
        git(&bare, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        let seed = root.path().join("seed");
        git(root.path(), &["init", seed.to_str().unwrap()]);
        git(&seed, &["checkout", "-b", "main"]);
        git(&seed, &["config", "user.name", "Seeder"]);
        git(&seed, &["config", "user.email", "seed@example.com"]);
        std::fs::write(seed.join("README.md"), "# blog\n").unwrap();
        git(&seed, &["add", "README.md"]);
        git(&seed, &["commit", "-m", "Initial commit"]);
        git(&seed, &["push", bare.to_str().unwrap(), "main"]);

        let config = root.path().join("config.yaml");
        let env = Env { root, bare, config };
        env.write_config("");
        env
    }

    fn wc(&self) -> PathBuf {
        self.root.path().join("wc")
    }

    fn write_config(&self, extra: &str) {
        let yaml = format!(
            "target:\n  url: {}\n  branch: main\n  local_path: {}\n{extra}",
            self.bare.display(),
            self.wc().display()
        );
        std::fs::write(&self.config, yaml).unwrap();
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("postbird").unwrap();
        cmd.env("HOME", self.root.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    fn post(&self, name: &str, title: &str) -> PathBuf {
        let path = self.root.path().join(name);
        std::fs::write(
            &path,
            format!("---\ntitle: \"{title}\"\ndate: 2025-03-01T08:30:00Z\ndraft: false\n---\n\nBody of {title}.\n"),
        )
        .unwrap();
        path
    }

    fn remote_subject(&self) -> String {
        git(&self.bare, &["log", "-1", "--format=%s", "main"])
    }
}

const ARTIFACT: &str = "title: Cardinals Visit\ndate: 2025-03-01T08:30:00Z\ntags: [birds]\nbody: |\n  Two cardinals.\n";

// ---------------------------------------------------------------------------
// init / check
// ---------------------------------------------------------------------------

#[test]
fn init_writes_config_and_refuses_overwrite() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("nested").join("config.yaml");
    let run = || {
        let mut cmd = Command::cargo_bin("postbird").unwrap();
        cmd.env("HOME", home.path())
            .arg("--config")
            .arg(&config)
            .args(["init", "--url", "https://example.com/o/blog.git", "--token-env", "BLOG_TOKEN"]);
        cmd
    };

    run().assert().success().stdout(predicate::str::contains("Wrote"));
    let written = std::fs::read_to_string(&config).unwrap();
    assert!(written.contains("https://example.com/o/blog.git"));
    assert!(written.contains("token_env: BLOG_TOKEN"));

    run()
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    run().arg("--force").assert().success();
}

#[test]
fn check_passes_with_valid_config() {
    let env = Env::new();
    env.cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("git version"))
        .stdout(predicate::str::contains("ready to deliver"));
}

#[test]
fn check_fails_without_config() {
    let env = Env::new();
    std::fs::remove_file(&env.config).unwrap();
    env.cmd()
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("postbird init"));
}

#[test]
fn check_reports_unset_token_variable() {
    let env = Env::new();
    std::fs::write(
        &env.config,
        "target:\n  url: https://example.com/o/blog.git\nauth:\n  token_env: POSTBIRD_TEST_TOKEN_UNSET\n",
    )
    .unwrap();
    env.cmd()
        .env_remove("POSTBIRD_TEST_TOKEN_UNSET")
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("POSTBIRD_TEST_TOKEN_UNSET"));
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

#[test]
fn render_writes_slugged_file() {
    let env = Env::new();
    let artifact = env.root.path().join("artifact.yaml");
    std::fs::write(&artifact, ARTIFACT).unwrap();
    let out = env.root.path().join("out");

    env.cmd()
        .arg("render")
        .arg(&artifact)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let content = std::fs::read_to_string(out.join("2025-03-01-cardinals-visit.md")).unwrap();
    assert!(content.starts_with("---\ntitle: \"Cardinals Visit\"\n"));
}

// ---------------------------------------------------------------------------
// deliver / publish / status
// ---------------------------------------------------------------------------

#[test]
fn deliver_then_redeliver() {
    let env = Env::new();
    let doc = env.post("cardinals.md", "Cardinals Visit");

    env.cmd()
        .arg("deliver")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("delivered"));
    assert_eq!(env.remote_subject(), "Add blog post: Cardinals Visit");

    env.cmd()
        .arg("deliver")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("no changes"));
}

#[test]
fn deliver_title_flag_overrides_front_matter() {
    let env = Env::new();
    let doc = env.post("jays.md", "Blue Jays");
    env.cmd()
        .args(["deliver", "--title", "Jays Galore"])
        .arg(&doc)
        .assert()
        .success();
    assert_eq!(env.remote_subject(), "Add blog post: Jays Galore");
}

#[test]
fn deliver_json_reports_trace() {
    let env = Env::new();
    let doc = env.post("post.md", "Quiet Morning");

    let output = env
        .cmd()
        .args(["deliver", "--json"])
        .arg(&doc)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "completed");
    assert_eq!(json["sync_action"], "cloned");
    assert_eq!(json["trace"].as_array().map(Vec::len), Some(5));
    assert_eq!(json["commit_message"], "Add blog post: Quiet Morning");
}

#[test]
fn deliver_refuses_document_without_front_matter() {
    let env = Env::new();
    let doc = env.root.path().join("raw.md");
    std::fs::write(&doc, "# Just markdown\n").unwrap();

    env.cmd()
        .arg("deliver")
        .arg(&doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing front matter delimiter"));
    assert!(!env.wc().exists());
}

#[test]
fn failed_delivery_exits_nonzero_with_step() {
    let env = Env::new();
    std::fs::write(
        &env.config,
        format!(
            "target:\n  url: {}\n  branch: gh-pages\n  local_path: {}\n",
            env.bare.display(),
            env.wc().display()
        ),
    )
    .unwrap();
    let doc = env.post("post.md", "T");

    env.cmd()
        .args(["--verbose", "deliver"])
        .arg(&doc)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("failed at sync"));
}

#[test]
fn publish_renders_and_delivers() {
    let env = Env::new();
    let artifact = env.root.path().join("artifact.yaml");
    std::fs::write(&artifact, ARTIFACT).unwrap();
    let image = env.root.path().join("cardinal.png");
    std::fs::write(&image, b"\x89PNG").unwrap();

    env.cmd()
        .arg("publish")
        .arg(&artifact)
        .arg("--asset")
        .arg(&image)
        .arg("--out")
        .arg(env.root.path().join("rendered"))
        .assert()
        .success();

    assert_eq!(env.remote_subject(), "Add blog post: Cardinals Visit");
    let files = git(&env.bare, &["ls-tree", "-r", "--name-only", "main"]);
    assert!(files.contains("content/posts/2025-03-01-cardinals-visit.md"));
    assert!(files.contains("content/posts/images/cardinal.png"));
}

#[test]
fn status_before_and_after_delivery() {
    let env = Env::new();
    env.cmd()
        .args(["status", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"not_initialized\""));

    let doc = env.post("post.md", "Cardinals Visit");
    env.cmd().arg("deliver").arg(&doc).assert().success();

    let output = env.cmd().args(["status", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "ready");
    assert_eq!(json["branch"], "main");
    assert_eq!(json["last_commit"]["message"], "Add blog post: Cardinals Visit");
    assert_eq!(json["has_uncommitted_changes"], false);
}
