//! Local git fixtures: a bare "remote" seeded with one commit on `main`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use postbird_core::config::DEFAULT_COMMIT_TEMPLATE;
use postbird_core::{Identity, RepositoryTarget, ResolvedConfig, Timeouts};
use tempfile::TempDir;

/// Run git in `cwd` and return trimmed stdout; panics on failure.
pub fn git(cwd: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("spawn git");
    assert!(
        out.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

fn set_identity(repo: &Path, name: &str) {
    git(repo, &["config", "user.name", name]);
    git(repo, &["config", "user.email", "tests@example.com"]);
    git(repo, &["config", "commit.gpgsign", "false"]);
}

pub struct Remote {
    pub root: TempDir,
    pub bare: PathBuf,
}

impl Remote {
    /// Bare repository with `README.md` committed on `main`.
    pub fn seeded() -> Self {
        let root = TempDir::new().expect("remote root");
        let bare = root.path().join("blog.git");
        git(root.path(), &["init", "--bare", bare.to_str().expect("utf8")]);
        git(&bare, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        let seed = root.path().join("seed");
        git(root.path(), &["init", seed.to_str().expect("utf8")]);
        git(&seed, &["checkout", "-b", "main"]);
        set_identity(&seed, "Seeder");
        std::fs::write(seed.join("README.md"), "# Backyard birds\n").expect("readme");
        git(&seed, &["add", "README.md"]);
        git(&seed, &["commit", "-m", "Initial commit"]);
        git(&seed, &["push", bare.to_str().expect("utf8"), "main"]);

        Remote { root, bare }
    }

    pub fn url(&self) -> String {
        self.bare.to_string_lossy().into_owned()
    }

    /// Commit a file from an independent clone and push it, moving `main`.
    pub fn push_from_elsewhere(&self, file: &str, content: &str) {
        let other = self
            .root
            .path()
            .join(format!("other-{}", file.replace('/', "_")));
        git(
            self.root.path(),
            &["clone", "-b", "main", &self.url(), other.to_str().expect("utf8")],
        );
        set_identity(&other, "Someone Else");
        let path = other.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(&path, content).expect("write");
        git(&other, &["add", "-A"]);
        git(&other, &["commit", "-m", &format!("Add {file}")]);
        git(&other, &["push", "origin", "main"]);
    }

    /// Subject of the tip commit of `main`.
    pub fn head_subject(&self) -> String {
        git(&self.bare, &["log", "-1", "--format=%s", "main"])
    }

    pub fn head(&self) -> String {
        git(&self.bare, &["rev-parse", "main"])
    }

    /// Every path tracked on `main`.
    pub fn files(&self) -> Vec<String> {
        git(&self.bare, &["ls-tree", "-r", "--name-only", "main"])
            .lines()
            .map(str::to_string)
            .collect()
    }
}

pub fn config(url: &str, local_path: &Path) -> ResolvedConfig {
    ResolvedConfig {
        target: RepositoryTarget {
            url: url.to_string(),
            local_path: local_path.to_path_buf(),
            ..RepositoryTarget::default()
        },
        identity: Identity::default(),
        commit_message_template: DEFAULT_COMMIT_TEMPLATE.to_string(),
        timeouts: Timeouts::default(),
    }
}

/// Write a small rendered post into `dir` and return its path.
pub fn write_post(dir: &Path, name: &str, title: &str, body: &str) -> PathBuf {
    std::fs::create_dir_all(dir).expect("mkdir");
    let path = dir.join(name);
    let content = format!(
        "---\ntitle: \"{title}\"\ndate: 2025-03-01T08:30:00Z\ndraft: false\n---\n\n{body}\n"
    );
    std::fs::write(&path, content).expect("write post");
    path
}
