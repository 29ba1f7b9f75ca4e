//! Import runs against an in-memory GitLab and store.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use backfill_commit::{Commit, Project, ProjectId, User};
use backfill_core::{CommitStore, CoreError, Importer, RunOptions};
use backfill_git::{GitError, GitResult};
use backfill_gitlab::{GitLabApi, GitLabError, GitLabResult, ProjectOutcome};
use chrono::DateTime;

#[derive(Default)]
struct FakeGitLab {
    projects: Vec<u64>,
    commits: HashMap<u64, Vec<Commit>>,
    failing: HashSet<u64>,
    user_fails: bool,
}

#[async_trait]
impl GitLabApi for FakeGitLab {
    async fn current_user(&self) -> GitLabResult<User> {
        if self.user_fails {
            return Err(GitLabError::Status {
                url: "/api/v4/user".to_string(),
                status: 401,
            });
        }
        Ok(User {
            id: 42,
            username: "jane".to_string(),
            name: "Jane Doe".to_string(),
            email: None,
            web_url: None,
        })
    }

    async fn contributed_projects(&self, user_id: u64) -> GitLabResult<Vec<Project>> {
        assert_eq!(user_id, 42);
        Ok(self
            .projects
            .iter()
            .map(|&id| Project {
                id: ProjectId(id),
                name: None,
                path_with_namespace: None,
            })
            .collect())
    }

    async fn commits_page(
        &self,
        project: ProjectId,
        _author: &str,
        page: u32,
        _per_page: u32,
    ) -> GitLabResult<Vec<Commit>> {
        if self.failing.contains(&project.0) {
            return Err(GitLabError::Status {
                url: format!("/projects/{project}/repository/commits"),
                status: 503,
            });
        }
        if page > 1 {
            return Ok(Vec::new());
        }
        Ok(self.commits.get(&project.0).cloned().unwrap_or_default())
    }
}

/// Records everything in shared state the test keeps a handle on.
#[derive(Clone, Default)]
struct MemoryStore {
    recorded: Arc<Mutex<Vec<String>>>,
    pushes: Arc<AtomicUsize>,
    reject_containing: Option<&'static str>,
}

impl CommitStore for MemoryStore {
    fn materialize_commits(&mut self, commits: &[Commit]) -> GitResult<usize> {
        if let Some(marker) = self.reject_containing
            && commits.iter().any(|c| c.id.contains(marker))
        {
            return Err(GitError::Git2(git2::Error::from_str("index locked")));
        }

        let mut recorded = self.recorded.lock().unwrap();
        let before = recorded.len();
        for commit in commits {
            if !recorded.contains(&commit.id) {
                recorded.push(commit.id.clone());
            }
        }
        Ok(recorded.len() - before)
    }

    fn push(&self) -> GitResult<()> {
        self.pushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn commit(id: &str) -> Commit {
    Commit::new(
        id,
        "change",
        "Jane Doe",
        "jane@corp.example",
        DateTime::parse_from_rfc3339("2024-04-01T09:00:00Z").unwrap(),
    )
}

fn fake(projects: &[(u64, &[&str])]) -> FakeGitLab {
    FakeGitLab {
        projects: projects.iter().map(|(id, _)| *id).collect(),
        commits: projects
            .iter()
            .map(|(id, ids)| (*id, ids.iter().copied().map(commit).collect()))
            .collect(),
        ..FakeGitLab::default()
    }
}

fn importer(api: FakeGitLab) -> Importer {
    Importer::new(Arc::new(api), "Jane Doe")
}

#[tokio::test]
async fn test_run_records_every_project_and_pushes() {
    let store = MemoryStore::default();
    let handle = store.clone();

    let summary = importer(fake(&[(1, &["a1", "a2"]), (2, &["b1"])]))
        .run(move || Ok(store), RunOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.user.id, 42);
    assert_eq!(summary.project_count(), 2);
    assert_eq!(summary.imported, 3);
    assert!(summary.pushed);
    assert!(!summary.has_failures());
    assert_eq!(handle.pushes.load(Ordering::SeqCst), 1);

    let mut recorded = handle.recorded.lock().unwrap().clone();
    recorded.sort();
    assert_eq!(recorded, vec!["a1", "a2", "b1"]);
}

#[tokio::test]
async fn test_no_projects_never_opens_store() {
    let opened = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&opened);

    let result = importer(fake(&[]))
        .run(
            move || {
                flag.store(true, Ordering::SeqCst);
                Ok(MemoryStore::default())
            },
            RunOptions::default(),
        )
        .await;

    assert!(matches!(
        result,
        Err(CoreError::EmptyContributions { user_id: 42 })
    ));
    assert!(!opened.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_failing_project_does_not_stop_others() {
    let mut api = fake(&[(1, &["a1"]), (2, &["b1"]), (3, &["c1", "c2"])]);
    api.failing.insert(2);
    let store = MemoryStore::default();
    let handle = store.clone();

    let summary = importer(api)
        .run(move || Ok(store), RunOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.imported, 3);
    assert!(summary.has_failures());
    assert!(matches!(
        summary.report.outcome(ProjectId(2)),
        Some(ProjectOutcome::Failed { reason }) if reason.contains("503")
    ));
    assert_eq!(handle.pushes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_project_without_commits_is_empty() {
    let summary = importer(fake(&[(1, &["a1"]), (2, &[])]))
        .run(|| Ok(MemoryStore::default()), RunOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.report.empty_count(), 1);
    assert_eq!(summary.imported, 1);
    assert!(!summary.has_failures());
}

#[tokio::test]
async fn test_no_push_option_skips_push() {
    let store = MemoryStore::default();
    let handle = store.clone();

    let summary = importer(fake(&[(1, &["a1"])]))
        .run(move || Ok(store), RunOptions { push: false })
        .await
        .unwrap();

    assert!(!summary.pushed);
    assert_eq!(summary.imported, 1);
    assert_eq!(handle.pushes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejected_batch_is_reported() {
    let store = MemoryStore {
        reject_containing: Some("bad"),
        ..MemoryStore::default()
    };
    let handle = store.clone();

    let summary = importer(fake(&[(1, &["good-1"]), (2, &["bad-1"])]))
        .run(move || Ok(store), RunOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.imported, 1);
    assert_eq!(summary.store_failures.len(), 1);
    assert_eq!(summary.store_failures[0].0, ProjectId(2));
    assert!(summary.store_failures[0].1.contains("index locked"));
    assert_eq!(handle.pushes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_store_open_failure_is_fatal() {
    let result = importer(fake(&[(1, &["a1"])]))
        .run(
            || -> GitResult<MemoryStore> { Err(GitError::NotARepo("/tmp/x".into())) },
            RunOptions::default(),
        )
        .await;

    assert!(matches!(result, Err(CoreError::Git(GitError::NotARepo(_)))));
}

#[tokio::test]
async fn test_user_resolution_failure_is_fatal() {
    let api = FakeGitLab {
        user_fails: true,
        ..FakeGitLab::default()
    };

    let result = importer(api)
        .run(|| Ok(MemoryStore::default()), RunOptions::default())
        .await;

    assert!(matches!(
        result,
        Err(CoreError::GitLab(GitLabError::Status { status: 401, .. }))
    ));
}
