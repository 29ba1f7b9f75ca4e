//! Orchestrator tests against an in-memory GitLab.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backfill_commit::{Commit, CommitBatch, Project, ProjectId, User};
use backfill_gitlab::{
    GitLabApi, GitLabError, GitLabResult, PageLimits, PaginationStop, ProjectOutcome, fetch_all,
};
use chrono::DateTime;
use tokio::sync::mpsc;

/// Per-project scripted history. Missing projects answer with a 404.
#[derive(Default)]
struct FakeGitLab {
    pages: HashMap<u64, Vec<Vec<Commit>>>,
    failing: HashSet<u64>,
    delay: HashMap<u64, Duration>,
}

impl FakeGitLab {
    fn with_pages(mut self, project: u64, pages: Vec<Vec<Commit>>) -> Self {
        self.pages.insert(project, pages);
        self
    }

    fn failing(mut self, project: u64) -> Self {
        self.failing.insert(project);
        self
    }

    fn delayed(mut self, project: u64, delay: Duration) -> Self {
        self.delay.insert(project, delay);
        self
    }
}

#[async_trait]
impl GitLabApi for FakeGitLab {
    async fn current_user(&self) -> GitLabResult<User> {
        unreachable!("orchestrator never resolves the user")
    }

    async fn contributed_projects(&self, _user_id: u64) -> GitLabResult<Vec<Project>> {
        unreachable!("orchestrator never lists projects")
    }

    async fn commits_page(
        &self,
        project: ProjectId,
        _author: &str,
        page: u32,
        _per_page: u32,
    ) -> GitLabResult<Vec<Commit>> {
        if let Some(delay) = self.delay.get(&project.0) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&project.0) {
            return Err(GitLabError::Status {
                url: format!("/projects/{project}/repository/commits"),
                status: 500,
            });
        }
        let pages = self.pages.get(&project.0).cloned().unwrap_or_default();
        Ok(pages.get(page as usize - 1).cloned().unwrap_or_default())
    }
}

fn commit(id: &str) -> Commit {
    Commit::new(
        id,
        format!("work on {id}"),
        "Jane",
        "jane@example.com",
        DateTime::parse_from_rfc3339("2024-02-10T09:30:00Z").unwrap(),
    )
}

async fn drain(mut rx: mpsc::Receiver<CommitBatch>) -> Vec<CommitBatch> {
    let mut batches = Vec::new();
    while let Some(batch) = rx.recv().await {
        batches.push(batch);
    }
    batches
}

#[tokio::test]
async fn test_failed_project_is_dropped_and_others_delivered() {
    let fake = FakeGitLab::default()
        .with_pages(1, vec![vec![commit("a1"), commit("a2")]])
        .with_pages(3, vec![vec![commit("c1")]])
        .failing(2);
    let api: Arc<dyn GitLabApi> = Arc::new(fake);
    let projects = [ProjectId(1), ProjectId(2), ProjectId(3)];

    let (tx, rx) = mpsc::channel(projects.len());
    let consumer = tokio::spawn(drain(rx));

    let report = fetch_all(
        Arc::clone(&api),
        &projects,
        "Jane",
        PageLimits::default(),
        tx,
    )
    .await;

    // The consumer only finishes once the channel is closed.
    let batches = tokio::time::timeout(Duration::from_secs(5), consumer)
        .await
        .expect("channel was not closed")
        .unwrap();

    let mut delivered: Vec<_> = batches.iter().map(|b| b.project).collect();
    delivered.sort();
    assert_eq!(delivered, vec![ProjectId(1), ProjectId(3)]);

    assert_eq!(report.fetched_count(), 2);
    assert_eq!(report.total_commits(), 3);
    assert!(matches!(
        report.outcome(ProjectId(2)),
        Some(ProjectOutcome::Failed { reason }) if reason.contains("500")
    ));

    // Every task dropped its clone of the client.
    assert_eq!(Arc::strong_count(&api), 1);
}

#[tokio::test]
async fn test_outcomes_follow_input_order() {
    let fake = FakeGitLab::default()
        .with_pages(10, vec![vec![commit("x")]])
        .with_pages(20, vec![vec![commit("y")]])
        .delayed(10, Duration::from_millis(50));
    let api: Arc<dyn GitLabApi> = Arc::new(fake);
    let projects = [ProjectId(10), ProjectId(20), ProjectId(30)];

    let (tx, rx) = mpsc::channel(projects.len());
    let consumer = tokio::spawn(drain(rx));

    let report = fetch_all(api, &projects, "Jane", PageLimits::default(), tx).await;
    let batches = consumer.await.unwrap();

    let order: Vec<_> = report.outcomes().iter().map(|(id, _)| *id).collect();
    assert_eq!(order, projects.to_vec());
    assert_eq!(report.outcome(ProjectId(30)), Some(&ProjectOutcome::Empty));

    // The delayed project finishes last.
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[1].project, ProjectId(10));
}

#[tokio::test]
async fn test_batches_are_deduplicated_per_project() {
    let page = vec![commit("d1"), commit("d2")];
    let fake = FakeGitLab::default().with_pages(
        7,
        vec![page.clone(), page.clone(), page],
    );
    let api: Arc<dyn GitLabApi> = Arc::new(fake);

    let (tx, rx) = mpsc::channel(1);
    let consumer = tokio::spawn(drain(rx));

    let report = fetch_all(api, &[ProjectId(7)], "Jane", PageLimits::default(), tx).await;
    let batches = consumer.await.unwrap();

    assert_eq!(batches.len(), 1);
    let ids: Vec<_> = batches[0].commits.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["d1", "d2"]);
    assert_eq!(
        report.outcome(ProjectId(7)),
        Some(&ProjectOutcome::Fetched {
            commits: 2,
            stop: PaginationStop::DuplicatePage { page: 2 },
        })
    );
}

#[tokio::test]
async fn test_closed_receiver_marks_projects_failed() {
    let fake = FakeGitLab::default()
        .with_pages(1, vec![vec![commit("a")]])
        .with_pages(2, vec![vec![commit("b")]]);
    let api: Arc<dyn GitLabApi> = Arc::new(fake);

    let (tx, rx) = mpsc::channel(2);
    drop(rx);

    let report = fetch_all(
        api,
        &[ProjectId(1), ProjectId(2)],
        "Jane",
        PageLimits::default(),
        tx,
    )
    .await;

    assert_eq!(report.fetched_count(), 0);
    assert_eq!(report.failures().count(), 2);
}

#[tokio::test]
async fn test_no_projects_closes_immediately() {
    let api: Arc<dyn GitLabApi> = Arc::new(FakeGitLab::default());
    let (tx, rx) = mpsc::channel(1);
    let consumer = tokio::spawn(drain(rx));

    let report = fetch_all(api, &[], "Jane", PageLimits::default(), tx).await;

    assert!(report.outcomes().is_empty());
    assert!(consumer.await.unwrap().is_empty());
}
