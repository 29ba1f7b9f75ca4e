//! Git repository wrapper.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use backfill_commit::Commit;
use git2::build::RepoBuilder;
use git2::{
    Cred, CredentialType, FetchOptions, Oid, PushOptions, RemoteCallbacks, Repository as Git2Repo,
    Signature, Time,
};
use tracing::{debug, info};

use crate::{GitError, GitResult};

/// Username sent with token credentials when the URL carries none.
const TOKEN_USERNAME: &str = "oauth2";

/// Name and email recorded on every imported commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// Where the mirror lives and how to reach its remote.
#[derive(Clone)]
pub struct RepoSettings {
    /// Destination remote.
    pub repo_url: String,
    /// Token for HTTPS remotes.
    pub token: Option<String>,
    /// Local clone directory.
    pub path: PathBuf,
    /// Branch receiving imported commits.
    pub branch: String,
    /// Signature of imported commits.
    pub identity: Identity,
}

impl fmt::Debug for RepoSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoSettings")
            .field("repo_url", &self.repo_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("path", &self.path)
            .field("branch", &self.branch)
            .field("identity", &self.identity)
            .finish()
    }
}

/// A local clone of the destination remote.
pub struct Repository {
    inner: Git2Repo,
    branch: String,
    token: Option<String>,
    identity: Identity,
}

impl Repository {
    /// Opens the clone at `settings.path`, cloning `settings.repo_url` first
    /// if the directory does not exist or is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory holds something other than a git
    /// repository, or if cloning fails.
    pub fn open_or_clone(settings: &RepoSettings) -> GitResult<Self> {
        let path = settings.path.as_path();

        let inner = if is_missing_or_empty(path)? {
            info!(url = %settings.repo_url, ?path, "cloning destination repository");
            clone(settings)?
        } else {
            debug!(?path, "opening existing clone");
            Git2Repo::open(path).map_err(|_| GitError::NotARepo(path.to_path_buf()))?
        };

        Ok(Self {
            inner,
            branch: settings.branch.clone(),
            token: settings.token.clone(),
            identity: settings.identity.clone(),
        })
    }

    /// Returns the full name of the mirror branch.
    #[must_use]
    pub fn branch_ref(&self) -> String {
        format!("refs/heads/{}", self.branch)
    }

    /// Returns the commit imported commits are stacked on.
    ///
    /// That is the local branch, or the remote-tracking branch right after a
    /// clone whose default branch differs, or nothing for an empty remote.
    fn tip(&self) -> Option<Oid> {
        let remote_ref = format!("refs/remotes/origin/{}", self.branch);
        [self.branch_ref(), remote_ref]
            .iter()
            .find_map(|name| self.inner.refname_to_id(name).ok())
    }

    /// Returns the remote commit ids already recorded on the mirror branch.
    ///
    /// # Errors
    ///
    /// Returns an error if history cannot be walked.
    pub fn imported_ids(&self) -> GitResult<HashSet<String>> {
        let mut ids = HashSet::new();
        let Some(tip) = self.tip() else {
            return Ok(ids);
        };

        let mut revwalk = self.inner.revwalk()?;
        revwalk.push(tip)?;
        for oid in revwalk {
            let commit = self.inner.find_commit(oid?)?;
            if let Some(summary) = commit.summary() {
                ids.insert(summary.trim().to_string());
            }
        }

        Ok(ids)
    }

    /// Records `commits` on the mirror branch and returns how many were new.
    ///
    /// Each commit becomes an empty commit whose message is the remote
    /// commit id, signed by the configured identity at the original author
    /// date. Commits are applied oldest first; ids already on the branch are
    /// skipped, so importing the same batch twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if a commit cannot be written.
    pub fn materialize_commits(&mut self, commits: &[Commit]) -> GitResult<usize> {
        let mut known = self.imported_ids()?;
        let mut pending: Vec<&Commit> = commits.iter().filter(|c| !known.contains(&c.id)).collect();
        pending.sort_by_key(|c| c.authored_date);

        let branch_ref = self.branch_ref();
        let mut parent = self.tip();
        let mut created = 0;

        for commit in pending {
            if !known.insert(commit.id.clone()) {
                continue;
            }

            let date = commit.authored_date;
            let time = Time::new(date.timestamp(), date.offset().local_minus_utc() / 60);
            let signature = Signature::new(&self.identity.name, &self.identity.email, &time)?;

            let parent_commit = parent.map(|oid| self.inner.find_commit(oid)).transpose()?;
            let tree = match &parent_commit {
                Some(p) => p.tree()?,
                None => {
                    let empty = self.inner.treebuilder(None)?.write()?;
                    self.inner.find_tree(empty)?
                }
            };
            let parents: Vec<&git2::Commit<'_>> = parent_commit.iter().collect();

            let oid = self.inner.commit(
                Some(&branch_ref),
                &signature,
                &signature,
                &commit.id,
                &tree,
                &parents,
            )?;
            debug!(remote = %commit.short_hash(), local = %oid, "commit recorded");

            parent = Some(oid);
            created += 1;
        }

        if created > 0 {
            self.inner.set_head(&branch_ref)?;
        }

        Ok(created)
    }

    /// Pushes the mirror branch to `origin`.
    ///
    /// Does nothing if the branch has no commits yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the push fails or the remote rejects the update.
    pub fn push(&self) -> GitResult<()> {
        let branch_ref = self.branch_ref();
        if self.inner.refname_to_id(&branch_ref).is_err() {
            info!(branch = %self.branch, "nothing to push");
            return Ok(());
        }

        let mut remote = self.inner.find_remote("origin")?;
        let refspec = format!("{branch_ref}:{branch_ref}");
        let rejection: RefCell<Option<String>> = RefCell::new(None);

        {
            let mut callbacks = credential_callbacks(self.token.as_deref());
            callbacks.push_update_reference(|name, status| {
                if let Some(msg) = status {
                    *rejection.borrow_mut() = Some(format!("{name}: {msg}"));
                }
                Ok(())
            });

            let mut push_options = PushOptions::new();
            push_options.remote_callbacks(callbacks);
            remote.push(&[refspec.as_str()], Some(&mut push_options))?;
        }

        if let Some(message) = rejection.into_inner() {
            return Err(GitError::PushRejected(message));
        }

        info!(branch = %self.branch, "pushed mirror branch");
        Ok(())
    }
}

fn is_missing_or_empty(path: &Path) -> GitResult<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(path.read_dir()?.next().is_none())
}

fn clone(settings: &RepoSettings) -> GitResult<Git2Repo> {
    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(credential_callbacks(settings.token.as_deref()));

    RepoBuilder::new()
        .fetch_options(fetch_options)
        .clone(&settings.repo_url, &settings.path)
        .map_err(|source| GitError::Clone {
            url: settings.repo_url.clone(),
            source,
        })
}

/// Offers the token once; libgit2 keeps asking on rejected credentials.
fn credential_callbacks(token: Option<&str>) -> RemoteCallbacks<'_> {
    let attempted = Cell::new(false);
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, allowed| {
        if let Some(token) = token
            && allowed.contains(CredentialType::USER_PASS_PLAINTEXT)
            && !attempted.replace(true)
        {
            return Cred::userpass_plaintext(username_from_url.unwrap_or(TOKEN_USERNAME), token);
        }
        Err(git2::Error::from_str("no usable credentials for remote"))
    });
    callbacks
}
