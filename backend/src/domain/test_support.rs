//! In-memory doubles for domain service tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;

use super::ports::{
    BranchRef, CommitRepository, CommitRepositoryError, MtrRepository, MtrRepositoryError,
    PullRequestRepository, PullRequestRepositoryError, RepositorySource, RepositorySourceError,
    SourcePage, WatermarkRepository, WatermarkRepositoryError,
};
use super::{
    AuthorActivity, AuthorAlias, AuthoredDiff, CommitKey, CommitRecord, CommitStamp,
    CommitSummary, DailyCommitCount, MtrRecord, PageSize, PullRequestRecord, PullRequestState,
    RepoActivity, RepoSlug, SyncTable,
};

pub(crate) fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: at(20, 9),
    })
}

pub(crate) fn slug(raw: &str) -> RepoSlug {
    raw.parse().expect("valid repo slug")
}

pub(crate) fn commit(repo: &str, id: &str, message: &str, created_at: DateTime<Utc>) -> CommitRecord {
    CommitRecord {
        id: id.to_owned(),
        author: "jdoe".to_owned(),
        author_id: Some("abc-123".to_owned()),
        message: message.to_owned(),
        created_at,
        repo: repo.to_owned(),
        diff: None,
    }
}

pub(crate) fn pull_request(repo: &str, id: i64, created_at: DateTime<Utc>) -> PullRequestRecord {
    PullRequestRecord {
        id,
        title: format!("PR {id}"),
        description: String::new(),
        state: PullRequestState::Open,
        author: "jdoe".to_owned(),
        author_id: Some("abc-123".to_owned()),
        repo: repo.to_owned(),
        created_at,
        updated_at: created_at,
    }
}

fn paginate<T: Clone>(items: &[T], page: u32, page_size: PageSize) -> SourcePage<T> {
    let size = page_size.get() as usize;
    let start = (page.saturating_sub(1) as usize) * size;
    SourcePage {
        items: items.iter().skip(start).take(size).cloned().collect(),
        has_next: start + size < items.len(),
    }
}

/// Host double serving fixed data and recording every call.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    commits: HashMap<String, Vec<CommitRecord>>,
    pull_requests: HashMap<String, Vec<PullRequestRecord>>,
    branches: HashMap<String, Vec<(String, Vec<CommitRecord>)>>,
    diffs: HashMap<String, String>,
    failing: HashSet<String>,
    missing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub(crate) fn with_commits(mut self, repo: &str, mut records: Vec<CommitRecord>) -> Self {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.commits.insert(repo.to_owned(), records);
        self
    }

    pub(crate) fn with_pull_requests(mut self, repo: &str, mut records: Vec<PullRequestRecord>) -> Self {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.pull_requests.insert(repo.to_owned(), records);
        self
    }

    pub(crate) fn with_branch(mut self, repo: &str, name: &str, mut records: Vec<CommitRecord>) -> Self {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.branches
            .entry(repo.to_owned())
            .or_default()
            .push((name.to_owned(), records));
        self
    }

    pub(crate) fn with_diff(mut self, commit_id: &str, diff: &str) -> Self {
        self.diffs.insert(commit_id.to_owned(), diff.to_owned());
        self
    }

    /// Every call for `repo` fails with a terminal status.
    pub(crate) fn failing(mut self, repo: &str) -> Self {
        self.failing.insert(repo.to_owned());
        self
    }

    /// `repo` no longer resolves upstream.
    pub(crate) fn missing(mut self, repo: &str) -> Self {
        self.missing.insert(repo.to_owned());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub(crate) fn calls_starting_with(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, repo: &RepoSlug, call: String) -> Result<(), RepositorySourceError> {
        self.calls.lock().expect("calls lock").push(call);
        if self.failing.contains(&repo.to_string()) {
            return Err(RepositorySourceError::status(400_u16, "scripted failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl RepositorySource for ScriptedSource {
    async fn list_commits(
        &self,
        repo: &RepoSlug,
        page: u32,
        page_size: PageSize,
    ) -> Result<SourcePage<CommitRecord>, RepositorySourceError> {
        self.record(repo, format!("commits {repo} {page}"))?;
        Ok(self
            .commits
            .get(&repo.to_string())
            .map_or_else(SourcePage::empty, |items| paginate(items, page, page_size)))
    }

    async fn get_diff(&self, repo: &RepoSlug, commit_id: &str) -> Result<String, RepositorySourceError> {
        self.record(repo, format!("diff {repo} {commit_id}"))?;
        self.diffs
            .get(commit_id)
            .cloned()
            .ok_or_else(|| RepositorySourceError::not_found(commit_id))
    }

    async fn list_pullrequests(
        &self,
        repo: &RepoSlug,
        page: u32,
        page_size: PageSize,
    ) -> Result<SourcePage<PullRequestRecord>, RepositorySourceError> {
        self.record(repo, format!("pullrequests {repo} {page}"))?;
        Ok(self
            .pull_requests
            .get(&repo.to_string())
            .map_or_else(SourcePage::empty, |items| paginate(items, page, page_size)))
    }

    async fn list_branches(&self, repo: &RepoSlug) -> Result<Vec<BranchRef>, RepositorySourceError> {
        self.record(repo, format!("branches {repo}"))?;
        Ok(self
            .branches
            .get(&repo.to_string())
            .map(|branches| {
                branches
                    .iter()
                    .map(|(name, _)| BranchRef {
                        name: name.clone(),
                        repository: Some(repo.slug().to_owned()),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_branch_commits(
        &self,
        repo: &RepoSlug,
        branch: &str,
        page: u32,
        page_size: PageSize,
    ) -> Result<SourcePage<CommitRecord>, RepositorySourceError> {
        self.record(repo, format!("branch_commits {repo} {branch} {page}"))?;
        Ok(self
            .branches
            .get(&repo.to_string())
            .and_then(|branches| branches.iter().find(|(name, _)| name == branch))
            .map_or_else(SourcePage::empty, |(_, items)| paginate(items, page, page_size)))
    }

    async fn repository_exists(&self, repo: &RepoSlug) -> Result<bool, RepositorySourceError> {
        self.record(repo, format!("exists {repo}"))?;
        Ok(!self.missing.contains(&repo.to_string()))
    }
}

#[derive(Default)]
struct StoreState {
    commits: BTreeMap<CommitKey, CommitRecord>,
    pull_requests: BTreeMap<(String, i64), PullRequestRecord>,
    watermarks: HashMap<(SyncTable, String), DateTime<Utc>>,
    mtr: Vec<MtrRecord>,
}

/// Record store double with insert-or-ignore semantics.
#[derive(Default)]
pub(crate) struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().expect("store lock")
    }

    pub(crate) fn commits(&self) -> Vec<CommitRecord> {
        self.lock().commits.values().cloned().collect()
    }

    pub(crate) fn pull_request_count(&self) -> usize {
        self.lock().pull_requests.len()
    }

    pub(crate) fn watermark(&self, table: SyncTable, repo: &str) -> Option<DateTime<Utc>> {
        self.lock().watermarks.get(&(table, repo.to_owned())).copied()
    }

    pub(crate) fn mtr_records(&self) -> Vec<MtrRecord> {
        self.lock().mtr.clone()
    }

    pub(crate) fn seed_mtr(&self, records: Vec<MtrRecord>) {
        self.lock().mtr = records;
    }

    fn summaries_where(&self, keep: impl Fn(&CommitRecord) -> bool) -> Vec<CommitSummary> {
        let mut rows: Vec<CommitSummary> = self
            .lock()
            .commits
            .values()
            .filter(|record| keep(record))
            .map(|record| CommitSummary {
                id: record.id.clone(),
                author: record.author.clone(),
                author_id: record.author_id.clone(),
                message: record.message.clone(),
                created_at: record.created_at,
                repo: record.repo.clone(),
            })
            .collect();
        rows.sort_by_key(|row| row.created_at);
        rows
    }

    fn stamps_where(&self, keep: impl Fn(&CommitRecord) -> bool) -> Vec<CommitStamp> {
        let mut rows: Vec<CommitStamp> = self
            .lock()
            .commits
            .values()
            .filter(|record| keep(record))
            .map(|record| CommitStamp {
                id: record.id.clone(),
                repo: record.repo.clone(),
                created_at: record.created_at,
            })
            .collect();
        rows.sort_by_key(|row| row.created_at);
        rows
    }

    fn pull_requests_where(&self, keep: impl Fn(&PullRequestRecord) -> bool) -> Vec<PullRequestRecord> {
        let mut rows: Vec<PullRequestRecord> = self
            .lock()
            .pull_requests
            .values()
            .filter(|record| keep(record))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

fn count_by<K: Ord>(keys: impl Iterator<Item = K>) -> BTreeMap<K, i64> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

#[async_trait]
impl CommitRepository for InMemoryStore {
    async fn upsert_commits(&self, records: &[CommitRecord]) -> Result<usize, CommitRepositoryError> {
        let mut state = self.lock();
        let mut inserted = 0;
        for record in records {
            if !state.commits.contains_key(&record.key()) {
                state.commits.insert(record.key(), record.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn find_missing_diffs(&self) -> Result<Vec<CommitKey>, CommitRepositoryError> {
        Ok(self
            .lock()
            .commits
            .values()
            .filter(|record| record.diff.is_none())
            .map(CommitRecord::key)
            .collect())
    }

    async fn set_diff(&self, key: &CommitKey, diff: &str) -> Result<bool, CommitRepositoryError> {
        Ok(self
            .lock()
            .commits
            .get_mut(key)
            .map(|record| record.diff = Some(diff.to_owned()))
            .is_some())
    }

    async fn author_activity(&self) -> Result<Vec<AuthorActivity>, CommitRepositoryError> {
        let state = self.lock();
        let counts = count_by(
            state
                .commits
                .values()
                .map(|record| (record.author_id.clone(), record.author.clone())),
        );
        Ok(counts
            .into_iter()
            .map(|((author_id, author), commits)| AuthorActivity {
                author_id,
                author,
                commits,
            })
            .collect())
    }

    async fn author_repositories(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Vec<RepoActivity>, CommitRepositoryError> {
        let state = self.lock();
        let counts = count_by(
            state
                .commits
                .values()
                .filter(|record| alias.matches(&record.author, record.author_id.as_deref()))
                .map(|record| record.repo.clone()),
        );
        Ok(counts
            .into_iter()
            .map(|(repo, commits)| RepoActivity { repo, commits })
            .collect())
    }

    async fn author_commits(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Vec<CommitSummary>, CommitRepositoryError> {
        Ok(self.summaries_where(|record| alias.matches(&record.author, record.author_id.as_deref())))
    }

    async fn author_commits_on(
        &self,
        alias: &AuthorAlias,
        date: NaiveDate,
    ) -> Result<Vec<CommitSummary>, CommitRepositoryError> {
        Ok(self.summaries_where(|record| {
            alias.matches(&record.author, record.author_id.as_deref())
                && record.created_at.date_naive() == date
        }))
    }

    async fn author_daily_counts(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Vec<DailyCommitCount>, CommitRepositoryError> {
        let counts = count_by(
            self.summaries_where(|record| alias.matches(&record.author, record.author_id.as_deref()))
                .into_iter()
                .map(|row| row.created_at.date_naive()),
        );
        Ok(counts
            .into_iter()
            .map(|(date, commit_count)| DailyCommitCount { date, commit_count })
            .collect())
    }

    async fn repository_activity(&self) -> Result<Vec<RepoActivity>, CommitRepositoryError> {
        let state = self.lock();
        let counts = count_by(state.commits.values().map(|record| record.repo.clone()));
        Ok(counts
            .into_iter()
            .map(|(repo, commits)| RepoActivity { repo, commits })
            .collect())
    }

    async fn find_diff(&self, commit_id: &str) -> Result<Option<Option<String>>, CommitRepositoryError> {
        Ok(self
            .lock()
            .commits
            .values()
            .find(|record| record.id == commit_id)
            .map(|record| record.diff.clone()))
    }

    async fn commit_stamps(&self) -> Result<Vec<CommitStamp>, CommitRepositoryError> {
        Ok(self.stamps_where(|_| true))
    }

    async fn repository_commit_stamps(
        &self,
        repo: &str,
    ) -> Result<Vec<CommitStamp>, CommitRepositoryError> {
        Ok(self.stamps_where(|record| record.repo == repo))
    }

    async fn author_diffs(&self, alias: &AuthorAlias) -> Result<Vec<AuthoredDiff>, CommitRepositoryError> {
        let state = self.lock();
        let mut rows: Vec<&CommitRecord> = state
            .commits
            .values()
            .filter(|record| alias.matches(&record.author, record.author_id.as_deref()))
            .collect();
        rows.sort_by_key(|record| record.created_at);
        Ok(rows
            .into_iter()
            .map(|record| AuthoredDiff {
                key: record.key(),
                diff: record.diff.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl PullRequestRepository for InMemoryStore {
    async fn upsert_pullrequests(
        &self,
        records: &[PullRequestRecord],
    ) -> Result<usize, PullRequestRepositoryError> {
        let mut state = self.lock();
        let mut inserted = 0;
        for record in records {
            let key = (record.repo.clone(), record.id);
            if !state.pull_requests.contains_key(&key) {
                state.pull_requests.insert(key, record.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn all(&self) -> Result<Vec<PullRequestRecord>, PullRequestRepositoryError> {
        Ok(self.pull_requests_where(|_| true))
    }

    async fn for_author(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Vec<PullRequestRecord>, PullRequestRepositoryError> {
        Ok(self.pull_requests_where(|record| alias.matches(&record.author, record.author_id.as_deref())))
    }

    async fn count(&self) -> Result<u64, PullRequestRepositoryError> {
        Ok(self.lock().pull_requests.len() as u64)
    }

    async fn latest(&self) -> Result<Option<PullRequestRecord>, PullRequestRepositoryError> {
        Ok(self.pull_requests_where(|_| true).into_iter().next())
    }

    async fn latest_for_author(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Option<PullRequestRecord>, PullRequestRepositoryError> {
        Ok(self
            .pull_requests_where(|record| alias.matches(&record.author, record.author_id.as_deref()))
            .into_iter()
            .next())
    }
}

#[async_trait]
impl WatermarkRepository for InMemoryStore {
    async fn get(
        &self,
        table: SyncTable,
        repo: &RepoSlug,
    ) -> Result<Option<DateTime<Utc>>, WatermarkRepositoryError> {
        Ok(self.watermark(table, &repo.to_string()))
    }

    async fn set(
        &self,
        table: SyncTable,
        repo: &RepoSlug,
        updated_at: DateTime<Utc>,
    ) -> Result<(), WatermarkRepositoryError> {
        self.lock()
            .watermarks
            .insert((table, repo.to_string()), updated_at);
        Ok(())
    }
}

#[async_trait]
impl MtrRepository for InMemoryStore {
    async fn replace_all(&self, records: &[MtrRecord]) -> Result<usize, MtrRepositoryError> {
        self.lock().mtr = records.to_vec();
        Ok(records.len())
    }

    async fn for_author(&self, alias: &AuthorAlias) -> Result<Vec<MtrRecord>, MtrRepositoryError> {
        Ok(self
            .lock()
            .mtr
            .iter()
            .filter(|record| alias.matches(&record.author, record.author_id.as_deref()))
            .cloned()
            .collect())
    }

    async fn all(&self) -> Result<Vec<MtrRecord>, MtrRepositoryError> {
        Ok(self.lock().mtr.clone())
    }
}
