//! Concurrent package tree indexer.
//!
//! The indexer crawls the catalog through an [`Evaluator`], one package set
//! per job. A fixed pool of worker tasks executes jobs; a single coordinator
//! owns the queue of pending jobs and the tree being assembled.
//!
//! Each job owns the [`PackageSet`] it fills. When a worker finds a child
//! set that needs its own evaluation it stores an empty placeholder under
//! the child's name and returns a new job for it. The coordinator grafts
//! each finished set into the slot named by its job's path.
//!
//! Failure handling:
//!
//! - the root job failing aborts the whole run
//! - any other job failing is logged; its placeholder stays empty
//! - a leaf whose metadata cannot be decoded is logged and dropped
//!
//! A job that panics counts as a failed job. A worker task that dies
//! outside a job aborts the run.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::evaluator::{EvalEntry, Evaluator};
use crate::package::{Derivation, Package, PackageSet, TopLevelPackages};

/// Default channel expression.
pub const DEFAULT_NIXPKGS: &str = "<nixpkgs>";

/// Number of workers used when none is configured.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Options for [`index_packages`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions {
    /// Channel expression, e.g. `<nixpkgs>` or a path.
    pub nixpkgs: String,
    /// Flake reference. Overrides `nixpkgs` when set.
    pub flake: Option<String>,
    /// Number of concurrent evaluations.
    pub parallelism: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            nixpkgs: DEFAULT_NIXPKGS.to_string(),
            flake: None,
            parallelism: default_parallelism(),
        }
    }
}

impl IndexOptions {
    pub fn with_nixpkgs(mut self, nixpkgs: impl Into<String>) -> Self {
        self.nixpkgs = nixpkgs.into();
        self
    }

    pub fn with_flake(mut self, flake: impl Into<String>) -> Self {
        self.flake = Some(flake.into());
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Name of the catalog root.
    ///
    /// A flake is named by its reference, `<name>` by `name`, and any other
    /// path by its last component.
    pub fn root_name(&self) -> String {
        if let Some(flake) = &self.flake {
            return flake.clone();
        }
        let nixpkgs = self.nixpkgs.as_str();
        if let Some(name) = nixpkgs
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
        {
            return name.to_string();
        }
        Path::new(nixpkgs.trim_end_matches('/'))
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| nixpkgs.to_string())
    }

    /// Whether the root is a flake.
    pub fn is_flake(&self) -> bool {
        self.flake.is_some()
    }
}

struct Job {
    attrs: Vec<String>,
    set: PackageSet,
}

struct JobResult {
    attrs: Vec<String>,
    outcome: Result<(PackageSet, Vec<Job>)>,
}

/// Materialize the full package tree.
///
/// Runs until every reachable set has been evaluated, the root evaluation
/// fails, or `cancel` fires. Workers never outlive the call.
pub async fn index_packages<E>(
    opts: &IndexOptions,
    evaluator: Arc<E>,
    cancel: &CancellationToken,
) -> Result<TopLevelPackages>
where
    E: Evaluator + ?Sized + 'static,
{
    let parallelism = opts.parallelism.max(1);
    log::debug!(
        "indexing packages nixpkgs={} flake={:?} parallelism={}",
        opts.nixpkgs,
        opts.flake,
        parallelism
    );

    let cancel = cancel.child_token();
    let _guard = cancel.clone().drop_guard();

    let (job_tx, job_rx) = mpsc::channel::<Job>(1);
    let (result_tx, mut result_rx) = mpsc::channel::<JobResult>(parallelism);
    let job_rx = Arc::new(Mutex::new(job_rx));

    let mut workers = JoinSet::new();
    for id in 0..parallelism {
        workers.spawn(worker(
            id,
            Arc::clone(&evaluator),
            Arc::clone(&job_rx),
            result_tx.clone(),
            cancel.clone(),
        ));
    }
    drop(result_tx);

    let mut tree = TopLevelPackages::new(opts.root_name(), opts.is_flake());
    let mut pending = VecDeque::from([Job {
        attrs: Vec::new(),
        set: PackageSet::new(),
    }]);
    let mut ongoing = 0usize;

    while !pending.is_empty() || ongoing > 0 {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                log::debug!("indexing cancelled with {ongoing} jobs in flight");
                return Err(Error::Cancelled);
            }

            result = result_rx.recv() => {
                let Some(JobResult { attrs, outcome }) = result else {
                    return Err(Error::evaluation(&[], "indexing workers exited unexpectedly"));
                };
                ongoing -= 1;
                match outcome {
                    Ok((set, jobs)) => {
                        log::trace!(
                            "job {:?} finished with {} entries, {} new jobs",
                            attrs.join("."),
                            set.len(),
                            jobs.len()
                        );
                        graft(&mut tree.packages, &attrs, set);
                        pending.extend(jobs);
                    }
                    Err(err) if err.is_cancelled() => return Err(err),
                    Err(err) if attrs.is_empty() => return Err(err),
                    Err(err) => {
                        log::warn!("skipping package set {:?}: {err}", attrs.join("."));
                        if let Some(stderr) = err.stderr() {
                            log::debug!("evaluator stderr for {:?}:\n{stderr}", attrs.join("."));
                        }
                    }
                }
            }

            Some(joined) = workers.join_next() => {
                if let Err(err) = joined {
                    return Err(Error::evaluation(&[], format!("indexing worker failed: {err}")));
                }
                log::debug!("indexing worker exited with {ongoing} jobs in flight");
            }

            permit = job_tx.reserve(), if !pending.is_empty() => {
                let permit = permit.map_err(|_| {
                    Error::evaluation(&[], "indexing workers exited unexpectedly")
                })?;
                if let Some(job) = pending.pop_front() {
                    ongoing += 1;
                    permit.send(job);
                }
            }
        }
    }

    drop(job_tx);
    while let Some(joined) = workers.join_next().await {
        if let Err(err) = joined {
            log::warn!("indexing worker failed: {err}");
        }
    }

    log::debug!("indexed {} packages", tree.count());
    Ok(tree)
}

async fn worker<E>(
    id: usize,
    evaluator: Arc<E>,
    jobs: Arc<Mutex<mpsc::Receiver<Job>>>,
    results: mpsc::Sender<JobResult>,
    cancel: CancellationToken,
) where
    E: Evaluator + ?Sized + 'static,
{
    loop {
        let job = tokio::select! {
            _ = cancel.cancelled() => break,
            job = async { jobs.lock().await.recv().await } => match job {
                Some(job) => job,
                None => break,
            },
        };

        let attrs = job.attrs.clone();
        let evaluator = Arc::clone(&evaluator);
        let mut task = tokio::spawn(async move { run_job(evaluator.as_ref(), job).await });
        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                task.abort();
                let _ = task.await;
                break;
            }
            joined = &mut task => joined.unwrap_or_else(|err| {
                Err(Error::evaluation(&attrs, format!("evaluation task failed: {err}")))
            }),
        };

        tokio::select! {
            _ = cancel.cancelled() => break,
            sent = results.send(JobResult { attrs, outcome }) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
    log::trace!("indexing worker {id} exiting");
}

async fn run_job<E>(evaluator: &E, job: Job) -> Result<(PackageSet, Vec<Job>)>
where
    E: Evaluator + ?Sized,
{
    let Job { attrs, mut set } = job;
    let output = evaluator.evaluate(&attrs).await?;

    let mut jobs = Vec::new();
    for (name, entry) in output {
        match entry {
            EvalEntry::HasMore => {
                set.insert(name.clone(), Derivation::Set(PackageSet::new()));
                let mut child = Vec::with_capacity(attrs.len() + 1);
                child.extend_from_slice(&attrs);
                child.push(name);
                jobs.push(Job {
                    attrs: child,
                    set: PackageSet::new(),
                });
            }
            EvalEntry::Meta(meta) => match decode_package(&name, meta) {
                Ok(pkg) => {
                    set.insert(name, Derivation::Package(pkg));
                }
                Err(err) => log::warn!("dropping package in {:?}: {err}", attrs.join(".")),
            },
        }
    }
    Ok((set, jobs))
}

fn decode_package(name: &str, meta: serde_json::Value) -> Result<Package> {
    let mut pkg: Package =
        serde_json::from_value(meta).map_err(|source| Error::decode(name, source))?;
    pkg.name = name.to_string();
    Ok(pkg)
}

/// Store `set` at `attrs` below `root`, replacing the placeholder.
fn graft(root: &mut PackageSet, attrs: &[String], set: PackageSet) {
    let Some((last, parents)) = attrs.split_last() else {
        *root = set;
        return;
    };
    let mut current = root;
    for name in parents {
        current = match current.get_mut(name) {
            Some(Derivation::Set(child)) => child,
            _ => {
                log::warn!("no package set at {:?}, dropping results", attrs.join("."));
                return;
            }
        };
    }
    current.insert(last.clone(), Derivation::Set(set));
}

// ============================================================================
// Tests
// ============================================================================
