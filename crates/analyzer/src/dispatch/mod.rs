//! Dispatch: a fixed pool of workers fanning sources out to the analyzer.
//!
//! Workers share one work queue and one result queue. Each worker is a
//! long-lived task that claims the next spec, runs the blocking scan on the
//! blocking pool and pushes the result, until the work queue is drained.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info};

use crate::source::{self, AnalyzeOptions, SourceError, SourceResult, SourceSpec};

type WorkQueue = Arc<Mutex<mpsc::Receiver<SourceSpec>>>;

/// Never more workers than sources, never fewer than one.
pub fn effective_concurrency(requested: usize, sources: usize) -> usize {
    requested.max(1).min(sources.max(1))
}

/// Analyze every spec exactly once. Results come back in completion order.
pub async fn run(specs: Vec<SourceSpec>, concurrency: usize, options: AnalyzeOptions) -> Vec<SourceResult> {
    let total = specs.len();
    if total == 0 {
        return Vec::new();
    }

    let workers = effective_concurrency(concurrency, total);
    info!("Starting {} workers for {} sources", workers, total);

    // Both queues hold every item at once, so no send below ever waits
    let (work_tx, work_rx) = mpsc::channel::<SourceSpec>(total);
    let (result_tx, mut result_rx) = mpsc::channel::<SourceResult>(total);

    for spec in specs {
        if let Err(e) = work_tx.send(spec).await {
            error!("Work queue closed early, dropping source {}", e.0.id);
        }
    }
    // Closing the sender lets recv() return None once the queue is drained
    drop(work_tx);

    let queue: WorkQueue = Arc::new(Mutex::new(work_rx));
    let options = Arc::new(options);

    let mut tasks = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let queue = queue.clone();
        let results = result_tx.clone();
        let options = options.clone();
        tasks.push(tokio::spawn(worker(worker_id, queue, results, options)));
    }
    drop(result_tx);

    for task in tasks {
        if let Err(e) = task.await {
            error!("Dispatch worker panicked: {}", e);
        }
    }

    let mut collected = Vec::with_capacity(total);
    while let Some(result) = result_rx.recv().await {
        collected.push(result);
    }

    info!("All workers finished: {} of {} sources reported", collected.len(), total);
    collected
}

async fn worker(
    worker_id: usize,
    queue: WorkQueue,
    results: mpsc::Sender<SourceResult>,
    options: Arc<AnalyzeOptions>,
) {
    loop {
        // Hold the lock only for the claim, not for the scan
        let next = queue.lock().await.recv().await;
        let Some(spec) = next else {
            break;
        };

        debug!("Worker {} claimed source {}", worker_id, spec.id);
        let result = analyze_blocking(spec, options.clone()).await;

        if results.send(result).await.is_err() {
            error!("Worker {} lost the result queue", worker_id);
            break;
        }
    }
    debug!("Worker {} exiting", worker_id);
}

/// Run the scan on the blocking pool.
async fn analyze_blocking(spec: SourceSpec, options: Arc<AnalyzeOptions>) -> SourceResult {
    run_guarded(spec, move |spec| source::analyze(spec, &options)).await
}

/// A panicking scan still yields a result for its source.
async fn run_guarded<F>(spec: SourceSpec, scan: F) -> SourceResult
where
    F: FnOnce(&SourceSpec) -> SourceResult + Send + 'static,
{
    let started = std::time::Instant::now();
    let task_spec = spec.clone();
    match tokio::task::spawn_blocking(move || scan(&task_spec)).await {
        Ok(result) => result,
        Err(e) => {
            error!("Analysis of source {} failed: {}", spec.id, e);
            SourceResult::failed(&spec, SourceError::TaskFailed(e.to_string()), started.elapsed())
        }
    }
}
