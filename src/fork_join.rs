//! Fork-join execution over pre-split partitions.
//!
//! Each partition is handed to exactly one worker of a fixed-size [`rayon`] pool; workers never
//! share or wait on each other. Results are gathered **in partition order**, independently of
//! which worker finishes first, so the merged output only depends on the partitioning.
//!
//! A single worker runs inline on the calling thread. If any partition fails, the whole call
//! fails: there is no partial result. Every partition runs to completion, and the error returned
//! is the one of the lowest-index failing partition, whatever the scheduling.
use rayon::prelude::*;
use tracing::debug;

use crate::{partition::Partition, sieve_errors::SieveError};

/// Apply `task` to every partition using `worker_count` threads and collect the results in
/// partition order.
///
/// Arguments
/// ---------
/// * `partitions`: disjoint partitions, in table order
/// * `worker_count`: number of worker threads (`>= 1`)
/// * `label`: stage name used in logs and progress output
/// * `task`: per-partition work; must not depend on other partitions
///
/// Return
/// ------
/// * one result per partition, in the order of `partitions`
/// * the error of the lowest-index failing partition if any task failed
pub(crate) fn fork_join<'a, T, F>(
    partitions: &[Partition<'a>],
    worker_count: usize,
    label: &'static str,
    task: F,
) -> Result<Vec<T>, SieveError>
where
    T: Send,
    F: Fn(&Partition<'a>) -> Result<T, SieveError> + Send + Sync,
{
    if worker_count == 0 {
        return Err(SieveError::InvalidWorkerCount(worker_count));
    }

    #[cfg(feature = "progress")]
    let pb = crate::progress_bar::partition_bar(partitions.len(), label);

    let run = |partition: &Partition<'a>| {
        let out = task(partition);
        debug!(
            stage = label,
            partition = partition.index,
            rows = partition.len(),
            ok = out.is_ok(),
            "partition done"
        );
        #[cfg(feature = "progress")]
        pb.inc(1);
        out
    };

    let results: Vec<Result<T, SieveError>> = if worker_count == 1 || partitions.len() <= 1 {
        partitions.iter().map(run).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(move |i| format!("tracksieve-{label}-{i}"))
            .build()?;
        pool.install(|| partitions.par_iter().map(run).collect())
    };

    #[cfg(feature = "progress")]
    pb.finish_and_clear();

    results.into_iter().collect()
}
