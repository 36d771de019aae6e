//! Batch orchestration (§5/§9/§10.5): runs many independent origins through
//! one orchestrator-construction closure concurrently over a `rayon` thread
//! pool, the in-process analogue of the source's OS-process fan-out over H3
//! cells. A single origin's fatal error is collected rather than aborting
//! siblings already in flight.

use rayon::prelude::*;
use tracing::warn;

use crate::orchestrator::RunOutput;
use crate::Error;

/// One origin's outcome: either its [`RunOutput`] or the [`Error`] it failed
/// with. Kept alongside the origin id rather than short-circuiting the batch,
/// since an unrelated origin's bad input should not discard work already done
/// for every other origin.
pub struct BatchResult {
    pub origin: usize,
    pub outcome: Result<RunOutput, Error>,
}

/// Wraps an origin-indexed failure for callers that want the failing subset
/// without re-scanning every [`BatchResult`].
#[derive(Debug, Clone)]
pub struct BatchError {
    pub origin: usize,
    pub error: String,
}

/// Runs `run_one(origin)` for every origin in `origins`, in parallel over the
/// global `rayon` pool (bounded, in turn, by whatever pool size the host
/// configured via `RAYON_NUM_THREADS` or a scoped pool). `run_one` must be
/// `Sync` since it is shared across worker threads; construct a fresh
/// [`crate::orchestrator::Orchestrator`] inside it per call rather than
/// sharing one across origins, since an orchestrator's step list owns
/// per-run working state.
pub fn run_batch<F>(origins: &[usize], run_one: F) -> Vec<BatchResult>
where
    F: Fn(usize) -> Result<RunOutput, Error> + Sync,
{
    origins
        .par_iter()
        .map(|&origin| {
            let outcome = run_one(origin);
            if let Err(ref err) = outcome {
                warn!(origin, %err, "batch origin failed");
            }
            BatchResult { origin, outcome }
        })
        .collect()
}

/// Splits a batch's results into the origins that succeeded (with their
/// output) and the origins that failed (with their error's display text).
pub fn partition_batch(results: Vec<BatchResult>) -> (Vec<(usize, RunOutput)>, Vec<BatchError>) {
    let mut ok = Vec::new();
    let mut err = Vec::new();
    for result in results {
        match result.outcome {
            Ok(output) => ok.push((result.origin, output)),
            Err(error) => err.push(BatchError {
                origin: result.origin,
                error: error.to_string(),
            }),
        }
    }
    (ok, err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_both_successes_and_failures() {
        let origins = vec![0, 1, 2];
        let results = run_batch(&origins, |origin| {
            if origin == 1 {
                Err(Error::UnknownNode(1))
            } else {
                Ok(RunOutput {
                    bags_by_round: vec![Default::default()],
                })
            }
        });
        assert_eq!(results.len(), 3);
        let (ok, err) = partition_batch(results);
        assert_eq!(ok.len(), 2);
        assert_eq!(err.len(), 1);
        assert_eq!(err[0].origin, 1);
    }
}
