//! Run-wide statistics and timing for parallel builds.

use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};

use crate::parallel_build::task::PipelineOutcome;

/// Totals across every corpus of a run.
///
/// Sums are folded in with [`AggregateResult::record`] and
/// [`AggregateResult::merge`], which give the same totals in any order.
/// `last_computed_m` is the exception: it holds the bit array size of the most
/// recently recorded successful corpus, so it depends on completion order.
/// Each corpus keeps its own size in its `CorpusResult`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateResult {
    /// Sum of unique token counts.
    pub total_unique_words: usize,

    /// Sum of per-corpus read times.
    #[serde(rename = "total_read_time_secs", serialize_with = "as_secs")]
    pub total_read_time: Duration,

    /// Sum of per-corpus build times.
    #[serde(rename = "total_build_time_secs", serialize_with = "as_secs")]
    pub total_build_time: Duration,

    /// Wall time of the whole run.
    #[serde(rename = "total_process_time_secs", serialize_with = "as_secs")]
    pub total_process_time: Duration,

    /// Bit array size of the last corpus recorded (last write wins).
    pub last_computed_m: Option<usize>,

    /// Number of corpora whose filter was built.
    pub corpora_built: usize,

    /// Number of corpora whose pipeline failed.
    pub corpora_failed: usize,
}

fn as_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl AggregateResult {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one pipeline outcome into the totals.
    ///
    /// Failed pipelines count as failures and add nothing else.
    pub fn record(&mut self, outcome: &PipelineOutcome) {
        match outcome.result() {
            Some(result) => {
                self.total_unique_words += result.unique_count;
                self.total_read_time += result.read_duration;
                self.total_build_time += result.build_duration;
                self.last_computed_m = Some(result.config.bit_array_size);
                self.corpora_built += 1;
            }
            None => {
                self.corpora_failed += 1;
            }
        }
    }

    /// Combine two partial aggregates. `other` is treated as the later one.
    pub fn merge(mut self, other: AggregateResult) -> AggregateResult {
        self.total_unique_words += other.total_unique_words;
        self.total_read_time += other.total_read_time;
        self.total_build_time += other.total_build_time;
        self.total_process_time += other.total_process_time;
        self.last_computed_m = other.last_computed_m.or(self.last_computed_m);
        self.corpora_built += other.corpora_built;
        self.corpora_failed += other.corpora_failed;
        self
    }

    /// Set the wall time of the run.
    pub fn with_process_time(mut self, process_time: Duration) -> Self {
        self.total_process_time = process_time;
        self
    }

    /// Number of corpora recorded.
    pub fn corpus_count(&self) -> usize {
        self.corpora_built + self.corpora_failed
    }
}

impl<'a> FromIterator<&'a PipelineOutcome> for AggregateResult {
    fn from_iter<I: IntoIterator<Item = &'a PipelineOutcome>>(iter: I) -> Self {
        let mut aggregate = AggregateResult::new();
        for outcome in iter {
            aggregate.record(outcome);
        }
        aggregate
    }
}

/// Simple wall-clock timer.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Time elapsed since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer, returning the elapsed time.
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bloom::FilterOptions;
    use crate::corpus::{CorpusLoader, MemoryCorpusProvider};
    use crate::parallel_build::task::{CorpusPipeline, CorpusTask};

    fn outcomes() -> Vec<PipelineOutcome> {
        let provider = MemoryCorpusProvider::new()
            .with_corpus("one", "a b a c")
            .with_corpus("two", "the whale the sea")
            .with_corpus("three", "x");
        let pipeline =
            CorpusPipeline::new(CorpusLoader::default(), FilterOptions::default(), "geohash");
        ["one", "missing", "two", "three"]
            .into_iter()
            .map(|name| pipeline.run(CorpusTask::new(name), &provider))
            .collect()
    }

    #[test]
    fn test_record_sums_and_counts() {
        let outcomes = outcomes();
        let aggregate: AggregateResult = outcomes.iter().collect();

        assert_eq!(aggregate.total_unique_words, 3 + 3 + 1);
        assert_eq!(aggregate.corpora_built, 3);
        assert_eq!(aggregate.corpora_failed, 1);
        assert_eq!(aggregate.corpus_count(), 4);

        let read: Duration = outcomes.iter().map(|o| o.read_duration()).sum();
        assert_eq!(aggregate.total_read_time, read);
    }

    #[test]
    fn test_order_independent_totals() {
        let outcomes = outcomes();
        let forward: AggregateResult = outcomes.iter().collect();
        let backward: AggregateResult = outcomes.iter().rev().collect();
        let rotated: AggregateResult = outcomes.iter().cycle().skip(2).take(4).collect();

        for other in [&backward, &rotated] {
            assert_eq!(forward.total_unique_words, other.total_unique_words);
            assert_eq!(forward.total_read_time, other.total_read_time);
            assert_eq!(forward.total_build_time, other.total_build_time);
            assert_eq!(forward.corpora_built, other.corpora_built);
        }
    }

    #[test]
    fn test_last_write_wins() {
        let outcomes = outcomes();
        let forward: AggregateResult = outcomes.iter().collect();
        let backward: AggregateResult = outcomes.iter().rev().collect();

        // "three" has n=1, "one" has n=3.
        assert_eq!(forward.last_computed_m, outcomes[3].bit_array_size());
        assert_eq!(backward.last_computed_m, outcomes[0].bit_array_size());
        assert_ne!(forward.last_computed_m, backward.last_computed_m);
    }

    #[test]
    fn test_failures_do_not_overwrite_m() {
        let outcomes = outcomes();
        let mut aggregate = AggregateResult::new();
        aggregate.record(&outcomes[0]);
        aggregate.record(&outcomes[1]);
        assert_eq!(aggregate.last_computed_m, outcomes[0].bit_array_size());
    }

    #[test]
    fn test_merge_partials() {
        let outcomes = outcomes();
        let left: AggregateResult = outcomes[..2].iter().collect();
        let right: AggregateResult = outcomes[2..].iter().collect();
        let whole: AggregateResult = outcomes.iter().collect();

        let merged = left.clone().merge(right.clone());
        assert_eq!(merged, whole);

        let swapped = right.merge(left);
        assert_eq!(swapped.total_unique_words, whole.total_unique_words);
        assert_eq!(swapped.corpus_count(), whole.corpus_count());
    }

    #[test]
    fn test_serializes_seconds() {
        let aggregate = AggregateResult {
            total_unique_words: 7,
            total_read_time: Duration::from_millis(1500),
            ..Default::default()
        };
        let value = serde_json::to_value(&aggregate).unwrap();
        assert_eq!(value["total_unique_words"], 7);
        assert_eq!(value["total_read_time_secs"], 1.5);
        assert!(value["last_computed_m"].is_null());
    }
}
