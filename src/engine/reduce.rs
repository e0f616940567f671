//! Map-reduce reduction engine.
//!
//! Map: every chunk is analyzed on a bounded pool, results are restored to chunk order.
//! Reduce: while more than one analysis remains, neighbouring analyses are grouped under the
//! size bound and each group is combined on a bounded pool; the combined results, in group
//! order, are the next round's input. Any failure aborts the whole reduction.

use log::{debug, info};
use std::ops::Range;

use crate::engine::chunker::{Chunk, partition};
use crate::engine::pool::{batch_ranges, run_indexed};
use crate::engine::progress::Progress;
use crate::error::ReduceError;
use crate::service::Analyst;
use crate::types::Opts;
use crate::utils::config::{ANALYSIS_SEPARATOR, MAX_CONCURRENCY};

/// Bounds and worker counts for one reduction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReduceConfig {
    /// Max bytes per chunk and per combination group.
    pub max_chunk_size: usize,
    pub map_workers: usize,
    pub reduce_workers: usize,
}

impl From<&Opts> for ReduceConfig {
    fn from(opts: &Opts) -> Self {
        Self {
            max_chunk_size: opts.max_chunk_size.max(1),
            map_workers: opts.concurrency.archi_analysis.clamp(1, MAX_CONCURRENCY),
            reduce_workers: opts.concurrency.report_chunking.clamp(1, MAX_CONCURRENCY),
        }
    }
}

/// Final artifact of a reduction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reduction {
    pub analysis: String,
    /// Chunks analyzed in the map phase.
    pub chunks: usize,
    /// Combination rounds run.
    pub rounds: usize,
}

/// Greedy first-fit grouping of consecutive analyses: an item joins the current group while
/// the group's size, counting [`ANALYSIS_SEPARATOR`] per item, stays within `max`. An item
/// larger than `max` forms its own group. If that would leave the count unchanged (no two
/// neighbours fit together), items are paired instead so the round still shrinks.
pub fn group_by_size(analyses: &[String], max: usize) -> Vec<Range<usize>> {
    let overhead = ANALYSIS_SEPARATOR.len();
    let mut groups = Vec::new();
    let mut start = 0;
    let mut size = 0;
    for (i, analysis) in analyses.iter().enumerate() {
        let item = analysis.len() + overhead;
        if i > start && size + item > max {
            groups.push(start..i);
            start = i;
            size = 0;
        }
        size += item;
    }
    if start < analyses.len() {
        groups.push(start..analyses.len());
    }
    if analyses.len() > 1 && groups.len() == analyses.len() {
        return batch_ranges(analyses.len(), 2).collect();
    }
    groups
}

/// Runs the map and reduce phases against an [`Analyst`].
pub struct Reducer<'a, A: Analyst + ?Sized> {
    analyst: &'a A,
    config: ReduceConfig,
}

impl<'a, A: Analyst + ?Sized> Reducer<'a, A> {
    pub fn new(analyst: &'a A, config: ReduceConfig) -> Self {
        Self { analyst, config }
    }

    /// Partition `text`, analyze every chunk, then reduce to one analysis. A text that fits in
    /// one chunk is analyzed under `label`; otherwise chunks are labelled `chunk_<n>.combined`.
    pub fn reduce_text(&self, text: &str, label: &str) -> Result<Reduction, ReduceError> {
        let chunks: Vec<Chunk<'_>> = partition(text, self.config.max_chunk_size).collect();
        let count = chunks.len();
        if count > 1 {
            info!(
                "Content is {} bytes, over {}: split into {} chunks",
                text.len(),
                self.config.max_chunk_size,
                count
            );
        }
        let analyses = self.analyze_chunks(chunks, label)?;
        let (analysis, rounds) = self.reduce_analyses(analyses)?;
        Ok(Reduction {
            analysis,
            chunks: count,
            rounds,
        })
    }

    /// Map phase. Output is in chunk order whatever order the workers finish in.
    pub fn analyze_chunks(
        &self,
        chunks: Vec<Chunk<'_>>,
        label: &str,
    ) -> Result<Vec<String>, ReduceError> {
        let single = chunks.len() == 1;
        info!(
            "Analyzing {} chunk(s) with {} worker(s)",
            chunks.len(),
            self.config.map_workers.min(chunks.len().max(1))
        );
        run_indexed(chunks, self.config.map_workers, |_, chunk| {
            let chunk_label = if single {
                label.to_string()
            } else {
                format!("chunk_{}.combined", chunk.index + 1)
            };
            debug!("analyzing {} ({} bytes)", chunk_label, chunk.text.len());
            self.analyst.analyze(chunk.text, &chunk_label)
        })
        .map_err(|(index, source)| ReduceError::Analyze { index, source })
    }

    /// Reduce phase. One analysis is returned unchanged after zero rounds.
    pub fn reduce_analyses(&self, analyses: Vec<String>) -> Result<(String, usize), ReduceError> {
        let initial = analyses.len();
        let mut current = analyses;
        let mut round = 0;
        let mut progress = Progress::new("Combining analyses", initial.saturating_sub(1));

        while current.len() > 1 {
            round += 1;
            let groups = group_by_size(&current, self.config.max_chunk_size);
            info!(
                "Round {}: combining {} analyses into {} group(s)",
                round,
                current.len(),
                groups.len()
            );
            let jobs: Vec<&[String]> = groups.iter().map(|r| &current[r.clone()]).collect();
            let next = run_indexed(jobs, self.config.reduce_workers, |_, group| {
                match group {
                    [only] => Ok(only.clone()),
                    _ => self.analyst.combine(group),
                }
            })
            .map_err(|(group, source)| ReduceError::Combine {
                round,
                group,
                source,
            })?;
            current = next;
            progress.set(initial - current.len());
        }
        progress.finish();

        match current.pop() {
            Some(analysis) => Ok((analysis, round)),
            None => Err(ReduceError::Empty),
        }
    }
}
