//! Worker pools shared by the enrichment passes and the reduction engine.
//!
//! - [`BatchPool`]: fixed-size batches run strictly one after another, every unit of a batch on
//!   its own worker, with a pacing delay between batches. Peak concurrency is the batch size.
//! - [`run_indexed`]: a bounded pool fed from a job channel; results come back on a result
//!   channel tagged with their input index and are put back into input order.

use anyhow::{Context, Result};
use crossbeam_channel::bounded;
use log::debug;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Index ranges of consecutive batches of `size` over `len` items; the last may be shorter.
pub fn batch_ranges(len: usize, size: usize) -> impl Iterator<Item = Range<usize>> {
    let size = size.max(1);
    (0..len)
        .step_by(size)
        .map(move |start| start..(start + size).min(len))
}

/// Progress after one finished batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchReport {
    /// 0-based index of the batch that just finished.
    pub batch: usize,
    pub batches: usize,
    /// Units finished so far, this batch included.
    pub done: usize,
    pub total: usize,
}

/// Paced batch runner backed by a thread pool sized to the batch.
pub struct BatchPool {
    pool: rayon::ThreadPool,
    batch_size: usize,
    delay: Duration,
}

impl BatchPool {
    pub fn new(batch_size: usize, delay: Duration, name: &'static str) -> Result<Self> {
        let batch_size = batch_size.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(batch_size)
            .thread_name(move |i| format!("{name}-{i}"))
            .build()
            .with_context(|| format!("build {name} pool"))?;
        Ok(Self {
            pool,
            batch_size,
            delay,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run `work` once per unit. Each batch is dispatched in full and joined before the next
    /// one starts; `on_batch` runs on the calling thread after every batch, then the pacing
    /// delay (skipped after the last batch). Returns one result per unit, in input order.
    pub fn run<U, R, F, P>(&self, units: Vec<U>, work: F, mut on_batch: P) -> Vec<R>
    where
        U: Send,
        R: Send,
        F: Fn(U) -> R + Sync,
        P: FnMut(BatchReport),
    {
        let total = units.len();
        let batches = total.div_ceil(self.batch_size);
        let mut results: Vec<Option<R>> = (0..total).map(|_| None).collect();
        let mut units = units.into_iter();
        let work = &work;

        for (batch, range) in batch_ranges(total, self.batch_size).enumerate() {
            let (tx, rx) = bounded::<(usize, R)>(range.len());
            let pending = &mut units;
            self.pool.scope(|s| {
                for (i, unit) in range.clone().zip(pending) {
                    let tx = tx.clone();
                    s.spawn(move |_| {
                        let _ = tx.send((i, work(unit)));
                    });
                }
            });
            drop(tx);
            for (i, result) in rx.try_iter() {
                results[i] = Some(result);
            }

            on_batch(BatchReport {
                batch,
                batches,
                done: range.end,
                total,
            });
            if batch + 1 < batches && !self.delay.is_zero() {
                debug!("pacing {:?} before batch {}", self.delay, batch + 2);
                thread::sleep(self.delay);
            }
        }

        // Every spawned task sends exactly once before the scope joins.
        results.into_iter().flatten().collect()
    }
}

/// Run `f` over `items` on at most `workers` threads. On success the results are in input
/// order. The first failure to arrive stops dispatch of queued items; tasks already running
/// finish and their results are discarded. The error is returned with its item index.
pub fn run_indexed<T, R, E, F>(items: Vec<T>, workers: usize, f: F) -> Result<Vec<R>, (usize, E)>
where
    T: Send,
    R: Send,
    E: Send,
    F: Fn(usize, T) -> Result<R, E> + Sync,
{
    let total = items.len();
    if total == 0 {
        return Ok(Vec::new());
    }
    let workers = workers.clamp(1, total);

    // Capacity covers every job, so queueing never blocks.
    let (job_tx, job_rx) = bounded::<(usize, T)>(total);
    let (result_tx, result_rx) = bounded::<(usize, Result<R, E>)>(total);
    for job in items.into_iter().enumerate() {
        let _ = job_tx.send(job);
    }
    drop(job_tx);

    let stop = AtomicBool::new(false);
    let mut slots: Vec<Option<R>> = (0..total).map(|_| None).collect();
    let mut first_error: Option<(usize, E)> = None;

    thread::scope(|s| {
        let f = &f;
        let stop = &stop;
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            s.spawn(move || {
                while let Ok((i, item)) = job_rx.recv() {
                    if stop.load(Ordering::Relaxed) {
                        break;
                    }
                    let result = f(i, item);
                    if result.is_err() {
                        stop.store(true, Ordering::Relaxed);
                    }
                    if result_tx.send((i, result)).is_err() {
                        break;
                    }
                }
            });
        }
        // Last sender lives in the workers; the loop below ends when they all exit.
        drop(result_tx);
        for (i, result) in result_rx.iter() {
            match result {
                Ok(value) => slots[i] = Some(value),
                Err(err) => {
                    if first_error.is_none() {
                        first_error = Some((i, err));
                    }
                }
            }
        }
    });

    match first_error {
        Some(err) => Err(err),
        None => Ok(slots.into_iter().flatten().collect()),
    }
}
