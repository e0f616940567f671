//! Progress reporting for batch passes and reduction rounds.
//!
//! [`progress_line`] is the pure text form. [`Progress`] shows a kdam bar when stderr is a
//! terminal and falls back to logging the text line otherwise.

use kdam::{Animation, Bar, BarExt};
use log::info;
use std::io::IsTerminal;

use crate::utils::config::ProgressConsts;

/// Text progress indicator, e.g. `label [████░░░░] 50.0% (2/4)`. `None` when `total` is zero.
pub fn progress_line(current: usize, total: usize, label: &str) -> Option<String> {
    if total == 0 {
        return None;
    }
    let current = current.min(total);
    let width = ProgressConsts::BAR_WIDTH;
    let filled = width * current / total;
    let percentage = current as f64 / total as f64 * 100.0;

    let mut bar = String::with_capacity(width * 3 + 2);
    bar.push('[');
    bar.extend(std::iter::repeat_n(ProgressConsts::FILLED, filled));
    bar.extend(std::iter::repeat_n(ProgressConsts::EMPTY, width - filled));
    bar.push(']');
    Some(format!(
        "{label} {bar} {percentage:.1}% ({current}/{total})"
    ))
}

/// Progress sink for one pass. Advanced from the coordinating thread only.
pub struct Progress {
    label: &'static str,
    total: usize,
    current: usize,
    bar: Option<Bar>,
}

impl Progress {
    /// Create a reporter over `total` units. A bar is drawn only when stderr is a terminal.
    pub fn new(label: &'static str, total: usize) -> Self {
        let bar = (total > 0 && std::io::stderr().is_terminal()).then(|| {
            kdam::tqdm!(
                total = total,
                desc = label,
                animation = Animation::Classic,
                position = 0
            )
        });
        Self {
            label,
            total,
            current: 0,
            bar,
        }
    }

    /// Record `n` more finished units.
    pub fn advance(&mut self, n: usize) {
        self.current = (self.current + n).min(self.total);
        match self.bar.as_mut() {
            Some(bar) => {
                let _ = bar.update(n);
            }
            None => {
                if let Some(line) = progress_line(self.current, self.total, self.label) {
                    info!("{}", line);
                }
            }
        }
    }

    /// Set the absolute position (e.g. after a batch report).
    pub fn set(&mut self, current: usize) {
        let current = current.min(self.total);
        if current > self.current {
            self.advance(current - self.current);
        }
    }

    pub fn finish(mut self) {
        if let Some(bar) = self.bar.as_mut() {
            let _ = bar.refresh();
            eprintln!();
        }
    }
}
