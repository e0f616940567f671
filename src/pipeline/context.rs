//! Run context: stage tracking for one full run.

use log::{debug, error, info};
use std::fmt;
use std::time::Instant;

/// Stages of a full run. Each success moves to the next; a walk failure goes to `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    BuildingTree,
    EnrichingFiles,
    EnrichingFolders,
    Serialized,
    Failed,
}

impl RunStage {
    /// Stage a successful run moves to from here. Terminal stages have none.
    pub fn next(self) -> Option<RunStage> {
        match self {
            RunStage::Idle => Some(RunStage::BuildingTree),
            RunStage::BuildingTree => Some(RunStage::EnrichingFiles),
            RunStage::EnrichingFiles => Some(RunStage::EnrichingFolders),
            RunStage::EnrichingFolders => Some(RunStage::Serialized),
            RunStage::Serialized | RunStage::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStage::Idle => "idle",
            RunStage::BuildingTree => "building tree",
            RunStage::EnrichingFiles => "enriching files",
            RunStage::EnrichingFolders => "enriching folders",
            RunStage::Serialized => "serialized",
            RunStage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Current stage of a run plus when it entered it.
#[derive(Debug)]
pub struct RunContext {
    stage: RunStage,
    entered: Instant,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            stage: RunStage::Idle,
            entered: Instant::now(),
        }
    }

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    /// Move to the next stage. A terminal stage stays where it is.
    pub fn advance(&mut self) -> RunStage {
        if let Some(next) = self.stage.next() {
            debug!("{} took {:?}", self.stage, self.entered.elapsed());
            info!("Stage: {} -> {}", self.stage, next);
            self.stage = next;
            self.entered = Instant::now();
        }
        self.stage
    }

    pub fn fail(&mut self) {
        error!("Stage: {} -> {}", self.stage, RunStage::Failed);
        self.stage = RunStage::Failed;
        self.entered = Instant::now();
    }
}
