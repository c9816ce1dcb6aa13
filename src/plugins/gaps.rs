// src/plugins/gaps.rs

//! Pauses between consecutive utterances.

use anyhow::{Result, bail};

use crate::plugins::transcript::{Transcript, Utterance};
use crate::plugins::{JobInput, option_f64};
use crate::task::{DependencyOutputs, Task, TaskResult};

/// Silence of `duration` seconds after utterance `after`.
#[derive(Debug, Clone, PartialEq)]
pub struct Gap {
    pub after: usize,
    pub duration: f64,
}

/// Gaps per transcript, aligned with the transcript list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GapAnnotations(pub Vec<Vec<Gap>>);

pub const DEFAULT_MIN_GAP: f64 = 0.3;

pub fn find_gaps(utterances: &[Utterance], min_gap: f64) -> Vec<Gap> {
    utterances
        .windows(2)
        .enumerate()
        .filter_map(|(i, pair)| {
            let duration = pair[1].start - pair[0].end;
            (duration >= min_gap).then_some(Gap { after: i, duration })
        })
        .collect()
}

/// Marks gaps of at least `min_gap` seconds. Output: [`GapAnnotations`].
#[derive(Debug)]
pub struct TurnGaps {
    min_gap: f64,
}

impl TurnGaps {
    pub fn new(min_gap: f64) -> Self {
        Self { min_gap }
    }

    pub fn from_options(options: &toml::Table) -> Result<Self> {
        let min_gap = option_f64(options, "min_gap")?.unwrap_or(DEFAULT_MIN_GAP);
        if min_gap < 0.0 {
            bail!("min_gap must be >= 0 (got {min_gap})");
        }
        Ok(Self::new(min_gap))
    }
}

impl Task<JobInput> for TurnGaps {
    fn run(&self, deps: &DependencyOutputs, _job: &JobInput) -> TaskResult {
        if let Some(failed) = deps.first_failed() {
            return TaskResult::skipped(failed);
        }
        let Some((_, transcripts)) = deps.find_output::<Vec<Transcript>>() else {
            return TaskResult::failure("no transcript dependency".to_string());
        };

        let gaps = transcripts
            .iter()
            .map(|t| find_gaps(&t.utterances, self.min_gap))
            .collect();
        TaskResult::success(GapAnnotations(gaps))
    }
}
