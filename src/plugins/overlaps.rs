// src/plugins/overlaps.rs

//! Overlapping talk between different speakers.

use crate::plugins::JobInput;
use crate::plugins::transcript::{Transcript, Utterance};
use crate::task::{DependencyOutputs, Task, TaskResult};

/// Utterance `second` starts `duration` seconds before utterance `first`
/// ends, and the two have different speakers.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlap {
    pub first: usize,
    pub second: usize,
    pub duration: f64,
}

/// Overlaps per transcript, aligned with the transcript list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverlapAnnotations(pub Vec<Vec<Overlap>>);

/// Compares each utterance with the ones that start before it ends.
pub fn find_overlaps(utterances: &[Utterance]) -> Vec<Overlap> {
    let mut found = Vec::new();

    for (i, a) in utterances.iter().enumerate() {
        for (j, b) in utterances.iter().enumerate().skip(i + 1) {
            if b.start >= a.end {
                continue;
            }
            if a.speaker == b.speaker {
                continue;
            }
            let duration = a.end.min(b.end) - b.start.max(a.start);
            if duration > 0.0 {
                found.push(Overlap {
                    first: i,
                    second: j,
                    duration,
                });
            }
        }
    }

    found
}

/// Output: [`OverlapAnnotations`].
#[derive(Debug, Default)]
pub struct Overlaps;

impl Task<JobInput> for Overlaps {
    fn run(&self, deps: &DependencyOutputs, _job: &JobInput) -> TaskResult {
        if let Some(failed) = deps.first_failed() {
            return TaskResult::skipped(failed);
        }
        let Some((_, transcripts)) = deps.find_output::<Vec<Transcript>>() else {
            return TaskResult::failure("no transcript dependency".to_string());
        };

        let overlaps = transcripts
            .iter()
            .map(|t| find_overlaps(&t.utterances))
            .collect();
        TaskResult::success(OverlapAnnotations(overlaps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utt(speaker: &str, start: f64, end: f64) -> Utterance {
        Utterance {
            speaker: speaker.into(),
            start,
            end,
            text: String::new(),
        }
    }

    #[test]
    fn cross_speaker_overlaps_only() {
        let utterances = vec![
            utt("A", 0.0, 2.0),
            utt("B", 1.5, 3.0),
            utt("B", 2.5, 4.0),
            utt("A", 5.0, 6.0),
        ];
        let overlaps = find_overlaps(&utterances);
        assert_eq!(
            overlaps,
            vec![Overlap {
                first: 0,
                second: 1,
                duration: 0.5
            }]
        );
    }
}
