// src/plugins/transcript.rs

//! Utterance records and the stage that reads them from disk.
//!
//! Source files are tab-separated, one utterance per line:
//!
//! ```text
//! # speaker  start  end   text
//! A          0.00   1.20  so what happened
//! B          1.05   2.40  well I
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::plugins::JobInput;
use crate::task::{DependencyOutputs, Task, TaskResult};

/// One timed turn of talk.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub speaker: String,
    /// Seconds from the start of the recording.
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// All utterances of one source file, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub source: PathBuf,
    pub utterances: Vec<Utterance>,
}

pub fn parse_utterances(contents: &str) -> Result<Vec<Utterance>> {
    let mut utterances = Vec::new();

    for (idx, line) in contents.lines().enumerate() {
        let lineno = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.splitn(4, '\t').collect();
        if fields.len() != 4 {
            bail!("line {lineno}: expected 4 tab-separated fields, got {}", fields.len());
        }

        let start: f64 = fields[1]
            .trim()
            .parse()
            .with_context(|| format!("line {lineno}: invalid start time '{}'", fields[1]))?;
        let end: f64 = fields[2]
            .trim()
            .parse()
            .with_context(|| format!("line {lineno}: invalid end time '{}'", fields[2]))?;
        if end < start {
            bail!("line {lineno}: utterance ends ({end}) before it starts ({start})");
        }

        utterances.push(Utterance {
            speaker: fields[0].trim().to_string(),
            start,
            end,
            text: fields[3].trim().to_string(),
        });
    }

    Ok(utterances)
}

pub fn load_transcript(path: &Path) -> Result<Transcript> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading transcript '{}'", path.display()))?;
    let utterances =
        parse_utterances(&contents).with_context(|| format!("parsing '{}'", path.display()))?;
    debug!(source = %path.display(), utterances = utterances.len(), "loaded transcript");
    Ok(Transcript {
        source: path.to_path_buf(),
        utterances,
    })
}

/// Reads every source of the job. Output: `Vec<Transcript>`.
#[derive(Debug, Default)]
pub struct LoadTranscripts;

impl Task<JobInput> for LoadTranscripts {
    fn run(&self, _deps: &DependencyOutputs, job: &JobInput) -> TaskResult {
        if job.sources.is_empty() {
            return TaskResult::failure("no source files given".to_string());
        }

        let loaded: Result<Vec<Transcript>> =
            job.sources.iter().map(|p| load_transcript(p)).collect();

        match loaded {
            Ok(transcripts) => TaskResult::success(transcripts),
            Err(e) => TaskResult::failure(format!("{e:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comments_blanks_and_tabs_in_text() {
        let input = "# header\n\nA\t0.0\t1.2\tso what\thappened\nB\t1.05\t2.4\twell I\n";
        let utterances = parse_utterances(input).unwrap();
        assert_eq!(utterances.len(), 2);
        assert_eq!(utterances[0].text, "so what\thappened");
        assert_eq!(utterances[1].speaker, "B");
        assert_eq!(utterances[1].start, 1.05);
    }

    #[test]
    fn reports_the_offending_line() {
        let err = parse_utterances("A\t0.0\t1.0\tok\nB\tx\t2.0\tbad\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));

        let err = parse_utterances("A\t2.0\t1.0\tbackwards\n").unwrap_err();
        assert!(err.to_string().contains("before it starts"));

        let err = parse_utterances("A\t2.0\n").unwrap_err();
        assert!(err.to_string().contains("4 tab-separated fields"));
    }

    #[test]
    fn missing_file_is_an_expected_failure() {
        let job = JobInput::new(vec![PathBuf::from("/definitely/not/here.tsv")], ".");
        let result = LoadTranscripts.run(&DependencyOutputs::new(), &job);
        assert!(!result.success);
        assert!(result.output.as_str().unwrap().contains("reading transcript"));
    }
}
