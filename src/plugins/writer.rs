// src/plugins/writer.rs

//! Plain-text rendering of transcripts and their annotations.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::plugins::JobInput;
use crate::plugins::gaps::{Gap, GapAnnotations};
use crate::plugins::overlaps::{Overlap, OverlapAnnotations};
use crate::plugins::transcript::Transcript;
use crate::task::{DependencyOutputs, Task, TaskResult};

/// Render one transcript.
///
/// Gap and overlap annotations are optional; a failed annotation stage
/// simply leaves its marks out.
pub fn render(transcript: &Transcript, gaps: &[Gap], overlaps: &[Overlap]) -> String {
    let mut out = String::new();
    // Formatting into a String cannot fail.
    for (i, u) in transcript.utterances.iter().enumerate() {
        write!(out, "[{:.2}-{:.2}] {}: {}", u.start, u.end, u.speaker, u.text).ok();
        for o in overlaps.iter().filter(|o| o.second == i) {
            write!(out, "  [overlaps {} by {:.2}s]", o.first + 1, o.duration).ok();
        }
        out.push('\n');

        for g in gaps.iter().filter(|g| g.after == i) {
            writeln!(out, "({:.1})", g.duration).ok();
        }
    }

    out
}

/// Picks `<stem>.txt` inside `dir`, or `<stem>-1.txt`, `<stem>-2.txt`, ...
/// when an earlier transcript of this run already took that name.
fn unique_output_path(dir: &Path, stem: &str, taken: &mut HashSet<String>) -> PathBuf {
    let mut name = format!("{stem}.txt");
    let mut n = 0;
    while !taken.insert(name.clone()) {
        n += 1;
        name = format!("{stem}-{n}.txt");
    }
    dir.join(name)
}

/// Writes `<output_dir>/<source stem>.txt` per transcript.
/// Sources sharing a stem get numbered names in source order.
/// Output: `Vec<PathBuf>` of written files.
#[derive(Debug, Default)]
pub struct WriteText;

impl WriteText {
    fn write_all(&self, deps: &DependencyOutputs, job: &JobInput) -> Result<Vec<PathBuf>> {
        let Some((_, transcripts)) = deps.find_output::<Vec<Transcript>>() else {
            anyhow::bail!("no transcript dependency");
        };

        let gaps = successful::<GapAnnotations>(deps).map(|g| g.0.as_slice());
        let overlaps = successful::<OverlapAnnotations>(deps).map(|o| o.0.as_slice());

        fs::create_dir_all(&job.output_dir)
            .with_context(|| format!("creating '{}'", job.output_dir.display()))?;

        let mut taken = HashSet::new();
        let mut written = Vec::with_capacity(transcripts.len());
        for (idx, transcript) in transcripts.iter().enumerate() {
            let stem = transcript
                .source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("transcript-{idx}"));
            let path = unique_output_path(&job.output_dir, &stem, &mut taken);
            if path.file_stem().is_some_and(|s| s.to_string_lossy() != stem) {
                warn!(
                    source = %transcript.source.display(),
                    path = %path.display(),
                    "output name already used in this run, renamed"
                );
            }

            let text = render(
                transcript,
                gaps.and_then(|g| g.get(idx)).map(Vec::as_slice).unwrap_or(&[]),
                overlaps.and_then(|o| o.get(idx)).map(Vec::as_slice).unwrap_or(&[]),
            );
            fs::write(&path, text).with_context(|| format!("writing '{}'", path.display()))?;
            info!(path = %path.display(), "wrote transcript");
            written.push(path);
        }

        Ok(written)
    }
}

/// Output of the first successful dependency producing a `T`.
fn successful<T: std::any::Any>(deps: &DependencyOutputs) -> Option<&T> {
    deps.iter()
        .filter(|(_, s)| s.success())
        .find_map(|(_, s)| s.output().downcast_ref::<T>())
}

impl Task<JobInput> for WriteText {
    fn run(&self, deps: &DependencyOutputs, job: &JobInput) -> TaskResult {
        // Annotation failures are tolerated, a missing transcript is not.
        if deps.find_output::<Vec<Transcript>>().is_none()
            && let Some(failed) = deps.first_failed()
        {
            return TaskResult::skipped(failed);
        }

        match self.write_all(deps, job) {
            Ok(paths) => TaskResult::success(paths),
            Err(e) => TaskResult::failure(format!("{e:#}")),
        }
    }
}
