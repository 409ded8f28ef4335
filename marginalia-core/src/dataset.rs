// Transcript dataset export
// Reads a local JSONL file of {transcript_id, text, split} rows

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use color_eyre::{eyre::Context, Result};

use crate::types::Transcript;

/// Load every transcript from a JSONL export, in file order
pub fn load_transcripts(path: &Path) -> Result<Vec<Transcript>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut transcripts = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }

        let transcript: Transcript = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: invalid transcript row", path.display(), idx + 1))?;
        transcripts.push(transcript);
    }

    tracing::debug!(count = transcripts.len(), path = %path.display(), "Loaded transcripts");
    Ok(transcripts)
}

/// Transcripts belonging to `split`, or all of them when `split` is None
pub fn filter_split<'a>(transcripts: &'a [Transcript], split: Option<&str>) -> Vec<&'a Transcript> {
    transcripts
        .iter()
        .filter(|t| split.is_none() || t.split.as_deref() == split)
        .collect()
}

/// Number of transcripts per split. Rows without a split count as "unsplit".
pub fn split_counts(transcripts: &[Transcript]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for transcript in transcripts {
        let split = transcript.split.as_deref().unwrap_or("unsplit");
        *counts.entry(split.to_string()).or_insert(0) += 1;
    }
    counts
}
