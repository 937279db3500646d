pub mod chunker;
pub mod generation;

use crate::settings::SummarizerConfig;
use crate::summarizer::chunker::{split_into_chunks, truncate_at_sentence};
use crate::summarizer::generation::Generate;
use log::{info, warn};

pub const SUMMARY_ERROR: &str = "Error: could not generate summary";
pub const SPLIT_ERROR: &str = "Error: could not split email into chunks";
pub const CHUNK_SUMMARY_ERROR: &str = "Error: could not generate any chunk summaries";

// The prompt keeps sender and subject visible to the model so the summary
// can name who is writing and what about.
fn format_prompt(subject: &str, from: &str, body: &str) -> String {
    format!("Newsletter Email\n\nFrom: {}\nSubject: {}\n\n{}", from, subject, body)
}

// One generation call. Every failure mode collapses to None so the caller
// can skip the unit and move on.
async fn try_summarize<G: Generate>(generator: &G, text: &str) -> Option<String> {
    match generator.generate(text).await {
        Ok(summary) => {
            let summary = summary.trim().to_string();
            if summary.is_empty() {
                None
            } else {
                Some(summary)
            }
        }
        Err(e) => {
            warn!("Generation call failed: {}", e);
            None
        }
    }
}

// Convert one message into one bounded summary string. Bodies over the
// direct-length threshold are split into fixed-size character chunks and
// every chunk is summarized in order (full sequential coverage), the
// surviving chunk summaries are stitched back together, and the stitched
// text is optionally rewritten into a single coherent summary.
//
// This never returns an empty string: when nothing could be generated the
// result is an explicit error marker, so the digest keeps one entry per
// fetched message.
pub async fn summarize_message<G: Generate>(
    generator: &G,
    settings: &SummarizerConfig,
    subject: &str,
    from: &str,
    body: &str,
) -> String {
    let body_length = body.chars().count();

    // Short emails go through a single request
    if body_length <= settings.max_direct_length {
        info!("Email length: {} chars, summarizing directly", body_length);
        return match try_summarize(generator, &format_prompt(subject, from, body)).await {
            Some(summary) => summary,
            None => SUMMARY_ERROR.to_string(),
        };
    }

    info!("Long email ({} chars), splitting into chunks", body_length);
    let chunks = split_into_chunks(body, settings.chunk_size, settings.chunk_overlap);
    if chunks.is_empty() {
        return SPLIT_ERROR.to_string();
    }
    info!("Split into {} chunk(s)", chunks.len());

    let mut chunk_summaries = Vec::new();
    for (index, chunk) in chunks.iter().enumerate() {
        info!(
            "Chunk {}/{}: summarizing {} chars",
            index + 1,
            chunks.len(),
            chunk.chars().count()
        );
        match try_summarize(generator, &format_prompt(subject, from, chunk)).await {
            Some(summary) => {
                chunk_summaries.push(truncate_at_sentence(&summary, settings.chunk_summary_cap));
            }
            None => warn!("Chunk {}/{} produced no summary", index + 1, chunks.len()),
        }
    }

    if chunk_summaries.is_empty() {
        return CHUNK_SUMMARY_ERROR.to_string();
    }

    let combined = chunk_summaries.join(" ");
    info!(
        "Combined summary from {} chunk(s): {} chars",
        chunk_summaries.len(),
        combined.chars().count()
    );

    if settings.refine {
        refine_summary(generator, settings, &combined, &chunk_summaries).await
    } else {
        combined
    }
}

// Second pass over the stitched chunk summaries: ask for one coherent text
// inside the configured length band. A rewrite that comes back too short is
// padded with the sentence-trimmed chunk summaries; a failed rewrite falls
// back to the stitched text.
async fn refine_summary<G: Generate>(
    generator: &G,
    settings: &SummarizerConfig,
    combined: &str,
    chunk_summaries: &[String],
) -> String {
    let instruction = format!(
        "Rewrite the following notes into a single coherent summary of {} to {} characters:\n\n{}",
        settings.min_summary_length, settings.max_summary_length, combined
    );

    let Some(refined) = try_summarize(generator, &instruction).await else {
        warn!("Refinement call failed, keeping the stitched chunk summaries");
        return combined.to_string();
    };

    let mut summary = truncate_at_sentence(&refined, settings.max_summary_length);

    let mut index = 0;
    while summary.chars().count() < settings.min_summary_length && index < chunk_summaries.len() {
        summary.push(' ');
        summary.push_str(&chunk_summaries[index]);
        index += 1;
    }

    summary
}
