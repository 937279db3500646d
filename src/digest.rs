use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use log::info;
use regex::Regex;

use crate::mail_reader::message::Message;

// Render the markdown digest. One section per (message, summary) pair, in
// input order, separated by horizontal rules.
pub fn render_digest(
    messages: &[Message],
    summaries: &[String],
    today: NaiveDate,
    now: NaiveDateTime,
) -> String {
    let mut digest = format!("# Newsletter Digest - {}\n\n", today.format("%Y-%m-%d"));
    digest.push_str(&format!("*Generated on {}*\n\n", now.format("%Y-%m-%d %H:%M:%S")));
    digest.push_str("---\n\n");

    for (message, summary) in messages.iter().zip(summaries) {
        digest.push_str(&format!("## {}\n\n", message.subject));
        digest.push_str(&format!("**From:** {}\n\n", message.from));
        digest.push_str(&format!("**Date:** {}\n\n", message.date));
        digest.push_str(&format!("**Summary:**\n{}\n\n", summary));
        digest.push_str("---\n\n");
    }

    digest
}

pub fn digest_filename(today: NaiveDate) -> String {
    format!("newsletter_digest_{}.md", today.format("%Y-%m-%d"))
}

// Strip the markdown decorations the digest template emits, leaving plain
// text suitable for an email body.
pub fn to_plain_text(markdown: &str) -> String {
    let headers = Regex::new(r"(?m)^#+\s*").unwrap();
    let text = headers.replace_all(markdown, "");
    text.replace("**", "")
}

pub fn save_digest(digest: &str, filename: &str) -> Result<()> {
    std::fs::write(filename, digest)
        .with_context(|| format!("Failed to write digest to {}", filename))?;
    info!("Digest saved to {}", filename);
    Ok(())
}
