#[cfg(test)]
mod tests {

    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::Result;
    use chrono::NaiveDate;

    use crate::digest::{digest_filename, render_digest, to_plain_text};
    use crate::mail_reader::message::Message;
    use crate::settings::{Config, SummarizerConfig};
    use crate::summarizer::chunker::{split_into_chunks, truncate_at_sentence};
    use crate::summarizer::generation::Generate;
    use crate::summarizer::{summarize_message, CHUNK_SUMMARY_ERROR, SUMMARY_ERROR};

    // Generator that replies with a fixed text (or always fails) and
    // counts how many calls it received.
    struct CannedGenerator {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    impl CannedGenerator {
        fn succeeding(reply: &str) -> Self {
            CannedGenerator {
                reply: Some(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            CannedGenerator {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Generate for CannedGenerator {
        async fn generate(&self, _input: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Some(reply) => Ok(reply.clone()),
                None => Err(anyhow::anyhow!("generation unavailable")),
            }
        }
    }

    fn summarizer_config() -> SummarizerConfig {
        SummarizerConfig {
            model: "test-model".to_string(),
            endpoint: "https://example.invalid/models".to_string(),
            max_direct_length: 2000,
            chunk_size: 1500,
            chunk_overlap: 0,
            chunk_summary_cap: 400,
            refine: false,
            min_summary_length: 80,
            max_summary_length: 200,
        }
    }

    fn body_of_length(length: usize) -> String {
        "abcde".chars().cycle().take(length).collect()
    }

    #[tokio::test]
    async fn test_short_body_makes_one_generation_call() {
        let generator = CannedGenerator::succeeding("  A tidy summary.  ");
        let config = summarizer_config();

        let summary =
            summarize_message(&generator, &config, "Weekly news", "news@example.com", "Short body")
                .await;

        assert_eq!(summary, "A tidy summary.");
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_generation_returns_error_marker() {
        let generator = CannedGenerator::failing();
        let config = summarizer_config();

        let summary =
            summarize_message(&generator, &config, "Weekly news", "news@example.com", "Short body")
                .await;

        assert_eq!(summary, SUMMARY_ERROR);
        assert!(!summary.is_empty());
    }

    #[tokio::test]
    async fn test_all_chunks_failing_returns_error_marker() {
        let generator = CannedGenerator::failing();
        let config = summarizer_config();
        let body = body_of_length(4500);

        let summary =
            summarize_message(&generator, &config, "Weekly news", "news@example.com", &body).await;

        assert_eq!(summary, CHUNK_SUMMARY_ERROR);
        assert!(!summary.is_empty());
        // One call per chunk, no refinement without surviving summaries
        assert_eq!(generator.call_count(), 3);
    }

    #[tokio::test]
    async fn test_long_body_stitches_chunk_summaries() {
        let generator = CannedGenerator::succeeding("This chunk covered several stories.");
        let config = summarizer_config();
        let body = body_of_length(4500);

        let summary =
            summarize_message(&generator, &config, "Weekly news", "news@example.com", &body).await;

        assert_eq!(
            summary,
            "This chunk covered several stories. \
             This chunk covered several stories. \
             This chunk covered several stories."
        );
        assert_eq!(generator.call_count(), 3);
    }

    #[tokio::test]
    async fn test_refined_summary_meets_minimum_length() {
        let generator = CannedGenerator::succeeding(
            "The newsletter covers several product updates and community news.",
        );
        let mut config = summarizer_config();
        config.refine = true;

        let body = body_of_length(4500);
        let summary =
            summarize_message(&generator, &config, "Weekly news", "news@example.com", &body).await;

        assert!(!summary.is_empty());
        assert!(summary.chars().count() >= config.min_summary_length);
        // Three chunk calls plus the refinement call
        assert_eq!(generator.call_count(), 4);
    }

    #[test]
    fn test_chunking_exact_multiple() {
        let body = body_of_length(4500);
        let chunks = split_into_chunks(&body, 1500, 0);

        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert_eq!(chunk.chars().count(), 1500);
        }
        assert_eq!(chunks.concat(), body);
    }

    #[test]
    fn test_chunking_rounds_up_and_reconstructs() {
        let body = body_of_length(5000);
        let chunks = split_into_chunks(&body, 1500, 0);

        // ceil(5000 / 1500) = 4, with a short tail chunk
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[3].chars().count(), 500);
        assert_eq!(chunks.concat(), body);
    }

    #[test]
    fn test_chunking_with_overlap_repeats_the_seam() {
        let body: String = "0123456789".chars().cycle().take(5000).collect();
        let chunks = split_into_chunks(&body, 2000, 200);

        // Windows start at 0, 1800 and 3600
        assert_eq!(chunks.len(), 3);
        let seam: String = chunks[0].chars().skip(1800).collect();
        let head: String = chunks[1].chars().take(200).collect();
        assert_eq!(seam, head);
    }

    #[test]
    fn test_truncate_under_cap_is_unchanged() {
        let text = "A short sentence.";
        assert_eq!(truncate_at_sentence(text, 100), text);
    }

    #[test]
    fn test_truncate_ends_at_sentence_boundary() {
        let text = "First sentence. Second sentence goes on and on and on.";
        let capped = truncate_at_sentence(text, 30);

        assert_eq!(capped, "First sentence.");
        assert!(capped.chars().count() <= 30);
        assert!(capped.ends_with('.'));
    }

    #[test]
    fn test_truncate_without_period_is_a_hard_cut() {
        let text = body_of_length(100);
        let capped = truncate_at_sentence(&text, 25);

        assert_eq!(capped.chars().count(), 25);
    }

    #[test]
    fn test_digest_has_one_section_per_message_in_order() {
        let messages = vec![
            Message {
                subject: "First newsletter".to_string(),
                from: "one@example.com".to_string(),
                date: "Mon, 3 Aug 2026 08:00:00 +0000".to_string(),
                ..Default::default()
            },
            Message {
                subject: "Second newsletter".to_string(),
                from: "two@example.com".to_string(),
                date: "Tue, 4 Aug 2026 08:00:00 +0000".to_string(),
                ..Default::default()
            },
        ];
        let summaries = vec![
            "Summary of the first.".to_string(),
            "Summary of the second.".to_string(),
        ];
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let now = today.and_hms_opt(7, 30, 0).unwrap();

        let markdown = render_digest(&messages, &summaries, today, now);

        assert_eq!(markdown.matches("## ").count(), 2);
        let first = markdown.find("## First newsletter").unwrap();
        let second = markdown.find("## Second newsletter").unwrap();
        assert!(first < second);
        assert!(markdown.contains("# Newsletter Digest - 2026-08-06"));
        assert!(markdown.contains("**From:** one@example.com"));
        assert!(markdown.contains("**Date:** Tue, 4 Aug 2026 08:00:00 +0000"));
        assert!(markdown.contains("**Summary:**\nSummary of the second."));
    }

    #[test]
    fn test_digest_filename_is_deterministic() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        assert_eq!(digest_filename(today), "newsletter_digest_2026-08-06.md");
    }

    #[test]
    fn test_plain_text_strips_markdown_decorations() {
        let markdown = "# Title\n\n## Section\n\n**From:** someone\n\n---\n";
        let text = to_plain_text(markdown);

        assert_eq!(text, "Title\n\nSection\n\nFrom: someone\n\n---\n");
    }

    #[test]
    fn test_settings_fill_in_defaults() {
        let yaml = r#"
imap:
  server: imap.example.com
  port: 993
  username: user@example.com
smtp:
  server: smtp.example.com
  port: 465
digest:
  label: Newsletters
summarizer:
  model: some/summarization-model
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.digest.days_back, 2);
        assert_eq!(config.digest.max_messages, 50);
        assert_eq!(config.summarizer.chunk_size, 2000);
        assert_eq!(config.summarizer.chunk_overlap, 0);
        assert!(config.summarizer.refine);
        assert_eq!(config.summarizer.min_summary_length, 500);
    }
}
