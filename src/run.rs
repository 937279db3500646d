use chrono::Local;
use log::{error, info};

use crate::digest;
use crate::mail_reader::display;
use crate::mail_reader::encryption;
use crate::mail_reader::imap;
use crate::mail_sender;
use crate::settings::{self, Config};
use crate::summarizer;
use crate::summarizer::generation::InferenceClient;

// One full digest run: fetch, summarize sequentially, render, save, send.
pub async fn entrypoint(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // Both credentials are resolved before any network activity starts
    let api_key = settings::generation_api_key()?;
    let generator = InferenceClient::new(&config.summarizer, api_key)?;
    let (username, password) = encryption::get_credentials(config.imap.username.as_str())?;

    info!("Fetching recent messages from the '{}' label", config.digest.label);
    let mut imap_session = imap::create_session(config, &username, &password).await?;
    let messages = imap::fetch_messages_from_server(&mut imap_session, config).await?;

    // Be nice to the server and log out
    imap_session.logout().await?;

    if messages.is_empty() {
        info!("No newsletters found for the last {} day(s)", config.digest.days_back + 1);
        return Ok(());
    }
    info!("Found {} newsletter(s)", messages.len());
    display::display_messages(&messages);

    // Summaries are produced in fetch order, one message at a time. A
    // message that fails to summarize still gets an entry, so the digest
    // always has one section per fetched message.
    let mut summaries = Vec::with_capacity(messages.len());
    for (index, message) in messages.iter().enumerate() {
        info!("[{}/{}] {}", index + 1, messages.len(), message.subject);
        let summary = summarizer::summarize_message(
            &generator,
            &config.summarizer,
            &message.subject,
            &message.from,
            &message.body,
        )
        .await;
        info!("Summary length: {} chars", summary.chars().count());
        summaries.push(summary);
    }

    let today = Local::now().date_naive();
    let now = Local::now().naive_local();

    let markdown = digest::render_digest(&messages, &summaries, today, now);
    let filename = digest::digest_filename(today);
    digest::save_digest(&markdown, &filename)?;

    let recipient = settings::recipient_address(config);
    let subject = format!("Newsletter Digest - {}", today.format("%Y-%m-%d"));
    let body = digest::to_plain_text(&markdown);

    // The digest file is already on disk, so a failed send does not fail the run
    if let Err(e) = mail_sender::send_digest(config, &password, &recipient, &subject, &body) {
        error!("Failed to send the digest email: {}", e);
    }

    Ok(())
}
