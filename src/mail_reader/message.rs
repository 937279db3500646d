use anyhow::{anyhow, bail, Result};
use mailparse::{parse_mail, MailHeaderMap};
use serde::{Serialize, Deserialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Message {
    pub subject: String,
    pub from: String,
    pub date: String,
    pub message_id: Option<String>,
    pub body: String,
}

fn find_text_part(part: &mailparse::ParsedMail, mime_type: &str) -> Result<Option<String>> {
    let content_type = part.headers.get_first_value("Content-Type")
        .unwrap_or_else(|| "text/plain".to_string());

    // If this is a part of the wanted type, return its content
    if content_type.starts_with(mime_type) {
        return Ok(Some(part.get_body()?));
    }

    // Recursively search subparts
    for subpart in &part.subparts {
        if let Some(text) = find_text_part(subpart, mime_type)? {
            return Ok(Some(text));
        }
    }

    Ok(None)
}

// Prefer the plain text part; newsletters are often HTML-only, so fall
// back to the HTML part coerced to text.
fn extract_text_content(parsed_mail: &mailparse::ParsedMail) -> Result<String> {
    if let Some(text) = find_text_part(parsed_mail, "text/plain")? {
        return Ok(text.trim().to_string());
    }

    if let Some(html) = find_text_part(parsed_mail, "text/html")? {
        let text = html2text::from_read(html.as_bytes(), 80)
            .map_err(|e| anyhow!("Failed to render HTML body: {}", e))?;
        return Ok(text.trim().to_string());
    }

    Ok(String::new())
}

pub fn process_message(message: &async_imap::types::Fetch) -> Result<Message> {
    let Some(body) = message.body() else {
        bail!("Message did not have a body");
    };
    let parsed_mail = parse_mail(body)?;

    let subject = parsed_mail.headers.get_first_value("Subject")
        .unwrap_or_else(|| "(No Subject)".to_string());
    let from = parsed_mail.headers.get_first_value("From")
        .unwrap_or_else(|| "Unknown".to_string());
    let date = parsed_mail.headers.get_first_value("Date")
        .unwrap_or_default();
    let message_id = parsed_mail.headers.get_first_value("Message-ID");

    let content = extract_text_content(&parsed_mail)?;

    Ok(Message {
        subject,
        from,
        date,
        message_id,
        body: content,
    })
}
