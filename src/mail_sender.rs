use anyhow::{Context, Result};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::info;

use crate::settings::Config;

// Deliver the digest as one plain-text email from the account to the
// configured recipient. The SMTP side reuses the mail account credentials.
pub fn send_digest(
    config: &Config,
    password: &str,
    recipient: &str,
    subject: &str,
    body: &str,
) -> Result<()> {
    let email = Message::builder()
        .from(config.imap.username.parse().context("Sender address is invalid")?)
        .to(recipient.parse().context("Recipient address is invalid")?)
        .subject(subject)
        .body(body.to_string())
        .context("Failed to build the digest email")?;

    let transport = SmtpTransport::relay(&config.smtp.server)
        .context("Failed to configure the SMTP transport")?
        .port(config.smtp.port)
        .credentials(Credentials::new(
            config.imap.username.clone(),
            password.to_string(),
        ))
        .build();

    let response = transport.send(&email).context("Failed to send the digest email")?;
    info!("Digest email sent to {} ({:?})", recipient, response.code());

    Ok(())
}
