use anyhow::Result;
use async_imap::{Client, Session};
use chrono::{Duration, Local};
use futures::TryStreamExt;
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

use crate::mail_reader::message::{self, Message};
use crate::settings::Config;
use log::{info, warn};

pub type ImapSession = Session<Compat<tokio_native_tls::TlsStream<TcpStream>>>;

// Establish a TLS-encrypted connection to the IMAP server
async fn connect_to_server(server: &str, port: u16) -> Result<tokio_native_tls::TlsStream<TcpStream>> {
    let imap_addr = (server, port);
    let tcp_stream = TcpStream::connect(imap_addr).await?;
    let tls = tokio_native_tls::TlsConnector::from(native_tls::TlsConnector::new()?);
    let tls_stream = tls.connect(server, tcp_stream).await?;

    info!("-- connected to {}:{}", server, port);
    Ok(tls_stream)
}

// Login to the IMAP server and return an authenticated session
async fn login_to_server(
    client: Client<Compat<tokio_native_tls::TlsStream<TcpStream>>>,
    username: &str,
    password: &str
) -> Result<ImapSession> {
    let imap_session = client
        .login(username, password)
        .await
        .map_err(|e| e.0)?;

    info!("-- logged in as {}", username);
    Ok(imap_session)
}

pub async fn create_session(config: &Config, username: &str, password: &str) -> Result<ImapSession> {
    let tls_stream = connect_to_server(config.imap.server.as_str(), config.imap.port).await?;
    let compat_stream = tls_stream.compat();
    let client = Client::new(compat_stream);

    login_to_server(client, username, password).await
}

// IMAP SEARCH wants dates as DD-Mon-YYYY
fn since_date(days_back: i64) -> String {
    let cutoff = Local::now().date_naive() - Duration::days(days_back);
    cutoff.format("%d-%b-%Y").to_string()
}

// Find the messages that arrived inside the recency window, oldest first
async fn search_recent(
    session: &mut ImapSession,
    mailbox: &str,
    days_back: i64,
    max_messages: usize
) -> Result<Vec<u32>> {
    session.select(mailbox).await?;
    info!("-- {} selected", mailbox);

    let query = format!("SINCE {}", since_date(days_back));
    let mut ids: Vec<u32> = session.search(&query).await?.into_iter().collect();
    ids.sort_unstable();

    if ids.len() > max_messages {
        ids.drain(..ids.len() - max_messages);
    }

    Ok(ids)
}

// Fetch full bodies for every message under the digest label that falls
// inside the recency window. A message that cannot be parsed is skipped.
pub async fn fetch_messages_from_server(
    session: &mut ImapSession,
    config: &Config
) -> Result<Vec<Message>> {
    let ids = search_recent(
        session,
        &config.digest.label,
        config.digest.days_back,
        config.digest.max_messages
    ).await?;

    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sequence_set = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",");

    // Fetch both headers and body
    let messages_stream = session.fetch(&sequence_set, "(RFC822 BODY.PEEK[])").await?;
    let fetches: Vec<_> = messages_stream.try_collect().await?;

    let messages: Vec<Message> = fetches
        .iter()
        .filter_map(|fetch| match message::process_message(fetch) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping a message that could not be parsed: {}", e);
                None
            }
        })
        .collect();

    Ok(messages)
}
