use crate::mail_reader::message::Message;
use log::{debug, error};

// Dump the fetched messages as JSON at debug level, bodies included.
pub fn display_messages(messages: &[Message]) {
    messages
        .iter()
        .for_each(|message| {
            match serde_json::to_string_pretty(message) {
                Ok(json) => debug!("{}", json),
                Err(e) => error!("Error converting to JSON: {}", e),
            }
            debug!("---");
        });
}
