use serde::Deserialize;

use std::env;
use std::fs::File;
use std::io::BufReader;
use serde_yaml::Error;
use anyhow::anyhow;
use backtrace::Backtrace;
use log::error;

// Main configuration struct
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub imap: ImapConfig,
    pub smtp: SmtpConfig,
    pub digest: DigestConfig,
    pub summarizer: SummarizerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImapConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DigestConfig {
    pub label: String,
    // 0 = today only, 2 = today, yesterday and the day before
    #[serde(default = "default_days_back")]
    pub days_back: i64,
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummarizerConfig {
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    // Bodies up to this many characters go through a single generation call
    #[serde(default = "default_max_direct_length")]
    pub max_direct_length: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_chunk_summary_cap")]
    pub chunk_summary_cap: usize,
    // Rewrite the stitched chunk summaries into one coherent text
    #[serde(default = "default_refine")]
    pub refine: bool,
    #[serde(default = "default_min_summary_length")]
    pub min_summary_length: usize,
    #[serde(default = "default_max_summary_length")]
    pub max_summary_length: usize,
}

fn default_days_back() -> i64 {
    2
}

fn default_max_messages() -> usize {
    50
}

fn default_endpoint() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_max_direct_length() -> usize {
    2000
}

fn default_chunk_size() -> usize {
    2000
}

fn default_chunk_overlap() -> usize {
    0
}

fn default_chunk_summary_cap() -> usize {
    400
}

fn default_refine() -> bool {
    true
}

fn default_min_summary_length() -> usize {
    500
}

fn default_max_summary_length() -> usize {
    800
}

pub fn load_settings() -> Result<Config, Error> {
    // Open the YAML file
    let file = File::open("src/resources/settings.yaml");
    let file = match file {
        Ok(file) => file,
        Err(err) => {
            error!("Error: {}", err);

            // Capture and print the backtrace
            let backtrace = Backtrace::new();
            error!("Backtrace:\n{:?}", backtrace);
            panic!("Cannot find settings")
        }
    };

    let reader = BufReader::new(file);

    // Parse the YAML file into the Settings struct
    let config_result = serde_yaml::from_reader(reader);
    let config: Config = match config_result {
        Ok(config) => config,
        Err(err) => {
            error!("Error: {}", err);

            // Capture and print the backtrace
            let backtrace = Backtrace::new();
            error!("Backtrace:\n{:?}", backtrace);
            panic!("Cannot deserialize settings")
        }
    };

    Ok(config)
}

// The generation service rejects anonymous requests, so a missing token
// has to stop the run before anything touches the network.
pub fn generation_api_key() -> anyhow::Result<String> {
    env::var("HF_API_KEY")
        .or_else(|_| env::var("HUGGINGFACE_API_KEY"))
        .map_err(|_| anyhow!("HF_API_KEY is not set. Export a Hugging Face API token and retry."))
}

pub fn recipient_address(config: &Config) -> String {
    env::var("RECIPIENT_EMAIL").unwrap_or_else(|_| config.imap.username.clone())
}
