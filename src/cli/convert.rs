//! `pricefx convert`: post-process one response.

use std::error::Error;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::core::config::Config;
use crate::core::session::PriceSession;
use crate::utils::logging::TranscriptLog;

pub async fn run_convert(
    session: &mut PriceSession,
    config: &Config,
    file: Option<String>,
    agent: &str,
    log_file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let transcript = TranscriptLog::new(log_file)?;
    let raw = read_input(file.as_deref()).await?;
    if raw.trim().is_empty() {
        eprintln!("Usage: pricefx convert [FILE]  (or pipe a response on stdin)");
        std::process::exit(1);
    }

    session.start(config.refresh_interval()).await;
    debug!(status = %session.status_line(), transcript = %transcript.get_status_string());

    let converted = session.postprocess(Some(agent), &raw);
    println!("{converted}");

    transcript.log_exchange(Some(agent), &raw, &converted)?;
    Ok(())
}

async fn read_input(file: Option<&str>) -> Result<String, Box<dyn Error>> {
    match file {
        Some(path) if path != "-" => Ok(tokio::fs::read_to_string(path).await?),
        _ => {
            let mut raw = String::new();
            tokio::io::stdin().read_to_string(&mut raw).await?;
            Ok(raw)
        }
    }
}
