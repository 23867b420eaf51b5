use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence; otherwise the crate logs at `info`, or
/// `debug` when `verbose` is set.
pub fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "pricefx=debug" } else { "pricefx=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A subscriber may already be installed (tests, embedding apps)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Appends raw and converted responses to a transcript file.
pub struct TranscriptLog {
    file_path: Option<String>,
}

impl TranscriptLog {
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        if let Some(path) = &log_file {
            Self::test_file_access(path)?;
        }
        Ok(TranscriptLog {
            file_path: log_file,
        })
    }

    pub fn is_active(&self) -> bool {
        self.file_path.is_some()
    }

    /// Record one response before and after conversion.
    pub fn log_exchange(
        &self,
        agent: Option<&str>,
        raw: &str,
        converted: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Some(file_path) = &self.file_path else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "## {} ({})",
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            agent.unwrap_or("no agent")
        )?;
        for line in raw.lines() {
            writeln!(writer, "< {line}")?;
        }
        for line in converted.lines() {
            writeln!(writer, "> {line}")?;
        }
        // Blank line between exchanges
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }

    pub fn get_status_string(&self) -> String {
        match &self.file_path {
            None => "disabled".to_string(),
            Some(path) => format!(
                "active ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
        }
    }

    fn test_file_access(path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.flush()?;
        Ok(())
    }
}
