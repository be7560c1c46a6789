//! Conversation transcript parsing and import.
//!
//! Transcripts are `.txt` files of `Key: value` lines emitted by the
//! telephony platform. AgentName, PhoneNumber, CallId and StartDate are
//! required; all rate and count fields are optional and stored as NULL
//! when absent or unparsable.

use std::path::Path;
use std::sync::OnceLock;

use chrono::{FixedOffset, NaiveDateTime, TimeZone, Utc};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use thiserror::Error;

use super::{scan_artifacts, ImportSummary, TRANSCRIPT_SUFFIX};
use crate::models::Call;
use crate::repository::DbContext;

/// Transcript timestamps are local Turkey time (fixed UTC+3 since 2016).
const TURKEY_UTC_OFFSET_SECS: i32 = 3 * 3600;

/// Reasons a transcript cannot yield a call row.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("missing required field {0}")]
    MissingField(&'static str),

    #[error("could not parse StartDate '{0}'")]
    BadStartDate(String),
}

struct TranscriptPatterns {
    agent_name: Regex,
    phone_number: Regex,
    call_id: Regex,
    start_date: Regex,
    duration: Regex,
    agent_speech_rate: Regex,
    customer_speech_rate: Regex,
    silence_rate: Regex,
    cross_talk_rate: Regex,
    agent_interrupt_count: Regex,
}

fn patterns() -> &'static TranscriptPatterns {
    static PATTERNS: OnceLock<TranscriptPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let line = |key: &str, capture: &str| {
            Regex::new(&format!(r"(?m)^{}:\s*{}", key, capture)).expect("valid pattern")
        };
        TranscriptPatterns {
            agent_name: line("AgentName", r"(.+)"),
            phone_number: line("PhoneNumber", r"(.+)"),
            call_id: line("CallId", r"(.+)"),
            start_date: line("StartDate", r"(.+)"),
            duration: line("Duration", r"([\d.]+)"),
            agent_speech_rate: line("Agent Speech Rate", r"%?([\d.]+)"),
            customer_speech_rate: line("Customer Speech Rate", r"%?([\d.]+)"),
            silence_rate: line("Silence Rate", r"%?([\d.]+)"),
            cross_talk_rate: line("Cross Talk Rate", r"%?([\d.]+)"),
            agent_interrupt_count: line("Agent Interrupt Count", r"(\d+)"),
        }
    })
}

fn capture<'a>(re: &Regex, content: &'a str) -> Option<&'a str> {
    re.captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

/// Strip a single leading zero from a phone number.
fn strip_leading_zero(phone: &str) -> &str {
    phone.strip_prefix('0').unwrap_or(phone)
}

/// Parse one transcript into a call row.
pub fn parse_transcript(content: &str) -> Result<Call, TranscriptError> {
    let p = patterns();

    let agent_name = capture(&p.agent_name, content)
        .ok_or(TranscriptError::MissingField("AgentName"))?
        .to_string();

    let phone_number = capture(&p.phone_number, content)
        .map(strip_leading_zero)
        .ok_or(TranscriptError::MissingField("PhoneNumber"))?
        .to_string();

    let call_id = capture(&p.call_id, content)
        .ok_or(TranscriptError::MissingField("CallId"))?
        .to_string();

    let start_date = capture(&p.start_date, content)
        .ok_or(TranscriptError::MissingField("StartDate"))?;
    // Format: 24.07.2025 23:03:10, local Turkey time
    let naive = NaiveDateTime::parse_from_str(start_date, "%d.%m.%Y %H:%M:%S")
        .map_err(|_| TranscriptError::BadStartDate(start_date.to_string()))?;
    let offset = FixedOffset::east_opt(TURKEY_UTC_OFFSET_SECS).expect("valid fixed offset");
    let created_at = offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| TranscriptError::BadStartDate(start_date.to_string()))?
        .with_timezone(&Utc);

    let parse_f64 = |re: &Regex| capture(re, content).and_then(|s| s.parse::<f64>().ok());

    Ok(Call {
        call_id,
        agent_name,
        phone_number,
        duration: parse_f64(&p.duration),
        agent_speech_rate: parse_f64(&p.agent_speech_rate),
        customer_speech_rate: parse_f64(&p.customer_speech_rate),
        silence_rate: parse_f64(&p.silence_rate),
        cross_talk_rate: parse_f64(&p.cross_talk_rate),
        agent_interrupt_count: capture(&p.agent_interrupt_count, content)
            .and_then(|s| s.parse::<i32>().ok()),
        created_at,
    })
}

/// Import conversation transcripts from `<root>/<date-bucket>/*.txt`.
///
/// Re-imports are safe to repeat verbatim: each call row is inserted or
/// replaced in full, keyed by call id.
pub async fn import_conversations(
    ctx: &DbContext,
    root: &Path,
) -> anyhow::Result<ImportSummary> {
    let repo = ctx.calls();
    let files = scan_artifacts(root, TRANSCRIPT_SUFFIX)?;

    if files.is_empty() {
        println!("{} No conversation files found", style("!").yellow());
        return Ok(ImportSummary::default());
    }
    println!(
        "{} Found {} conversation files",
        style("→").cyan(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("valid template"),
    );

    let mut summary = ImportSummary::default();
    for path in &files {
        pb.inc(1);
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        pb.set_message(name.to_string());

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                summary.failed += 1;
                continue;
            }
        };

        let item = match parse_transcript(&content) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", name, e);
                summary.failed += 1;
                continue;
            }
        };

        match repo.save(&item).await {
            Ok(()) => summary.imported += 1,
            Err(e) => {
                tracing::warn!("Failed to import call {}: {}", item.call_id, e);
                summary.failed += 1;
            }
        }
    }
    pb.finish_and_clear();

    summary.report("conversations");
    Ok(summary)
}
