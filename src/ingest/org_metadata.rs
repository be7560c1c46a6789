//! Organization metadata fill-in pass.
//!
//! Artifacts carry a semi-structured `key='value'` string like
//! `org_id=301271899 org_tel='5302392138' marka='NUR TİCARET'
//! sektor='Elektrik - Elektronik' sirket_tipi='Şahıs' devices=[] ...`.
//! Each field is captured independently; a failed capture yields an
//! empty string, and the file is skipped only when every capture comes
//! back empty. The extracted object is written into
//! `base_analysis_result.organization_metadata` exactly once.

use std::path::Path;
use std::sync::OnceLock;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;

use super::artifact::read_artifact;
use super::{call_id_from_filename, scan_artifacts, ImportSummary, ANALYSIS_SUFFIX};
use crate::models::OrganizationMetadata;
use crate::repository::DbContext;

struct MetadataPatterns {
    org_id: Regex,
    org_tel: Regex,
    marka: Regex,
    sektor: Regex,
    sirket_tipi: Regex,
}

fn patterns() -> &'static MetadataPatterns {
    static PATTERNS: OnceLock<MetadataPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| MetadataPatterns {
        org_id: Regex::new(r"org_id=(\d+)").expect("valid pattern"),
        org_tel: Regex::new(r"org_tel='([^']*)'").expect("valid pattern"),
        marka: Regex::new(r"marka='([^']*)'").expect("valid pattern"),
        sektor: Regex::new(r"sektor='([^']*)'").expect("valid pattern"),
        sirket_tipi: Regex::new(r"sirket_tipi='([^']*)'").expect("valid pattern"),
    })
}

fn capture(re: &Regex, raw: &str) -> String {
    re.captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Parse the raw metadata string into its structured form.
pub fn parse_org_metadata(raw: &str) -> OrganizationMetadata {
    let p = patterns();
    OrganizationMetadata {
        organization_id: capture(&p.org_id, raw),
        organization_name: capture(&p.marka, raw),
        organization_type: capture(&p.sirket_tipi, raw),
        organization_industry: capture(&p.sektor, raw),
        organization_phone: capture(&p.org_tel, raw),
    }
}

/// Fill in organization metadata from `<root>/<date-bucket>/*_analysis.json`.
///
/// Rows whose metadata column is already set are left untouched.
pub async fn import_org_metadata(ctx: &DbContext, root: &Path) -> anyhow::Result<ImportSummary> {
    let repo = ctx.base_results();
    let files = scan_artifacts(root, ANALYSIS_SUFFIX)?;

    if files.is_empty() {
        println!("{} No analysis artifacts found", style("!").yellow());
        return Ok(ImportSummary::default());
    }
    println!(
        "{} Found {} analysis artifacts",
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

        let call_id = match call_id_from_filename(&name) {
            Some(id) => id,
            None => {
                tracing::warn!("No call id in filename: {}", name);
                summary.failed += 1;
                continue;
            }
        };

        let entry = match read_artifact(path) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", name, e);
                summary.failed += 1;
                continue;
            }
        };

        let raw = match entry.organization_metadata.as_deref() {
            Some(raw) if !raw.is_empty() => raw.to_string(),
            _ => {
                tracing::info!("No organization metadata in {}, skipping", name);
                summary.skipped += 1;
                continue;
            }
        };

        let metadata = parse_org_metadata(&raw);
        if metadata.is_empty() {
            tracing::info!("No recognizable metadata fields in {}, skipping", name);
            summary.skipped += 1;
            continue;
        }

        match repo.metadata_is_empty(&call_id).await {
            Ok(None) => {
                tracing::warn!("Base analysis not found for {}, skipping", call_id);
                summary.skipped += 1;
                continue;
            }
            Ok(Some(false)) => {
                tracing::info!("Metadata already set for {}, skipping", call_id);
                summary.skipped += 1;
                continue;
            }
            Ok(Some(true)) => {}
            Err(e) => {
                tracing::warn!("Lookup failed for {}: {}", call_id, e);
                summary.failed += 1;
                continue;
            }
        }

        let json = match serde_json::to_string(&metadata) {
            Ok(j) => j,
            Err(e) => {
                tracing::warn!("Failed to encode metadata for {}: {}", call_id, e);
                summary.failed += 1;
                continue;
            }
        };

        match repo.set_organization_metadata(&call_id, &json).await {
            Ok(true) => summary.imported += 1,
            Ok(false) => summary.skipped += 1,
            Err(e) => {
                tracing::warn!("Failed to update metadata for {}: {}", call_id, e);
                summary.failed += 1;
            }
        }
    }
    pb.finish_and_clear();

    summary.report("organization metadata");
    Ok(summary)
}
