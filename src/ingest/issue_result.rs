//! Issue analysis result converter.
//!
//! Only calls whose insights carry a non-null `issue_sub_category` get a
//! row here; the table is a sparse, optional child of
//! `base_analysis_result`. The converter checks that the base row exists
//! before inserting, so issues are never orphaned.

use std::path::Path;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use super::artifact::{read_insights, Insights};
use super::{call_id_from_filename, scan_artifacts, ImportSummary, ANALYSIS_SUFFIX};
use crate::models::IssueAnalysisResult;
use crate::repository::DbContext;

/// Extract and validate the issue fields of an insights object.
///
/// Returns `Ok(None)` for non-issue calls (null sentinel) and `Err` for
/// issue payloads that fail validation.
fn issue_from_insights(call_id: &str, insights: &Insights) -> Result<Option<IssueAnalysisResult>, String> {
    let sub_category = match &insights.issue_sub_category {
        Some(s) if !s.is_empty() => s.clone(),
        Some(_) => return Err("empty issue_sub_category".to_string()),
        None => return Ok(None),
    };

    let sub_issue_type = insights
        .sub_issue_type
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or("missing sub_issue_type")?;

    let urgency_level = insights
        .urgency_level
        .clone()
        .filter(|s| !s.is_empty())
        .ok_or("missing urgency_level")?;

    // churn_risk must be an integer in [0,10]; absent counts as 0
    let churn_risk = match &insights.churn_risk {
        None => 0,
        Some(value) => match value.as_i64() {
            Some(c) if (0..=10).contains(&c) => c as i32,
            _ => return Err(format!("invalid churn_risk value: {}", value)),
        },
    };

    Ok(Some(IssueAnalysisResult {
        call_id: call_id.to_string(),
        sub_category,
        sub_issue_type,
        churn_risk,
        urgency_level,
        related_with_previous_call: insights.related_with_previous_call,
        related_detail: insights
            .related_with_previous_call_detail
            .clone()
            .unwrap_or_default(),
    }))
}

/// Import issue analysis results from `<root>/<date-bucket>/*_analysis.json`.
pub async fn import_issue_results(ctx: &DbContext, root: &Path) -> anyhow::Result<ImportSummary> {
    let base_repo = ctx.base_results();
    let issue_repo = ctx.issue_results();
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

        let insights = match read_insights(path) {
            Ok(i) => i,
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", name, e);
                summary.failed += 1;
                continue;
            }
        };

        let item = match issue_from_insights(&call_id, &insights) {
            Ok(Some(item)) => item,
            Ok(None) => {
                tracing::info!("Non-issue call in {}, skipping", name);
                summary.skipped += 1;
                continue;
            }
            Err(reason) => {
                tracing::warn!("Invalid issue payload in {}: {}", name, reason);
                summary.failed += 1;
                continue;
            }
        };

        match issue_repo.exists(&call_id).await {
            Ok(true) => {
                tracing::info!("Issue analysis already exists for {}, skipping", call_id);
                summary.skipped += 1;
                continue;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!("Lookup failed for {}: {}", call_id, e);
                summary.failed += 1;
                continue;
            }
        }

        // Issues always attach to a base analysis, never orphaned
        match base_repo.exists(&call_id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("Base analysis not found for {}, skipping issue", call_id);
                summary.skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!("Base lookup failed for {}: {}", call_id, e);
                summary.failed += 1;
                continue;
            }
        }

        match issue_repo.insert(&item).await {
            Ok(()) => summary.imported += 1,
            Err(e) => {
                tracing::warn!("Failed to insert issue analysis for {}: {}", call_id, e);
                summary.failed += 1;
            }
        }
    }
    pb.finish_and_clear();

    summary.report("issue analysis results");
    Ok(summary)
}
