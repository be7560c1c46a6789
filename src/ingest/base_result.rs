//! Base analysis result converter.
//!
//! Reads `*_analysis.json` artifacts and inserts one
//! `base_analysis_result` row per call. Existing rows are skipped, never
//! overwritten.

use std::path::Path;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use super::artifact::read_insights;
use super::{call_id_from_filename, scan_artifacts, ImportSummary, ANALYSIS_SUFFIX};
use crate::models::BaseAnalysisResult;
use crate::repository::DbContext;

/// Import base analysis results from `<root>/<date-bucket>/*_analysis.json`.
pub async fn import_base_results(ctx: &DbContext, root: &Path) -> anyhow::Result<ImportSummary> {
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

        let insights = match read_insights(path) {
            Ok(i) => i,
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", name, e);
                summary.failed += 1;
                continue;
            }
        };

        if insights.call_reason.is_empty() || insights.call_reason_detail.is_empty() {
            tracing::warn!("Missing call reason fields in {}", name);
            summary.failed += 1;
            continue;
        }

        match repo.exists(&call_id).await {
            Ok(true) => {
                tracing::info!("Base analysis already exists for {}, skipping", call_id);
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

        let item = BaseAnalysisResult {
            call_id: call_id.clone(),
            call_reason: insights.call_reason,
            call_reason_detail: insights.call_reason_detail,
            follow_up_required: insights.is_follow_up_required,
            organization_metadata: None,
        };

        match repo.insert(&item).await {
            Ok(()) => summary.imported += 1,
            Err(e) => {
                tracing::warn!("Failed to insert base analysis for {}: {}", call_id, e);
                summary.failed += 1;
            }
        }
    }
    pb.finish_and_clear();

    summary.report("base analysis results");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::setup_test_db;
    use crate::repository::DbContext;

    const CALL_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

    async fn seed_call(ctx: &DbContext, call_id: &str) {
        use crate::models::Call;
        ctx.calls()
            .save(&Call {
                call_id: call_id.to_string(),
                agent_name: "alice".to_string(),
                phone_number: "5551234567".to_string(),
                duration: None,
                agent_speech_rate: None,
                customer_speech_rate: None,
                silence_rate: None,
                cross_talk_rate: None,
                agent_interrupt_count: None,
                created_at: chrono::Utc::now(),
            })
            .await
            .unwrap();
    }

    fn artifact_tree(files: &[(&str, &str)]) -> tempfile::TempDir {
        let tree = tempfile::tempdir().unwrap();
        let bucket = tree.path().join("2025-01-01");
        std::fs::create_dir(&bucket).unwrap();
        for (name, content) in files {
            std::fs::write(bucket.join(name), content).unwrap();
        }
        tree
    }

    #[tokio::test]
    async fn test_example_artifact_creates_base_row() {
        let (ctx, _dir) = setup_test_db().await;
        seed_call(&ctx, CALL_ID).await;

        let tree = artifact_tree(&[(
            &format!("alice_alice_queue_5551234_20250101_{}_analysis.json", CALL_ID),
            r#"[{"insights": {"call_reason": "billing", "call_reason_detail": "overcharge",
                "is_follow_up_required": true}}]"#,
        )]);

        let summary = import_base_results(&ctx, tree.path()).await.unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.failed, 0);

        let row = ctx.base_results().get(CALL_ID).await.unwrap().unwrap();
        assert_eq!(row.call_reason, "billing");
        assert!(row.follow_up_required);
    }

    #[tokio::test]
    async fn test_idempotent_rerun_skips_existing() {
        let (ctx, _dir) = setup_test_db().await;
        seed_call(&ctx, CALL_ID).await;

        let tree = artifact_tree(&[(
            &format!("agent_{}_analysis.json", CALL_ID),
            r#"[{"insights": {"call_reason": "billing", "call_reason_detail": "overcharge"}}]"#,
        )]);

        let first = import_base_results(&ctx, tree.path()).await.unwrap();
        assert_eq!(first.imported, 1);

        let second = import_base_results(&ctx, tree.path()).await.unwrap();
        assert_eq!(second.imported, 0);
        assert_eq!(second.skipped, 1);
        assert_eq!(ctx.base_results().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bad_files_never_abort_the_batch() {
        let (ctx, _dir) = setup_test_db().await;
        seed_call(&ctx, CALL_ID).await;

        let tree = artifact_tree(&[
            // No UUID in the filename
            ("mystery_analysis.json", "[]"),
            // Not an array
            (
                &format!("a_{}_analysis.json", "aaaaaaaa-0000-0000-0000-000000000000"),
                r#"{"insights": {}}"#,
            ),
            // Missing required reason fields
            (
                &format!("b_{}_analysis.json", "bbbbbbbb-0000-0000-0000-000000000000"),
                r#"[{"insights": {"call_reason": ""}}]"#,
            ),
            // Valid
            (
                &format!("c_{}_analysis.json", CALL_ID),
                r#"[{"insights": {"call_reason": "support", "call_reason_detail": "pos"}}]"#,
            ),
        ]);

        let summary = import_base_results(&ctx, tree.path()).await.unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(summary.failed, 3);
    }
}
