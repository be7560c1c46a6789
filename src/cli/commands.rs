//! CLI command implementations.

use std::path::Path;

use console::style;

use crate::config::Settings;
use crate::ingest;
use crate::repository::DbContext;

/// Initialize the database schema.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    println!(
        "{} Initializing database at {}",
        style("→").cyan(),
        settings.database_url
    );

    let ctx = settings.create_db_context();
    match ctx.init_schema().await {
        Ok(()) => {
            println!("  {} Database ready", style("✓").green());
            Ok(())
        }
        Err(e) => {
            eprintln!("  {} Schema setup failed: {}", style("✗").red(), e);
            Err(anyhow::anyhow!("database initialization failed: {}", e))
        }
    }
}

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind)?;

    // Make sure the schema exists before accepting requests
    let ctx = settings.create_db_context();
    if let Err(e) = ctx.init_schema().await {
        eprintln!("  {} Schema setup failed: {}", style("✗").red(), e);
        return Err(anyhow::anyhow!("database initialization failed: {}", e));
    }

    println!(
        "{} Starting Callsight server at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &host, port).await
}

/// Open the database for a batch import.
///
/// Schema setup doubles as the connectivity check: a database that
/// cannot be reached fails here, before any file is touched.
async fn open_for_import(settings: &Settings) -> anyhow::Result<DbContext> {
    let ctx = settings.create_db_context();
    ctx.init_schema()
        .await
        .map_err(|e| anyhow::anyhow!("database connection failed: {}", e))?;
    Ok(ctx)
}

/// Import conversation transcripts.
pub async fn cmd_import_conversations(settings: &Settings, dir: &Path) -> anyhow::Result<()> {
    let ctx = open_for_import(settings).await?;
    ingest::import_conversations(&ctx, dir).await?;
    Ok(())
}

/// Import base analysis results.
pub async fn cmd_import_base_results(settings: &Settings, dir: &Path) -> anyhow::Result<()> {
    let ctx = open_for_import(settings).await?;
    ingest::import_base_results(&ctx, dir).await?;
    Ok(())
}

/// Import issue analysis results.
pub async fn cmd_import_issue_results(settings: &Settings, dir: &Path) -> anyhow::Result<()> {
    let ctx = open_for_import(settings).await?;
    ingest::import_issue_results(&ctx, dir).await?;
    Ok(())
}

/// Run the organization metadata fill-in pass.
pub async fn cmd_import_org_metadata(settings: &Settings, dir: &Path) -> anyhow::Result<()> {
    let ctx = open_for_import(settings).await?;
    ingest::import_org_metadata(&ctx, dir).await?;
    Ok(())
}

/// Parse a bind address that can be:
/// - Just a port: "8002" -> 127.0.0.1:8002
/// - Just a host: "0.0.0.0" -> 0.0.0.0:8002
/// - Host and port: "0.0.0.0:8002" -> 0.0.0.0:8002
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    // Try parsing as just a port number
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    // Try parsing as host:port
    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
    }

    // Must be just a host, use default port
    Ok((bind.to_string(), 8002))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bind_address() {
        assert_eq!(
            parse_bind_address("8002").unwrap(),
            ("127.0.0.1".to_string(), 8002)
        );
        assert_eq!(
            parse_bind_address("0.0.0.0").unwrap(),
            ("0.0.0.0".to_string(), 8002)
        );
        assert_eq!(
            parse_bind_address("0.0.0.0:9000").unwrap(),
            ("0.0.0.0".to_string(), 9000)
        );
    }
}
