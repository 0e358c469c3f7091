use colored::Colorize;
use linkstash_client::ReadinessHandshake;
use linkstash_runtime::{Background, TabContext};
use linkstash_server::LinkstashServer;
use linkstash_store::LinkStore;
use linkstash_types::{now_millis, CapturedLink, LinkRecord};
use serde_json::json;
use tracing::debug;

use crate::cli::*;
use crate::config::StashConfig;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = StashConfig::load(&cli.config)?;
    if let Some(path) = cli.store {
        config.store.path = path;
    }
    debug!(
        config = %cli.config.display(),
        store = %config.store.path.display(),
        "configuration loaded"
    );
    let output = execute(cli.command, cli.format, &config).await?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Run one command against a freshly launched background context and
/// return what should be printed.
pub async fn execute(
    command: Command,
    format: OutputFormat,
    config: &StashConfig,
) -> anyhow::Result<String> {
    let background = Background::launch(
        LinkStore::on_disk(config.store.clone()),
        config.runtime(),
    );
    let tab = background.connect_tab();
    let result = match command {
        Command::Add(args) => cmd_add(&tab, config, args, format).await,
        Command::List(args) => cmd_list(&background, &tab, config, args, format).await,
        Command::Clear => cmd_clear(&tab, config, format).await,
        Command::Ping => cmd_ping(&tab, config, format).await,
        Command::Serve(args) => cmd_serve(&background, config, args).await,
    };
    drop(tab);
    background.shutdown().await?;
    result
}

/// Block until the gateway reports a ready store. Returns the probe count.
async fn handshake(tab: &TabContext, config: &StashConfig) -> anyhow::Result<u32> {
    let mut handshake = ReadinessHandshake::new(tab.client(), config.handshake.policy());
    handshake.wait_until_ready().await?;
    Ok(handshake.attempts())
}

async fn cmd_add(
    tab: &TabContext,
    config: &StashConfig,
    args: AddArgs,
    format: OutputFormat,
) -> anyhow::Result<String> {
    handshake(tab, config).await?;
    let timestamp = args.timestamp.unwrap_or_else(now_millis);
    let link = CapturedLink::new(args.source, args.target, timestamp)?;
    tab.client().append(link.clone()).await?;
    Ok(match format {
        OutputFormat::Json => json!({"success": true, "link": link}).to_string(),
        OutputFormat::Text => format!(
            "{} Saved {} {} {}",
            "✓".green().bold(),
            link.source_url(),
            "→".cyan(),
            link.target_url().bold()
        ),
    })
}

async fn cmd_list(
    background: &Background,
    tab: &TabContext,
    config: &StashConfig,
    args: ListArgs,
    format: OutputFormat,
) -> anyhow::Result<String> {
    handshake(tab, config).await?;
    let mut links = match (args.source, args.target) {
        (Some(source), _) => background.store().find_by_source(&source).await?,
        (None, Some(target)) => background.store().find_by_target(&target).await?,
        (None, None) => tab.client().list_all().await?,
    };
    if let Some(limit) = args.limit {
        links.truncate(limit);
    }
    render_links(&links, format)
}

async fn cmd_clear(
    tab: &TabContext,
    config: &StashConfig,
    format: OutputFormat,
) -> anyhow::Result<String> {
    handshake(tab, config).await?;
    tab.client().clear_all().await?;
    Ok(match format {
        OutputFormat::Json => json!({"success": true}).to_string(),
        OutputFormat::Text => format!("{} Cleared all links", "✓".green().bold()),
    })
}

async fn cmd_ping(
    tab: &TabContext,
    config: &StashConfig,
    format: OutputFormat,
) -> anyhow::Result<String> {
    let attempts = handshake(tab, config).await?;
    Ok(match format {
        OutputFormat::Json => json!({"success": true, "ready": true, "attempts": attempts}).to_string(),
        OutputFormat::Text => format!(
            "{} Store ready after {} probe(s)",
            "✓".green().bold(),
            attempts.to_string().bold()
        ),
    })
}

async fn cmd_serve(
    background: &Background,
    config: &StashConfig,
    args: ServeArgs,
) -> anyhow::Result<String> {
    let mut server = config.server.clone();
    if let Some(bind) = args.bind {
        server.bind_addr = bind;
    }
    println!(
        "linkstash serving on {} (store: {})",
        server.bind_addr.to_string().bold(),
        config.store.path.display()
    );
    LinkstashServer::new(server, background.gateway().clone())
        .serve(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok("Server stopped.".into())
}

fn render_links(links: &[LinkRecord], format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(&json!({
            "count": links.len(),
            "links": links,
        }))?);
    }
    let mut out = String::new();
    for record in links {
        out.push_str(&format!(
            "{}  {} {} {}\n    {}\n",
            record.created_at().dimmed(),
            record.source_url(),
            "→".cyan(),
            record.target_url().bold(),
            record.id().as_str().yellow()
        ));
    }
    let noun = if links.len() == 1 { "link" } else { "links" };
    out.push_str(&format!("{} {noun} stored", links.len()));
    Ok(out)
}
