// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Inquest CLI: run, resume and inspect investigations.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquest::application::{InvestigationPipeline, RunOutcome, RunResult};
use inquest::infrastructure::composition::{build_checkpoint_store, build_context};
use inquest::infrastructure::config::EngineConfig;
use inquest::infrastructure::logging;
use inquest::infrastructure::repositories::{FileInvestigationStore, SqliteLedger};
use inquest_bootstrap::shutdown::ShutdownCoordinator;
use inquest_domain::repositories::{GraphStore, InvestigationRepository};
use inquest_domain::services::capabilities::{
    EmbeddingProvider, NamedEntityRecognizer, NarrativeGenerator, StegoReader,
};
use inquest_domain::value_objects::InvestigationId;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

#[derive(Parser)]
#[command(name = "inquest")]
#[command(about = "Inquest - investigation intelligence engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an investigation over a documents directory
    Investigate {
        /// Directory containing the documents to analyze
        #[arg(short, long)]
        docs: Option<PathBuf>,

        /// Resume a previously interrupted run by thread id
        #[arg(short, long)]
        resume: Option<String>,

        /// Emit activity events for every stage
        #[arg(long, default_value_t = true)]
        monitored: bool,
    },

    /// Check engine health: directories, ledger, capabilities
    Health,

    /// Remove every node and edge from the graph store
    ClearGraph {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let config = match EngineConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };
    let log_level = if cli.verbose { "debug" } else { &config.log_level };
    logging::init(log_level);

    let result = match cli.command {
        Commands::Investigate {
            docs,
            resume,
            monitored,
        } => investigate(config, docs, resume, monitored).await,
        Commands::Health => health(config).await,
        Commands::ClearGraph { yes } => clear_graph(config, yes).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Failed: {:#}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

async fn investigate(
    config: EngineConfig,
    docs: Option<PathBuf>,
    resume: Option<String>,
    monitored: bool,
) -> Result<()> {
    let docs_dir = docs.unwrap_or_else(|| config.uploads_dir.clone());
    if resume.is_none() && !docs_dir.is_dir() {
        anyhow::bail!("documents directory not found: {}", docs_dir.display());
    }

    let config = Arc::new(config);
    let ctx = Arc::new(build_context(Arc::clone(&config)).await?);
    let checkpoints = build_checkpoint_store(&config);

    let shutdown = ShutdownCoordinator::default();
    shutdown.listen_for_ctrl_c();

    let pipeline = InvestigationPipeline::new(
        Arc::clone(&ctx),
        checkpoints,
        monitored,
        shutdown.token(),
    );

    let result = match resume {
        Some(thread_id) => {
            println!("Resuming thread: {}", thread_id);
            pipeline.resume(&thread_id).await?
        }
        None => {
            println!("Documents: {}", docs_dir.display());
            pipeline
                .run(Some(docs_dir.display().to_string()), None)
                .await?
        }
    };

    persist_investigation(&config, &result).await?;
    print_summary(&result);

    match result.outcome {
        RunOutcome::Interrupted => {
            println!(
                "\nInterrupted before the compliance gate. Resume with:\n  inquest investigate --resume {}",
                result.thread_id
            );
            Ok(())
        }
        RunOutcome::Cancelled => anyhow::bail!("investigation cancelled"),
        _ => Ok(()),
    }
}

/// Writes the investigation record (meta + full state) after a run.
async fn persist_investigation(config: &EngineConfig, result: &RunResult) -> Result<()> {
    let store = FileInvestigationStore::new(config.investigations_dir.clone());
    let id = InvestigationId::from_string(result.thread_id.clone());
    if store.meta(&id).await?.is_none() {
        store.create(&id, None).await?;
    }
    let mut state = result.state.clone();
    store
        .save_state(&id, &mut state)
        .await
        .context("persisting investigation state")?;
    Ok(())
}

fn print_summary(result: &RunResult) {
    let state = &result.state;
    println!("\nDocuments");
    println!("  Processed: {}", state.documents.len());

    println!("\nEntities");
    println!("  Total: {}", state.entities.len());
    let mut by_type: BTreeMap<String, usize> = BTreeMap::new();
    for entity in state.entities.values() {
        *by_type.entry(entity.entity_type.to_string()).or_insert(0) += 1;
    }
    for (entity_type, count) in &by_type {
        println!("    {:<10} {}", entity_type, count);
    }

    println!("\nRelationships: {}", state.relationships.len());
    println!(
        "Knowledge graph: {} nodes, {} edges",
        state.graph_metadata.node_count, state.graph_metadata.edge_count
    );
    println!("Timeline events: {}", state.timeline.len());
    println!("Semantic links: {}", state.semantic_links.len());
    println!("Hypotheses: {}", state.hypotheses.len());
    if !state.error_log.is_empty() {
        println!("Errors logged: {}", state.error_log.len());
    }
    if let Some(status) = state.compliance_report.overall_status {
        println!("\nCompliance: {}", status);
        for recommendation in &state.compliance_report.recommendations {
            println!("  - {}", recommendation);
        }
    }
    println!("Outcome: {}", result.outcome.as_str());
}

async fn health(config: EngineConfig) -> Result<()> {
    println!("Inquest health check\n");
    let mut ok = true;

    config.ensure_directories()?;
    for dir in [&config.uploads_dir, &config.reports_dir, &config.knowledge_base_dir] {
        if dir.is_dir() {
            println!("  dir {:<40} OK", dir.display().to_string());
        } else {
            println!("  dir {:<40} MISSING", dir.display().to_string());
            ok = false;
        }
    }

    match SqliteLedger::from_file(&config.ledger_db_path).await {
        Ok(_) => println!("  ledger {:<37} OK", config.ledger_db_path.display().to_string()),
        Err(e) => {
            println!("  ledger {:<37} FAILED ({})", config.ledger_db_path.display().to_string(), e);
            ok = false;
        }
    }

    let ctx = build_context(Arc::new(config)).await?;
    println!(
        "  embeddings {:<33} {}",
        "(local feature hashing)",
        if ctx.embeddings.probe() { "OK" } else { "absent" }
    );
    println!(
        "  ner {:<40} {}",
        "(rule-based)",
        if ctx.ner.probe() { "OK" } else { "absent" }
    );
    println!(
        "  narrative {:<34} {}",
        "(LLM)",
        if ctx.narrative.probe() { "OK" } else { "absent (degraded)" }
    );
    println!(
        "  stego {:<38} {}",
        "(LSB reader)",
        if ctx.stego.probe() { "OK" } else { "absent (degraded)" }
    );

    if ok {
        println!("\nAll systems operational.");
        Ok(())
    } else {
        anyhow::bail!("some checks failed")
    }
}

async fn clear_graph(config: EngineConfig, yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("refusing to clear the graph store without --yes");
    }
    let ctx = build_context(Arc::new(config)).await?;
    ctx.graph.connect().await?;
    ctx.graph.clear().await?;
    ctx.graph.close().await?;
    println!("Graph cleared.");
    Ok(())
}
