use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use console::style;
use uuid::Uuid;

use mnemo_config::MnemoConfig;
use mnemo_core::{MemoryUnit, MnemoError, Result};
use mnemo_llm::{EmbeddingProvider, HashEmbedding, parse_extraction_response, provider_from_config};
use mnemo_memory::EpisodicEvent;
use mnemo_router::{MemoryRouter, RouteOutcome};

/// Open the router. Commands that never embed skip building the configured
/// provider, so they work without an API key.
fn open_router(config: &MnemoConfig, needs_embeddings: bool) -> Result<MemoryRouter> {
    let embedder: Arc<dyn EmbeddingProvider> = if needs_embeddings {
        provider_from_config(&config.embedding, config.memory.embedding_dims)?
    } else {
        Arc::new(HashEmbedding::new(config.memory.embedding_dims))
    };
    MemoryRouter::from_config(config, embedder)
}

fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => Ok(std::fs::read_to_string(&path)?),
        _ => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

pub(super) async fn cmd_ingest(
    config: &MnemoConfig,
    session: &str,
    file: Option<PathBuf>,
    message: Option<String>,
    json: bool,
) -> Result<()> {
    let raw = read_input(file)?;
    let candidates = parse_extraction_response(&raw, session);
    if candidates.is_empty() {
        return Err(MnemoError::Extraction(
            "no valid memory units found in input".into(),
        ));
    }

    let router = open_router(config, true)?;
    let outcome = router.route_and_store(session, candidates.clone()).await?;

    let view = match message.as_deref() {
        Some(msg) => {
            let retrieved = router.retrieve_context(session, Some(msg)).await?;
            Some(router.compose(session, msg, retrieved))
        }
        None => None,
    };

    if json {
        let mut out = serde_json::json!({ "outcome": outcome });
        if let Some(view) = &view {
            out["context"] = serde_json::to_value(view)?;
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_outcome(&candidates, &outcome);
    if let Some(view) = view {
        println!();
        println!(
            "{} ({} memories)",
            style("Context").bold(),
            view.summary.total_memories
        );
        print_section("working", &view.working);
        print_section("episodic", &view.episodic);
        print_section("semantic", &view.semantic);
    }
    Ok(())
}

fn print_outcome(candidates: &[MemoryUnit], outcome: &RouteOutcome) {
    for (unit, decision) in candidates.iter().zip(&outcome.decisions) {
        let target = match decision.target_store.filter(|_| decision.should_store) {
            Some(tier) => style(tier.to_string()).green(),
            None => style("rejected".to_string()).red(),
        };
        println!(
            "{:<9} {:<10} {}  {}",
            target,
            unit.kind.as_str(),
            style(unit.id).dim(),
            truncate(&unit.content, 60)
        );
        println!("          {}", style(&decision.reason).dim());
        for id in &decision.deprecate_existing {
            println!("          supersedes {id}");
        }
    }
    for warning in &outcome.warnings {
        println!("{} {warning}", style("!").yellow());
    }
    println!(
        "{} stored, {} rejected{}",
        outcome.stored.len(),
        outcome.rejected.len(),
        if outcome.needs_summary {
            "; working memory is over its token budget"
        } else {
            ""
        }
    );
}

fn print_section(name: &str, units: &[MemoryUnit]) {
    if units.is_empty() {
        return;
    }
    println!("  {}", style(name).cyan());
    for unit in units {
        println!(
            "    [{}] {} ({:.2})",
            unit.kind,
            truncate(&unit.content, 70),
            unit.confidence
        );
    }
}

pub(super) async fn cmd_stats(config: &MnemoConfig, session: &str, json: bool) -> Result<()> {
    let router = open_router(config, false)?;
    let stats = router.get_stats(session)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    println!("{} {}", style("Session").bold(), stats.session_id);
    println!("  working:  {}", stats.working_count);
    println!("  episodic: {}", stats.episodic_count);
    println!("  semantic: {} (all sessions)", stats.semantic_count_global);
    Ok(())
}

pub(super) async fn cmd_timeline(
    config: &MnemoConfig,
    session: &str,
    limit: Option<usize>,
) -> Result<()> {
    let router = open_router(config, false)?;
    let events = match limit {
        Some(n) => router.store().episodic.timeline_tail(session, n)?,
        None => router.store().episodic.timeline(session)?,
    };
    print_events(&events);
    Ok(())
}

pub(super) async fn cmd_recent(config: &MnemoConfig, limit: usize) -> Result<()> {
    let router = open_router(config, false)?;
    print_events(&router.store().episodic.recent(limit)?);
    Ok(())
}

fn print_events(events: &[EpisodicEvent]) {
    if events.is_empty() {
        println!("No episodic events.");
        return;
    }
    for event in events {
        println!(
            "{:>6}  {}  {:<10} {:<8} {}",
            style(event.sequence_number).dim(),
            event.unit.created_at.format("%Y-%m-%d %H:%M:%S"),
            event.event_type.as_str(),
            event.unit.source_session,
            truncate(&event.unit.content, 70)
        );
    }
}

pub(super) async fn cmd_search(
    config: &MnemoConfig,
    query: &str,
    top_k: usize,
    min_confidence: Option<f64>,
) -> Result<()> {
    let router = open_router(config, true)?;
    let min_confidence = min_confidence.unwrap_or(config.retrieval.min_confidence);
    let hits = router.search_by_text(query, top_k, min_confidence).await?;
    if hits.is_empty() {
        println!("No matching memories.");
        return Ok(());
    }
    for (unit, score) in hits {
        println!(
            "{:.3}  {:<10} {:<8} {:.2}  {}",
            score,
            unit.kind.as_str(),
            unit.scope.as_str(),
            unit.confidence,
            truncate(&unit.content, 60)
        );
        println!("       {}", style(unit.id).dim());
    }
    Ok(())
}

pub(super) async fn cmd_deprecate(config: &MnemoConfig, id: Uuid) -> Result<()> {
    let router = open_router(config, false)?;
    router.deprecate(id)?;
    println!("{} deprecated {id}", style("✓").green());
    Ok(())
}

pub(super) async fn cmd_reinforce(config: &MnemoConfig, id: Uuid, boost: f64) -> Result<()> {
    let router = open_router(config, false)?;
    let confidence = router.reinforce(id, boost)?;
    println!(
        "{} reinforced {id}, confidence now {confidence:.2}",
        style("✓").green()
    );
    Ok(())
}

/// Truncate to `max` characters, appending "..." if truncated.
fn truncate(s: &str, max: usize) -> String {
    let flat = s.replace('\n', " ");
    if flat.chars().count() <= max {
        flat
    } else {
        let cut: String = flat.chars().take(max).collect();
        format!("{cut}...")
    }
}
