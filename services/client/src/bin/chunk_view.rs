//! services/client/src/bin/chunk_view.rs
//!
//! Terminal front end over the chunk views.
//!
//! Usage:
//!   chunk-view collections <user-id> [page]
//!   chunk-view chunk <chunk-id>
//!   chunk-view delete-chunk <chunk-id>

use chunk_view_core::{
    metadata, ChunkList, ChunkService, ChunkView, CollectionPager, DeferredActionCoordinator,
};
use client_lib::{adapters::HttpChunkAdapter, config::Config, error::ClientError};
use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Image links printed per chunk; the rest are summarised.
const MAX_LISTED_IMAGES: usize = 20;

const USAGE: &str = "usage: chunk-view collections <user-id> [page] | chunk <chunk-id> | delete-chunk <chunk-id>";

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!("Configuration loaded for dataset {}", config.dataset_id);

    // --- 2. Initialize the Service Adapter ---
    let service: Arc<dyn ChunkService> = Arc::new(HttpChunkAdapter::new(
        &config.api_base_url,
        config.api_key.clone(),
    )?);

    // --- 3. Dispatch the Command ---
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("collections") => {
            let user_id = parse_id(args.get(1))?;
            let page = match args.get(2) {
                Some(raw) => raw
                    .parse::<u64>()
                    .ok()
                    .filter(|page| *page >= 1)
                    .ok_or_else(|| ClientError::Usage(format!("invalid page '{}'", raw)))?,
                None => 1,
            };
            show_collections(&config, service, user_id, page).await
        }
        Some("chunk") => {
            let chunk_id = parse_id(args.get(1))?;
            show_chunk(&config, service.as_ref(), chunk_id).await
        }
        Some("delete-chunk") => {
            let chunk_id = parse_id(args.get(1))?;
            delete_chunk(&config, service, chunk_id).await
        }
        _ => Err(ClientError::Usage(USAGE.to_string())),
    }
}

fn parse_id(raw: Option<&String>) -> Result<Uuid, ClientError> {
    let raw = raw.ok_or_else(|| ClientError::Usage(USAGE.to_string()))?;
    Uuid::parse_str(raw).map_err(|e| ClientError::Usage(format!("invalid id '{}': {}", raw, e)))
}

async fn show_collections(
    config: &Config,
    service: Arc<dyn ChunkService>,
    user_id: Uuid,
    page: u64,
) -> Result<(), ClientError> {
    let pager = CollectionPager::new(service, config.dataset_id, user_id);
    ClientError::check_fetch(1, pager.refresh().await)?;

    // Walk forward one page at a time; the pager refuses to pass the last page.
    while pager.page() < page {
        if !pager.next_page() {
            warn!("Page {} is past the last page", page);
            eprintln!(
                "Page {} is past the last page ({}); showing page {}.",
                page,
                pager.page_count(),
                pager.shown_page()
            );
            break;
        }
        ClientError::check_fetch(pager.page(), pager.refresh().await)?;
    }

    let mut out = std::io::stdout().lock();
    writeln!(out, "Collections {}", pager.label())?;
    for collection in pager.items() {
        writeln!(
            out,
            "  {}  {}  ({})  {}",
            collection.id,
            collection.name,
            collection.created_at.format("%Y-%m-%d"),
            collection.description
        )?;
    }
    Ok(())
}

async fn show_chunk(
    config: &Config,
    service: &dyn ChunkService,
    chunk_id: Uuid,
) -> Result<(), ClientError> {
    let chunk = service.get_chunk(config.dataset_id, chunk_id).await?;
    let view = ChunkView::new(chunk, config.view_settings());
    let chunk = view.chunk();

    let mut out = std::io::stdout().lock();
    writeln!(out, "Chunk {}", chunk.id)?;
    if let Some(link) = chunk.link() {
        writeln!(out, "  link: {}", link)?;
    }
    let tags = chunk.tags();
    if !tags.is_empty() {
        writeln!(out, "  tags: {}", tags.join(", "))?;
    }
    match (chunk.parsed_time_stamp(), chunk.time_stamp.as_deref()) {
        (Some(parsed), _) => writeln!(out, "  date: {}", parsed.format("%Y-%m-%d %H:%M"))?,
        (None, Some(raw)) => writeln!(out, "  date: {}", raw)?,
        (None, None) => {}
    }
    for (key, value) in metadata::entries(chunk.metadata.as_ref()) {
        writeln!(out, "  {}: {}", key, value)?;
    }

    if let Some(range) = view.image_range() {
        let count = range.image_count();
        writeln!(out, "  images: {}", count)?;
        for url in range.image_urls(&config.api_base_url).take(MAX_LISTED_IMAGES) {
            writeln!(out, "    {}", url)?;
        }
        if count > MAX_LISTED_IMAGES as u64 {
            writeln!(out, "    ... {} more", count - MAX_LISTED_IMAGES as u64)?;
        }
        let display_name = chunk.link().unwrap_or("document");
        writeln!(
            out,
            "  pdf: {}",
            range.pdf_url(&config.api_base_url, display_name, false)
        )?;
    }

    writeln!(out)?;
    if view.is_collapsed() {
        let limit = config.view_settings().truncation.word_limit();
        let preview: Vec<&str> = chunk.chunk_html.split(' ').take(limit).collect();
        writeln!(out, "{} ...", preview.join(" "))?;
        writeln!(out, "[Show more]")?;
    } else {
        writeln!(out, "{}", chunk.chunk_html)?;
    }
    Ok(())
}

async fn delete_chunk(
    config: &Config,
    service: Arc<dyn ChunkService>,
    chunk_id: Uuid,
) -> Result<(), ClientError> {
    let chunk = service.get_chunk(config.dataset_id, chunk_id).await?;
    let list = ChunkList::new(
        service,
        config.dataset_id,
        config.view_settings(),
        DeferredActionCoordinator::new(),
    );
    list.replace_chunks(vec![chunk]);

    if !list.request_delete(chunk_id) {
        return Err(ClientError::Internal(format!(
            "chunk {} is not in the list",
            chunk_id
        )));
    }

    print!("Delete chunk {}? [y/N] ", chunk_id);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;

    let coordinator = list.coordinator();
    if answer.trim().eq_ignore_ascii_case("y") {
        coordinator.confirm().await;
    } else {
        coordinator.cancel();
        println!("Cancelled.");
        return Ok(());
    }

    let failures = list.take_failures();
    if failures.is_empty() {
        println!("Deleted chunk {}.", chunk_id);
    }
    for failure in failures {
        eprintln!("{}", failure);
    }
    Ok(())
}
