use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use client_core::{
    AlbumPaginator, GraphqlAlbumClient, LoadOutcome, MediaListState, PaginationError,
    PaginatorConfig, TracingErrorSink,
};
use shared::{domain::AlbumId, error::GraphqlException};
use tracing::debug;

mod config;

use config::{load_settings, Settings};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    album_id: String,
    #[arg(long)]
    graphql_url: Option<String>,
    #[arg(long)]
    auth_token: Option<String>,
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long, default_value_t = 50)]
    max_pages: usize,
}

fn apply_args(mut settings: Settings, args: &Args) -> Settings {
    if let Some(url) = &args.graphql_url {
        settings.graphql_url = url.clone();
    }
    if let Some(token) = &args.auth_token {
        settings.auth_token = Some(token.clone());
    }
    if let Some(limit) = args.limit {
        settings.page_limit = limit;
    }
    settings
}

fn classify_failure(err: &PaginationError) -> String {
    match err {
        PaginationError::Decode { .. } => format!("Server sent media this client cannot read: {err}"),
        PaginationError::Transport { source, .. } => {
            if source
                .downcast_ref::<GraphqlException>()
                .is_some_and(GraphqlException::is_unauthorized)
            {
                "Not signed in; pass --auth-token or set APP__AUTH_TOKEN.".to_string()
            } else {
                let lower = format!("{source:#}").to_ascii_lowercase();
                if lower.contains("failed to reach")
                    || lower.contains("connection refused")
                    || lower.contains("dns")
                    || lower.contains("timed out")
                {
                    "Server unreachable; check the GraphQL URL/network and retry.".to_string()
                } else {
                    format!("Album request failed: {err}")
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();
    let settings = apply_args(load_settings(), &args);

    let config = PaginatorConfig::new(settings.page_limit, settings.lookahead)?;
    let mut client = GraphqlAlbumClient::new(&settings.graphql_url)?;
    if let Some(token) = settings.auth_token.clone() {
        client = client.with_auth_token(token);
    }

    let media = MediaListState::new();
    let paginator = AlbumPaginator::new_with_dependencies(
        Arc::new(client),
        Arc::new(TracingErrorSink),
        Arc::clone(&media),
        config,
    );

    let mut events = media.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            debug!(?event, "media list changed");
        }
    });

    let album_id = AlbumId::new(args.album_id.clone());
    let mut outcome = paginator.start_session(album_id.clone()).await;
    if let Some(album) = paginator.album().await {
        println!("Album {}: {}", album.id, album.title);
        for sub in &album.sub_albums {
            println!("  sub-album {}: {}", sub.id, sub.title);
        }
    }

    let mut pages = 1;
    loop {
        match &outcome {
            LoadOutcome::Appended { count, total } => {
                println!("page {pages}: +{count} media (loaded {total})");
            }
            LoadOutcome::Exhausted => {
                println!("no more media in album {album_id}");
                break;
            }
            LoadOutcome::AlbumGone => {
                println!("album {album_id} no longer exists");
                break;
            }
            LoadOutcome::Failed(err) => bail!(classify_failure(err)),
            LoadOutcome::Skipped(reason) => {
                println!("stopped: {reason:?}");
                break;
            }
        }
        if pages >= args.max_pages {
            println!("reached --max-pages={}", args.max_pages);
            break;
        }

        // Scroll the viewer to the last loaded item, as a grid would.
        let last = media.len().await.saturating_sub(1);
        media.set_active_index(last).await;
        outcome = paginator.load_more_near(last).await;
        pages += 1;
    }

    println!("Loaded {} media items", media.len().await);
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
