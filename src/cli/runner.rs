//! CLI runner - executes commands

use crate::catalog::{
    CatalogAction, CatalogSession, CatalogState, DetailsSession, Game, GameDetails, RawgSource,
};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::CatalogConfig;
use crate::error::{Error, Result, ResultExt};
use crate::pagination::PaginationState;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        match &self.cli.command {
            Commands::Browse { pages, max_retries } => {
                self.browse(config, *pages, *max_retries).await
            }
            Commands::Search {
                query,
                pages,
                max_retries,
            } => self.search(config, query, *pages, *max_retries).await,
            Commands::Details { id, max_retries } => {
                self.details(config, *id, *max_retries).await
            }
            Commands::Config => self.show_config(&config),
        }
    }

    /// Load configuration from file or defaults, then apply flag overrides
    pub fn load_config(&self) -> Result<CatalogConfig> {
        let mut config = match &self.cli.config {
            Some(path) => CatalogConfig::from_file(path)?,
            None => CatalogConfig::default(),
        };

        if let Some(base_url) = &self.cli.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(api_key) = &self.cli.api_key {
            config.api_key = Some(api_key.clone());
        }

        config.validate()?;
        Ok(config)
    }

    /// Load pages and print every game
    async fn browse(&self, config: CatalogConfig, pages: u32, max_retries: u32) -> Result<()> {
        let session =
            CatalogSession::from_config(config).context("Failed to start catalog session")?;
        let started = Instant::now();
        let (state, loaded) = load_pages(&session, pages, max_retries).await?;

        for game in state.games.iter() {
            self.output_game(game);
        }
        self.output_summary(&state, loaded, started);
        Ok(())
    }

    /// Load pages, then print the games matching `query`
    async fn search(
        &self,
        config: CatalogConfig,
        query: &str,
        pages: u32,
        max_retries: u32,
    ) -> Result<()> {
        let session =
            CatalogSession::from_config(config).context("Failed to start catalog session")?;
        let started = Instant::now();
        let (_, loaded) = load_pages(&session, pages, max_retries).await?;

        session.dispatch(CatalogAction::ToggleSearch);
        session.dispatch(CatalogAction::Search(query.to_string()));
        let state = session.snapshot();
        info!(
            query,
            matched = state.games.len(),
            loaded = session.loaded().len(),
            "search complete"
        );

        for game in state.games.iter() {
            self.output_game(game);
        }
        self.output_summary(&state, loaded, started);
        Ok(())
    }

    /// Fetch one game and print its record
    async fn details(&self, config: CatalogConfig, id: u64, max_retries: u32) -> Result<()> {
        let source = RawgSource::new(config).context("Failed to create catalog source")?;
        let session = DetailsSession::new(source);

        let mut state = session.load(id).await;
        let mut retries = 0;
        while let Some(error) = state.error.clone() {
            if retries >= max_retries {
                return Err(Error::Other(error));
            }
            retries += 1;
            warn!(id, attempt = retries, max_retries, %error, "retrying game details");
            state = session.retry().await.unwrap_or(state);
        }

        match &state.details {
            Some(details) => {
                self.output_details(details);
                Ok(())
            }
            None => Err(Error::GameNotFound { id }),
        }
    }

    /// Print the effective configuration as YAML, with the API key masked
    fn show_config(&self, config: &CatalogConfig) -> Result<()> {
        let mut shown = config.clone();
        if shown.api_key.is_some() {
            shown.api_key = Some("***".to_string());
        }
        print!("{}", shown.to_yaml()?);
        Ok(())
    }

    fn output_game(&self, game: &Game) {
        self.output_message(&json!({
            "type": "RECORD",
            "record": game
        }));
    }

    fn output_details(&self, details: &GameDetails) {
        self.output_message(&json!({
            "type": "DETAILS",
            "details": details
        }));
    }

    fn output_summary(&self, state: &CatalogState, pages: u32, started: Instant) {
        self.output_message(&json!({
            "type": "SUMMARY",
            "summary": {
                "pages_loaded": pages,
                "games": state.games.len(),
                "query": state.search_query,
                "state": state.pagination.name(),
                "end_reached": state.end_reached(),
                "duration_ms": started.elapsed().as_millis() as u64
            }
        }));
    }

    /// Output a message to stdout
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Drive a session until `pages` pages have loaded or the catalog ends
///
/// Each failed page is retried up to `max_retries` times; the count starts
/// over once a page loads. Returns the settled state and the number of pages
/// that loaded.
pub async fn load_pages(
    session: &CatalogSession,
    pages: u32,
    max_retries: u32,
) -> Result<(CatalogState, u32)> {
    let mut loaded = 0;
    let mut retries = 0;

    if pages == 0 {
        return Ok((session.snapshot(), loaded));
    }

    session.start();
    loop {
        let state = session.settled().await;
        match &state.pagination {
            PaginationState::Idle => {
                loaded += 1;
                retries = 0;
                if loaded >= pages {
                    return Ok((state, loaded));
                }
                session.dispatch(CatalogAction::LoadMore);
            }
            PaginationState::EndReached => {
                info!(pages = loaded, "reached end of catalog");
                return Ok((state, loaded));
            }
            PaginationState::Error { cause, retryable } => {
                if !*retryable || retries >= max_retries {
                    return Err(Error::Other(cause.to_string()));
                }
                retries += 1;
                warn!(attempt = retries, max_retries, error = %cause, "retrying page");
                session.dispatch(CatalogAction::Retry);
            }
            PaginationState::InitialLoading | PaginationState::PageLoading => {}
        }
    }
}
