//! HTTP source for the games listing and single-game records

use super::model::{GameDetails, GameDetailsDto, GamesResponse, Game};
use crate::config::CatalogConfig;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::source::PageSource;
use crate::types::PageKey;
use async_trait::async_trait;
use tracing::{debug, info};

/// Client for the catalog's games endpoints
///
/// Listing pages are `GET {base_url}/{games_endpoint}?page=N`, with the API
/// key and page size appended when configured. The API answers 404 for a page
/// past the end of the listing, so a 404 on any page after the first is an
/// empty page. A 404 on the first page means the endpoint itself is wrong and
/// stays an error.
#[derive(Debug)]
pub struct RawgSource {
    client: HttpClient,
    config: CatalogConfig,
}

impl RawgSource {
    /// Create a source with an HTTP client built from the configuration
    pub fn new(config: CatalogConfig) -> Result<Self> {
        config.validate()?;
        let client = HttpClient::new(config.to_http_client_config())?;
        Ok(Self { client, config })
    }

    /// Configuration in use
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Fetch and decode one listing page without mapping it
    pub async fn fetch_response(&self, page: PageKey) -> Result<GamesResponse> {
        let mut query = self.auth_query();
        query.push((self.config.page_param.as_str(), page.to_string()));
        if let Some(size) = self.config.page_size {
            query.push((self.config.page_size_param.as_str(), size.to_string()));
        }
        self.client
            .get_json(&self.config.games_endpoint, &query)
            .await
    }

    /// Fetch the full record for one game
    ///
    /// A 404 becomes [`Error::GameNotFound`].
    pub async fn fetch_details(&self, id: u64) -> Result<GameDetails> {
        let path = format!("{}/{id}", self.config.details_endpoint.trim_end_matches('/'));
        let dto: GameDetailsDto = match self.client.get_json(&path, &self.auth_query()).await {
            Ok(dto) => dto,
            Err(e) if e.status() == Some(404) => return Err(Error::GameNotFound { id }),
            Err(e) => return Err(e),
        };
        let details = GameDetails::from(dto);
        info!(id, name = %details.name, "fetched game details");
        Ok(details)
    }

    fn auth_query(&self) -> Vec<(&str, String)> {
        self.config
            .api_key
            .iter()
            .map(|key| (self.config.key_param.as_str(), key.clone()))
            .collect()
    }
}

#[async_trait]
impl PageSource<Game> for RawgSource {
    async fn fetch_page(&self, key: PageKey) -> Result<Vec<Game>> {
        match self.fetch_response(key).await {
            Ok(response) => {
                let games = response.into_games();
                info!(page = key, count = games.len(), "fetched catalog page");
                Ok(games)
            }
            Err(e) if e.status() == Some(404) && key != self.config.pagination.initial_key => {
                debug!(page = key, "page not found, treating as end of catalog");
                Ok(Vec::new())
            }
            Err(e) => Err(Error::page_failed(key, e)),
        }
    }
}
