//! Catalog domain and wire types

use crate::types::{Identify, Searchable};
use serde::{Deserialize, Serialize};

/// A game in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub rating: f64,
}

impl Identify for Game {
    type Key = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

impl Searchable for Game {
    fn display_name(&self) -> &str {
        &self.name
    }
}

/// One page of the games listing as returned by the API
///
/// Every field tolerates being absent or `null`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GamesResponse {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<GameDto>,
}

impl GamesResponse {
    /// Convert the page's results into domain games, preserving order
    pub fn into_games(self) -> Vec<Game> {
        self.results.into_iter().map(Game::from).collect()
    }
}

/// A game as it appears in a listing page
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameDto {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl From<GameDto> for Game {
    fn from(dto: GameDto) -> Self {
        Self {
            id: dto.id.unwrap_or_default(),
            name: dto.name.unwrap_or_default(),
            image_url: dto.background_image,
            rating: dto.rating.unwrap_or_default(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<GameDto>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<GameDto>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Full record for one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDetails {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub released: String,
    pub rating: f64,
    /// Average playtime in hours
    pub playtime: u32,
    pub background_image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image_additional: Option<String>,
    pub genres: Vec<String>,
}

/// A single game as returned by the details endpoint
///
/// `description` is HTML; `description_raw` is the plain-text fallback.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameDetailsDto {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub name_original: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_raw: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub background_image_additional: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub playtime: Option<u32>,
    #[serde(default)]
    pub genres: Option<Vec<GenreDto>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenreDto {
    #[serde(default)]
    pub name: Option<String>,
}

impl From<GameDetailsDto> for GameDetails {
    fn from(dto: GameDetailsDto) -> Self {
        Self {
            id: dto.id.unwrap_or_default(),
            name: dto.name.unwrap_or_else(|| "Unknown".to_string()),
            description: dto
                .description
                .or(dto.description_raw)
                .unwrap_or_else(|| "No description available".to_string()),
            released: dto.released.unwrap_or_else(|| "Unknown".to_string()),
            rating: dto.rating.unwrap_or_default(),
            playtime: dto.playtime.unwrap_or_default(),
            background_image: dto.background_image.unwrap_or_default(),
            background_image_additional: dto.background_image_additional,
            genres: dto
                .genres
                .unwrap_or_default()
                .into_iter()
                .filter_map(|genre| genre.name)
                .collect(),
        }
    }
}
