use serde::Deserialize;
use serde::Serialize;

/// Entry of `/anime/{id}/episodes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub mal_id: u64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_japanese: Option<String>,
    #[serde(default)]
    pub title_romanji: Option<String>,
    #[serde(default)]
    pub aired: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub filler: Option<bool>,
    #[serde(default)]
    pub recap: Option<bool>,
    #[serde(default)]
    pub forum_url: Option<String>,
}

impl Episode {
    /// Neither filler nor recap
    pub fn is_canon(&self) -> bool {
        !self.filler.unwrap_or(false) && !self.recap.unwrap_or(false)
    }
}

/// Payload of `/anime/{id}/episodes/{episode}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeDetail {
    pub mal_id: u64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_japanese: Option<String>,
    #[serde(default)]
    pub title_romanji: Option<String>,
    /// Runtime in seconds
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub aired: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub filler: Option<bool>,
    #[serde(default)]
    pub recap: Option<bool>,
    #[serde(default)]
    pub synopsis: Option<String>,
}
