use serde::Deserialize;
use serde::Serialize;

use crate::Images;
use crate::MediaRef;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reactions {
    #[serde(default)]
    pub overall: Option<u32>,
    #[serde(default)]
    pub nice: Option<u32>,
    #[serde(default)]
    pub love_it: Option<u32>,
    #[serde(default)]
    pub funny: Option<u32>,
    #[serde(default)]
    pub confusing: Option<u32>,
    #[serde(default)]
    pub informative: Option<u32>,
    #[serde(default)]
    pub well_written: Option<u32>,
    #[serde(default)]
    pub creative: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewUser {
    #[serde(default)]
    pub url: Option<String>,
    pub username: String,
    #[serde(default)]
    pub images: Option<Images>,
}

/// Entry of `/anime/{id}/reviews` and `/top/reviews`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub mal_id: u64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub reactions: Option<Reactions>,
    #[serde(default)]
    pub date: Option<String>,
    pub review: String,
    pub score: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_spoiler: Option<bool>,
    #[serde(default)]
    pub is_preliminary: Option<bool>,
    #[serde(default)]
    pub episodes_watched: Option<u32>,
    #[serde(default)]
    pub user: Option<ReviewUser>,
    /// Reviewed title, only sent by `/top/reviews`
    #[serde(default)]
    pub entry: Option<MediaRef>,
}
