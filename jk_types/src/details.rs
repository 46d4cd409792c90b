//! Per-anime sub-resources under `/anime/{id}/...`

use serde::Deserialize;
use serde::Serialize;

use crate::Images;
use crate::RecommendationEntry;
use crate::ReviewUser;
use crate::Trailer;

/// Entry of `/anime/{id}/news`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub mal_id: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub author_username: Option<String>,
    #[serde(default)]
    pub author_url: Option<String>,
    #[serde(default)]
    pub forum_url: Option<String>,
    #[serde(default)]
    pub images: Option<Images>,
    #[serde(default)]
    pub excerpt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastComment {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author_username: Option<String>,
    #[serde(default)]
    pub author_url: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Entry of `/anime/{id}/forum`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumTopic {
    pub mal_id: u64,
    #[serde(default)]
    pub url: Option<String>,
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub author_username: Option<String>,
    #[serde(default)]
    pub author_url: Option<String>,
    #[serde(default)]
    pub comments: Option<u32>,
    #[serde(default)]
    pub last_comment: Option<LastComment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBucket {
    pub score: u8,
    pub votes: u64,
    pub percentage: f64,
}

/// Payload of `/anime/{id}/statistics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimeStatistics {
    #[serde(default)]
    pub watching: Option<u64>,
    #[serde(default)]
    pub completed: Option<u64>,
    #[serde(default)]
    pub on_hold: Option<u64>,
    #[serde(default)]
    pub dropped: Option<u64>,
    #[serde(default)]
    pub plan_to_watch: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub scores: Vec<ScoreBucket>,
}

impl AnimeStatistics {
    /// Vote-weighted mean over the score histogram
    pub fn mean_score(&self) -> Option<f64> {
        let votes: u64 = self.scores.iter().map(|bucket| bucket.votes).sum();
        if votes == 0 {
            return None;
        }
        let weighted: f64 = self.scores.iter().map(|bucket| f64::from(bucket.score) * bucket.votes as f64).sum();
        Some(weighted / votes as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoVideo {
    pub title: String,
    pub trailer: Trailer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeVideo {
    pub mal_id: u64,
    pub title: String,
    /// Label such as "Episode 3"
    pub episode: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub images: Option<Images>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicVideoMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicVideo {
    pub title: String,
    pub video: Trailer,
    #[serde(default)]
    pub meta: Option<MusicVideoMeta>,
}

/// Payload of `/anime/{id}/videos`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeVideos {
    #[serde(default)]
    pub promo: Vec<PromoVideo>,
    #[serde(default)]
    pub episodes: Vec<EpisodeVideo>,
    #[serde(default)]
    pub music_videos: Vec<MusicVideo>,
}

/// Payload of `/anime/{id}/moreinfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoreInfo {
    #[serde(default)]
    pub moreinfo: Option<String>,
}

/// Entry of `/anime/{id}/userupdates`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    pub user: ReviewUser,
    #[serde(default)]
    pub score: Option<u32>,
    pub status: String,
    #[serde(default)]
    pub episodes_seen: Option<u32>,
    #[serde(default)]
    pub episodes_total: Option<u32>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Entry of `/anime/{id}/recommendations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeRecommendation {
    pub entry: RecommendationEntry,
    #[serde(default)]
    pub url: Option<String>,
    pub votes: u32,
}
