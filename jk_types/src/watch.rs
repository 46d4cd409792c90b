use serde::Deserialize;
use serde::Serialize;

use crate::MediaRef;

/// Episode id on the watch feeds: numeric for most entries, a slug for some
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EpisodeId {
    Number(u64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEpisodeItem {
    pub mal_id: EpisodeId,
    #[serde(default)]
    pub url: Option<String>,
    pub title: String,
    #[serde(default)]
    pub premium: Option<bool>,
}

/// Entry of `/watch/episodes` and `/watch/episodes/popular`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEpisode {
    pub entry: MediaRef,
    #[serde(default)]
    pub episodes: Vec<WatchEpisodeItem>,
    #[serde(default)]
    pub region_locked: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ListResponse;

    #[test]
    fn test_decode_watch_feed() {
        let json = r#"{
            "data": [
                {"entry": {"mal_id": 52991, "title": "Sousou no Frieren"}, "episodes": [
                    {"mal_id": 28, "title": "Episode 28", "premium": false},
                    {"mal_id": "28-special", "title": "Recap"}
                ], "region_locked": false},
                {"entry": {"mal_id": 1, "title": "Cowboy Bebop"}}
            ],
            "pagination": {"last_visible_page": 1, "has_next_page": false}
        }"#;
        let feed: ListResponse<WatchEpisode> = serde_json::from_str(json).unwrap();

        assert_eq!(feed.data[0].episodes[0].mal_id, EpisodeId::Number(28));
        assert_eq!(feed.data[0].episodes[1].mal_id, EpisodeId::Text("28-special".into()));
        assert!(feed.data[1].episodes.is_empty());
        assert_eq!(feed.data[1].region_locked, None);
    }
}
