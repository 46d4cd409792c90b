use std::sync::Arc;

use jk_ratelimit::RateLimiter;
use jk_ratelimit::SpacingLimiter;
use jk_types::Anime;
use jk_types::AnimeFull;
use jk_types::AnimeRecommendation;
use jk_types::AnimeStatistics;
use jk_types::AnimeVideos;
use jk_types::Character;
use jk_types::CharacterAnime;
use jk_types::CharacterFull;
use jk_types::CharacterRole;
use jk_types::Episode;
use jk_types::EpisodeDetail;
use jk_types::ForumTopic;
use jk_types::GenreListItem;
use jk_types::Images;
use jk_types::ItemResponse;
use jk_types::Link;
use jk_types::ListResponse;
use jk_types::MoreInfo;
use jk_types::NewsArticle;
use jk_types::Person;
use jk_types::PersonAnime;
use jk_types::PersonFull;
use jk_types::PersonManga;
use jk_types::PersonVoice;
use jk_types::Recommendation;
use jk_types::Relation;
use jk_types::Review;
use jk_types::Season;
use jk_types::SeasonItem;
use jk_types::StaffMember;
use jk_types::ThemeSongs;
use jk_types::UserUpdate;
use jk_types::VoiceActor;
use jk_types::WatchEpisode;
use jk_types::Weekday;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;
use url::Url;

use crate::client::HttpClient;
use crate::client::HttpClientConfig;
use crate::decoder::JsonDecoder;
use crate::decoder::ResponseDecoder;
use crate::errors::ApiError;
use crate::errors::ClientError;
use crate::errors::Result;
use crate::retry::RequestDescriptor;
use crate::retry::RetryConfig;
use crate::retry::RetryObserver;
use crate::retry::RetryOrchestrator;
use crate::transport::Transport;

pub const JIKAN_BASE_URL: &str = "https://api.jikan.moe/v4";

type Params = Vec<(&'static str, String)>;

/// Filters for `/top/anime`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopAnimeQuery {
    pub limit: u32,
    pub page: Option<u32>,
    /// `airing`, `upcoming`, `bypopularity` or `favorite`
    pub filter: Option<String>,
    pub sfw: bool,
}

impl Default for TopAnimeQuery {
    fn default() -> Self {
        Self { limit: 10, page: None, filter: None, sfw: true }
    }
}

impl TopAnimeQuery {
    /// Currently airing titles only
    pub fn airing(limit: u32) -> Self {
        Self { limit, filter: Some("airing".to_string()), ..Default::default() }
    }

    fn params(&self) -> Params {
        let mut params = vec![("limit", self.limit.to_string())];
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if self.sfw {
            params.push(("sfw", "true".to_string()));
        }
        if let Some(filter) = self.filter.as_deref().filter(|f| !f.is_empty()) {
            params.push(("filter", filter.to_string()));
        }
        params
    }
}

/// Filters for `/anime` search. Unset or empty fields are not sent.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimeSearchQuery {
    pub q: Option<String>,
    pub page: u32,
    pub limit: u32,
    pub order_by: Option<String>,
    /// `asc` or `desc`
    pub sort: Option<String>,
    /// Comma-separated genre ids
    pub genres: Option<String>,
    /// Sent as `type`: `tv`, `movie`, `ova`, ...
    pub kind: Option<String>,
    pub score: Option<f64>,
    pub min_score: Option<f64>,
    pub sfw: bool,
}

impl Default for AnimeSearchQuery {
    fn default() -> Self {
        Self { q: None, page: 1, limit: 25, order_by: None, sort: None, genres: None, kind: None, score: None, min_score: None, sfw: true }
    }
}

impl AnimeSearchQuery {
    pub fn text(q: impl Into<String>) -> Self {
        Self { q: Some(q.into()), ..Default::default() }
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        let text = |value: &Option<String>| value.as_deref().filter(|v| !v.is_empty()).map(str::to_string);
        let positive = |value: Option<f64>| value.filter(|v| *v > 0.0).map(|v| v.to_string());

        if let Some(q) = text(&self.q) {
            params.push(("q", q));
        }
        params.push(("page", self.page.to_string()));
        params.push(("limit", self.limit.to_string()));
        if let Some(order_by) = text(&self.order_by) {
            params.push(("order_by", order_by));
        }
        if let Some(sort) = text(&self.sort) {
            params.push(("sort", sort));
        }
        if let Some(genres) = text(&self.genres) {
            params.push(("genres", genres));
        }
        if let Some(kind) = text(&self.kind) {
            params.push(("type", kind));
        }
        if let Some(score) = positive(self.score) {
            params.push(("score", score));
        }
        if let Some(min_score) = positive(self.min_score) {
            params.push(("min_score", min_score));
        }
        if self.sfw {
            params.push(("sfw", "true".to_string()));
        }
        params
    }
}

/// Jikan v4 client with typed endpoints
///
/// All endpoints share one admission queue, so concurrent calls on the same
/// client (or its clones) never dispatch closer together than the limiter's
/// spacing.
#[derive(Clone)]
pub struct JikanClient {
    base_url: String,
    orchestrator: Arc<RetryOrchestrator>,
    cancel: Option<CancellationToken>,
}

impl JikanClient {
    /// Create a new Jikan client with default configuration
    pub fn new() -> std::result::Result<Self, ClientError> {
        Self::builder().build()
    }

    /// Create a new client builder
    pub fn builder() -> JikanClientBuilder {
        JikanClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_config(&self) -> &RetryConfig {
        self.orchestrator.config()
    }

    pub fn limiter(&self) -> &Arc<dyn RateLimiter> {
        self.orchestrator.limiter()
    }

    /// Fetch `url` and decode it with the client's default budget
    pub async fn fetch<T, D>(&self, url: impl Into<String>, decoder: D) -> Result<T>
    where
        D: ResponseDecoder<T>,
    {
        self.execute(RequestDescriptor::new(url, decoder)).await
    }

    /// Fetch `url` with an explicit attempt budget (at least 1)
    pub async fn fetch_with_budget<T, D>(&self, url: impl Into<String>, decoder: D, max_attempts: u32) -> Result<T>
    where
        D: ResponseDecoder<T>,
    {
        self.execute(RequestDescriptor::new(url, decoder).with_max_attempts(max_attempts)).await
    }

    /// Run a descriptor, attaching the client's cancellation token when it carries none
    pub async fn execute<T, D>(&self, mut request: RequestDescriptor<D>) -> Result<T>
    where
        D: ResponseDecoder<T>,
    {
        if request.cancel.is_none() {
            request.cancel = self.cancel.clone();
        }
        self.orchestrator.execute(request).await
    }

    /// `/anime/{id}`
    pub async fn anime(&self, id: u64) -> Result<Anime> {
        self.get_item(&format!("/anime/{id}"), Params::new()).await
    }

    /// `/anime/{id}/full`
    pub async fn anime_full(&self, id: u64) -> Result<AnimeFull> {
        self.get_item(&format!("/anime/{id}/full"), Params::new()).await
    }

    /// `/anime/{id}/characters`
    pub async fn anime_characters(&self, id: u64) -> Result<ListResponse<CharacterRole>> {
        self.get_json(&format!("/anime/{id}/characters"), Params::new()).await
    }

    /// `/anime/{id}/episodes?page={page}`
    pub async fn anime_episodes(&self, id: u64, page: u32) -> Result<ListResponse<Episode>> {
        self.get_json(&format!("/anime/{id}/episodes"), vec![("page", page.to_string())]).await
    }

    /// Every episode of a series, one page after another
    ///
    /// The first page's error is returned. Later pages that fail are logged
    /// and skipped, so the result may be partial. The pagination block of
    /// page 1 is kept.
    pub async fn all_anime_episodes(&self, id: u64) -> Result<ListResponse<Episode>> {
        let mut episodes = self.anime_episodes(id, 1).await?;
        let last_page = episodes.last_page();
        debug!(id, last_page, "Fetching remaining episode pages");

        for page in 2..=last_page {
            match self.anime_episodes(id, page).await {
                Ok(next) => episodes.extend_from(next),
                Err(ApiError::Cancelled) => return Err(ApiError::Cancelled),
                Err(err) => warn!(id, page, "Skipping episode page: {err}"),
            }
        }

        Ok(episodes)
    }

    /// `/anime/{id}/reviews?page={page}`
    pub async fn anime_reviews(&self, id: u64, page: u32) -> Result<ListResponse<Review>> {
        self.get_json(&format!("/anime/{id}/reviews"), vec![("page", page.to_string())]).await
    }

    /// `/top/anime`
    pub async fn top_anime(&self, query: &TopAnimeQuery) -> Result<ListResponse<Anime>> {
        self.get_json("/top/anime", query.params()).await
    }

    /// `/seasons/now`
    pub async fn season_now(&self, limit: u32, sfw: bool) -> Result<ListResponse<Anime>> {
        self.get_json("/seasons/now", season_params(limit, sfw)).await
    }

    /// `/seasons/upcoming`
    pub async fn season_upcoming(&self, limit: u32, sfw: bool) -> Result<ListResponse<Anime>> {
        self.get_json("/seasons/upcoming", season_params(limit, sfw)).await
    }

    /// `/seasons/{year}/{season}`
    pub async fn season(&self, year: u32, season: Season, limit: u32, sfw: bool) -> Result<ListResponse<Anime>> {
        self.get_json(&format!("/seasons/{year}/{season}"), season_params(limit, sfw)).await
    }

    /// `/seasons`
    pub async fn seasons_list(&self) -> Result<ListResponse<SeasonItem>> {
        self.get_json("/seasons", Params::new()).await
    }

    /// `/schedules`, optionally for a single broadcast day
    pub async fn schedules(&self, day: Option<Weekday>, sfw: bool) -> Result<ListResponse<Anime>> {
        let mut params = Params::new();
        if let Some(day) = day {
            params.push(("filter", day.to_string()));
        }
        if sfw {
            params.push(("sfw", "true".to_string()));
        }
        self.get_json("/schedules", params).await
    }

    /// `/anime` search
    pub async fn search_anime(&self, query: &AnimeSearchQuery) -> Result<ListResponse<Anime>> {
        self.get_json("/anime", query.params()).await
    }

    /// `/recommendations/anime`, first page cut down to `limit` entries
    pub async fn recommendations(&self, limit: usize) -> Result<ListResponse<Recommendation>> {
        let mut response: ListResponse<Recommendation> = self.get_json("/recommendations/anime", vec![("page", "1".to_string())]).await?;
        response.data.truncate(limit);
        Ok(response)
    }

    /// `/genres/anime`
    pub async fn genres(&self) -> Result<ListResponse<GenreListItem>> {
        self.get_json("/genres/anime", Params::new()).await
    }

    /// `/random/anime`
    pub async fn random_anime(&self, sfw: bool) -> Result<Anime> {
        let params = if sfw { vec![("sfw", "true".to_string())] } else { Params::new() };
        self.get_item("/random/anime", params).await
    }

    /// `/anime/{id}/staff`
    pub async fn anime_staff(&self, id: u64) -> Result<ListResponse<StaffMember>> {
        self.get_json(&format!("/anime/{id}/staff"), Params::new()).await
    }

    /// `/anime/{id}/news`
    pub async fn anime_news(&self, id: u64) -> Result<ListResponse<NewsArticle>> {
        self.get_json(&format!("/anime/{id}/news"), Params::new()).await
    }

    /// `/anime/{id}/forum`
    pub async fn anime_forum(&self, id: u64) -> Result<ListResponse<ForumTopic>> {
        self.get_json(&format!("/anime/{id}/forum"), Params::new()).await
    }

    /// `/anime/{id}/statistics`
    pub async fn anime_statistics(&self, id: u64) -> Result<AnimeStatistics> {
        self.get_item(&format!("/anime/{id}/statistics"), Params::new()).await
    }

    /// `/anime/{id}/pictures`
    pub async fn anime_pictures(&self, id: u64) -> Result<ListResponse<Images>> {
        self.get_json(&format!("/anime/{id}/pictures"), Params::new()).await
    }

    /// `/anime/{id}/videos`
    pub async fn anime_videos(&self, id: u64) -> Result<AnimeVideos> {
        self.get_item(&format!("/anime/{id}/videos"), Params::new()).await
    }

    /// `/anime/{id}/moreinfo`, `None` when the title has no extra notes
    pub async fn anime_more_info(&self, id: u64) -> Result<Option<String>> {
        let info: MoreInfo = self.get_item(&format!("/anime/{id}/moreinfo"), Params::new()).await?;
        Ok(info.moreinfo)
    }

    /// `/anime/{id}/episodes/{episode}`
    pub async fn anime_episode(&self, id: u64, episode: u32) -> Result<EpisodeDetail> {
        self.get_item(&format!("/anime/{id}/episodes/{episode}"), Params::new()).await
    }

    /// `/anime/{id}/userupdates`
    pub async fn anime_user_updates(&self, id: u64) -> Result<ListResponse<UserUpdate>> {
        self.get_json(&format!("/anime/{id}/userupdates"), Params::new()).await
    }

    /// `/anime/{id}/relations`
    pub async fn anime_relations(&self, id: u64) -> Result<ListResponse<Relation>> {
        self.get_json(&format!("/anime/{id}/relations"), Params::new()).await
    }

    /// `/anime/{id}/themes`
    pub async fn anime_themes(&self, id: u64) -> Result<ThemeSongs> {
        self.get_item(&format!("/anime/{id}/themes"), Params::new()).await
    }

    /// `/anime/{id}/external`
    pub async fn anime_external(&self, id: u64) -> Result<ListResponse<Link>> {
        self.get_json(&format!("/anime/{id}/external"), Params::new()).await
    }

    /// `/anime/{id}/streaming`
    pub async fn anime_streaming(&self, id: u64) -> Result<ListResponse<Link>> {
        self.get_json(&format!("/anime/{id}/streaming"), Params::new()).await
    }

    /// `/anime/{id}/recommendations`
    pub async fn anime_recommendations(&self, id: u64) -> Result<ListResponse<AnimeRecommendation>> {
        self.get_json(&format!("/anime/{id}/recommendations"), Params::new()).await
    }

    /// `/characters/{id}/full`
    pub async fn character_full(&self, id: u64) -> Result<CharacterFull> {
        self.get_item(&format!("/characters/{id}/full"), Params::new()).await
    }

    /// `/characters/{id}/anime`
    pub async fn character_anime(&self, id: u64) -> Result<ListResponse<CharacterAnime>> {
        self.get_json(&format!("/characters/{id}/anime"), Params::new()).await
    }

    /// `/characters/{id}/voices`
    pub async fn character_voices(&self, id: u64) -> Result<ListResponse<VoiceActor>> {
        self.get_json(&format!("/characters/{id}/voices"), Params::new()).await
    }

    /// `/characters/{id}/pictures`
    pub async fn character_pictures(&self, id: u64) -> Result<ListResponse<Images>> {
        self.get_json(&format!("/characters/{id}/pictures"), Params::new()).await
    }

    /// `/characters?q={query}&page={page}`
    pub async fn search_characters(&self, query: &str, page: u32) -> Result<ListResponse<Character>> {
        self.get_json("/characters", vec![("q", query.to_string()), ("page", page.to_string())]).await
    }

    /// `/people/{id}/full`
    pub async fn person_full(&self, id: u64) -> Result<PersonFull> {
        self.get_item(&format!("/people/{id}/full"), Params::new()).await
    }

    /// `/people/{id}/anime`
    pub async fn person_anime(&self, id: u64) -> Result<ListResponse<PersonAnime>> {
        self.get_json(&format!("/people/{id}/anime"), Params::new()).await
    }

    /// `/people/{id}/voices`
    pub async fn person_voices(&self, id: u64) -> Result<ListResponse<PersonVoice>> {
        self.get_json(&format!("/people/{id}/voices"), Params::new()).await
    }

    /// `/people/{id}/manga`
    pub async fn person_manga(&self, id: u64) -> Result<ListResponse<PersonManga>> {
        self.get_json(&format!("/people/{id}/manga"), Params::new()).await
    }

    /// `/people/{id}/pictures`
    pub async fn person_pictures(&self, id: u64) -> Result<ListResponse<Images>> {
        self.get_json(&format!("/people/{id}/pictures"), Params::new()).await
    }

    /// `/people?q={query}&page={page}`
    pub async fn search_people(&self, query: &str, page: u32) -> Result<ListResponse<Person>> {
        self.get_json("/people", vec![("q", query.to_string()), ("page", page.to_string())]).await
    }

    /// `/watch/episodes`, recently released episodes
    pub async fn watch_recent_episodes(&self) -> Result<ListResponse<WatchEpisode>> {
        self.get_json("/watch/episodes", Params::new()).await
    }

    /// `/watch/episodes/popular`
    pub async fn watch_popular_episodes(&self) -> Result<ListResponse<WatchEpisode>> {
        self.get_json("/watch/episodes/popular", Params::new()).await
    }

    /// `/top/reviews`
    pub async fn top_reviews(&self) -> Result<ListResponse<Review>> {
        self.get_json("/top/reviews", Params::new()).await
    }

    async fn get_json<T>(&self, path: &str, params: Params) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = endpoint(&self.base_url, path, &params)?;
        self.fetch(url, JsonDecoder::<T>::new()).await
    }

    /// Fetch a `{"data": ...}` envelope and unwrap it
    async fn get_item<T>(&self, path: &str, params: Params) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response: ItemResponse<T> = self.get_json(path, params).await?;
        Ok(response.data)
    }
}

fn season_params(limit: u32, sfw: bool) -> Params {
    let mut params = vec![("limit", limit.to_string())];
    if sfw {
        params.push(("sfw", "true".to_string()));
    }
    params
}

/// Join base, path and URL-encoded query parameters
fn endpoint(base_url: &str, path: &str, params: &[(&'static str, String)]) -> Result<String> {
    let mut url = Url::parse(&format!("{}{}", base_url.trim_end_matches('/'), path))
        .map_err(|err| ApiError::BadRequest { message: Some(format!("Invalid request URL: {err}")) })?;

    // query_pairs_mut leaves a bare `?` behind when nothing is appended
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params.iter().map(|(key, value)| (*key, value.as_str())));
    }

    Ok(url.into())
}

/// Builder for configuring Jikan client
pub struct JikanClientBuilder {
    base_url: String,
    http_config: HttpClientConfig,
    retry_config: RetryConfig,
    limiter: Option<Arc<dyn RateLimiter>>,
    transport: Option<Arc<dyn Transport>>,
    observer: Option<Arc<dyn RetryObserver>>,
    cancel: Option<CancellationToken>,
}

impl Default for JikanClientBuilder {
    fn default() -> Self {
        Self {
            base_url: JIKAN_BASE_URL.to_string(),
            http_config: HttpClientConfig::default(),
            retry_config: RetryConfig::default(),
            limiter: None,
            transport: None,
            observer: None,
            cancel: None,
        }
    }
}

impl JikanClientBuilder {
    /// Set custom base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Configure HTTP client settings
    pub fn http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Configure retry, timeout and spacing behaviour
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Share an existing limiter, e.g. one admission queue across several clients
    pub fn limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Replace the reqwest transport
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Receive retry and failure notifications instead of the tracing default
    pub fn observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Token cancelling every request made by the client
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Build the Jikan client
    pub fn build(self) -> std::result::Result<JikanClient, ClientError> {
        Url::parse(&self.base_url)?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpClient::with_config(self.http_config)?),
        };
        let limiter: Arc<dyn RateLimiter> = match self.limiter {
            Some(limiter) => limiter,
            None => Arc::new(SpacingLimiter::new(self.retry_config.min_interval)),
        };

        let mut orchestrator = RetryOrchestrator::new(transport, limiter, self.retry_config);
        if let Some(observer) = self.observer {
            orchestrator = orchestrator.with_observer(observer);
        }

        Ok(JikanClient { base_url: self.base_url.trim_end_matches('/').to_string(), orchestrator: Arc::new(orchestrator), cancel: self.cancel })
    }
}
