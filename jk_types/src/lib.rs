//! # jk_types
//!
//! Resource models for the Jikan v4 API.
//!
//! Required fields fail deserialization when absent; nullable or optional
//! upstream fields are `Option`; list fields the upstream sometimes omits
//! default to empty.

pub mod anime;
pub mod catalog;
pub mod character;
pub mod details;
pub mod envelope;
pub mod episode;
pub mod person;
pub mod review;
pub mod watch;

pub use anime::Aired;
pub use anime::Anime;
pub use anime::AnimeFull;
pub use anime::Broadcast;
pub use anime::Genre;
pub use anime::Image;
pub use anime::Images;
pub use anime::Link;
pub use anime::MediaRef;
pub use anime::Relation;
pub use anime::RelationEntry;
pub use anime::Studio;
pub use anime::ThemeSongs;
pub use anime::Trailer;
pub use anime::VideoImages;
pub use catalog::GenreListItem;
pub use catalog::Recommendation;
pub use catalog::RecommendationEntry;
pub use catalog::Season;
pub use catalog::SeasonItem;
pub use catalog::UserRef;
pub use catalog::Weekday;
pub use character::Character;
pub use character::CharacterAnime;
pub use character::CharacterFull;
pub use character::CharacterManga;
pub use character::CharacterRef;
pub use character::CharacterRole;
pub use character::PersonRef;
pub use character::VoiceActor;
pub use details::AnimeRecommendation;
pub use details::AnimeStatistics;
pub use details::AnimeVideos;
pub use details::EpisodeVideo;
pub use details::ForumTopic;
pub use details::LastComment;
pub use details::MoreInfo;
pub use details::MusicVideo;
pub use details::MusicVideoMeta;
pub use details::NewsArticle;
pub use details::PromoVideo;
pub use details::ScoreBucket;
pub use details::UserUpdate;
pub use envelope::ItemResponse;
pub use envelope::ListResponse;
pub use envelope::Pagination;
pub use envelope::PaginationItems;
pub use episode::Episode;
pub use episode::EpisodeDetail;
pub use person::Person;
pub use person::PersonAnime;
pub use person::PersonFull;
pub use person::PersonManga;
pub use person::PersonVoice;
pub use person::StaffMember;
pub use review::Reactions;
pub use review::Review;
pub use review::ReviewUser;
pub use watch::EpisodeId;
pub use watch::WatchEpisode;
pub use watch::WatchEpisodeItem;
