use anyhow::Context;
use anyhow::bail;
use jk_app::cli;
use jk_app::config_loader;
use jk_app::config_loader::AppConfig;
use jk_app::shutdown_handler;
use jk_app::tracing_setup;
use jk_http::AnimeSearchQuery;
use jk_http::ApiError;
use jk_http::JikanClient;
use jk_http::TopAnimeQuery;
use jk_types::Season;
use jk_types::Weekday;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;
use tracing::warn;

const APP_NAME: &str = "jikan_fetch";
const DEFAULT_CONFIG_PATH: &str = "jikan.toml";

const USAGE: &str = "\
Usage: jikan_fetch [--config <file>] [--quiet] [--nsfw] <command> [args]

Commands:
  anime <id> [--full]          Anime details
  anime <id> <resource>        staff, news, forum, statistics, pictures, videos, moreinfo,
                               userupdates, relations, themes, external, streaming,
                               recommendations, episode <n>
  characters <id>              Cast list
  episodes <id> [page|all]     Episode list, one page or every page
  reviews <id> [page]          User reviews
  top [limit] [filter]         Top anime (filter: airing, upcoming, bypopularity, favorite)
  season now|upcoming [limit]  Current or upcoming season
  season <year> <season> [limit]
  seasons                      Available seasons
  schedule [day]               Broadcast schedule
  search <query...>            Search by title
  character <id> [resource]    Character profile, or its anime, voices or pictures
  person <id> [resource]       Person profile, or their anime, voices, manga or pictures
  find-character <query...>    Search characters by name
  find-person <query...>       Search people by name
  watch [popular]              Recently released or popular episodes
  top-reviews                  Most helpful reviews
  recommendations [limit]      Recent user recommendations (default: 6)
  genres                       Anime genres
  random                       A random anime";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let explicit_config = cli::flag_value("config");
    let config_path = explicit_config.clone().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let (config, load_error) = match config_loader::load_app_config(&config_path) {
        Ok(config) => (config, None),
        Err(err) if explicit_config.is_some() => return Err(err).with_context(|| format!("Failed to load config from {config_path}")),
        Err(err) => (AppConfig::default(), Some(err)),
    };

    let level = tracing_setup::parse_level(&config.log_level);
    let _guard = if cli::has_flag("quiet") {
        tracing_setup::init(APP_NAME, &config.log_dir, level)
    } else {
        tracing_setup::init_with_console(APP_NAME, &config.log_dir, level)
    };

    match load_error {
        Some(err) => warn!("Failed to load app config from {}: {}. Using defaults.", config_path, err),
        None => info!("Loaded app config from {config_path}"),
    }

    let token = CancellationToken::new();
    shutdown_handler::setup(token.clone())?;

    let client = JikanClient::builder()
        .base_url(config.base_url.clone())
        .retry_config(config.retry_config())
        .cancellation(token)
        .build()
        .context("Failed to build Jikan client")?;

    let args = cli::positional_args();
    let Some((command, rest)) = args.split_first() else {
        eprintln!("{USAGE}");
        return Ok(());
    };

    match run(&client, command, rest).await {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(err) => {
            match err.downcast_ref::<ApiError>() {
                Some(ApiError::Cancelled) => info!("Request cancelled"),
                Some(api) => error!(status = api.status(), error_type = api.error_type(), "{}", api.message()),
                None => error!("{err:#}"),
            }
            Err(err)
        }
    }
}

async fn run(client: &JikanClient, command: &str, args: &[String]) -> anyhow::Result<String> {
    let sfw = !cli::has_flag("nsfw");

    match command {
        "anime" => {
            let id = required_id(args)?;
            match args.get(1).map(String::as_str) {
                None if cli::has_flag("full") => render(&client.anime_full(id).await?),
                None => render(&client.anime(id).await?),
                Some(resource) => anime_resource(client, id, resource, &args[1..]).await,
            }
        }
        "characters" => render(&client.anime_characters(required_id(args)?).await?),
        "episodes" => {
            let id = required_id(args)?;
            match args.get(1).map(String::as_str) {
                Some("all") => render(&client.all_anime_episodes(id).await?),
                _ => render(&client.anime_episodes(id, cli::parse_arg(args, 1, 1)).await?),
            }
        }
        "reviews" => render(&client.anime_reviews(required_id(args)?, cli::parse_arg(args, 1, 1)).await?),
        "top" => {
            let query = TopAnimeQuery { limit: cli::parse_arg(args, 0, 10), filter: args.get(1).cloned(), sfw, ..Default::default() };
            render(&client.top_anime(&query).await?)
        }
        "season" => match args.first().map(String::as_str) {
            Some("now") => render(&client.season_now(cli::parse_arg(args, 1, 10), sfw).await?),
            Some("upcoming") => render(&client.season_upcoming(cli::parse_arg(args, 1, 10), sfw).await?),
            Some(year) => {
                let year: u32 = year.parse().with_context(|| format!("Invalid year: {year}"))?;
                let season: Season = args.get(1).context("Missing season")?.parse().map_err(anyhow::Error::msg)?;
                render(&client.season(year, season, cli::parse_arg(args, 2, 25), sfw).await?)
            }
            None => bail!("Missing season\n\n{USAGE}"),
        },
        "seasons" => render(&client.seasons_list().await?),
        "schedule" => {
            let day = args.first().map(|day| day.parse::<Weekday>()).transpose().map_err(anyhow::Error::msg)?;
            render(&client.schedules(day, sfw).await?)
        }
        "search" => {
            let query = AnimeSearchQuery { sfw, ..AnimeSearchQuery::text(required_query(args)?) };
            render(&client.search_anime(&query).await?)
        }
        "character" => {
            let id = required_id(args)?;
            match args.get(1).map(String::as_str) {
                None => render(&client.character_full(id).await?),
                Some("anime") => render(&client.character_anime(id).await?),
                Some("voices") => render(&client.character_voices(id).await?),
                Some("pictures") => render(&client.character_pictures(id).await?),
                Some(other) => bail!("Unknown character resource: {other}\n\n{USAGE}"),
            }
        }
        "person" => {
            let id = required_id(args)?;
            match args.get(1).map(String::as_str) {
                None => render(&client.person_full(id).await?),
                Some("anime") => render(&client.person_anime(id).await?),
                Some("voices") => render(&client.person_voices(id).await?),
                Some("manga") => render(&client.person_manga(id).await?),
                Some("pictures") => render(&client.person_pictures(id).await?),
                Some(other) => bail!("Unknown person resource: {other}\n\n{USAGE}"),
            }
        }
        "find-character" => render(&client.search_characters(&required_query(args)?, 1).await?),
        "find-person" => render(&client.search_people(&required_query(args)?, 1).await?),
        "watch" => match args.first().map(String::as_str) {
            Some("popular") => render(&client.watch_popular_episodes().await?),
            _ => render(&client.watch_recent_episodes().await?),
        },
        "top-reviews" => render(&client.top_reviews().await?),
        "recommendations" => render(&client.recommendations(cli::parse_arg(args, 0, 6)).await?),
        "genres" => render(&client.genres().await?),
        "random" => render(&client.random_anime(sfw).await?),
        other => bail!("Unknown command: {other}\n\n{USAGE}"),
    }
}

/// `args` starts at the resource name
async fn anime_resource(client: &JikanClient, id: u64, resource: &str, args: &[String]) -> anyhow::Result<String> {
    match resource {
        "staff" => render(&client.anime_staff(id).await?),
        "news" => render(&client.anime_news(id).await?),
        "forum" => render(&client.anime_forum(id).await?),
        "statistics" => render(&client.anime_statistics(id).await?),
        "pictures" => render(&client.anime_pictures(id).await?),
        "videos" => render(&client.anime_videos(id).await?),
        "moreinfo" => render(&client.anime_more_info(id).await?),
        "userupdates" => render(&client.anime_user_updates(id).await?),
        "relations" => render(&client.anime_relations(id).await?),
        "themes" => render(&client.anime_themes(id).await?),
        "external" => render(&client.anime_external(id).await?),
        "streaming" => render(&client.anime_streaming(id).await?),
        "recommendations" => render(&client.anime_recommendations(id).await?),
        "episode" => {
            let raw = args.get(1).context("Missing episode number")?;
            let episode: u32 = raw.parse().with_context(|| format!("Invalid episode number: {raw}"))?;
            render(&client.anime_episode(id, episode).await?)
        }
        other => bail!("Unknown anime resource: {other}\n\n{USAGE}"),
    }
}

fn required_id(args: &[String]) -> anyhow::Result<u64> {
    let raw = args.first().context("Missing id")?;
    raw.parse().with_context(|| format!("Invalid id: {raw}"))
}

fn required_query(args: &[String]) -> anyhow::Result<String> {
    if args.is_empty() {
        bail!("Missing search query\n\n{USAGE}");
    }
    Ok(args.join(" "))
}

fn render<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
