// src/main.rs
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tibia_extract::storage::StorageManager;
use tibia_extract::utils::{logging, AppError};
use tibia_extract::{
    BazaarType, Client, ClientConfig, HighscoresCategory, HouseStatus, HouseType, TibiaResponse, VocationFilter,
};

/// Command line front end: fetches one Tibia.com page and prints it as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Also save each record and its fetch metadata under this directory
    #[arg(short, long, global = true)]
    output_dir: Option<String>,

    /// Overrides TIBIA_USER_AGENT
    #[arg(long, global = true)]
    user_agent: Option<String>,

    /// Request timeout in seconds, overrides TIBIA_TIMEOUT_SECS
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Assumed site cache lifetime in seconds, overrides TIBIA_CACHE_TTL_SECS
    #[arg(long, global = true)]
    cache_ttl: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// A character's page
    Character { name: String },
    /// A guild's page
    Guild { name: String },
    /// Every guild of a world
    Guilds { world: String },
    /// A world's page with its online players
    World { name: String },
    /// The overview of every world
    Worlds,
    /// A single house
    House { id: u32, world: String },
    /// The houses of a town
    Houses {
        world: String,
        town: String,
        /// List guildhalls instead of houses
        #[arg(long)]
        guildhalls: bool,
        /// Only "rented" or "auctioned" houses
        #[arg(long)]
        status: Option<String>,
    },
    /// A highscores page
    Highscores {
        /// Omit for every world
        #[arg(long)]
        world: Option<String>,
        /// Category id, 6 is experience
        #[arg(long, default_value_t = 6)]
        category: u32,
        /// Vocation id, 0 is every vocation
        #[arg(long, default_value_t = 0)]
        vocation: u32,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// A world's kill statistics
    Killstats { world: String },
    /// A single news article
    News { id: u32 },
    /// The news archive of the last days
    RecentNews {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    /// A tournament cycle
    Tournament { cycle: u32 },
    /// A page of the character bazaar
    Bazaar {
        /// Browse finished auctions instead of current ones
        #[arg(long)]
        history: bool,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// An auction's detail page
    Auction {
        id: u32,
        /// Follow every page of the item, mount and outfit lists
        #[arg(long)]
        fetch_all: bool,
    },
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(agent) = &self.user_agent {
            config.user_agent = agent.clone();
        }
        if let Some(secs) = self.timeout {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.cache_ttl {
            config.cache_ttl = Duration::from_secs(secs);
        }
        config
    }
}

fn emit<D: Serialize>(
    storage: Option<&StorageManager>,
    kind: &str,
    key: &str,
    response: &TibiaResponse<D>,
) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(response)?);
    if let Some(storage) = storage {
        storage.save_record(kind, key, &response.data)?;
        storage.save_metadata(kind, key, response)?;
    }
    tracing::info!("Done in {:?} (cached: {}, {}s left)", response.fetching_time, response.cached, response.seconds_left());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    logging::setup_logging();

    let args = Args::parse();
    tracing::debug!("Parsed arguments: {:?}", args);

    let client = Client::new(args.client_config())?;
    let storage = args.output_dir.as_ref().map(StorageManager::new).transpose()?;
    let storage = storage.as_ref();

    match &args.command {
        Command::Character { name } => emit(storage, "character", name, &client.fetch_character(name).await?),
        Command::Guild { name } => emit(storage, "guild", name, &client.fetch_guild(name).await?),
        Command::Guilds { world } => emit(storage, "guilds", world, &client.fetch_world_guilds(world).await?),
        Command::World { name } => emit(storage, "world", name, &client.fetch_world(name).await?),
        Command::Worlds => emit(storage, "worlds", "overview", &client.fetch_world_overview().await?),
        Command::House { id, world } => {
            emit(storage, "house", &format!("{}_{}", world, id), &client.fetch_house(*id, world).await?)
        }
        Command::Houses { world, town, guildhalls, status } => {
            let house_type = if *guildhalls { HouseType::Guildhall } else { HouseType::House };
            let status = status.as_deref().map(HouseStatus::from_label);
            if let Some(HouseStatus::Unknown(raw)) = &status {
                return Err(AppError::Config(format!("unknown house status '{}'", raw)));
            }
            let response = client.fetch_world_houses(world, town, &house_type, status.as_ref()).await?;
            emit(storage, "houses", &format!("{}_{}_{}", world, town, house_type), &response)
        }
        Command::Highscores { world, category, vocation, page } => {
            let category = HighscoresCategory::from_id(*category);
            let vocation = VocationFilter::from_id(*vocation);
            let response = client.fetch_highscores_page(world.as_deref(), &category, &vocation, *page).await?;
            let key = format!("{}_{}_{}_{}", world.as_deref().unwrap_or("all"), category, vocation, page);
            emit(storage, "highscores", &key, &response)
        }
        Command::Killstats { world } => emit(storage, "killstats", world, &client.fetch_kill_statistics(world).await?),
        Command::News { id } => emit(storage, "news", &id.to_string(), &client.fetch_news(*id).await?),
        Command::RecentNews { days } => {
            emit(storage, "news", &format!("recent_{}", days), &client.fetch_recent_news(*days).await?)
        }
        Command::Tournament { cycle } => {
            emit(storage, "tournament", &cycle.to_string(), &client.fetch_tournament(*cycle).await?)
        }
        Command::Bazaar { history, page } => {
            let bazaar_type = if *history { BazaarType::History } else { BazaarType::Current };
            let response = client.fetch_bazaar(&bazaar_type, *page, None).await?;
            emit(storage, "bazaar", &format!("{}_{}", bazaar_type, page), &response)
        }
        Command::Auction { id, fetch_all } => {
            emit(storage, "auction", &id.to_string(), &client.fetch_auction(*id, *fetch_all).await?)
        }
    }
}
