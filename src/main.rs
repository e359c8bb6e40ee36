use anyhow::{Result, bail};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wholphin::backends::jellyfin::dto::{GetItemsRequest, SortOrder};
use wholphin::constants::CARD_IMAGE_HEIGHT;
use wholphin::models::LibraryId;
use wholphin::pager::{ItemsRequestHandler, letter_position};
use wholphin::{ApiRequestPager, BaseItemKind, Config, JellyfinApi};

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file; defaults to the user config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Library or folder to list; the whole server when omitted
    #[arg(short, long)]
    parent: Option<String>,

    /// Override the configured page size
    #[arg(long)]
    page_size: Option<u32>,

    /// Number of items to print
    #[arg(short, long, default_value_t = 20)]
    limit: usize,

    /// Also print where the first item starting with this letter sits
    #[arg(long)]
    find_letter: Option<char>,

    /// Print poster urls next to each item
    #[arg(long)]
    images: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    use clap::Parser;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wholphin=info")),
        )
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    let config = Config::load_from(&config_path)?;
    if config.server.url.is_empty() {
        bail!("No server configured, set [server] url in {:?}", config_path);
    }

    let api = Arc::new(JellyfinApi::from_config(&config.server, &config.network)?);
    info!("Browsing {}", api.base_url());

    let request = GetItemsRequest {
        parent_id: args.parent.map(LibraryId::new),
        recursive: Some(true),
        include_item_types: vec![BaseItemKind::Movie, BaseItemKind::Series],
        sort_by: vec!["SortName".to_string()],
        sort_order: Some(SortOrder::Ascending),
        fields: vec!["SortName".to_string(), "PrimaryImageAspectRatio".to_string()],
        ..Default::default()
    };

    let mut paging = config.paging.clone();
    if let Some(page_size) = args.page_size {
        paging.page_size = page_size;
    }

    let pager = ApiRequestPager::builder(Arc::clone(&api), request.clone(), ItemsRequestHandler)
        .paging(&paging)
        .build()?;

    let total = pager.init().await?;
    println!("{} items", total);

    for index in 0..total.min(args.limit) {
        match pager.get_blocking(index).await? {
            Some(item) => {
                println!("{:>6}  {} [{}]", index, item.title(), item.kind);
                if args.images
                    && let Some(image) = item.primary_image()
                {
                    println!("        {}", api.image_url(&image, CARD_IMAGE_HEIGHT)?);
                }
            }
            None => println!("{:>6}  <missing>", index),
        }
    }

    if let Some(letter) = args.find_letter {
        let position = letter_position(&api, &request, letter).await?;
        println!("'{}' starts at index {}", letter, position);
    }

    Ok(())
}
