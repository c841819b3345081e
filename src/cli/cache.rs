//! CLI handler for the search result cache.

use anyhow::Result;

use crate::cache::{AssetCache, SearchCache};
use crate::cli::args::{CacheCliArgs, CacheCommand};
use crate::config::Config;

pub fn handle_cache_command(args: CacheCliArgs) -> Result<()> {
    let config = Config::load()?;
    let path = config.cache.search_file_path()?;

    match args.command {
        CacheCommand::Show => {
            let cache = SearchCache::load(&path)?;
            if cache.is_empty() {
                println!("No cached searches in {}.", path.display());
                return Ok(());
            }

            println!("Found {} cached search(es):\n", cache.len());
            for (query, entry) in cache.entries() {
                println!(
                    "{:<24} {:>2} result(s)  fetched {}",
                    query,
                    entry.videos.len(),
                    entry.fetched_display()
                );
            }
        }
        CacheCommand::Clear { assets } => {
            let mut cache = SearchCache::load(&path)?;
            if cache.clear()? {
                println!("Removed {}", path.display());
            } else {
                println!("Search cache is already empty.");
            }

            if assets {
                let store = AssetCache::new(config.cache.asset_dir_path()?);
                let removed = store.clear()?;
                println!(
                    "Removed {} cached asset(s) from {}",
                    removed,
                    store.dir().display()
                );
            }
        }
        CacheCommand::Path => println!("{}", path.display()),
    }

    Ok(())
}
