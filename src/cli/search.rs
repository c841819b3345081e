//! CLI handler for listing search results without rendering.

use anyhow::Result;

use crate::app::Pipeline;
use crate::cli::args::SearchCliArgs;
use crate::config::Config;

pub async fn handle_search_command(args: SearchCliArgs) -> Result<()> {
    let config = Config::load()?;
    let mut pipeline = Pipeline::from_config(&config)?;

    let options = pipeline
        .find_options(&args.query, args.media, args.format, args.cache_only)
        .await?;

    if options.is_empty() {
        println!("No media found for '{}'.", args.query);
        return Ok(());
    }

    println!("\nAvailable Options:");
    for (index, option) in options.iter().enumerate() {
        println!("{}. {}", index + 1, option.label());
        println!("   {}", option.download_url);
    }

    println!(
        "\nTo build a reel from one of these, use: reelgen make --query \"{}\" --pick <N>",
        args.query
    );

    Ok(())
}
