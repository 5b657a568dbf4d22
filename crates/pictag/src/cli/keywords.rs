//! The `pictag keywords` command.

use std::path::PathBuf;

use clap::Args;
use pictag_core::{Config, Pictag};

#[derive(Args, Debug)]
pub struct KeywordsArgs {
    /// Image file to score against the keyword vocabulary
    #[arg(required = true)]
    pub input: PathBuf,
}

/// Prints the keywords as a JSON array on stdout.
pub async fn execute(args: KeywordsArgs, config: Config) -> anyhow::Result<()> {
    let pictag = Pictag::new(config);
    let keywords = pictag.keywords(&args.input).await?;

    tracing::debug!("{:?}: {:?}", args.input, keywords);
    println!("{}", serde_json::to_string(&keywords)?);
    Ok(())
}
