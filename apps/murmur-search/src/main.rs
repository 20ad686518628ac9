use clap::Parser;

use murmur_search::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	murmur_search::run(args).await
}
