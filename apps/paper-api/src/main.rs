use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = paper_api::Args::parse();

	paper_api::run(args).await
}
