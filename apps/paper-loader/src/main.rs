use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = paper_loader::Args::parse();

	paper_loader::run(args).await
}
