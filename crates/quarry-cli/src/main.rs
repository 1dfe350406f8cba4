use clap::Parser;
use quarry_cli::{CliArgs, QuarryCli};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let result = match QuarryCli::from_args(&args) {
        Ok(cli) => cli.run(args).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
