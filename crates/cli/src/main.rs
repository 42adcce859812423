use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bookden", about = "Book review platform API", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Load demo users, books, and reviews before serving
        #[arg(long)]
        seed: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Command::Serve { seed } = cli.command.unwrap_or(Command::Serve { seed: false });

    bookden_app::run(seed).await
}
