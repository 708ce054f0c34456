use clap::Parser;
use opsgate::Commands;

#[derive(Parser)]
#[command(name = "opsgate")]
#[command(about = "Operator tooling for the opsgate session and scaling core", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Logging failures must not block operator commands
    if let Err(e) = opsgate_utils::init(&cli.command.log_level("warn")) {
        eprintln!("failed to initialise logging: {e}");
    }

    let stdout = std::io::stdout();
    cli.command.execute(&mut stdout.lock())
}
