use clap::Parser;
use dreamlife::api::{Cli, Command, run_http_server, run_project_command};
use dreamlife::interaction_log::InteractionLog;
use dreamlife::logging::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let interaction_log = match cli.log_file.as_deref().map(InteractionLog::open).transpose() {
        Ok(log) => log,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(log) = &interaction_log {
        tracing::info!(path = %log.path().display(), "interaction log enabled");
    }

    match cli.command {
        Command::Serve { port } => {
            if let Err(e) = run_http_server(port, interaction_log).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Project(args) => match run_project_command(&args, interaction_log.as_ref()) {
            Ok(report) => print!("{report}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
    }
}
