use clap::Parser;

use shipit::{PromptEngine, Ship, ShipOptions, SystemRunner};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "shipit")]
#[command(version = VERSION)]
#[command(about = "Build, upload, and archive iOS releases")]
struct Cli {
    /// Workspace (.xcworkspace) file to use to build app
    #[arg(short, long, value_name = "WORKSPACE")]
    workspace: Option<String>,

    /// Project (.xcodeproj) file to use to build app
    #[arg(short, long, value_name = "PROJECT")]
    project: Option<String>,

    /// Scheme used to build app
    #[arg(short, long, value_name = "SCHEME")]
    scheme: String,

    /// Configuration used to build [default: Release]
    #[arg(short, long, value_name = "CONFIGURATION")]
    configuration: Option<String>,

    /// Upload build to iTunes Connect
    #[arg(long)]
    upload: bool,

    /// Copy the Xcode archive into the working directory
    #[arg(long)]
    archive: bool,

    /// Print extra progress information
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let opts = ShipOptions {
        workspace: cli.workspace,
        project: cli.project,
        scheme: cli.scheme,
        configuration: cli.configuration.unwrap_or_default(),
        upload: cli.upload,
        archive: cli.archive,
        verbose: cli.verbose,
    };

    let runner = SystemRunner;
    match Ship::new(opts, &runner, PromptEngine::new()).run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error [{}]: {}", e.code(), e);
            std::process::ExitCode::from(e.exit_code())
        }
    }
}
