use clap::Parser;
use ems_api::built_info;
use rocket::{error, info};

#[derive(Parser)]
#[command(name = "ems-api", version, about = "Multi-tenant employee management API server")]
struct Cli {
    /// Print version, build time and git commit, then exit
    #[arg(long)]
    version_info: bool,
}

fn build_summary() -> String {
    let commit = built_info::GIT_COMMIT_HASH.unwrap_or("unknown");
    format!(
        "ems-api {} (built {}, commit {})",
        built_info::PKG_VERSION,
        built_info::BUILT_TIME_UTC,
        commit
    )
}

#[rocket::main]
async fn main() {
    let cli = Cli::parse();
    if cli.version_info {
        println!("{}", build_summary());
        return;
    }

    info!("Starting {}", build_summary());
    if let Ok(dir) = std::env::current_dir() {
        info!("Working directory: {}", dir.display());
    }

    if let Err(e) = ems_api::rocket().launch().await {
        error!("Server stopped with an error: {}", e);
        std::process::exit(1);
    }
}
