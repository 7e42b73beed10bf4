//! Scout Web Server
//!
//! A web interface for Scout - deep-research report generation.

use clap::Parser;
use scout_web::server::ScoutServerBuilder;
use scout_web::init_logging;

/// Scout Web Server - deep-research report generation service
#[derive(Parser)]
#[command(name = "scout-web")]
#[command(about = "A web interface for Scout")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Database URL for job storage
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    std::env::set_var(
        "RUST_LOG",
        format!(
            "scout_web={},scout_research={},tower_http=debug",
            args.log_level, args.log_level
        ),
    );
    init_logging();

    // Load environment variables
    dotenvy::dotenv().ok();

    if std::env::var("OPENAI_API_KEY").is_err()
        && std::env::var("ANTHROPIC_API_KEY").is_err()
        && std::env::var("GROQ_API_KEY").is_err()
    {
        println!("Warning: no LLM API key found (OPENAI_API_KEY, ANTHROPIC_API_KEY, or GROQ_API_KEY).");
        println!("The server will not start without one.");
    }

    let mut builder = ScoutServerBuilder::new()
        .host(args.host)
        .port(args.port)
        .dev_mode(args.dev);

    if let Some(database_url) = args.database_url {
        builder = builder.database_url(database_url);
    }

    let server = match builder.build().await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to initialize server: {}", e);
            std::process::exit(1);
        }
    };

    println!(
        "Scout web server running at http://{}",
        server.config().address()
    );

    if let Err(e) = server.start().await {
        eprintln!("Server exited with error: {}", e);
        std::process::exit(1);
    }
}
