//! Portcullis Server - Main entry point
//!
//! Serves the blog API with every route gated by entity access rules.

use clap::Parser;
use std::path::PathBuf;

use portcullis_core::{
    api::{self, AppState},
    blog::{Article, Comment},
    config::Config,
    identity::{Staff, User, UserDirectory, UserId},
    telemetry,
};

#[derive(Debug, Parser)]
#[command(name = "portcullis-server", version, about = "Access-gated blog API")]
struct Args {
    /// Configuration file; environment variables take precedence over it
    #[arg(short, long, env = "PORTCULLIS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Start without the demo users and articles
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("Warning: Could not load config: {}. Using defaults.", e);
            Config::default()
        }),
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    telemetry::init_logging(&config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Portcullis Server"
    );

    let users = UserDirectory::new();
    let state = AppState::new(users).with_user_header(config.server.user_header_name()?);
    if !args.no_seed {
        seed(&state);
    }

    let app = api::build_router(state);

    let addr = config.server.address();
    tracing::info!(address = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Demo users covering each staff capability, plus one article of each kind.
fn seed(state: &AppState) {
    state.users.insert(User::new("alice").with_staff(Staff::author()));
    state.users.insert(User::new("erin").with_staff(Staff::editor()));
    state.users.insert(User::new("mod").with_staff(Staff::moderator()));
    state.users.insert(User::new("bob"));

    let public = Article::new(UserId::new("alice"), "Welcome", "Anyone can read this.");
    let members = Article::new(UserId::new("alice"), "Members only", "Sign in to read this.")
        .registered_only();

    let comment = Comment::new(public.id, UserId::new("bob"), "First!");
    state.articles.insert(public.id, Article { comment_count: 1, ..public });
    state.comments.insert(comment.id, comment);
    state.articles.insert(members.id, members);

    tracing::info!(
        users = 4,
        articles = state.articles.len(),
        comments = state.comments.len(),
        "Seeded demo data"
    );
}

/// Wait for shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
