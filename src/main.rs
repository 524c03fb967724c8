use crate::config::{AppConfig, Args};
use crate::db::{init_db, Database};
use crate::router::{respond, App};
use astra::Server;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod audit;
mod auth;
mod buyers;
mod config;
mod db;
mod domain;
mod errors;
mod handlers;
mod import;
mod responses;
mod router;
mod spreadsheets;
mod templates;

#[cfg(test)]
mod tests;

/// Stands in for a sign-in flow: creates the user if needed and prints a
/// cookie value that authenticates as them.
fn issue_session(db: &Database, email: &str) -> Result<String, errors::ServerError> {
    let now = handlers::now_unix();
    let email = email.trim().to_lowercase();
    db.with_conn(|conn| {
        let user_id = db::users::get_or_create_user(conn, &email, None, now)?;
        auth::create_session(conn, user_id, now)
    })
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "buyer_leads=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = match AppConfig::load(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let db = Database::new(config.database_path.clone());
    if let Err(e) = init_db(&db) {
        error!("database initialization failed: {e}");
        std::process::exit(1);
    }

    if let Some(email) = &args.issue_session {
        match issue_session(&db, email) {
            Ok(token) => println!("session={token}"),
            Err(e) => {
                error!("failed to issue session: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let addr = config.bind_addr;
    info!(%addr, workers = config.max_workers, db = %config.database_path, "starting server");

    let server = Server::bind(&addr).max_workers(config.max_workers);
    let app = App { db, config };

    let result = server.serve(move |req, _info| respond(req, &app));

    if let Err(e) = result {
        error!("server ended with error: {e}");
    }

    info!("server shut down");
}
