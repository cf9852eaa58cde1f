//! Minesrace Backend Server
//!
//! Wires authentication, match coordination, and the leaderboard into a
//! single actix-web server over one shared PostgreSQL connection.
//!
//! ## Submodules
//!
//! - [`config`] — Environment-driven configuration
//! - [`matches`] — Match lifecycle and query view handlers
//! - [`leaderboard`] — Best-time ladder and replay handlers
//! - [`views`] — Entity-to-DTO conversion and error mapping

pub mod config;
pub mod leaderboard;
pub mod matches;
pub mod views;

pub use config::Config;

use msr_auth::Crypto;
use msr_auth::Member;
use msr_auth::Session;
use msr_database::PgErr;
use msr_database::migrate;
use msr_engine::Coordinator;
use msr_engine::Match;
use msr_engine::Seat;
use msr_engine::Step;
use msr_leaderboard::Entry;
use msr_leaderboard::Leaderboard;
use msr_leaderboard::Replay;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;
use tokio_postgres::Client;

async fn health(client: web::Data<Arc<Client>>) -> impl Responder {
    match client
        .execute("SELECT 1", &[])
        .await
        .inspect_err(|e| log::error!("health check failed: {}", e))
    {
        Ok(_) => HttpResponse::Ok().body("ok"),
        Err(_) => HttpResponse::ServiceUnavailable().body("database unavailable"),
    }
}

/// Applies every table's DDL, dependency order first.
async fn prepare(client: &Client) -> Result<(), PgErr> {
    migrate::<Member>(client).await?;
    migrate::<Session>(client).await?;
    migrate::<Match>(client).await?;
    migrate::<Seat>(client).await?;
    migrate::<Step>(client).await?;
    migrate::<Entry>(client).await?;
    migrate::<Replay>(client).await?;
    Ok(())
}

fn cors(origins: &[String]) -> Cors {
    if origins.iter().any(|o| o == "*") {
        Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allow_any_method()
            .allow_any_header()
    }
}

#[rustfmt::skip]
pub async fn run() -> Result<(), std::io::Error> {
    let config = Config::from_env();
    let client = msr_database::db().await;
    prepare(&client).await.expect("schema migration failed");
    let crypto = web::Data::new(Crypto::new(config.jwt_secret.as_bytes(), config.jwt_ttl()));
    let engine = web::Data::new(Coordinator::new(client.clone(), config.engine()));
    let ladder = web::Data::new(Leaderboard::new(client.clone(), config.leaderboard_top_n));
    let client = web::Data::new(client);
    let bind = config.bind_addr.clone();
    log::info!("starting minesrace server on {}", bind);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%r %s %Ts"))
            .wrap(cors(&config.cors_origins))
            .app_data(crypto.clone())
            .app_data(engine.clone())
            .app_data(ladder.clone())
            .app_data(client.clone())
            .route("/health", web::get().to(health))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(msr_auth::register))
                    .route("/logout", web::post().to(msr_auth::logout))
                    .route("/login", web::post().to(msr_auth::login))
                    .route("/me", web::get().to(msr_auth::me)),
            )
            .service(
                web::scope("/match")
                    .route("/create", web::post().to(matches::create))
                    .route("/recent", web::get().to(matches::recent))
                    .route("/active", web::get().to(matches::active))
                    .route("/{match_id}/join", web::post().to(matches::join))
                    .route("/{match_id}/ready", web::post().to(matches::ready))
                    .route("/{match_id}/start", web::post().to(matches::start))
                    .route("/{match_id}/step", web::post().to(matches::step))
                    .route("/{match_id}/finish", web::post().to(matches::finish))
                    .route("/{match_id}/leave", web::post().to(matches::leave))
                    .route("/{match_id}/state", web::get().to(matches::state))
                    .route("/{match_id}/steps", web::get().to(matches::steps))
                    .route("/{match_id}", web::delete().to(matches::leave)),
            )
            .service(
                web::scope("/leaderboard")
                    .route("/submit", web::post().to(leaderboard::submit))
                    .route("/list", web::get().to(leaderboard::list))
                    .route("/replay/{entry_id}", web::get().to(leaderboard::replay)),
            )
    })
    .workers(6)
    .bind(bind)?
    .run()
    .await
}
