//! HTTP handlers for leaderboard submission, listing, and replays.
use crate::views::*;
use msr_auth::Auth;
use msr_board::Difficulty;
use msr_core::ID;
use msr_core::Unique;
use msr_dto::*;
use msr_engine::EngineError;
use msr_leaderboard::Leaderboard;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;

pub async fn submit(
    ladder: web::Data<Leaderboard>,
    auth: Auth,
    req: web::Json<SubmitRequest>,
) -> impl Responder {
    let body = req.into_inner();
    let difficulty = match Difficulty::try_from(body.difficulty.as_str()) {
        Ok(d) => d,
        Err(e) => return HttpResponse::BadRequest().body(e),
    };
    if body.time_ms <= 0 {
        return HttpResponse::BadRequest().body("time_ms must be positive");
    }
    let replay = body.replay.map(|r| (r.board, r.steps));
    match ladder
        .submit(
            auth.user(),
            auth.claims().handle(),
            difficulty,
            body.time_ms,
            replay,
        )
        .await
    {
        Ok(improved) => HttpResponse::Ok().json(SubmitResponse { ok: true, improved }),
        Err(e) => fail(EngineError::from(e)),
    }
}

pub async fn list(
    ladder: web::Data<Leaderboard>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let difficulty = match query
        .get("difficulty")
        .map(|v| Difficulty::try_from(v.as_str()))
    {
        Some(Ok(d)) => d,
        Some(Err(e)) => return HttpResponse::BadRequest().body(e),
        None => Difficulty::default(),
    };
    let limit = query
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10i64)
        .clamp(1, 100);
    match ladder.ladder(difficulty, limit).await {
        Ok(entries) => HttpResponse::Ok().json(
            entries
                .iter()
                .map(|(entry, has_replay)| EntryView {
                    entry_id: entry.id().to_string(),
                    name: entry.handle().to_string(),
                    time_ms: entry.time_ms(),
                    created_at: millis(entry.created_at()),
                    has_replay: *has_replay,
                })
                .collect::<Vec<_>>(),
        ),
        Err(e) => fail(EngineError::from(e)),
    }
}

pub async fn replay(ladder: web::Data<Leaderboard>, path: web::Path<uuid::Uuid>) -> impl Responder {
    let id = ID::from(path.into_inner());
    match ladder.replay(id).await {
        Ok(Some((board, steps))) => HttpResponse::Ok().json(ReplayView { board, steps }),
        Ok(None) => HttpResponse::NotFound().body("replay not found"),
        Err(e) => fail(EngineError::from(e)),
    }
}
