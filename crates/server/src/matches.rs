//! HTTP handlers for the match lifecycle and its query views.
use crate::views::*;
use msr_auth::Auth;
use msr_auth::MaybeAuth;
use msr_core::ID;
use msr_core::Unique;
use msr_dto::*;
use msr_engine::Coordinator;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;

pub async fn create(
    engine: web::Data<Coordinator>,
    auth: Auth,
    req: web::Json<CreateMatchRequest>,
) -> impl Responder {
    match engine
        .create(auth.user(), auth.claims().handle(), req.difficulty.as_deref())
        .await
    {
        Ok((m, seat, token)) => HttpResponse::Ok().json(envelope(&m, &seat, token)),
        Err(e) => fail(e),
    }
}

pub async fn join(
    engine: web::Data<Coordinator>,
    auth: Auth,
    path: web::Path<uuid::Uuid>,
) -> impl Responder {
    let id = ID::from(path.into_inner());
    match engine
        .join(id, auth.user(), auth.claims().handle())
        .await
    {
        Ok((m, seat, token)) => HttpResponse::Ok().json(envelope(&m, &seat, token)),
        Err(e) => fail(e),
    }
}

pub async fn ready(
    engine: web::Data<Coordinator>,
    path: web::Path<uuid::Uuid>,
    req: web::Json<ReadyRequest>,
) -> impl Responder {
    let id = ID::from(path.into_inner());
    match engine.ready(id, &req.player_token, req.ready).await {
        Ok(()) => HttpResponse::Ok().json(OkResponse { ok: true }),
        Err(e) => fail(e),
    }
}

pub async fn start(
    engine: web::Data<Coordinator>,
    path: web::Path<uuid::Uuid>,
    req: web::Json<StartRequest>,
) -> impl Responder {
    let id = ID::from(path.into_inner());
    match engine.start(id, &req.player_token).await {
        Ok(m) => HttpResponse::Ok().json(StartResponse {
            status: m.status().to_string(),
            started_at: m.started_at().map(millis).unwrap_or_default(),
            countdown_secs: m.countdown_secs(),
        }),
        Err(e) => fail(e),
    }
}

pub async fn step(
    engine: web::Data<Coordinator>,
    path: web::Path<uuid::Uuid>,
    req: web::Json<StepRequest>,
) -> impl Responder {
    let id = ID::from(path.into_inner());
    match engine
        .step(id, &req.player_token, &req.action, req.x, req.y, req.elapsed_ms)
        .await
    {
        Ok(seq) => HttpResponse::Ok().json(StepResponse { seq }),
        Err(e) => fail(e),
    }
}

pub async fn finish(
    engine: web::Data<Coordinator>,
    path: web::Path<uuid::Uuid>,
    req: web::Json<FinishRequest>,
) -> impl Responder {
    let id = ID::from(path.into_inner());
    let body = req.into_inner();
    match engine
        .finish(
            id,
            &body.player_token,
            &body.outcome,
            body.duration_ms,
            body.steps_count,
            body.progress,
        )
        .await
    {
        Ok((m, rank)) => HttpResponse::Ok().json(FinishResponse {
            status: m.status().to_string(),
            rank,
        }),
        Err(e) => fail(e),
    }
}

pub async fn leave(
    engine: web::Data<Coordinator>,
    path: web::Path<uuid::Uuid>,
    req: web::Json<LeaveRequest>,
) -> impl Responder {
    let id = ID::from(path.into_inner());
    match engine.leave(id, &req.player_token).await {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "status": "deleted" })),
        Ok(false) => HttpResponse::Ok().json(serde_json::json!({ "status": "left" })),
        Err(e) => fail(e),
    }
}

pub async fn state(
    engine: web::Data<Coordinator>,
    auth: MaybeAuth,
    path: web::Path<uuid::Uuid>,
) -> impl Responder {
    let id = ID::from(path.into_inner());
    match engine.state(id).await {
        Ok((m, seats)) => HttpResponse::Ok().json(match_view(&m, &seats, auth.user())),
        Err(e) => fail(e),
    }
}

pub async fn steps(engine: web::Data<Coordinator>, path: web::Path<uuid::Uuid>) -> impl Responder {
    let id = ID::from(path.into_inner());
    match engine.steps(id).await {
        Ok(steps) => {
            HttpResponse::Ok().json(steps.iter().map(step_view).collect::<Vec<_>>())
        }
        Err(e) => fail(e),
    }
}

pub async fn recent(
    engine: web::Data<Coordinator>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let limit = query
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10i64)
        .clamp(1, 50);
    match engine.recent(limit).await {
        Ok(matches) => HttpResponse::Ok().json(
            matches
                .iter()
                .map(|(m, seats)| summary(m, seats))
                .collect::<Vec<_>>(),
        ),
        Err(e) => fail(e),
    }
}

pub async fn active(engine: web::Data<Coordinator>, auth: Auth) -> impl Responder {
    match engine.active(auth.user()).await {
        Ok(None) => HttpResponse::Ok().json(ActiveResponse::idle()),
        Ok(Some((m, seat))) => HttpResponse::Ok().json(ActiveResponse {
            active: true,
            match_id: Some(m.id().to_string()),
            player_id: Some(seat.id().to_string()),
            board: Some(board_of(&m)),
            status: Some(m.status().to_string()),
            host_id: Some(m.host().to_string()),
        }),
        Err(e) => fail(e),
    }
}
