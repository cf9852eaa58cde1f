use super::*;
use msr_core::ID;
use msr_core::Unique;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use std::sync::Arc;
use tokio_postgres::Client;

fn millis(t: std::time::SystemTime) -> i64 {
    t.duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn info(member: &Member) -> UserInfo {
    UserInfo {
        id: member.id().to_string(),
        handle: member.handle().to_string(),
        created_at: millis(member.created_at()),
    }
}

pub async fn register(
    db: web::Data<Arc<Client>>,
    tokens: web::Data<Crypto>,
    req: web::Json<RegisterRequest>,
) -> impl Responder {
    if req.handle.len() < 3 || req.handle.len() > 32 {
        return HttpResponse::BadRequest().body("handle must be 3-32 characters");
    }
    if req.password.len() < 8 {
        return HttpResponse::BadRequest().body("password must be at least 8 characters");
    }
    match db.exists(&req.handle).await {
        Ok(false) => {}
        Ok(true) => return HttpResponse::Conflict().body("handle already exists"),
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    }
    let hashword = match password::hash(&req.password) {
        Ok(h) => h,
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };
    let member = Member::new(
        ID::default(),
        req.handle.clone(),
        std::time::SystemTime::now(),
    );
    if let Err(e) = db.create(&member, &hashword).await {
        return HttpResponse::InternalServerError().body(e.to_string());
    }
    let token_hash = Crypto::hash(&format!("{}", member.id()));
    let session = Session::new(ID::default(), member.id(), token_hash, tokens.duration());
    if let Err(e) = db.signin(&session).await {
        return HttpResponse::InternalServerError().body(e.to_string());
    }
    let claims = Claims::new(
        member.id(),
        session.id(),
        member.handle().to_string(),
        tokens.duration(),
    );
    let token = match tokens.encode(&claims) {
        Ok(t) => t,
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };
    HttpResponse::Ok().json(AuthResponse {
        token,
        user: info(&member),
    })
}

pub async fn login(
    db: web::Data<Arc<Client>>,
    tokens: web::Data<Crypto>,
    req: web::Json<LoginRequest>,
) -> impl Responder {
    let (member, hashword) = match db.lookup(&req.handle).await {
        Ok(Some(row)) => row,
        Ok(None) => return HttpResponse::Unauthorized().body("invalid credentials"),
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };
    if !password::verify(&req.password, &hashword) {
        return HttpResponse::Unauthorized().body("invalid credentials");
    }
    let token_hash = Crypto::hash(&format!("{}", member.id()));
    let session = Session::new(ID::default(), member.id(), token_hash, tokens.duration());
    if let Err(e) = db.signin(&session).await {
        return HttpResponse::InternalServerError().body(e.to_string());
    }
    let claims = Claims::new(
        member.id(),
        session.id(),
        member.handle().to_string(),
        tokens.duration(),
    );
    let token = match tokens.encode(&claims) {
        Ok(t) => t,
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };
    HttpResponse::Ok().json(AuthResponse {
        token,
        user: info(&member),
    })
}

pub async fn logout(db: web::Data<Arc<Client>>, auth: Auth) -> impl Responder {
    match db.revoke(auth.claims().session()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({"status": "logged_out"})),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

pub async fn me(db: web::Data<Arc<Client>>, auth: Auth) -> impl Responder {
    match db.fetch(auth.user()).await {
        Ok(Some(member)) => HttpResponse::Ok().json(info(&member)),
        Ok(None) => HttpResponse::NotFound().body("user not found"),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}
