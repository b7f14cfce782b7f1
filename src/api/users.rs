use actix_web::{web, HttpResponse};

use crate::{
    api::{error_response, outcome_response},
    models::Outcome,
    services::{ConfirmRequest, RegisterRequest, UserRegistry},
};

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered, or confirmation key reissued; welcome mail sent"),
        (status = 304, description = "Already confirmed; deny mail sent"),
        (status = 400, description = "Malformed body")
    )
)]
pub async fn register(
    registry: web::Data<UserRegistry>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    log::info!("📝 POST /users - email: {}", request.email);

    match registry.register(&request.email, &request.name).await {
        Ok(outcome) => outcome_response(Outcome::from(outcome)),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    put,
    path = "/users",
    tag = "Users",
    request_body = ConfirmRequest,
    responses(
        (status = 200, description = "Confirmed; information mail sent"),
        (status = 304, description = "Already confirmed"),
        (status = 403, description = "Key does not match the last issued key"),
        (status = 404, description = "No registration for this email")
    )
)]
pub async fn confirm(
    registry: web::Data<UserRegistry>,
    request: web::Json<ConfirmRequest>,
) -> HttpResponse {
    log::info!("✉️  PUT /users - email: {}", request.email);

    match registry.confirm(&request.email, &request.key).await {
        Ok(outcome) => outcome_response(Outcome::from(outcome)),
        Err(e) => error_response(&e),
    }
}
