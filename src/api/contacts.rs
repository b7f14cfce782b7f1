use actix_web::{web, HttpResponse};

use crate::{
    api::{error_response, outcome_response},
    models::{Contact, Outcome},
    services::{ContactDirectory, TagAssignmentRegistry},
};

#[utoipa::path(
    get,
    path = "/contacts",
    tag = "Contacts",
    responses(
        (status = 200, description = "Confirmed users", body = [Contact])
    )
)]
pub async fn list_contacts(directory: web::Data<ContactDirectory>) -> HttpResponse {
    match directory.list_contacts().await {
        Ok(contacts) => {
            log::info!("📋 GET /contacts - {} contacts", contacts.len());
            HttpResponse::Ok().json(contacts)
        }
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    put,
    path = "/contact/{email}/{tag_id}",
    tag = "Contacts",
    params(
        ("email" = String, Path, description = "Registered email"),
        ("tag_id" = String, Path, description = "NFC tag identifier")
    ),
    responses(
        (status = 201, description = "Tag bound to the user"),
        (status = 200, description = "Tag was already bound to this user"),
        (status = 404, description = "No user with this email"),
        (status = 409, description = "Tag belongs to another user")
    )
)]
pub async fn assign_tag(
    registry: web::Data<TagAssignmentRegistry>,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (email, tag_id) = path.into_inner();
    log::info!("🏷️  PUT /contact/{}/{}", email, tag_id);

    match registry.assign(&email, &tag_id).await {
        Ok(outcome) => outcome_response(Outcome::from(outcome)),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/contact/{tag_id}",
    tag = "Contacts",
    params(
        ("tag_id" = String, Path, description = "NFC tag identifier")
    ),
    responses(
        (status = 200, description = "Owner of the tag", body = Contact),
        (status = 404, description = "Tag not bound to anyone")
    )
)]
pub async fn find_owner(
    registry: web::Data<TagAssignmentRegistry>,
    tag_id: web::Path<String>,
) -> HttpResponse {
    match registry.find_owner(&tag_id).await {
        Ok(Some(contact)) => HttpResponse::Ok().json(contact),
        Ok(None) => outcome_response(Outcome::NotFound),
        Err(e) => error_response(&e),
    }
}
