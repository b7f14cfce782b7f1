pub mod contacts;
pub mod health;
pub mod swagger;
pub mod users;
pub mod votes;

use actix_web::{error, web, HttpResponse};
use std::sync::Arc;

use crate::{
    database::RecordStore,
    models::Outcome,
    services::{ContactDirectory, Notifier, TagAssignmentRegistry, UserRegistry, VoteLedger},
    utils::ServiceError,
};

/// Registries shared by every worker, built once around one store
#[derive(Clone)]
pub struct AppState {
    store: web::Data<dyn RecordStore>,
    users: web::Data<UserRegistry>,
    tags: web::Data<TagAssignmentRegistry>,
    contacts: web::Data<ContactDirectory>,
    votes: web::Data<VoteLedger>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            users: web::Data::new(UserRegistry::new(store.clone(), notifier)),
            tags: web::Data::new(TagAssignmentRegistry::new(store.clone())),
            contacts: web::Data::new(ContactDirectory::new(store.clone())),
            votes: web::Data::new(VoteLedger::new(store.clone())),
            store: web::Data::from(store),
        }
    }

    /// Registers app data and routes
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.store.clone())
            .app_data(self.users.clone())
            .app_data(self.tags.clone())
            .app_data(self.contacts.clone())
            .app_data(self.votes.clone())
            .app_data(json_config())
            .route("/health", web::get().to(health::health_check))
            .route("/users", web::post().to(users::register))
            .route("/users", web::put().to(users::confirm))
            .route("/contacts", web::get().to(contacts::list_contacts))
            .route("/contact/{email}/{tag_id}", web::put().to(contacts::assign_tag))
            .route("/contact/{tag_id}", web::get().to(contacts::find_owner))
            .route("/vote", web::post().to(votes::record_vote));
    }
}

/// Malformed JSON bodies answer 400 with the usual error envelope
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = err.to_string();
        log::warn!("⚠️  Rejected request body: {}", message);
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "error": message
            })),
        )
        .into()
    })
}

/// Status from the outcome, JSON envelope naming it
pub(crate) fn outcome_response(outcome: Outcome) -> HttpResponse {
    HttpResponse::build(outcome.status_code()).json(serde_json::json!({
        "success": !matches!(outcome, Outcome::NotFound | Outcome::Conflict | Outcome::Forbidden),
        "result": outcome
    }))
}

pub(crate) fn error_response(e: &ServiceError) -> HttpResponse {
    log::error!("❌ {}", e);
    HttpResponse::InternalServerError().json(serde_json::json!({
        "success": false,
        "error": e.to_string()
    }))
}
