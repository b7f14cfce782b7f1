use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Registration Service API",
        version = "1.0.0",
        description = "Event registration: sign-up with mailed confirmation key, NFC tag binding to contacts and per-tag votes.\n\nStatus codes carry the result of every operation (201 created, 200 changed, 304 nothing to do, 404 unknown, 409 tag taken)."
    ),
    paths(
        crate::api::health::health_check,
        crate::api::users::register,
        crate::api::users::confirm,
        crate::api::contacts::list_contacts,
        crate::api::contacts::assign_tag,
        crate::api::contacts::find_owner,
        crate::api::votes::record_vote,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::services::user_service::RegisterRequest,
            crate::services::user_service::ConfirmRequest,
            crate::services::vote_service::VoteRequest,
            crate::models::user::Contact,
        )
    ),
    tags(
        (name = "Users", description = "Registration and confirmation by email."),
        (name = "Contacts", description = "Confirmed contact list and NFC tag binding."),
        (name = "Votes", description = "Positive/negative feedback per tag."),
        (name = "Health", description = "Service and store status."),
    )
)]
pub struct ApiDoc;
