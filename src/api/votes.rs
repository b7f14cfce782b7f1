use actix_web::{web, HttpResponse};

use crate::{
    api::{error_response, outcome_response},
    models::Outcome,
    services::{VoteLedger, VoteRequest},
};

#[utoipa::path(
    post,
    path = "/vote",
    tag = "Votes",
    request_body = VoteRequest,
    responses(
        (status = 201, description = "First vote for this tag"),
        (status = 200, description = "Sentiment changed"),
        (status = 304, description = "Same sentiment as the stored vote")
    )
)]
pub async fn record_vote(ledger: web::Data<VoteLedger>, request: web::Json<VoteRequest>) -> HttpResponse {
    let vote = request.into_inner();

    match ledger
        .record_vote(&vote.tag_id, &vote.mac, vote.is_positive, vote.timestamp)
        .await
    {
        Ok(outcome) => outcome_response(Outcome::from(outcome)),
        Err(e) => error_response(&e),
    }
}
