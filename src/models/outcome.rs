use actix_web::http::StatusCode;
use serde::Serialize;

/// Domain result of a core operation, independent of transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Created,
    Ok,
    NotModified,
    NotFound,
    Conflict,
    Forbidden,
}

impl Outcome {
    pub fn status_code(self) -> StatusCode {
        match self {
            Outcome::Created => StatusCode::CREATED,
            Outcome::Ok => StatusCode::OK,
            Outcome::NotModified => StatusCode::NOT_MODIFIED,
            Outcome::NotFound => StatusCode::NOT_FOUND,
            Outcome::Conflict => StatusCode::CONFLICT,
            Outcome::Forbidden => StatusCode::FORBIDDEN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// New user, or key reissued to an unconfirmed one
    Registered,
    AlreadyConfirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    AlreadyConfirmed,
    UnknownUser,
    KeyMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    Assigned,
    AlreadyAssigned,
    UnknownUser,
    TagTaken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Recorded,
    Changed,
    Unchanged,
}

impl From<RegisterOutcome> for Outcome {
    fn from(outcome: RegisterOutcome) -> Self {
        match outcome {
            RegisterOutcome::Registered => Outcome::Created,
            RegisterOutcome::AlreadyConfirmed => Outcome::NotModified,
        }
    }
}

impl From<ConfirmOutcome> for Outcome {
    fn from(outcome: ConfirmOutcome) -> Self {
        match outcome {
            ConfirmOutcome::Confirmed => Outcome::Ok,
            ConfirmOutcome::AlreadyConfirmed => Outcome::NotModified,
            ConfirmOutcome::UnknownUser => Outcome::NotFound,
            ConfirmOutcome::KeyMismatch => Outcome::Forbidden,
        }
    }
}

impl From<AssignOutcome> for Outcome {
    fn from(outcome: AssignOutcome) -> Self {
        match outcome {
            AssignOutcome::Assigned => Outcome::Created,
            AssignOutcome::AlreadyAssigned => Outcome::Ok,
            AssignOutcome::UnknownUser => Outcome::NotFound,
            AssignOutcome::TagTaken => Outcome::Conflict,
        }
    }
}

impl From<VoteOutcome> for Outcome {
    fn from(outcome: VoteOutcome) -> Self {
        match outcome {
            VoteOutcome::Recorded => Outcome::Created,
            VoteOutcome::Changed => Outcome::Ok,
            VoteOutcome::Unchanged => Outcome::NotModified,
        }
    }
}
