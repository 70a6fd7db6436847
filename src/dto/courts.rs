use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::Zone,
    dao::models::{CourtEntity, RefereeEntity},
    dto::{
        matches::MatchSummary,
        validation::{validate_court_id, validate_not_blank},
    },
};

/// Payload registering a court.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateCourtRequest {
    /// Slug such as `court-7`.
    #[validate(custom(function = "validate_court_id"))]
    pub id: String,
    /// Display name.
    #[validate(length(min = 1, max = 64), custom(function = "validate_not_blank"))]
    pub name: String,
}

/// Assign (or with `null`, unassign) the referee of a court.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRefereeRequest {
    /// Referee to put in charge; `null` leaves the court without one.
    pub referee_id: Option<Uuid>,
}

/// Payload registering a referee.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateRefereeRequest {
    /// Display name.
    #[validate(length(min = 1, max = 64), custom(function = "validate_not_blank"))]
    pub name: String,
}

/// Referee as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RefereeSummary {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Court the referee is currently assigned to.
    pub court_id: Option<String>,
}

impl RefereeSummary {
    /// Pair a referee with the court it is assigned to.
    pub fn new(referee: RefereeEntity, court_id: Option<String>) -> Self {
        Self {
            id: referee.id,
            name: referee.name,
            court_id,
        }
    }
}

/// Court as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourtSummary {
    /// Slug identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Referee in charge, if any.
    pub referee_id: Option<Uuid>,
    /// Name of that referee.
    pub referee_name: Option<String>,
}

impl CourtSummary {
    /// Resolve the referee name of `court`.
    pub fn new(court: CourtEntity, referee: Option<&RefereeEntity>) -> Self {
        Self {
            id: court.id,
            name: court.name,
            referee_id: court.referee_id,
            referee_name: referee.map(|referee| referee.name.clone()),
        }
    }
}

/// What is happening on a court: the match being played and the ones waiting.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourtView {
    /// The court itself.
    pub court: CourtSummary,
    /// Match currently being played.
    pub live_match: Option<MatchSummary>,
    /// Upcoming matches in queue order.
    pub queue: Vec<MatchSummary>,
}

/// Configured zone.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ZoneSummary {
    /// Zone identifier teams register with.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl From<&Zone> for ZoneSummary {
    fn from(value: &Zone) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
        }
    }
}
