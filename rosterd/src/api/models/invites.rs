//! API request/response models for invites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    db::models::invite_tokens::InviteTokenDBResponse,
    types::{InviteTokenId, UserId},
};

/// Where an invite currently is in its lifecycle. `Expired` is derived from
/// the clock at response time, not stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Consumed,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InviteCreate {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InviteResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: InviteTokenId,
    pub email: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "uuid")]
    pub created_by: UserId,
    pub status: InviteStatus,
}

impl From<InviteTokenDBResponse> for InviteResponse {
    fn from(db: InviteTokenDBResponse) -> Self {
        // Consumption wins over expiry, mirroring the validation ordering
        let status = if db.consumed_at.is_some() {
            InviteStatus::Consumed
        } else if db.expires_at <= Utc::now() {
            InviteStatus::Expired
        } else {
            InviteStatus::Pending
        };

        Self {
            id: db.id,
            email: db.email,
            token: db.token,
            expires_at: db.expires_at,
            consumed_at: db.consumed_at,
            created_at: db.created_at,
            created_by: db.created_by,
            status,
        }
    }
}

/// Response to creating an email invite. The acceptance URL is always
/// included so the admin can distribute it manually if email delivery is
/// down.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InviteCreatedResponse {
    pub invite: InviteResponse,
    pub invite_url: String,
}

/// Response to creating a generic (QR) invite.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QrInviteResponse {
    pub token: String,
    pub invite_url: String,
    /// Inline SVG markup for the QR code
    pub qr_svg: String,
}

/// `GET /invites/{token}/validate`: shown to the invitee before they commit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InviteValidationResponse {
    pub valid: bool,
    /// Target email; empty for generic invites
    pub email: String,
}

/// `POST /invites/{token}/consume`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InviteConsumedResponse {
    pub message: String,
}

/// `POST /invites/prune`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvitePruneResponse {
    /// How many expired, unconsumed invites were removed
    pub removed: u64,
}
