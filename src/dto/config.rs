use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request to change the configured listen port.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SetPortRequest {
    /// Desired port, valid range 1-65535. Applied on restart.
    #[validate(range(min = 1, max = 65535))]
    pub port: u32,
}

/// Response after a port change request.
#[derive(Debug, Serialize, ToSchema)]
pub struct SetPortResponse {
    /// Always true on success.
    pub ok: bool,
    /// Human-readable outcome.
    pub message: String,
    /// Port now stored in the document.
    pub port: u16,
}

impl SetPortResponse {
    /// The port was already set to this value.
    pub fn unchanged(port: u16) -> Self {
        Self {
            ok: true,
            message: "Port unchanged".to_string(),
            port,
        }
    }

    /// The port was saved and takes effect on restart.
    pub fn saved(port: u16) -> Self {
        Self {
            ok: true,
            message: "Port saved. Restart app to apply.".to_string(),
            port,
        }
    }
}
