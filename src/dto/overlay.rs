use serde::Serialize;
use utoipa::ToSchema;

/// Acknowledgement returned by update and reset operations.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateAck {
    /// Always true; failures surface as error responses instead.
    pub success: bool,
}

impl UpdateAck {
    /// Acknowledge a completed operation.
    pub fn ok() -> Self {
        Self { success: true }
    }
}
