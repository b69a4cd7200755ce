use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::validation::validate_template_name;

/// Request to switch the active overlay template.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SetTemplateRequest {
    /// Folder name of the template to activate.
    #[validate(custom(function = validate_template_name))]
    pub template: String,
    /// Refetch the roster even when the artifact already exists.
    #[serde(default)]
    pub force: bool,
}

/// Response after switching the active template.
#[derive(Debug, Serialize, ToSchema)]
pub struct SetTemplateResponse {
    /// Always true on success.
    pub ok: bool,
}

/// One selectable template with its derivable metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TemplateInfo {
    /// Folder name under the templates root.
    pub name: String,
    /// Game key declared in the template's metadata, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<String>,
}

/// Listing of available templates and the currently active one.
#[derive(Debug, Serialize, ToSchema)]
pub struct TemplateListResponse {
    /// Every template folder containing a `template.html`.
    pub templates: Vec<TemplateInfo>,
    /// Name of the active template.
    pub active: String,
}
