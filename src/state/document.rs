//! Typed representation of the shared scoreboard document.
//!
//! Every section is optional so controllers can submit partial shapes, and
//! unknown keys pass through opaquely so newer UIs do not break older servers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

/// One competitor slot on the overlay.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlayerCard {
    /// Display name.
    pub name: Option<String>,
    /// External identifier (bracket seed, startgg id, ...).
    pub id: Option<String>,
    /// Clan or sponsor tag shown next to the name.
    pub clan: Option<String>,
    /// Win/loss record for the running set, e.g. `2-1`.
    pub wl: Option<String>,
    /// Current score, never negative.
    pub score: Option<u32>,
    /// Selected character for the active game.
    pub character: Option<String>,
    /// Image reference: a path, URL, or inline data URL.
    pub img: Option<String>,
    /// Unknown keys carried through untouched.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: IndexMap<String, Value>,
}

/// One team slot for crew battles or team events.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TeamCard {
    /// Team name.
    pub name: Option<String>,
    /// Current score, never negative.
    pub score: Option<u32>,
    /// Image reference: a path, URL, or inline data URL.
    pub img: Option<String>,
    /// Unknown keys carried through untouched.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: IndexMap<String, Value>,
}

/// Commentator info shown on the caster bar.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CasterCard {
    /// Display name.
    pub name: Option<String>,
    /// Twitch handle.
    pub twitch: Option<String>,
    /// Twitter handle.
    pub twitter: Option<String>,
    /// Unknown keys carried through untouched.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: IndexMap<String, Value>,
}

/// The shared scoreboard document mirrored to all overlays.
///
/// `port` and `active_template` are server-owned: client updates flow through
/// [`crate::dao::document_store::DocumentStore::save_preserving`], which
/// copies them back from the persisted document no matter what the client
/// submitted. Their dedicated operations are the only write paths.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Document {
    /// First player slot.
    pub player1: Option<PlayerCard>,
    /// Second player slot.
    pub player2: Option<PlayerCard>,
    /// First team slot.
    pub team1: Option<TeamCard>,
    /// Second team slot.
    pub team2: Option<TeamCard>,
    /// Event stage text, e.g. `Winners Finals`.
    pub stage: Option<String>,
    /// Match type text, e.g. `Best of 5`.
    pub match_type: Option<String>,
    /// Free text shown in the top bar.
    pub toptext: Option<String>,
    /// First commentator.
    pub caster1: Option<CasterCard>,
    /// Second commentator.
    pub caster2: Option<CasterCard>,
    /// Overlay UI scale factor.
    pub ui_scale: Option<f64>,
    /// Manual character override applied by the controller.
    pub char_override: Option<String>,
    /// Listen port, valid range 1-65535; applied on restart.
    pub port: Option<u16>,
    /// Name of the active overlay template folder.
    pub active_template: Option<String>,
    /// Unknown top-level keys carried through untouched.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: IndexMap<String, Value>,
}

impl Document {
    /// Copy each named key from `current` over this document when present there.
    ///
    /// Server-owned fields always win over whatever a client submitted; keys
    /// outside the typed shape are preserved through the opaque extras map.
    pub fn preserve_from(&mut self, current: &Document, keys: &[String]) {
        for key in keys {
            match key.as_str() {
                "port" => {
                    if let Some(port) = current.port {
                        self.port = Some(port);
                    }
                }
                "active_template" => {
                    if let Some(template) = &current.active_template {
                        self.active_template = Some(template.clone());
                    }
                }
                other => {
                    if let Some(value) = current.extra.get(other) {
                        self.extra.insert(other.to_string(), value.clone());
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preserved() -> Vec<String> {
        vec!["port".to_string(), "active_template".to_string()]
    }

    #[test]
    fn unknown_keys_survive_a_round_trip() {
        let raw = r##"{
            "player1": {"name": "Alice", "score": 1, "custom_flag": true},
            "theme_accent": "#ff00aa"
        }"##;
        let doc: Document = serde_json::from_str(raw).unwrap();

        assert_eq!(doc.player1.as_ref().unwrap().name.as_deref(), Some("Alice"));
        assert_eq!(
            doc.player1.as_ref().unwrap().extra.get("custom_flag"),
            Some(&serde_json::json!(true))
        );
        assert_eq!(
            doc.extra.get("theme_accent"),
            Some(&serde_json::json!("#ff00aa"))
        );

        let reparsed: Document =
            serde_json::from_str(&serde_json::to_string(&doc).unwrap()).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn absent_sections_are_omitted_from_json() {
        let doc = Document {
            stage: Some("Pools".to_string()),
            ..Document::default()
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json, serde_json::json!({"stage": "Pools"}));
    }

    #[test]
    fn preserve_from_overrides_client_supplied_config_keys() {
        let current = Document {
            port: Some(9000),
            active_template: Some("default".to_string()),
            ..Document::default()
        };
        let mut update = Document {
            port: Some(1234),
            ..Document::default()
        };

        update.preserve_from(&current, &preserved());
        assert_eq!(update.port, Some(9000));
        assert_eq!(update.active_template.as_deref(), Some("default"));
    }

    #[test]
    fn preserve_from_skips_keys_missing_in_current() {
        let current = Document::default();
        let mut update = Document {
            port: Some(1234),
            ..Document::default()
        };

        update.preserve_from(&current, &preserved());
        // Nothing to preserve yet, the client value stands.
        assert_eq!(update.port, Some(1234));
    }

    #[test]
    fn preserve_from_handles_extra_map_keys() {
        let mut current = Document::default();
        current
            .extra
            .insert("license".to_string(), serde_json::json!("pro"));

        let mut update = Document::default();
        update.preserve_from(&current, &["license".to_string()]);
        assert_eq!(update.extra.get("license"), Some(&serde_json::json!("pro")));
    }

    #[test]
    fn negative_scores_are_rejected_at_the_boundary() {
        let raw = r#"{"player1": {"name": "Bob", "score": -1}}"#;
        assert!(serde_json::from_str::<Document>(raw).is_err());
    }
}
