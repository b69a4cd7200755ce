//! Orchestration of scoreboard updates, resets, and the port setting.

use tracing::info;

use crate::{
    error::ServiceError,
    services::{change_audit, sse_events},
    state::{SharedState, document::Document},
};

/// Outcome of a port change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortOutcome {
    /// The document already carried this port.
    Unchanged(u16),
    /// The port was saved; it takes effect on restart.
    Saved(u16),
}

/// Apply a client-submitted document update.
///
/// Any attempt to set `active_template` is stripped (that change must go
/// through the template switch operation), the merge preserves the configured
/// server-owned keys, the merged document is broadcast, and the change audit
/// is logged. Returns the document as persisted.
pub async fn apply_update(
    state: &SharedState,
    mut update: Document,
) -> Result<Document, ServiceError> {
    update.active_template = None;

    let prev = state.store().load().await;
    let merged = state
        .store()
        .save_preserving(update, state.config().preserved_keys())
        .await?;

    sse_events::broadcast_scoreboard(state, &merged);
    audit_change(&prev, &merged);
    Ok(merged)
}

/// Clear both player sections, leaving everything else untouched.
pub async fn reset_players(state: &SharedState) -> Result<Document, ServiceError> {
    reset_with(state, |doc| {
        doc.player1 = None;
        doc.player2 = None;
    })
    .await
}

/// Clear both team sections, leaving everything else untouched.
pub async fn reset_teams(state: &SharedState) -> Result<Document, ServiceError> {
    reset_with(state, |doc| {
        doc.team1 = None;
        doc.team2 = None;
    })
    .await
}

/// Clear the whole scoreboard, keeping server-owned and UI-level keys.
pub async fn reset_all(state: &SharedState) -> Result<Document, ServiceError> {
    reset_with(state, |doc| {
        *doc = Document {
            ui_scale: doc.ui_scale,
            char_override: doc.char_override.take(),
            port: doc.port,
            active_template: doc.active_template.take(),
            ..Document::default()
        };
    })
    .await
}

/// Store a new listen port; the change applies on the next restart.
pub async fn set_port(state: &SharedState, port: u16) -> Result<PortOutcome, ServiceError> {
    let current = state.store().load().await.port;
    if current == Some(port) {
        return Ok(PortOutcome::Unchanged(port));
    }

    state.store().mutate(|doc| doc.port = Some(port)).await?;
    info!(port, "port updated in document (restart to apply)");
    Ok(PortOutcome::Saved(port))
}

/// Make sure the document carries a valid port and an active template,
/// writing defaults when either is missing. Returns the effective port.
pub async fn ensure_defaults(state: &SharedState) -> Result<u16, ServiceError> {
    let doc = state.store().load().await;

    let port_missing = validated_port(&doc).is_none();
    let template_missing = doc
        .active_template
        .as_deref()
        .is_none_or(|t| t.trim().is_empty());

    if !port_missing && !template_missing {
        return Ok(validated_port(&doc).unwrap_or(state.config().default_port));
    }

    let default_port = state.config().default_port;
    let default_template = state.config().default_template.clone();
    let updated = state
        .store()
        .mutate(move |doc| {
            if validated_port(doc).is_none() {
                doc.port = Some(default_port);
            }
            if doc
                .active_template
                .as_deref()
                .is_none_or(|t| t.trim().is_empty())
            {
                doc.active_template = Some(default_template);
            }
        })
        .await?;

    if port_missing {
        info!(port = default_port, "no valid port in document; set to default");
    }
    if template_missing {
        info!(
            template = %state.config().default_template,
            "no active template found; set to default"
        );
    }
    Ok(validated_port(&updated).unwrap_or(default_port))
}

async fn reset_with<F>(state: &SharedState, apply: F) -> Result<Document, ServiceError>
where
    F: FnOnce(&mut Document),
{
    let mut prev = Document::default();
    let merged = state
        .store()
        .mutate(|doc| {
            prev = doc.clone();
            apply(doc);
        })
        .await?;

    sse_events::broadcast_scoreboard(state, &merged);
    audit_change(&prev, &merged);
    Ok(merged)
}

fn audit_change(prev: &Document, curr: &Document) {
    let audit = change_audit::diff(prev, curr);
    if !audit.is_empty() {
        info!("broadcast update \u{2192} {audit}");
    }
}

fn validated_port(doc: &Document) -> Option<u16> {
    doc.port.filter(|&p| p >= 1)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::{
        config::AppConfig,
        services::sse_events::EVENT_SCOREBOARD_UPDATED,
        state::{AppState, document::PlayerCard},
    };

    fn test_state(dir: &TempDir) -> SharedState {
        AppState::new(AppConfig {
            data_file: dir.path().join("data.json"),
            templates_root: dir.path().join("templates"),
            characters_dir: dir.path().join("characters"),
            descriptor_file: dir.path().join("gamename.json"),
            ..AppConfig::default()
        })
    }

    fn player(name: &str, score: u32) -> PlayerCard {
        PlayerCard {
            name: Some(name.to_string()),
            score: Some(score),
            ..PlayerCard::default()
        }
    }

    #[tokio::test]
    async fn update_preserves_server_owned_keys_end_to_end() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        state
            .store()
            .save(&Document {
                player1: Some(player("Bob", 0)),
                port: Some(8008),
                ..Document::default()
            })
            .await
            .unwrap();

        let merged = apply_update(
            &state,
            Document {
                player1: Some(player("Alice", 1)),
                port: Some(1234),
                ..Document::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(merged.player1.as_ref().unwrap().name.as_deref(), Some("Alice"));
        assert_eq!(merged.player1.as_ref().unwrap().score, Some(1));
        assert_eq!(merged.port, Some(8008));

        let persisted = state.store().load().await;
        assert_eq!(persisted, merged);
    }

    #[tokio::test]
    async fn update_cannot_smuggle_a_template_switch() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        state
            .store()
            .save(&Document {
                active_template: Some("default".to_string()),
                ..Document::default()
            })
            .await
            .unwrap();

        let merged = apply_update(
            &state,
            Document {
                active_template: Some("evil".to_string()),
                ..Document::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(merged.active_template.as_deref(), Some("default"));
    }

    #[tokio::test]
    async fn update_broadcasts_the_merged_document() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        let mut receiver = state.hub().subscribe();

        apply_update(
            &state,
            Document {
                player1: Some(player("Alice", 1)),
                ..Document::default()
            },
        )
        .await
        .unwrap();

        let event = tokio::time::timeout(Duration::from_secs(1), receiver.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_SCOREBOARD_UPDATED));
        assert!(event.data.contains("Alice"));
    }

    #[tokio::test]
    async fn reset_players_leaves_teams_alone() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        state
            .store()
            .save(&Document {
                player1: Some(player("Alice", 1)),
                team1: Some(crate::state::document::TeamCard {
                    name: Some("Red".to_string()),
                    ..Default::default()
                }),
                ..Document::default()
            })
            .await
            .unwrap();

        let doc = reset_players(&state).await.unwrap();
        assert!(doc.player1.is_none());
        assert!(doc.team1.is_some());
    }

    #[tokio::test]
    async fn reset_all_keeps_config_and_ui_keys() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        state
            .store()
            .save(&Document {
                player1: Some(player("Alice", 1)),
                stage: Some("Top 8".to_string()),
                ui_scale: Some(1.5),
                char_override: Some("Ryu".to_string()),
                port: Some(9000),
                active_template: Some("dark".to_string()),
                ..Document::default()
            })
            .await
            .unwrap();

        let doc = reset_all(&state).await.unwrap();
        assert!(doc.player1.is_none());
        assert!(doc.stage.is_none());
        assert_eq!(doc.ui_scale, Some(1.5));
        assert_eq!(doc.char_override.as_deref(), Some("Ryu"));
        assert_eq!(doc.port, Some(9000));
        assert_eq!(doc.active_template.as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn set_port_reports_unchanged_and_saved() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        assert_eq!(
            set_port(&state, 9000).await.unwrap(),
            PortOutcome::Saved(9000)
        );
        assert_eq!(
            set_port(&state, 9000).await.unwrap(),
            PortOutcome::Unchanged(9000)
        );
        assert_eq!(state.store().load().await.port, Some(9000));
    }

    #[tokio::test]
    async fn ensure_defaults_fills_missing_config_keys() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);

        let port = ensure_defaults(&state).await.unwrap();
        assert_eq!(port, state.config().default_port);

        let doc = state.store().load().await;
        assert_eq!(doc.port, Some(state.config().default_port));
        assert_eq!(doc.active_template.as_deref(), Some("default"));

        // Existing values survive a second pass.
        state
            .store()
            .mutate(|doc| doc.port = Some(9000))
            .await
            .unwrap();
        assert_eq!(ensure_defaults(&state).await.unwrap(), 9000);
    }
}
