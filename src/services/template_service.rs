//! Overlay template discovery, validation, and switching.
//!
//! A template is a folder under the templates root containing a
//! `template.html`. An optional `template.json` can declare metadata, in
//! particular the game key used to fetch its character roster.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::{
    dto::{template::TemplateInfo, validation::validate_template_name},
    error::ServiceError,
    services::{roster_service, sse_events},
    state::SharedState,
};

/// File a folder must contain to count as a template.
const TEMPLATE_ENTRY: &str = "template.html";
/// Optional per-template metadata file.
const TEMPLATE_META: &str = "template.json";

#[derive(Debug, Deserialize)]
struct TemplateMeta {
    game: Option<String>,
}

/// Scan the templates root for selectable templates, sorted by name.
pub fn list_templates(root: &Path) -> Vec<TemplateInfo> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };

    let mut templates: Vec<TemplateInfo> = entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            if !entry.path().join(TEMPLATE_ENTRY).is_file() {
                return None;
            }
            Some(TemplateInfo {
                game: template_game_key(root, &name),
                name,
            })
        })
        .collect();

    templates.sort_by(|a, b| a.name.cmp(&b.name));
    templates
}

/// Whether `name` maps to an existing template folder.
pub fn is_valid_template(root: &Path, name: &str) -> bool {
    validate_template_name(name).is_ok() && root.join(name).join(TEMPLATE_ENTRY).is_file()
}

/// Game key declared in the template's metadata, when present.
pub fn template_game_key(root: &Path, name: &str) -> Option<String> {
    let meta_path = root.join(name).join(TEMPLATE_META);
    let contents = std::fs::read_to_string(meta_path).ok()?;
    let meta: TemplateMeta = serde_json::from_str(&contents).ok()?;
    meta.game.filter(|key| !key.trim().is_empty())
}

/// Name of the active template, falling back to the configured default.
pub async fn active_template(state: &SharedState) -> String {
    state
        .store()
        .load()
        .await
        .active_template
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| state.config().default_template.clone())
}

/// List templates along with the currently active name.
pub async fn list(state: &SharedState) -> (Vec<TemplateInfo>, String) {
    let templates = list_templates(&state.config().templates_root);
    let active = active_template(state).await;
    (templates, active)
}

/// Switch the active template, then refresh its roster when needed.
///
/// Rejects unknown templates without mutating any state. After the switch a
/// roster fetch is triggered when the template declares a game key and its
/// artifact is missing, or when `force` is set.
pub async fn switch_template(
    state: &SharedState,
    name: &str,
    force: bool,
) -> Result<(), ServiceError> {
    let root = &state.config().templates_root;
    if !is_valid_template(root, name) {
        return Err(ServiceError::NotFound(format!("unknown template `{name}`")));
    }

    state
        .store()
        .mutate(|doc| doc.active_template = Some(name.to_string()))
        .await?;

    sse_events::broadcast_template_changed(state, name);
    info!(template = name, "switched active template");

    if let Some(key) = template_game_key(root, name) {
        roster_service::trigger_fetch(state, &key, force).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use futures::future::BoxFuture;
    use tempfile::TempDir;

    use super::*;
    use crate::{
        config::AppConfig,
        services::roster_service::{RosterError, RosterTask, TaskExit},
        services::sse_events::EVENT_TEMPLATE_CHANGED,
        state::AppState,
    };

    struct NoopTask;

    impl RosterTask for NoopTask {
        fn run(&self, _key: &str) -> BoxFuture<'static, Result<TaskExit, RosterError>> {
            Box::pin(async { Ok(TaskExit::Clean) })
        }
    }

    fn test_state(dir: &TempDir) -> SharedState {
        AppState::with_roster_task(
            AppConfig {
                data_file: dir.path().join("data.json"),
                templates_root: dir.path().join("templates"),
                characters_dir: dir.path().join("characters"),
                descriptor_file: dir.path().join("gamename.json"),
                ..AppConfig::default()
            },
            Arc::new(NoopTask),
        )
    }

    fn make_template(dir: &TempDir, name: &str, game: Option<&str>) {
        let folder = dir.path().join("templates").join(name);
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join(TEMPLATE_ENTRY), "<html></html>").unwrap();
        if let Some(game) = game {
            std::fs::write(
                folder.join(TEMPLATE_META),
                format!(r#"{{"game": "{game}"}}"#),
            )
            .unwrap();
        }
    }

    #[tokio::test]
    async fn listing_finds_only_real_templates_sorted() {
        let dir = TempDir::new().unwrap();
        make_template(&dir, "default", None);
        make_template(&dir, "dark", Some("tekken8"));
        // A folder without template.html is not a template.
        std::fs::create_dir_all(dir.path().join("templates").join("drafts")).unwrap();
        std::fs::write(dir.path().join("templates").join("notes.txt"), "x").unwrap();

        let templates = list_templates(&dir.path().join("templates"));
        assert_eq!(
            templates,
            vec![
                TemplateInfo {
                    name: "dark".to_string(),
                    game: Some("tekken8".to_string()),
                },
                TemplateInfo {
                    name: "default".to_string(),
                    game: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn listing_an_absent_root_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(list_templates(&dir.path().join("nowhere")).is_empty());
    }

    #[tokio::test]
    async fn switching_to_an_unknown_template_is_rejected_without_mutation() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        make_template(&dir, "default", None);

        state
            .store()
            .mutate(|doc| doc.active_template = Some("default".to_string()))
            .await
            .unwrap();

        let err = switch_template(&state, "missing", false).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(active_template(&state).await, "default");
    }

    #[tokio::test]
    async fn switching_persists_and_broadcasts() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        make_template(&dir, "default", None);
        make_template(&dir, "dark", None);
        let mut receiver = state.hub().subscribe();

        switch_template(&state, "dark", false).await.unwrap();
        assert_eq!(active_template(&state).await, "dark");

        let event = tokio::time::timeout(Duration::from_secs(1), receiver.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_TEMPLATE_CHANGED));
        assert!(event.data.contains("dark"));
    }

    #[tokio::test]
    async fn switching_triggers_a_fetch_when_the_artifact_is_missing() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        make_template(&dir, "dark", Some("tekken8"));

        switch_template(&state, "dark", false).await.unwrap();
        // The accepted fetch flipped the job state for its key.
        assert_eq!(state.roster().status().key, "tekken8");
    }

    #[tokio::test]
    async fn switching_skips_the_fetch_when_the_artifact_exists() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir);
        make_template(&dir, "dark", Some("tekken8"));

        let characters = dir.path().join("characters");
        std::fs::create_dir_all(&characters).unwrap();
        std::fs::write(
            roster_service::artifact_path(&characters, "tekken8"),
            br#"{"game": "tekken8", "characters": []}"#,
        )
        .unwrap();

        switch_template(&state, "dark", false).await.unwrap();
        assert_eq!(state.roster().status().key, "");
    }

    #[tokio::test]
    async fn path_traversal_names_are_never_valid() {
        let dir = TempDir::new().unwrap();
        make_template(&dir, "default", None);
        let root = dir.path().join("templates");
        assert!(!is_valid_template(&root, "../templates/default"));
        assert!(!is_valid_template(&root, ""));
        assert!(is_valid_template(&root, "default"));
    }
}
