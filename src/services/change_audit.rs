//! Human-readable diff between two scoreboard documents.
//!
//! Pure functions: given the same inputs the output is identical, section
//! order is fixed, and `diff(d, d)` is always the empty string. Values are
//! display-normalized so inline image payloads never reach the logs.

use crate::state::document::{CasterCard, Document, PlayerCard, TeamCard};

/// Rendered stand-in for an empty or absent value.
const PLACEHOLDER: &str = "none";
/// Strings longer than this are truncated with an ellipsis.
const MAX_DISPLAY_LEN: usize = 40;
/// Separator between per-section change descriptions.
const SECTION_SEPARATOR: &str = " \u{2022} ";

/// Build the ordered concatenation of all per-section changes between `prev`
/// and `curr`, or the empty string when nothing tracked changed.
pub fn diff(prev: &Document, curr: &Document) -> String {
    let mut lines: Vec<String> = Vec::new();

    push_nonempty(
        &mut lines,
        diff_player("Player 1", prev.player1.as_ref(), curr.player1.as_ref()),
    );
    push_nonempty(
        &mut lines,
        diff_player("Player 2", prev.player2.as_ref(), curr.player2.as_ref()),
    );
    push_nonempty(
        &mut lines,
        diff_team("Team 1", prev.team1.as_ref(), curr.team1.as_ref()),
    );
    push_nonempty(
        &mut lines,
        diff_team("Team 2", prev.team2.as_ref(), curr.team2.as_ref()),
    );

    if let Some(change) = change_str("Event Stage", prev.stage.as_deref(), curr.stage.as_deref()) {
        lines.push(change);
    }
    if let Some(change) = change_str(
        "Match Type",
        prev.match_type.as_deref(),
        curr.match_type.as_deref(),
    ) {
        lines.push(change);
    }
    if let Some(change) = change_str("Top Text", prev.toptext.as_deref(), curr.toptext.as_deref()) {
        lines.push(change);
    }

    push_nonempty(
        &mut lines,
        diff_caster("Caster 1", prev.caster1.as_ref(), curr.caster1.as_ref()),
    );
    push_nonempty(
        &mut lines,
        diff_caster("Caster 2", prev.caster2.as_ref(), curr.caster2.as_ref()),
    );

    if let Some(change) = change_f64("UI scale", prev.ui_scale, curr.ui_scale) {
        lines.push(change);
    }
    if let Some(change) = change_str(
        "Active template",
        prev.active_template.as_deref(),
        curr.active_template.as_deref(),
    ) {
        lines.push(change);
    }

    lines.join(SECTION_SEPARATOR)
}

/// Coarse one-line summary of a document, used for the startup banner and as
/// the degraded fallback for the audit line.
pub fn summarize(doc: &Document) -> String {
    let mut parts: Vec<String> = Vec::new();

    if doc.player1.is_some() || doc.player2.is_some() {
        let empty = PlayerCard::default();
        let p1 = doc.player1.as_ref().unwrap_or(&empty);
        let p2 = doc.player2.as_ref().unwrap_or(&empty);
        parts.push(format!(
            "Players: {} {} vs {} {}",
            display_str(p1.name.as_deref()),
            p1.score.unwrap_or(0),
            display_str(p2.name.as_deref()),
            p2.score.unwrap_or(0),
        ));
    }

    if doc.team1.is_some() || doc.team2.is_some() {
        let empty = TeamCard::default();
        let t1 = doc.team1.as_ref().unwrap_or(&empty);
        let t2 = doc.team2.as_ref().unwrap_or(&empty);
        parts.push(format!(
            "Teams: {} {} vs {} {}",
            display_str(t1.name.as_deref()),
            t1.score.unwrap_or(0),
            display_str(t2.name.as_deref()),
            t2.score.unwrap_or(0),
        ));
    }

    if let Some(stage) = doc.stage.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("Event Stage: {stage}"));
    }
    if let Some(match_type) = doc.match_type.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("Match Type: {match_type}"));
    }
    if let Some(toptext) = doc.toptext.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("Top text: {toptext}"));
    }

    if parts.is_empty() {
        "empty scoreboard state".to_string()
    } else {
        parts.join(SECTION_SEPARATOR)
    }
}

fn push_nonempty(lines: &mut Vec<String>, line: String) {
    if !line.is_empty() {
        lines.push(line);
    }
}

fn diff_player(title: &str, prev: Option<&PlayerCard>, curr: Option<&PlayerCard>) -> String {
    let empty = PlayerCard::default();
    let prev = prev.unwrap_or(&empty);
    let curr = curr.unwrap_or(&empty);

    let parts: Vec<String> = [
        change_str("Name", prev.name.as_deref(), curr.name.as_deref()),
        change_str("Clan Tag", prev.clan.as_deref(), curr.clan.as_deref()),
        change_str("W/L", prev.wl.as_deref(), curr.wl.as_deref()),
        change_u32("Score", prev.score, curr.score),
        change_str(
            "Character",
            prev.character.as_deref(),
            curr.character.as_deref(),
        ),
        change_str("Img", prev.img.as_deref(), curr.img.as_deref()),
    ]
    .into_iter()
    .flatten()
    .collect();

    render_section(title, parts)
}

fn diff_team(title: &str, prev: Option<&TeamCard>, curr: Option<&TeamCard>) -> String {
    let empty = TeamCard::default();
    let prev = prev.unwrap_or(&empty);
    let curr = curr.unwrap_or(&empty);

    let parts: Vec<String> = [
        change_str("Name", prev.name.as_deref(), curr.name.as_deref()),
        change_u32("Score", prev.score, curr.score),
        change_str("Img", prev.img.as_deref(), curr.img.as_deref()),
    ]
    .into_iter()
    .flatten()
    .collect();

    render_section(title, parts)
}

fn diff_caster(title: &str, prev: Option<&CasterCard>, curr: Option<&CasterCard>) -> String {
    let empty = CasterCard::default();
    let prev = prev.unwrap_or(&empty);
    let curr = curr.unwrap_or(&empty);

    let parts: Vec<String> = [
        change_str("Name", prev.name.as_deref(), curr.name.as_deref()),
        change_str("Twitch", prev.twitch.as_deref(), curr.twitch.as_deref()),
        change_str("Twitter", prev.twitter.as_deref(), curr.twitter.as_deref()),
    ]
    .into_iter()
    .flatten()
    .collect();

    render_section(title, parts)
}

fn render_section(title: &str, parts: Vec<String>) -> String {
    if parts.is_empty() {
        String::new()
    } else {
        format!("{title} {}", parts.join(", "))
    }
}

/// Raw values decide whether a change is reported; displays only render it.
fn change_str(label: &str, prev: Option<&str>, curr: Option<&str>) -> Option<String> {
    if prev == curr {
        return None;
    }
    Some(format!(
        "{label}: {} \u{2192} {}",
        display_str(prev),
        display_str(curr)
    ))
}

fn change_u32(label: &str, prev: Option<u32>, curr: Option<u32>) -> Option<String> {
    if prev == curr {
        return None;
    }
    Some(format!(
        "{label}: {} \u{2192} {}",
        display_num(prev),
        display_num(curr)
    ))
}

fn change_f64(label: &str, prev: Option<f64>, curr: Option<f64>) -> Option<String> {
    if prev == curr {
        return None;
    }
    Some(format!(
        "{label}: {} \u{2192} {}",
        display_num(prev),
        display_num(curr)
    ))
}

fn display_num<T: std::fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(n) => n.to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

/// Make a string value log-friendly: empty becomes the placeholder, inline
/// image payloads become a short descriptor, paths shrink to their final
/// component, and anything long is truncated.
fn display_str(value: Option<&str>) -> String {
    let Some(s) = value.filter(|s| !s.is_empty()) else {
        return PLACEHOLDER.to_string();
    };

    if let Some(descriptor) = describe_data_url(s) {
        return descriptor;
    }

    if s.starts_with("blob:") {
        return "custom image (blob)".to_string();
    }

    if s.contains('/') || s.contains('\\') {
        let trimmed = s.trim_end_matches(['/', '\\']);
        let base = trimmed
            .rsplit(['/', '\\'])
            .next()
            .filter(|b| !b.is_empty());
        return match base {
            Some(base) => truncate(base),
            None => truncate(s),
        };
    }

    truncate(s)
}

/// Reduce a `data:` URL to its name hint or a descriptor derived from the
/// MIME type; never the payload itself.
fn describe_data_url(s: &str) -> Option<String> {
    let rest = s.strip_prefix("data:")?;
    let (meta, _payload) = rest.split_once(',')?;

    let mut mime = "";
    let mut name = None;
    for (index, part) in meta.split(';').enumerate() {
        if index == 0 {
            mime = part;
        } else if let Some(hint) = part.strip_prefix("name=") {
            name = Some(hint);
        }
    }

    if let Some(hint) = name.filter(|n| !n.is_empty()) {
        return Some(hint.to_string());
    }

    let mime = mime.to_ascii_lowercase();
    let ext = match mime.as_str() {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/svg+xml" => "svg",
        "image/webp" => "webp",
        "image/gif" => "gif",
        "" => "?",
        other => other,
    };
    Some(format!("custom image ({ext})"))
}

fn truncate(s: &str) -> String {
    if s.chars().count() <= MAX_DISPLAY_LEN {
        s.to_string()
    } else {
        let head: String = s.chars().take(MAX_DISPLAY_LEN - 3).collect();
        format!("{head}\u{2026}")
    }
}
