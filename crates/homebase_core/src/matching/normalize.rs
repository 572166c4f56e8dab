//! Text normalization and room synonym resolution.

use crate::model::room::Room;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Free-text phrases mapped to canonical rooms.
///
/// Keys are already normalized. Canonical names themselves are not listed;
/// they resolve through `Room::from_canonical`.
const ROOM_SYNONYMS: &[(&str, Room)] = &[
    ("living room", Room::Hall),
    ("main room", Room::Hall),
    ("master bedroom", Room::Bedroom),
    ("main bedroom", Room::Bedroom),
    ("other bedroom", Room::SecondBedroom),
    ("single bedroom", Room::SecondBedroom),
    ("small bedroom", Room::SecondBedroom),
];

/// Lowercases, trims and collapses inner whitespace runs to one space.
pub fn normalize_key(text: &str) -> String {
    WHITESPACE_RE
        .replace_all(text.trim(), " ")
        .to_lowercase()
}

/// Resolves free text to a canonical room.
///
/// Synonyms are consulted first, then the normalized text itself is tried as
/// a canonical name. Returns `None` (and logs a diagnostic) when neither
/// yields a known room; callers proceed without a room.
pub fn resolve_room(raw: &str) -> Option<Room> {
    let normalized = normalize_key(raw);
    if normalized.is_empty() {
        return None;
    }

    let resolved = ROOM_SYNONYMS
        .iter()
        .find(|(phrase, _)| *phrase == normalized)
        .map(|(_, room)| *room)
        .or_else(|| Room::from_canonical(&normalized));

    if resolved.is_none() {
        warn!(
            "event=room_discarded module=matching status=unresolved room_chars={}",
            normalized.chars().count()
        );
    }
    resolved
}
