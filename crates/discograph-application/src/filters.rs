// SPDX-License-Identifier: GPL-3.0-or-later
//! Pure predicates over `(primary_type, secondary_types)` and `status` —
//! the *decide* half of the orchestrator (§4.6, §9 Design Notes). No store
//! or adapter call belongs in this module; every function here is a plain
//! boolean fold over already-loaded data so it can be unit-tested without a
//! database.

use discograph_domain::{AlbumType, ReleaseGroup, ReleaseStatus};

/// Whether a single named album type matches a release group's raw upstream
/// primary/secondary type pair. `primary_type` is deliberately matched as a
/// string, not an enum, since upstream emits combinations this catalog only
/// names a subset of.
pub fn album_type_matches(album_type: AlbumType, primary_type: Option<&str>, secondary_types: &[String]) -> bool {
    let has_secondary = |name: &str| secondary_types.iter().any(|s| s.eq_ignore_ascii_case(name));
    let primary_is = |name: &str| primary_type.is_some_and(|p| p.eq_ignore_ascii_case(name));

    match album_type {
        AlbumType::Studio => primary_is("Album") && secondary_types.is_empty(),
        AlbumType::Live => has_secondary("Live"),
        AlbumType::Compilation => has_secondary("Compilation"),
        AlbumType::Soundtrack => has_secondary("Soundtrack"),
        AlbumType::Remix => has_secondary("Remix"),
        AlbumType::DjMix => has_secondary("DJ-mix"),
        AlbumType::Mixtape => secondary_types.iter().any(|s| s.to_ascii_lowercase().contains("mixtape")),
        AlbumType::Demo => has_secondary("Demo"),
        AlbumType::Spokenword => has_secondary("Spokenword"),
        AlbumType::Interview => has_secondary("Interview"),
        AlbumType::Audiobook => has_secondary("Audiobook"),
        AlbumType::AudioDrama => has_secondary("Audio drama"),
        AlbumType::FieldRecording => has_secondary("Field recording"),
        AlbumType::Ep => primary_is("EP"),
        AlbumType::Single => primary_is("Single"),
        AlbumType::Broadcast => primary_is("Broadcast"),
        AlbumType::Other => primary_type.is_none() || primary_is("Other"),
    }
}

/// A release group survives the configured album-type filter if *any*
/// selected predicate matches (§4.6). An empty `configured` list means no
/// type was ever selected, so nothing passes — the caller is expected to
/// seed a sane default (`["Album", "EP"]`, per `FetchTypesConfig::default`).
pub fn release_group_passes(release_group: &ReleaseGroup, configured: &[AlbumType]) -> bool {
    configured.iter().any(|album_type| {
        album_type_matches(
            *album_type,
            release_group.primary_type.as_deref(),
            &release_group.secondary_types,
        )
    })
}

/// A release survives the configured release-status filter if its status is
/// in the configured set, or it carries no status at all (upstream is
/// sometimes silent on status; we don't want to drop a release for lack of
/// an opinion).
pub fn release_status_passes(status: Option<ReleaseStatus>, configured: &[ReleaseStatus]) -> bool {
    match status {
        Some(status) => configured.contains(&status),
        None => true,
    }
}

/// Parses the user-facing type names from `FetchTypesConfig` into the typed
/// catalog, silently dropping names this version doesn't recognize rather
/// than failing startup over a config typo.
pub fn parse_album_types(names: &[String]) -> Vec<AlbumType> {
    names.iter().filter_map(|name| album_type_from_name(name)).collect()
}

pub fn parse_release_statuses(names: &[String]) -> Vec<ReleaseStatus> {
    names.iter().filter_map(|name| release_status_from_name(name)).collect()
}

fn album_type_from_name(name: &str) -> Option<AlbumType> {
    Some(match name {
        "Studio" => AlbumType::Studio,
        "Live" => AlbumType::Live,
        "Compilation" => AlbumType::Compilation,
        "Soundtrack" => AlbumType::Soundtrack,
        "Remix" => AlbumType::Remix,
        "DJ-mix" => AlbumType::DjMix,
        "Mixtape" => AlbumType::Mixtape,
        "Demo" => AlbumType::Demo,
        "Spokenword" => AlbumType::Spokenword,
        "Interview" => AlbumType::Interview,
        "Audiobook" => AlbumType::Audiobook,
        "Audio drama" => AlbumType::AudioDrama,
        "Field recording" => AlbumType::FieldRecording,
        "EP" => AlbumType::Ep,
        "Single" => AlbumType::Single,
        "Broadcast" => AlbumType::Broadcast,
        "Other" => AlbumType::Other,
        _ => return None,
    })
}

fn release_status_from_name(name: &str) -> Option<ReleaseStatus> {
    Some(match name {
        "Official" => ReleaseStatus::Official,
        "Promotion" => ReleaseStatus::Promotion,
        "Bootleg" => ReleaseStatus::Bootleg,
        "Pseudo-Release" => ReleaseStatus::PseudoRelease,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rg(primary_type: Option<&str>, secondary_types: &[&str]) -> ReleaseGroup {
        ReleaseGroup {
            id: discograph_domain::ReleaseGroupId::new(),
            title: "Test".to_string(),
            disambiguation: None,
            primary_type: primary_type.map(str::to_string),
            secondary_types: secondary_types.iter().map(|s| s.to_string()).collect(),
            first_release_date: None,
            artist_credit: Vec::new(),
            aliases: Vec::new(),
            tags: Vec::new(),
            genres: Vec::new(),
            rating: None,
            overview: None,
            access_count: 0,
            last_accessed_at: None,
            last_updated_at: chrono::Utc::now(),
            ttl_expires_at: None,
        }
    }

    #[test]
    fn studio_requires_album_primary_type_and_no_secondary_types() {
        assert!(album_type_matches(AlbumType::Studio, Some("Album"), &[]));
        assert!(!album_type_matches(AlbumType::Studio, Some("Album"), &["Live".to_string()]));
        assert!(!album_type_matches(AlbumType::Studio, Some("EP"), &[]));
    }

    #[test]
    fn live_is_a_secondary_type_regardless_of_primary_type() {
        assert!(album_type_matches(AlbumType::Live, Some("Album"), &["Live".to_string()]));
        assert!(!album_type_matches(AlbumType::Live, Some("Album"), &[]));
    }

    #[test]
    fn a_studio_filter_rejects_a_live_secondary_type() {
        let release_group = rg(Some("Album"), &["Live"]);
        assert!(!release_group_passes(&release_group, &[AlbumType::Studio]));
    }

    #[test]
    fn any_configured_predicate_matching_is_enough() {
        let release_group = rg(Some("EP"), &[]);
        assert!(release_group_passes(&release_group, &[AlbumType::Studio, AlbumType::Ep]));
    }

    #[test]
    fn release_status_passes_an_unset_status() {
        assert!(release_status_passes(None, &[ReleaseStatus::Official]));
    }

    #[test]
    fn release_status_rejects_a_status_outside_the_configured_set() {
        assert!(!release_status_passes(Some(ReleaseStatus::Bootleg), &[ReleaseStatus::Official]));
    }

    #[test]
    fn parse_album_types_drops_unrecognized_names() {
        let parsed = parse_album_types(&["Studio".to_string(), "Nonsense".to_string()]);
        assert_eq!(parsed, vec![AlbumType::Studio]);
    }
}
