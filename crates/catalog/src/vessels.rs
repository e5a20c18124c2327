/// Display names for the vessel keys used by the export pipeline.
const VESSEL_NAMES: &[(&str, &str)] = &[
    ("adventure", "HMS Adventure"),
    ("alligator", "Alligator"),
    ("astrolabe+zelee", "L'Astrolabe and Zélée"),
    ("beagle", "HMS Beagle"),
    ("belgica", "RV Belgica"),
    ("challenger", "HMS Challenger"),
    ("discovery", "HMS Discovery"),
    ("favorite", "La Favorite"),
    ("hecla", "HMS Hecla"),
    ("investigator", "HMS Investigator"),
    ("isabella", "Isabella"),
    ("naturaliste", "Naturaliste"),
    ("resolution", "HMS Resolution"),
    ("scoresby", "Scoresby"),
    ("vincennes", "USS Vincennes"),
];

pub fn known_vessel_name(vessel: &str) -> Option<&'static str> {
    VESSEL_NAMES
        .binary_search_by(|(key, _)| (*key).cmp(vessel))
        .ok()
        .map(|idx| VESSEL_NAMES[idx].1)
}

/// Known display name, or the raw key for vessels missing from the table.
pub fn vessel_display_name(vessel: &str) -> String {
    known_vessel_name(vessel)
        .map(str::to_string)
        .unwrap_or_else(|| vessel.to_string())
}
