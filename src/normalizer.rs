// 🗺️ State Name Normalizer
// Exact-match table of known spelling variants → canonical state name
//
// Lookup is case-sensitive: only the case variants listed below are folded.

/// Known variant → canonical pairs seen in the UIDAI extracts
pub const STATE_VARIANTS: &[(&str, &str)] = &[
    // West Bengal
    ("WEST BENGAL", "West Bengal"),
    ("WESTBENGAL", "West Bengal"),
    ("West  Bengal", "West Bengal"),
    ("West bengal", "West Bengal"),
    ("Westbengal", "West Bengal"),
    ("west Bengal", "West Bengal"),
    ("West Bangal", "West Bengal"),
    // Odisha (Orissa is the old name)
    ("ODISHA", "Odisha"),
    ("odisha", "Odisha"),
    ("Orissa", "Odisha"),
    ("Andaman & Nicobar Islands", "Andaman and Nicobar Islands"),
    ("andhra pradesh", "Andhra Pradesh"),
    ("Dadra & Nagar Haveli", "Dadra and Nagar Haveli"),
    ("Daman & Diu", "Daman and Diu"),
    ("Jammu & Kashmir", "Jammu and Kashmir"),
    ("Tamilnadu", "Tamil Nadu"),
    ("Chhatisgarh", "Chhattisgarh"),
    // Renamed states
    ("Uttaranchal", "Uttarakhand"),
    ("Pondicherry", "Puducherry"),
];

/// Canonical form of a non-null state name: trimmed, then mapped if it is a known variant
pub fn canonical_state(name: &str) -> String {
    let trimmed = name.trim();

    STATE_VARIANTS
        .iter()
        .find(|(variant, _)| *variant == trimmed)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Normalize an optional state cell. Missing values pass through untouched.
pub fn normalize_state(state: Option<&str>) -> Option<String> {
    state.map(canonical_state)
}
