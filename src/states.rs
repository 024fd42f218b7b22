//! Static registry of U.S. states and the coarse touring regions the
//! dashboard groups them into.
//!
//! Lookup tables only, no I/O. Region membership is checked in
//! declaration order and the first group that lists a state wins, so a
//! state appearing in both "East Coast" and "South" is reported as
//! "East Coast".

/// USPS code and display name for every state plus DC.
pub const STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("DC", "District of Columbia"),
];

/// Touring regions offered by the region filter. Order matters, see the
/// module docs.
pub const REGION_GROUPS: &[(&str, &[&str])] = &[
    (
        "East Coast",
        &[
            "ME", "NH", "MA", "RI", "CT", "NY", "NJ", "PA", "DE", "MD", "DC", "VA", "NC",
            "SC", "GA", "FL",
        ],
    ),
    ("West", &["CA", "OR", "WA", "AK", "HI"]),
    (
        "South",
        &[
            "TX", "OK", "AR", "LA", "MS", "AL", "TN", "KY", "GA", "FL", "SC", "NC", "VA",
            "WV", "MD", "DC", "DE",
        ],
    ),
    ("Mountain", &["AZ", "NM", "CO", "UT", "NV", "ID", "MT", "WY"]),
];

/// Group name for states outside every region group.
pub const OTHER_GROUP: &str = "Other";

/// Row order of the region/season heatmap.
pub const HEATMAP_REGION_ORDER: [&str; 4] = ["East Coast", "Mountain", "South", "West"];

/// Full display name for a USPS code, if known.
pub fn state_name(code: &str) -> Option<&'static str> {
    STATES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Touring region group of a state code; `"Other"` when unlisted.
pub fn region_group(code: &str) -> &'static str {
    for (group, members) in REGION_GROUPS {
        if members.contains(&code) {
            return group;
        }
    }
    OTHER_GROUP
}

/// Member states of a region group; empty for unknown groups.
pub fn region_members(group: &str) -> &'static [&'static str] {
    REGION_GROUPS
        .iter()
        .find(|(g, _)| *g == group)
        .map(|(_, members)| *members)
        .unwrap_or(&[])
}
