//! The fixed color palette for category visuals.

/// The colors assigned to categories by rank, repeating once exhausted.
///
/// Order matters: the top-ranked category always gets the first color, so the
/// biggest slice of the pie chart and the top bar in the list share a color.
pub const CATEGORY_COLORS: [&str; 11] = [
    "#e74c3c", "#27ae60", "#f1c40f", "#6aa8ff", "#8e44ad", "#ff9800", "#00bcd4", "#cddc39",
    "#ff4081", "#34495e", "#7f8c8d",
];

/// The color for the category ranked `rank` (zero-based).
pub fn color_for_rank(rank: usize) -> &'static str {
    CATEGORY_COLORS[rank % CATEGORY_COLORS.len()]
}
