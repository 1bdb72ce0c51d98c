//! Tier Palette

/// Colors offered for tiers, in the order new tiers pick them
pub const TIER_COLORS: [&str; 14] = [
    "#FF7F7F", "#FFBF7F", "#FFDF7F", "#FFFF7F", "#BFFF7F", "#7FFF7F", "#7FFFFF", "#7FBFFF", "#7F7FFF", "#BF7FFF",
    "#FF7FFF", "#FF7FBF", "#BFBFBF", "#CFCFCF",
];

/// Palette color for the `index`-th tier, wrapping around
pub fn color_by_index(index: usize) -> &'static str {
    TIER_COLORS[index % TIER_COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_wraps() {
        assert_eq!(color_by_index(0), "#FF7F7F");
        assert_eq!(color_by_index(13), "#CFCFCF");
        assert_eq!(color_by_index(14), "#FF7F7F");
    }
}
