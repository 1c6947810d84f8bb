use crate::model::{Rgba, ThemeId};

// ── Built-in theme catalog ────────────────────────────────────────────────────

/// Canonical color triple for a built-in theme. Built-in themes define
/// colors only; every other visual field stays whatever the user last set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    pub background: Rgba,
    pub box_color: Rgba,
    pub text: Rgba,
}

const fn triple(background: Rgba, box_color: Rgba, text: Rgba) -> ThemeColors {
    ThemeColors {
        background,
        box_color,
        text,
    }
}

/// The selectable built-in themes, in menu order. `ThemeId::Custom` is not a
/// catalog entry.
pub const BUILT_IN: &[ThemeId] = &[
    ThemeId::Dark,
    ThemeId::Light,
    ThemeId::MidnightBlue,
    ThemeId::Sunset,
    ThemeId::Forest,
    ThemeId::Ocean,
    ThemeId::RoseGold,
];

/// Canonical colors for a theme id. `Custom` (and anything future) falls
/// back to the Dark triple.
pub fn colors(theme: ThemeId) -> ThemeColors {
    match theme {
        ThemeId::Light => triple(Rgba::WHITE, Rgba::gray(0.95), Rgba::BLACK),
        ThemeId::MidnightBlue => triple(
            Rgba::rgb(0.05, 0.1, 0.2),
            Rgba::rgb(0.1, 0.2, 0.35),
            Rgba::rgb(0.6, 0.8, 1.0),
        ),
        ThemeId::Sunset => triple(
            Rgba::rgb(0.15, 0.05, 0.1),
            Rgba::rgb(0.3, 0.15, 0.2),
            Rgba::rgb(1.0, 0.7, 0.5),
        ),
        ThemeId::Forest => triple(
            Rgba::rgb(0.05, 0.15, 0.1),
            Rgba::rgb(0.1, 0.3, 0.2),
            Rgba::rgb(0.7, 0.9, 0.7),
        ),
        ThemeId::Ocean => triple(
            Rgba::rgb(0.0, 0.15, 0.25),
            Rgba::rgb(0.0, 0.25, 0.4),
            Rgba::rgb(0.5, 0.9, 1.0),
        ),
        ThemeId::RoseGold => triple(
            Rgba::rgb(0.2, 0.15, 0.15),
            Rgba::rgb(0.35, 0.25, 0.3),
            Rgba::rgb(1.0, 0.75, 0.85),
        ),
        ThemeId::Dark | ThemeId::Custom => {
            triple(Rgba::BLACK, Rgba::gray(0.2), Rgba::WHITE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ships_seven_built_in_themes() {
        assert_eq!(BUILT_IN.len(), 7);
        assert!(!BUILT_IN.contains(&ThemeId::Custom));
    }

    #[test]
    fn light_and_dark_variants_are_opposites() {
        let dark = colors(ThemeId::Dark);
        let light = colors(ThemeId::Light);
        assert_eq!(dark.background, Rgba::BLACK);
        assert_eq!(dark.text, Rgba::WHITE);
        assert_eq!(light.background, Rgba::WHITE);
        assert_eq!(light.text, Rgba::BLACK);
    }

    #[test]
    fn custom_falls_back_to_dark_triple() {
        assert_eq!(colors(ThemeId::Custom), colors(ThemeId::Dark));
    }
}
