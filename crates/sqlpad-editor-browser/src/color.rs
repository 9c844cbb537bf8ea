//! Color utilities for editor styling.

use sqlpad_editor_core::Theme;

/// CSS `rgba()` for a color packed as `0xRRGGBBAA`.
pub fn rgba_u32_to_css(color: u32) -> String {
    rgba_u32_to_css_alpha(color, (color & 0xFF) as f32 / 255.0)
}

/// CSS `rgba()` for the color's RGB channels with `alpha` replacing its own.
pub fn rgba_u32_to_css_alpha(color: u32, alpha: f32) -> String {
    let [r, g, b, _] = color.to_be_bytes();
    format!("rgba({r}, {g}, {b}, {alpha})")
}

/// CSS custom properties for a theme, in the order they are applied.
pub fn theme_css_vars(theme: &Theme) -> Vec<(&'static str, String)> {
    vec![
        ("--sqlpad-background", rgba_u32_to_css(theme.background)),
        ("--sqlpad-foreground", rgba_u32_to_css(theme.foreground)),
        ("--sqlpad-gutter", rgba_u32_to_css(theme.gutter)),
        ("--sqlpad-selection", rgba_u32_to_css(theme.selection)),
        ("--sqlpad-active-line", rgba_u32_to_css_alpha(theme.active_line, 0.6)),
        ("--sqlpad-font-size", format!("{}px", theme.font_size)),
        ("--sqlpad-line-height", theme.line_height.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_to_css() {
        let theme = Theme::default();
        assert_eq!(rgba_u32_to_css(theme.background), "rgba(30, 30, 46, 1)");
        assert_eq!(rgba_u32_to_css((theme.selection & !0xFF) | 0x80), "rgba(88, 91, 112, 0.5019608)");
        assert_eq!(rgba_u32_to_css(theme.selection & !0xFF), "rgba(88, 91, 112, 0)");
    }

    #[test]
    fn test_alpha_override_ignores_packed_alpha() {
        let theme = Theme::default();
        assert_eq!(rgba_u32_to_css_alpha(theme.active_line, 0.6), "rgba(49, 50, 68, 0.6)");
        assert_eq!(rgba_u32_to_css_alpha(theme.gutter & !0xFF, 1.0), "rgba(24, 24, 37, 1)");
    }

    #[test]
    fn test_theme_css_vars() {
        let vars = theme_css_vars(&Theme::default());
        let rendered: Vec<String> = vars.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        insta::assert_snapshot!(rendered.join("\n"), @r"
        --sqlpad-background: rgba(30, 30, 46, 1)
        --sqlpad-foreground: rgba(205, 214, 244, 1)
        --sqlpad-gutter: rgba(24, 24, 37, 1)
        --sqlpad-selection: rgba(88, 91, 112, 1)
        --sqlpad-active-line: rgba(49, 50, 68, 0.6)
        --sqlpad-font-size: 14px
        --sqlpad-line-height: 1.5
        ");
    }
}
