//! Visual theme derived from the mount point's size.

use crate::extension::{Extension, ExtensionKind};
use crate::types::Dimensions;

/// Below this width the editor switches to the compact font size.
const COMPACT_WIDTH: f64 = 480.0;

/// Colors are packed as 0xRRGGBBAA.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    pub line_height: f64,
    pub background: u32,
    pub foreground: u32,
    pub gutter: u32,
    pub selection: u32,
    pub active_line: u32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            font_size: 14.0,
            line_height: 1.5,
            background: 0x1E1E2EFF,
            foreground: 0xCDD6F4FF,
            gutter: 0x181825FF,
            selection: 0x585B70FF,
            active_line: 0x313244FF,
        }
    }
}

/// Theme extension sized to fill the mount point.
pub fn editor_theme(dimensions: Dimensions) -> Extension {
    Extension::from_fn("theme", ExtensionKind::Theme, move |settings| {
        settings.theme.width = dimensions.width;
        settings.theme.height = dimensions.height;
        settings.theme.font_size = if dimensions.width < COMPACT_WIDTH {
            12.0
        } else {
            14.0
        };
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::EngineSettings;

    #[test]
    fn test_theme_follows_dimensions() {
        let mut settings = EngineSettings::default();
        editor_theme(Dimensions::new(800.0, 300.0)).configure(&mut settings);
        assert_eq!(settings.theme.width, 800.0);
        assert_eq!(settings.theme.height, 300.0);
        assert_eq!(settings.theme.font_size, 14.0);

        editor_theme(Dimensions::new(320.0, 200.0)).configure(&mut settings);
        assert_eq!(settings.theme.font_size, 12.0);
    }
}
