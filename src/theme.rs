use serde::{Deserialize, Serialize};

/// Font-size multipliers applied to `Theme::base_font_size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontScale {
    pub title: f64,
    pub subtitle: f64,
    pub context: f64,
    pub cta: f64,
    pub source: f64,
}

impl Default for FontScale {
    fn default() -> Self {
        Self {
            title: 2.0,
            subtitle: 1.5,
            context: 1.2,
            cta: 1.3,
            source: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextColors {
    pub title: String,
    pub subtitle: String,
    pub context: String,
    pub cta: String,
    pub source: String,
}

impl Default for TextColors {
    fn default() -> Self {
        Self {
            title: "black".to_string(),
            subtitle: "gray".to_string(),
            context: "black".to_string(),
            cta: "blue".to_string(),
            source: "gray".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font: String,
    pub base_font_size: f64,
    pub font_sizes: FontScale,
    pub colors: TextColors,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font: "Arial".to_string(),
            base_font_size: 16.0,
            font_sizes: FontScale::default(),
            colors: TextColors::default(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            base_font_size: 14.0,
            font_sizes: FontScale {
                title: 2.2,
                subtitle: 1.4,
                context: 1.1,
                cta: 1.2,
                source: 0.9,
            },
            colors: TextColors {
                title: "#1C2430".to_string(),
                subtitle: "#7A8AA6".to_string(),
                context: "#1C2430".to_string(),
                cta: "#2F6FEB".to_string(),
                source: "#7A8AA6".to_string(),
            },
        }
    }

    /// Converts an em value to whole pixels (truncating).
    pub fn em_to_px(&self, em: f64) -> f64 {
        (em * self.base_font_size).trunc()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn em_to_px_truncates_like_integer_pixels() {
        let theme = Theme::classic();
        assert_eq!(theme.em_to_px(theme.font_sizes.title), 32.0);
        assert_eq!(theme.em_to_px(theme.font_sizes.context), 19.0);
        assert_eq!(theme.em_to_px(theme.font_sizes.cta), 20.0);
    }
}
