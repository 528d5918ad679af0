use crate::theme::Theme;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_NODE_WIDTH: f32 = 172.0;
pub const DEFAULT_NODE_HEIGHT: f32 = 36.0;
pub const DEFAULT_HIGHLIGHT: &str = "#E1F1FF";

static COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#[0-9A-Fa-f]{3,8}|[a-zA-Z]+|(rgb|rgba|hsl|hsla)\([0-9.,%\s]+\))$").unwrap()
});

pub fn is_valid_color(value: &str) -> bool {
    COLOR_RE.is_match(value.trim())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub margin_x: f32,
    pub margin_y: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: DEFAULT_NODE_WIDTH,
            node_height: DEFAULT_NODE_HEIGHT,
            node_spacing: 50.0,
            rank_spacing: 50.0,
            margin_x: 0.0,
            margin_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub width: f32,
    pub height: f32,
    /// Canvas background. Falls back to the theme when unset.
    pub background: Option<String>,
    pub highlight_color: String,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 1300.0,
            height: 650.0,
            background: None,
            highlight_color: DEFAULT_HIGHLIGHT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub surface: SurfaceConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    surface: Option<SurfaceConfigFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    node_fill: Option<String>,
    node_border: Option<String>,
    header_fill: Option<String>,
    header_text_color: Option<String>,
    text_color: Option<String>,
    line_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    margin_x: Option<f32>,
    margin_y: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SurfaceConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    background: Option<String>,
    highlight_color: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a JSON (or JSON5) config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme `{theme_name}`"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = font_family(v)?;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = color("nodeFill", v)?;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_border = color("nodeBorder", v)?;
        }
        if let Some(v) = vars.header_fill {
            config.theme.header_fill = color("headerFill", v)?;
        }
        if let Some(v) = vars.header_text_color {
            config.theme.header_text_color = color("headerTextColor", v)?;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = color("textColor", v)?;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = color("lineColor", v)?;
        }
        if let Some(v) = vars.background {
            config.theme.background = color("background", v)?;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_width {
            config.layout.node_width = positive("nodeWidth", v)?;
        }
        if let Some(v) = layout.node_height {
            config.layout.node_height = positive("nodeHeight", v)?;
        }
        if let Some(v) = layout.node_spacing {
            config.layout.node_spacing = v.max(0.0);
        }
        if let Some(v) = layout.rank_spacing {
            config.layout.rank_spacing = v.max(0.0);
        }
        if let Some(v) = layout.margin_x {
            config.layout.margin_x = v.max(0.0);
        }
        if let Some(v) = layout.margin_y {
            config.layout.margin_y = v.max(0.0);
        }
    }

    if let Some(surface) = parsed.surface {
        if let Some(v) = surface.width {
            config.surface.width = positive("width", v)?;
        }
        if let Some(v) = surface.height {
            config.surface.height = positive("height", v)?;
        }
        if let Some(v) = surface.background {
            config.surface.background = Some(color("background", v)?);
        }
        if let Some(v) = surface.highlight_color {
            config.surface.highlight_color = color("highlightColor", v)?;
        }
    }

    Ok(config)
}

fn color(key: &str, value: String) -> anyhow::Result<String> {
    if !is_valid_color(&value) {
        anyhow::bail!("invalid color for `{key}`: {value:?}");
    }
    Ok(value)
}

fn font_family(value: String) -> anyhow::Result<String> {
    if value.trim().is_empty() || value.contains(['<', '>', '&']) {
        anyhow::bail!("invalid `fontFamily`: {value:?}");
    }
    Ok(value)
}

fn positive(key: &str, value: f32) -> anyhow::Result<f32> {
    if !(value.is_finite() && value > 0.0) {
        anyhow::bail!("`{key}` must be a positive number, got {value}");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_node_box() {
        let config = Config::default();
        assert_eq!(config.layout.node_width, 172.0);
        assert_eq!(config.layout.node_height, 36.0);
        assert_eq!(config.surface.highlight_color, "#E1F1FF");
        assert!(config.surface.background.is_none());
    }

    #[test]
    fn parses_json5_overrides() {
        let config = parse_config(
            r##"{
                // trailing commas and comments are fine
                theme: "modern",
                surface: { background: "#1A192B", highlightColor: "rgb(1, 2, 3)", },
                layout: { rankSpacing: 80 },
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.node_border, Theme::modern().node_border);
        assert_eq!(config.surface.background.as_deref(), Some("#1A192B"));
        assert_eq!(config.surface.highlight_color, "rgb(1, 2, 3)");
        assert_eq!(config.layout.rank_spacing, 80.0);
        assert_eq!(config.layout.node_width, 172.0);
    }

    #[test]
    fn rejects_bad_color() {
        let err = parse_config(r#"{"surface": {"highlightColor": "url(javascript:1)"}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("highlightColor"));
    }

    #[test]
    fn rejects_unknown_theme_and_zero_size() {
        assert!(parse_config(r#"{"theme": "neon"}"#).is_err());
        assert!(parse_config(r#"{"layout": {"nodeWidth": 0}}"#).is_err());
    }

    #[test]
    fn font_family_keeps_quotes_but_rejects_markup() {
        let config = parse_config(r#"{"themeVariables": {"fontFamily": "'Fira Sans', sans-serif"}}"#)
            .unwrap();
        assert_eq!(config.theme.font_family, "'Fira Sans', sans-serif");
        assert!(parse_config(r#"{"themeVariables": {"fontFamily": "a</text>"}}"#).is_err());
        assert!(parse_config(r#"{"themeVariables": {"fontFamily": " "}}"#).is_err());
    }

    #[test]
    fn default_canvas_size() {
        let surface = SurfaceConfig::default();
        assert_eq!((surface.width, surface.height), (1300.0, 650.0));
    }

    #[test]
    fn color_pattern() {
        assert!(is_valid_color("#fff"));
        assert!(is_valid_color("#E1F1FF"));
        assert!(is_valid_color("white"));
        assert!(is_valid_color("hsl(210, 100%, 90%)"));
        assert!(!is_valid_color("#12"));
        assert!(!is_valid_color("red; stroke: blue"));
    }
}
