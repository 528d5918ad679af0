use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub node_fill: String,
    pub node_border: String,
    pub header_fill: String,
    pub header_text_color: String,
    pub text_color: String,
    pub muted_text_color: String,
    pub line_color: String,
    pub control_fill: String,
    pub control_border: String,
    pub control_text_color: String,
    pub background: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 8.0,
            node_fill: "#FFFFFF".to_string(),
            node_border: "#1A192B".to_string(),
            header_fill: "#F4F4F4".to_string(),
            header_text_color: "#222222".to_string(),
            text_color: "#333333".to_string(),
            muted_text_color: "#777777".to_string(),
            line_color: "#B1B1B7".to_string(),
            control_fill: "#FEFEFE".to_string(),
            control_border: "#EEEEEE".to_string(),
            control_text_color: "#333333".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 8.0,
            node_fill: "#F8FAFF".to_string(),
            node_border: "#C7D2E5".to_string(),
            header_fill: "#EEF2F8".to_string(),
            header_text_color: "#1C2430".to_string(),
            text_color: "#1C2430".to_string(),
            muted_text_color: "#7A8AA6".to_string(),
            line_color: "#7A8AA6".to_string(),
            control_fill: "#FFFFFF".to_string(),
            control_border: "#D7E0F0".to_string(),
            control_text_color: "#1C2430".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "modern" => Some(Self::modern()),
            "classic" | "default" | "base" => Some(Self::classic()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
