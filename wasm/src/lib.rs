use schema_flow::config::is_valid_color;
use schema_flow::layout_dump::LayoutDump;
use schema_flow::{
    Config, Connection, Control, DiagramSurface, Direction, HierarchyExtractor, Record, Theme,
    render_svg,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaRenderOptions {
    theme: Option<String>,
    background: Option<String>,
    highlight_color: Option<String>,
    width: Option<f32>,
    height: Option<f32>,
    direction: Option<String>,
    selected: Option<String>,
    #[serde(default)]
    connections: Vec<Connection>,
}

fn build_config(options: &SchemaRenderOptions) -> Result<Config, String> {
    let mut config = Config::default();
    if let Some(name) = options.theme.as_deref() {
        config.theme = Theme::by_name(name).ok_or_else(|| format!("unknown theme `{name}`"))?;
    }
    if let Some(background) = &options.background {
        config.surface.background = Some(color("background", background)?);
    }
    if let Some(highlight) = &options.highlight_color {
        config.surface.highlight_color = color("highlightColor", highlight)?;
    }
    if let Some(width) = options.width {
        config.surface.width = positive("width", width)?;
    }
    if let Some(height) = options.height {
        config.surface.height = positive("height", height)?;
    }
    Ok(config)
}

fn color(key: &str, value: &str) -> Result<String, String> {
    if !is_valid_color(value) {
        return Err(format!("invalid color for `{key}`: {value:?}"));
    }
    Ok(value.to_string())
}

fn positive(key: &str, value: f32) -> Result<f32, String> {
    if !(value.is_finite() && value > 0.0) {
        return Err(format!("`{key}` must be a positive number, got {value}"));
    }
    Ok(value)
}

fn build_surface(
    records_json: &str,
    root_label: &str,
    options: SchemaRenderOptions,
) -> Result<(DiagramSurface, Config), String> {
    let records: Vec<Record> = serde_json::from_str(records_json).map_err(|e| e.to_string())?;
    let config = build_config(&options)?;
    let mut surface = DiagramSurface::new(&records, &HierarchyExtractor, root_label, &config)
        .map_err(|e| e.to_string())?;
    if let Some(token) = options.direction.as_deref() {
        let direction =
            Direction::from_token(token).ok_or_else(|| format!("unknown direction `{token}`"))?;
        if direction != surface.direction() {
            surface.relayout(direction).map_err(|e| e.to_string())?;
        }
    }
    for connection in options.connections {
        surface.connect(connection).map_err(|e| e.to_string())?;
    }
    if let Some(id) = options.selected.as_deref() {
        surface.click_node(id).map_err(|e| e.to_string())?;
    }
    Ok((surface, config))
}

fn parse_options(options_json: Option<String>) -> Result<SchemaRenderOptions, JsValue> {
    match options_json {
        Some(raw) => serde_json::from_str::<SchemaRenderOptions>(&raw)
            .map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(SchemaRenderOptions::default()),
    }
}

#[wasm_bindgen]
pub fn render_schema_svg(
    records_json: &str,
    root_label: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    let (surface, config) =
        build_surface(records_json, root_label, options).map_err(|e| JsValue::from_str(&e))?;
    Ok(render_svg(&surface, &config.theme))
}

/// Stateful diagram for pages that forward clicks and drags.
#[wasm_bindgen]
pub struct SchemaDiagram {
    surface: DiagramSurface,
    theme: Theme,
}

#[wasm_bindgen]
impl SchemaDiagram {
    #[wasm_bindgen(constructor)]
    pub fn new(
        records_json: &str,
        root_label: &str,
        options_json: Option<String>,
    ) -> Result<SchemaDiagram, JsValue> {
        let options = parse_options(options_json)?;
        let (surface, config) =
            build_surface(records_json, root_label, options).map_err(|e| JsValue::from_str(&e))?;
        Ok(SchemaDiagram {
            surface,
            theme: config.theme,
        })
    }

    pub fn click(&mut self, node_id: &str) -> Result<(), JsValue> {
        self.surface
            .click_node(node_id)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        source_handle: Option<String>,
        target_handle: Option<String>,
    ) -> Result<String, JsValue> {
        let connection = Connection {
            source: source.to_string(),
            target: target.to_string(),
            source_handle,
            target_handle,
        };
        self.surface
            .connect(connection)
            .map(|edge| edge.id.clone())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn vertical(&mut self) -> Result<(), JsValue> {
        self.press(Control::Vertical)
    }

    pub fn horizontal(&mut self) -> Result<(), JsValue> {
        self.press(Control::Horizontal)
    }

    pub fn svg(&self) -> String {
        render_svg(&self.surface, &self.theme)
    }

    pub fn layout_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&LayoutDump::from_surface(&self.surface))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    fn press(&mut self, control: Control) -> Result<(), JsValue> {
        self.surface
            .press(control)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
