#[cfg(feature = "png")]
use crate::config::SurfaceConfig;
use crate::config::LayoutConfig;
use crate::ir::{Edge, EdgeType, Node, Side};
use crate::layout::bounds;
use crate::node_view::TableNode;
use crate::surface::DiagramSurface;
use crate::theme::Theme;
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

const FIT_PADDING: f32 = 40.0;
const CORNER_RADIUS: f32 = 5.0;
const CONTROL_WIDTH: f32 = 120.0;
const CONTROL_HEIGHT: f32 = 24.0;

pub fn render_svg(surface: &DiagramSurface, theme: &Theme) -> String {
    let config = surface.surface_config();
    let layout = surface.layout_config();
    let width = config.width;
    let height = config.height;
    let background = config.background.as_deref().unwrap_or(theme.background.as_str());

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(
        "<style>.edge.animated{stroke-dasharray:5;animation:dashdraw .5s linear infinite}@keyframes dashdraw{from{stroke-dashoffset:10}}</style>",
    );
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(background)
    ));
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.line_color
    ));
    svg.push_str("</defs>");

    let nodes = surface.rendered_nodes();
    let (tx, ty, scale) = fit_view(&nodes, layout, width, height);
    svg.push_str(&format!(
        "<g class=\"viewport\" transform=\"translate({tx:.2} {ty:.2}) scale({scale:.4})\">"
    ));

    let by_id: HashMap<&str, &Node> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    for edge in surface.edges() {
        let (Some(source), Some(target)) = (
            by_id.get(edge.source.as_str()),
            by_id.get(edge.target.as_str()),
        ) else {
            continue;
        };
        svg.push_str(&edge_svg(edge, source, target, layout, theme));
    }

    let table = TableNode::new(layout.node_width, layout.node_height);
    for node in &nodes {
        svg.push_str(&table.render(node, &node.style, theme));
    }
    svg.push_str("</g>");

    svg.push_str(&controls_svg(surface, theme, width));
    svg.push_str("</svg>");
    svg
}

/// Translation and scale that fit all nodes into the canvas, never zooming in.
fn fit_view(nodes: &[Node], layout: &LayoutConfig, width: f32, height: f32) -> (f32, f32, f32) {
    let Some((min_x, min_y, max_x, max_y)) = bounds(nodes, layout) else {
        return (0.0, 0.0, 1.0);
    };
    let content_w = (max_x - min_x).max(1.0);
    let content_h = (max_y - min_y).max(1.0);
    let avail_w = (width - FIT_PADDING * 2.0).max(1.0);
    let avail_h = (height - FIT_PADDING * 2.0).max(1.0);
    let scale = (avail_w / content_w).min(avail_h / content_h).min(1.0);
    let tx = (width - content_w * scale) / 2.0 - min_x * scale;
    let ty = (height - content_h * scale) / 2.0 - min_y * scale;
    (tx, ty, scale)
}

pub fn anchor_point(node: &Node, side: Side, layout: &LayoutConfig) -> (f32, f32) {
    let x = node.position.x;
    let y = node.position.y;
    let w = layout.node_width;
    let h = layout.node_height;
    match side {
        Side::Top => (x + w / 2.0, y),
        Side::Bottom => (x + w / 2.0, y + h),
        Side::Left => (x, y + h / 2.0),
        Side::Right => (x + w, y + h / 2.0),
    }
}

fn edge_svg(edge: &Edge, source: &Node, target: &Node, layout: &LayoutConfig, theme: &Theme) -> String {
    let start = anchor_point(source, source.source_position, layout);
    let end = anchor_point(target, target.target_position, layout);
    let d = match edge.edge_type {
        EdgeType::Straight => points_to_path(&[start, end]),
        EdgeType::Step => rounded_path(&step_points(start, end, source.source_position), 0.0),
        EdgeType::SmoothStep => {
            rounded_path(&step_points(start, end, source.source_position), CORNER_RADIUS)
        }
        EdgeType::Default => bezier_path(start, end, source.source_position),
    };
    let class = if edge.animated { "edge animated" } else { "edge" };
    format!(
        "<path class=\"{class}\" data-id=\"{}\" d=\"{d}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\" marker-end=\"url(#arrow)\"/>",
        escape_xml(&edge.id),
        theme.line_color
    )
}

/// Orthogonal route that turns halfway between the two anchors.
pub fn step_points(start: (f32, f32), end: (f32, f32), source_side: Side) -> Vec<(f32, f32)> {
    match source_side {
        Side::Top | Side::Bottom => {
            let mid_y = (start.1 + end.1) / 2.0;
            vec![start, (start.0, mid_y), (end.0, mid_y), end]
        }
        Side::Left | Side::Right => {
            let mid_x = (start.0 + end.0) / 2.0;
            vec![start, (mid_x, start.1), (mid_x, end.1), end]
        }
    }
}

fn rounded_path(points: &[(f32, f32)], radius: f32) -> String {
    if points.len() < 3 || radius <= 0.0 {
        return points_to_path(points);
    }
    let mut d = format!("M {:.2} {:.2}", points[0].0, points[0].1);
    for idx in 1..points.len() - 1 {
        let prev = points[idx - 1];
        let corner = points[idx];
        let next = points[idx + 1];
        let r_in = radius.min(distance(prev, corner) / 2.0);
        let r_out = radius.min(distance(corner, next) / 2.0);
        let r = r_in.min(r_out);
        if r <= f32::EPSILON {
            d.push_str(&format!(" L {:.2} {:.2}", corner.0, corner.1));
            continue;
        }
        let before = toward(corner, prev, r);
        let after = toward(corner, next, r);
        d.push_str(&format!(
            " L {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}",
            before.0, before.1, corner.0, corner.1, after.0, after.1
        ));
    }
    let last = points[points.len() - 1];
    d.push_str(&format!(" L {:.2} {:.2}", last.0, last.1));
    d
}

fn bezier_path(start: (f32, f32), end: (f32, f32), source_side: Side) -> String {
    let (c1, c2) = match source_side {
        Side::Top | Side::Bottom => {
            let mid_y = (start.1 + end.1) / 2.0;
            ((start.0, mid_y), (end.0, mid_y))
        }
        Side::Left | Side::Right => {
            let mid_x = (start.0 + end.0) / 2.0;
            ((mid_x, start.1), (mid_x, end.1))
        }
    };
    format!(
        "M {:.2} {:.2} C {:.2} {:.2} {:.2} {:.2} {:.2} {:.2}",
        start.0, start.1, c1.0, c1.1, c2.0, c2.1, end.0, end.1
    )
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn toward(from: (f32, f32), to: (f32, f32), amount: f32) -> (f32, f32) {
    let len = distance(from, to);
    if len <= f32::EPSILON {
        return from;
    }
    (
        from.0 + (to.0 - from.0) / len * amount,
        from.1 + (to.1 - from.1) / len * amount,
    )
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

fn controls_svg(surface: &DiagramSurface, theme: &Theme, width: f32) -> String {
    let mut out = String::from("<g class=\"controls\">");
    let x = width - CONTROL_WIDTH - 10.0;
    for (idx, control) in surface.controls().iter().enumerate() {
        let y = 10.0 + idx as f32 * (CONTROL_HEIGHT + 6.0);
        let active = control.direction() == surface.direction();
        let weight = if active { "bold" } else { "normal" };
        out.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{CONTROL_WIDTH}\" height=\"{CONTROL_HEIGHT}\" rx=\"4\" ry=\"4\" fill=\"{}\" stroke=\"{}\"/>",
            theme.control_fill, theme.control_border
        ));
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"11\" font-weight=\"{weight}\" fill=\"{}\">{}</text>",
            x + CONTROL_WIDTH / 2.0,
            y + CONTROL_HEIGHT / 2.0 + 4.0,
            escape_xml(&theme.font_family),
            theme.control_text_color,
            control.label()
        ));
    }
    out.push_str("</g>");
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, surface_cfg: &SurfaceConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(surface_cfg.width, surface_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid canvas size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ir::{Connection, Graph};
    use crate::surface::Control;

    fn surface() -> DiagramSurface {
        let graph = Graph {
            nodes: vec![Node::new("A"), Node::new("B")],
            edges: vec![crate::ir::Edge::new("A", "B")],
        };
        DiagramSurface::from_graph(graph, &Config::default()).unwrap()
    }

    #[test]
    fn render_svg_basic() {
        let svg = render_svg(&surface(), &Theme::classic());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("VZKAT_RICHTUNG").count(), 2);
        assert!(svg.contains("vertical layout"));
        assert!(svg.contains("horizontal layout"));
        assert!(svg.contains("width=\"1300\""));
        assert!(svg.contains("height=\"650\""));
    }

    #[test]
    fn selection_and_connections_show_up() {
        let mut surface = surface();
        surface.click_node("B").unwrap();
        surface
            .connect(Connection::new("B", "A").with_handles("out", "in"))
            .unwrap();
        let svg = render_svg(&surface, &Theme::classic());
        assert!(svg.contains("fill=\"#E1F1FF\""));
        assert!(svg.contains("class=\"edge animated\""));
        assert!(svg.contains("data-id=\"edge-Bout-Ain\""));
    }

    #[test]
    fn smooth_step_rounds_corners() {
        let d = rounded_path(&step_points((0.0, 0.0), (100.0, 40.0), Side::Bottom), CORNER_RADIUS);
        assert_eq!(d.matches(" Q ").count(), 2);
        let aligned = rounded_path(&step_points((0.0, 0.0), (0.0, 40.0), Side::Bottom), CORNER_RADIUS);
        assert!(!aligned.contains(" Q "));
    }

    #[test]
    fn configured_background_wins_over_theme() {
        let mut config = Config::default();
        config.surface.background = Some("#1A192B".to_string());
        let graph = Graph {
            nodes: vec![Node::new("A")],
            edges: Vec::new(),
        };
        let surface = DiagramSurface::from_graph(graph, &config).unwrap();
        let svg = render_svg(&surface, &Theme::classic());
        assert!(svg.contains("<rect width=\"100%\" height=\"100%\" fill=\"#1A192B\"/>"));
    }

    #[test]
    fn anchors_follow_direction() {
        let mut surface = surface();
        let layout = surface.layout_config().clone();
        let a = surface.nodes()[0].clone();
        let (x, y) = anchor_point(&a, a.source_position, &layout);
        assert_eq!((x, y), (a.position.x + 86.0, a.position.y + 36.0));

        surface.press(Control::Horizontal).unwrap();
        let a = surface.nodes()[0].clone();
        let (x, y) = anchor_point(&a, a.source_position, &layout);
        assert_eq!((x, y), (a.position.x + 172.0, a.position.y + 18.0));
    }

    #[test]
    fn step_points_turn_halfway() {
        let pts = step_points((0.0, 0.0), (100.0, 40.0), Side::Bottom);
        assert_eq!(pts, vec![(0.0, 0.0), (0.0, 20.0), (100.0, 20.0), (100.0, 40.0)]);
        let pts = step_points((0.0, 0.0), (100.0, 40.0), Side::Right);
        assert_eq!(pts[1], (50.0, 0.0));
    }

    #[test]
    fn font_family_quotes_stay_inside_attribute() {
        let mut surface = surface();
        surface.click_node("A").unwrap();
        let svg = render_svg(&surface, &Theme::classic());
        assert!(!svg.contains("font-family=\"\"trebuchet"));
        assert!(svg.contains(
            "font-family=\"&quot;trebuchet ms&quot;, verdana, arial, sans-serif\""
        ));
        assert_eq!(svg.matches('"').count() % 2, 0);
    }

    #[cfg(feature = "png")]
    #[test]
    fn default_themes_parse_as_svg() {
        for theme in [Theme::classic(), Theme::modern()] {
            let svg = render_svg(&surface(), &theme);
            usvg::Tree::from_str(&svg, &usvg::Options::default()).unwrap();
        }
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("<a&'\">"), "&lt;a&amp;&apos;&quot;&gt;");
    }
}
