use crate::ir::{Node, NodeStyle};
use crate::render::escape_xml;
use crate::theme::Theme;

pub const HEADER_TITLE: &str = "VZKAT_RICHTUNG";

/// Attribute rows shown by every table node: name, type, modifier.
pub const ATTRIBUTE_ROWS: [(&str, &str, &str); 3] = [
    ("name", "Text", ""),
    ("ID", "Text", "Autoincrement"),
    ("schluessel", "Text", ""),
];

/// Renderer for the `custom` node type.
///
/// The table is static; node data does not feed into it.
#[derive(Debug, Clone, Copy)]
pub struct TableNode {
    pub width: f32,
    pub height: f32,
}

impl TableNode {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn header_height(&self) -> f32 {
        self.height / (ATTRIBUTE_ROWS.len() as f32 + 1.0)
    }

    pub fn render(&self, node: &Node, style: &NodeStyle, theme: &Theme) -> String {
        let x = node.position.x;
        let y = node.position.y;
        let fill = style.background.as_deref().unwrap_or(theme.node_fill.as_str());
        let row_h = self.header_height();
        let font = theme.font_size;

        let mut out = String::new();
        out.push_str(&format!(
            "<g class=\"node node-{}\" data-id=\"{}\">",
            escape_xml(&node.node_type),
            escape_xml(&node.id)
        ));
        out.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"3\" ry=\"3\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            self.width,
            self.height,
            escape_xml(fill),
            theme.node_border
        ));
        if style.is_empty() {
            out.push_str(&format!(
                "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{row_h:.2}\" fill=\"{}\"/>",
                self.width, theme.header_fill
            ));
        }
        out.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{font}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
            x + 4.0,
            y + row_h / 2.0 + font / 3.0,
            escape_xml(&theme.font_family),
            theme.header_text_color,
            HEADER_TITLE
        ));

        let columns = [0.06, 0.42, 0.64];
        for (idx, (name, kind, modifier)) in ATTRIBUTE_ROWS.iter().enumerate() {
            let baseline = y + row_h * (idx as f32 + 1.5) + font / 3.0;
            for (col, (text, bold)) in [(*name, true), (*kind, false), (*modifier, false)]
                .into_iter()
                .enumerate()
            {
                if text.is_empty() {
                    continue;
                }
                let weight = if bold { " font-weight=\"bold\"" } else { "" };
                let color = if bold {
                    &theme.text_color
                } else {
                    &theme.muted_text_color
                };
                out.push_str(&format!(
                    "<text x=\"{:.2}\" y=\"{baseline:.2}\" font-family=\"{}\" font-size=\"{font}\"{weight} fill=\"{}\">{}</text>",
                    x + self.width * columns[col],
                    escape_xml(&theme.font_family),
                    color,
                    text
                ));
            }
        }
        out.push_str("</g>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fixed_header_and_rows() {
        let node = Node::new("orders").with_data("label", "Orders");
        let svg = TableNode::new(172.0, 36.0).render(&node, &NodeStyle::default(), &Theme::classic());
        assert!(svg.contains(HEADER_TITLE));
        assert!(svg.contains(">schluessel<"));
        assert!(svg.contains(">Autoincrement<"));
        assert_eq!(svg.matches(">Text<").count(), 3);
        assert!(!svg.contains("Orders"));
    }

    #[test]
    fn highlight_fills_the_box() {
        let node = Node::new("a");
        let svg = TableNode::new(172.0, 36.0).render(
            &node,
            &NodeStyle::highlighted("#E1F1FF"),
            &Theme::classic(),
        );
        assert!(svg.contains("fill=\"#E1F1FF\""));
        assert!(!svg.contains(&Theme::classic().header_fill));
    }
}
