//! Standalone SVG serialization of a laid-out scene.

use std::fmt;

use quick_xml::escape::escape;

use super::scene::{NodeShape, Scene};
use super::state::ViewBox;

/// Scene plus node positions, displayed as an SVG document.
pub struct SvgSnapshot<'a> {
	/// Scene to draw.
	pub scene: &'a Scene,
	/// Node positions, in node order.
	pub positions: &'a [(f64, f64)],
	/// ViewBox of the document.
	pub view_box: ViewBox,
}

impl fmt::Display for SvgSnapshot<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let scene = self.scene;
		let color = escape(scene.color.as_str());
		writeln!(
			f,
			r#"<svg xmlns="http://www.w3.org/2000/svg" version="1.1" width="{}" height="{}" viewBox="{}" style="{}">"#,
			scene.width,
			scene.height,
			self.view_box,
			SVG_STYLE
		)?;

		writeln!(f, "<defs>")?;
		let arrow = &scene.theme.arrow;
		for marker in &scene.markers {
			writeln!(
				f,
				r#"<marker id="{}" viewBox="{}" refX="{}" refY="0" markerWidth="{}" markerHeight="{}" orient="auto"><path fill="{color}" d="{}"/></marker>"#,
				marker.id, arrow.view_box, marker.ref_x, arrow.marker_width, arrow.marker_height, arrow.path
			)?;
		}
		writeln!(f, "</defs>")?;

		writeln!(f, r#"<g fill="none" stroke-width="{}">"#, scene.theme.stroke.link_width)?;
		for link in &scene.links {
			writeln!(
				f,
				r#"<path stroke="{color}" marker-end="url(#{})" d="{}"><title>{}</title></path>"#,
				scene.markers[link.marker].id,
				scene.link_path(link, self.positions),
				escape(link.relationship.as_str())
			)?;
		}
		writeln!(f, "</g>")?;

		writeln!(
			f,
			r#"<g fill="currentColor" stroke-linecap="round" stroke-linejoin="round">"#
		)?;
		for (node, &(x, y)) in scene.nodes.iter().zip(self.positions) {
			self.write_node(f, node, x, y)?;
		}
		writeln!(f, "</g>")?;
		write!(f, "</svg>")
	}
}

impl SvgSnapshot<'_> {
	fn write_node(&self, f: &mut fmt::Formatter<'_>, node: &NodeShape, x: f64, y: f64) -> fmt::Result {
		let theme = &self.scene.theme;
		writeln!(
			f,
			r#"<a href="{}" class="{}" transform="translate({x},{y})">"#,
			escape(node.href.as_str()),
			escape(node.classes.join(" ").as_str())
		)?;
		writeln!(
			f,
			r#"<circle stroke="{}" stroke-width="{}" r="{}" class="{}"/>"#,
			theme.stroke.node_stroke.to_css(),
			theme.stroke.node_stroke_width,
			node.radius,
			escape(node.circle_classes.join(" ").as_str())
		)?;
		writeln!(f, "<title>{}</title>", escape(node.title.as_str()))?;
		if let Some(glyph) = node.glyph {
			let fill = theme.glyph_color.to_css();
			writeln!(
				f,
				r#"<text text-anchor="middle" dominant-baseline="central" style="font-family: {}; color: {fill}; fill: {fill}">{}</text>"#,
				escape(glyph.font_family),
				glyph.glyph
			)?;
		}
		let label = escape(node.label.as_str());
		let label_y = self.scene.node_radius * 2.0;
		writeln!(
			f,
			r#"<text x="0" y="{label_y}" text-anchor="middle" class="nodeLabel" fill="none" stroke="{}" stroke-width="{}">{label}</text>"#,
			theme.label.halo.to_css(),
			theme.label.halo_width
		)?;
		writeln!(
			f,
			r#"<text x="0" y="{label_y}" text-anchor="middle" class="nodeLabel">{label}</text>"#
		)?;
		writeln!(f, "</a>")
	}
}

/// Inline style of the root element.
pub const SVG_STYLE: &str = "max-width: 100%; height: auto; height: intrinsic;";

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_plot::options::RenderOptions;
	use crate::graph::{GraphData, GraphEdge, GraphNode};

	fn data() -> GraphData {
		GraphData {
			nodes: vec![
				GraphNode {
					id: Some("a".into()),
					uid: Some("a".into()),
					name: Some("Tom & Jerry <Weekly>".into()),
					kind: Some("Source".into()),
					channel: Some("website".into()),
				},
				GraphNode {
					id: Some("b".into()),
					uid: Some("b".into()),
					name: Some("Cartoon Holdings".into()),
					kind: Some("Organization".into()),
					channel: None,
				},
			],
			links: vec![GraphEdge::new("a", "b", "publishes_org")],
		}
	}

	#[test]
	fn writes_escaped_halo_and_label() {
		let scene = Scene::build(&data(), &RenderOptions::default()).unwrap();
		let positions = [(1.0, 2.0), (3.0, 4.0)];
		let svg = SvgSnapshot {
			scene: &scene,
			positions: &positions,
			view_box: scene.view_box,
		}
		.to_string();

		assert!(svg.starts_with("<svg "));
		assert!(svg.ends_with("</svg>"));
		assert!(svg.contains(r#"viewBox="-230,-300,370,600""#));
		assert_eq!(svg.matches("Tom &amp; Jerry &lt;Weekly&gt;</text>").count(), 2);
		assert!(svg.contains(r##"stroke="#ffffff" stroke-width="3""##));
		assert!(svg.contains(r#"<marker id="arrow-0" viewBox="0 -5 10 10" refX="25""#));
		assert!(svg.contains(r#"marker-end="url(#arrow-0)" d="M1,2 L 3,4""#));
		assert!(svg.contains(r#"transform="translate(3,4)""#));
		assert!(svg.contains('\u{f0ac}'));
		assert!(svg.contains(r#"href="/view?uid=a""#));
	}
}
