//! Declarative description of the SVG scene.
//!
//! [`Scene::build`] decides everything about the drawing that does not depend
//! on node positions: markers, classes, radii, labels, glyphs and links. The
//! DOM mount and the static SVG writer both materialize the same scene, and
//! only positions change per tick.

use std::collections::HashMap;

use crate::error::RenderError;
use crate::graph::{GraphData, GraphNode};

use super::options::RenderOptions;
use super::state::{Rect, ViewBox};
use super::theme::{self, ChannelGlyph, Theme};

/// Arrowhead marker for one link.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
	/// Element id, referenced by `marker-end`.
	pub id: String,
	/// Offset of the tip from the target center.
	pub ref_x: f64,
}

/// One link path.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkShape {
	/// Edge id from the graph data.
	pub id: String,
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
	/// Relationship label, shown as the link title.
	pub relationship: String,
	/// Index into [`Scene::markers`].
	pub marker: usize,
}

/// One node: a link element wrapping circle, glyph and labels.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeShape {
	/// Detail view of the node.
	pub href: String,
	/// Classes of the wrapping link element.
	pub classes: Vec<String>,
	/// Circle radius.
	pub radius: f64,
	/// Classes of the circle.
	pub circle_classes: Vec<String>,
	/// Hover title, `name (type)`.
	pub title: String,
	/// Truncated name drawn below the circle.
	pub label: String,
	/// Channel icon for sources.
	pub glyph: Option<ChannelGlyph>,
}

/// Position-independent description of the whole drawing.
#[derive(Clone, Debug)]
pub struct Scene {
	/// Width of the `<svg>` in pixels.
	pub width: f64,
	/// Height of the `<svg>` in pixels.
	pub height: f64,
	/// ViewBox before the auto-fit.
	pub view_box: ViewBox,
	/// Base node radius.
	pub node_radius: f64,
	/// Link and arrow color.
	pub color: String,
	/// Styling shared by all shapes.
	pub theme: Theme,
	/// One arrowhead per link.
	pub markers: Vec<Marker>,
	/// Links in graph order.
	pub links: Vec<LinkShape>,
	/// Nodes in graph order; index matches the simulation body.
	pub nodes: Vec<NodeShape>,
}

impl Scene {
	/// Builds the scene, rejecting links whose endpoints are not nodes.
	pub fn build(data: &GraphData, options: &RenderOptions) -> Result<Self, RenderError> {
		let theme = Theme::default();
		let index = node_index(data);
		let r = options.node_radius;

		let mut markers = Vec::with_capacity(data.links.len());
		let mut links = Vec::with_capacity(data.links.len());
		for (i, edge) in data.links.iter().enumerate() {
			let lookup = |endpoint: &str| {
				index
					.get(endpoint)
					.copied()
					.ok_or_else(|| RenderError::DanglingReference {
						edge: edge.id.clone(),
						endpoint: endpoint.to_string(),
					})
			};
			let source = lookup(&edge.source)?;
			let target = lookup(&edge.target)?;

			markers.push(Marker {
				id: format!("arrow-{i}"),
				ref_x: node_radius(&data.nodes[target], r) + theme.arrow.size,
			});
			links.push(LinkShape {
				id: edge.id.clone(),
				source,
				target,
				relationship: edge.relationship.clone(),
				marker: i,
			});
		}

		let nodes = data
			.nodes
			.iter()
			.map(|node| node_shape(node, options, &theme))
			.collect();

		Ok(Self {
			width: options.width,
			height: options.height,
			view_box: ViewBox::initial(options.width, options.height, r),
			node_radius: r,
			color: options.color.clone(),
			theme,
			markers,
			links,
			nodes,
		})
	}

	/// `d` attribute of link `link` for the given node positions.
	pub fn link_path(&self, link: &LinkShape, positions: &[(f64, f64)]) -> String {
		let (sx, sy) = positions[link.source];
		let (tx, ty) = positions[link.target];
		format!("M{sx},{sy} L {tx},{ty}")
	}

	/// Estimated bounding box of the drawing at `positions`.
	///
	/// Covers every circle and its label below it, with label widths
	/// estimated from the character count.
	pub fn estimate_bounds(&self, positions: &[(f64, f64)]) -> Option<Rect> {
		let label = &self.theme.label;
		self.nodes
			.iter()
			.zip(positions)
			.map(|(node, &(x, y))| {
				let circle = Rect {
					x: x - node.radius,
					y: y - node.radius,
					width: node.radius * 2.0,
					height: node.radius * 2.0,
				};
				let text_width = node.label.chars().count() as f64 * label.font_size * label.char_width;
				let text = Rect {
					x: x - text_width / 2.0,
					y: y + self.node_radius * 2.0 - label.font_size,
					width: text_width,
					height: label.font_size * 1.2,
				};
				circle.union(text)
			})
			.reduce(Rect::union)
	}
}

/// Maps node ids to their index; the first node with an id wins.
pub(crate) fn node_index(data: &GraphData) -> HashMap<&str, usize> {
	let mut index = HashMap::new();
	for (i, node) in data.nodes.iter().enumerate() {
		if let Some(id) = node.id.as_deref() {
			index.entry(id).or_insert(i);
		}
	}
	index
}

fn node_radius(node: &GraphNode, r: f64) -> f64 {
	if node.is_kind(theme::ORGANIZATION) {
		r * theme::ORGANIZATION_SCALE
	} else {
		r
	}
}

fn node_shape(node: &GraphNode, options: &RenderOptions, theme: &Theme) -> NodeShape {
	let kind = node.kind.as_deref().unwrap_or_default();
	let name = node.name.as_deref().unwrap_or_default();

	let mut circle_classes = Vec::new();
	if !kind.is_empty() {
		circle_classes.push(kind.to_string());
	}
	if node.uid.is_some() && node.uid == options.current {
		circle_classes.push("currentNode".to_string());
	}
	let is_source = node.is_kind(theme::SOURCE);
	if is_source {
		if let Some(channel) = &node.channel {
			circle_classes.push(format!("color-{channel}"));
		}
	}

	NodeShape {
		href: format!("{}{}", options.detail_url, node.uid.as_deref().unwrap_or_default()),
		classes: vec![
			format!("node-type-{kind}"),
			"node-group".to_string(),
			"text-decoration-none".to_string(),
		],
		radius: node_radius(node, options.node_radius),
		circle_classes,
		title: format!("{name} ({kind})"),
		label: truncate(name, theme.label.max_chars, theme.label.ellipsis),
		glyph: if is_source {
			node.channel.as_deref().and_then(theme::channel_glyph)
		} else {
			None
		},
	}
}

/// Cuts `text` to `max` characters and appends `ellipsis` when longer.
pub fn truncate(text: &str, max: usize, ellipsis: &str) -> String {
	match text.char_indices().nth(max) {
		Some((cut, _)) => format!("{}{ellipsis}", &text[..cut]),
		None => text.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::GraphEdge;
	use pretty_assertions::assert_eq;

	fn node(uid: &str, kind: &str, name: &str, channel: Option<&str>) -> GraphNode {
		GraphNode {
			id: Some(uid.into()),
			uid: Some(uid.into()),
			name: Some(name.into()),
			kind: Some(kind.into()),
			channel: channel.map(Into::into),
		}
	}

	fn sample() -> GraphData {
		GraphData {
			nodes: vec![
				node("o", "Organization", "Media Group", None),
				node("s", "Source", "Daily Planet", Some("print")),
				node("p", "Person", "Clark", None),
			],
			links: vec![
				GraphEdge::new("s", "o", "publishes_org"),
				GraphEdge::new("p", "s", "persons"),
			],
		}
	}

	#[test]
	fn truncates_long_names_by_characters() {
		let thirty = "abcdefghijklmnopqrstuvwxyz1234";
		let exact = "abcdefghijklmnopqrstuvwxy";

		assert_eq!(truncate(thirty, 25, "..."), "abcdefghijklmnopqrstuvwxy...");
		assert_eq!(truncate(exact, 25, "..."), exact);
		assert_eq!(truncate("Süddeutsche Zeitung Online Edition", 25, "..."), "Süddeutsche Zeitung Onlin...");
	}

	#[test]
	fn organization_targets_push_arrows_out() {
		let scene = Scene::build(&sample(), &RenderOptions::default()).unwrap();

		assert_eq!(scene.markers[0], Marker { id: "arrow-0".into(), ref_x: 15.0 * 1.2 + 7.0 });
		assert_eq!(scene.markers[1], Marker { id: "arrow-1".into(), ref_x: 22.0 });
		assert_eq!(scene.nodes[0].radius, 18.0);
		assert_eq!(scene.nodes[1].radius, 15.0);
		assert_eq!((scene.links[0].source, scene.links[0].target), (1, 0));
	}

	#[test]
	fn node_classes_links_and_labels() {
		let options = RenderOptions {
			current: Some("s".into()),
			detail_url: "/inventory/view?uid=".into(),
			..RenderOptions::default()
		};
		let scene = Scene::build(&sample(), &options).unwrap();
		let source = &scene.nodes[1];

		assert_eq!(source.href, "/inventory/view?uid=s");
		assert_eq!(source.classes, vec!["node-type-Source", "node-group", "text-decoration-none"]);
		assert_eq!(source.circle_classes, vec!["Source", "currentNode", "color-print"]);
		assert_eq!(source.title, "Daily Planet (Source)");
		assert_eq!(source.glyph.map(|g| g.glyph), Some('\u{f1ea}'));
		assert_eq!(scene.nodes[2].glyph, None);
		assert_eq!(scene.nodes[2].circle_classes, vec!["Person"]);
	}

	#[test]
	fn source_with_unknown_channel_has_no_glyph() {
		let data = GraphData {
			nodes: vec![node("s", "Source", "Pod", Some("podcast"))],
			links: vec![],
		};
		let scene = Scene::build(&data, &RenderOptions::default()).unwrap();

		assert_eq!(scene.nodes[0].glyph, None);
		assert_eq!(scene.nodes[0].circle_classes, vec!["Source", "color-podcast"]);
	}

	#[test]
	fn tolerates_missing_name_and_type() {
		let data = GraphData {
			nodes: vec![GraphNode {
				id: Some("x".into()),
				uid: Some("x".into()),
				..GraphNode::default()
			}],
			links: vec![],
		};
		let scene = Scene::build(&data, &RenderOptions::default()).unwrap();

		assert_eq!(scene.nodes[0].label, "");
		assert_eq!(scene.nodes[0].title, " ()");
		assert!(scene.nodes[0].circle_classes.is_empty());
	}

	#[test]
	fn dangling_endpoint_rejects_the_scene() {
		let mut data = sample();
		data.links.push(GraphEdge::new("p", "ghost", "persons"));

		let err = Scene::build(&data, &RenderOptions::default()).unwrap_err();
		assert!(matches!(
			err,
			RenderError::DanglingReference { ref edge, ref endpoint } if edge == "p_ghost" && endpoint == "ghost"
		));
	}

	#[test]
	fn link_path_and_bounds() {
		let scene = Scene::build(&sample(), &RenderOptions::default()).unwrap();
		let positions = [(0.0, 0.0), (100.0, 50.0), (-40.0, 10.0)];

		assert_eq!(scene.link_path(&scene.links[0], &positions), "M100,50 L 0,0");

		let bounds = scene.estimate_bounds(&positions).unwrap();
		assert!(bounds.x <= -40.0 - 15.0);
		assert!(bounds.x + bounds.width >= 100.0 + 15.0);
		assert!(bounds.y <= -18.0);
		assert!(bounds.y + bounds.height >= 50.0 + 30.0);
	}
}
