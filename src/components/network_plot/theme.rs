//! Visual styling for the network plot.
//!
//! Holds the fixed style constants of the scene and the channel glyph table
//! used to decorate source nodes.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Alpha in `0..=1`.
	pub a: f64,
}

impl Color {
	/// Opaque white.
	pub const WHITE: Color = Color::rgb(255, 255, 255);

	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// CSS `rgb()`/`rgba()` notation.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Type whose nodes are drawn larger and whose arrows stop further out.
pub const ORGANIZATION: &str = "Organization";

/// Type whose nodes carry a channel glyph.
pub const SOURCE: &str = "Source";

/// Radius multiplier for organization nodes.
pub const ORGANIZATION_SCALE: f64 = 1.2;

/// Arrowhead style.
#[derive(Clone, Debug)]
pub struct ArrowStyle {
	/// Extra distance between the arrow tip and the node edge.
	pub size: f64,
	/// Marker viewBox.
	pub view_box: &'static str,
	/// Arrowhead outline.
	pub path: &'static str,
	/// Marker size.
	pub marker_width: f64,
	/// See `marker_width`.
	pub marker_height: f64,
}

/// Link and node stroke style.
#[derive(Clone, Debug)]
pub struct StrokeStyle {
	/// Stroke width of links.
	pub link_width: f64,
	/// Outline around node circles.
	pub node_stroke: Color,
	/// Width of the node outline.
	pub node_stroke_width: f64,
}

/// Label style; the halo is drawn under the label for legibility.
#[derive(Clone, Debug)]
pub struct LabelStyle {
	/// Labels longer than this many characters are truncated.
	pub max_chars: usize,
	/// Appended to truncated labels.
	pub ellipsis: &'static str,
	/// Outline color of the label copy drawn underneath.
	pub halo: Color,
	/// Stroke width of the halo.
	pub halo_width: f64,
	/// Approximate glyph width relative to the font size, used to estimate
	/// label extents when no layout engine is available.
	pub char_width: f64,
	/// Label font size; used for bounds estimates.
	pub font_size: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Arrowhead markers.
	pub arrow: ArrowStyle,
	/// Link and node strokes.
	pub stroke: StrokeStyle,
	/// Node labels.
	pub label: LabelStyle,
	/// Fill of channel glyphs.
	pub glyph_color: Color,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			arrow: ArrowStyle {
				size: 7.0,
				view_box: "0 -5 10 10",
				path: "M0,-5L10,0L0,5",
				marker_width: 8.0,
				marker_height: 8.0,
			},
			stroke: StrokeStyle {
				link_width: 1.5,
				node_stroke: Color::WHITE,
				node_stroke_width: 1.5,
			},
			label: LabelStyle {
				max_chars: 25,
				ellipsis: "...",
				halo: Color::WHITE,
				halo_width: 3.0,
				char_width: 0.6,
				font_size: 10.0,
			},
			glyph_color: Color::WHITE,
		}
	}
}

/// Icon drawn on top of a source node for its channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelGlyph {
	/// Font Awesome code point.
	pub glyph: char,
	/// Font Awesome family carrying the glyph.
	pub font_family: &'static str,
}

const FONT_SOLID: &str = "\"Font Awesome 5 Free\"";
const FONT_BRANDS: &str = "\"Font Awesome 5 Brands\"";

/// Looks up the glyph for a channel unique name.
pub fn channel_glyph(channel: &str) -> Option<ChannelGlyph> {
	let (glyph, font_family) = match channel {
		"website" => ('\u{f0ac}', FONT_SOLID),
		"print" => ('\u{f1ea}', FONT_SOLID),
		"instagram" => ('\u{e055}', FONT_BRANDS),
		"facebook" => ('\u{f09a}', FONT_BRANDS),
		"twitter" => ('\u{f099}', FONT_BRANDS),
		"vkontakte" => ('\u{f189}', FONT_BRANDS),
		"telegram" => ('\u{f2c6}', FONT_BRANDS),
		_ => return None,
	};
	Some(ChannelGlyph { glyph, font_family })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn print_and_website_use_the_solid_font() {
		assert_eq!(channel_glyph("print").map(|g| g.font_family), Some(FONT_SOLID));
		assert_eq!(channel_glyph("website").map(|g| g.glyph), Some('\u{f0ac}'));
		assert_eq!(channel_glyph("telegram").map(|g| g.font_family), Some(FONT_BRANDS));
	}

	#[test]
	fn unknown_channel_has_no_glyph() {
		assert_eq!(channel_glyph("podcast"), None);
	}

	#[test]
	fn color_css() {
		assert_eq!(Color::WHITE.to_css(), "#ffffff");
		assert_eq!(Color::rgba(0, 0, 0, 0.5).to_css(), "rgba(0, 0, 0, 0.5)");
	}
}
