//! Visual theming for the force graph.
//!
//! Node fills are not part of the theme: they are derived from the owning
//! service id so a service keeps its color across snapshots.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0.0);

	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Parses `#rgb`, `#rrggbb` or the same without the leading `#`.
	pub fn from_hex(hex: &str) -> Option<Self> {
		let hex = hex.strip_prefix('#').unwrap_or(hex);
		let expanded: String = match hex.len() {
			3 => hex.chars().flat_map(|c| [c, c]).collect(),
			6 => hex.to_string(),
			_ => return None,
		};
		let channel = |i: usize| u8::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
		Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
	}

	/// Stable color for an id: the external node is black, everything else
	/// sums the leading UTF-16 unit of each character into a 24-bit color.
	pub fn generate_from_string(id: &str) -> Self {
		if id == crate::graph::EXTERNAL_NODE_ID {
			return Self::rgb(0, 0, 0);
		}
		let sum: u64 = id
			.chars()
			.map(|c| u64::from(c.encode_utf16(&mut [0; 2])[0]))
			.sum();
		let packed = (sum * 1_234_567) % (1 << 24);
		Self::rgb((packed >> 16) as u8, (packed >> 8) as u8, packed as u8)
	}

	/// HSL lightness in percent.
	pub fn lightness(self) -> f64 {
		let max = self.r.max(self.g).max(self.b) as f64 / 255.0;
		let min = self.r.min(self.g).min(self.b) as f64 / 255.0;
		(max + min) / 2.0 * 100.0
	}

	/// Black on light colors, white on dark ones.
	pub fn decide_foreground(self) -> Self {
		if self.lightness() > 50.0 {
			Self::rgb(0, 0, 0)
		} else {
			Self::rgb(255, 255, 255)
		}
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		let up = |c: u8| (c as f64 + (255.0 - c as f64) * f) as u8;
		Self {
			r: up(self.r),
			g: up(self.g),
			b: up(self.b),
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		let down = |c: u8| (c as f64 * f) as u8;
		Self {
			r: down(self.r),
			g: down(self.g),
			b: down(self.b),
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	pub color: Color,
	/// Outer color of the radial gradient.
	pub color_secondary: Color,
	pub use_gradient: bool,
	/// Vignette intensity (0.0 = none, 1.0 = strong)
	pub vignette: f64,
}

/// Edge colors used when a link directive keeps the default.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	pub color: Color,
	pub arrow_color: Color,
	pub particle_color: Color,
}

/// Node decoration.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Whether nodes have inner gradients
	pub use_gradient: bool,
	pub label_color: Color,
	/// Border/stroke width (0 = no border)
	pub border_width: f64,
	pub border_color: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
}

impl Theme {
	/// Dark canvas with subtle gradients (default)
	pub fn dark() -> Self {
		Self {
			name: "dark",
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(30, 35, 42),
				use_gradient: true,
				vignette: 0.15,
			},
			edge: EdgeStyle {
				color: Color::rgba(140, 160, 180, 0.5),
				arrow_color: Color::rgba(140, 160, 180, 0.9),
				particle_color: Color::rgba(200, 210, 220, 0.8),
			},
			node: NodeStyle {
				use_gradient: true,
				label_color: Color::rgba(255, 255, 255, 0.85),
				border_width: 0.0,
				border_color: Color::TRANSPARENT,
			},
		}
	}

	/// White dashboard canvas with dim gray arrows and black labels.
	pub fn light() -> Self {
		Self {
			name: "light",
			background: BackgroundStyle {
				color: Color::rgb(255, 255, 255),
				color_secondary: Color::rgb(255, 255, 255),
				use_gradient: false,
				vignette: 0.0,
			},
			edge: EdgeStyle {
				color: Color::rgba(105, 105, 105, 0.6),
				arrow_color: Color::rgb(105, 105, 105),
				particle_color: Color::rgba(105, 105, 105, 0.8),
			},
			node: NodeStyle {
				use_gradient: false,
				label_color: Color::rgb(0, 0, 0),
				border_width: 1.0,
				border_color: Color::rgba(0, 0, 0, 0.2),
			},
		}
	}

	/// Looks a theme up by name, falling back to the default.
	pub fn by_name(name: &str) -> Self {
		match name {
			"light" => Self::light(),
			_ => Self::dark(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::dark()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hex_parsing() {
		assert_eq!(Color::from_hex("#fff"), Some(Color::rgb(255, 255, 255)));
		assert_eq!(Color::from_hex("112233"), Some(Color::rgb(0x11, 0x22, 0x33)));
		assert_eq!(Color::from_hex("#12345"), None);
		assert_eq!(Color::from_hex("#zzzzzz"), None);
	}

	#[test]
	fn generated_colors_are_stable() {
		// "ab" = 97 + 98 = 195; 195 * 1234567 % 2^24 = 0x5968d5
		assert_eq!(Color::generate_from_string("ab"), Color::rgb(0x59, 0x68, 0xd5));
		assert_eq!(Color::generate_from_string("ba"), Color::generate_from_string("ab"));
		assert_eq!(Color::generate_from_string("null"), Color::rgb(0, 0, 0));
		// U+1F600 counts once, as its high surrogate 0xd83d
		assert_eq!(Color::generate_from_string("\u{1F600}"), Color::rgb(0x7f, 0x06, 0x2b));
	}

	#[test]
	fn foreground_contrast() {
		assert_eq!(Color::rgb(250, 250, 200).decide_foreground(), Color::rgb(0, 0, 0));
		assert_eq!(Color::rgb(20, 20, 80).decide_foreground(), Color::rgb(255, 255, 255));
	}

	#[test]
	fn css_output() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(Color::rgba(0, 255, 0, 0.5).to_css(), "rgba(0, 255, 0, 0.5)");
		assert_eq!(Theme::by_name("light").name, "light");
		assert_eq!(Theme::by_name("unknown").name, "dark");
	}
}
