//! Zoom-dependent sizes for graph visuals.
//!
//! Link directives express widths and arrow lengths in abstract units; this
//! module turns those units into world-space sizes for the current zoom level.
//!
//! - **World-space** values scale with zoom (appear larger when zoomed in).
//! - **Screen-space** values keep a constant pixel size; they are divided by
//!   the zoom factor `k` to counteract the canvas transform.

/// How a visual size scales with zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant screen-space size (pixels).
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Base node radius in world units.
	pub radius: f64,
	pub radius_behavior: ScaleBehavior,
	/// Hit detection radius in world units.
	pub hit_radius: f64,
	pub hit_behavior: ScaleBehavior,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Zoom level below which labels stop shrinking.
	pub label_min_k: f64,
	/// Badge font size relative to the node radius.
	pub badge_ratio: f64,
	/// Ring stroke width and gap to the node edge, in screen pixels.
	pub ring_width: f64,
	pub ring_offset: f64,
}

#[derive(Clone, Debug)]
pub struct LinkScaleConfig {
	/// Screen pixels per unit of directive width.
	pub width_unit: f64,
	/// World units per unit of directive arrow length.
	pub arrow_unit: f64,
	pub arrow_behavior: ScaleBehavior,
	/// Arrows fade out below this zoom level.
	pub arrow_fade_k: f64,
	/// Pointer distance that still hovers a link.
	pub hit_distance: f64,
	pub hit_behavior: ScaleBehavior,
	/// World units per unit of directive particle width.
	pub particle_unit: f64,
	/// Particle travel speed along a link, in link lengths per second.
	pub particle_speed: f64,
}

/// Scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub node: NodeScaleConfig,
	pub link: LinkScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				radius: 6.0,
				radius_behavior: ScaleBehavior::Clamped {
					min_screen: 5.0,
					max_screen: f64::INFINITY,
				},
				hit_radius: 10.0,
				hit_behavior: ScaleBehavior::Clamped {
					min_screen: 6.0,
					max_screen: f64::INFINITY,
				},
				label_size: 10.0,
				label_min_k: 0.5,
				badge_ratio: 0.6,
				ring_width: 3.0,
				ring_offset: 2.0,
			},
			link: LinkScaleConfig {
				width_unit: 1.0,
				arrow_unit: 1.5,
				arrow_behavior: ScaleBehavior::Clamped {
					min_screen: 0.0,
					max_screen: 24.0,
				},
				arrow_fade_k: 0.4,
				hit_distance: 4.0,
				hit_behavior: ScaleBehavior::Screen,
				particle_unit: 0.5,
				particle_speed: 0.4,
			},
		}
	}
}

/// Pre-computed sizes for a specific zoom level.
///
/// Create this once per frame and pass it to the drawing functions. All sizes
/// are in world-space (ready to use after the canvas transform).
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub k: f64,
	pub node_radius: f64,
	pub hit_radius: f64,
	/// Label font (e.g., "10px sans-serif").
	pub label_font: String,
	pub badge_ratio: f64,
	pub ring_width: f64,
	pub ring_offset: f64,
	/// World width of one directive width unit.
	pub line_unit: f64,
	pub arrow_unit: f64,
	/// Arrow alpha multiplier [0, 1].
	pub arrow_alpha: f64,
	pub link_hit_distance: f64,
	pub particle_unit: f64,
	pub particle_speed: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let node = &config.node;
		let link = &config.link;
		Self {
			k,
			node_radius: node.radius_behavior.apply(node.radius, k),
			hit_radius: node.hit_behavior.apply(node.hit_radius, k),
			label_font: format!("{}px sans-serif", node.label_size / k.max(node.label_min_k)),
			badge_ratio: node.badge_ratio,
			ring_width: node.ring_width / k,
			ring_offset: node.ring_offset / k,
			line_unit: link.width_unit / k,
			arrow_unit: link.arrow_behavior.apply(link.arrow_unit, k),
			arrow_alpha: (k / link.arrow_fade_k).clamp(0.0, 1.0),
			link_hit_distance: link.hit_behavior.apply(link.hit_distance, k),
			particle_unit: link.particle_unit,
			particle_speed: link.particle_speed,
		}
	}

	/// Arrows fully faded out are not drawn.
	pub fn cull_arrows(&self) -> bool {
		self.arrow_alpha < 0.05
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn screen_sizes_counter_zoom() {
		assert_eq!(ScaleBehavior::Screen.apply(4.0, 2.0), 2.0);
		let clamped = ScaleBehavior::Clamped {
			min_screen: 5.0,
			max_screen: 20.0,
		};
		assert_eq!(clamped.apply(6.0, 1.0), 6.0);
		// at k = 0.5 the node would be 3px on screen, so it grows to 10 world units
		assert_eq!(clamped.apply(6.0, 0.5), 10.0);
		assert_eq!(clamped.apply(6.0, 10.0), 2.0);
	}

	#[test]
	fn arrows_fade_when_zoomed_out() {
		let config = ScaleConfig::default();
		assert!(!ScaledValues::new(&config, 1.0).cull_arrows());
		assert!(ScaledValues::new(&config, 0.01).cull_arrows());
		assert_eq!(ScaledValues::new(&config, 2.0).line_unit, 0.5);
	}

	#[test]
	fn link_hit_distance_stays_constant_on_screen() {
		let config = ScaleConfig::default();
		for k in [0.5, 1.0, 4.0] {
			let scaled = ScaledValues::new(&config, k);
			assert_eq!(scaled.link_hit_distance * k, config.link.hit_distance);
		}
	}
}
