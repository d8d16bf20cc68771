//! Directional particles flowing along links from source to target.

/// Particles drawn on each visible link.
pub const PARTICLES_PER_LINK: usize = 2;

/// Deterministic pseudo-random value in `[0, 1)`.
fn pseudo_random(seed: f64) -> f64 {
	let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
	x - x.floor()
}

/// Positions of a link's particles as fractions of its length.
///
/// Particles are spread evenly and advance with `time`; `seed` shifts the
/// phase so neighbouring links do not pulse in step.
pub fn particle_offsets(time: f64, speed: f64, seed: usize) -> impl Iterator<Item = f64> {
	let phase = pseudo_random(seed as f64 + 1.0);
	(0..PARTICLES_PER_LINK).map(move |i| {
		let t = phase + time * speed + i as f64 / PARTICLES_PER_LINK as f64;
		t - t.floor()
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn offsets_stay_on_the_link() {
		for step in 0..100 {
			for t in particle_offsets(step as f64 * 0.37, 0.4, step) {
				assert!((0.0..1.0).contains(&t));
			}
		}
	}

	#[test]
	fn particles_are_evenly_spaced() {
		let offsets: Vec<f64> = particle_offsets(1.25, 0.4, 7).collect();
		assert_eq!(offsets.len(), PARTICLES_PER_LINK);
		let gap = (offsets[1] - offsets[0]).rem_euclid(1.0);
		assert!((gap - 1.0 / PARTICLES_PER_LINK as f64).abs() < 1e-9);
	}
}
