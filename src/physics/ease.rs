//! Frame-rate aware easing helpers.

/// Blend factor `k` defined per 60 Hz frame, rescaled to `frames` frames.
pub fn blend(k: f64, frames: f64) -> f64 {
	1.0 - (1.0 - k.clamp(0.0, 1.0)).powf(frames)
}

/// Move `value` towards `target` by the per-frame blend `k`.
pub fn approach(value: f64, target: f64, k: f64, frames: f64) -> f64 {
	value + (target - value) * blend(k, frames)
}

/// Hermite smoothing of `t` in [0, 1].
pub fn smooth_step(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn one_frame_matches_plain_lerp() {
		assert!((approach(0.0, 1.0, 0.1, 1.0) - 0.1).abs() < 1e-12);
	}

	#[test]
	fn two_half_frames_equal_one_frame() {
		let half = approach(approach(0.0, 1.0, 0.2, 0.5), 1.0, 0.2, 0.5);
		assert!((half - approach(0.0, 1.0, 0.2, 1.0)).abs() < 1e-12);
	}

	#[test]
	fn smooth_step_endpoints() {
		assert_eq!(smooth_step(0.0), 0.0);
		assert_eq!(smooth_step(1.0), 1.0);
		assert_eq!(smooth_step(2.0), 1.0);
	}
}
