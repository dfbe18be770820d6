//! Short synthesized cues for bubble interactions.
//!
//! Every cue is scheduled on the audio clock and forgotten; nothing here
//! blocks or fails the frame. Browsers that refuse an `AudioContext` (or
//! suspend it until a user gesture) simply stay silent.

use log::debug;
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

pub struct AudioCues {
	context: Option<AudioContext>,
	volume: f32,
}

impl AudioCues {
	pub fn new(volume: f32) -> Self {
		let context = match AudioContext::new() {
			Ok(context) => Some(context),
			Err(err) => {
				debug!("folio-fx: audio unavailable: {:?}", err);
				None
			}
		};
		Self { context, volume }
	}

	/// Soft blip, louder and higher for harder hits. `intensity` in [0, 1].
	pub fn play_collision(&self, intensity: f64) {
		let intensity = intensity.clamp(0.0, 1.0);
		self.play(
			OscillatorType::Sine,
			(280.0 + 420.0 * intensity) as f32,
			None,
			self.volume * (0.25 + 0.75 * intensity as f32),
			0.12,
		);
	}

	/// Falling chirp when a bubble slips away from the pointer.
	pub fn play_release(&self) {
		self.play(OscillatorType::Triangle, 660.0, Some(330.0), self.volume * 0.6, 0.25);
	}

	/// Resume a context the browser suspended before the first gesture.
	pub fn resume(&self) {
		if let Some(context) = &self.context {
			let _ = context.resume();
		}
	}

	fn play(
		&self,
		wave: OscillatorType,
		from_hz: f32,
		to_hz: Option<f32>,
		peak: f32,
		duration: f64,
	) {
		let Some(context) = &self.context else {
			return;
		};
		let (Ok(source), Ok(gain)) = (OscillatorNode::new(context), GainNode::new(context)) else {
			return;
		};
		let t0 = context.current_time() + 0.01;
		source.set_type(wave);
		source.frequency().set_value(from_hz);
		if let Some(to_hz) = to_hz {
			let _ = source.frequency().linear_ramp_to_value_at_time(to_hz, t0 + duration);
		}
		gain.gain().set_value(0.0);
		let _ = gain.gain().linear_ramp_to_value_at_time(peak, t0 + 0.01);
		let _ = gain.gain().linear_ramp_to_value_at_time(0.0, t0 + duration);

		let _ = source.connect_with_audio_node(&gain);
		let _ = gain.connect_with_audio_node(&context.destination());
		let _ = source.start_with_when(t0);
		let _ = source.stop_with_when(t0 + duration + 0.02);
	}
}
