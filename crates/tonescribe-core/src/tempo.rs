//! Mapping frame durations onto MIDI ticks.

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, ConvertResult};

/// Assumed tempo in beats per minute. The pipeline never detects tempo.
pub const TEMPO_BPM: u32 = 120;

/// MIDI resolution in ticks per quarter note.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Default playback-speed multiplier for [`TempoPolicy::TargetDuration`].
pub const DEFAULT_SPEED: f32 = 1.0;

fn default_speed() -> f32 {
    DEFAULT_SPEED
}

/// How frame counts become tick counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TempoPolicy {
    /// One tick per frame.
    #[default]
    FixedPerFrame,
    /// Rescale so the track lasts about as long as the audio, divided by
    /// `speed`, at [`TEMPO_BPM`] and [`TICKS_PER_QUARTER`].
    TargetDuration {
        /// Playback-speed multiplier (> 0).
        #[serde(default = "default_speed")]
        speed: f32,
    },
}

impl TempoPolicy {
    /// Target-duration policy at normal speed.
    pub fn target_duration() -> Self {
        TempoPolicy::TargetDuration {
            speed: DEFAULT_SPEED,
        }
    }

    /// Checks the policy parameters.
    pub fn validate(&self) -> ConvertResult<()> {
        match *self {
            TempoPolicy::FixedPerFrame => Ok(()),
            TempoPolicy::TargetDuration { speed } => {
                if speed.is_finite() && speed > 0.0 {
                    Ok(())
                } else {
                    Err(ConvertError::invalid_param(
                        "speed",
                        format!("must be a positive finite number, got {}", speed),
                    ))
                }
            }
        }
    }
}

/// Seconds covered by one tick at the fixed tempo and resolution.
pub fn seconds_per_tick() -> f64 {
    60.0 / (TEMPO_BPM as f64 * TICKS_PER_QUARTER as f64)
}

/// A resolved frame-to-tick scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoMap {
    /// Ticks per analysis frame (at least 1).
    pub ticks_per_frame: u32,
}

impl TempoMap {
    /// Resolves a policy against the input dimensions.
    ///
    /// For [`TempoPolicy::TargetDuration`] the scale is
    /// `max(1, round((desired_seconds / total_frames) / seconds_per_tick))`
    /// with `desired_seconds = total_samples / sample_rate / speed` and
    /// `total_frames = ceil(total_samples / hop)`.
    pub fn resolve(
        policy: &TempoPolicy,
        total_samples: usize,
        sample_rate: u32,
        hop: u32,
    ) -> ConvertResult<Self> {
        policy.validate()?;
        let speed = match *policy {
            TempoPolicy::FixedPerFrame => return Ok(Self { ticks_per_frame: 1 }),
            TempoPolicy::TargetDuration { speed } => speed as f64,
        };
        if sample_rate == 0 {
            return Err(ConvertError::invalid_param(
                "sample_rate",
                "must be greater than 0",
            ));
        }
        if hop == 0 {
            return Err(ConvertError::invalid_param("hop", "must be greater than 0"));
        }

        let total_frames = total_samples.div_ceil(hop as usize);
        if total_frames == 0 {
            return Ok(Self { ticks_per_frame: 1 });
        }

        let desired_seconds = total_samples as f64 / sample_rate as f64 / speed;
        let ticks = ((desired_seconds / total_frames as f64) / seconds_per_tick())
            .round()
            .max(1.0);
        if ticks > u32::MAX as f64 {
            return Err(ConvertError::invalid_param(
                "speed",
                format!("{} makes one frame longer than u32::MAX ticks", speed),
            ));
        }

        Ok(Self {
            ticks_per_frame: ticks as u32,
        })
    }

    /// Duration in ticks for a span of `frames` frames.
    pub fn ticks_for(&self, frames: u32) -> ConvertResult<u32> {
        frames.checked_mul(self.ticks_per_frame).ok_or_else(|| {
            ConvertError::encoding(format!(
                "{} frames at {} ticks per frame overflows u32",
                frames, self.ticks_per_frame
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_per_tick() {
        assert!((seconds_per_tick() - 1.0 / 960.0).abs() < 1e-15);
    }

    #[test]
    fn test_fixed_policy_is_one_tick() {
        let map = TempoMap::resolve(&TempoPolicy::FixedPerFrame, 44100, 44100, 1024).unwrap();
        assert_eq!(map.ticks_per_frame, 1);
        assert_eq!(map.ticks_for(42).unwrap(), 42);
    }

    #[test]
    fn test_target_duration_one_second() {
        // 1 s over ceil(44100 / 1024) = 44 frames is 22.7 ms per frame,
        // 21.8 ticks at 960 ticks per second.
        let map = TempoMap::resolve(&TempoPolicy::target_duration(), 44100, 44100, 1024).unwrap();
        assert_eq!(map.ticks_per_frame, 22);
        assert_eq!(map.ticks_for(42).unwrap(), 924);
    }

    #[test]
    fn test_speed_shortens_frames() {
        let normal = TempoMap::resolve(&TempoPolicy::target_duration(), 441000, 44100, 1024).unwrap();
        let double = TempoMap::resolve(
            &TempoPolicy::TargetDuration { speed: 2.0 },
            441000,
            44100,
            1024,
        )
        .unwrap();
        assert!(double.ticks_per_frame < normal.ticks_per_frame);
        // 10 s over 431 frames at 960 ticks/s = 22.27 -> 22; half of that -> 11.
        assert_eq!(normal.ticks_per_frame, 22);
        assert_eq!(double.ticks_per_frame, 11);
    }

    #[test]
    fn test_clamps_to_one_tick() {
        let map = TempoMap::resolve(
            &TempoPolicy::TargetDuration { speed: 1000.0 },
            44100,
            44100,
            1024,
        )
        .unwrap();
        assert_eq!(map.ticks_per_frame, 1);
    }

    #[test]
    fn test_rejects_bad_speed() {
        for speed in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = TempoMap::resolve(&TempoPolicy::TargetDuration { speed }, 100, 100, 10)
                .unwrap_err();
            assert!(matches!(err, ConvertError::InvalidParameter { ref name, .. } if name == "speed"));
        }
    }

    #[test]
    fn test_rejects_zero_sample_rate() {
        let err = TempoMap::resolve(&TempoPolicy::target_duration(), 100, 0, 10).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidParameter { ref name, .. } if name == "sample_rate"));
    }

    #[test]
    fn test_ticks_for_overflow() {
        let map = TempoMap {
            ticks_per_frame: u32::MAX,
        };
        assert!(matches!(
            map.ticks_for(2),
            Err(ConvertError::EncodingInvariantViolation { .. })
        ));
    }

    #[test]
    fn test_policy_serde_shape() {
        let json = serde_json::to_string(&TempoPolicy::FixedPerFrame).unwrap();
        assert_eq!(json, r#"{"kind":"fixed_per_frame"}"#);

        let parsed: TempoPolicy = serde_json::from_str(r#"{"kind":"target_duration"}"#).unwrap();
        assert_eq!(parsed, TempoPolicy::TargetDuration { speed: 1.0 });

        let parsed: TempoPolicy =
            serde_json::from_str(r#"{"kind":"target_duration","speed":1.5}"#).unwrap();
        assert_eq!(parsed, TempoPolicy::TargetDuration { speed: 1.5 });
    }
}
