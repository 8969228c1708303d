//! Keyframe animation: actions, per-bone tracks and scalar channels.

use serde::{Deserialize, Serialize};

/// Transform component driven by a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelProperty {
    TranslationX,
    TranslationY,
    TranslationZ,
    RotationW,
    RotationX,
    RotationY,
    RotationZ,
    ScaleX,
    ScaleY,
    ScaleZ,
}

impl ChannelProperty {
    /// Value of this component in the identity transform.
    pub fn identity_value(self) -> f32 {
        match self {
            Self::RotationW | Self::ScaleX | Self::ScaleY | Self::ScaleZ => 1.0,
            _ => 0.0,
        }
    }
}

/// Interpolation between two keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    Constant,
    #[default]
    Linear,
}

/// A single (time, value) sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Sparse keyframes for one transform component.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Channel {
    pub property: ChannelProperty,
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Keys in ascending time order.
    pub keyframes: Vec<Keyframe>,
}

impl Channel {
    pub fn new(property: ChannelProperty, keyframes: Vec<Keyframe>) -> Self {
        Self { property, interpolation: Interpolation::Linear, keyframes }
    }

    /// Times of the native keys.
    pub fn key_times(&self) -> impl Iterator<Item = f32> + '_ {
        self.keyframes.iter().map(|k| k.time)
    }

    /// Evaluate the curve at `time`.
    ///
    /// Holds the first/last value outside the key range. Returns `None`
    /// for a channel without keys.
    pub fn evaluate(&self, time: f32) -> Option<f32> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;
        if time <= first.time {
            return Some(first.value);
        }
        if time >= last.time {
            return Some(last.value);
        }

        // first.time < time < last.time, so 1 <= i < len
        let i = self.keyframes.partition_point(|k| k.time <= time);
        let (a, b) = (self.keyframes[i - 1], self.keyframes[i]);
        let value = match self.interpolation {
            Interpolation::Constant => a.value,
            Interpolation::Linear => {
                let span = b.time - a.time;
                if span > 0.0 {
                    a.value + (b.value - a.value) * ((time - a.time) / span)
                } else {
                    b.value
                }
            }
        };
        Some(value)
    }

    /// Whether keys are sorted by time.
    pub fn is_sorted(&self) -> bool {
        self.keyframes.windows(2).all(|w| w[0].time <= w[1].time)
    }
}

/// All channels animating one bone.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnimationTrack {
    pub bone: String,
    pub channels: Vec<Channel>,
}

impl AnimationTrack {
    pub fn new(bone: impl Into<String>, channels: Vec<Channel>) -> Self {
        Self { bone: bone.into(), channels }
    }

    /// Evaluate `property` at `time`, falling back to the identity value
    /// when the track has no channel (or no keys) for it.
    ///
    /// If several channels drive the same property the first one wins.
    pub fn evaluate(&self, property: ChannelProperty, time: f32) -> f32 {
        self.channels
            .iter()
            .filter(|c| c.property == property)
            .find_map(|c| c.evaluate(time))
            .unwrap_or_else(|| property.identity_value())
    }
}

/// Animation assigned to one object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    /// Name of the animated object.
    pub object: String,
    pub tracks: Vec<AnimationTrack>,
}

impl Action {
    pub fn new(name: impl Into<String>, object: impl Into<String>, tracks: Vec<AnimationTrack>) -> Self {
        Self { name: name.into(), object: object.into(), tracks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Channel {
        Channel::new(
            ChannelProperty::TranslationX,
            vec![Keyframe::new(0.0, 0.0), Keyframe::new(10.0, 10.0), Keyframe::new(20.0, 0.0)],
        )
    }

    #[test]
    fn test_evaluate_linear() {
        let c = ramp();
        assert_eq!(c.evaluate(0.0), Some(0.0));
        assert_eq!(c.evaluate(5.0), Some(5.0));
        assert_eq!(c.evaluate(10.0), Some(10.0));
        assert_eq!(c.evaluate(15.0), Some(5.0));
    }

    #[test]
    fn test_evaluate_clamps() {
        let c = ramp();
        assert_eq!(c.evaluate(-3.0), Some(0.0));
        assert_eq!(c.evaluate(99.0), Some(0.0));
    }

    #[test]
    fn test_evaluate_constant() {
        let mut c = ramp();
        c.interpolation = Interpolation::Constant;
        assert_eq!(c.evaluate(9.9), Some(0.0));
        assert_eq!(c.evaluate(10.0), Some(10.0));
    }

    #[test]
    fn test_evaluate_empty() {
        let c = Channel::new(ChannelProperty::ScaleX, Vec::new());
        assert_eq!(c.evaluate(1.0), None);
    }

    #[test]
    fn test_track_fallback_to_identity() {
        let track = AnimationTrack::new("Hip", vec![ramp()]);
        assert_eq!(track.evaluate(ChannelProperty::TranslationX, 5.0), 5.0);
        assert_eq!(track.evaluate(ChannelProperty::ScaleY, 5.0), 1.0);
        assert_eq!(track.evaluate(ChannelProperty::RotationW, 5.0), 1.0);
        assert_eq!(track.evaluate(ChannelProperty::RotationX, 5.0), 0.0);
    }

    #[test]
    fn test_property_json_names() {
        let p: ChannelProperty = serde_json::from_str("\"rotation_w\"").unwrap();
        assert_eq!(p, ChannelProperty::RotationW);
    }
}
