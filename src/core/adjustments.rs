use crate::constants::{HFLIP_FILTER, HFLIP_LABEL, VFLIP_FILTER, VFLIP_LABEL};
use crate::player::types::{EngineOp, PropertyValue};

/// Numeric video/audio adjustments exposed in the options popover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adjustment {
    Zoom,
    Contrast,
    Brightness,
    Gamma,
    Saturation,
    SubDelay,
    AudioDelay,
    Speed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdjustStep {
    Increment,
    Decrement,
    Reset,
    Set(f64),
}

impl Adjustment {
    pub const ALL: [Adjustment; 8] = [
        Adjustment::Zoom,
        Adjustment::Contrast,
        Adjustment::Brightness,
        Adjustment::Gamma,
        Adjustment::Saturation,
        Adjustment::SubDelay,
        Adjustment::AudioDelay,
        Adjustment::Speed,
    ];

    pub fn property(self) -> &'static str {
        match self {
            Adjustment::Zoom => "video-zoom",
            Adjustment::Contrast => "contrast",
            Adjustment::Brightness => "brightness",
            Adjustment::Gamma => "gamma",
            Adjustment::Saturation => "saturation",
            Adjustment::SubDelay => "sub-delay",
            Adjustment::AudioDelay => "audio-delay",
            Adjustment::Speed => "speed",
        }
    }

    pub fn from_property(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.property() == name)
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|a| *a == self).unwrap_or(0)
    }

    pub fn label(self) -> &'static str {
        match self {
            Adjustment::Zoom => "Zoom",
            Adjustment::Contrast => "Contrast",
            Adjustment::Brightness => "Brightness",
            Adjustment::Gamma => "Gamma",
            Adjustment::Saturation => "Saturation",
            Adjustment::SubDelay => "Subtitle Delay",
            Adjustment::AudioDelay => "Audio Delay",
            Adjustment::Speed => "Speed",
        }
    }

    pub fn step(self) -> f64 {
        match self {
            Adjustment::Zoom | Adjustment::SubDelay | Adjustment::AudioDelay => 0.1,
            Adjustment::Contrast
            | Adjustment::Brightness
            | Adjustment::Gamma
            | Adjustment::Saturation => 1.0,
            Adjustment::Speed => 0.05,
        }
    }

    pub fn default_value(self) -> f64 {
        match self {
            Adjustment::Speed => 1.0,
            _ => 0.0,
        }
    }

    pub fn digits(self) -> u32 {
        if self.is_integer() { 0 } else { 2 }
    }

    /// Range the spin buttons allow; the engine enforces its own.
    pub fn range(self) -> (f64, f64) {
        match self {
            Adjustment::Zoom => (-20.0, 20.0),
            Adjustment::Contrast
            | Adjustment::Brightness
            | Adjustment::Gamma
            | Adjustment::Saturation => (-100.0, 100.0),
            Adjustment::SubDelay | Adjustment::AudioDelay => (-600.0, 600.0),
            Adjustment::Speed => (0.01, 100.0),
        }
    }

    /// Equalizer properties are integers in the engine
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Adjustment::Contrast | Adjustment::Brightness | Adjustment::Gamma | Adjustment::Saturation
        )
    }

    pub fn round(self, value: f64) -> f64 {
        let scale = 10f64.powi(self.digits() as i32);
        (value * scale).round() / scale
    }

    /// Value after applying `step` to `current`.
    pub fn next_value(self, current: f64, step: AdjustStep) -> f64 {
        let value = match step {
            AdjustStep::Increment => current + self.step(),
            AdjustStep::Decrement => current - self.step(),
            AdjustStep::Reset => self.default_value(),
            AdjustStep::Set(value) => value,
        };
        self.round(value)
    }

    pub fn to_property_value(self, value: f64) -> PropertyValue {
        if self.is_integer() {
            PropertyValue::Int(value.round() as i64)
        } else {
            PropertyValue::Double(self.round(value))
        }
    }

    pub fn osd_text(self, value: f64) -> String {
        if self.is_integer() {
            format!("{}: {}", self.label(), value.round() as i64)
        } else {
            format!("{}: {:.2}", self.label(), value)
        }
    }
}

/// Current value of every adjustment, starting at the defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentValues([f64; 8]);

impl Default for AdjustmentValues {
    fn default() -> Self {
        Self(Adjustment::ALL.map(Adjustment::default_value))
    }
}

impl AdjustmentValues {
    pub fn get(&self, adjustment: Adjustment) -> f64 {
        self.0[adjustment.index()]
    }

    pub fn set(&mut self, adjustment: Adjustment, value: f64) {
        self.0[adjustment.index()] = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Left,
    Right,
    Reset,
}

/// New `video-rotate` value, always in `0..360`.
pub fn rotate(current: i64, rotation: Rotation) -> i64 {
    match rotation {
        Rotation::Left => (current - 90).rem_euclid(360),
        Rotation::Right => (current + 90).rem_euclid(360),
        Rotation::Reset => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
    Horizontal,
    Vertical,
    Reset,
}

pub fn flip_ops(flip: Flip) -> Vec<EngineOp> {
    match flip {
        Flip::Horizontal => vec![EngineOp::command("vf", ["toggle", HFLIP_FILTER])],
        Flip::Vertical => vec![EngineOp::command("vf", ["toggle", VFLIP_FILTER])],
        Flip::Reset => vec![
            EngineOp::command("vf", ["remove", HFLIP_LABEL]),
            EngineOp::command("vf", ["remove", VFLIP_LABEL]),
        ],
    }
}

/// Flipping only works when frames pass through system memory.
pub fn flip_available(hwdec_enabled: bool, hwdec_current: &str) -> bool {
    !(hwdec_enabled && !hwdec_current.contains("-copy"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_and_decrements_are_exact_inverses() {
        for adjustment in Adjustment::ALL {
            for start in [adjustment.default_value(), 0.3, -2.0] {
                let start = adjustment.round(start);
                let mut value = start;
                for _ in 0..37 {
                    value = adjustment.next_value(value, AdjustStep::Increment);
                }
                for _ in 0..37 {
                    value = adjustment.next_value(value, AdjustStep::Decrement);
                }
                assert_eq!(value, start, "{:?} drifted from {}", adjustment, start);
            }
        }
    }

    #[test]
    fn steps_match_the_table() {
        assert_eq!(Adjustment::Zoom.next_value(0.0, AdjustStep::Increment), 0.1);
        assert_eq!(Adjustment::Contrast.next_value(0.0, AdjustStep::Decrement), -1.0);
        assert_eq!(Adjustment::Speed.next_value(1.0, AdjustStep::Increment), 1.05);
        assert_eq!(Adjustment::Speed.next_value(3.3, AdjustStep::Reset), 1.0);
        assert_eq!(Adjustment::SubDelay.next_value(0.0, AdjustStep::Set(0.123)), 0.12);
    }

    #[test]
    fn equalizer_values_are_sent_as_integers() {
        assert_eq!(Adjustment::Gamma.to_property_value(4.0), PropertyValue::Int(4));
        assert_eq!(Adjustment::Zoom.to_property_value(0.1), PropertyValue::Double(0.1));
        assert_eq!(Adjustment::Saturation.osd_text(-3.0), "Saturation: -3");
        assert_eq!(Adjustment::AudioDelay.osd_text(0.1), "Audio Delay: 0.10");
    }

    #[test]
    fn rotation_wraps_in_both_directions() {
        assert_eq!(rotate(270, Rotation::Right), 0);
        assert_eq!(rotate(0, Rotation::Left), 270);
        assert_eq!(rotate(90, Rotation::Reset), 0);

        let mut angle = 0;
        for _ in 0..4 {
            angle = rotate(angle, Rotation::Right);
        }
        assert_eq!(angle, 0);
    }

    #[test]
    fn flip_needs_a_copy_decoder_under_hwdec() {
        assert!(flip_available(false, "vaapi"));
        assert!(flip_available(true, "vaapi-copy"));
        assert!(!flip_available(true, "vaapi"));
        assert!(!flip_available(true, ""));
    }
}
