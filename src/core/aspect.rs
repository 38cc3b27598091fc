use crate::player::types::EngineOp;

/// Aspect ratios offered in the options popover, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    Original,
    Wide16x9,
    Standard4x3,
    Wide16x10,
    Cinema235,
    Cinema185,
    Ultra21x9,
    Square,
}

/// Tolerance when matching the engine's override to a known ratio
const MATCH_TOLERANCE: f64 = 0.001;

impl AspectRatio {
    pub const ALL: [AspectRatio; 8] = [
        AspectRatio::Original,
        AspectRatio::Wide16x9,
        AspectRatio::Standard4x3,
        AspectRatio::Wide16x10,
        AspectRatio::Cinema235,
        AspectRatio::Cinema185,
        AspectRatio::Ultra21x9,
        AspectRatio::Square,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Original => "Original",
            AspectRatio::Wide16x9 => "16:9",
            AspectRatio::Standard4x3 => "4:3",
            AspectRatio::Wide16x10 => "16:10",
            AspectRatio::Cinema235 => "2.35:1",
            AspectRatio::Cinema185 => "1.85:1",
            AspectRatio::Ultra21x9 => "21:9",
            AspectRatio::Square => "1:1",
        }
    }

    /// Value for `video-aspect-override`; `-1` disables the override.
    pub fn engine_value(self) -> &'static str {
        match self {
            AspectRatio::Original => "-1",
            other => other.label(),
        }
    }

    /// Width over height, or `-1.0` for no override
    pub fn ratio(self) -> f64 {
        match self {
            AspectRatio::Original => -1.0,
            other => parse_ratio(other.label()).unwrap_or(-1.0),
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|a| *a == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or(AspectRatio::Original)
    }

    /// Match the engine's current override. Unknown ratios map to `None`.
    pub fn from_override(value: f64) -> Option<Self> {
        let target = if value.is_finite() && value > 0.0 { value } else { -1.0 };
        Self::ALL
            .iter()
            .copied()
            .find(|a| (a.ratio() - target).abs() < MATCH_TOLERANCE)
    }

    pub fn op(self) -> EngineOp {
        EngineOp::command("set", ["video-aspect-override", self.engine_value()])
    }
}

/// Parse `W:H` into `W / H`.
pub fn parse_ratio(text: &str) -> Option<f64> {
    let (num, den) = text.split_once(':')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    (den != 0.0).then(|| num / den)
}

/// Position in the aspect list for the cycling button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AspectCycle {
    index: usize,
}

impl AspectCycle {
    pub fn current(&self) -> AspectRatio {
        AspectRatio::from_index(self.index)
    }

    pub fn advance(&mut self) -> AspectRatio {
        self.index = (self.index + 1) % AspectRatio::ALL.len();
        self.current()
    }

    pub fn set(&mut self, ratio: AspectRatio) {
        self.index = ratio.index();
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}
