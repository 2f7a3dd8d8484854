//! Player preferences
//!
//! Held in memory for the session; the facade changes them through `Game`.

/// How the avatar is steered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    /// Four-directional digital input
    #[default]
    Direct,
    /// Follow the on-screen pointer
    Pointer,
}

impl ControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::Direct => "Direct",
            ControlMode::Pointer => "Pointer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "direct" | "keyboard" | "keys" => Some(ControlMode::Direct),
            "pointer" | "mouse" => Some(ControlMode::Pointer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Movement mode toggle read by the avatar every tick
    pub control_mode: ControlMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_volume: 0.8,
            control_mode: ControlMode::Direct,
        }
    }
}

impl Settings {
    /// Set music volume, clamped to [0, 1]
    pub fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = if volume.is_nan() {
            0.0
        } else {
            volume.clamp(0.0, 1.0)
        };
    }
}
