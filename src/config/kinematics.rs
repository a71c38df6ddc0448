//! Linkage geometry of the machine.

use serde::Deserialize;

/// Rig-specific calibration of the two-arm linkage and the lead screws.
///
/// Lengths are in millimetres. `od`/`df` belong to the Y-driven arm,
/// `oe`/`eg` to the X-driven arm; `ood`/`ooe` are the pivot offsets from the
/// origin. Step constants convert millimetres of travel into degrees of
/// shaft rotation (360 / screw pitch).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct KinematicsConfig {
    /// Lower link of the Y-driven arm.
    #[serde(default = "default_lower_link")]
    pub od: f32,
    /// Lower link of the X-driven arm.
    #[serde(default = "default_lower_link")]
    pub oe: f32,
    /// Upper link of the Y-driven arm.
    #[serde(default = "default_upper_link")]
    pub df: f32,
    /// Upper link of the X-driven arm.
    #[serde(default = "default_upper_link")]
    pub eg: f32,
    /// Pivot offset of the Y-driven arm.
    #[serde(default = "default_pivot_offset")]
    pub ood: f32,
    /// Pivot offset of the X-driven arm.
    #[serde(default = "default_pivot_offset")]
    pub ooe: f32,
    /// X step constant, degrees per mm.
    #[serde(default = "default_k_xy")]
    pub kx: f32,
    /// Y step constant, degrees per mm.
    #[serde(default = "default_k_xy")]
    pub ky: f32,
    /// Z step constant, degrees per mm.
    #[serde(default = "default_kz")]
    pub kz: f32,
    /// Initial angle of link EG, degrees.
    #[serde(default = "default_initial_angle")]
    pub ix: f32,
    /// Initial angle of link DF, degrees.
    #[serde(default = "default_initial_angle")]
    pub iy: f32,
}

fn default_lower_link() -> f32 {
    241.0996
}

fn default_upper_link() -> f32 {
    284.2327
}

fn default_pivot_offset() -> f32 {
    82.0
}

fn default_k_xy() -> f32 {
    72.0
}

fn default_kz() -> f32 {
    120.0
}

fn default_initial_angle() -> f32 {
    90.0 - 2.3188
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            od: default_lower_link(),
            oe: default_lower_link(),
            df: default_upper_link(),
            eg: default_upper_link(),
            ood: default_pivot_offset(),
            ooe: default_pivot_offset(),
            kx: default_k_xy(),
            ky: default_k_xy(),
            kz: default_kz(),
            ix: default_initial_angle(),
            iy: default_initial_angle(),
        }
    }
}
