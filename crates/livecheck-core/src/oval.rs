use crate::config::LivenessConfig;
use crate::types::FaceBox;

/// Target region the face must sit inside during the alignment step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OvalRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl OvalRegion {
    /// Oval of the given size centred in a `viewport_width` × `viewport_height` viewport.
    pub fn centered(
        viewport_width: f32,
        viewport_height: f32,
        width: f32,
        height: f32,
        margin: f32,
    ) -> Self {
        Self {
            x: (viewport_width - width) / 2.0,
            y: (viewport_height - height) / 2.0,
            width,
            height,
            margin,
        }
    }

    pub fn from_config(config: &LivenessConfig) -> Self {
        Self::centered(
            config.viewport_width,
            config.viewport_height,
            config.oval_width,
            config.oval_height,
            config.oval_margin,
        )
    }

    /// Whether `face` lies entirely inside the oval's bounds grown by the margin.
    /// Edges touching the margined bounds count as inside.
    pub fn contains(&self, face: &FaceBox) -> bool {
        face.x >= self.x - self.margin
            && face.y >= self.y - self.margin
            && face.right() <= self.x + self.width + self.margin
            && face.bottom() <= self.y + self.height + self.margin
    }
}
