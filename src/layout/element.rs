//! The overlay element model handed to downstream renderers.

use serde::{Deserialize, Serialize};

use crate::color::{Color, ContrastDecision};
use crate::layout::OverlayBox;

/// Semantic role of a text element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Headline,
    #[serde(alias = "subtext")]
    Subhead,
    Cta,
    Body,
    Caption,
    Hashtag,
    Tagline,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Headline => "headline",
            Role::Subhead => "subhead",
            Role::Cta => "cta",
            Role::Body => "body",
            Role::Caption => "caption",
            Role::Hashtag => "hashtag",
            Role::Tagline => "tagline",
        }
    }

    /// Font size relative to the headline (typographic scale).
    pub fn scale(&self) -> f64 {
        match self {
            Role::Headline => 1.0,
            Role::Subhead => 0.5,
            Role::Tagline => 0.45,
            Role::Cta => 0.42,
            Role::Body => 0.36,
            Role::Caption | Role::Hashtag => 0.3,
        }
    }

    /// Default top-to-bottom position within a stack.
    pub fn stack_order(&self) -> usize {
        match self {
            Role::Headline => 0,
            Role::Subhead => 1,
            Role::Tagline => 2,
            Role::Body => 3,
            Role::Cta => 4,
            Role::Caption => 5,
            Role::Hashtag => 6,
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, Role::Headline)
    }

    fn weight(&self) -> u16 {
        match self {
            Role::Headline => 700,
            Role::Cta => 600,
            Role::Subhead => 500,
            _ => 400,
        }
    }

    fn style(&self) -> FontStyle {
        match self {
            Role::Tagline => FontStyle::Italic,
            _ => FontStyle::Normal,
        }
    }

    fn line_height(&self) -> f64 {
        match self {
            Role::Headline => 1.1,
            Role::Subhead | Role::Tagline => 1.2,
            _ => 1.3,
        }
    }

    fn letter_spacing(&self) -> f64 {
        match self {
            Role::Cta => 0.05,
            Role::Hashtag => 0.02,
            Role::Headline => -0.01,
            _ => 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    Normal,
    Italic,
}

/// Font settings; sizes are in pixels of the source image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Typography {
    pub font_family: String,
    pub font_size: f64,
    pub font_weight: u16,
    pub font_style: FontStyle,
    pub line_height: f64,
    /// In em.
    pub letter_spacing: f64,
}

impl Typography {
    /// Role defaults with the given family and size.
    pub fn for_role(role: Role, font_family: &str, font_size: f64) -> Self {
        Self {
            font_family: font_family.to_string(),
            font_size,
            font_weight: role.weight(),
            font_style: role.style(),
            line_height: role.line_height(),
            letter_spacing: role.letter_spacing(),
        }
    }
}

/// Stroke, shadow and opacity applied to the glyphs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Effects {
    pub stroke_width: f64,
    pub stroke_color: Color,
    pub shadow_enabled: bool,
    pub shadow_color: Color,
    pub shadow_blur: f64,
    pub shadow_offset_x: f64,
    pub shadow_offset_y: f64,
    /// 0-100.
    pub opacity: f64,
}

impl From<&ContrastDecision> for Effects {
    fn from(decision: &ContrastDecision) -> Self {
        Self {
            stroke_width: decision.stroke_width,
            stroke_color: decision.stroke_color,
            shadow_enabled: decision.shadow_enabled,
            shadow_color: decision.shadow_color,
            shadow_blur: decision.shadow_blur,
            shadow_offset_x: decision.shadow_offset.0,
            shadow_offset_y: decision.shadow_offset.1,
            opacity: 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Horizontal centers strictly between these percentages align center.
const CENTER_ALIGN_BAND: (f64, f64) = (45.0, 55.0);

impl TextAlign {
    /// Alignment that follows the side of the image the box sits on.
    pub fn for_box(bbox: &OverlayBox) -> Self {
        let (cx, _) = bbox.center();
        if cx < CENTER_ALIGN_BAND.0 {
            TextAlign::Left
        } else if cx > CENTER_ALIGN_BAND.1 {
            TextAlign::Right
        } else {
            TextAlign::Center
        }
    }
}

/// Optional backing panel drawn behind the text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelStyle {
    pub enabled: bool,
    pub color: Color,
    /// 0-100.
    pub opacity: f64,
    /// In pixels.
    pub padding: f64,
    pub corner_radius: f64,
}

impl PanelStyle {
    pub fn none() -> Self {
        Self {
            enabled: false,
            color: Color::BLACK,
            opacity: 0.0,
            padding: 0.0,
            corner_radius: 0.0,
        }
    }
}

/// One positioned, styled piece of text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayElement {
    pub role: Role,
    pub text: String,
    #[serde(rename = "box")]
    pub bbox: OverlayBox,
    pub typography: Typography,
    pub effects: Effects,
    pub color: Color,
    pub text_align: TextAlign,
    pub panel: PanelStyle,
}
