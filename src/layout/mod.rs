//! Overlay geometry, element model, zone templates and hard-constraint repair.

mod element;
mod geometry;
mod strategy;
mod template;
mod validate;

pub use element::{
    Effects, FontStyle, OverlayElement, PanelStyle, Role, TextAlign, Typography,
};
pub use geometry::OverlayBox;
pub use strategy::Strategy;
pub use template::{LayoutKind, Template, ZoneTemplateCatalog};
pub use validate::{CenterBand, PositionValidator, ValidatorConfig};
