//! Aspect-ratio keyed zone templates.
//!
//! Every template keeps its zones clear of the 40-60% visual center and inside
//! a margin of at least 8%. Coordinates sit on a 12-column grid where they can.

use serde::{Deserialize, Serialize};

use crate::layout::{OverlayBox, Role, Strategy};

const COL: f64 = 100.0 / 12.0;
/// Top edge of the stack for [`Strategy::TopCenter`].
const TOP_STACK_Y: f64 = 8.0;
/// Bottom edge of the stack for [`Strategy::BottomBanner`].
const BOTTOM_STACK_Y: f64 = 92.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    Portrait,
    Square,
    Landscape,
    UltraWide,
}

/// Default geometry for one aspect-ratio range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub layout: LayoutKind,
    /// `[min, max)` of `width / height`.
    pub aspect_ratio_range: (f64, f64),
    pub headline: OverlayBox,
    /// Zone of the first secondary element; later ones stack below it.
    pub subtext: OverlayBox,
    /// Vertical gap between stacked zones, in percent.
    pub stack_gap: f64,
}

const PORTRAIT: Template = Template {
    layout: LayoutKind::Portrait,
    aspect_ratio_range: (0.0, 0.8),
    headline: OverlayBox::percent(COL, COL, 8.0 * COL, 14.0),
    subtext: OverlayBox::percent(COL, 25.0, 7.0 * COL, 8.0),
    stack_gap: 2.0,
};

const SQUARE: Template = Template {
    layout: LayoutKind::Square,
    aspect_ratio_range: (0.8, 1.25),
    headline: OverlayBox::percent(COL, COL, 7.0 * COL, 20.0),
    subtext: OverlayBox::percent(COL, 3.8 * COL, 6.0 * COL, 10.0),
    stack_gap: 2.0,
};

const LANDSCAPE: Template = Template {
    layout: LayoutKind::Landscape,
    aspect_ratio_range: (1.25, 2.5),
    headline: OverlayBox::percent(COL, 2.0 * COL, 45.0, 22.0),
    subtext: OverlayBox::percent(COL, 5.0 * COL, 5.0 * COL, 12.0),
    stack_gap: 2.0,
};

const ULTRA_WIDE: Template = Template {
    layout: LayoutKind::UltraWide,
    aspect_ratio_range: (2.5, f64::INFINITY),
    headline: OverlayBox::percent(COL, 2.0 * COL, 4.0 * COL, 22.0),
    subtext: OverlayBox::percent(COL, 5.0 * COL, 30.0, 12.0),
    stack_gap: 2.0,
};

impl Template {
    /// True when `aspect` lies in `[min, max)`.
    pub fn contains(&self, aspect: f64) -> bool {
        let (min, max) = self.aspect_ratio_range;
        aspect >= min && aspect < max
    }

    /// Default zones for `roles` (in request order) under `strategy`.
    ///
    /// Elements are stacked by [`Role::stack_order`]: a headline takes the
    /// headline zone, secondary roles take the subtext zone and stack below
    /// it. The stack is then anchored according to the strategy. Returned
    /// boxes are percent-based and not yet validated.
    pub fn zones_for(&self, strategy: Strategy, roles: &[Role]) -> Vec<OverlayBox> {
        let mut order: Vec<usize> = (0..roles.len()).collect();
        order.sort_by_key(|&i| (roles[i].stack_order(), i));

        let mut zones = vec![self.subtext; roles.len()];
        let mut cursor: Option<f64> = None;
        for &idx in &order {
            let mut zone = if roles[idx].is_primary() && cursor.is_none() {
                self.headline
            } else {
                self.subtext
            };
            if let Some(bottom) = cursor {
                zone.y = zone.y.max(bottom + self.stack_gap);
            }
            cursor = Some(zone.bottom());
            zones[idx] = zone;
        }

        if zones.is_empty() {
            return zones;
        }
        let top = zones.iter().map(|z| z.y).fold(f64::INFINITY, f64::min);
        let bottom = zones.iter().map(|z| z.bottom()).fold(f64::NEG_INFINITY, f64::max);

        for zone in zones.iter_mut() {
            match strategy {
                Strategy::LeftSide => {}
                Strategy::RightSide => {
                    zone.x = 100.0 - zone.x - zone.width;
                }
                Strategy::TopCenter => {
                    zone.x = 50.0 - zone.width / 2.0;
                    zone.y += TOP_STACK_Y - top;
                }
                Strategy::BottomBanner => {
                    zone.x = 50.0 - zone.width / 2.0;
                    zone.y += BOTTOM_STACK_Y - bottom;
                }
            }
        }
        zones
    }
}

/// Static lookup from aspect ratio to [`Template`].
#[derive(Clone, Debug)]
pub struct ZoneTemplateCatalog {
    templates: Vec<Template>,
}

impl Default for ZoneTemplateCatalog {
    fn default() -> Self {
        Self {
            templates: vec![SQUARE, LANDSCAPE, PORTRAIT, ULTRA_WIDE],
        }
    }
}

impl ZoneTemplateCatalog {
    /// Catalog with caller-supplied templates, searched in order.
    pub fn with_templates(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// First template whose range contains `aspect`; the square template
    /// otherwise.
    pub fn select(&self, aspect: f64) -> &Template {
        self.templates
            .iter()
            .find(|t| t.contains(aspect))
            .or_else(|| {
                self.templates
                    .iter()
                    .find(|t| t.layout == LayoutKind::Square)
            })
            .unwrap_or(&SQUARE)
    }
}

#[cfg(test)]
mod tests {
    use super::{LayoutKind, ZoneTemplateCatalog};
    use crate::layout::{Role, Strategy};

    #[test]
    fn select_by_aspect_ratio() {
        let catalog = ZoneTemplateCatalog::default();
        assert_eq!(catalog.select(1.0).layout, LayoutKind::Square);
        assert_eq!(catalog.select(1200.0 / 627.0).layout, LayoutKind::Landscape);
        assert_eq!(catalog.select(0.5).layout, LayoutKind::Portrait);
        assert_eq!(catalog.select(4.0).layout, LayoutKind::UltraWide);
        assert_eq!(catalog.select(f64::NAN).layout, LayoutKind::Square);
    }

    #[test]
    fn secondary_zones_stack_below_headline() {
        let catalog = ZoneTemplateCatalog::default();
        let tpl = catalog.select(1.0);
        let zones = tpl.zones_for(
            Strategy::LeftSide,
            &[Role::Cta, Role::Headline, Role::Subhead],
        );
        assert_eq!(zones[1], tpl.headline);
        assert!(zones[2].y >= zones[1].bottom());
        assert!(zones[0].y >= zones[2].bottom());
    }

    #[test]
    fn right_side_mirrors_left_side() {
        let catalog = ZoneTemplateCatalog::default();
        let tpl = catalog.select(1.9);
        let left = tpl.zones_for(Strategy::LeftSide, &[Role::Headline]);
        let right = tpl.zones_for(Strategy::RightSide, &[Role::Headline]);
        assert!((left[0].x - (100.0 - right[0].right())).abs() < 1e-9);
        assert_eq!(left[0].y, right[0].y);
    }

    #[test]
    fn banner_stack_ends_near_bottom() {
        let catalog = ZoneTemplateCatalog::default();
        let tpl = catalog.select(1.9);
        let zones = tpl.zones_for(Strategy::BottomBanner, &[Role::Headline, Role::Subhead]);
        assert!((zones[1].bottom() - 92.0).abs() < 1e-9);
        assert!(zones[0].bottom() <= zones[1].y);
    }
}
