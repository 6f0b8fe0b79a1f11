//! Hard-constraint repair for overlay boxes.
//!
//! [`PositionValidator::validate`] never fails: whatever comes in (negative,
//! oversized, NaN, pixel-space) leaves as a percent box inside the margins,
//! within the width bounds and with its center outside the forbidden band.
//! [`PositionValidator::separate`] then keeps the boxes of one layout from
//! overlapping each other.

use serde::{Deserialize, Serialize};

use crate::layout::{OverlayBox, Role};
use crate::util::{OverlayError, OverlayResult};

/// Nudges land this far outside the band so the strict inside test stays false.
const BAND_EPS: f64 = 1e-6;
/// Overlap below this, in percent, is rounding noise.
const OVERLAP_TOL: f64 = 1e-9;

/// Forbidden square around the visual center, applied on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CenterBand {
    pub lo: f64,
    pub hi: f64,
}

impl CenterBand {
    /// Open-interval test on both axes.
    pub fn contains(&self, cx: f64, cy: f64) -> bool {
        self.lo < cx && cx < self.hi && self.lo < cy && cy < self.hi
    }

    fn midpoint(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub margin_percent: f64,
    pub min_width_percent: f64,
    pub max_width_percent: f64,
    /// Width used when the proposed width is out of range.
    pub canonical_width_percent: f64,
    pub min_height_percent: f64,
    pub max_height_percent: f64,
    /// Height used when the proposed height is missing or non-positive.
    pub default_height_percent: f64,
    /// `None` disables center avoidance.
    pub center_band: Option<CenterBand>,
    /// Preferred vertical gap when restacking overlapping elements.
    pub stack_gap_percent: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            margin_percent: 5.0,
            min_width_percent: 20.0,
            max_width_percent: 80.0,
            canonical_width_percent: 60.0,
            min_height_percent: 3.0,
            max_height_percent: 40.0,
            default_height_percent: 15.0,
            center_band: Some(CenterBand { lo: 40.0, hi: 60.0 }),
            stack_gap_percent: 2.0,
        }
    }
}

impl ValidatorConfig {
    /// Reports the first inconsistent field.
    pub fn validate(&self) -> OverlayResult<()> {
        let m = self.margin_percent;
        if !(0.0..25.0).contains(&m) {
            return Err(OverlayError::InvalidConfig {
                field: "margin_percent",
                reason: "must be in [0, 25)",
            });
        }
        let usable = 100.0 - 2.0 * m;
        if !(self.min_width_percent > 0.0 && self.min_width_percent <= self.max_width_percent) {
            return Err(OverlayError::InvalidConfig {
                field: "min_width_percent",
                reason: "must be positive and not above max_width_percent",
            });
        }
        if self.max_width_percent > usable {
            return Err(OverlayError::InvalidConfig {
                field: "max_width_percent",
                reason: "must fit between the margins",
            });
        }
        if !(self.min_height_percent > 0.0 && self.min_height_percent <= self.max_height_percent)
            || self.max_height_percent > usable
        {
            return Err(OverlayError::InvalidConfig {
                field: "max_height_percent",
                reason: "height bounds must be ordered and fit between the margins",
            });
        }
        if !(self.stack_gap_percent.is_finite() && self.stack_gap_percent >= 0.0) {
            return Err(OverlayError::InvalidConfig {
                field: "stack_gap_percent",
                reason: "must be finite and non-negative",
            });
        }
        if let Some(band) = self.center_band {
            if !(band.lo < band.hi && band.lo > m && band.hi < 100.0 - m) {
                return Err(OverlayError::InvalidConfig {
                    field: "center_band",
                    reason: "must be ordered and lie strictly inside the margins",
                });
            }
        }
        Ok(())
    }

    /// Coerces every field into a consistent range.
    pub fn sanitized(&self) -> Self {
        let finite_or = |v: f64, d: f64| if v.is_finite() { v } else { d };
        let defaults = Self::default();

        let m = finite_or(self.margin_percent, defaults.margin_percent).clamp(0.0, 24.0);
        let usable = 100.0 - 2.0 * m;

        let min_w = finite_or(self.min_width_percent, defaults.min_width_percent).clamp(1.0, usable);
        let max_w = finite_or(self.max_width_percent, defaults.max_width_percent).clamp(min_w, usable);
        let canon = finite_or(self.canonical_width_percent, defaults.canonical_width_percent)
            .clamp(min_w, max_w);

        let min_h = finite_or(self.min_height_percent, defaults.min_height_percent).clamp(0.5, usable);
        let max_h = finite_or(self.max_height_percent, defaults.max_height_percent).clamp(min_h, usable);
        let default_h =
            finite_or(self.default_height_percent, defaults.default_height_percent).clamp(min_h, max_h);

        let center_band = self
            .center_band
            .filter(|b| b.lo.is_finite() && b.hi.is_finite() && b.lo < b.hi && b.lo > m && b.hi < 100.0 - m);
        let stack_gap = finite_or(self.stack_gap_percent, defaults.stack_gap_percent).clamp(0.0, usable);

        Self {
            margin_percent: m,
            min_width_percent: min_w,
            max_width_percent: max_w,
            canonical_width_percent: canon,
            min_height_percent: min_h,
            max_height_percent: max_h,
            default_height_percent: default_h,
            center_band,
            stack_gap_percent: stack_gap,
        }
    }
}

/// Repairs boxes so they satisfy every hard placement constraint.
#[derive(Clone, Debug)]
pub struct PositionValidator {
    config: ValidatorConfig,
}

impl Default for PositionValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl PositionValidator {
    /// The config is sanitized first, so any input yields a working validator.
    pub fn new(config: ValidatorConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Returns a corrected percent box for `proposed`.
    ///
    /// Steps: clamp the origin into the margins, push the center out of the
    /// forbidden band, bring width/height into range, slide the far edges back
    /// inside the margins, then re-check the band since sliding can move the
    /// center back in.
    pub fn validate(&self, proposed: &OverlayBox, image_width: usize, image_height: usize) -> OverlayBox {
        let cfg = &self.config;
        let m = cfg.margin_percent;
        let mut b = proposed.to_percent(image_width, image_height);

        if !b.x.is_finite() {
            b.x = m;
        }
        if !b.y.is_finite() {
            b.y = m;
        }
        if !b.width.is_finite() || b.width <= 0.0 {
            b.width = cfg.canonical_width_percent;
        }
        if !b.height.is_finite() || b.height <= 0.0 {
            b.height = cfg.default_height_percent;
        }

        b.x = b.x.clamp(m, 100.0 - m);
        b.y = b.y.clamp(m, 100.0 - m);

        self.avoid_center(&mut b, true);

        if b.width < cfg.min_width_percent || b.width > cfg.max_width_percent {
            b.width = cfg.canonical_width_percent;
        }
        b.height = b.height.clamp(cfg.min_height_percent, cfg.max_height_percent);

        fit_axis(&mut b.x, &mut b.width, m);
        fit_axis(&mut b.y, &mut b.height, m);

        self.avoid_center(&mut b, true);
        b
    }

    /// Restacks validated boxes so that no two of them intersect.
    ///
    /// Does nothing when the boxes are already disjoint. Otherwise boxes are
    /// laid out top to bottom in [`Role::stack_order`] (ties keep request
    /// order), each starting no higher than it was and at least the stack gap
    /// below the previous one. When the stack is taller than the space between
    /// the margins the gap shrinks first, then every height scales down. Only
    /// vertical positions change, so a box that ends up centered in the band
    /// leaves it sideways. `boxes` and `roles` pair up by index.
    pub fn separate(&self, boxes: &mut [OverlayBox], roles: &[Role]) {
        if !any_intersection(boxes) {
            return;
        }
        let cfg = &self.config;
        let m = cfg.margin_percent;
        let usable = 100.0 - 2.0 * m;

        let mut order: Vec<usize> = (0..boxes.len()).collect();
        order.sort_by_key(|&i| (roles.get(i).map_or(usize::MAX, Role::stack_order), i));

        let gaps = order.len().saturating_sub(1) as f64;
        let total_height: f64 = boxes.iter().map(|b| b.height).sum();
        let mut gap = cfg.stack_gap_percent;
        if total_height + gap * gaps > usable {
            gap = if gaps > 0.0 {
                ((usable - total_height) / gaps).max(0.0)
            } else {
                0.0
            };
        }
        if total_height > usable {
            let scale = usable / total_height;
            for b in boxes.iter_mut() {
                b.height *= scale;
            }
        }

        let mut floor = m;
        for &i in &order {
            let b = &mut boxes[i];
            b.y = b.y.max(floor);
            floor = b.bottom() + gap;
        }
        let mut ceiling = 100.0 - m;
        for &i in order.iter().rev() {
            let b = &mut boxes[i];
            b.y = b.y.min(ceiling - b.height);
            ceiling = b.y - gap;
        }

        for b in boxes.iter_mut() {
            self.avoid_center(b, false);
        }
    }

    /// True when `b` (percent) already meets every constraint.
    pub fn is_compliant(&self, b: &OverlayBox) -> bool {
        let cfg = &self.config;
        let m = cfg.margin_percent;
        let tol = 1e-9;
        let in_bounds = b.use_percentage
            && b.is_finite()
            && b.x >= m - tol
            && b.y >= m - tol
            && b.right() <= 100.0 - m + tol
            && b.bottom() <= 100.0 - m + tol;
        let (cx, cy) = b.center();
        let clear = cfg.center_band.map_or(true, |band| !band.contains(cx, cy));
        in_bounds && clear && b.width <= cfg.max_width_percent + tol
    }

    /// Moves `b` out of the center band along the cheaper axis, or only
    /// horizontally when `vertical` is false.
    fn avoid_center(&self, b: &mut OverlayBox, vertical: bool) {
        let Some(band) = self.config.center_band else {
            return;
        };
        let (cx, cy) = b.center();
        if !band.contains(cx, cy) {
            return;
        }
        let m = self.config.margin_percent;
        let mid = band.midpoint();

        // (displacement, is_vertical, new origin); preferred sides come first
        // so that equal displacements keep the intended side.
        let mut moves: Vec<(f64, bool, f64)> = Vec::with_capacity(4);
        let axes = [(false, cx, b.width), (true, cy, b.height)];
        for (is_vertical, center, len) in axes.into_iter().filter(|a| vertical || !a.0) {
            let (near, far) = if center <= mid {
                (band.lo - BAND_EPS, band.hi + BAND_EPS)
            } else {
                (band.hi + BAND_EPS, band.lo - BAND_EPS)
            };
            for target in [near, far] {
                let origin = target - len / 2.0;
                if origin >= m && origin + len <= 100.0 - m {
                    moves.push(((target - center).abs(), is_vertical, origin));
                }
            }
        }

        let best = moves
            .iter()
            .enumerate()
            .min_by(|(ia, a), (ib, b)| a.0.total_cmp(&b.0).then(ia.cmp(ib)))
            .map(|(_, mv)| *mv);

        match best {
            Some((_, false, origin)) => b.x = origin,
            Some((_, true, origin)) => b.y = origin,
            None if vertical => {
                // Nothing fits: shrink the box into the strip above the band.
                b.y = m;
                b.height = b.height.min(2.0 * (band.lo - BAND_EPS - m));
            }
            None => {
                // Same, into the strip left of the band.
                b.x = m;
                b.width = b.width.min(2.0 * (band.lo - BAND_EPS - m));
            }
        }
    }
}

fn any_intersection(boxes: &[OverlayBox]) -> bool {
    boxes
        .iter()
        .enumerate()
        .any(|(i, a)| boxes[i + 1..].iter().any(|b| a.intersects(b, OVERLAP_TOL)))
}

/// Slides `pos` back so `pos + len <= 100 - margin`, shrinking only when the
/// span cannot fit at all.
fn fit_axis(pos: &mut f64, len: &mut f64, margin: f64) {
    let limit = 100.0 - margin;
    if *pos + *len > limit {
        *pos = limit - *len;
    }
    if *pos < margin {
        *pos = margin;
        *len = len.min(limit - margin);
    }
}
