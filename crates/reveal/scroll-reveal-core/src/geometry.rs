//! Viewport geometry: rectangles, CSS root-margin shorthand and intersection ratios.
//!
//! Mirrors the arithmetic a native intersection watcher performs so that hosts
//! without one can poll cached bounding boxes instead.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RevealError;

/// Axis-aligned rectangle in CSS pixels, origin top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Edge-inclusive overlap. Touching rectangles yield a zero-area rect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Same rect offset by a scroll position (document space -> viewport space).
    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// One component of a root margin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    Px(f64),
    Percent(f64),
}

impl Length {
    /// Resolve against the root dimension the component applies to.
    pub fn resolve(&self, basis: f64) -> f64 {
        match *self {
            Length::Px(v) => v,
            Length::Percent(p) => basis * p / 100.0,
        }
    }
}

fn fmt_number(v: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if v.fract() == 0.0 {
        write!(f, "{}", v as i64)
    } else {
        write!(f, "{}", v)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Length::Px(v) => {
                fmt_number(v, f)?;
                f.write_str("px")
            }
            Length::Percent(p) => {
                fmt_number(p, f)?;
                f.write_str("%")
            }
        }
    }
}

impl FromStr for Length {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || RevealError::InvalidConfig(format!("bad root margin component `{s}`"));
        let (num, ctor): (&str, fn(f64) -> Length) = if let Some(n) = s.strip_suffix("px") {
            (n, Length::Px)
        } else if let Some(n) = s.strip_suffix('%') {
            (n, Length::Percent)
        } else {
            // Unitless values are only legal for zero.
            let v: f64 = s.parse().map_err(|_| bad())?;
            return if v == 0.0 { Ok(Length::Px(0.0)) } else { Err(bad()) };
        };
        let v: f64 = num.parse().map_err(|_| bad())?;
        if !v.is_finite() {
            return Err(bad());
        }
        Ok(ctor(v))
    }
}

/// Growth (positive) or shrink (negative) of each root edge, CSS order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
    pub left: Length,
}

impl RootMargin {
    pub const ZERO: RootMargin = RootMargin {
        top: Length::Px(0.0),
        right: Length::Px(0.0),
        bottom: Length::Px(0.0),
        left: Length::Px(0.0),
    };

    /// Effective root after applying the margin. Vertical percentages resolve
    /// against the root height, horizontal ones against its width.
    pub fn apply(&self, root: &Rect) -> Rect {
        let top = self.top.resolve(root.height);
        let bottom = self.bottom.resolve(root.height);
        let left = self.left.resolve(root.width);
        let right = self.right.resolve(root.width);
        Rect::new(
            root.x - left,
            root.y - top,
            (root.width + left + right).max(0.0),
            (root.height + top + bottom).max(0.0),
        )
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        // 0px 0px -8% 0px
        RootMargin {
            bottom: Length::Percent(-8.0),
            ..RootMargin::ZERO
        }
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

impl FromStr for RootMargin {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split_whitespace()
            .map(Length::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        let (top, right, bottom, left) = match parts.as_slice() {
            [a] => (*a, *a, *a, *a),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            _ => {
                return Err(RevealError::InvalidConfig(format!(
                    "root margin `{s}` must have 1 to 4 components"
                )))
            }
        };
        Ok(RootMargin {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl TryFrom<String> for RootMargin {
    type Error = RevealError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RootMargin> for String {
    fn from(value: RootMargin) -> Self {
        value.to_string()
    }
}

/// Fraction of `target` visible inside `root`, in `[0, 1]`.
///
/// A zero-area target counts as fully visible when it lies within the root
/// (edges included), matching native intersection watchers.
pub fn intersection_ratio(target: &Rect, root: &Rect) -> f64 {
    let Some(overlap) = target.intersection(root) else {
        return 0.0;
    };
    let area = target.area();
    if area == 0.0 {
        return 1.0;
    }
    (overlap.area() / area).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_margin_round_trips_through_css_text() {
        let m = RootMargin::default();
        assert_eq!(m.to_string(), "0px 0px -8% 0px");
        assert_eq!("0px 0px -8% 0px".parse::<RootMargin>().unwrap(), m);
    }

    #[test]
    fn margin_shorthand_expands_like_css() {
        let m: RootMargin = "10px 5%".parse().unwrap();
        assert_eq!(m.top, Length::Px(10.0));
        assert_eq!(m.bottom, Length::Px(10.0));
        assert_eq!(m.left, Length::Percent(5.0));
        assert_eq!(m.right, Length::Percent(5.0));

        let m: RootMargin = "0".parse().unwrap();
        assert_eq!(m, RootMargin::ZERO);

        assert!("".parse::<RootMargin>().is_err());
        assert!("1px 2px 3px 4px 5px".parse::<RootMargin>().is_err());
        assert!("12".parse::<RootMargin>().is_err());
        assert!("abc%".parse::<RootMargin>().is_err());
    }

    #[test]
    fn negative_bottom_percent_shrinks_viewport() {
        let viewport = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let root = RootMargin::default().apply(&viewport);
        assert_eq!(root.y, 0.0);
        assert!((root.height - 736.0).abs() < 1e-9);
        assert_eq!(root.width, 1000.0);
    }

    #[test]
    fn ratio_counts_visible_fraction() {
        let root = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(intersection_ratio(&Rect::new(0.0, 0.0, 10.0, 10.0), &root), 1.0);
        assert_eq!(intersection_ratio(&Rect::new(0.0, 200.0, 10.0, 10.0), &root), 0.0);
        let half = intersection_ratio(&Rect::new(0.0, 90.0, 10.0, 20.0), &root);
        assert!((half - 0.5).abs() < 1e-9);
        // Zero-area target on the edge still counts.
        assert_eq!(intersection_ratio(&Rect::new(0.0, 100.0, 10.0, 0.0), &root), 1.0);
    }
}
