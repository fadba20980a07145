//! Curved arrow geometry: quadratic Bézier control point, end tangent and
//! arrowhead outline.

use glam::{DVec2, dvec2};

use crate::log::warn;
use crate::types::{Length, Pt, UnitVec};

/// Control point bowing the curve between `from` and `to`.
///
/// `ctrl = midpoint + (dy/2, |dx|/2)`. The bias always bends the curve
/// the same rotational way regardless of direction.
pub fn quad_control(from: Pt, to: Pt) -> Pt {
    let (p0, p1) = (from.to_dvec(), to.to_dvec());
    let d = p1 - p0;
    let mid = (p0 + p1) / 2.0;
    Pt::from_dvec(mid + dvec2(d.y / 2.0, d.x.abs() / 2.0))
}

/// Point on the quadratic curve at parameter `t`.
pub fn quad_point(from: Pt, ctrl: Pt, to: Pt, t: f64) -> Pt {
    let (p0, c, p1) = (from.to_dvec(), ctrl.to_dvec(), to.to_dvec());
    let u = 1.0 - t;
    Pt::from_dvec(p0 * (u * u) + c * (2.0 * u * t) + p1 * (t * t))
}

/// Derivative of the quadratic curve at parameter `t`:
/// `2(1-t)(ctrl-p0) + 2t(p1-ctrl)`.
pub fn quad_derivative(from: Pt, ctrl: Pt, to: Pt, t: f64) -> DVec2 {
    let (p0, c, p1) = (from.to_dvec(), ctrl.to_dvec(), to.to_dvec());
    (c - p0) * (2.0 * (1.0 - t)) + (p1 - c) * (2.0 * t)
}

/// Direction the curve arrives at `to`, normalized.
///
/// When the control point coincides with `to` (chords with `dx == dy > 0`)
/// the derivative vanishes and the chord direction is the limit. Returns
/// `None` only when both endpoints coincide.
pub fn end_tangent(from: Pt, ctrl: Pt, to: Pt) -> Option<UnitVec> {
    let d = quad_derivative(from, ctrl, to, 1.0);
    UnitVec::normalized(d.x, d.y).or_else(|| {
        let chord = to.to_dvec() - from.to_dvec();
        UnitVec::normalized(chord.x, chord.y)
    })
}

/// Outline of an arrowhead whose tip sits exactly on `tip`.
///
/// Returned as `[tip, left base, notch, right base]`; `overhang` moves the
/// notch from the base center toward the tip as a fraction of `length`.
pub fn arrowhead(tip: Pt, dir: UnitVec, length: Length, width: Length, overhang: f64) -> [Pt; 4] {
    let base = tip - dir * length;
    let side = dir.perp() * (width / 2.0);
    let notch = tip - dir * (length * (1.0 - overhang));
    [tip, base + side, notch, base - side]
}

/// Everything needed to draw one curved arrow.
#[derive(Debug, Clone, PartialEq)]
pub struct CurvedArrow {
    pub from: Pt,
    pub ctrl: Pt,
    pub to: Pt,
    /// `None` when the arrow is degenerate (zero length)
    pub head: Option<[Pt; 4]>,
}

pub fn curved_arrow(from: Pt, to: Pt, head_length: Length, head_width: Length, overhang: f64) -> CurvedArrow {
    let ctrl = quad_control(from, to);
    let head = match end_tangent(from, ctrl, to) {
        Some(dir) => Some(arrowhead(to, dir, head_length, head_width, overhang)),
        None => {
            warn!(x = to.x.raw(), y = to.y.raw(), "degenerate arrow, skipping arrowhead");
            None
        }
    };
    CurvedArrow { from, ctrl, to, head }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::pt;

    fn close(a: Pt, b: Pt) -> bool {
        (a.x.raw() - b.x.raw()).abs() < 1e-10 && (a.y.raw() - b.y.raw()).abs() < 1e-10
    }

    #[test]
    fn control_point_bias() {
        // dx = 100, dy = 0 -> ctrl = (50, 50)
        assert_eq!(quad_control(pt(0.0, 0.0), pt(100.0, 0.0)), pt(50.0, 50.0));
        // leftward chord bows the same way in y (|dx|)
        assert_eq!(quad_control(pt(100.0, 0.0), pt(0.0, 0.0)), pt(50.0, 50.0));
        // vertical chord bows in x by dy/2
        assert_eq!(quad_control(pt(0.0, 0.0), pt(0.0, 40.0)), pt(20.0, 20.0));
    }

    #[test]
    fn curve_passes_through_endpoints() {
        let (a, b) = (pt(3.0, 4.0), pt(90.0, -20.0));
        let c = quad_control(a, b);
        assert!(close(quad_point(a, c, b, 0.0), a));
        assert!(close(quad_point(a, c, b, 1.0), b));
    }

    #[test]
    fn end_tangent_matches_derivative_formula() {
        let (a, b) = (pt(0.0, 0.0), pt(100.0, 0.0));
        let c = quad_control(a, b);
        // 2 * (p1 - ctrl) = (100, -100)
        let dir = end_tangent(a, c, b).unwrap();
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert!((dir.dx() - s).abs() < 1e-10);
        assert!((dir.dy() + s).abs() < 1e-10);
    }

    #[test]
    fn vanishing_derivative_falls_back_to_chord() {
        let (a, b) = (pt(0.0, 0.0), pt(30.0, 30.0));
        let c = quad_control(a, b);
        assert_eq!(c, b);
        let dir = end_tangent(a, c, b).unwrap();
        assert!((dir.dx() - dir.dy()).abs() < 1e-10);
    }

    #[test]
    fn arrowhead_tip_lands_on_destination() {
        let arrow = curved_arrow(pt(0.0, 0.0), pt(100.0, 0.0), Length(15.0), Length(12.0), 0.0);
        let head = arrow.head.unwrap();
        assert_eq!(head[0], pt(100.0, 0.0));
        // base is head_length back along the tangent
        let base = head[1].midpoint(head[3]);
        let back = (base.to_dvec() - pt(100.0, 0.0).to_dvec()).length();
        assert!((back - 15.0).abs() < 1e-10);
        // full base width is head_width
        let width = (head[1].to_dvec() - head[3].to_dvec()).length();
        assert!((width - 12.0).abs() < 1e-10);
        // no overhang: notch is the base center
        assert!(close(head[2], base));
    }

    #[test]
    fn overhang_pulls_notch_toward_tip() {
        let head = arrowhead(pt(0.0, 0.0), UnitVec::EAST, Length(10.0), Length(8.0), 0.5);
        assert!(close(head[2], pt(-5.0, 0.0)));
    }

    #[test]
    fn degenerate_arrow_has_no_head() {
        let p = pt(12.0, 7.0);
        let arrow = curved_arrow(p, p, Length(15.0), Length(12.0), 0.0);
        assert!(arrow.head.is_none());
        assert_eq!(arrow.ctrl, p);
    }
}
