//! Shape Builder: point loops → planar shapes with holes.
//!
//! Loops are classified by the path's fill rule. Under even-odd a loop
//! inside an even number of others is an outer boundary and inside an odd
//! number it is a hole. Under non-zero the winding number just outside and
//! just inside each loop decides: filled inside and empty outside is an
//! outer boundary, the reverse is a hole, and a loop with fill on both
//! sides adds nothing. A hole belongs to the smallest enclosing outer
//! boundary. Outer boundaries wind counter-clockwise (positive area),
//! holes clockwise.

use crate::error::ShapeBuildError;
use glam::DVec2;

const AREA_EPSILON: f64 = 1e-9;

/// How overlapping subpaths of one outline combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FillRule {
    /// The vector-markup default.
    #[default]
    NonZero,
    EvenOdd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Outer,
    Hole,
    /// Same fill on both sides.
    Interior,
}

fn classify(rule: FillRule, own_area: f64, enclosing: &[f64]) -> Role {
    match rule {
        FillRule::EvenOdd => {
            if enclosing.len() % 2 == 0 {
                Role::Outer
            } else {
                Role::Hole
            }
        }
        FillRule::NonZero => {
            let outside: i32 = enclosing.iter().map(|a| a.signum() as i32).sum();
            let inside = outside + own_area.signum() as i32;
            match (outside == 0, inside == 0) {
                (true, false) => Role::Outer,
                (false, true) => Role::Hole,
                _ => Role::Interior,
            }
        }
    }
}

/// An outer boundary and the holes cut into it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanarShape {
    pub outer: Vec<DVec2>,
    pub holes: Vec<Vec<DVec2>>,
}

/// Twice the signed area; positive for counter-clockwise in a y-up frame.
pub fn signed_area(pts: &[DVec2]) -> f64 {
    let n = pts.len();
    (0..n).map(|i| pts[i].perp_dot(pts[(i + 1) % n])).sum::<f64>() * 0.5
}

pub fn centroid(pts: &[DVec2]) -> DVec2 {
    if pts.is_empty() {
        return DVec2::ZERO;
    }
    pts.iter().copied().sum::<DVec2>() / pts.len() as f64
}

/// Even-odd point-in-polygon.
pub fn contains(poly: &[DVec2], p: DVec2) -> bool {
    let n = poly.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (poly[i], poly[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn check_loop(pts: &[DVec2]) -> Result<f64, ShapeBuildError> {
    if pts.len() < 3 {
        return Err(ShapeBuildError::TooFewPoints(pts.len()));
    }
    let area = signed_area(pts);
    if area.abs() < AREA_EPSILON {
        return Err(ShapeBuildError::ZeroArea);
    }
    Ok(area)
}

fn oriented(mut pts: Vec<DVec2>, area: f64, ccw: bool) -> Vec<DVec2> {
    if (area > 0.0) != ccw {
        pts.reverse();
    }
    pts
}

impl PlanarShape {
    /// Build one shape from an outer loop and candidate holes. A degenerate
    /// outer loop fails the shape; a degenerate hole is dropped.
    pub fn new(outer: Vec<DVec2>, holes: Vec<Vec<DVec2>>) -> Result<Self, ShapeBuildError> {
        let area = check_loop(&outer)?;
        let outer = oriented(outer, area, true);
        let holes = holes
            .into_iter()
            .filter_map(|h| match check_loop(&h) {
                Ok(a) => Some(oriented(h, a, false)),
                Err(e) => {
                    log::warn!("dropping hole: {e}");
                    None
                }
            })
            .collect();
        Ok(Self { outer, holes })
    }

    /// Group the loops of one outline into shapes under `rule`. Shapes
    /// that cannot be built are reported alongside the ones that could.
    pub fn from_loops(loops: Vec<Vec<DVec2>>, rule: FillRule) -> (Vec<PlanarShape>, Vec<ShapeBuildError>) {
        let mut errors = Vec::new();
        let mut valid: Vec<(Vec<DVec2>, f64)> = Vec::new();
        for l in loops {
            match check_loop(&l) {
                Ok(area) => valid.push((l, area)),
                Err(e) => errors.push(e),
            }
        }

        // Larger loops containing each loop's first vertex.
        let enclosing: Vec<Vec<usize>> = (0..valid.len())
            .map(|i| {
                let first = valid[i].0[0];
                (0..valid.len())
                    .filter(|&j| j != i && valid[j].1.abs() > valid[i].1.abs() && contains(&valid[j].0, first))
                    .collect()
            })
            .collect();
        let roles: Vec<Role> = (0..valid.len())
            .map(|i| {
                let areas: Vec<f64> = enclosing[i].iter().map(|&j| valid[j].1).collect();
                classify(rule, valid[i].1, &areas)
            })
            .collect();

        let mut outers: Vec<(usize, Vec<Vec<DVec2>>)> = (0..valid.len())
            .filter(|&i| roles[i] == Role::Outer)
            .map(|i| (i, Vec::new()))
            .collect();

        for i in (0..valid.len()).filter(|&i| roles[i] == Role::Hole) {
            let parent = enclosing[i]
                .iter()
                .copied()
                .filter(|&j| roles[j] == Role::Outer)
                .min_by(|&a, &b| valid[a].1.abs().total_cmp(&valid[b].1.abs()));
            match parent.and_then(|p| outers.iter_mut().find(|(o, _)| *o == p)) {
                Some((_, holes)) => holes.push(valid[i].0.clone()),
                None => log::warn!("hole without an enclosing outline dropped"),
            }
        }
        let interior = roles.iter().filter(|r| **r == Role::Interior).count();
        if interior > 0 {
            log::trace!("{interior} loops inside filled area ignored");
        }

        let mut shapes = Vec::with_capacity(outers.len());
        for (o, holes) in outers {
            match PlanarShape::new(valid[o].0.clone(), holes) {
                Ok(s) => shapes.push(s),
                Err(e) => errors.push(e),
            }
        }
        (shapes, errors)
    }

    pub fn bounds(&self) -> (DVec2, DVec2) {
        self.outer
            .iter()
            .fold((DVec2::splat(f64::MAX), DVec2::splat(f64::MIN)), |(lo, hi), p| {
                (lo.min(*p), hi.max(*p))
            })
    }

    pub fn area(&self) -> f64 {
        signed_area(&self.outer) + self.holes.iter().map(|h| signed_area(h)).sum::<f64>()
    }

    /// Spread adjacent shapes apart by `amount` percent.
    ///
    /// A hole shape shrinks its boundary about its centroid by
    /// `1 - amount/100` and grows its inner holes by `1 + amount/200`;
    /// other shapes are returned unchanged. Zero is a no-op.
    pub fn apply_spread(&self, is_hole: bool, amount: f64) -> PlanarShape {
        if !is_hole || amount == 0.0 {
            return self.clone();
        }
        let scale = |pts: &[DVec2], k: f64| -> Vec<DVec2> {
            let c = centroid(pts);
            pts.iter().map(|p| c + (*p - c) * k).collect()
        };
        PlanarShape {
            outer: scale(&self.outer, 1.0 - amount / 100.0),
            holes: self.holes.iter().map(|h| scale(h, 1.0 + amount / 200.0)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(x, y),
            DVec2::new(x + w, y),
            DVec2::new(x + w, y + h),
            DVec2::new(x, y + h),
        ]
    }

    #[test]
    fn nested_loops_alternate_outer_and_hole() {
        let loops = vec![rect(0.0, 0.0, 100.0, 100.0), rect(10.0, 10.0, 80.0, 80.0), rect(40.0, 40.0, 20.0, 20.0)];
        let (shapes, errors) = PlanarShape::from_loops(loops, FillRule::EvenOdd);
        assert!(errors.is_empty());
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].holes.len(), 1);
        assert!(shapes[1].holes.is_empty());
        assert!((shapes[0].area() - (10000.0 - 6400.0)).abs() < 1e-9);
    }

    #[test]
    fn nonzero_keeps_same_winding_loops_filled() {
        let loops = vec![rect(0.0, 0.0, 100.0, 100.0), rect(25.0, 25.0, 50.0, 50.0)];
        let (shapes, _) = PlanarShape::from_loops(loops.clone(), FillRule::NonZero);
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].holes.is_empty());

        let (shapes, _) = PlanarShape::from_loops(loops, FillRule::EvenOdd);
        assert_eq!(shapes[0].holes.len(), 1);
    }

    #[test]
    fn nonzero_cuts_opposite_winding_loops() {
        let mut inner = rect(25.0, 25.0, 50.0, 50.0);
        inner.reverse();
        let (shapes, _) = PlanarShape::from_loops(vec![rect(0.0, 0.0, 100.0, 100.0), inner], FillRule::NonZero);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].holes.len(), 1);
        assert!((shapes[0].area() - 7500.0).abs() < 1e-9);
    }

    #[test]
    fn orientation_is_normalised() {
        let mut outer = rect(0.0, 0.0, 10.0, 10.0);
        outer.reverse();
        let s = PlanarShape::new(outer, vec![rect(2.0, 2.0, 2.0, 2.0)]).unwrap();
        assert!(signed_area(&s.outer) > 0.0);
        assert!(signed_area(&s.holes[0]) < 0.0);
    }

    #[test]
    fn degenerate_loops_are_reported_and_skipped() {
        let line = vec![DVec2::ZERO, DVec2::new(5.0, 0.0), DVec2::new(10.0, 0.0)];
        let (shapes, errors) = PlanarShape::from_loops(vec![line, rect(0.0, 0.0, 1.0, 1.0), vec![DVec2::ZERO]], FillRule::NonZero);
        assert_eq!(shapes.len(), 1);
        assert_eq!(errors, vec![ShapeBuildError::ZeroArea, ShapeBuildError::TooFewPoints(1)]);
    }

    #[test]
    fn spread_only_moves_hole_shapes() {
        let s = PlanarShape::new(rect(0.0, 0.0, 10.0, 10.0), vec![]).unwrap();
        assert_eq!(s.apply_spread(false, 10.0), s);
        assert_eq!(s.apply_spread(true, 0.0), s);
        let spread = s.apply_spread(true, 10.0);
        let (lo, hi) = spread.bounds();
        assert!((lo.x - 0.5).abs() < 1e-12);
        assert!((hi.x - 9.5).abs() < 1e-12);
    }
}
