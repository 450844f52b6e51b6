//! Geometry Extractor: validated markup → filled outlines in user space.
//!
//! Conversion goes through `usvg`, which resolves inherited fills,
//! `<use>` references, and nested transforms. Each filled path becomes an
//! [`Outline`]: its subpaths as Bézier contours in viewBox units (y down),
//! plus the resolved fill color.

use crate::error::ParseError;
use crate::markup::{self, Markup};
use crate::shape::FillRule;
use glam::DVec2;
use kurbo::{BezPath, CubicBez, ParamCurve, PathEl, Point, QuadBez};
use resvg::usvg;
use resvg::usvg::tiny_skia_path::PathSegment;
use sc_core::model::Color;

/// One filled path.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    /// Closed subpaths. Which are holes is decided by the shape builder.
    pub contours: Vec<BezPath>,
    pub fill: Color,
    pub fill_rule: FillRule,
}

impl Outline {
    /// Point loops with each curve split into `curve_segments` pieces.
    /// The closing point is not repeated.
    pub fn flatten(&self, curve_segments: u32) -> Vec<Vec<DVec2>> {
        self.contours
            .iter()
            .map(|c| flatten_contour(c, curve_segments.max(1)))
            .filter(|pts| !pts.is_empty())
            .collect()
    }
}

/// Everything extracted from one vector file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedOutlines {
    pub width: f64,
    pub height: f64,
    pub outlines: Vec<Outline>,
}

/// Validate `text` and pull out its filled outlines.
pub fn extract(text: &str) -> Result<ExtractedOutlines, ParseError> {
    let markup = markup::validate(text)?;
    extract_validated(&markup)
}

pub fn extract_validated(markup: &Markup) -> Result<ExtractedOutlines, ParseError> {
    let tree = usvg::Tree::from_str(&markup.text, &usvg::Options::default())
        .map_err(|e| ParseError::Convert(e.to_string()))?;

    // Path transforms include the viewBox mapping carried by the root
    // group. Undo it so coordinates stay in viewBox units.
    let to_user = tree.root().transform().invert().unwrap_or(usvg::Transform::identity());

    let mut outlines = Vec::new();
    collect(tree.root(), to_user, &mut outlines);
    log::debug!("extracted {} filled outlines", outlines.len());

    Ok(ExtractedOutlines {
        width: markup.width,
        height: markup.height,
        outlines,
    })
}

fn collect(group: &usvg::Group, to_user: usvg::Transform, out: &mut Vec<Outline>) {
    for node in group.children() {
        match node {
            usvg::Node::Group(g) => collect(g, to_user, out),
            usvg::Node::Path(path) => {
                if !path.is_visible() {
                    continue;
                }
                let Some(fill) = path.fill() else {
                    log::debug!("skipping unfilled path {:?}", path.id());
                    continue;
                };
                let xf = to_user.pre_concat(path.abs_transform());
                let contours = contours_of(path.data(), xf);
                if contours.is_empty() {
                    continue;
                }
                out.push(Outline {
                    contours,
                    fill: paint_color(fill),
                    fill_rule: match fill.rule() {
                        usvg::FillRule::NonZero => FillRule::NonZero,
                        usvg::FillRule::EvenOdd => FillRule::EvenOdd,
                    },
                });
            }
            usvg::Node::Text(_) => {
                log::trace!("TEXT node skipped");
                // Outlining text requires a font database.
            }
            usvg::Node::Image(_) => {
                log::debug!("embedded raster image skipped");
            }
        }
    }
}

fn paint_color(fill: &usvg::Fill) -> Color {
    let c = match fill.paint() {
        usvg::Paint::Color(c) => *c,
        usvg::Paint::LinearGradient(g) => first_stop(g.stops()),
        usvg::Paint::RadialGradient(g) => first_stop(g.stops()),
        usvg::Paint::Pattern(_) => usvg::Color::black(),
    };
    Color::from_rgb8(c.red, c.green, c.blue).with_alpha(fill.opacity().get())
}

fn first_stop(stops: &[usvg::Stop]) -> usvg::Color {
    stops.first().map(|s| s.color()).unwrap_or_else(usvg::Color::black)
}

fn map(xf: &usvg::Transform, p: usvg::tiny_skia_path::Point) -> Point {
    let (x, y) = (p.x as f64, p.y as f64);
    Point::new(
        xf.sx as f64 * x + xf.kx as f64 * y + xf.tx as f64,
        xf.ky as f64 * x + xf.sy as f64 * y + xf.ty as f64,
    )
}

/// Split a path into closed subpaths. Open subpaths are closed implicitly,
/// the way a fill closes them.
fn contours_of(data: &usvg::tiny_skia_path::Path, xf: usvg::Transform) -> Vec<BezPath> {
    let mut contours = Vec::new();
    let mut current = BezPath::new();
    for seg in data.segments() {
        match seg {
            PathSegment::MoveTo(p) => {
                finish(&mut current, &mut contours);
                current.move_to(map(&xf, p));
            }
            PathSegment::LineTo(p) => current.line_to(map(&xf, p)),
            PathSegment::QuadTo(c, p) => current.quad_to(map(&xf, c), map(&xf, p)),
            PathSegment::CubicTo(c1, c2, p) => current.curve_to(map(&xf, c1), map(&xf, c2), map(&xf, p)),
            PathSegment::Close => {
                current.close_path();
                finish(&mut current, &mut contours);
            }
        }
    }
    finish(&mut current, &mut contours);
    contours
}

fn finish(current: &mut BezPath, contours: &mut Vec<BezPath>) {
    let path = std::mem::take(current);
    // A lone move-to draws nothing.
    if path.elements().len() > 1 {
        contours.push(path);
    }
}

fn push(pts: &mut Vec<DVec2>, p: Point) {
    let v = DVec2::new(p.x, p.y);
    if pts.last().is_none_or(|l| l.distance_squared(v) > 1e-18) {
        pts.push(v);
    }
}

fn flatten_contour(path: &BezPath, segments: u32) -> Vec<DVec2> {
    let mut pts: Vec<DVec2> = Vec::new();
    let mut last = Point::ZERO;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                push(&mut pts, p);
                last = p;
            }
            PathEl::LineTo(p) => {
                push(&mut pts, p);
                last = p;
            }
            PathEl::QuadTo(c, p) => {
                let q = QuadBez::new(last, c, p);
                for i in 1..=segments {
                    push(&mut pts, q.eval(i as f64 / segments as f64));
                }
                last = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                let cb = CubicBez::new(last, c1, c2, p);
                for i in 1..=segments {
                    push(&mut pts, cb.eval(i as f64 / segments as f64));
                }
                last = p;
            }
            PathEl::ClosePath => {}
        }
    }
    if pts.len() > 1 && pts[0].distance_squared(pts[pts.len() - 1]) < 1e-18 {
        pts.pop();
    }
    pts
}
