//! Planar polygon geometry.
//!
//! Faces are handled as arbitrary (possibly warped) polygons: centres and area
//! vectors come from a fan triangulation about the point average, and overlap
//! computations work in a 2D basis of a face plane.

use fsi_core::{Real, Vec3};
use nalgebra::Vector2;

/// Coordinates in a face plane.
pub type Vec2 = Vector2<Real>;

/// Area vector of a polygon: magnitude is the area, direction the normal
/// given by the right-hand rule over the point order.
pub fn polygon_area_vector(points: &[Vec3]) -> Vec3 {
    let n = points.len();
    if n < 3 {
        return Vec3::zeros();
    }
    let avg = average(points);
    let mut sum = Vec3::zeros();
    for i in 0..n {
        let a = points[i] - avg;
        let b = points[(i + 1) % n] - avg;
        sum += a.cross(&b);
    }
    0.5 * sum
}

/// Area-weighted centroid of a polygon.
///
/// Falls back to the point average for degenerate polygons.
pub fn polygon_centre(points: &[Vec3]) -> Vec3 {
    let n = points.len();
    if n == 0 {
        return Vec3::zeros();
    }
    let avg = average(points);
    if n < 3 {
        return avg;
    }
    let total = polygon_area_vector(points);
    let total_mag = total.norm();
    if total_mag <= Real::EPSILON * scale_sq(points) {
        return avg;
    }
    let normal = total / total_mag;

    let mut weighted = Vec3::zeros();
    let mut area_sum = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        // signed area of the fan triangle along the face normal
        let tri = 0.5 * (a - avg).cross(&(b - avg)).dot(&normal);
        weighted += tri * (avg + a + b) / 3.0;
        area_sum += tri;
    }
    if area_sum.abs() <= Real::EPSILON {
        avg
    } else {
        weighted / area_sum
    }
}

pub fn average(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return Vec3::zeros();
    }
    points.iter().sum::<Vec3>() / points.len() as Real
}

fn scale_sq(points: &[Vec3]) -> Real {
    let avg = average(points);
    points
        .iter()
        .map(|p| (p - avg).norm_squared())
        .fold(0.0, Real::max)
}

/// Orthonormal basis for projecting 3D points onto a face plane and back.
#[derive(Debug, Clone, Copy)]
pub struct PlaneBasis {
    pub origin: Vec3,
    pub u: Vec3,
    pub v: Vec3,
    pub normal: Vec3,
}

impl PlaneBasis {
    /// Creates a `PlaneBasis` from an origin point and a normal vector.
    ///
    /// Returns `None` for a zero-length normal.
    pub fn from_normal(origin: Vec3, normal: Vec3) -> Option<Self> {
        let n = normal.try_normalize(Real::EPSILON)?;
        let helper = if n.z.abs() < 0.9 {
            Vec3::new(0.0, 0.0, 1.0)
        } else {
            Vec3::new(0.0, 1.0, 0.0)
        };
        let u = helper.cross(&n).try_normalize(Real::EPSILON)?;
        let v = n.cross(&u);
        Some(Self {
            origin,
            u,
            v,
            normal: n,
        })
    }

    /// In-plane (u, v) coordinates of a point.
    pub fn project(&self, p: &Vec3) -> Vec2 {
        let r = p - self.origin;
        Vec2::new(r.dot(&self.u), r.dot(&self.v))
    }

    /// Signed distance of a point from the plane.
    pub fn height(&self, p: &Vec3) -> Real {
        (p - self.origin).dot(&self.normal)
    }

    pub fn unproject(&self, q: &Vec2) -> Vec3 {
        self.origin + self.u * q.x + self.v * q.y
    }
}

fn cross2(a: &Vec2, b: &Vec2) -> Real {
    a.x * b.y - a.y * b.x
}

/// Signed shoelace area; positive for counter-clockwise order.
pub fn signed_area_2d(poly: &[Vec2]) -> Real {
    let n = poly.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        sum += cross2(&poly[i], &poly[(i + 1) % n]);
    }
    0.5 * sum
}

/// Reorder a polygon counter-clockwise in place.
pub fn make_ccw(poly: &mut [Vec2]) {
    if signed_area_2d(poly) < 0.0 {
        poly.reverse();
    }
}

/// Sutherland-Hodgman clipping of `subject` by the convex polygon `clip`.
///
/// Both polygons must be counter-clockwise. Returns the intersection polygon,
/// empty (or with fewer than 3 points) when they don't overlap.
pub fn clip_convex(subject: &[Vec2], clip: &[Vec2]) -> Vec<Vec2> {
    let mut output = subject.to_vec();
    let n = clip.len();
    for i in 0..n {
        if output.is_empty() {
            break;
        }
        let a = clip[i];
        let b = clip[(i + 1) % n];
        let edge = b - a;
        let input = std::mem::take(&mut output);
        let m = input.len();
        for j in 0..m {
            let cur = input[j];
            let prev = input[(j + m - 1) % m];
            let cur_in = cross2(&edge, &(cur - a)) >= 0.0;
            let prev_in = cross2(&edge, &(prev - a)) >= 0.0;
            if cur_in {
                if !prev_in {
                    output.push(segment_line_intersection(&prev, &cur, &a, &edge));
                }
                output.push(cur);
            } else if prev_in {
                output.push(segment_line_intersection(&prev, &cur, &a, &edge));
            }
        }
    }
    output
}

fn segment_line_intersection(p: &Vec2, q: &Vec2, a: &Vec2, edge: &Vec2) -> Vec2 {
    let d = q - p;
    let denom = cross2(&d, edge);
    if denom.abs() <= Real::EPSILON {
        return *q;
    }
    let t = cross2(&(a - p), edge) / denom;
    p + t * d
}

/// Area of the overlap of two planar polygons (the second must be convex).
pub fn overlap_area_2d(subject: &[Vec2], clip: &[Vec2]) -> Real {
    let mut s = subject.to_vec();
    let mut c = clip.to_vec();
    make_ccw(&mut s);
    make_ccw(&mut c);
    let overlap = clip_convex(&s, &c);
    signed_area_2d(&overlap).max(0.0)
}

/// Barycentric coordinates of `p` in triangle `(a, b, c)`.
///
/// Returns `None` for a degenerate triangle or when `p` lies outside by more
/// than `tol` in any coordinate.
pub fn barycentric(p: &Vec2, a: &Vec2, b: &Vec2, c: &Vec2, tol: Real) -> Option<[Real; 3]> {
    let det = cross2(&(b - a), &(c - a));
    if det.abs() <= Real::EPSILON {
        return None;
    }
    let l1 = cross2(&(b - p), &(c - p)) / det;
    let l2 = cross2(&(c - p), &(a - p)) / det;
    let l3 = 1.0 - l1 - l2;
    if l1 < -tol || l2 < -tol || l3 < -tol {
        return None;
    }
    Some([l1, l2, l3])
}
