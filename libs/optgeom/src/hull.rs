//! Convex hulls of point sets.

use super::{Point, Polygon};

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Computes the convex hull of `points` using Andrew's monotone chain.
///
/// The result is counter-clockwise, starts at the lowest-leftmost point,
/// and omits collinear vertices.
pub fn convex_hull(points: &[Point]) -> Polygon {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup_by(|a, b| a.approx_eq(*b));
    if pts.len() < 3 {
        return Polygon { points: pts };
    }

    let mut hull: Vec<Point> = Vec::with_capacity(2 * pts.len());
    for &p in pts.iter() {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0. {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0. {
            hull.pop();
        }
        hull.push(p);
    }
    // Last point repeats the first.
    hull.pop();
    Polygon { points: hull }
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::*;

    #[test]
    fn hull_drops_interior_points() {
        let pts = [
            Point::new(0., 0.),
            Point::new(4., 0.),
            Point::new(2., 1.),
            Point::new(4., 4.),
            Point::new(0., 4.),
            Point::new(1., 3.),
            Point::new(2., 0.),
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull.points.len(), 4);
        assert_float_eq!(hull.area(), 16., abs <= 1e-12);
    }

    #[test]
    fn degenerate_inputs() {
        assert!(convex_hull(&[]).points.is_empty());
        let two = convex_hull(&[Point::new(1., 1.), Point::new(0., 0.)]);
        assert_eq!(two.points, vec![Point::new(0., 0.), Point::new(1., 1.)]);
    }
}
