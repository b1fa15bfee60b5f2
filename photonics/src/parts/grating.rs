//! Linear grating couplers.

use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use optgeom::arc::{arc_points, ring_sector, DEFAULT_TOLERANCE};
use optgeom::bbox::{Bbox, BoundBox};
use optgeom::hull::convex_hull;
use optgeom::{GeometryError, Point, Polygon, Port};
use serde::{Deserialize, Serialize};

use crate::error::{with_err_context, ErrorContext, Result};
use crate::layout::cell::Cell;
use crate::layout::context::Library;
use crate::layout::group::Group;
use crate::layout::Draw;

fn default_angle() -> f64 {
    -FRAC_PI_2
}

/// Parameters of a traditional (linear, focusing-free) grating coupler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GratingParams {
    /// Width of the feeding waveguide.
    pub width: f64,
    /// Full opening angle of the fan, in radians.
    pub full_opening_angle: f64,
    pub grating_period: f64,
    /// Fraction of each period that is left unetched.
    pub grating_ff: f64,
    pub n_gratings: usize,
    pub taper_length: f64,
    /// Direction in which the grating body extends from its port.
    #[serde(default = "default_angle")]
    pub angle: f64,
}

impl GratingParams {
    /// Returns a copy with the fan opening angle scaled by `factor`.
    pub fn with_opening_scaled(&self, factor: f64) -> Self {
        Self {
            full_opening_angle: self.full_opening_angle * factor,
            ..*self
        }
    }

    fn validate(&self) -> std::result::Result<(), GeometryError> {
        let checks = [
            ("grating width", self.width, self.width > 0.),
            (
                "grating opening angle",
                self.full_opening_angle,
                self.full_opening_angle > 0. && self.full_opening_angle < PI,
            ),
            ("grating period", self.grating_period, self.grating_period > 0.),
            (
                "grating fill factor",
                self.grating_ff,
                (0. ..=1.).contains(&self.grating_ff),
            ),
            ("grating taper length", self.taper_length, self.taper_length > 0.),
        ];
        for (name, value, ok) in checks {
            if !ok {
                return Err(GeometryError::InvalidDimension { name, value });
            }
        }
        Ok(())
    }
}

/// A fan-shaped grating coupler: a tapered wedge followed by annular teeth.
#[derive(Debug, Clone, PartialEq)]
pub struct GratingCoupler {
    origin: Point,
    params: GratingParams,
    extra_triangle: bool,
}

impl GratingCoupler {
    /// Creates a coupler whose port sits at `origin`.
    ///
    /// When `extra_triangle` is set, the taper wedge is drawn along with the teeth.
    pub fn make_traditional(
        origin: Point,
        params: GratingParams,
        extra_triangle: bool,
    ) -> std::result::Result<Self, GeometryError> {
        params.validate()?;
        Ok(Self {
            origin,
            params,
            extra_triangle,
        })
    }

    #[inline]
    pub fn params(&self) -> &GratingParams {
        &self.params
    }

    /// The optical port, facing away from the grating body.
    pub fn port(&self) -> Port {
        Port::new(self.origin, self.params.angle + PI, self.params.width)
    }

    /// The taper joining the waveguide to the grating region.
    pub fn wedge(&self) -> Polygon {
        let p = &self.params;
        let half = p.full_opening_angle / 2.;
        let side = Point::from_polar(p.width / 2., p.angle + FRAC_PI_2);
        let mut points = vec![self.origin - side];
        points.extend(arc_points(
            self.origin,
            p.taper_length,
            p.angle - half,
            p.full_opening_angle,
            DEFAULT_TOLERANCE,
        ));
        points.push(self.origin + side);
        Polygon::new(points)
    }

    /// One annular sector per grating period, nearest tooth first.
    pub fn teeth(&self) -> Vec<Polygon> {
        let p = &self.params;
        let half = p.full_opening_angle / 2.;
        (0..p.n_gratings)
            .map(|k| {
                let r0 = p.taper_length + k as f64 * p.grating_period;
                ring_sector(
                    self.origin,
                    r0 + (1. - p.grating_ff) * p.grating_period,
                    r0 + p.grating_period,
                    p.angle - half,
                    p.full_opening_angle,
                    DEFAULT_TOLERANCE,
                )
            })
            .collect()
    }

    /// The drawn geometry of the coupler.
    pub fn polygons(&self) -> Vec<Polygon> {
        let mut polys = self.teeth();
        if self.extra_triangle {
            polys.push(self.wedge());
        }
        polys
    }

    /// The convex hull of the wedge and every tooth.
    pub fn outline(&self) -> Polygon {
        let mut points = self.wedge().points;
        for tooth in self.teeth() {
            points.extend(tooth.points);
        }
        convex_hull(&points)
    }
}

impl Draw for GratingCoupler {
    fn draw(&self) -> Result<Group> {
        Ok(self.polygons().into_iter().collect())
    }
}

impl BoundBox for GratingCoupler {
    fn bbox(&self) -> Bbox {
        self.outline().bbox()
    }
}

/// Overrides applied when creating a grating coupler at a port.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CouplerOverrides {
    pub width: Option<f64>,
    pub angle: Option<f64>,
}

/// A grating coupler cell that follows the Cornerstone foundry rules:
/// a convex outline on the waveguide layer and a slightly wider
/// fan of teeth on the shallow-etch grating layer.
#[derive(Debug, Clone)]
pub struct CornerstoneGratingCoupler {
    cell: Arc<Cell>,
    port: Port,
    params: GratingParams,
}

/// Formats a coordinate for use in a cell name, without float noise.
fn fmt_coord(v: f64) -> String {
    let rounded = (v * 1e6).round() / 1e6;
    // Avoid "-0".
    format!("{}", rounded + 0.)
}

impl CornerstoneGratingCoupler {
    /// Creates a grating cell whose port sits at `origin`.
    pub fn create(lib: &mut Library, origin: Point, params: &GratingParams) -> Result<Self> {
        with_err_context(Self::create_inner(lib, origin, params), || {
            ErrorContext::BuildPart("grating coupler")
        })
    }

    fn create_inner(lib: &mut Library, origin: Point, params: &GratingParams) -> Result<Self> {
        let pdk = lib.pdk();
        let layers = pdk.layers();

        let proto = GratingCoupler::make_traditional(origin, *params, false)?;
        let teeth_params = GratingParams {
            angle: params.angle,
            ..pdk.teeth_params()
        };
        let teeth = GratingCoupler::make_traditional(origin, teeth_params, true)?;

        let name = format!(
            "GC_period_{}_coords_{}_{}_{}",
            params.grating_period,
            fmt_coord(origin.x),
            fmt_coord(origin.y),
            lib.next_id()
        );
        let mut cell = Cell::new(lib.alloc_name(name));
        cell.add_element(layers.waveguide, proto.outline());
        cell.add_to_layer(layers.grating, &teeth)?;

        Ok(Self {
            cell: lib.add_cell(cell),
            port: proto.port(),
            params: *params,
        })
    }

    /// Creates a grating cell at `port`, taking the port's width and direction
    /// unless `overrides` specify otherwise.
    pub fn at_port(
        lib: &mut Library,
        port: Port,
        params: &GratingParams,
        overrides: CouplerOverrides,
    ) -> Result<Self> {
        let params = GratingParams {
            width: overrides.width.unwrap_or(port.width),
            angle: overrides.angle.unwrap_or(port.angle),
            ..*params
        };
        Self::create(lib, port.origin, &params)
    }

    #[inline]
    pub fn cell(&self) -> &Arc<Cell> {
        &self.cell
    }

    #[inline]
    pub fn port(&self) -> Port {
        self.port
    }

    #[inline]
    pub fn params(&self) -> &GratingParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use float_eq::assert_float_eq;

    use super::*;
    use crate::test_util::test_library;

    fn params() -> GratingParams {
        GratingParams {
            width: 0.45,
            full_opening_angle: 1.5f64.to_radians(),
            grating_period: 0.67,
            grating_ff: 0.5,
            n_gratings: 60,
            taper_length: 350.,
            angle: -FRAC_PI_2,
        }
    }

    #[test]
    fn port_faces_away_from_body() {
        let gc = GratingCoupler::make_traditional(Point::new(3., 4.), params(), false).unwrap();
        let port = gc.port();
        assert_eq!(port.origin, Point::new(3., 4.));
        assert_float_eq!(port.angle, FRAC_PI_2, abs <= 1e-12);

        let bbox = gc.bbox();
        assert_float_eq!(bbox.p1.y, 4., abs <= 1e-9);
        assert_float_eq!(bbox.p0.y, 4. - (350. + 60. * 0.67), abs <= 2e-3);
    }

    #[test]
    fn teeth_start_after_first_gap() {
        let gc = GratingCoupler::make_traditional(Point::zero(), params(), false).unwrap();
        let teeth = gc.teeth();
        assert_eq!(teeth.len(), 60);
        // Body extends towards -y, so the nearest tooth edge is its top.
        let first = teeth[0].bbox();
        assert_float_eq!(first.p1.y, -(350. + 0.335) * (0.75f64.to_radians()).cos(), abs <= 1e-3);
        assert_float_eq!(first.p0.y, -(350. + 0.67), abs <= 2e-3);
    }

    #[test]
    fn extra_triangle_adds_wedge() {
        let plain = GratingCoupler::make_traditional(Point::zero(), params(), false).unwrap();
        let full = GratingCoupler::make_traditional(Point::zero(), params(), true).unwrap();
        assert_eq!(full.polygons().len(), plain.polygons().len() + 1);
        assert!(plain.outline().contains(Point::new(0., -100.)));
        assert!(plain.outline().area() > 0.);
    }

    #[test]
    fn cell_name_records_period_position_and_id() {
        let mut lib = test_library();
        let first = CornerstoneGratingCoupler::create(&mut lib, Point::new(127., 0.), &params())
            .unwrap();
        let second =
            CornerstoneGratingCoupler::create(&mut lib, Point::new(-3.5, 2.25), &params())
                .unwrap();
        assert_eq!(first.cell().name().as_str(), "GC_period_0.67_coords_127_0_0");
        assert_eq!(second.cell().name().as_str(), "GC_period_0.67_coords_-3.5_2.25_1");
    }

    #[test]
    fn at_port_applies_overrides() {
        let mut lib = test_library();
        let port = Port::new((254., 0.), FRAC_PI_2, 0.5);

        let taken = CornerstoneGratingCoupler::at_port(
            &mut lib,
            port,
            &params(),
            CouplerOverrides::default(),
        )
        .unwrap();
        assert_float_eq!(taken.params().width, 0.5, abs <= 1e-12);
        assert_float_eq!(taken.params().angle, FRAC_PI_2, abs <= 1e-12);
        assert_float_eq!(taken.port().angle, -FRAC_PI_2, abs <= 1e-12);
        // The body follows the port upwards.
        assert!(taken.cell().bbox().p0.y > -1.);

        let overridden = CornerstoneGratingCoupler::at_port(
            &mut lib,
            port,
            &params(),
            CouplerOverrides {
                width: Some(0.45),
                angle: Some(-FRAC_PI_2),
            },
        )
        .unwrap();
        assert_float_eq!(overridden.params().width, 0.45, abs <= 1e-12);
        assert_float_eq!(overridden.params().angle, -FRAC_PI_2, abs <= 1e-12);
        assert_float_eq!(overridden.port().angle, FRAC_PI_2, abs <= 1e-12);
        assert_float_eq!(overridden.port().width, 0.45, abs <= 1e-12);
        assert_eq!(overridden.port().origin, Point::new(254., 0.));
        assert!(overridden.cell().bbox().p0.y < -350.);
    }

    #[test]
    fn rejects_bad_parameters() {
        let bad = GratingParams {
            grating_period: 0.,
            ..params()
        };
        assert!(GratingCoupler::make_traditional(Point::zero(), bad, false).is_err());
    }
}
