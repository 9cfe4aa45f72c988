#![warn(missing_docs)]
//! Module for handling geometric surfaces
//!
//! This module contains the [`GeoSurface`] trait which handles the interface for calculating intersection
//! points of a ray with the (one-dimensional) surface of a component as well as the concrete surface types
//! [`FlatSurface`] and [`ArcSurface`].
use serde::{Deserialize, Serialize};

use crate::vector2::Vector2;

/// Intersections closer than this distance (in scene units) are ignored.
///
/// A ray spawned on a surface would otherwise immediately intersect the surface it starts on.
pub const MIN_HIT_DISTANCE: f64 = 1e-7;

/// The side of a surface which was hit by a ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Face {
    /// The ray propagates along the surface's axis (it arrives from the rear half plane).
    Front,
    /// The ray propagates against the surface's axis.
    Back,
}

/// Additional, surface specific information about a [`Hit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitContext {
    /// Signed position of the hit point along the surface, measured from the component position along its tangent.
    pub offset: f64,
    /// The side of the surface which was hit.
    pub face: Face,
}

/// The result of intersecting a ray with a surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// distance from the ray origin to the hit point (always > 0)
    pub distance: f64,
    /// the intersection point
    pub point: Vector2,
    /// unit surface normal at the hit point, oriented against the incoming ray
    pub normal: Vector2,
    /// surface specific context
    pub context: HitContext,
}

/// Trait for handling geometric surfaces.
pub trait GeoSurface {
    /// Intersect a ray given by its `origin` and (normalized) `direction` with this surface.
    ///
    /// The hits are returned sorted by ascending distance. An empty vector is returned if there is no valid
    /// intersection.
    fn intersect(&self, origin: Vector2, direction: Vector2) -> Vec<Hit>;
}

/// A straight line segment centered at `center` and oriented perpendicular to `axis`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatSurface {
    center: Vector2,
    axis: Vector2,
    length: f64,
}
impl FlatSurface {
    /// Creates a new [`FlatSurface`].
    ///
    /// The given `axis` is normalized. The surface extends `length / 2` to both sides of `center`.
    #[must_use]
    pub fn new(center: Vector2, axis: Vector2, length: f64) -> Self {
        Self {
            center,
            axis: axis.normalize(),
            length: length.abs(),
        }
    }
    /// Returns the unit tangent of this surface (the axis rotated by +90°).
    #[must_use]
    pub fn tangent(&self) -> Vector2 {
        self.axis.perpendicular()
    }
}
impl GeoSurface for FlatSurface {
    fn intersect(&self, origin: Vector2, direction: Vector2) -> Vec<Hit> {
        let tangent = self.tangent();
        let denom = direction.cross(tangent);
        if denom.abs() < f64::EPSILON || self.axis.magnitude_squared() == 0.0 {
            // ray parallel to the surface (or degenerate surface)
            return Vec::new();
        }
        let to_center = self.center - origin;
        let distance = to_center.cross(tangent) / denom;
        let offset = to_center.cross(direction) / denom;
        if !distance.is_finite() || distance <= MIN_HIT_DISTANCE || offset.abs() > self.length / 2.0 {
            return Vec::new();
        }
        let along_axis = direction.dot(self.axis);
        let (face, normal) = if along_axis > 0.0 {
            (Face::Front, -self.axis)
        } else {
            (Face::Back, self.axis)
        };
        vec![Hit {
            distance,
            point: origin + direction * distance,
            normal,
            context: HitContext { offset, face },
        }]
    }
}

/// A circular arc (cap) with its vertex at `vertex`.
///
/// The cap opens towards `axis` for a negative `radius` (concave as seen from the `axis` side) and away from it for a
/// positive `radius` (convex). The `aperture` limits the extent of the cap along the tangent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSurface {
    vertex: Vector2,
    axis: Vector2,
    radius: f64,
    aperture: f64,
}
impl ArcSurface {
    /// Creates a new [`ArcSurface`].
    #[must_use]
    pub fn new(vertex: Vector2, axis: Vector2, radius: f64, aperture: f64) -> Self {
        Self {
            vertex,
            axis: axis.normalize(),
            radius,
            aperture: aperture.abs(),
        }
    }
    /// Returns the center of curvature of this arc.
    #[must_use]
    pub fn center_of_curvature(&self) -> Vector2 {
        self.vertex - self.axis * self.radius
    }
}
impl GeoSurface for ArcSurface {
    fn intersect(&self, origin: Vector2, direction: Vector2) -> Vec<Hit> {
        if self.radius == 0.0 || !self.radius.is_finite() {
            return Vec::new();
        }
        let center = self.center_of_curvature();
        let to_vertex = self.vertex - center;
        let tangent = self.axis.perpendicular();
        let oc = origin - center;
        let b = direction.dot(oc);
        let c = self.radius.mul_add(-self.radius, oc.magnitude_squared());
        let discriminant = b.mul_add(b, -c);
        if discriminant < 0.0 {
            return Vec::new();
        }
        let root = discriminant.sqrt();
        let mut hits: Vec<Hit> = [-b - root, -b + root]
            .into_iter()
            .filter(|d| d.is_finite() && *d > MIN_HIT_DISTANCE)
            .filter_map(|distance| {
                let point = origin + direction * distance;
                let radial = point - center;
                if radial.dot(to_vertex) <= 0.0 {
                    // point on the far side of the circle
                    return None;
                }
                let offset = (point - self.vertex).dot(tangent);
                if offset.abs() > self.aperture / 2.0 {
                    return None;
                }
                let outward = radial.normalize();
                let normal = if outward.dot(direction) > 0.0 {
                    -outward
                } else {
                    outward
                };
                let face = if direction.dot(self.axis) > 0.0 {
                    Face::Front
                } else {
                    Face::Back
                };
                Some(Hit {
                    distance,
                    point,
                    normal,
                    context: HitContext { offset, face },
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
