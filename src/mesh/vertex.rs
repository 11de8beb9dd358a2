//! Vertex records and their attribute set.

use nalgebra::{Point3, Vector2, Vector3, Vector4};

use super::index::HalfEdgeId;

/// Per-vertex attributes.
///
/// The set is fixed: position, normal, tangent, texture coordinate, color,
/// plus an optional morph target (alternate position and normal).
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttributes {
    /// Position in model space.
    pub position: Point3<f64>,
    /// Unit normal, or zero when undefined.
    pub normal: Vector3<f64>,
    /// Unit tangent, or zero when undefined.
    pub tangent: Vector3<f64>,
    /// Texture coordinate.
    pub texcoord: Vector2<f64>,
    /// RGBA color.
    pub color: Vector4<f64>,
    /// Morph target position.
    pub morph_position: Option<Point3<f64>>,
    /// Morph target normal.
    pub morph_normal: Option<Vector3<f64>>,
}

impl Default for VertexAttributes {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            normal: Vector3::zeros(),
            tangent: Vector3::zeros(),
            texcoord: Vector2::zeros(),
            color: Vector4::new(1.0, 1.0, 1.0, 1.0),
            morph_position: None,
            morph_normal: None,
        }
    }
}

impl VertexAttributes {
    /// Default attributes at the given position.
    pub fn at(position: Point3<f64>) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Linear interpolation of every attribute, `k = 0` giving `a`.
    ///
    /// Normals and tangents are renormalized. Morph attributes survive only
    /// when both ends carry them.
    pub fn lerp(a: &Self, b: &Self, k: f64) -> Self {
        Self {
            position: a.position + (b.position - a.position) * k,
            normal: unit_or_zero(a.normal.lerp(&b.normal, k)),
            tangent: unit_or_zero(a.tangent.lerp(&b.tangent, k)),
            texcoord: a.texcoord.lerp(&b.texcoord, k),
            color: a.color.lerp(&b.color, k),
            morph_position: match (a.morph_position, b.morph_position) {
                (Some(pa), Some(pb)) => Some(pa + (pb - pa) * k),
                _ => None,
            },
            morph_normal: match (a.morph_normal, b.morph_normal) {
                (Some(na), Some(nb)) => Some(unit_or_zero(na.lerp(&nb, k))),
                _ => None,
            },
        }
    }

    /// Cubic Hermite interpolation of the position between `a` and `b` with
    /// end tangents `ta` and `tb`; other attributes are interpolated linearly.
    pub fn hermite(a: &Self, ta: &Vector3<f64>, b: &Self, tb: &Vector3<f64>, k: f64) -> Self {
        let k2 = k * k;
        let k3 = k2 * k;
        let h00 = 2.0 * k3 - 3.0 * k2 + 1.0;
        let h10 = k3 - 2.0 * k2 + k;
        let h01 = -2.0 * k3 + 3.0 * k2;
        let h11 = k3 - k2;

        let mut result = Self::lerp(a, b, k);
        result.position = Point3::from(
            a.position.coords * h00 + ta * h10 + b.position.coords * h01 + tb * h11,
        );
        result
    }

    /// Average of three attribute sets (barycenter of a triangle).
    pub fn barycenter(a: &Self, b: &Self, c: &Self) -> Self {
        let third = 1.0 / 3.0;
        Self {
            position: Point3::from((a.position.coords + b.position.coords + c.position.coords) * third),
            normal: unit_or_zero(a.normal + b.normal + c.normal),
            tangent: unit_or_zero(a.tangent + b.tangent + c.tangent),
            texcoord: (a.texcoord + b.texcoord + c.texcoord) * third,
            color: (a.color + b.color + c.color) * third,
            morph_position: match (a.morph_position, b.morph_position, c.morph_position) {
                (Some(pa), Some(pb), Some(pc)) => {
                    Some(Point3::from((pa.coords + pb.coords + pc.coords) * third))
                }
                _ => None,
            },
            morph_normal: match (a.morph_normal, b.morph_normal, c.morph_normal) {
                (Some(na), Some(nb), Some(nc)) => Some(unit_or_zero(na + nb + nc)),
                _ => None,
            },
        }
    }
}

/// Normalize `v`, or return zero when it is too short to have a direction.
#[inline]
pub(crate) fn unit_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(1e-12).unwrap_or_else(Vector3::zeros)
}

/// A vertex in the mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    pub(crate) name: String,

    /// Attributes of this vertex.
    pub attributes: VertexAttributes,

    /// Head of the sibling chain of outgoing half-edges.
    pub(crate) halfedge: Option<HalfEdgeId>,
}

impl Vertex {
    pub(crate) fn new(name: String, attributes: VertexAttributes) -> Self {
        Self {
            name,
            attributes,
            halfedge: None,
        }
    }

    /// Name given at creation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the vertex.
    #[inline]
    pub fn position(&self) -> &Point3<f64> {
        &self.attributes.position
    }

    /// Normal of the vertex.
    #[inline]
    pub fn normal(&self) -> &Vector3<f64> {
        &self.attributes.normal
    }

    /// True when no triangle uses this vertex.
    #[inline]
    pub fn is_isolated(&self) -> bool {
        self.halfedge.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lerp_midpoint() {
        let mut a = VertexAttributes::at(Point3::new(0.0, 0.0, 0.0));
        let mut b = VertexAttributes::at(Point3::new(2.0, 4.0, 0.0));
        a.color = Vector4::new(1.0, 0.0, 0.0, 1.0);
        b.color = Vector4::new(0.0, 0.0, 1.0, 1.0);
        a.normal = Vector3::x();
        b.normal = Vector3::y();

        let m = VertexAttributes::lerp(&a, &b, 0.5);
        assert_relative_eq!(m.position, Point3::new(1.0, 2.0, 0.0));
        assert_relative_eq!(m.color, Vector4::new(0.5, 0.0, 0.5, 1.0));
        assert_relative_eq!(m.normal.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lerp_drops_one_sided_morph() {
        let mut a = VertexAttributes::default();
        a.morph_position = Some(Point3::new(1.0, 1.0, 1.0));
        let b = VertexAttributes::default();
        assert!(VertexAttributes::lerp(&a, &b, 0.5).morph_position.is_none());
    }

    #[test]
    fn test_hermite_zero_tangents_is_lerp() {
        let a = VertexAttributes::at(Point3::new(0.0, 0.0, 0.0));
        let b = VertexAttributes::at(Point3::new(2.0, 0.0, 0.0));
        let zero = Vector3::zeros();
        let m = VertexAttributes::hermite(&a, &zero, &b, &zero, 0.5);
        assert_relative_eq!(m.position, Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_hermite_bulges_along_tangents() {
        let a = VertexAttributes::at(Point3::new(0.0, 0.0, 0.0));
        let b = VertexAttributes::at(Point3::new(2.0, 0.0, 0.0));
        let ta = Vector3::new(0.0, 1.0, 0.0);
        let tb = Vector3::new(0.0, -1.0, 0.0);
        let m = VertexAttributes::hermite(&a, &ta, &b, &tb, 0.5);
        assert_relative_eq!(m.position.y, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_barycenter() {
        let a = VertexAttributes::at(Point3::new(0.0, 0.0, 0.0));
        let b = VertexAttributes::at(Point3::new(3.0, 0.0, 0.0));
        let c = VertexAttributes::at(Point3::new(0.0, 3.0, 0.0));
        let m = VertexAttributes::barycenter(&a, &b, &c);
        assert_relative_eq!(m.position, Point3::new(1.0, 1.0, 0.0));
        assert_eq!(m.normal, Vector3::zeros());
    }
}
