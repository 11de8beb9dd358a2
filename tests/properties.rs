//! Property-based tests for mesh invariants.
//!
//! Run with: cargo test --test properties

use facette::algo::decimate::{redux_count, ReduxOptions};
use facette::algo::physics::MassProperties;
use facette::algo::processing::transform;
use facette::algo::shapes::{box_mesh, sphere_tess, Platonic};
use facette::algo::subdivide::subdivide_all;
use facette::algo::topology::add_rectangular_surface;
use facette::algo::utils::MeshIssue;
use facette::prelude::*;
use nalgebra::{Matrix4, Point3, Rotation3, Translation3, Vector3};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_position() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-10.0..10.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// Rotation, translation and a positive non-uniform scale.
fn arb_affine() -> impl Strategy<Value = Matrix4<f64>> {
    (
        prop::array::uniform3(-3.0..3.0f64),
        prop::array::uniform3(-5.0..5.0f64),
        prop::array::uniform3(0.2..4.0f64),
    )
        .prop_map(|([r, p, y], [tx, ty, tz], [sx, sy, sz])| {
            Translation3::new(tx, ty, tz).to_homogeneous()
                * Rotation3::from_euler_angles(r, p, y).to_homogeneous()
                * Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
        })
}

/// Every opposite link is reciprocal and joins the same two vertices.
fn assert_reciprocal_opposites(mesh: &Mesh) {
    for &t in mesh.triangle_ids() {
        for he in mesh.triangle_halfedges(t) {
            if let Some(o) = mesh.opposite(he) {
                assert_eq!(mesh.opposite(o), Some(he));
                assert_eq!(mesh.origin(o), mesh.target(he));
                assert_eq!(mesh.target(o), mesh.origin(he));
            }
        }
    }
}

// =============================================================================
// Construction
// =============================================================================

proptest! {
    #[test]
    fn failed_triangles_leave_mesh_unchanged(
        positions in prop::collection::vec(arb_position(), 4..12),
        faces in prop::collection::vec(prop::array::uniform3(0usize..12), 1..40),
    ) {
        let mut mesh = Mesh::new("random");
        let ids: Vec<VertexId> = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| mesh.add_vertex_at(format!("p{i}"), p))
            .collect();

        for [a, b, c] in faces {
            let (a, b, c) = (ids[a % ids.len()], ids[b % ids.len()], ids[c % ids.len()]);
            let before = (mesh.triangle_count(), mesh.halfedge_count(), mesh.boundary_halfedge_count());
            if mesh.add_triangle(a, b, c).is_err() {
                let after = (mesh.triangle_count(), mesh.halfedge_count(), mesh.boundary_halfedge_count());
                prop_assert_eq!(before, after);
            }
        }

        assert_reciprocal_opposites(&mesh);
        // a triangle and its reverse form a legal closed pair
        let report = check_mesh(&mut mesh, &CheckOptions::default()).unwrap();
        for issue in &report.issues {
            prop_assert!(
                issue.is_tolerable() || matches!(issue, MeshIssue::DuplicateTriangle { .. }),
                "{}",
                issue
            );
        }
    }

    #[test]
    fn rectangular_surface_counts(
        nu in 3usize..12,
        nv in 3usize..12,
        close_u in any::<bool>(),
        close_v in any::<bool>(),
    ) {
        let mut mesh = Mesh::new("grid");
        add_rectangular_surface(&mut mesh, nu, nv, "g%d-%d", close_u, close_v).unwrap();

        let cu = if close_u { nu } else { nu - 1 };
        let cv = if close_v { nv } else { nv - 1 };
        prop_assert_eq!(mesh.vertex_count(), nu * nv);
        prop_assert_eq!(mesh.triangle_count(), 2 * cu * cv);
        prop_assert_eq!(mesh.is_closed(), close_u && close_v);
    }
}

// =============================================================================
// Processing
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn transform_round_trip(m in arb_affine()) {
        let mut mesh = sphere_tess(Platonic::Octahedron, 1).unwrap();
        let before: Vec<Point3<f64>> = mesh.vertices().map(|(_, v)| *v.position()).collect();

        let inverse = m.try_inverse().unwrap();
        transform(&mut mesh, &m).unwrap();
        transform(&mut mesh, &inverse).unwrap();

        for ((_, v), p) in mesh.vertices().zip(&before) {
            prop_assert!((v.position() - p).norm() < 1e-9);
        }
    }

    #[test]
    fn subdivision_keeps_bounding_box(iterations in 1usize..3) {
        let mut mesh = sphere_tess(Platonic::Icosahedron, 1).unwrap();
        let (min, max) = mesh.bounding_box().unwrap();
        let triangles = mesh.triangle_ids().to_vec();

        let result = subdivide_all(&mut mesh, &triangles, iterations, 0.0).unwrap();

        prop_assert_eq!(result.len(), triangles.len() * 3usize.pow(iterations as u32));
        prop_assert_eq!(mesh.triangle_count(), result.len());
        let (new_min, new_max) = mesh.bounding_box().unwrap();
        prop_assert!((new_min - min).norm() < 1e-12);
        prop_assert!((new_max - max).norm() < 1e-12);
    }

    #[test]
    fn redux_stays_manifold(n in 0usize..150) {
        let mut mesh = sphere_tess(Platonic::Icosahedron, 2).unwrap();
        let original = mesh.vertex_count();

        let report = redux_count(&mut mesh, n, &ReduxOptions::default()).unwrap();

        prop_assert!(report.removed <= n);
        prop_assert_eq!(mesh.vertex_count(), original - report.removed);
        prop_assert!(mesh.is_closed());
        assert_reciprocal_opposites(&mesh);
        let check = check_mesh(&mut mesh, &CheckOptions::default()).unwrap();
        prop_assert!(check.is_valid(), "{}", check);
    }

    #[test]
    fn box_volume_matches_extents(a in arb_position(), b in arb_position()) {
        let min = a.inf(&b);
        let max = a.sup(&b);
        let extent = max - min;
        prop_assume!(extent.x > 1e-3 && extent.y > 1e-3 && extent.z > 1e-3);

        let mesh = box_mesh(min, max).unwrap();
        let props = MassProperties::compute(&mesh, 1.0).unwrap();

        let expected = extent.x * extent.y * extent.z;
        prop_assert!((props.volume - expected).abs() < 1e-9 * expected.max(1.0));
        prop_assert!((props.center_of_mass - nalgebra::center(&min, &max)).norm() < 1e-9);
    }
}
