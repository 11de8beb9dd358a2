//! Index types for mesh elements.
//!
//! Vertices, triangles and half-edges live in arenas owned by a [`Mesh`].
//! The ids handed out by a mesh are type-safe wrappers around an arena slot,
//! tagged with the mesh that issued them. A mesh rejects ids that carry
//! another mesh's tag, and slots are never reused, so an id that outlives
//! its element is rejected too.
//!
//! [`Mesh`]: super::Mesh

use std::fmt::{self, Debug};
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_MESH_TAG: AtomicU32 = AtomicU32::new(1);

/// Allocate a tag for a newly created mesh.
pub(crate) fn next_mesh_tag() -> u32 {
    NEXT_MESH_TAG.fetch_add(1, Ordering::Relaxed)
}

/// A type-safe vertex id.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VertexId {
    mesh: u32,
    slot: u32,
}

/// A type-safe triangle id.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TriangleId {
    mesh: u32,
    slot: u32,
}

/// A type-safe half-edge id.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct HalfEdgeId {
    mesh: u32,
    slot: u32,
}

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl $name {
            #[inline]
            pub(crate) fn new(mesh: u32, index: usize) -> Self {
                debug_assert!(index < u32::MAX as usize, "index {} too large", index);
                Self {
                    mesh,
                    slot: index as u32,
                }
            }

            /// Arena slot of the element.
            ///
            /// Stable for the lifetime of the element. This is not the position
            /// of the element in the mesh's ordered lists, which shifts when
            /// earlier elements are deleted.
            #[inline]
            pub fn index(self) -> usize {
                self.slot as usize
            }

            #[inline]
            pub(crate) fn mesh_tag(self) -> u32 {
                self.mesh
            }

            /// The same slot under another mesh tag.
            #[inline]
            pub(crate) fn with_tag(self, mesh: u32) -> Self {
                Self { mesh, ..self }
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.slot)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(TriangleId, "T");
impl_index_type!(HalfEdgeId, "HE");
