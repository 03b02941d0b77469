//! Handle types for mesh elements.
//!
//! Nodes, edges and faces live in append-only arenas inside a
//! [`Mesh`](super::Mesh), so a handle is just the element's position in its
//! arena. Handles stay valid for the lifetime of the mesh because elements
//! are only ever marked inactive, never erased.

use std::fmt::{self, Debug};

/// A stable node handle. Its index doubles as the node's identifier.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

/// A stable edge handle.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId(u32);

/// A stable face handle.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId(u32);

macro_rules! impl_handle_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a handle from an arena position.
            ///
            /// # Panics
            /// Panics in debug builds if `index` does not fit in 32 bits.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index <= u32::MAX as usize, "handle {} too large", index);
                Self(index as u32)
            }

            /// Arena position of this element.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", $display, self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_handle_type!(NodeId, "N");
impl_handle_type!(EdgeId, "E");
impl_handle_type!(FaceId, "F");
