//! Core library for incremental TIN surface maintenance.
//!
//! A [`mesh::TinMesh`] is an immutable snapshot of a triangulated irregular
//! network. Every operation consumes a snapshot (or its tables) and returns a
//! new one; callers chain [`cleanup`], [`boundary`], [`locate`] and
//! [`refine`] as survey data arrives. The Delaunay solvers themselves live
//! behind [`triangulate::Triangulator`].

pub mod boundary;
pub mod cleanup;
pub mod error;
pub mod geometry;
pub mod locate;
pub mod mesh;
pub mod refine;
pub mod sample;
pub mod triangulate;

pub use error::{Result, TinError};
pub use mesh::TinMesh;
