//! ARM NEON backend for 128-bit vector operations.
//!
//! This module is only compiled on AArch64 hosts where the build script
//! detected Advanced SIMD. It provides [`f32x4::F32x4`], the pack `f32`
//! buffers are traversed with on such hosts.
//!
//! - **Vector Width**: 128 bits (4 × f32)
//! - **Memory Alignment**: 16-byte boundaries for the aligned body

pub mod f32x4;
