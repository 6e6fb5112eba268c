//! AVX2 backend for 256-bit vector operations.
//!
//! This module is only compiled when the build script detected AVX2 on an x86
//! host. It provides [`f32x8::F32x8`], the pack `f32` buffers are traversed
//! with on such hosts.
//!
//! - **Vector Width**: 256 bits (8 × f32)
//! - **Memory Alignment**: aligned loads and stores require 32-byte boundaries

pub mod f32x8;
