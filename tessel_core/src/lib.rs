// Copyright 2026 the Tessel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-point affine matrices and shared hardware resource pools for
//! tile-based 2D display hardware.
//!
//! `tessel_core` targets display processors without floating-point hardware.
//! It turns transforms described in human units (degrees, unit scales) into
//! the exact 16-bit register values the rendering unit consumes, and manages
//! the scarce hardware slots those registers, tiles and palettes live in. It
//! is `no_std` compatible (with `alloc`).
//!
//! # Architecture
//!
//! ```text
//!   Fixed ──► SIN_LUT / RECIPROCAL_16_LUT
//!                      │
//!                      ▼
//!            AffineMatAttributes ──► (pa, pb, pc, pd)
//!                      │
//!                      ▼
//!   ResourceContext ──► Pool<K>::create() ──► Handle<K> ──► clone / drop
//!                             │
//!                             ▼
//!                   drain_commits() ──► CommitBatch ──► hardware upload
//! ```
//!
//! **[`fixed`]**: `i32`-backed fixed-point numbers with a compile-time
//! fractional bit count.
//!
//! **[`lut`]**: Sine and reciprocal tables generated at compile time, and
//! the degree-based lookups built on them.
//!
//! **[`affine`]**: [`AffineMatAttributes`](affine::AffineMatAttributes):
//! rotation, scale, shear and flip, with incrementally maintained register
//! values that match the hardware bit for bit.
//!
//! **[`pool`]**: Fixed-size slot tables with content deduplication and
//! counted [`Handle`](pool::Handle)s that free their slots on last drop.
//!
//! **[`resource`]**: The concrete classes: affine matrices, tile sets and
//! palettes.
//!
//! **[`context`]**: [`ResourceContext`](context::ResourceContext), the
//! explicit owner of one pool per class.
//!
//! **[`dirty`]**: Commit-tracking channels via `understory_dirty`.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! pool instrumentation, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Example
//!
//! ```
//! use tessel_core::affine::AffineMatAttributes;
//! use tessel_core::context::ResourceContext;
//! use tessel_core::fixed::Fixed;
//!
//! let context = ResourceContext::new();
//! let mut attributes = AffineMatAttributes::IDENTITY;
//! attributes.set_rotation_angle(Fixed::from_int(90));
//!
//! let sprite_mat = context.affine_mats().create(attributes);
//! let background_mat = context.affine_mats().create(attributes);
//! assert_eq!(sprite_mat, background_mat);
//! assert_eq!(context.affine_mats().live_entries(), 1);
//!
//! let registers = sprite_mat.register_values();
//! assert_eq!((registers.pa, registers.pb, registers.pc, registers.pd), (0, -256, 256, 0));
//! ```
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-handle
//!   usage-count events.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod affine;
pub mod context;
pub mod dirty;
pub mod fixed;
pub mod lut;
pub mod pool;
pub mod resource;
pub mod trace;
