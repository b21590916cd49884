#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Allocation failure reporting.
///
/// This module provides [`AllocError`], the single error kind returned by
/// the fallible constructors and inserts.
pub mod error;

/// An open-addressing hash set for 32-bit integers.
///
/// This module provides [`IntSet`] along with its iterator types and,
/// behind the `stats` feature, table-inspection helpers.
pub mod int_set;

mod mix;

pub use error::AllocError;
pub use int_set::IntSet;
