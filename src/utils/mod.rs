//! Utility Module
//!
//! - [`interner`]: String interning for shader language identities
//!
//! # String Interning
//!
//! Interned strings (Symbols) can be compared in O(1) time, which keeps
//! composition identities cheap to copy and compare.
//!
//! ```rust,ignore
//! use volume_compositor::utils::interner;
//!
//! let sym1 = interner::intern("GLSL");
//! let sym2 = interner::intern("GLSL");
//! assert_eq!(sym1, sym2); // O(1) comparison
//! ```

pub mod interner;

pub use interner::Symbol;
