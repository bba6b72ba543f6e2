//! # Symbol Bundles and Address Resolution
//!
//! The engine treats debug information as a black box. Everything it needs to
//! know about a symbol bundle comes from two questions asked of a resolver:
//!
//! - **UUID extraction**: which UUID(s) does this debug binary carry?
//! - **Address resolution**: what symbols live at these runtime addresses when
//!   the binary is loaded at this base?
//!
//! ## Symbol Bundles
//!
//! A dSYM bundle is a directory with the debug binary at a fixed location:
//!
//! ```text
//! Foo.app.dSYM/
//! └── Contents/
//!     ├── Info.plist
//!     └── Resources/
//!         └── DWARF/
//!             └── Foo          <- embedded debug binary
//! ```
//!
//! Directories without `Contents/Resources/DWARF` are skipped. The embedded
//! binary's UUID must match the UUID the report printed for the image, or the
//! addresses would be resolved against the wrong build.
//!
//! ## Address Translation
//!
//! Reports carry runtime addresses. A resolver given the image's load address
//! slides them back into the binary's own address space:
//!
//! ```text
//! runtime address   0x000000010a1b2c3d
//! load address    - 0x10a1b0000
//! __TEXT vmaddr   + 0x100000000
//!                 = 0x100002c3d        -> looked up in DWARF / symbol table
//! ```
//!
//! ## Module Structure
//!
//! - **`tools`**: `SymbolTools` trait and the `atos`/`dwarfdump` child-process client
//! - **`native`**: in-process backend built on `object`, `gimli` and `addr2line`
//! - **`bundle`**: `ImageResolver`, which qualifies bundle directories and checks UUIDs
//!
//! ## Limitations
//!
//! - Resolver output is trusted to hold one line per address, in input order
//! - UUIDs are matched by containment in free-text extractor output

pub mod bundle;
pub mod native;
pub mod tools;

pub use bundle::{embedded_binary, ImageResolver, DWARF_SUBPATH};
pub use native::NativeTools;
pub use tools::{CommandLineTools, SymbolTools};
