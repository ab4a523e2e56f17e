//! Output generation for the digest.
//!
//! # Submodules
//!
//! - [`html`]: the tabbed static page, always written
//! - [`json`]: a machine-readable copy, written on request
//!
//! # Output Structure
//!
//! ```text
//! index.html     # overwritten every run, links style.css
//! digest.json    # only with --json-output
//! ```

pub mod html;
pub mod json;
