//! # barust
//!
//! A Rust library for generating linear barcodes as PNG, SVG and HTML files.
//!
//! `barust` takes arbitrary text, works out which symbology suits it best, normalizes the
//! payload (zero-padding or truncating numeric codes to the digit count the symbology expects)
//! and writes the result to a configurable folder. Bar patterns and check digits come from the
//! [`barcoders`] crate; raster output goes through [`image`].
//!
//! ## Features
//!
//! - Auto-detect Code 128, Code 39, EAN-13, EAN-8 or UPC-A from the input string.
//! - Pad or cut numeric payloads to 12, 7 or 11 digits.
//! - Render to PNG files, SVG files, in-memory image buffers or a console preview.
//! - "Clean" output: a PNG, a base64 `<img>` tag and an HTML viewer page in one call.
//! - Customize module width, bar height, quiet zone and colours.
//! - An interactive console (`barust` binary) to try everything by hand.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! barust = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Generate an auto-detected PNG in the default folder:
//!
//! ```no_run
//! use barust::generator::Generator;
//!
//! let generator = Generator::default();
//! let path = generator.quick_barcode("5901234123457", None).unwrap();
//! println!("written to {}", path.display());
//! ```
//!
//! Generate a clean PNG + HTML pair in a chosen folder:
//!
//! ```no_run
//! use barust::generator::Generator;
//! use std::path::Path;
//!
//! let generator = Generator::default();
//! let clean = generator
//!     .generate_clean_barcode("PRODUCT-ABC", Some(Path::new("output")))
//!     .unwrap();
//! println!("open {}", clean.html.display());
//! ```
//!
//! Render in memory without touching the disk:
//!
//! ```rust
//! use barust::render::{to_image_buffer, RenderOptions};
//! use barust::symbology::{prepare, CodeType};
//!
//! let bars = prepare("Hello World 2025", CodeType::Auto).unwrap();
//! let img = to_image_buffer(&bars, &RenderOptions::default()).unwrap();
//! assert!(img.width() > 0);
//! ```
//!
//! ## Modules
//!
//! - [`symbology`]: Detection, normalization and encoding.
//! - [`render`]: PNG, SVG, ASCII and HTML output.
//! - [`generator`]: File-writing convenience API with a default folder.
//! - [`console`]: Interactive menu harness.
//! - [`config`]: Environment-based configuration.
//! - [`error`]: The crate error type.

pub mod config;
pub mod console;
pub mod error;
pub mod generator;
pub mod render;
pub mod symbology;

pub use error::{BarcodeError, Result};
pub use generator::{BarcodeRequest, CleanBarcode, Generator};
pub use render::{OutputFormat, RenderOptions};
pub use symbology::{CodeType, Symbology};
