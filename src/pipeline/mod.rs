//! Pipeline stages that touch the outside world.
//!
//! Each submodule owns one external collaborator and exposes it as a trait,
//! so the review workflow never depends on a concrete platform.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ extract ──▶ clipboard        (page image → user)
//!  (dir)    (pdfium)   (temp PNG)  (osascript, xclip, …)
//!              └────▶ preview                       (page image → viewer)
//! ```
//!
//! 1. [`input`]      find the single PDF in the input directory
//! 2. [`render`]     rasterise one page via pdfium
//! 3. [`extract`]    render, stage as a temporary PNG, hand to the clipboard
//! 4. [`clipboard`]  image and text clipboard backends per platform
//! 5. [`preview`]    open a page in the OS image viewer

pub mod clipboard;
pub mod extract;
pub mod input;
pub mod preview;
pub mod render;
