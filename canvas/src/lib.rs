//! Diagram editor core: document model, input engine, rendering and SVG export.
//!
//! The crate compiles to WebAssembly for the browser editor and to a native
//! library for the server and CLI, which use the document model and
//! [`svg::to_svg`] without touching the DOM. The editor translates raw DOM
//! input into canvas mutations, keeps an undo history, and returns
//! [`engine::Action`]s so the host can persist changes.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Canvas document: elements, shapes and styles |
//! | [`history`] | Bounded undo/redo snapshot stack |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`input`] | Tools, input event types and the gesture state machine |
//! | [`hit`] | Hit-testing and selection-box tests |
//! | [`geometry`] | Bounds, segment math and grid snapping |
//! | [`render`] | Canvas2D scene rendering |
//! | [`svg`] | SVG export and re-import |
//! | [`consts`] | Shared numeric constants (tolerances, zoom limits, sizes) |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod history;
pub mod hit;
pub mod input;
pub mod render;
pub mod svg;
