//! Scene interaction engine for the tabletop trajectory annotator.
//!
//! This crate is compiled to WebAssembly and runs in the browser; the core is
//! plain Rust and is also used natively by the CLI for headless replay. It
//! owns the loaded scene, maps it between world coordinates and canvas
//! pixels, drives the selection/manipulation state machine for every action
//! type, keeps the on/in/closed relations consistent with each move, and
//! records committed steps in a trajectory. The page is responsible only for
//! wiring DOM events to [`host::CanvasHost`] and for talking to the scene
//! provider and the trajectory store.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`scene`] | Scene objects, categories and the lid map |
//! | [`geometry`] | Oriented footprints and facing angles |
//! | [`transform`] | World rectangle and world/pixel mapping |
//! | [`interaction`] | Action types, selection states and the in-flight step |
//! | [`placement`] | Pose rules for each action type |
//! | [`relations`] | On/in/closed bookkeeping |
//! | [`trajectory`] | Committed action log and save payload |
//! | [`hit`] | Hit-testing against footprints |
//! | [`host`] | `wasm-bindgen` surface for the browser page |
//! | [`render`] | Canvas drawing |
//! | [`error`] | Error taxonomy |
//! | [`consts`] | Shared numeric constants (world bounds, padding, etc.) |

pub mod consts;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod hit;
pub mod host;
pub mod interaction;
pub mod placement;
pub mod relations;
pub mod render;
pub mod scene;
pub mod trajectory;
pub mod transform;
