//! JavaScript bindings for the browser host page.
//!
//! The page owns the DOM listeners and the `fetch` calls to the scene
//! provider and trajectory store; everything else goes through
//! [`CanvasHost`]. Data crosses the boundary as JSON strings, and effects are
//! handled here: renders and cursor changes are applied directly, and each
//! handler tells the page whether the selection or step changed.

#[cfg(test)]
#[path = "host_test.rs"]
mod host_test;

use std::fmt::Display;

use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::engine::{Effect, Engine, LoadOutcome, LoadTicket, SaveRequest, SceneBundle};
use crate::error::{CollaboratorError, PreconditionViolation};
use crate::geometry::Point;
use crate::interaction::ActionType;

/// What a batch of effects asks of the host.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EffectSummary<'a> {
    pub render: bool,
    pub cursor: Option<&'a str>,
    pub changed: bool,
}

#[must_use]
pub fn summarize(effects: &[Effect]) -> EffectSummary<'_> {
    let mut summary = EffectSummary::default();
    for effect in effects {
        match effect {
            Effect::RenderNeeded => summary.render = true,
            Effect::SetCursor(cursor) => summary.cursor = Some(cursor.as_str()),
            Effect::SelectionChanged | Effect::StepCommitted(_) | Effect::StepCancelled => summary.changed = true,
        }
    }
    summary
}

/// Parse a wire action name such as `PUT_IN`.
///
/// # Errors
///
/// Returns the serde error for unknown names.
pub fn parse_action(name: &str) -> Result<ActionType, serde_json::Error> {
    serde_json::from_value(serde_json::Value::String(name.to_owned()))
}

/// Parse a scene provider response body.
///
/// # Errors
///
/// Returns [`CollaboratorError::Malformed`] when the body is not a scene bundle.
pub fn parse_bundle(body: &str) -> Result<SceneBundle, CollaboratorError> {
    serde_json::from_str(body).map_err(|e| CollaboratorError::Malformed(e.to_string()))
}

/// Map the trajectory store's HTTP answer to a save result.
///
/// # Errors
///
/// Returns [`CollaboratorError::Status`] for any non-2xx status.
pub fn save_result(status: u16, message: &str) -> Result<(), CollaboratorError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(CollaboratorError::Status { status, message: message.to_owned() })
    }
}

fn js_err(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// A scene load in flight; hand it back to [`CanvasHost::complete_load`].
#[wasm_bindgen]
pub struct LoadHandle {
    ticket: LoadTicket,
}

#[wasm_bindgen]
impl LoadHandle {
    #[wasm_bindgen(getter)]
    pub fn scene_id(&self) -> String {
        self.ticket.scene_id().to_owned()
    }
}

#[wasm_bindgen]
pub struct CanvasHost {
    engine: Engine,
    pending_save: Option<SaveRequest>,
}

#[wasm_bindgen]
impl CanvasHost {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { engine: Engine::new(canvas), pending_save: None }
    }

    /// # Errors
    ///
    /// Returns `Err` if the redraw fails.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Result<(), JsValue> {
        let effects = self.engine.set_viewport(width_css, height_css, dpr);
        self.dispatch(&effects).map(|_| ())
    }

    // --- Scene provider ---

    pub fn begin_load(&mut self, scene_id: &str) -> LoadHandle {
        LoadHandle { ticket: self.engine.begin_load(scene_id) }
    }

    /// Deliver a provider body. Returns `false` when a newer load superseded it.
    ///
    /// # Errors
    ///
    /// Returns `Err` for malformed bodies or a failed redraw.
    pub fn complete_load(&mut self, handle: &LoadHandle, body: &str) -> Result<bool, JsValue> {
        let outcome = self.engine.complete_load(&handle.ticket, parse_bundle(body)).map_err(js_err)?;
        if outcome == LoadOutcome::Superseded {
            return Ok(false);
        }
        self.pending_save = None;
        self.engine.render()?;
        Ok(true)
    }

    /// Report a failed provider request.
    ///
    /// # Errors
    ///
    /// Returns the collaborator error unless the load was already superseded.
    pub fn fail_load(&mut self, handle: &LoadHandle, status: u16, message: &str) -> Result<(), JsValue> {
        let err = CollaboratorError::Status { status, message: message.to_owned() };
        self.engine.complete_load(&handle.ticket, Err(err)).map(|_| ()).map_err(js_err)
    }

    /// Reference image handle of the loaded scene.
    pub fn image(&self) -> Option<String> {
        self.engine.core.scene().map(|scene| scene.image().to_owned())
    }

    /// Mapped lid of `container` in the loaded scene.
    pub fn lid_for(&self, container: &str) -> Option<String> {
        self.engine.core.lid_map().lid_for(container).cloned()
    }

    // --- Interaction ---

    /// # Errors
    ///
    /// Returns `Err` for an unknown action name.
    pub fn choose_action(&mut self, name: &str) -> Result<bool, JsValue> {
        let kind = parse_action(name).map_err(js_err)?;
        let effects = self.engine.choose_action(kind);
        self.dispatch(&effects)
    }

    /// # Errors
    ///
    /// Returns `Err` if the redraw or cursor update fails.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        let effects = self.engine.on_pointer_down(Point::new(x, y));
        self.dispatch(&effects)
    }

    /// # Errors
    ///
    /// Returns `Err` if the redraw fails.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        let effects = self.engine.on_pointer_move(Point::new(x, y));
        self.dispatch(&effects)
    }

    /// # Errors
    ///
    /// Returns the precondition violation when the release counted as a
    /// rejected click.
    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        let effects = self.engine.on_pointer_up(Point::new(x, y)).map_err(js_err)?;
        self.dispatch(&effects)
    }

    /// # Errors
    ///
    /// Returns `Err` when there is no step action to commit.
    pub fn finish(&mut self) -> Result<bool, JsValue> {
        let effects = self.engine.finish().map_err(js_err)?;
        self.dispatch(&effects)
    }

    /// # Errors
    ///
    /// Returns `Err` if the redraw fails.
    pub fn cancel(&mut self) -> Result<bool, JsValue> {
        let effects = self.engine.cancel();
        self.dispatch(&effects)
    }

    pub fn target(&self) -> Option<String> {
        self.engine.core.target().cloned()
    }

    pub fn reference(&self) -> Option<String> {
        self.engine.core.reference().cloned()
    }

    // --- Trajectory store ---

    /// Start a save. Returns the JSON body to post; the scene id is in
    /// [`CanvasHost::save_scene_id`].
    ///
    /// # Errors
    ///
    /// Returns `Err` when there is nothing to save.
    pub fn begin_save(&mut self) -> Result<String, JsValue> {
        let request = self.engine.save_request().map_err(js_err)?;
        let body = serde_json::to_string(&request.payload).map_err(js_err)?;
        self.pending_save = Some(request);
        Ok(body)
    }

    pub fn save_scene_id(&self) -> Option<String> {
        self.pending_save.as_ref().map(|request| request.scene_id.clone())
    }

    /// Deliver the store's HTTP status for the pending save.
    ///
    /// # Errors
    ///
    /// Returns `Err` for a non-2xx status or when no save is pending.
    pub fn complete_save(&mut self, status: u16, message: &str) -> Result<(), JsValue> {
        let request = self.pending_save.take().ok_or_else(|| js_err(PreconditionViolation::NothingToSave))?;
        self.engine.core.complete_save(&request, save_result(status, message)).map_err(js_err)
    }

    /// # Errors
    ///
    /// Returns `Err` if encoding fails.
    pub fn trajectory_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.engine.core.trajectory().actions()).map_err(js_err)
    }

    /// # Errors
    ///
    /// Returns `Err` if encoding fails.
    pub fn relations_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.engine.core.relations()).map_err(js_err)
    }
}

impl CanvasHost {
    fn dispatch(&self, effects: &[Effect]) -> Result<bool, JsValue> {
        let summary = summarize(effects);
        if let Some(cursor) = summary.cursor {
            self.engine.set_cursor(cursor)?;
        }
        if summary.render {
            self.engine.render()?;
        }
        Ok(summary.changed)
    }
}
