use std::collections::HashSet;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::camera::{Camera, Point};
use crate::consts::{
    ANGLE_ARC_RADIUS, DUPLICATE_OFFSET, GRID_SIZE, NUDGE_STEP, NUDGE_STEP_FAST, POINT_RADIUS, VERTEX_SNAP_RADIUS_PX,
    WHEEL_ZOOM_STEP,
};
use crate::doc::{CanvasData, CanvasElement, ElementId, Shape, Style};
use crate::geometry::{self, Bounds};
use crate::history::History;
use crate::hit::{self, Hit, HitPart};
use crate::input::{Button, InputState, Key, Modifiers, PolygonDraft, Tool, UiState, WheelDelta};
use crate::{render, svg};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Text given to a newly placed text element before the host edits it.
const DEFAULT_TEXT: &str = "Text";

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The scene changed and should be redrawn.
    RenderNeeded,
    ElementCreated(CanvasElement),
    /// Geometry or style of these elements changed.
    ElementsUpdated(Vec<ElementId>),
    ElementsDeleted(Vec<ElementId>),
    /// Open the host text editor for a text element.
    EditTextRequested { id: ElementId, text: String },
    SetCursor(String),
    /// A snapshot was pushed, undone or redone.
    HistoryChanged { can_undo: bool, can_redo: bool },
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub data: CanvasData,
    pub history: History,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub dpr: f64,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            data: CanvasData::default(),
            history: History::default(),
            camera: Camera::default(),
            ui: UiState::default(),
            input: InputState::default(),
            viewport_width: 0.0,
            viewport_height: 0.0,
            dpr: 1.0,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Replace the canvas with persisted data and restart history from it.
    pub fn load_canvas(&mut self, data: CanvasData) {
        self.history.reset(data.clone());
        self.data = data;
        self.ui.selected_ids.clear();
        self.ui.hover_vertex = None;
        self.reset_transient();
    }

    /// The live canvas data, as it would be saved.
    #[must_use]
    pub fn canvas(&self) -> &CanvasData {
        &self.data
    }

    /// Update viewport dimensions (CSS pixels) and device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.viewport_width = width_css;
        self.viewport_height = height_css;
        self.dpr = if dpr > 0.0 { dpr } else { 1.0 };
    }

    /// Serialize the live canvas to SVG at the viewport size.
    #[must_use]
    pub fn to_svg(&self) -> String {
        svg::to_svg(&self.data, self.viewport_width, self.viewport_height)
    }

    // --- Tool / style / text ---

    /// Set the active tool. Any uncommitted preview or polygon draft is dropped
    /// and a drag in progress is reverted.
    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.revert_gesture();
        self.ui.tool = tool;
        self.ui.polygon_draft = None;
        self.ui.angle_constraint = None;
        self.reset_transient();
        vec![Action::SetCursor(tool.cursor().to_owned()), Action::RenderNeeded]
    }

    /// Set the style for new elements; a non-empty selection is restyled as one snapshot.
    pub fn set_style(&mut self, style: Style) -> Vec<Action> {
        self.ui.style = style;
        let ids = self.selected_in_paint_order();
        if ids.is_empty() {
            return vec![];
        }
        for el in &mut self.data.elements {
            if !self.ui.selected_ids.contains(&el.id) {
                continue;
            }
            el.style = match el.shape {
                Shape::Polygon { closed: false, .. } => self.ui.style.unfilled(),
                _ => self.ui.style.clone(),
            };
        }
        vec![Action::ElementsUpdated(ids), self.commit("restyle"), Action::RenderNeeded]
    }

    /// Commit text from the host editor. Empty text removes the element.
    pub fn set_text(&mut self, id: &ElementId, new_text: &str) -> Vec<Action> {
        if new_text.trim().is_empty() {
            if !self.data.get(id).is_some_and(|el| matches!(el.shape, Shape::Text { .. })) {
                return vec![];
            }
            let removed = self.data.remove_ids(&HashSet::from([*id]));
            self.ui.selected_ids.remove(id);
            return vec![Action::ElementsDeleted(removed), self.commit("text removed"), Action::RenderNeeded];
        }
        let Some(el) = self.data.get_mut(id) else {
            return vec![];
        };
        let Shape::Text { text, .. } = &mut el.shape else {
            return vec![];
        };
        if text == new_text {
            return vec![];
        }
        new_text.clone_into(text);
        vec![Action::ElementsUpdated(vec![*id]), self.commit("text edit"), Action::RenderNeeded]
    }

    /// Fix the turn (degrees, relative to the previous edge) of the next polygon edge.
    pub fn set_angle_constraint(&mut self, degrees: Option<f64>) -> Vec<Action> {
        self.ui.angle_constraint = degrees.filter(|d| d.is_finite());
        vec![Action::RenderNeeded]
    }

    // --- Queries ---

    /// Selected element ids in paint order.
    #[must_use]
    pub fn selection(&self) -> Vec<ElementId> {
        self.selected_in_paint_order()
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Look up an element by ID.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&CanvasElement> {
        self.data.get(id)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        // One gesture at a time.
        if !matches!(self.input, InputState::Idle) {
            return vec![];
        }
        let world = self.camera.screen_to_world(screen_pt);

        if button == Button::Middle || (button == Button::Primary && self.ui.tool == Tool::Pan) {
            self.input = InputState::Panning { last_screen: screen_pt };
            return vec![Action::SetCursor("grabbing".to_owned())];
        }
        if button != Button::Primary {
            return vec![];
        }

        // Grabbing an existing vertex takes priority over the active tool,
        // except while a polygon is being built.
        if self.ui.polygon_draft.is_none() {
            if let Some(Hit { element_id, part: HitPart::Vertex(index) }) =
                hit::vertex_hit(world, &self.data, &self.camera)
            {
                let original = self
                    .data
                    .get(&element_id)
                    .and_then(|el| el.shape.vertices().get(index).copied())
                    .unwrap_or(world);
                self.ui.select_only(element_id);
                self.input = InputState::DraggingVertex { id: element_id, index, original, moved: false };
                return vec![Action::SetCursor("move".to_owned()), Action::RenderNeeded];
            }
        }

        match self.ui.tool {
            Tool::Select => self.select_down(world, modifiers),
            Tool::Polygon => self.polygon_down(world),
            Tool::Line | Tool::Arrow | Tool::Rectangle | Tool::Circle => {
                self.ui.temp_element = None;
                self.input = InputState::Drawing { anchor_world: self.snapped(world) };
                vec![]
            }
            Tool::Text => self.place_text(world),
            Tool::Point => self.place_point(world),
            Tool::Pan => vec![],
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let world = self.camera.screen_to_world(screen_pt);
        if matches!(self.input, InputState::Idle) {
            return self.hover(world);
        }
        let snapped = self.snapped(world);

        match &mut self.input {
            InputState::Idle => vec![],
            InputState::Panning { last_screen } => {
                self.camera.pan_by(screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                *last_screen = screen_pt;
                vec![Action::RenderNeeded]
            }
            InputState::SelectingBox { start_world, .. } => {
                self.ui.marquee = Some(Bounds::from_corners(*start_world, world));
                vec![Action::RenderNeeded]
            }
            InputState::DraggingGroup { start_world, originals, moved } => {
                let dx = world.x - start_world.x;
                let dy = world.y - start_world.y;
                for original in originals.iter() {
                    self.data.replace(original.translated(dx, dy));
                }
                *moved = dx != 0.0 || dy != 0.0;
                vec![Action::RenderNeeded]
            }
            InputState::Drawing { anchor_world } => {
                let anchor = *anchor_world;
                self.ui.temp_element = drawn_shape(self.ui.tool, anchor, snapped)
                    .map(|shape| CanvasElement::new(shape, self.ui.style.clone(), self.data.next_z_index()));
                vec![Action::RenderNeeded]
            }
            InputState::DraggingVertex { id, index, moved, .. } => {
                let Some(vertex) = self
                    .data
                    .get_mut(id)
                    .and_then(|el| el.shape.vertices_mut())
                    .and_then(|points| points.get_mut(*index))
                else {
                    return vec![];
                };
                *vertex = snapped;
                *moved = true;
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        // Only the button that started the gesture ends it.
        let ends_gesture = match self.input {
            InputState::Panning { .. } => button != Button::Secondary,
            _ => button == Button::Primary,
        };
        if !ends_gesture {
            return vec![];
        }
        let world = self.camera.screen_to_world(screen_pt);

        match std::mem::take(&mut self.input) {
            InputState::Idle => vec![],
            InputState::Panning { .. } => vec![Action::SetCursor(self.ui.tool.cursor().to_owned())],
            InputState::SelectingBox { start_world, additive } => {
                let selection = Bounds::from_corners(start_world, world);
                if !additive {
                    self.ui.selected_ids.clear();
                }
                self.ui.selected_ids.extend(
                    self.data
                        .elements
                        .iter()
                        .filter(|el| hit::is_element_in_selection_box(el, &selection))
                        .map(|el| el.id),
                );
                self.ui.marquee = None;
                vec![Action::RenderNeeded]
            }
            InputState::DraggingGroup { originals, moved, .. } => {
                if !moved {
                    return vec![];
                }
                let ids = originals.iter().map(|el| el.id).collect();
                vec![Action::ElementsUpdated(ids), self.commit("group drag"), Action::RenderNeeded]
            }
            InputState::Drawing { anchor_world } => {
                let Some(temp) = self.ui.temp_element.take() else {
                    return vec![Action::RenderNeeded];
                };
                let end = self.snapped(world);
                let shape = drawn_shape(self.ui.tool, anchor_world, end).unwrap_or(temp.shape);
                let el = CanvasElement { shape, ..temp };
                self.insert(el)
            }
            InputState::DraggingVertex { id, moved, .. } => {
                let cursor = Action::SetCursor(self.ui.tool.cursor().to_owned());
                if !moved {
                    return vec![cursor, Action::RenderNeeded];
                }
                vec![Action::ElementsUpdated(vec![id]), self.commit("vertex drag"), cursor, Action::RenderNeeded]
            }
        }
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.shift {
            self.camera.pan_by(-delta.dx, -delta.dy);
            return vec![Action::RenderNeeded];
        }
        let factor = if delta.dy < 0.0 {
            WHEEL_ZOOM_STEP
        } else if delta.dy > 0.0 {
            1.0 / WHEEL_ZOOM_STEP
        } else {
            return vec![];
        };
        self.camera.zoom_about(screen_pt, factor);
        vec![Action::RenderNeeded]
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        if modifiers.command() {
            return if (key.is("z") && modifiers.shift) || key.is("y") {
                self.redo()
            } else if key.is("z") {
                self.undo()
            } else if key.is("d") {
                self.duplicate_selected()
            } else if key.is("a") {
                self.select_all()
            } else {
                vec![]
            };
        }
        if !matches!(self.input, InputState::Idle) {
            return if key.is("escape") { self.cancel() } else { vec![] };
        }
        match key.0.as_str() {
            "Delete" | "Backspace" => self.delete_selected(),
            "Escape" => self.cancel(),
            "Enter" if self.ui.polygon_draft.is_some() => self.finish_polygon(),
            _ => match key.nudge_direction() {
                Some((ux, uy)) => {
                    let step = if modifiers.shift { NUDGE_STEP_FAST } else { NUDGE_STEP };
                    self.nudge_selected(ux * step, uy * step)
                }
                None => vec![],
            },
        }
    }

    // --- Commands ---

    pub fn undo(&mut self) -> Vec<Action> {
        let Some(snapshot) = self.history.undo().cloned() else {
            return vec![];
        };
        self.restore(snapshot)
    }

    pub fn redo(&mut self) -> Vec<Action> {
        let Some(snapshot) = self.history.redo().cloned() else {
            return vec![];
        };
        self.restore(snapshot)
    }

    /// Remove every selected element as one snapshot.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        if self.ui.selected_ids.is_empty() {
            return vec![];
        }
        let removed = self.data.remove_ids(&self.ui.selected_ids);
        self.ui.selected_ids.clear();
        self.ui.hover_vertex = None;
        if removed.is_empty() {
            return vec![Action::RenderNeeded];
        }
        vec![Action::ElementsDeleted(removed), self.commit("delete"), Action::RenderNeeded]
    }

    /// Copy the selection with fresh ids, offset by [`DUPLICATE_OFFSET`], and select the copies.
    pub fn duplicate_selected(&mut self) -> Vec<Action> {
        let copies = self
            .data
            .elements
            .iter()
            .filter(|el| self.ui.selected_ids.contains(&el.id))
            .map(|el| el.translated(DUPLICATE_OFFSET, DUPLICATE_OFFSET))
            .collect::<Vec<_>>();
        if copies.is_empty() {
            return vec![];
        }

        self.ui.selected_ids.clear();
        let mut actions = Vec::with_capacity(copies.len() + 2);
        for copy in copies {
            let el = CanvasElement::new(copy.shape, copy.style, self.data.next_z_index());
            self.ui.selected_ids.insert(el.id);
            self.data.push(el.clone());
            actions.push(Action::ElementCreated(el));
        }
        actions.push(self.commit("duplicate"));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Translate every selected element, secondary geometry included, as one snapshot.
    pub fn nudge_selected(&mut self, dx: f64, dy: f64) -> Vec<Action> {
        let ids = self.selected_in_paint_order();
        if ids.is_empty() {
            return vec![];
        }
        for el in &mut self.data.elements {
            if self.ui.selected_ids.contains(&el.id) {
                el.translate(dx, dy);
            }
        }
        vec![Action::ElementsUpdated(ids), self.commit("nudge"), Action::RenderNeeded]
    }

    pub fn select_all(&mut self) -> Vec<Action> {
        self.ui.selected_ids = self.data.elements.iter().map(|el| el.id).collect();
        vec![Action::RenderNeeded]
    }

    /// Finish the polygon draft as an open polyline, or discard it with fewer than two points.
    pub fn finish_polygon(&mut self) -> Vec<Action> {
        self.ui.angle_constraint = None;
        let enough = self.ui.polygon_draft.as_ref().is_some_and(|d| d.points.len() >= 2);
        if enough {
            return self.commit_polygon(false);
        }
        if self.ui.polygon_draft.take().is_some() {
            return vec![Action::RenderNeeded];
        }
        vec![]
    }

    /// Abandon whatever is in progress.
    ///
    /// A polygon draft is finished or discarded; an active drag is reverted;
    /// otherwise the selection is cleared.
    pub fn cancel(&mut self) -> Vec<Action> {
        if self.ui.polygon_draft.is_some() {
            return self.finish_polygon();
        }
        if !self.revert_gesture() {
            self.ui.selected_ids.clear();
        }
        self.reset_transient();
        vec![Action::SetCursor(self.ui.tool.cursor().to_owned()), Action::RenderNeeded]
    }

    // --- Internals ---

    fn select_down(&mut self, world: Point, modifiers: Modifiers) -> Vec<Action> {
        let Some(hit) = hit::hit_test(world, &self.data, &self.camera) else {
            if !modifiers.shift {
                self.ui.selected_ids.clear();
            }
            self.ui.marquee = Some(Bounds::from_corners(world, world));
            self.input = InputState::SelectingBox { start_world: world, additive: modifiers.shift };
            return vec![Action::RenderNeeded];
        };

        let id = hit.element_id;
        if modifiers.shift {
            self.ui.toggle_selected(id);
            if !self.ui.is_selected(&id) {
                return vec![Action::RenderNeeded];
            }
        } else if !self.ui.is_selected(&id) {
            self.ui.select_only(id);
        }

        let originals = self
            .data
            .elements
            .iter()
            .filter(|el| self.ui.selected_ids.contains(&el.id))
            .cloned()
            .collect();
        self.input = InputState::DraggingGroup { start_world: world, originals, moved: false };
        vec![Action::RenderNeeded]
    }

    fn polygon_down(&mut self, world: Point) -> Vec<Action> {
        let world = self.snapped(world);
        let radius = self.camera.screen_dist_to_world(VERTEX_SNAP_RADIUS_PX);
        let draft = self.ui.polygon_draft.get_or_insert_with(PolygonDraft::default);

        if let (Some(degrees), Some((prev, last))) = (self.ui.angle_constraint, draft.last_segment()) {
            let placed = constrained_point(prev, last, degrees, world);
            draft.points.push(placed);
            draft.cursor = Some(placed);
            self.ui.angle_constraint = None;
            let angle = Shape::Angle { points: vec![prev, last], angle_value: degrees, arc_radius: ANGLE_ARC_RADIUS };
            let el = CanvasElement::new(angle, self.ui.style.unfilled(), self.data.next_z_index());
            self.data.push(el.clone());
            tracing::debug!(degrees, "angle annotation placed");
            return vec![Action::ElementCreated(el), self.commit("angle annotation"), Action::RenderNeeded];
        }

        if draft.points.first().is_some_and(|first| first.distance(world) <= radius) {
            if draft.points.len() >= 3 {
                return self.commit_polygon(true);
            }
            return vec![];
        }
        if let Some(index) = draft.vertex_near(world, radius) {
            if let Some(repeat) = draft.points.get(index).copied() {
                draft.points.push(repeat);
            }
            return self.commit_polygon(false);
        }

        draft.points.push(world);
        draft.cursor = Some(world);
        vec![Action::RenderNeeded]
    }

    fn commit_polygon(&mut self, closed: bool) -> Vec<Action> {
        let Some(draft) = self.ui.polygon_draft.take() else {
            return vec![];
        };
        self.ui.angle_constraint = None;
        let style = if closed { self.ui.style.clone() } else { self.ui.style.unfilled() };
        let shape = Shape::Polygon { points: draft.points, closed };
        let el = CanvasElement::new(shape, style, self.data.next_z_index());
        self.insert(el)
    }

    fn place_text(&mut self, world: Point) -> Vec<Action> {
        let at = self.snapped(world);
        let shape = Shape::Text {
            x: at.x,
            y: at.y,
            text: DEFAULT_TEXT.to_owned(),
            font_size: self.ui.font_size,
            font_weight: self.ui.font_weight,
            text_align: self.ui.text_align,
        };
        let el = CanvasElement::new(shape, self.ui.style.clone(), self.data.next_z_index());
        let id = el.id;
        let mut actions = self.insert(el);
        actions.push(Action::EditTextRequested { id, text: DEFAULT_TEXT.to_owned() });
        actions
    }

    fn place_point(&mut self, world: Point) -> Vec<Action> {
        let at = self.snapped(world);
        let shape = Shape::Point { x: at.x, y: at.y, radius: POINT_RADIUS };
        let el = CanvasElement::new(shape, self.ui.style.clone(), self.data.next_z_index());
        self.insert(el)
    }

    /// Append a new element, select it, and push a snapshot.
    fn insert(&mut self, el: CanvasElement) -> Vec<Action> {
        self.ui.select_only(el.id);
        self.data.push(el.clone());
        let kind = el.kind().as_str();
        vec![Action::ElementCreated(el), self.commit(kind), Action::RenderNeeded]
    }

    fn hover(&mut self, world: Point) -> Vec<Action> {
        if let Some(draft) = self.ui.polygon_draft.as_mut() {
            let cursor = match (self.ui.angle_constraint, draft.last_segment()) {
                (Some(degrees), Some((prev, last))) => constrained_point(prev, last, degrees, world),
                _ if self.data.snaps_to_grid() => geometry::snap_point(world, GRID_SIZE),
                _ => world,
            };
            draft.cursor = Some(cursor);
            return vec![Action::RenderNeeded];
        }

        let hovered = match hit::vertex_hit(world, &self.data, &self.camera) {
            Some(Hit { element_id, part: HitPart::Vertex(index) }) => Some((element_id, index)),
            _ => None,
        };
        if hovered == self.ui.hover_vertex {
            return vec![];
        }
        self.ui.hover_vertex = hovered;
        let cursor = if hovered.is_some() { "pointer" } else { self.ui.tool.cursor() };
        vec![Action::SetCursor(cursor.to_owned()), Action::RenderNeeded]
    }

    fn restore(&mut self, snapshot: CanvasData) -> Vec<Action> {
        self.data = snapshot;
        let data = &self.data;
        self.ui.selected_ids.retain(|id| data.contains(id));
        self.ui.hover_vertex = None;
        self.reset_transient();
        vec![self.history_action(), Action::RenderNeeded]
    }

    fn commit(&mut self, what: &str) -> Action {
        self.history.push(self.data.clone());
        tracing::debug!(what, elements = self.data.len(), "canvas snapshot");
        self.history_action()
    }

    fn history_action(&self) -> Action {
        Action::HistoryChanged { can_undo: self.history.can_undo(), can_redo: self.history.can_redo() }
    }

    /// Put back any geometry moved by an unfinished drag. Returns false when no
    /// gesture was active.
    fn revert_gesture(&mut self) -> bool {
        match std::mem::take(&mut self.input) {
            InputState::Idle => return false,
            InputState::DraggingGroup { originals, .. } => {
                for original in originals {
                    self.data.replace(original);
                }
            }
            InputState::DraggingVertex { id, index, original, .. } => {
                if let Some(v) = self
                    .data
                    .get_mut(&id)
                    .and_then(|el| el.shape.vertices_mut())
                    .and_then(|points| points.get_mut(index))
                {
                    *v = original;
                }
            }
            InputState::Panning { .. } | InputState::SelectingBox { .. } | InputState::Drawing { .. } => {}
        }
        true
    }

    fn reset_transient(&mut self) {
        self.input = InputState::Idle;
        self.ui.temp_element = None;
        self.ui.marquee = None;
    }

    fn snapped(&self, world: Point) -> Point {
        if self.data.snaps_to_grid() {
            geometry::snap_point(world, GRID_SIZE)
        } else {
            world
        }
    }

    fn selected_in_paint_order(&self) -> Vec<ElementId> {
        self.data
            .elements
            .iter()
            .filter(|el| self.ui.selected_ids.contains(&el.id))
            .map(|el| el.id)
            .collect()
    }
}

/// Shape produced by dragging `tool` from `anchor` to `end`.
fn drawn_shape(tool: Tool, anchor: Point, end: Point) -> Option<Shape> {
    match tool {
        Tool::Line => Some(Shape::Line { x: anchor.x, y: anchor.y, x2: end.x, y2: end.y }),
        Tool::Arrow => Some(Shape::Arrow { x: anchor.x, y: anchor.y, x2: end.x, y2: end.y }),
        Tool::Rectangle => {
            let b = Bounds::from_corners(anchor, end);
            Some(Shape::Rectangle { x: b.min_x, y: b.min_y, width: b.width(), height: b.height() })
        }
        Tool::Circle => Some(Shape::Circle { x: anchor.x, y: anchor.y, radius: anchor.distance(end) }),
        _ => None,
    }
}

/// Where the next polygon vertex lands when the edge must turn `degrees`
/// from the heading `prev`→`last`, at the pointer's distance from `last`.
fn constrained_point(prev: Point, last: Point, degrees: f64, pointer: Point) -> Point {
    let heading = geometry::heading(prev, last) + degrees.to_radians();
    geometry::polar(last, heading, last.distance(pointer))
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas, core: EngineCore::new() }
    }

    // --- Delegated data inputs ---

    pub fn load_canvas(&mut self, data: CanvasData) {
        self.core.load_canvas(data);
    }

    pub fn set_tool(&mut self, tool: Tool) -> Vec<Action> {
        self.core.set_tool(tool)
    }

    pub fn set_style(&mut self, style: Style) -> Vec<Action> {
        self.core.set_style(style)
    }

    pub fn set_text(&mut self, id: &ElementId, text: &str) -> Vec<Action> {
        self.core.set_text(id, text)
    }

    pub fn set_angle_constraint(&mut self, degrees: Option<f64>) -> Vec<Action> {
        self.core.set_angle_constraint(degrees)
    }

    // --- Viewport ---

    /// Update viewport dimensions and resize the backing store to match the device pixel ratio.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.core.set_viewport(width_css, height_css, dpr);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (w, h) = (
            (width_css * self.core.dpr).round().max(0.0) as u32,
            (height_css * self.core.dpr).round().max(0.0) as u32,
        );
        self.canvas.set_width(w);
        self.canvas.set_height(h);
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button, modifiers)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta, modifiers)
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    // --- Commands ---

    pub fn undo(&mut self) -> Vec<Action> {
        self.core.undo()
    }

    pub fn redo(&mut self) -> Vec<Action> {
        self.core.redo()
    }

    pub fn delete_selected(&mut self) -> Vec<Action> {
        self.core.delete_selected()
    }

    pub fn duplicate_selected(&mut self) -> Vec<Action> {
        self.core.duplicate_selected()
    }

    pub fn finish_polygon(&mut self) -> Vec<Action> {
        self.core.finish_polygon()
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or any `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let ctx = self
            .canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        render::draw(
            &ctx,
            &self.core.data,
            &self.core.ui,
            &self.core.camera,
            self.core.viewport_width,
            self.core.viewport_height,
            self.core.dpr,
        )
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn canvas_data(&self) -> &CanvasData {
        self.core.canvas()
    }

    #[must_use]
    pub fn to_svg(&self) -> String {
        self.core.to_svg()
    }

    #[must_use]
    pub fn selection(&self) -> Vec<ElementId> {
        self.core.selection()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.core.camera()
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&CanvasElement> {
        self.core.element(id)
    }
}
