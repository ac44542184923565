#![forbid(unsafe_code)]

//! In-memory host that records every call.
//!
//! Useful for tests and for embedding experiments: drive a
//! [`crate::FloatManager`] with [`RecordingRenderer`] and
//! [`RecordingListener`], then inspect what the engine asked for.

use std::time::Duration;

use floatdock_core::geometry::Point;

use crate::floater::FloaterId;
use crate::host::{FloatListener, Renderer};

/// One renderer call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderCommand {
    Position { id: FloaterId, position: Point },
    Scale { id: FloaterId, scale: f32 },
    Visibility { id: FloaterId, visible: bool },
    TrashAlpha(f32),
    TrashTranslationX(f32),
    TrashTranslationY(f32),
    ActionIconScale(f32),
    ActionIconPadding { horizontal: i32, vertical: i32 },
    Haptic(Duration),
    Removed(FloaterId),
}

/// [`Renderer`] that appends every call to a log.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    commands: Vec<RenderCommand>,
}

impl RecordingRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Last position sent for `id`.
    #[must_use]
    pub fn last_position(&self, id: FloaterId) -> Option<Point> {
        self.commands.iter().rev().find_map(|c| match *c {
            RenderCommand::Position { id: i, position } if i == id => Some(position),
            _ => None,
        })
    }

    /// Every position sent for `id`, oldest first.
    #[must_use]
    pub fn positions(&self, id: FloaterId) -> Vec<Point> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                RenderCommand::Position { id: i, position } if i == id => Some(position),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn last_scale(&self, id: FloaterId) -> Option<f32> {
        self.commands.iter().rev().find_map(|c| match *c {
            RenderCommand::Scale { id: i, scale } if i == id => Some(scale),
            _ => None,
        })
    }

    #[must_use]
    pub fn last_visibility(&self, id: FloaterId) -> Option<bool> {
        self.commands.iter().rev().find_map(|c| match *c {
            RenderCommand::Visibility { id: i, visible } if i == id => Some(visible),
            _ => None,
        })
    }

    #[must_use]
    pub fn last_trash_alpha(&self) -> Option<f32> {
        self.commands.iter().rev().find_map(|c| match *c {
            RenderCommand::TrashAlpha(a) => Some(a),
            _ => None,
        })
    }

    #[must_use]
    pub fn last_trash_translation_y(&self) -> Option<f32> {
        self.commands.iter().rev().find_map(|c| match *c {
            RenderCommand::TrashTranslationY(dy) => Some(dy),
            _ => None,
        })
    }

    #[must_use]
    pub fn last_action_icon_scale(&self) -> Option<f32> {
        self.commands.iter().rev().find_map(|c| match *c {
            RenderCommand::ActionIconScale(s) => Some(s),
            _ => None,
        })
    }

    #[must_use]
    pub fn haptic_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::Haptic(_)))
            .count()
    }

    /// Ids the engine removed, oldest first.
    #[must_use]
    pub fn removed(&self) -> Vec<FloaterId> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                RenderCommand::Removed(id) => Some(id),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn set_position(&mut self, id: FloaterId, position: Point) {
        self.commands.push(RenderCommand::Position { id, position });
    }

    fn set_scale(&mut self, id: FloaterId, scale: f32) {
        self.commands.push(RenderCommand::Scale { id, scale });
    }

    fn set_visibility(&mut self, id: FloaterId, visible: bool) {
        self.commands.push(RenderCommand::Visibility { id, visible });
    }

    fn trash_set_alpha(&mut self, alpha: f32) {
        self.commands.push(RenderCommand::TrashAlpha(alpha));
    }

    fn trash_set_icon_translation_x(&mut self, dx: f32) {
        self.commands.push(RenderCommand::TrashTranslationX(dx));
    }

    fn trash_set_icon_translation_y(&mut self, dy: f32) {
        self.commands.push(RenderCommand::TrashTranslationY(dy));
    }

    fn trash_set_action_icon_scale(&mut self, scale: f32) {
        self.commands.push(RenderCommand::ActionIconScale(scale));
    }

    fn trash_set_action_icon_padding(&mut self, horizontal: i32, vertical: i32) {
        self.commands.push(RenderCommand::ActionIconPadding {
            horizontal,
            vertical,
        });
    }

    fn haptic_pulse(&mut self, duration: Duration) {
        self.commands.push(RenderCommand::Haptic(duration));
    }

    fn remove(&mut self, id: FloaterId) {
        self.commands.push(RenderCommand::Removed(id));
    }
}

/// One listener callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerEvent {
    Click { id: FloaterId, child: usize },
    LongClick { id: FloaterId, child: usize },
    TouchFinished { id: FloaterId, finishing: bool, x: i32, y: i32 },
    FinishAll,
}

/// [`FloatListener`] that appends every callback to a log.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    events: Vec<ListenerEvent>,
}

impl RecordingListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> &[ListenerEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    #[must_use]
    pub fn clicks(&self) -> usize {
        self.count(|e| matches!(e, ListenerEvent::Click { .. }))
    }

    #[must_use]
    pub fn long_clicks(&self) -> usize {
        self.count(|e| matches!(e, ListenerEvent::LongClick { .. }))
    }

    #[must_use]
    pub fn finish_all_count(&self) -> usize {
        self.count(|e| matches!(e, ListenerEvent::FinishAll))
    }

    /// `(id, finishing, x, y)` of every touch-finished callback.
    #[must_use]
    pub fn touch_finished(&self) -> Vec<(FloaterId, bool, i32, i32)> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                ListenerEvent::TouchFinished {
                    id,
                    finishing,
                    x,
                    y,
                } => Some((id, finishing, x, y)),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&ListenerEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl FloatListener for RecordingListener {
    fn on_click(&mut self, id: FloaterId, child: usize) {
        self.events.push(ListenerEvent::Click { id, child });
    }

    fn on_long_click(&mut self, id: FloaterId, child: usize) {
        self.events.push(ListenerEvent::LongClick { id, child });
    }

    fn on_touch_finished(&mut self, id: FloaterId, finishing: bool, x: i32, y: i32) {
        self.events.push(ListenerEvent::TouchFinished {
            id,
            finishing,
            x,
            y,
        });
    }

    fn on_finish_all(&mut self) {
        self.events.push(ListenerEvent::FinishAll);
    }
}
