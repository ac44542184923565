#![forbid(unsafe_code)]

//! Headless engine for draggable floating icons with a drop-to-dismiss
//! trash target.
//!
//! # Role in floatdock
//! This crate composes the single-floater primitives of `floatdock-core`
//! into [`FloatManager`]: many floaters, one trash target, display modes
//! and the host-facing callbacks.
//!
//! # Host contract
//! - Forward pointer samples with [`FloatManager::on_pointer`], layout
//!   notifications with [`FloatManager::on_layout_changed`] and measured
//!   sizes with [`FloatManager::on_measure`].
//! - Call [`FloatManager::tick`] at [`FloatManager::next_deadline`].
//! - Implement [`Renderer`] to draw and [`FloatListener`] to receive
//!   clicks, long clicks and removals.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use floatdock::{
//!     DisplayProfile, EngineConfig, FloatManager, FloaterOptions, LayoutUpdate, RecordingListener,
//!     RecordingRenderer, Size,
//! };
//!
//! let mut manager = FloatManager::new(
//!     EngineConfig::default(),
//!     DisplayProfile::default(),
//!     &LayoutUpdate::portrait(1080, 1920),
//!     RecordingRenderer::new(),
//!     RecordingListener::new(),
//! );
//! let id = manager.add_floater(FloaterOptions::default().with_size(Size::new(120, 120)), now);
//! ```
//!
//! # Feature flags
//! - `tracing`: forward structured logging into the core primitives.
//! - `config`: serde derives and TOML/JSON loaders for [`EngineConfig`].

pub mod config;
pub mod error;
pub mod floater;
pub mod host;
pub mod manager;
pub mod recording;
pub mod trash;

pub use config::{DisplayMode, EngineConfig, FloaterOptions, FloaterSize, Shape, SpringConfig, TrashStyle};
pub use error::{ConfigError, EngineError, Result};
pub use floater::{FloaterId, FloaterPhase, FloaterState, NORMAL_SCALE, PRESSED_SCALE};
pub use host::{FloatListener, Renderer};
pub use manager::FloatManager;
pub use recording::{ListenerEvent, RecordingListener, RecordingRenderer, RenderCommand};
pub use trash::{TrashAnimation, TrashPhase, TrashSignal, TrashTarget};

pub use floatdock_core::{
    DisplayGeometry, DisplayProfile, GestureEvent, GesturePhase, Instant, LayoutUpdate, MoveDirection, Point,
    PointF, PointerAction, PointerEvent, Rect, Size,
};
