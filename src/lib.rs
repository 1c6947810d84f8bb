//! FlipClock preference state & theme engine.
//!
//! Everything the settings panel reads and writes lives in
//! [`PreferenceEngine`]: the ~40 preference fields, the built-in theme
//! catalog, user-saved theme snapshots, reusable color presets, and the
//! durable round-trip through a [`store::SettingsStore`]. The rendering,
//! windowing, and hotkey layers consume this crate through the engine's
//! accessors and its change notifications.

pub mod engine;
pub mod model;
pub mod store;
pub mod themes;
pub mod update;

pub use engine::{Change, PreferenceEngine};
pub use model::{
    BackgroundStyle, ClockFont, CustomTheme, DateFormatOption, Id, KeyboardShortcut, Language,
    MultiMonitorMode, NamedColor, Rgba, StructuralPrefs, ThemeId, UpdateCheckFrequency,
    VisualPrefs,
};
pub use store::{FileStore, MemoryStore, SettingsStore};
