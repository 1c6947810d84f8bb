use serde::Serialize;
use serde_json::{json, Value};

use crate::model::{
    CustomTheme, Id, NamedColor, Rgba, StructuralPrefs, ThemeId, VisualPrefs,
};
use crate::store::SettingsStore;
use crate::themes;

// ── Store keys ────────────────────────────────────────────────────────────────
//
// One key per field, stable across versions. Colors persist as [r, g, b]
// arrays, enums as their snake_case ids, the two collections and the
// shortcut as serialized records.

mod key {
    // theme binding
    pub const SELECTED_THEME: &str = "selected_theme";
    pub const ACTIVE_CUSTOM_THEME_ID: &str = "active_custom_theme_id";

    // collections
    pub const SAVED_THEMES: &str = "saved_custom_themes";
    pub const SAVED_PRESETS: &str = "saved_custom_presets";

    // structural
    pub const LANGUAGE: &str = "language";
    pub const MULTI_MONITOR_MODE: &str = "multi_monitor_mode";
    pub const LAUNCH_AT_LOGIN: &str = "launch_at_login";
    pub const HIDE_DOCK_ICON: &str = "hide_dock_icon";
    pub const FOLLOW_SYSTEM_APPEARANCE: &str = "follow_system_appearance";
    pub const UPDATE_CHECK_FREQUENCY: &str = "update_check_frequency";
    pub const LAST_UPDATE_CHECK: &str = "last_update_check";
    pub const UPDATE_NOTIFICATION: &str = "update_notification";
    pub const BACKGROUND_IMAGE_PATH: &str = "background_image_path";
    pub const BACKGROUND_WEB_URL: &str = "background_web_url";
    pub const ONLINE_IMAGE_URL: &str = "online_image_url";
    pub const SCREENSAVER_SHORTCUT: &str = "screensaver_shortcut";

    // visual (standalone; skipped while a saved custom theme is active)
    pub const BACKGROUND_COLOR: &str = "background_color";
    pub const BOX_COLOR: &str = "box_color";
    pub const TEXT_COLOR: &str = "text_color";
    pub const BACKGROUND_STYLE: &str = "background_style";
    pub const CLOCK_FONT: &str = "clock_font";
    pub const CUSTOM_FONT_NAME: &str = "custom_font_name";
    pub const DATE_FONT: &str = "date_font";
    pub const DATE_CUSTOM_FONT_NAME: &str = "date_custom_font_name";
    pub const CLOCK_SCALE: &str = "clock_scale";
    pub const DATE_SCALE: &str = "date_scale";
    pub const SECONDS_SCALE: &str = "seconds_scale";
    pub const AM_PM_SCALE: &str = "am_pm_scale";
    pub const CORNER_RADIUS: &str = "corner_radius";
    pub const SHADOW_ENABLED: &str = "shadow_enabled";
    pub const SHADOW_INTENSITY: &str = "shadow_intensity";
    pub const GLASS_ENABLED: &str = "glass_enabled";
    pub const GLASS_OPACITY: &str = "glass_opacity";
    pub const GLASS_BLUR: &str = "glass_blur";
    pub const SHOW_SECONDS: &str = "show_seconds";
    pub const SHOW_DATE: &str = "show_date";
    pub const DATE_FORMAT: &str = "date_format";
    pub const USE_24_HOUR: &str = "use_24_hour";
    pub const ALWAYS_ON_TOP: &str = "always_on_top";
    pub const SHOW_MENU_BAR_ICON: &str = "show_menu_bar_icon";
    pub const SCREENSAVER_ENABLED: &str = "screensaver_enabled";
    pub const IDLE_MINUTES: &str = "idle_minutes";
    pub const EXIT_ON_ACTIVITY: &str = "exit_on_activity";
    pub const FLIP_SOUND: &str = "flip_sound";
    pub const HOURLY_CHIME: &str = "hourly_chime";
}

// ── Tolerant load/save helpers ────────────────────────────────────────────────
//
// Every key is read independently: absent or unparseable values leave the
// slot at its current (default) value. Serialization failures on save skip
// that one key.

fn load_bool(store: &dyn SettingsStore, k: &str, slot: &mut bool) {
    if let Some(Value::Bool(b)) = store.get(k) {
        *slot = b;
    }
}

fn load_f64(store: &dyn SettingsStore, k: &str, slot: &mut f64) {
    if let Some(n) = store.get(k).and_then(|v| v.as_f64()) {
        *slot = n;
    }
}

fn load_i64(store: &dyn SettingsStore, k: &str, slot: &mut i64) {
    if let Some(n) = store.get(k).and_then(|v| v.as_i64()) {
        *slot = n;
    }
}

fn load_string(store: &dyn SettingsStore, k: &str, slot: &mut String) {
    if let Some(Value::String(s)) = store.get(k) {
        *slot = s;
    }
}

fn load_color(store: &dyn SettingsStore, k: &str, slot: &mut Rgba) {
    if let Some(Value::Array(items)) = store.get(k) {
        let floats: Vec<f64> = items.iter().filter_map(|v| v.as_f64()).collect();
        if let Some(c) = Rgba::from_components(&floats) {
            *slot = c;
        }
    }
}

/// serde-parsed slot (enums, the shortcut record). Unknown ids fail the
/// parse and the default stays.
fn load_parsed<T: serde::de::DeserializeOwned>(store: &dyn SettingsStore, k: &str, slot: &mut T) {
    if let Some(v) = store.get(k) {
        if let Ok(parsed) = serde_json::from_value(v) {
            *slot = parsed;
        }
    }
}

fn set_json<T: Serialize>(store: &mut dyn SettingsStore, k: &str, value: &T) {
    if let Ok(v) = serde_json::to_value(value) {
        store.set(k, v);
    }
}

// ── Change notification ───────────────────────────────────────────────────────

/// What a settled mutation touched. Observers receive exactly one of these
/// per public mutation; nothing fires during the initial load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A visual field changed through [`PreferenceEngine::update_visual`].
    Visual,
    /// A structural field changed through [`PreferenceEngine::update_structural`].
    Structural,
    /// The theme binding changed (apply/save/remove).
    Theme,
    /// The color preset collection changed.
    Presets,
}

type Observer = Box<dyn FnMut(Change)>;

// ── Engine ────────────────────────────────────────────────────────────────────

/// The live preference state: field groups, theme binding, saved themes and
/// color presets, plus the durable shadow copy behind [`SettingsStore`].
///
/// Construct once at startup and pass by reference to whatever needs it.
/// Mutation methods never fail from the caller's perspective; persistence
/// is fire-and-forget.
pub struct PreferenceEngine {
    visual: VisualPrefs,
    structural: StructuralPrefs,
    selected_theme: ThemeId,
    active_custom_theme: Option<Id>,
    saved_themes: Vec<CustomTheme>,
    presets: Vec<NamedColor>,
    store: Box<dyn SettingsStore>,

    // Reentrancy latches. `loading` suppresses persistence and observer
    // notification during the initial load, `applying_theme` suppresses
    // auto-detach while a theme apply writes visual fields, `saving` blocks
    // nested save passes.
    loading: bool,
    applying_theme: bool,
    saving: bool,

    observers: Vec<Observer>,
}

impl PreferenceEngine {
    pub fn new(store: Box<dyn SettingsStore>) -> PreferenceEngine {
        let mut engine = PreferenceEngine {
            visual: VisualPrefs::default(),
            structural: StructuralPrefs::default(),
            selected_theme: ThemeId::default(),
            active_custom_theme: None,
            saved_themes: Vec::new(),
            presets: Vec::new(),
            store,
            loading: true,
            applying_theme: false,
            saving: false,
            observers: Vec::new(),
        };
        engine.load_settings();
        engine.loading = false;
        engine
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn visual(&self) -> &VisualPrefs {
        &self.visual
    }

    pub fn structural(&self) -> &StructuralPrefs {
        &self.structural
    }

    pub fn selected_theme(&self) -> ThemeId {
        self.selected_theme
    }

    pub fn active_custom_theme_id(&self) -> Option<&Id> {
        self.active_custom_theme.as_ref()
    }

    pub fn saved_themes(&self) -> &[CustomTheme] {
        &self.saved_themes
    }

    pub fn saved_theme(&self, id: &Id) -> Option<&CustomTheme> {
        self.saved_themes.iter().find(|t| &t.id == id)
    }

    pub fn presets(&self) -> &[NamedColor] {
        &self.presets
    }

    /// Register a callback fired synchronously after each settled mutation.
    pub fn subscribe(&mut self, observer: impl FnMut(Change) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self, change: Change) {
        if self.loading {
            return;
        }
        for obs in &mut self.observers {
            obs(change);
        }
    }

    // ── Mutation pipelines ────────────────────────────────────────────────

    /// Mutate visual fields. Runs auto-detach (any edit off a named theme
    /// flips the selector to `Custom`), notifies observers, persists.
    pub fn update_visual(&mut self, f: impl FnOnce(&mut VisualPrefs)) {
        f(&mut self.visual);
        self.check_auto();
        self.notify(Change::Visual);
        self.save_settings();
    }

    /// Mutate structural fields. Never touches the theme binding.
    pub fn update_structural(&mut self, f: impl FnOnce(&mut StructuralPrefs)) {
        f(&mut self.structural);
        self.notify(Change::Structural);
        self.save_settings();
    }

    /// Auto-detach: a visual edit outside a theme apply moves the selector
    /// off a named theme. An edit while already `Custom` keeps the active
    /// custom-theme binding; that drift is redirected into an in-place
    /// re-save of the bound theme by `save_settings`.
    fn check_auto(&mut self) {
        if !self.applying_theme && self.selected_theme != ThemeId::Custom {
            self.selected_theme = ThemeId::Custom;
            self.active_custom_theme = None;
        }
    }

    // ── Theme lifecycle ───────────────────────────────────────────────────

    /// Select a built-in theme: colors come from the catalog, every other
    /// visual field is restored from the last-persisted standalone keys.
    pub fn apply_theme(&mut self, theme: ThemeId) {
        self.applying_theme = true;
        if theme != ThemeId::Custom {
            self.load_standalone_visuals();
            let c = themes::colors(theme);
            self.visual.background_color = c.background;
            self.visual.box_color = c.box_color;
            self.visual.text_color = c.text;
        }
        self.selected_theme = theme;
        self.active_custom_theme = None;
        self.applying_theme = false;
        self.notify(Change::Theme);
        self.save_settings();
    }

    /// Restore a saved custom theme: its snapshot overwrites every visual
    /// field and the engine binds to its id.
    pub fn apply_custom_theme(&mut self, theme: &CustomTheme) {
        self.applying_theme = true;
        self.visual = theme.prefs.clone();
        self.selected_theme = ThemeId::Custom;
        self.active_custom_theme = Some(theme.id.clone());
        self.applying_theme = false;
        self.notify(Change::Theme);
        self.save_settings();
    }

    /// Snapshot the current visual fields as a new named theme and bind to
    /// it. Returns the generated id.
    pub fn save_current_as_theme(&mut self, name: impl Into<String>) -> Id {
        let theme = CustomTheme {
            id: Id::generate(),
            name: name.into(),
            prefs: self.visual.clone(),
        };
        let id = theme.id.clone();
        self.saved_themes.push(theme);
        self.persist_saved_themes();
        self.selected_theme = ThemeId::Custom;
        self.active_custom_theme = Some(id.clone());
        self.notify(Change::Theme);
        self.save_settings();
        id
    }

    /// Delete a saved theme. If it was the active one the engine drops to
    /// the ad-hoc custom sub-state (selector stays `Custom`, binding gone).
    pub fn remove_theme(&mut self, id: &Id) {
        self.saved_themes.retain(|t| &t.id != id);
        if self.active_custom_theme.as_ref() == Some(id) {
            self.active_custom_theme = None;
        }
        self.persist_saved_themes();
        self.notify(Change::Theme);
        self.save_settings();
    }

    // ── Color presets ─────────────────────────────────────────────────────

    pub fn add_preset(&mut self, name: impl Into<String>, color: Rgba) -> Id {
        let preset = NamedColor::new(name, color);
        let id = preset.id.clone();
        self.presets.push(preset);
        self.persist_presets();
        self.notify(Change::Presets);
        id
    }

    pub fn remove_preset(&mut self, id: &Id) {
        self.presets.retain(|p| &p.id != id);
        self.persist_presets();
        self.notify(Change::Presets);
    }

    // ── Persistence ───────────────────────────────────────────────────────

    /// Write the full preference set. Structural keys always; visual keys
    /// only while the live state is not bound to a saved custom theme — in
    /// the bound state, drift is folded back into the saved entry instead
    /// (id and name preserved).
    pub fn save_settings(&mut self) {
        if self.loading || self.applying_theme || self.saving {
            return;
        }
        self.saving = true;

        set_json(&mut *self.store, key::SELECTED_THEME, &self.selected_theme);
        match &self.active_custom_theme {
            Some(id) => set_json(&mut *self.store, key::ACTIVE_CUSTOM_THEME_ID, id),
            None => self.store.set(key::ACTIVE_CUSTOM_THEME_ID, Value::Null),
        }
        self.write_structural_keys();

        let bound = self
            .active_custom_theme
            .as_ref()
            .and_then(|id| self.saved_themes.iter().position(|t| &t.id == id));
        match bound {
            Some(idx) => {
                let fresh = CustomTheme {
                    id: self.saved_themes[idx].id.clone(),
                    name: self.saved_themes[idx].name.clone(),
                    prefs: self.visual.clone(),
                };
                if self.saved_themes[idx] != fresh {
                    self.saved_themes[idx] = fresh;
                    self.persist_saved_themes();
                }
            }
            None => self.write_standalone_visuals(),
        }

        self.store.flush();
        self.saving = false;
    }

    fn persist_saved_themes(&mut self) {
        set_json(&mut *self.store, key::SAVED_THEMES, &self.saved_themes);
    }

    fn persist_presets(&mut self) {
        set_json(&mut *self.store, key::SAVED_PRESETS, &self.presets);
        self.store.flush();
    }

    fn write_structural_keys(&mut self) {
        let s = self.structural.clone();
        let store = &mut *self.store;
        set_json(store, key::LANGUAGE, &s.language);
        set_json(store, key::MULTI_MONITOR_MODE, &s.multi_monitor_mode);
        store.set(key::LAUNCH_AT_LOGIN, json!(s.launch_at_login));
        store.set(key::HIDE_DOCK_ICON, json!(s.hide_dock_icon));
        store.set(
            key::FOLLOW_SYSTEM_APPEARANCE,
            json!(s.follow_system_appearance),
        );
        set_json(store, key::UPDATE_CHECK_FREQUENCY, &s.update_check_frequency);
        if let Some(when) = &s.last_update_check {
            store.set(key::LAST_UPDATE_CHECK, json!(when.to_rfc3339()));
        }
        store.set(key::UPDATE_NOTIFICATION, json!(s.update_notification));
        if let Some(path) = &s.background_image_path {
            store.set(key::BACKGROUND_IMAGE_PATH, json!(path));
        }
        store.set(key::BACKGROUND_WEB_URL, json!(s.background_web_url));
        store.set(key::ONLINE_IMAGE_URL, json!(s.online_image_url));
        set_json(store, key::SCREENSAVER_SHORTCUT, &s.screensaver_shortcut);
    }

    fn write_standalone_visuals(&mut self) {
        let v = self.visual.clone();
        let store = &mut *self.store;
        store.set(key::BACKGROUND_COLOR, json!(v.background_color.components()));
        store.set(key::BOX_COLOR, json!(v.box_color.components()));
        store.set(key::TEXT_COLOR, json!(v.text_color.components()));
        set_json(store, key::BACKGROUND_STYLE, &v.background_style);
        set_json(store, key::CLOCK_FONT, &v.clock_font);
        store.set(key::CUSTOM_FONT_NAME, json!(v.custom_font_name));
        set_json(store, key::DATE_FONT, &v.date_font);
        store.set(key::DATE_CUSTOM_FONT_NAME, json!(v.date_custom_font_name));
        store.set(key::CLOCK_SCALE, json!(v.clock_scale));
        store.set(key::DATE_SCALE, json!(v.date_scale));
        store.set(key::SECONDS_SCALE, json!(v.seconds_scale));
        store.set(key::AM_PM_SCALE, json!(v.am_pm_scale));
        store.set(key::CORNER_RADIUS, json!(v.corner_radius));
        store.set(key::SHADOW_ENABLED, json!(v.shadow_enabled));
        store.set(key::SHADOW_INTENSITY, json!(v.shadow_intensity));
        store.set(key::GLASS_ENABLED, json!(v.glass_enabled));
        store.set(key::GLASS_OPACITY, json!(v.glass_opacity));
        store.set(key::GLASS_BLUR, json!(v.glass_blur));
        store.set(key::SHOW_SECONDS, json!(v.show_seconds));
        store.set(key::SHOW_DATE, json!(v.show_date));
        set_json(store, key::DATE_FORMAT, &v.date_format);
        store.set(key::USE_24_HOUR, json!(v.use_24_hour));
        store.set(key::ALWAYS_ON_TOP, json!(v.always_on_top));
        store.set(key::SHOW_MENU_BAR_ICON, json!(v.show_menu_bar_icon));
        store.set(key::SCREENSAVER_ENABLED, json!(v.screensaver_enabled));
        store.set(key::IDLE_MINUTES, json!(v.idle_minutes));
        store.set(key::EXIT_ON_ACTIVITY, json!(v.exit_on_activity));
        store.set(key::FLIP_SOUND, json!(v.flip_sound));
        store.set(key::HOURLY_CHIME, json!(v.hourly_chime));
    }

    /// Rehydrate from the store. Runs once, inside `new`. Every key is
    /// optional; anything missing or unparseable keeps its default. The
    /// final theme state is derived at the end: a resolvable active
    /// custom-theme id wins, then a persisted built-in selection, then
    /// ad-hoc custom.
    fn load_settings(&mut self) {
        load_parsed(&*self.store, key::SAVED_PRESETS, &mut self.presets);
        load_parsed(&*self.store, key::SAVED_THEMES, &mut self.saved_themes);

        let last_check = self.store.get(key::LAST_UPDATE_CHECK);
        let image_path = self.store.get(key::BACKGROUND_IMAGE_PATH);

        let s = &mut self.structural;
        load_parsed(&*self.store, key::LANGUAGE, &mut s.language);
        load_parsed(
            &*self.store,
            key::MULTI_MONITOR_MODE,
            &mut s.multi_monitor_mode,
        );
        load_bool(&*self.store, key::LAUNCH_AT_LOGIN, &mut s.launch_at_login);
        load_bool(&*self.store, key::HIDE_DOCK_ICON, &mut s.hide_dock_icon);
        load_bool(
            &*self.store,
            key::FOLLOW_SYSTEM_APPEARANCE,
            &mut s.follow_system_appearance,
        );
        load_parsed(
            &*self.store,
            key::UPDATE_CHECK_FREQUENCY,
            &mut s.update_check_frequency,
        );
        if let Some(Value::String(raw)) = last_check {
            if let Ok(when) = chrono::DateTime::parse_from_rfc3339(&raw) {
                s.last_update_check = Some(when.with_timezone(&chrono::Utc));
            }
        }
        load_bool(
            &*self.store,
            key::UPDATE_NOTIFICATION,
            &mut s.update_notification,
        );
        if let Some(Value::String(path)) = image_path {
            s.background_image_path = Some(path);
        }
        load_string(
            &*self.store,
            key::BACKGROUND_WEB_URL,
            &mut s.background_web_url,
        );
        load_string(&*self.store, key::ONLINE_IMAGE_URL, &mut s.online_image_url);
        load_parsed(
            &*self.store,
            key::SCREENSAVER_SHORTCUT,
            &mut s.screensaver_shortcut,
        );

        let mut selected = ThemeId::default();
        load_parsed(&*self.store, key::SELECTED_THEME, &mut selected);
        let mut active: Option<Id> = None;
        load_parsed(&*self.store, key::ACTIVE_CUSTOM_THEME_ID, &mut active);

        // A dangling id (theme deleted since last save) falls through to
        // the named/ad-hoc paths.
        if let Some(id) = active {
            if let Some(theme) = self.saved_theme(&id).cloned() {
                self.apply_custom_theme(&theme);
                return;
            }
        }

        self.load_standalone_visuals();
        if selected != ThemeId::Custom {
            self.apply_theme(selected);
        } else {
            self.selected_theme = ThemeId::Custom;
            self.active_custom_theme = None;
        }
    }

    fn load_standalone_visuals(&mut self) {
        let v = &mut self.visual;
        let store = &*self.store;
        load_color(store, key::BACKGROUND_COLOR, &mut v.background_color);
        load_color(store, key::BOX_COLOR, &mut v.box_color);
        load_color(store, key::TEXT_COLOR, &mut v.text_color);
        load_parsed(store, key::BACKGROUND_STYLE, &mut v.background_style);
        load_parsed(store, key::CLOCK_FONT, &mut v.clock_font);
        load_string(store, key::CUSTOM_FONT_NAME, &mut v.custom_font_name);
        load_parsed(store, key::DATE_FONT, &mut v.date_font);
        load_string(
            store,
            key::DATE_CUSTOM_FONT_NAME,
            &mut v.date_custom_font_name,
        );
        load_f64(store, key::CLOCK_SCALE, &mut v.clock_scale);
        load_f64(store, key::DATE_SCALE, &mut v.date_scale);
        load_f64(store, key::SECONDS_SCALE, &mut v.seconds_scale);
        load_f64(store, key::AM_PM_SCALE, &mut v.am_pm_scale);
        load_f64(store, key::CORNER_RADIUS, &mut v.corner_radius);
        load_bool(store, key::SHADOW_ENABLED, &mut v.shadow_enabled);
        load_f64(store, key::SHADOW_INTENSITY, &mut v.shadow_intensity);
        load_bool(store, key::GLASS_ENABLED, &mut v.glass_enabled);
        load_f64(store, key::GLASS_OPACITY, &mut v.glass_opacity);
        load_f64(store, key::GLASS_BLUR, &mut v.glass_blur);
        load_bool(store, key::SHOW_SECONDS, &mut v.show_seconds);
        load_bool(store, key::SHOW_DATE, &mut v.show_date);
        load_parsed(store, key::DATE_FORMAT, &mut v.date_format);
        load_bool(store, key::USE_24_HOUR, &mut v.use_24_hour);
        load_bool(store, key::ALWAYS_ON_TOP, &mut v.always_on_top);
        load_bool(store, key::SHOW_MENU_BAR_ICON, &mut v.show_menu_bar_icon);
        load_bool(store, key::SCREENSAVER_ENABLED, &mut v.screensaver_enabled);
        load_i64(store, key::IDLE_MINUTES, &mut v.idle_minutes);
        load_bool(store, key::EXIT_ON_ACTIVITY, &mut v.exit_on_activity);
        load_bool(store, key::FLIP_SOUND, &mut v.flip_sound);
        load_bool(store, key::HOURLY_CHIME, &mut v.hourly_chime);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Language;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    type SharedStore = Rc<RefCell<MemoryStore>>;

    fn shared_store() -> SharedStore {
        Rc::new(RefCell::new(MemoryStore::new()))
    }

    fn engine(store: &SharedStore) -> PreferenceEngine {
        PreferenceEngine::new(Box::new(store.clone()))
    }

    const BLUE: Rgba = Rgba::rgb(0.0, 0.0, 1.0);

    #[test]
    fn visual_edit_detaches_to_custom() {
        let store = shared_store();
        let mut e = engine(&store);
        assert_eq!(e.selected_theme(), ThemeId::Dark);

        e.update_visual(|v| v.background_color = BLUE);
        assert_eq!(e.selected_theme(), ThemeId::Custom);
        assert_eq!(e.active_custom_theme_id(), None);
        assert_eq!(e.visual().background_color, BLUE);
    }

    #[test]
    fn applying_a_theme_does_not_detach_itself() {
        let store = shared_store();
        let mut e = engine(&store);
        e.update_visual(|v| v.background_color = BLUE);

        e.apply_theme(ThemeId::Light);
        assert_eq!(e.selected_theme(), ThemeId::Light);
        assert_eq!(e.visual().background_color, Rgba::WHITE);
        assert_eq!(e.visual().text_color, Rgba::BLACK);
        assert_eq!(e.active_custom_theme_id(), None);
    }

    #[test]
    fn structural_edit_never_flips_the_selector() {
        let store = shared_store();
        let mut e = engine(&store);
        e.apply_theme(ThemeId::Ocean);

        e.update_structural(|s| s.language = Language::Korean);
        e.update_structural(|s| s.launch_at_login = true);
        assert_eq!(e.selected_theme(), ThemeId::Ocean);
        assert_eq!(e.active_custom_theme_id(), None);
    }

    #[test]
    fn round_trip_restores_unbound_state() {
        let store = shared_store();
        let mut e = engine(&store);
        e.update_structural(|s| {
            s.language = Language::Korean;
            s.multi_monitor_mode = crate::model::MultiMonitorMode::All;
            s.background_web_url = "https://example.com".into();
        });
        e.update_visual(|v| {
            v.background_color = BLUE;
            v.clock_scale = 1.7;
            v.show_seconds = true;
            v.idle_minutes = 12;
        });

        let reloaded = engine(&store);
        assert_eq!(reloaded.structural(), e.structural());
        assert_eq!(reloaded.visual(), e.visual());
        assert_eq!(reloaded.selected_theme(), ThemeId::Custom);
        assert_eq!(reloaded.active_custom_theme_id(), None);
    }

    #[test]
    fn round_trip_restores_named_theme_state() {
        let store = shared_store();
        let mut e = engine(&store);
        e.update_visual(|v| v.clock_scale = 2.0);
        e.apply_theme(ThemeId::Forest);

        let reloaded = engine(&store);
        assert_eq!(reloaded.selected_theme(), ThemeId::Forest);
        assert_eq!(
            reloaded.visual().background_color,
            themes::colors(ThemeId::Forest).background
        );
        assert_eq!(reloaded.visual().clock_scale, 2.0);
    }

    #[test]
    fn round_trip_rebinds_active_custom_theme() {
        let store = shared_store();
        let mut e = engine(&store);
        e.update_visual(|v| v.corner_radius = 22.0);
        let id = e.save_current_as_theme("Rounded");

        let reloaded = engine(&store);
        assert_eq!(reloaded.selected_theme(), ThemeId::Custom);
        assert_eq!(reloaded.active_custom_theme_id(), Some(&id));
        assert_eq!(reloaded.visual().corner_radius, 22.0);
    }

    #[test]
    fn drift_while_bound_resaves_theme_in_place() {
        let store = shared_store();
        let mut e = engine(&store);
        e.update_visual(|v| v.corner_radius = 15.0);
        let id = e.save_current_as_theme("Mine");

        e.update_visual(|v| v.corner_radius = 20.0);

        let entry = e.saved_theme(&id).unwrap();
        assert_eq!(entry.name, "Mine");
        assert_eq!(entry.prefs.corner_radius, 20.0);
        // Binding survives the drift.
        assert_eq!(e.active_custom_theme_id(), Some(&id));
        // The standalone key still holds the pre-binding value.
        assert_eq!(store.get("corner_radius"), Some(json!(15.0)));
        // And the persisted collection reflects the re-save.
        let reloaded = engine(&store);
        assert_eq!(reloaded.saved_theme(&id).unwrap().prefs.corner_radius, 20.0);
    }

    #[test]
    fn save_is_idempotent() {
        let store = shared_store();
        let mut e = engine(&store);
        e.update_visual(|v| v.glass_enabled = true);
        e.save_settings();
        let first = store.borrow().snapshot();
        e.save_settings();
        assert_eq!(store.borrow().snapshot(), first);
    }

    #[test]
    fn deleting_the_active_theme_clears_the_binding() {
        let store = shared_store();
        let mut e = engine(&store);
        let id = e.save_current_as_theme("X");
        assert_eq!(e.active_custom_theme_id(), Some(&id));

        e.remove_theme(&id);
        assert_eq!(e.active_custom_theme_id(), None);
        assert_eq!(e.selected_theme(), ThemeId::Custom);
        assert!(e.saved_theme(&id).is_none());
    }

    #[test]
    fn dangling_active_id_falls_through_on_load() {
        let store = shared_store();
        {
            let mut e = engine(&store);
            e.apply_theme(ThemeId::Sunset);
        }
        store.borrow_mut().set("active_custom_theme_id", json!("feedfeed"));

        let e = engine(&store);
        assert_eq!(e.selected_theme(), ThemeId::Sunset);
        assert_eq!(e.active_custom_theme_id(), None);
    }

    #[test]
    fn unknown_enum_ids_keep_defaults_without_failing_the_load() {
        let store = shared_store();
        store.borrow_mut().set("clock_font", json!("comic_sans"));
        store.borrow_mut().set("selected_theme", json!("neon"));
        store.borrow_mut().set("language", json!("korean"));

        let e = engine(&store);
        assert_eq!(e.visual().clock_font, crate::model::ClockFont::Rounded);
        assert_eq!(e.selected_theme(), ThemeId::Dark);
        // The parseable neighbor still loads.
        assert_eq!(e.structural().language, Language::Korean);
    }

    #[test]
    fn corrupt_collection_blob_loads_empty() {
        let store = shared_store();
        store.borrow_mut().set("saved_custom_themes", json!("garbage"));
        store
            .borrow_mut()
            .set("saved_custom_presets", json!({"not": "a list"}));

        let e = engine(&store);
        assert!(e.saved_themes().is_empty());
        assert!(e.presets().is_empty());
    }

    #[test]
    fn default_dark_to_blue_to_light_scenario() {
        let store = shared_store();
        let mut e = engine(&store);
        assert_eq!(e.selected_theme(), ThemeId::Dark);

        e.update_visual(|v| v.background_color = BLUE);
        assert_eq!(e.selected_theme(), ThemeId::Custom);
        assert_eq!(e.active_custom_theme_id(), None);

        e.apply_theme(ThemeId::Light);
        assert_eq!(e.selected_theme(), ThemeId::Light);
        assert_eq!(e.visual().background_color, Rgba::WHITE);
        assert_eq!(e.active_custom_theme_id(), None);
    }

    #[test]
    fn apply_theme_restores_non_color_customizations() {
        let store = shared_store();
        let mut e = engine(&store);
        // Customize while unbound so the standalone keys capture it.
        e.update_visual(|v| {
            v.clock_scale = 2.0;
            v.show_seconds = true;
        });
        e.update_visual(|v| v.background_color = BLUE);

        e.apply_theme(ThemeId::Light);
        assert_eq!(e.visual().background_color, Rgba::WHITE);
        assert_eq!(e.visual().clock_scale, 2.0);
        assert!(e.visual().show_seconds);
    }

    #[test]
    fn presets_append_remove_and_persist_independently() {
        let store = shared_store();
        let mut e = engine(&store);
        let keep = e.add_preset("Sky", Rgba::rgb(0.5, 0.8, 1.0));
        let doomed = e.add_preset("Mud", Rgba::rgb(0.3, 0.2, 0.1));
        e.remove_preset(&doomed);

        // Preset ops do not touch the theme binding or visual keys.
        assert_eq!(e.selected_theme(), ThemeId::Dark);
        assert!(!store.contains("background_color"));

        let reloaded = engine(&store);
        assert_eq!(reloaded.presets().len(), 1);
        assert_eq!(reloaded.presets()[0].id, keep);
        assert_eq!(reloaded.presets()[0].name, "Sky");
    }

    #[test]
    fn observers_fire_once_per_settled_mutation() {
        let store = shared_store();
        let mut e = engine(&store);
        let seen: Rc<RefCell<Vec<Change>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        e.subscribe(move |c| sink.borrow_mut().push(c));

        e.update_visual(|v| v.show_date = true);
        e.update_structural(|s| s.hide_dock_icon = true);
        e.apply_theme(ThemeId::RoseGold);
        assert_eq!(
            *seen.borrow(),
            vec![Change::Visual, Change::Structural, Change::Theme]
        );
    }

    #[test]
    fn observers_do_not_fire_during_load() {
        let store = shared_store();
        {
            let mut e = engine(&store);
            e.save_current_as_theme("Bound");
        }
        // Rehydrating a bound theme applies it internally; a fresh engine
        // has no subscribers yet and the loading latch keeps it that way
        // for hosts that subscribe inside a constructor-adjacent callback.
        let mut e = engine(&store);
        let fired = Rc::new(RefCell::new(0));
        let sink = fired.clone();
        e.subscribe(move |_| *sink.borrow_mut() += 1);
        assert_eq!(*fired.borrow(), 0);
        e.update_visual(|v| v.flip_sound = false);
        assert_eq!(*fired.borrow(), 1);
    }
}
