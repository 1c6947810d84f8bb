use serde::{Deserialize, Serialize};

// ── Option enums ──────────────────────────────────────────────────────────────
//
// Every enum that reaches the settings store round-trips through its
// snake_case string id. Unknown ids read back from the store simply fail to
// parse and the field keeps its current value.

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Korean,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClockFont {
    #[default]
    Rounded,
    Monospaced,
    Serif,
    Digital,
    SystemCustom,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundStyle {
    #[default]
    Solid,
    LinearGradient,
    AnimatedGradient,
    Image,
    Web,
    OnlineImage,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MultiMonitorMode {
    #[default]
    Primary,
    All,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpdateCheckFrequency {
    Manual,
    Daily,
    #[default]
    Weekly,
    Monthly,
}

impl UpdateCheckFrequency {
    /// Minimum days between automatic checks. `Manual` never auto-checks.
    pub fn days(self) -> i64 {
        match self {
            UpdateCheckFrequency::Manual => 0,
            UpdateCheckFrequency::Daily => 1,
            UpdateCheckFrequency::Weekly => 7,
            UpdateCheckFrequency::Monthly => 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateFormatOption {
    #[default]
    Full,
    NumericWithDay,
    Numeric,
    MonthDayYear,
    DayMonthYear,
}

impl DateFormatOption {
    /// chrono format pattern for this option in the given language.
    ///
    /// Korean puts the abbreviated day name in parentheses after the date;
    /// every other language separates it with a comma.
    pub fn pattern(self, language: Language) -> &'static str {
        match self {
            DateFormatOption::Full => "%A, %B %-d, %Y",
            DateFormatOption::NumericWithDay => {
                if language == Language::Korean {
                    "%Y/%m/%d (%a)"
                } else {
                    "%Y/%m/%d, %a"
                }
            }
            DateFormatOption::Numeric => "%Y/%m/%d",
            DateFormatOption::MonthDayYear => "%b %-d, %Y",
            DateFormatOption::DayMonthYear => "%-d %b %Y",
        }
    }
}

/// Theme selector. `Custom` is a first-class variant: it is what the
/// selector reads whenever the live visual fields no longer match a built-in
/// theme. The seven built-in ids live in [`crate::themes`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThemeId {
    #[default]
    Dark,
    Light,
    MidnightBlue,
    Sunset,
    Forest,
    Ocean,
    RoseGold,
    Custom,
}

// ── Colors ────────────────────────────────────────────────────────────────────

/// sRGB color, components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Rgba {
        Rgba { r, g, b, a: 1.0 }
    }

    pub const fn gray(w: f64) -> Rgba {
        Rgba::rgb(w, w, w)
    }

    /// Store representation of a standalone color key: `[r, g, b]`.
    pub fn components(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    /// Lenient inverse of [`Rgba::components`]; extra elements are ignored,
    /// fewer than three yields `None` (caller keeps its current value).
    pub fn from_components(c: &[f64]) -> Option<Rgba> {
        if c.len() >= 3 {
            Some(Rgba::rgb(c[0], c[1], c[2]))
        } else {
            None
        }
    }
}

// ── Record identity ───────────────────────────────────────────────────────────

/// Opaque identity for saved themes and color presets: 16 random bytes,
/// hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn generate() -> Id {
        use rand::RngCore;
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        Id(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A reusable color preset, independent of themes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedColor {
    pub id: Id,
    pub name: String,
    #[serde(flatten)]
    pub color: Rgba,
}

impl NamedColor {
    pub fn new(name: impl Into<String>, color: Rgba) -> NamedColor {
        NamedColor {
            id: Id::generate(),
            name: name.into(),
            color,
        }
    }
}

// ── Keyboard shortcut ─────────────────────────────────────────────────────────

pub const MOD_CONTROL: u32 = 1 << 0;
pub const MOD_OPTION: u32 = 1 << 1;
pub const MOD_SHIFT: u32 = 1 << 2;
pub const MOD_COMMAND: u32 = 1 << 3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyboardShortcut {
    pub key_char: String,
    pub key_code: u16,
    pub modifiers: u32,
}

impl KeyboardShortcut {
    /// Canonical glyph rendering: modifier symbols in fixed order
    /// (control, option, shift, command), then the uppercased key.
    pub fn display_string(&self) -> String {
        let mut s = String::new();
        if self.modifiers & MOD_CONTROL != 0 {
            s.push('⌃');
        }
        if self.modifiers & MOD_OPTION != 0 {
            s.push('⌥');
        }
        if self.modifiers & MOD_SHIFT != 0 {
            s.push('⇧');
        }
        if self.modifiers & MOD_COMMAND != 0 {
            s.push('⌘');
        }
        s.push_str(&self.key_char.to_uppercase());
        s
    }
}

impl Default for KeyboardShortcut {
    fn default() -> Self {
        KeyboardShortcut {
            key_char: "s".into(),
            key_code: 1,
            modifiers: MOD_COMMAND | MOD_CONTROL,
        }
    }
}

// ── Visual fields (theme identity) ────────────────────────────────────────────

/// Every appearance field, as one group. The full set is the theme identity:
/// a [`CustomTheme`] snapshots all of it, and mutating any field outside a
/// theme apply detaches the selector to `Custom`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisualPrefs {
    pub background_color: Rgba,
    pub box_color: Rgba,
    pub text_color: Rgba,
    pub background_style: BackgroundStyle,
    pub clock_font: ClockFont,
    pub custom_font_name: String,
    pub date_font: ClockFont,
    pub date_custom_font_name: String,
    pub clock_scale: f64,
    pub date_scale: f64,
    pub seconds_scale: f64,
    pub am_pm_scale: f64,
    pub corner_radius: f64,
    pub shadow_enabled: bool,
    pub shadow_intensity: f64,
    pub glass_enabled: bool,
    pub glass_opacity: f64,
    pub glass_blur: f64,
    pub show_seconds: bool,
    pub show_date: bool,
    pub date_format: DateFormatOption,
    pub use_24_hour: bool,
    pub always_on_top: bool,
    pub show_menu_bar_icon: bool,
    pub screensaver_enabled: bool,
    pub idle_minutes: i64,
    pub exit_on_activity: bool,
    pub flip_sound: bool,
    pub hourly_chime: bool,
}

impl Default for VisualPrefs {
    fn default() -> Self {
        VisualPrefs {
            background_color: Rgba::BLACK,
            box_color: Rgba::gray(0.2),
            text_color: Rgba::WHITE,
            background_style: BackgroundStyle::Solid,
            clock_font: ClockFont::Rounded,
            custom_font_name: "Helvetica".into(),
            date_font: ClockFont::Rounded,
            date_custom_font_name: "Helvetica".into(),
            clock_scale: 1.0,
            date_scale: 1.0,
            seconds_scale: 1.0,
            am_pm_scale: 0.6,
            corner_radius: 10.0,
            shadow_enabled: true,
            shadow_intensity: 0.3,
            glass_enabled: false,
            glass_opacity: 0.3,
            glass_blur: 20.0,
            show_seconds: false,
            show_date: false,
            date_format: DateFormatOption::Full,
            use_24_hour: true,
            always_on_top: false,
            show_menu_bar_icon: true,
            screensaver_enabled: false,
            idle_minutes: 5,
            exit_on_activity: false,
            flip_sound: true,
            hourly_chime: false,
        }
    }
}

// ── Structural fields ─────────────────────────────────────────────────────────

/// Behavior and OS-integration fields. Always persisted as standalone keys;
/// never part of theme identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StructuralPrefs {
    pub language: Language,
    pub multi_monitor_mode: MultiMonitorMode,
    pub launch_at_login: bool,
    pub hide_dock_icon: bool,
    pub follow_system_appearance: bool,
    pub update_check_frequency: UpdateCheckFrequency,
    pub last_update_check: Option<chrono::DateTime<chrono::Utc>>,
    pub update_notification: bool,
    pub background_image_path: Option<String>,
    pub background_web_url: String,
    pub online_image_url: String,
    pub screensaver_shortcut: KeyboardShortcut,
}

impl Default for StructuralPrefs {
    fn default() -> Self {
        StructuralPrefs {
            language: Language::English,
            multi_monitor_mode: MultiMonitorMode::Primary,
            launch_at_login: false,
            hide_dock_icon: false,
            follow_system_appearance: false,
            update_check_frequency: UpdateCheckFrequency::Weekly,
            last_update_check: None,
            update_notification: true,
            background_image_path: None,
            background_web_url: "https://www.google.com".into(),
            online_image_url: String::new(),
            screensaver_shortcut: KeyboardShortcut::default(),
        }
    }
}

// ── Custom themes ─────────────────────────────────────────────────────────────

/// A named, user-saved snapshot of every visual field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomTheme {
    pub id: Id,
    pub name: String,
    #[serde(flatten)]
    pub prefs: VisualPrefs,
}
