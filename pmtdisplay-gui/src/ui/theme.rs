//! Application theme and color definitions.
//!
//! Light and dark palettes with monospace fonts, following the system
//! preference.

use eframe::egui::{self, Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Theme, Visuals};

/// Dark palette.
pub mod dark {
    use eframe::egui::Color32;

    pub const BG_DARK: Color32 = Color32::from_rgb(0x0e, 0x12, 0x18);
    pub const BG_PANEL: Color32 = Color32::from_rgb(0x15, 0x1a, 0x22);
    pub const BG_HEADER: Color32 = Color32::from_rgb(0x1b, 0x22, 0x2c);
    pub const BG_INPUT: Color32 = Color32::from_rgb(0x22, 0x2a, 0x36);

    pub const BORDER: Color32 = Color32::from_rgb(0x2c, 0x36, 0x44);
    pub const BORDER_LIGHT: Color32 = Color32::from_rgb(0x3b, 0x47, 0x58);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(0xdc, 0xe3, 0xec);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(0x84, 0x91, 0xa3);

    pub const BUTTON_HOVER: Color32 = Color32::from_rgb(0x2b, 0x35, 0x44);
}

/// Light palette.
pub mod light {
    use eframe::egui::Color32;

    pub const BG_DARK: Color32 = Color32::from_rgb(0xee, 0xf1, 0xf5);
    pub const BG_PANEL: Color32 = Color32::from_rgb(0xfb, 0xfc, 0xfd);
    pub const BG_HEADER: Color32 = Color32::from_rgb(0xe6, 0xeb, 0xf1);
    pub const BG_INPUT: Color32 = Color32::from_rgb(0xff, 0xff, 0xff);

    pub const BORDER: Color32 = Color32::from_rgb(0xc8, 0xd0, 0xda);
    pub const BORDER_LIGHT: Color32 = Color32::from_rgb(0xb4, 0xbe, 0xcb);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(0x17, 0x1d, 0x26);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(0x5a, 0x66, 0x76);

    pub const BUTTON_HOVER: Color32 = Color32::from_rgb(0xd9, 0xe0, 0xe8);
}

/// Accent colors shared by both themes.
pub mod accent {
    use eframe::egui::Color32;

    /// Cherenkov blue: selection, active widgets, info notices.
    pub const BLUE: Color32 = Color32::from_rgb(0x3d, 0x8b, 0xf2);
    pub const GREEN: Color32 = Color32::from_rgb(0x2f, 0xb3, 0x6d);
    pub const AMBER: Color32 = Color32::from_rgb(0xe8, 0xa3, 0x17);
    pub const RED: Color32 = Color32::from_rgb(0xe0, 0x4f, 0x4f);
}

/// Colors for the current light/dark mode.
#[derive(Clone, Copy)]
pub struct ThemeColors {
    pub bg_dark: Color32,
    pub bg_header: Color32,
    pub border: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
}

impl ThemeColors {
    pub fn from_ctx(ctx: &egui::Context) -> Self {
        Self::from_dark_mode(ctx.style().visuals.dark_mode)
    }

    pub fn from_ui(ui: &egui::Ui) -> Self {
        Self::from_dark_mode(ui.visuals().dark_mode)
    }

    pub fn from_dark_mode(is_dark: bool) -> Self {
        if is_dark {
            Self {
                bg_dark: dark::BG_DARK,
                bg_header: dark::BG_HEADER,
                border: dark::BORDER,
                text_primary: dark::TEXT_PRIMARY,
                text_muted: dark::TEXT_MUTED,
            }
        } else {
            Self {
                bg_dark: light::BG_DARK,
                bg_header: light::BG_HEADER,
                border: light::BORDER,
                text_primary: light::TEXT_PRIMARY,
                text_muted: light::TEXT_MUTED,
            }
        }
    }
}

struct Palette {
    base: Visuals,
    bg_dark: Color32,
    bg_panel: Color32,
    bg_input: Color32,
    border: Color32,
    border_light: Color32,
    text_primary: Color32,
    text_muted: Color32,
    button_hover: Color32,
    selection_alpha: f32,
}

fn build_visuals(p: &Palette) -> Visuals {
    let mut visuals = p.base.clone();

    visuals.window_fill = p.bg_panel;
    visuals.panel_fill = p.bg_panel;
    visuals.faint_bg_color = p.bg_dark;
    visuals.extreme_bg_color = p.bg_input;

    let rounding = Rounding::same(3.0);
    let widgets = &mut visuals.widgets;
    widgets.noninteractive.bg_fill = p.bg_input;
    widgets.noninteractive.fg_stroke = Stroke::new(1.0, p.text_muted);
    widgets.noninteractive.bg_stroke = Stroke::new(1.0, p.border);
    widgets.noninteractive.rounding = rounding;

    widgets.inactive.bg_fill = p.bg_input;
    widgets.inactive.fg_stroke = Stroke::new(1.0, p.text_primary);
    widgets.inactive.bg_stroke = Stroke::new(1.0, p.border_light);
    widgets.inactive.rounding = rounding;

    widgets.hovered.bg_fill = p.button_hover;
    widgets.hovered.fg_stroke = Stroke::new(1.0, p.text_primary);
    widgets.hovered.bg_stroke = Stroke::new(1.0, accent::BLUE);
    widgets.hovered.rounding = rounding;

    widgets.active.bg_fill = accent::BLUE;
    widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);
    widgets.active.bg_stroke = Stroke::new(1.0, accent::BLUE);
    widgets.active.rounding = rounding;

    widgets.open = widgets.inactive;

    visuals.selection.bg_fill = accent::BLUE.gamma_multiply(p.selection_alpha);
    visuals.selection.stroke = Stroke::new(1.0, accent::BLUE);

    visuals
}

fn dark_visuals() -> Visuals {
    build_visuals(&Palette {
        base: Visuals::dark(),
        bg_dark: dark::BG_DARK,
        bg_panel: dark::BG_PANEL,
        bg_input: dark::BG_INPUT,
        border: dark::BORDER,
        border_light: dark::BORDER_LIGHT,
        text_primary: dark::TEXT_PRIMARY,
        text_muted: dark::TEXT_MUTED,
        button_hover: dark::BUTTON_HOVER,
        selection_alpha: 0.3,
    })
}

fn light_visuals() -> Visuals {
    build_visuals(&Palette {
        base: Visuals::light(),
        bg_dark: light::BG_DARK,
        bg_panel: light::BG_PANEL,
        bg_input: light::BG_INPUT,
        border: light::BORDER,
        border_light: light::BORDER_LIGHT,
        text_primary: light::TEXT_PRIMARY,
        text_muted: light::TEXT_MUTED,
        button_hover: light::BUTTON_HOVER,
        selection_alpha: 0.2,
    })
}

/// Configure egui style for the given theme.
pub fn configure_style_for_theme(ctx: &egui::Context, theme: Theme) {
    ctx.set_visuals(match theme {
        Theme::Dark => dark_visuals(),
        Theme::Light => light_visuals(),
    });

    let mut style = (*ctx.style()).clone();
    style.text_styles = [
        (TextStyle::Small, FontId::new(10.5, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(13.0, FontFamily::Monospace)),
        (TextStyle::Button, FontId::new(13.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(16.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(12.5, FontFamily::Monospace)),
    ]
    .into();
    style.spacing.item_spacing = egui::vec2(6.0, 6.0);
    style.spacing.button_padding = egui::vec2(12.0, 5.0);
    style.spacing.interact_size.y = 26.0;
    ctx.set_style(style);
}

/// Configure style based on the current dark/light mode.
pub fn configure_style(ctx: &egui::Context) {
    let theme = if ctx.style().visuals.dark_mode {
        Theme::Dark
    } else {
        Theme::Light
    };
    configure_style_for_theme(ctx, theme);
}

/// Re-applies the custom style when the system theme changes.
pub fn apply_system_theme(ctx: &egui::Context) {
    let id = egui::Id::new("pmtdisplay_theme_dark");
    let is_dark = ctx.style().visuals.dark_mode;
    if ctx.data_mut(|d| d.get_temp::<bool>(id)) != Some(is_dark) {
        configure_style(ctx);
        ctx.data_mut(|d| d.insert_temp(id, is_dark));
    }
}

/// The highlighted action button.
pub fn primary_button(text: &str) -> egui::Button<'_> {
    egui::Button::new(egui::RichText::new(text).color(Color32::WHITE))
        .fill(accent::GREEN)
        .rounding(Rounding::same(3.0))
}

/// Small upper-case field label.
pub fn form_label(text: &str) -> egui::RichText {
    egui::RichText::new(text.to_uppercase()).size(10.0)
}
