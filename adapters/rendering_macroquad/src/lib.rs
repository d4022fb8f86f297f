#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Witch Battle.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The backend scales the fixed-size battlefield plane to the window,
//! letterboxing as needed, and converts pointer coordinates back into
//! battlefield units before handing them to the simulation closure.

use anyhow::{Context as AnyhowContext, Result};
use glam::Vec2;
use macroquad::{
    input::{is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton},
    shapes::{draw_rectangle, draw_rectangle_lines},
    text::draw_text,
};
use serde::Deserialize;
use witch_battle_core::Outcome;
use witch_battle_rendering::{
    Color, PointerInput, Presentation, RenderingBackend, Scene, SceneRect,
};

/// Window settings loaded from an optional TOML document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Initial window width in pixels.
    pub window_width: u32,
    /// Initial window height in pixels.
    pub window_height: u32,
    /// Whether the backend requests vsync from the platform.
    pub vsync: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            window_width: 960,
            window_height: 720,
            vsync: true,
        }
    }
}

impl DisplayConfig {
    /// Parses a display configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse display configuration toml")
    }
}

/// Mapping between battlefield units and window pixels for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Viewport {
    scale: f32,
    offset: Vec2,
}

impl Viewport {
    fn fit(battlefield: Vec2, screen: Vec2) -> Self {
        let scale = (screen.x / battlefield.x).min(screen.y / battlefield.y);
        let offset = (screen - battlefield * scale) / 2.0;
        Self { scale, offset }
    }

    fn to_screen(&self, point: Vec2) -> Vec2 {
        self.offset + point * self.scale
    }

    fn to_battlefield(&self, point: Vec2) -> Vec2 {
        (point - self.offset) / self.scale
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroquadBackend {
    display: DisplayConfig,
}

impl MacroquadBackend {
    /// Creates a new backend with default display settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the display settings used when creating the window.
    #[must_use]
    pub fn with_display(mut self, display: DisplayConfig) -> Self {
        self.display = display;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(PointerInput, &mut Scene) + 'static,
    {
        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: self.display.window_width as i32,
            window_height: self.display.window_height as i32,
            ..macroquad::window::Conf::default()
        };
        if !self.display.vsync {
            config.platform.swap_interval = Some(0);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);

            loop {
                if is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q) {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let battlefield =
                    Vec2::new(scene.battlefield.width, scene.battlefield.height);
                let viewport = Viewport::fit(battlefield, screen);

                let (mouse_x, mouse_y) = mouse_position();
                let pointer = PointerInput {
                    position: viewport.to_battlefield(Vec2::new(mouse_x, mouse_y)),
                    primary_pressed: is_mouse_button_pressed(MouseButton::Left),
                    secondary_pressed: is_mouse_button_pressed(MouseButton::Right),
                };

                update_scene(pointer, &mut scene);
                draw_scene(&scene, &viewport);

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn draw_scene(scene: &Scene, viewport: &Viewport) {
    draw_battlefield(scene, viewport);
    for base in &scene.bases {
        draw_base(base, viewport);
    }
    for unit in &scene.units {
        draw_unit(unit, viewport);
    }
    for text in &scene.floating_texts {
        let screen = viewport.to_screen(text.position);
        draw_text(
            &text.text,
            screen.x,
            screen.y,
            16.0,
            to_macroquad_color(text.color),
        );
    }
    draw_hud(scene, viewport);
    if let Some(window) = &scene.window {
        draw_window(window, viewport);
    }
    if let Some(spell) = &scene.targeting_spell {
        let anchor = viewport.to_screen(Vec2::new(8.0, 12.0));
        draw_text(
            &format!("Select a target for {spell} (right-click cancels)"),
            anchor.x,
            anchor.y,
            18.0,
            to_macroquad_color(Color::from_rgb_u8(0xff, 0xc1, 0x07)),
        );
    }
    if let Some(outcome) = scene.outcome {
        draw_outcome(outcome, scene, viewport);
    }
}

fn draw_battlefield(scene: &Scene, viewport: &Viewport) {
    let origin = viewport.to_screen(Vec2::ZERO);
    let size = Vec2::new(scene.battlefield.width, scene.battlefield.height) * viewport.scale;
    draw_rectangle(
        origin.x,
        origin.y,
        size.x,
        size.y,
        to_macroquad_color(scene.battlefield.ground_color),
    );
}

fn draw_base(base: &witch_battle_rendering::BasePresentation, viewport: &Viewport) {
    let half = Vec2::new(10.0, 20.0);
    let origin = viewport.to_screen(base.position - half);
    let size = half * 2.0 * viewport.scale;
    draw_rectangle(
        origin.x,
        origin.y,
        size.x,
        size.y,
        to_macroquad_color(base.color),
    );
    draw_bar(
        viewport.to_screen(base.position - Vec2::new(10.0, 26.0)),
        Vec2::new(20.0, 3.0) * viewport.scale,
        base.hp_ratio,
    );
    let label = viewport.to_screen(base.position - Vec2::new(10.0, 30.0));
    draw_text(
        &base.name,
        label.x,
        label.y,
        14.0,
        to_macroquad_color(Color::from_rgb_u8(0xf5, 0xf5, 0xf5)),
    );
}

fn draw_unit(unit: &witch_battle_rendering::UnitPresentation, viewport: &Viewport) {
    let half = Vec2::splat(6.0);
    let origin = viewport.to_screen(unit.position - half);
    let size = half * 2.0 * viewport.scale;
    let color = unit.color.lighten(unit.flash).with_alpha(unit.alpha);
    draw_rectangle(origin.x, origin.y, size.x, size.y, to_macroquad_color(color));
    if unit.buffed {
        draw_rectangle_lines(
            origin.x - 1.0,
            origin.y - 1.0,
            size.x + 2.0,
            size.y + 2.0,
            1.0,
            to_macroquad_color(Color::from_rgb_u8(0xff, 0xc1, 0x07)),
        );
    }
    draw_bar(
        viewport.to_screen(unit.position - Vec2::new(6.0, 10.0)),
        Vec2::new(12.0, 2.0) * viewport.scale,
        unit.hp_ratio,
    );
}

fn draw_bar(origin: Vec2, size: Vec2, ratio: f32) {
    let ratio = ratio.clamp(0.0, 1.0);
    draw_rectangle(
        origin.x,
        origin.y,
        size.x,
        size.y,
        to_macroquad_color(Color::from_rgb_u8(0x32, 0x32, 0x32)),
    );
    draw_rectangle(
        origin.x,
        origin.y,
        size.x * ratio,
        size.y,
        to_macroquad_color(Color::from_rgb_u8(0x57, 0xd4, 0x6b)),
    );
}

fn draw_hud(scene: &Scene, viewport: &Viewport) {
    let anchor = viewport.to_screen(Vec2::new(8.0, scene.battlefield.height - 6.0));
    draw_text(
        &format!("MP {}/{}", scene.mp.current, scene.mp.maximum),
        anchor.x,
        anchor.y,
        16.0,
        to_macroquad_color(Color::from_rgb_u8(0x6f, 0xb7, 0xff)),
    );
    draw_button(&scene.spells_button, "Spells", viewport);
}

fn draw_button(rect: &SceneRect, label: &str, viewport: &Viewport) {
    let origin = viewport.to_screen(rect.origin);
    let size = rect.size * viewport.scale;
    draw_rectangle(
        origin.x,
        origin.y,
        size.x,
        size.y,
        to_macroquad_color(Color::from_rgb_u8(0x46, 0x46, 0x46)),
    );
    draw_text(
        label,
        origin.x + 4.0,
        origin.y + size.y - 4.0,
        14.0,
        to_macroquad_color(Color::from_rgb_u8(0xf5, 0xf5, 0xf5)),
    );
}

fn draw_window(window: &witch_battle_rendering::WindowPresentation, viewport: &Viewport) {
    let origin = viewport.to_screen(window.rect.origin);
    let size = window.rect.size * viewport.scale;
    draw_rectangle(
        origin.x,
        origin.y,
        size.x,
        size.y,
        to_macroquad_color(Color::new(0.1, 0.1, 0.14, 0.95)),
    );
    draw_rectangle_lines(
        origin.x,
        origin.y,
        size.x,
        size.y,
        2.0,
        to_macroquad_color(Color::from_rgb_u8(0xf5, 0xf5, 0xf5)),
    );
    draw_text(
        &window.title,
        origin.x + 6.0,
        origin.y + 14.0,
        16.0,
        to_macroquad_color(Color::from_rgb_u8(0xf5, 0xf5, 0xf5)),
    );
    draw_button(&window.close_rect, "x", viewport);
    for card in &window.cards {
        let card_origin = viewport.to_screen(card.rect.origin);
        let card_size = card.rect.size * viewport.scale;
        let fill = if card.affordable {
            Color::from_rgb_u8(0x2d, 0x3a, 0x55)
        } else {
            Color::from_rgb_u8(0x2a, 0x2a, 0x2a)
        };
        draw_rectangle(
            card_origin.x,
            card_origin.y,
            card_size.x,
            card_size.y,
            to_macroquad_color(fill),
        );
        let text = if card.affordable {
            Color::from_rgb_u8(0xf5, 0xf5, 0xf5)
        } else {
            Color::from_rgb_u8(0x80, 0x80, 0x80)
        };
        draw_text(
            &card.name,
            card_origin.x + 2.0,
            card_origin.y + 12.0,
            12.0,
            to_macroquad_color(text),
        );
        draw_text(
            &format!("{} MP", card.cost),
            card_origin.x + 2.0,
            card_origin.y + 24.0,
            12.0,
            to_macroquad_color(text),
        );
        if !card.description.is_empty() {
            draw_text(
                &card.description,
                card_origin.x + 2.0,
                card_origin.y + card_size.y - 4.0,
                10.0,
                to_macroquad_color(text),
            );
        }
    }
}

fn draw_outcome(outcome: Outcome, scene: &Scene, viewport: &Viewport) {
    let message = match outcome {
        Outcome::Victory => "VICTORY",
        Outcome::Defeat => "DEFEAT",
    };
    let anchor = viewport.to_screen(Vec2::new(
        scene.battlefield.width / 2.0 - 30.0,
        scene.battlefield.height / 2.0,
    ));
    draw_text(
        message,
        anchor.x,
        anchor.y,
        32.0,
        to_macroquad_color(Color::from_rgb_u8(0xff, 0xc1, 0x07)),
    );
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::{DisplayConfig, Viewport};
    use glam::Vec2;

    #[test]
    fn display_config_parses_partial_toml() {
        let config = DisplayConfig::from_toml_str("window_width = 1280\n").expect("parse");
        assert_eq!(config.window_width, 1280);
        assert_eq!(config.window_height, DisplayConfig::default().window_height);
        assert!(config.vsync);
    }

    #[test]
    fn display_config_rejects_unknown_fields() {
        assert!(DisplayConfig::from_toml_str("window_widht = 10\n").is_err());
    }

    #[test]
    fn viewport_round_trips_pointer_positions() {
        let viewport = Viewport::fit(Vec2::new(256.0, 192.0), Vec2::new(1024.0, 768.0));
        let point = Vec2::new(100.0, 50.0);
        let round_tripped = viewport.to_battlefield(viewport.to_screen(point));
        assert!((round_tripped - point).length() < 1e-3);
    }

    #[test]
    fn viewport_letterboxes_wide_screens() {
        let viewport = Viewport::fit(Vec2::new(256.0, 192.0), Vec2::new(2000.0, 768.0));
        let origin = viewport.to_screen(Vec2::ZERO);
        assert!(origin.x > 0.0, "wide screens centre the battlefield");
        assert_eq!(origin.y, 0.0);
    }
}
