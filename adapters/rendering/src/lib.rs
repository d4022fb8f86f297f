#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Witch Battle adapters.
//!
//! The simulation populates a [`Scene`] from world queries every frame;
//! backends draw it and report pointer input back. Nothing in here mutates
//! simulation state.

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{error::Error, fmt};
use witch_battle_core::{Attribute, Outcome, TextColor};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the color with its alpha channel replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Maps an elemental attribute to its presentation color.
#[must_use]
pub const fn attribute_color(attribute: Attribute) -> Color {
    match attribute {
        Attribute::Fire => Color::from_rgb_u8(0xc8, 0x2a, 0x36),
        Attribute::Ice => Color::from_rgb_u8(0x4d, 0x9e, 0xe8),
        Attribute::Nature => Color::from_rgb_u8(0x2f, 0x95, 0x32),
        Attribute::Neutral => Color::from_rgb_u8(0x9a, 0x9a, 0x9a),
    }
}

/// Maps a floating-text color family to its presentation color.
#[must_use]
pub const fn text_color(color: TextColor) -> Color {
    match color {
        TextColor::Damage => Color::from_rgb_u8(0xe8, 0x4a, 0x4a),
        TextColor::Heal => Color::from_rgb_u8(0x57, 0xd4, 0x6b),
        TextColor::Buff => Color::from_rgb_u8(0xff, 0xc1, 0x07),
        TextColor::Info => Color::from_rgb_u8(0xf5, 0xf5, 0xf5),
    }
}

/// Pointer snapshot gathered by a backend before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PointerInput {
    /// Pointer position expressed in battlefield units.
    pub position: Vec2,
    /// Whether the primary button was pressed on this frame (edge).
    pub primary_pressed: bool,
    /// Whether the secondary button was pressed on this frame (edge).
    pub secondary_pressed: bool,
}

/// Axis-aligned rectangle expressed in battlefield units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneRect {
    /// Top-left corner.
    pub origin: Vec2,
    /// Width and height extents.
    pub size: Vec2,
}

impl SceneRect {
    /// Creates a new rectangle from its corner and extents.
    #[must_use]
    pub const fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderingError {
    /// Battlefield extents must both be positive.
    InvalidBattlefieldSize {
        /// Provided width that failed validation.
        width: f32,
        /// Provided height that failed validation.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBattlefieldSize { width, height } => {
                write!(
                    f,
                    "battlefield extents must be positive (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

/// Describes the battlefield plane backends scale to the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BattlefieldPresentation {
    /// Horizontal extent in battlefield units.
    pub width: f32,
    /// Vertical extent in battlefield units.
    pub height: f32,
    /// Solid color drawn underneath everything else.
    pub ground_color: Color,
}

impl BattlefieldPresentation {
    /// Creates a new battlefield descriptor.
    ///
    /// Returns an error when either extent is not positive.
    pub fn new(width: f32, height: f32, ground_color: Color) -> Result<Self, RenderingError> {
        if width <= 0.0 || height <= 0.0 {
            return Err(RenderingError::InvalidBattlefieldSize { width, height });
        }
        Ok(Self {
            width,
            height,
            ground_color,
        })
    }
}

/// Immutable snapshot describing a base drawn at a battlefield edge.
#[derive(Clone, Debug, PartialEq)]
pub struct BasePresentation {
    /// Anchor position of the base in battlefield units.
    pub position: Vec2,
    /// Display name of the defending witch.
    pub name: String,
    /// Fill color derived from the witch's attribute.
    pub color: Color,
    /// Remaining HP as a ratio in the range 0.0..=1.0.
    pub hp_ratio: f32,
}

/// Immutable snapshot describing a unit drawn on the battlefield.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitPresentation {
    /// Centre position of the unit in battlefield units.
    pub position: Vec2,
    /// Fill color derived from the unit's attribute.
    pub color: Color,
    /// Opacity in the range 0.0..=1.0, below one during spawn fade-in.
    pub alpha: f32,
    /// Damage-flash intensity in the range 0.0..=1.0.
    pub flash: f32,
    /// Remaining HP as a ratio in the range 0.0..=1.0.
    pub hp_ratio: f32,
    /// Whether the unit currently carries an active buff.
    pub buffed: bool,
}

/// Floating combat text drawn above a unit.
#[derive(Clone, Debug, PartialEq)]
pub struct TextPresentation {
    /// Anchor position in battlefield units.
    pub position: Vec2,
    /// Text to draw.
    pub text: String,
    /// Color including the fade-out alpha.
    pub color: Color,
}

/// Candidate card drawn inside an open modal window.
#[derive(Clone, Debug, PartialEq)]
pub struct CardPresentation {
    /// Hit region of the card.
    pub rect: SceneRect,
    /// Display name drawn on the card.
    pub name: String,
    /// MP cost drawn under the name.
    pub cost: u32,
    /// Greyed out when the pool cannot cover the cost.
    pub affordable: bool,
    /// Tooltip line, empty for summon cards.
    pub description: String,
}

/// Modal window overlay with its snapshotted candidate cards.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowPresentation {
    /// Bounding rectangle of the window panel.
    pub rect: SceneRect,
    /// Title drawn in the panel header.
    pub title: String,
    /// Close-button hit region.
    pub close_rect: SceneRect,
    /// Cards laid out in the panel.
    pub cards: Vec<CardPresentation>,
}

/// Player resource readout drawn in the HUD.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MpPresentation {
    /// MP currently available.
    pub current: u32,
    /// Upper bound of the pool.
    pub maximum: u32,
}

impl MpPresentation {
    /// Fill ratio of the pool in the range 0.0..=1.0.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        if self.maximum == 0 {
            return 0.0;
        }
        (self.current as f32 / self.maximum as f32).clamp(0.0, 1.0)
    }
}

/// Scene description rendered by backends each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Battlefield plane everything is drawn onto.
    pub battlefield: BattlefieldPresentation,
    /// Bases at either edge of the battlefield.
    pub bases: Vec<BasePresentation>,
    /// Units currently visible.
    pub units: Vec<UnitPresentation>,
    /// Floating combat text in flight.
    pub floating_texts: Vec<TextPresentation>,
    /// Player resource readout.
    pub mp: MpPresentation,
    /// Bottom-bar spells button hit region.
    pub spells_button: SceneRect,
    /// Open modal window, if any.
    pub window: Option<WindowPresentation>,
    /// Name of the spell awaiting a target, shown as a banner.
    pub targeting_spell: Option<String>,
    /// Latched match outcome, shown as a full-screen banner.
    pub outcome: Option<Outcome>,
}

impl Scene {
    /// Creates an empty scene over the provided battlefield.
    #[must_use]
    pub fn new(battlefield: BattlefieldPresentation, spells_button: SceneRect) -> Self {
        Self {
            battlefield,
            bases: Vec::new(),
            units: Vec::new(),
            floating_texts: Vec::new(),
            mp: MpPresentation {
                current: 0,
                maximum: 0,
            },
            spells_button,
            window: None,
            targeting_spell: None,
            outcome: None,
        }
    }
}

/// Top-level presentation descriptor handed to a backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Contract implemented by rendering backends.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the pointer input
    /// captured by the backend and may mutate the scene before it is drawn,
    /// which is how the simulation publishes each frame's state.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(PointerInput, &mut Scene) + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(0, 0, 0).lighten(0.5);
        assert!((color.red - 0.5).abs() < f32::EPSILON);
        assert!((color.alpha - 1.0).abs() < f32::EPSILON);
        let clamped = Color::from_rgb_u8(10, 20, 30).lighten(2.0);
        assert!((clamped.red - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn battlefield_rejects_non_positive_extents() {
        let color = Color::from_rgb_u8(0, 0, 0);
        assert!(BattlefieldPresentation::new(0.0, 10.0, color).is_err());
        assert!(BattlefieldPresentation::new(10.0, -1.0, color).is_err());
        assert!(BattlefieldPresentation::new(256.0, 192.0, color).is_ok());
    }

    #[test]
    fn mp_ratio_clamps_and_handles_zero_max() {
        let empty = MpPresentation {
            current: 10,
            maximum: 0,
        };
        assert_eq!(empty.ratio(), 0.0);
        let over = MpPresentation {
            current: 150,
            maximum: 100,
        };
        assert_eq!(over.ratio(), 1.0);
    }
}
