use puzzle_defence_core::{EnemyVariant, TowerKind};
use puzzle_defence_rendering::Color;
use puzzle_defence_settings::Settings;

/// Colour scheme honouring the invert-colours preference.
///
/// With inversion enabled every colour is replaced by its RGB complement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    invert: bool,
}

impl Palette {
    /// Creates a palette with inversion switched on or off.
    #[must_use]
    pub const fn new(invert: bool) -> Self {
        Self { invert }
    }

    /// Creates the palette matching the persisted preference.
    #[must_use]
    pub const fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.invert_colors)
    }

    /// Reports whether colours are inverted.
    #[must_use]
    pub const fn is_inverted(&self) -> bool {
        self.invert
    }

    fn paint(self, red: u8, green: u8, blue: u8) -> Color {
        let color = Color::from_rgb_u8(red, green, blue);
        if self.invert {
            color.inverted()
        } else {
            color
        }
    }

    /// Canvas background.
    #[must_use]
    pub fn background(self) -> Color {
        self.paint(30, 30, 30)
    }

    /// Text and outlines.
    #[must_use]
    pub fn foreground(self) -> Color {
        self.paint(255, 255, 255)
    }

    /// Side menu and generic buttons.
    #[must_use]
    pub fn panel(self) -> Color {
        self.paint(50, 50, 80)
    }

    /// Enemy path stroke.
    #[must_use]
    pub fn path(self) -> Color {
        self.paint(0, 255, 0)
    }

    /// Tower range outline.
    #[must_use]
    pub fn range(self) -> Color {
        self.paint(100, 100, 255)
    }

    /// Body colour of an enemy variant.
    #[must_use]
    pub fn enemy(self, variant: EnemyVariant) -> Color {
        match variant {
            EnemyVariant::Basic => self.paint(255, 0, 0),
            EnemyVariant::Fast => self.paint(255, 140, 0),
            EnemyVariant::Durable => self.paint(150, 0, 200),
        }
    }

    /// Bullet body.
    #[must_use]
    pub fn bullet(self) -> Color {
        self.paint(255, 255, 0)
    }

    /// Body colour of a tower kind.
    #[must_use]
    pub fn tower(self, kind: TowerKind) -> Color {
        match kind {
            TowerKind::Slow => self.paint(0, 0, 200),
            TowerKind::Pulse => self.paint(200, 0, 0),
            TowerKind::Sniper => self.paint(0, 180, 0),
            TowerKind::Rapid => self.paint(200, 200, 0),
        }
    }

    /// Unavailable buttons, such as locked levels or cooling tower kinds.
    #[must_use]
    pub fn disabled(self) -> Color {
        self.paint(100, 100, 100)
    }

    /// Playable level buttons.
    #[must_use]
    pub fn unlocked(self) -> Color {
        self.paint(0, 200, 0)
    }

    /// Warnings such as "Locked" and placement feedback.
    #[must_use]
    pub fn warning(self) -> Color {
        self.paint(255, 0, 0)
    }

    /// Back navigation.
    #[must_use]
    pub fn back(self) -> Color {
        self.paint(255, 255, 0)
    }

    /// Translucent layer drawn under overlays.
    #[must_use]
    pub fn shade(self) -> Color {
        self.paint(0, 0, 0).with_alpha(0.6)
    }
}
