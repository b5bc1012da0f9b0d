#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Puzzle Defence adapters.
//!
//! Everything here is expressed on a fixed virtual canvas. Backends scale the
//! canvas uniformly to the window and map pointer input back into canvas
//! units before handing it to the session.

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::{error::Error, fmt};

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

    /// Returns the RGB complement of the color, keeping its alpha.
    #[must_use]
    pub fn inverted(self) -> Self {
        Self {
            red: 1.0 - self.red,
            green: 1.0 - self.green,
            blue: 1.0 - self.blue,
            alpha: self.alpha,
        }
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

    /// Returns the color with its alpha replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Axis-aligned rectangle on the virtual canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle of the given size centred on `center`.
    #[must_use]
    pub fn centered(center: Vec2, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    /// Centre of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Reports whether `point` lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Input snapshot gathered by adapters before updating the scene.
///
/// Pointer coordinates are expressed in virtual canvas units.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Pointer position mapped into the canvas, if the pointer is over it.
    pub pointer: Option<Vec2>,
    /// Whether the primary button went down on this frame.
    pub primary_pressed: bool,
    /// Whether the primary button went up on this frame.
    pub primary_released: bool,
    /// Whether the secondary button went down on this frame.
    pub secondary_pressed: bool,
    /// Whether the pause key was pressed on this frame.
    pub pause_pressed: bool,
    /// Whether the player asked to quit on this frame.
    pub quit_requested: bool,
}

/// Decision returned by the scene update on every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FrameControl {
    /// Keep presenting frames.
    #[default]
    Continue,
    /// Close the window and return from [`RenderingBackend::run`].
    Exit,
}

/// Horizontal placement of a text run relative to its anchor point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextAnchor {
    /// The anchor is the top-left corner of the text.
    #[default]
    TopLeft,
    /// The anchor is the centre of the text.
    Center,
}

/// Text run drawn on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct TextPresentation {
    /// Characters to draw.
    pub text: String,
    /// Anchor point in canvas units.
    pub position: Vec2,
    /// How the text is placed relative to `position`.
    pub anchor: TextAnchor,
    /// Font size in canvas units.
    pub font_size: f32,
    /// Fill colour of the glyphs.
    pub color: Color,
}

impl TextPresentation {
    /// Creates a text run anchored at its top-left corner.
    #[must_use]
    pub fn new<T>(text: T, position: Vec2, font_size: f32, color: Color) -> Self
    where
        T: Into<String>,
    {
        Self {
            text: text.into(),
            position,
            anchor: TextAnchor::TopLeft,
            font_size,
            color,
        }
    }

    /// Creates a text run centred on `position`.
    #[must_use]
    pub fn centered<T>(text: T, position: Vec2, font_size: f32, color: Color) -> Self
    where
        T: Into<String>,
    {
        Self {
            anchor: TextAnchor::Center,
            ..Self::new(text, position, font_size, color)
        }
    }
}

/// Clickable rectangle with a centred label.
#[derive(Clone, Debug, PartialEq)]
pub struct ButtonPresentation {
    /// Area covered by the button.
    pub bounds: Rect,
    /// Fill colour.
    pub fill: Color,
    /// Optional border drawn around the button.
    pub outline: Option<Color>,
    /// Label drawn in the middle of the button.
    pub label: TextPresentation,
}

impl ButtonPresentation {
    /// Creates a button whose label is centred within `bounds`.
    #[must_use]
    pub fn new<T>(bounds: Rect, fill: Color, label: T, font_size: f32, text_color: Color) -> Self
    where
        T: Into<String>,
    {
        Self {
            bounds,
            fill,
            outline: None,
            label: TextPresentation::centered(label, bounds.center(), font_size, text_color),
        }
    }

    /// Adds a border to the button.
    #[must_use]
    pub fn with_outline(mut self, color: Color) -> Self {
        self.outline = Some(color);
        self
    }
}

/// Scene shown by menu screens.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MenuPresentation {
    /// Loose text such as titles and notices.
    pub labels: Vec<TextPresentation>,
    /// Buttons in hit-test order.
    pub buttons: Vec<ButtonPresentation>,
}

/// Filled circle, used for enemies and bullets.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CirclePresentation {
    /// Centre of the circle.
    pub center: Vec2,
    /// Radius of the circle.
    pub radius: f32,
    /// Fill colour.
    pub color: Color,
}

/// Tower drawn as a square with its range outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerPresentation {
    /// Centre of the tower.
    pub center: Vec2,
    /// Half of the side length of the square body.
    pub half_extent: f32,
    /// Body colour.
    pub fill: Color,
    /// Radius of the range outline.
    pub range: f32,
    /// Colour of the range outline.
    pub range_color: Color,
}

/// Polyline enemies walk along.
#[derive(Clone, Debug, PartialEq)]
pub struct PathPresentation {
    /// Waypoints in walking order.
    pub points: Vec<Vec2>,
    /// Stroke thickness.
    pub thickness: f32,
    /// Stroke colour.
    pub color: Color,
}

/// Column of tower buttons along the right edge of the level.
#[derive(Clone, Debug, PartialEq)]
pub struct SidePanelPresentation {
    /// Area covered by the panel.
    pub bounds: Rect,
    /// Background colour of the panel.
    pub fill: Color,
    /// Tower and control buttons.
    pub buttons: Vec<ButtonPresentation>,
}

/// Modal box carrying a question and its options.
#[derive(Clone, Debug, PartialEq)]
pub struct QuestionPanelPresentation {
    /// Area covered by the box.
    pub bounds: Rect,
    /// Background colour of the box.
    pub fill: Color,
    /// Question text.
    pub prompt: TextPresentation,
    /// One button per option in display order.
    pub options: Vec<ButtonPresentation>,
}

/// Dimmed layer drawn over the level with its own menu.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayPresentation {
    /// Translucent colour covering the canvas.
    pub shade: Color,
    /// Heading and notices.
    pub labels: Vec<TextPresentation>,
    /// Overlay buttons.
    pub buttons: Vec<ButtonPresentation>,
}

/// Scene shown while a level is played.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelPresentation {
    /// Enemy path.
    pub path: PathPresentation,
    /// Placed towers.
    pub towers: Vec<TowerPresentation>,
    /// Live enemies.
    pub enemies: Vec<CirclePresentation>,
    /// Bullets in flight.
    pub bullets: Vec<CirclePresentation>,
    /// Tower selection panel.
    pub side_panel: SidePanelPresentation,
    /// Heads-up text such as lives, score and feedback.
    pub hud: Vec<TextPresentation>,
    /// Tower following the pointer while a placement is previewed.
    pub preview: Option<TowerPresentation>,
    /// Pending placement question.
    pub question: Option<QuestionPanelPresentation>,
    /// Pause or outcome overlay.
    pub overlay: Option<OverlayPresentation>,
}

/// Content variants a scene can carry.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneContent {
    /// Menu made of labels and buttons.
    Menu(MenuPresentation),
    /// A level in progress.
    Level(LevelPresentation),
}

/// Scene description drawn on the virtual canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    width: f32,
    height: f32,
    /// Background colour filling the canvas.
    pub background: Color,
    /// Elements drawn on top of the background.
    pub content: SceneContent,
}

impl Scene {
    /// Creates a scene on a `width` by `height` canvas.
    pub fn new(
        width: f32,
        height: f32,
        background: Color,
        content: SceneContent,
    ) -> Result<Self, RenderingError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(RenderingError::InvalidCanvas { width, height });
        }
        Ok(Self {
            width,
            height,
            background,
            content,
        })
    }

    /// Width of the virtual canvas.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Height of the virtual canvas.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.height
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame outside the canvas.
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

/// Rendering backend capable of presenting Puzzle Defence scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the per-frame input
    /// captured by the adapter and rewrites the scene before it is drawn.
    /// Returning [`FrameControl::Exit`] closes the window.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut Scene) -> FrameControl + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The virtual canvas must have a positive area.
    InvalidCanvas {
        /// Requested width.
        width: f32,
        /// Requested height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCanvas { width, height } => {
                write!(f, "canvas must have a positive area (received {width}x{height})")
            }
        }
    }
}

impl Error for RenderingError {}
