#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Lily Hop adapters.
//!
//! A [`Scene`] is a declarative description of one frame derived from a
//! [`GameSnapshot`]. Backends decide how to draw it; the text backend shipped
//! here writes one glyph per cell followed by a status line.

use anyhow::Result as AnyResult;
use glam::Vec2;
use lily_hop_core::{GameSnapshot, Grid, Leaf, Position, SessionStatus};
use std::{error::Error, fmt, io::Write};

/// Glyph drawn for the bird.
pub const BIRD_GLYPH: char = '@';
/// Glyph drawn for a leaf carrying food.
pub const FOOD_GLYPH: char = '*';
/// Glyph drawn for open water where a leaf has sunk.
pub const WATER_GLYPH: char = '~';

/// Largest share of a cell a full-height leaf covers.
const LEAF_COVERAGE: f32 = 0.8;
/// Opacity of the lowest visible leaf; full leaves are fully opaque.
const LEAF_BASE_OPACITY: f32 = 0.8;

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
    /// Creates an opaque color from normalized RGB channels.
    #[must_use]
    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }

    /// Returns the same color with the provided alpha.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Palette shared by graphical backends.
pub mod palette {
    use super::Color;

    /// Pond background.
    pub const WATER: Color = Color::rgb(0.23, 0.51, 0.96);
    /// Leaf body.
    pub const LEAF: Color = Color::rgb(0.13, 0.77, 0.37);
    /// Food dot drawn on top of a leaf.
    pub const FOOD: Color = Color::rgb(0.98, 0.8, 0.08);
    /// Bird body.
    pub const BIRD: Color = Color::rgb(0.98, 0.45, 0.09);
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Cells must have a positive, finite edge length.
    InvalidCellLength {
        /// Provided length that failed validation.
        cell_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCellLength { cell_length } => {
                write!(
                    f,
                    "cell_length must be positive and finite (received {cell_length})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

/// Maps grid cells onto a world-space surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Grid being presented.
    pub grid: Grid,
    /// Edge length of a single cell in world units.
    pub cell_length: f32,
}

impl GridPresentation {
    /// Creates a new grid descriptor.
    ///
    /// Returns an error when `cell_length` is not a positive finite number.
    pub fn new(grid: Grid, cell_length: f32) -> Result<Self, RenderingError> {
        if !cell_length.is_finite() || cell_length <= 0.0 {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self { grid, cell_length })
    }

    /// Total edge length of the square grid.
    #[must_use]
    pub fn side_length(&self) -> f32 {
        self.grid.side() as f32 * self.cell_length
    }

    /// World-space center of the provided cell.
    #[must_use]
    pub fn cell_center(&self, position: Position) -> Vec2 {
        Vec2::new(position.x() as f32 + 0.5, position.y() as f32 + 0.5) * self.cell_length
    }

    /// Resolves a world-space point, such as a pointer or touch, to the cell beneath it.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> Option<Position> {
        if point.x < 0.0 || point.y < 0.0 {
            return None;
        }

        let cell = (point / self.cell_length).floor();
        let position = Position::new(cell.x as u32, cell.y as u32);
        self.grid.contains(position).then_some(position)
    }
}

/// Visual description of a single cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellPresentation {
    /// Grid position of the cell.
    pub position: Position,
    /// World-space center of the cell.
    pub center: Vec2,
    /// Leaf occupying the cell.
    pub leaf: Leaf,
    /// Radius of the leaf disc. Zero when the leaf has sunk.
    pub leaf_radius: f32,
    /// Leaf color including height-dependent opacity.
    pub leaf_color: Color,
    /// Whether the bird stands on this cell.
    pub has_bird: bool,
}

impl CellPresentation {
    /// Glyph representing the cell in text output.
    #[must_use]
    pub fn glyph(&self) -> char {
        if self.has_bird {
            BIRD_GLYPH
        } else if self.leaf.is_sunk() {
            WATER_GLYPH
        } else if self.leaf.has_food() {
            FOOD_GLYPH
        } else {
            char::from_digit(u32::from(self.leaf.height()), 10).unwrap_or('#')
        }
    }
}

/// Heads-up display values shown alongside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hud {
    /// Score accumulated during the session.
    pub score: u32,
    /// Lives left in the session.
    pub lives: u32,
    /// Number of turns processed.
    pub turn: u64,
    /// Lifecycle state of the session.
    pub status: SessionStatus,
}

impl Hud {
    /// Single-line summary of the HUD.
    #[must_use]
    pub fn line(&self) -> String {
        format!(
            "Score: {}  Lives: {}  Turn: {}  [{}]",
            self.score,
            "♥".repeat(self.lives as usize),
            self.turn,
            status_label(self.status)
        )
    }

    /// Modal message the presentation should overlay for the current status.
    #[must_use]
    pub fn overlay(&self) -> Option<String> {
        match self.status {
            SessionStatus::StartScreen => {
                Some("Jump from leaf to leaf to survive! Press start.".to_string())
            }
            SessionStatus::Playing => None,
            SessionStatus::LifeLost => Some(format!(
                "Life lost! Lives remaining: {}. Continue?",
                self.lives
            )),
            SessionStatus::GameOver => Some(format!("Game over. Final score: {}", self.score)),
        }
    }
}

fn status_label(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::StartScreen => "start",
        SessionStatus::Playing => "playing",
        SessionStatus::LifeLost => "life lost",
        SessionStatus::GameOver => "game over",
    }
}

/// Declarative description of a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Layout the cells are positioned with.
    pub layout: GridPresentation,
    /// Cells in row-major order.
    pub cells: Vec<CellPresentation>,
    /// HUD values.
    pub hud: Hud,
}

impl Scene {
    /// Builds a scene from a snapshot using the provided layout.
    #[must_use]
    pub fn from_snapshot(snapshot: &GameSnapshot, layout: GridPresentation) -> Self {
        let max_level = f32::from(snapshot.max_level.max(1));
        let cells = snapshot
            .cells()
            .map(|(position, leaf)| {
                let share = f32::from(leaf.height()).min(max_level) / max_level;
                let opacity = if leaf.is_sunk() {
                    0.0
                } else {
                    LEAF_BASE_OPACITY + share * (1.0 - LEAF_BASE_OPACITY)
                };
                CellPresentation {
                    position,
                    center: layout.cell_center(position),
                    leaf,
                    leaf_radius: share * LEAF_COVERAGE * layout.cell_length * 0.5,
                    leaf_color: palette::LEAF.with_alpha(opacity),
                    has_bird: position == snapshot.bird,
                }
            })
            .collect();

        Self {
            layout,
            cells,
            hud: Hud {
                score: snapshot.score,
                lives: snapshot.lives,
                turn: snapshot.turn,
                status: snapshot.status,
            },
        }
    }

    /// Renders the grid as text, one row per line, followed by the HUD.
    #[must_use]
    pub fn to_text(&self) -> String {
        let side = self.layout.grid.side() as usize;
        let mut text = String::with_capacity(self.cells.len() * 2 + 64);
        for row in self.cells.chunks(side.max(1)) {
            let line: Vec<String> = row.iter().map(|cell| cell.glyph().to_string()).collect();
            text.push_str(&line.join(" "));
            text.push('\n');
        }
        text.push_str(&self.hud.line());
        text.push('\n');
        if let Some(overlay) = self.hud.overlay() {
            text.push_str(&overlay);
            text.push('\n');
        }
        text
    }
}

/// Rendering backend capable of presenting scenes.
pub trait RenderingBackend {
    /// Presents a single frame.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Backend that writes text frames into any writer.
#[derive(Debug)]
pub struct TextBackend<W> {
    writer: W,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend writing into `writer`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Unwraps the writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn present(&mut self, scene: &Scene) -> AnyResult<()> {
        self.writer.write_all(scene.to_text().as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
