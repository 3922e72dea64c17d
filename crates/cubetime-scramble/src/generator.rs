//! Random-move scramble generation.
//!
//! Each puzzle kind has a fixed move count and its own notation. Moves are
//! drawn from a seeded [`MoveRng`], so a given seed always produces the same
//! sequence of scrambles.
//!
//! Consecutive cube moves never waste a turn: a move is rejected when an
//! earlier move in the current same-axis run already turned that layer
//! (`R R'`, `R L R`). Pyraminx, skewb and megaminx never repeat a face
//! back to back.

use std::fmt;
use std::str::FromStr;

use crate::rng::MoveRng;

/// A scramble could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScrambleError {
    #[error("unknown puzzle kind {0:?}")]
    UnknownPuzzle(String),
}

/// Puzzles the generator knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PuzzleKind {
    /// An N×N×N cube, N in 2..=7.
    Cube(u8),
    Pyraminx,
    Skewb,
    Megaminx,
}

impl PuzzleKind {
    pub const ALL: [PuzzleKind; 9] = [
        PuzzleKind::Cube(2),
        PuzzleKind::Cube(3),
        PuzzleKind::Cube(4),
        PuzzleKind::Cube(5),
        PuzzleKind::Cube(6),
        PuzzleKind::Cube(7),
        PuzzleKind::Pyraminx,
        PuzzleKind::Skewb,
        PuzzleKind::Megaminx,
    ];

    /// Random moves per scramble, excluding pyraminx tips.
    pub fn move_count(self) -> usize {
        match self {
            PuzzleKind::Cube(2) => 11,
            PuzzleKind::Cube(3) => 25,
            PuzzleKind::Cube(4) => 40,
            PuzzleKind::Cube(5) => 60,
            PuzzleKind::Cube(6) => 80,
            PuzzleKind::Cube(_) => 100,
            PuzzleKind::Pyraminx | PuzzleKind::Skewb => 11,
            PuzzleKind::Megaminx => MINX_ROWS * (MINX_ROW_TURNS + 1),
        }
    }
}

impl FromStr for PuzzleKind {
    type Err = ScrambleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "222" => Ok(PuzzleKind::Cube(2)),
            "333" => Ok(PuzzleKind::Cube(3)),
            "444" => Ok(PuzzleKind::Cube(4)),
            "555" => Ok(PuzzleKind::Cube(5)),
            "666" => Ok(PuzzleKind::Cube(6)),
            "777" => Ok(PuzzleKind::Cube(7)),
            "pyram" => Ok(PuzzleKind::Pyraminx),
            "skewb" => Ok(PuzzleKind::Skewb),
            "minx" => Ok(PuzzleKind::Megaminx),
            other => Err(ScrambleError::UnknownPuzzle(other.to_string())),
        }
    }
}

impl fmt::Display for PuzzleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PuzzleKind::Cube(n) => write!(f, "{n}{n}{n}"),
            PuzzleKind::Pyraminx => f.write_str("pyram"),
            PuzzleKind::Skewb => f.write_str("skewb"),
            PuzzleKind::Megaminx => f.write_str("minx"),
        }
    }
}

// ---------------------------------------------------------------------------
// Notation tables
// ---------------------------------------------------------------------------

/// Faces in axis pairs: index / 2 is the axis.
const CUBE_FACES: [&str; 6] = ["U", "D", "L", "R", "F", "B"];
/// The 2x2x2 only turns one face per axis.
const POCKET_FACES: [&str; 3] = ["U", "R", "F"];
const CUBE_SUFFIXES: [&str; 3] = ["", "'", "2"];

const PYRAMINX_FACES: [&str; 4] = ["U", "L", "R", "B"];
const PYRAMINX_TIPS: [&str; 4] = ["u", "l", "r", "b"];
const SKEWB_FACES: [&str; 4] = ["R", "U", "L", "B"];
const PRIME_SUFFIXES: [&str; 2] = ["", "'"];

const MINX_ROWS: usize = 7;
const MINX_ROW_TURNS: usize = 10;
/// Row separator in megaminx scrambles.
pub const MINX_ROW_BREAK: &str = "<br>";

/// One cube layer turn, before notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LayerTurn {
    face: usize,
    depth: u8,
}

impl LayerTurn {
    fn axis(self, pocket: bool) -> usize {
        if pocket { self.face } else { self.face / 2 }
    }

    fn notation(self, faces: &[&str], suffix: &str) -> String {
        let face = faces[self.face];
        match self.depth {
            1 => format!("{face}{suffix}"),
            2 => format!("{face}w{suffix}"),
            d => format!("{d}{face}w{suffix}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Seeded random-move scramble generator.
#[derive(Debug, Clone)]
pub struct Generator {
    rng: MoveRng,
}

impl Generator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: MoveRng::new(seed),
        }
    }

    /// Scramble for a generator puzzle-kind string such as `"333"`.
    pub fn generate(&mut self, puzzle_kind: &str) -> Result<String, ScrambleError> {
        let kind: PuzzleKind = puzzle_kind.parse()?;
        Ok(self.scramble(kind))
    }

    pub fn scramble(&mut self, kind: PuzzleKind) -> String {
        match kind {
            PuzzleKind::Cube(n) => self.cube(n, kind.move_count()),
            PuzzleKind::Pyraminx => self.pyraminx(kind.move_count()),
            PuzzleKind::Skewb => self.faces_only(&SKEWB_FACES, kind.move_count()),
            PuzzleKind::Megaminx => self.megaminx(),
        }
    }

    fn cube(&mut self, n: u8, moves: usize) -> String {
        let pocket = n == 2;
        let faces: &[&str] = if pocket { &POCKET_FACES } else { &CUBE_FACES };
        let max_depth = (n / 2).max(1);

        let mut out = Vec::with_capacity(moves);
        // Layers already turned in the current run of same-axis moves.
        let mut run: Vec<LayerTurn> = Vec::new();
        while out.len() < moves {
            let turn = LayerTurn {
                face: self.rng.below(faces.len()),
                depth: 1 + self.rng.below(usize::from(max_depth)) as u8,
            };
            let same_axis = run
                .last()
                .is_some_and(|prev| prev.axis(pocket) == turn.axis(pocket));
            if same_axis && run.contains(&turn) {
                continue;
            }
            if !same_axis {
                run.clear();
            }
            run.push(turn);
            let suffix = CUBE_SUFFIXES[self.rng.below(CUBE_SUFFIXES.len())];
            out.push(turn.notation(faces, suffix));
        }
        out.join(" ")
    }

    fn faces_only(&mut self, faces: &[&str], moves: usize) -> String {
        let mut out = Vec::with_capacity(moves);
        let mut last = None;
        while out.len() < moves {
            let face = self.rng.below(faces.len());
            if last == Some(face) {
                continue;
            }
            last = Some(face);
            let suffix = PRIME_SUFFIXES[self.rng.below(PRIME_SUFFIXES.len())];
            out.push(format!("{}{suffix}", faces[face]));
        }
        out.join(" ")
    }

    fn pyraminx(&mut self, moves: usize) -> String {
        let mut scramble = self.faces_only(&PYRAMINX_FACES, moves);
        for tip in PYRAMINX_TIPS {
            match self.rng.below(3) {
                0 => {}
                1 => {
                    scramble.push(' ');
                    scramble.push_str(tip);
                }
                _ => {
                    scramble.push(' ');
                    scramble.push_str(tip);
                    scramble.push('\'');
                }
            }
        }
        scramble
    }

    fn megaminx(&mut self) -> String {
        let rows: Vec<String> = (0..MINX_ROWS)
            .map(|_| {
                let mut row = Vec::with_capacity(MINX_ROW_TURNS + 1);
                for i in 0..MINX_ROW_TURNS {
                    let face = if i % 2 == 0 { "R" } else { "D" };
                    let turn = if self.rng.coin() { "++" } else { "--" };
                    row.push(format!("{face}{turn}"));
                }
                row.push(if self.rng.coin() { "U" } else { "U'" }.to_string());
                row.join(" ")
            })
            .collect();
        rows.join(MINX_ROW_BREAK)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
