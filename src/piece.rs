//! Piece shapes: cell codes, the seven canonical matrices and in-place rotation.

use rand::Rng;

/// Tetromino kinds, in cell-code order (T = 1 .. Z = 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    T,
    O,
    L,
    J,
    I,
    S,
    Z,
}

impl PieceKind {
    pub const ALL: [Self; 7] = [Self::T, Self::O, Self::L, Self::J, Self::I, Self::S, Self::Z];

    /// Colour code written into the arena when this kind locks (1..=7).
    pub fn code(self) -> u8 {
        match self {
            Self::T => 1,
            Self::O => 2,
            Self::L => 3,
            Self::J => 4,
            Self::I => 5,
            Self::S => 6,
            Self::Z => 7,
        }
    }

    #[cfg(test)]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code).checked_sub(1)?).copied()
    }

    /// Uniform draw over the seven kinds. No bag: repeats are allowed.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Fresh copy of this kind's spawn template.
    pub fn matrix(self) -> Matrix {
        let e = Cell::Empty;
        let c = Cell::Block(self);
        let rows = match self {
            Self::T => vec![vec![e, e, e], vec![c, c, c], vec![e, c, e]],
            Self::O => vec![vec![c, c], vec![c, c]],
            Self::L => vec![vec![e, c, e], vec![e, c, e], vec![e, c, c]],
            Self::J => vec![vec![e, c, e], vec![e, c, e], vec![c, c, e]],
            Self::I => vec![
                vec![e, c, e, e],
                vec![e, c, e, e],
                vec![e, c, e, e],
                vec![e, c, e, e],
            ],
            Self::S => vec![vec![e, c, c], vec![c, c, e], vec![e, e, e]],
            Self::Z => vec![vec![c, c, e], vec![e, c, c], vec![e, e, e]],
        };
        Matrix { rows }
    }
}

/// One arena or matrix cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Block(PieceKind),
    Garbage,
}

impl Cell {
    pub const GARBAGE_CODE: u8 = 8;

    /// Small integer code: 0 empty, 1..=7 piece colours, 8 garbage.
    pub fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Block(kind) => kind.code(),
            Self::Garbage => Self::GARBAGE_CODE,
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    pub fn inverse(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }
}

/// Square grid of cells describing the active piece. rows[0] is top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: Vec<Vec<Cell>>,
}

impl Matrix {
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    #[cfg(test)]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Non-empty cells as (column, row, cell).
    pub fn blocks(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| !cell.is_empty())
                .map(move |(x, cell)| (x, y, *cell))
        })
    }

    #[cfg(test)]
    pub fn block_count(&self) -> usize {
        self.blocks().count()
    }

    #[cfg(test)]
    /// Kind of the first block found; templates use a single colour.
    pub fn kind(&self) -> Option<PieceKind> {
        self.blocks().find_map(|(_, _, cell)| match cell {
            Cell::Block(kind) => Some(kind),
            _ => None,
        })
    }

    /// 90° turn: transpose, then mirror rows (clockwise) or flip row order (counter-clockwise).
    pub fn rotate(&mut self, rotation: Rotation) {
        let n = self.rows.len();
        debug_assert!(
            self.rows.iter().all(|row| row.len() == n),
            "piece matrix must be square"
        );
        for y in 0..n {
            for x in 0..y {
                let tmp = self.rows[y][x];
                self.rows[y][x] = self.rows[x][y];
                self.rows[x][y] = tmp;
            }
        }
        match rotation {
            Rotation::Clockwise => self.rows.iter_mut().for_each(|row| row.reverse()),
            Rotation::CounterClockwise => self.rows.reverse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn codes(m: &Matrix) -> Vec<Vec<u8>> {
        m.rows()
            .iter()
            .map(|row| row.iter().map(|c| c.code()).collect())
            .collect()
    }

    #[test]
    fn templates_use_one_colour_and_four_blocks() {
        for kind in PieceKind::ALL {
            let m = kind.matrix();
            assert_eq!(m.width(), m.height(), "{kind:?} must be square");
            assert_eq!(m.block_count(), 4, "{kind:?}");
            assert!(m.blocks().all(|(_, _, c)| c == Cell::Block(kind)));
            assert_eq!(m.kind(), Some(kind));
        }
    }

    #[test]
    fn codes_round_trip_through_kind() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(PieceKind::from_code(0), None);
        assert_eq!(PieceKind::from_code(Cell::GARBAGE_CODE), None);
        assert_eq!(Cell::Garbage.code(), 8);
        assert_eq!(Cell::Empty.code(), 0);
    }

    #[test]
    fn four_turns_restore_every_shape() {
        for kind in PieceKind::ALL {
            for rotation in [Rotation::Clockwise, Rotation::CounterClockwise] {
                let mut m = kind.matrix();
                for _ in 0..4 {
                    m.rotate(rotation);
                    assert_eq!(m.block_count(), 4);
                }
                assert_eq!(m, kind.matrix(), "{kind:?} {rotation:?}");
            }
        }
    }

    #[test]
    fn turn_and_counter_turn_cancel() {
        for kind in PieceKind::ALL {
            let mut m = kind.matrix();
            m.rotate(Rotation::Clockwise);
            m.rotate(Rotation::Clockwise.inverse());
            assert_eq!(m, kind.matrix());
        }
    }

    #[test]
    fn t_turns_clockwise_to_point_left() {
        let mut m = PieceKind::T.matrix();
        m.rotate(Rotation::Clockwise);
        assert_eq!(codes(&m), vec![vec![0, 1, 0], vec![1, 1, 0], vec![0, 1, 0]]);
    }

    #[test]
    fn t_turns_counter_clockwise_to_point_right() {
        let mut m = PieceKind::T.matrix();
        m.rotate(Rotation::CounterClockwise);
        assert_eq!(codes(&m), vec![vec![0, 1, 0], vec![0, 1, 1], vec![0, 1, 0]]);
    }

    #[test]
    fn i_lies_flat_after_one_turn() {
        let mut m = PieceKind::I.matrix();
        m.rotate(Rotation::Clockwise);
        assert_eq!(codes(&m)[1], vec![5, 5, 5, 5]);
        assert!(codes(&m)[0].iter().all(|&c| c == 0));
    }

    #[test]
    fn o_is_rotation_invariant() {
        let mut m = PieceKind::O.matrix();
        m.rotate(Rotation::Clockwise);
        assert_eq!(m, PieceKind::O.matrix());
    }

    #[test]
    fn random_draw_covers_all_kinds() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(PieceKind::random(&mut rng));
        }
        assert_eq!(seen.len(), 7);
    }
}
