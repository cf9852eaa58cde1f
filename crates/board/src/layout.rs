use super::Rng;
use super::seed;
use msr_core::Coord;
use std::collections::HashSet;

/// Deterministic mine placement for one board.
///
/// Derived entirely from `(width, height, mines, seed)`: the safe-start
/// cell is drawn first (interior when the board permits), then mines are
/// drawn by rejection sampling over cell indices, excluding the safe cell
/// and its 8-neighborhood.
#[derive(Debug, Clone)]
pub struct Layout {
    width: Coord,
    height: Coord,
    safe: (Coord, Coord),
    mines: HashSet<(Coord, Coord)>,
}

impl Layout {
    pub fn generate(width: Coord, height: Coord, mines: u16, seed: &str) -> Self {
        let cells = width as i64 * height as i64;
        let mines = (mines as i64).min(cells - 1) as u16;
        let mut rng = Rng::new(seed::fold(seed));
        let safe = Self::draw_safe(width, height, &mut rng);
        // The 3x3 exclusion shrinks to the safe cell alone when the board
        // cannot spare nine clear cells.
        let excluded: HashSet<(Coord, Coord)> = if cells - 9 >= mines as i64 {
            Self::neighborhood(safe, width, height).collect()
        } else {
            std::iter::once(safe).collect()
        };
        let mut placed = HashSet::new();
        while placed.len() < mines as usize {
            let index = rng.below(cells as u64) as i64;
            let cell = ((index % width as i64) as Coord, (index / width as i64) as Coord);
            if excluded.contains(&cell) || placed.contains(&cell) {
                continue;
            }
            placed.insert(cell);
        }
        Self {
            width,
            height,
            safe,
            mines: placed,
        }
    }
    /// The required first-revealed cell, fixed at create time.
    fn draw_safe(width: Coord, height: Coord, rng: &mut Rng) -> (Coord, Coord) {
        let x = if width < 3 {
            rng.below(width.max(1) as u64) as Coord
        } else {
            1 + rng.below(width as u64 - 2) as Coord
        };
        let y = if height < 3 {
            rng.below(height.max(1) as u64) as Coord
        } else {
            1 + rng.below(height as u64 - 2) as Coord
        };
        (x, y)
    }
    /// A cell plus its in-bounds 8-neighborhood.
    fn neighborhood(
        (cx, cy): (Coord, Coord),
        width: Coord,
        height: Coord,
    ) -> impl Iterator<Item = (Coord, Coord)> {
        (-1..=1).flat_map(move |dy| {
            (-1..=1).filter_map(move |dx| {
                let (x, y) = (cx + dx, cy + dy);
                (x >= 0 && x < width && y >= 0 && y < height).then_some((x, y))
            })
        })
    }
}

impl Layout {
    pub fn width(&self) -> Coord {
        self.width
    }
    pub fn height(&self) -> Coord {
        self.height
    }
    pub fn safe_start(&self) -> (Coord, Coord) {
        self.safe
    }
    pub fn mines(&self) -> usize {
        self.mines.len()
    }
    /// Total non-mine cells; a fully cleared board reveals exactly this many.
    pub fn safes(&self) -> usize {
        (self.width as usize * self.height as usize) - self.mines.len()
    }
    pub fn contains(&self, x: Coord, y: Coord) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }
    pub fn is_mine(&self, x: Coord, y: Coord) -> bool {
        self.mines.contains(&(x, y))
    }
    pub fn adjacent_mines(&self, x: Coord, y: Coord) -> u8 {
        Self::neighborhood((x, y), self.width, self.height)
            .filter(|&(nx, ny)| (nx, ny) != (x, y))
            .filter(|&(nx, ny)| self.is_mine(nx, ny))
            .count() as u8
    }
    pub fn neighbors(&self, x: Coord, y: Coord) -> impl Iterator<Item = (Coord, Coord)> {
        Self::neighborhood((x, y), self.width, self.height)
            .filter(move |&(nx, ny)| (nx, ny) != (x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn identical_tuple_identical_layout() {
        let a = Layout::generate(9, 9, 10, "seedseedseed");
        let b = Layout::generate(9, 9, 10, "seedseedseed");
        assert_eq!(a.safe_start(), b.safe_start());
        assert_eq!(a.mines, b.mines);
    }
    #[test]
    fn different_seed_different_layout() {
        let a = Layout::generate(20, 20, 99, "aaaaaaaaaaaa");
        let b = Layout::generate(20, 20, 99, "bbbbbbbbbbbb");
        assert!(a.safe_start() != b.safe_start() || a.mines != b.mines);
    }
    #[test]
    fn exact_mine_count() {
        let layout = Layout::generate(20, 20, 99, "countingseed");
        assert_eq!(layout.mines(), 99);
        assert_eq!(layout.safes(), 400 - 99);
    }
    #[test]
    fn safe_start_is_interior() {
        for seed in ["one", "two", "three", "four", "five"] {
            let layout = Layout::generate(9, 9, 10, seed);
            let (x, y) = layout.safe_start();
            assert!(x >= 1 && x < 8, "x={}", x);
            assert!(y >= 1 && y < 8, "y={}", y);
        }
    }
    #[test]
    fn safe_neighborhood_is_clear() {
        for seed in ["alpha", "beta", "gamma", "delta"] {
            let layout = Layout::generate(9, 9, 10, seed);
            let (sx, sy) = layout.safe_start();
            assert!(!layout.is_mine(sx, sy));
            for (nx, ny) in layout.neighbors(sx, sy).collect::<Vec<_>>() {
                assert!(!layout.is_mine(nx, ny), "mine at ({}, {})", nx, ny);
            }
            assert_eq!(layout.adjacent_mines(sx, sy), 0);
        }
    }
    #[test]
    fn dense_board_still_generates() {
        // 3x3 with 7 mines cannot spare a nine-cell exclusion zone.
        let layout = Layout::generate(3, 3, 7, "denseboard");
        assert_eq!(layout.mines(), 7);
        let (sx, sy) = layout.safe_start();
        assert!(!layout.is_mine(sx, sy));
    }
    #[test]
    fn adjacency_counts_mines_only() {
        let layout = Layout::generate(9, 9, 10, "adjacency");
        for y in 0..9 {
            for x in 0..9 {
                assert!(layout.adjacent_mines(x, y) <= 8);
            }
        }
    }
}
