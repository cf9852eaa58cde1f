use super::Layout;
use msr_core::Coord;
use std::collections::HashSet;

/// Reveal-only replay of a step log over a [`Layout`].
///
/// Flags are ignored; `chord` expands the 8-neighborhood of an
/// already-revealed numbered cell with the same flood rule clients use.
/// Revealing a mine marks the sweep blown but keeps every prior reveal,
/// so `cleared()` remains the ranking key for losing seats.
#[derive(Debug, Clone)]
pub struct Sweep<'a> {
    layout: &'a Layout,
    revealed: HashSet<(Coord, Coord)>,
    blown: bool,
}

impl<'a> Sweep<'a> {
    pub fn new(layout: &'a Layout) -> Self {
        Self {
            layout,
            revealed: HashSet::new(),
            blown: false,
        }
    }
    /// Revealed non-mine cells so far.
    pub fn cleared(&self) -> usize {
        self.revealed.len()
    }
    pub fn blown(&self) -> bool {
        self.blown
    }
    /// Whether every non-mine cell is revealed.
    pub fn solved(&self) -> bool {
        !self.blown && self.cleared() == self.layout.safes()
    }
    pub fn reveal(&mut self, x: Coord, y: Coord) {
        if !self.layout.contains(x, y) || self.revealed.contains(&(x, y)) {
            return;
        }
        if self.layout.is_mine(x, y) {
            self.blown = true;
            return;
        }
        let mut frontier = vec![(x, y)];
        while let Some((cx, cy)) = frontier.pop() {
            if !self.revealed.insert((cx, cy)) {
                continue;
            }
            if self.layout.adjacent_mines(cx, cy) == 0 {
                frontier.extend(
                    self.layout
                        .neighbors(cx, cy)
                        .filter(|&(nx, ny)| !self.layout.is_mine(nx, ny))
                        .filter(|cell| !self.revealed.contains(cell)),
                );
            }
        }
    }
    /// Open the 8-neighborhood of a revealed numbered cell.
    pub fn chord(&mut self, x: Coord, y: Coord) {
        if !self.revealed.contains(&(x, y)) || self.layout.adjacent_mines(x, y) == 0 {
            return;
        }
        for (nx, ny) in self.layout.neighbors(x, y).collect::<Vec<_>>() {
            if self.layout.is_mine(nx, ny) {
                self.blown = true;
            } else {
                self.reveal(nx, ny);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Layout;

    fn layout() -> Layout {
        Layout::generate(9, 9, 10, "sweeptestseed")
    }

    #[test]
    fn safe_start_reveal_floods() {
        let layout = layout();
        let mut sweep = Sweep::new(&layout);
        let (sx, sy) = layout.safe_start();
        sweep.reveal(sx, sy);
        // The safe cell has zero adjacency, so at least its neighborhood opens.
        assert!(sweep.cleared() >= 9);
        assert!(!sweep.blown());
    }
    #[test]
    fn reveal_is_idempotent() {
        let layout = layout();
        let mut sweep = Sweep::new(&layout);
        let (sx, sy) = layout.safe_start();
        sweep.reveal(sx, sy);
        let cleared = sweep.cleared();
        sweep.reveal(sx, sy);
        assert_eq!(sweep.cleared(), cleared);
    }
    #[test]
    fn revealing_a_mine_blows_but_keeps_progress() {
        let layout = layout();
        let mut sweep = Sweep::new(&layout);
        let (sx, sy) = layout.safe_start();
        sweep.reveal(sx, sy);
        let cleared = sweep.cleared();
        let mine = (0..9)
            .flat_map(|y| (0..9).map(move |x| (x, y)))
            .find(|&(x, y)| layout.is_mine(x, y))
            .expect("board has mines");
        sweep.reveal(mine.0, mine.1);
        assert!(sweep.blown());
        assert_eq!(sweep.cleared(), cleared);
    }
    #[test]
    fn full_clear_solves() {
        let layout = layout();
        let mut sweep = Sweep::new(&layout);
        for y in 0..9 {
            for x in 0..9 {
                if !layout.is_mine(x, y) {
                    sweep.reveal(x, y);
                }
            }
        }
        assert!(sweep.solved());
        assert_eq!(sweep.cleared(), layout.safes());
    }
    #[test]
    fn chord_requires_revealed_numbered_cell() {
        let layout = layout();
        let mut sweep = Sweep::new(&layout);
        sweep.chord(4, 4);
        assert_eq!(sweep.cleared(), 0);
    }
    #[test]
    fn chord_opens_neighbors() {
        let layout = layout();
        // Find a numbered cell next to at least one clear neighbor.
        let target = (0..9)
            .flat_map(|y| (0..9).map(move |x| (x, y)))
            .find(|&(x, y)| {
                !layout.is_mine(x, y)
                    && layout.adjacent_mines(x, y) > 0
                    && layout.neighbors(x, y).any(|(nx, ny)| !layout.is_mine(nx, ny))
            })
            .expect("numbered cell exists");
        let mut sweep = Sweep::new(&layout);
        sweep.reveal(target.0, target.1);
        let before = sweep.cleared();
        sweep.chord(target.0, target.1);
        assert!(sweep.cleared() > before);
    }
    #[test]
    fn out_of_bounds_reveal_is_ignored() {
        let layout = layout();
        let mut sweep = Sweep::new(&layout);
        sweep.reveal(-1, 4);
        sweep.reveal(4, 99);
        assert_eq!(sweep.cleared(), 0);
        assert!(!sweep.blown());
    }
}
