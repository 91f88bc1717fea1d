use bevy::math::{vec2, Vec2, Vec3};

/// Cell matrix with fixed dimensions. Row 0 is the top row.
///
/// Stored as a flat row-major `Vec<bool>`; the dimensions never change after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// Creates an all-dead grid. Both dimensions must be at least 1.
    pub fn new(rows: usize, columns: usize) -> Self {
        assert!(rows > 0 && columns > 0, "grid dimensions must be positive");
        Self {
            rows,
            columns,
            cells: vec![false; rows * columns],
        }
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    fn index(&self, row: usize, column: usize) -> usize {
        assert!(
            row < self.rows && column < self.columns,
            "cell ({row}, {column}) out of range for {}x{} grid",
            self.rows,
            self.columns,
        );
        row * self.columns + column
    }

    #[inline]
    pub fn get(&self, row: usize, column: usize) -> bool {
        self.cells[self.index(row, column)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, column: usize, alive: bool) {
        let idx = self.index(row, column);
        self.cells[idx] = alive;
    }

    /// Sets every cell to the given liveness.
    pub fn fill(&mut self, alive: bool) {
        self.cells.fill(alive);
    }

    /// Independently sets each cell alive with the given probability.
    ///
    /// A seeded `rng` reproduces the same board.
    pub fn randomize(&mut self, probability: f64, rng: &mut fastrand::Rng) {
        debug_assert!((0.0..=1.0).contains(&probability));
        for cell in &mut self.cells {
            *cell = rng.f64() < probability;
        }
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[bool] {
        let start = self.index(row, 0);
        &self.cells[start..start + self.columns]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [bool] {
        let start = self.index(row, 0);
        &mut self.cells[start..start + self.columns]
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }
}

/// World-space geometry of the board: where each cell sprite sits and which
/// cell a pointer position lands on. Pure lookups, no side effects.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    /// The center of the board.
    pub center: Vec2,
    pub rows: usize,
    pub columns: usize,
    /// Edge length of one cell in world units.
    pub cell_edge: f32,
}

impl Layout {
    /// Full size of the board in world units.
    #[inline]
    pub fn pixel_size(&self) -> Vec2 {
        vec2(
            self.columns as f32 * self.cell_edge,
            self.rows as f32 * self.cell_edge,
        )
    }

    /// Translation of the cell's sprite. Cells are laid out from the top-left
    /// corner; world y grows upward.
    #[inline]
    pub fn cell_to_translation(&self, row: usize, column: usize) -> Vec3 {
        let origin = self.center - self.pixel_size() * 0.5;
        let x = origin.x + (column as f32 + 0.5) * self.cell_edge;
        let y = origin.y + ((self.rows - 1 - row) as f32 + 0.5) * self.cell_edge;
        vec2(x, y).extend(10.0)
    }

    /// Maps a world-space point to the cell under it, or `None` when the
    /// point lies outside the board rectangle. Division results are clamped
    /// so the board's far edges still land on the last row/column.
    pub fn cell_at(&self, world: Vec2) -> Option<(usize, usize)> {
        let size = self.pixel_size();
        let local = world - (self.center - size * 0.5);
        if local.x < 0.0 || local.y < 0.0 || local.x > size.x || local.y > size.y {
            return None;
        }
        let column = ((local.x / self.cell_edge) as usize).min(self.columns - 1);
        let from_bottom = ((local.y / self.cell_edge) as usize).min(self.rows - 1);
        Some((self.rows - 1 - from_bottom, column))
    }
}

#[cfg(test)]
mod test {
    use bevy::math::vec3;

    use super::*;

    #[test]
    fn grid_starts_dead() {
        let grid = Grid::new(6, 9);
        assert_eq!(grid.dimensions(), (6, 9));
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn set_and_get() {
        let mut grid = Grid::new(10, 10);
        grid.set(3, 4, true);
        assert!(grid.get(3, 4));
        assert!(!grid.get(4, 3));
        grid.set(3, 4, false);
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn fill_sets_every_cell() {
        let mut grid = Grid::new(4, 5);
        grid.fill(true);
        assert_eq!(grid.population(), 20);
        grid.fill(false);
        assert_eq!(grid.population(), 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn get_out_of_range_panics() {
        let grid = Grid::new(4, 4);
        grid.get(4, 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn set_out_of_range_panics() {
        let mut grid = Grid::new(4, 4);
        grid.set(0, 4, true);
    }

    #[test]
    fn randomize_is_reproducible_with_a_fixed_seed() {
        let mut a = Grid::new(32, 32);
        let mut b = Grid::new(32, 32);
        a.randomize(0.3, &mut fastrand::Rng::with_seed(7));
        b.randomize(0.3, &mut fastrand::Rng::with_seed(7));
        assert_eq!(a, b);
        assert!(a.population() > 0);
        assert!(a.population() < 32 * 32);
    }

    #[test]
    fn randomize_extremes() {
        let mut grid = Grid::new(8, 8);
        grid.randomize(1.0, &mut fastrand::Rng::with_seed(1));
        assert_eq!(grid.population(), 64);
        grid.randomize(0.0, &mut fastrand::Rng::with_seed(1));
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn row_slices_cover_the_matrix() {
        let mut grid = Grid::new(3, 4);
        grid.set(1, 2, true);
        assert_eq!(grid.row(0), &[false; 4]);
        assert_eq!(grid.row(1), &[false, false, true, false]);
        grid.row_mut(2)[0] = true;
        assert!(grid.get(2, 0));
    }

    #[test]
    fn layout_works() {
        let layout = Layout {
            center: Vec2::ZERO,
            rows: 3,
            columns: 4,
            cell_edge: 10.0,
        };

        assert_eq!(layout.pixel_size(), vec2(40.0, 30.0));
        // top-left cell sits up and to the left of center
        assert_eq!(layout.cell_to_translation(0, 0), vec3(-15.0, 10.0, 10.0));
        assert_eq!(layout.cell_to_translation(2, 3), vec3(15.0, -10.0, 10.0));

        // every cell center maps back to its own cell
        for row in 0..3 {
            for column in 0..4 {
                let pos = layout.cell_to_translation(row, column).truncate();
                assert_eq!(layout.cell_at(pos), Some((row, column)));
            }
        }
    }

    #[test]
    fn layout_clamps_the_far_edges() {
        let layout = Layout {
            center: Vec2::ZERO,
            rows: 3,
            columns: 4,
            cell_edge: 10.0,
        };
        // exact bottom-right corner of the board rectangle
        assert_eq!(layout.cell_at(vec2(20.0, -15.0)), Some((2, 3)));
        // exact top-left corner
        assert_eq!(layout.cell_at(vec2(-20.0, 15.0)), Some((0, 0)));
    }

    #[test]
    fn layout_ignores_points_off_the_board() {
        let layout = Layout {
            center: Vec2::ZERO,
            rows: 3,
            columns: 4,
            cell_edge: 10.0,
        };
        assert_eq!(layout.cell_at(vec2(20.1, 0.0)), None);
        assert_eq!(layout.cell_at(vec2(0.0, -15.1)), None);
        assert_eq!(layout.cell_at(vec2(-25.0, 40.0)), None);
    }
}
