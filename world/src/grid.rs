//! Dense rectangular storage addressed by chunk-local coordinates.

use dimlight_core::GridPosition;

/// Fixed-size two-dimensional array indexed by [`GridPosition`].
///
/// Dimensions are fixed for the grid's lifetime. Reads outside the extent
/// return `None` so callers can treat the tile as unknown or impassable;
/// writes outside the extent panic, because a bad write index means a
/// local/global coordinate translation bug in the caller.
#[derive(Clone, Debug)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Creates a grid with every cell set to a clone of `value`.
    #[must_use]
    pub fn filled(width: u32, height: u32, value: T) -> Self
    where
        T: Clone,
    {
        let capacity = cell_count(width, height);
        Self {
            width,
            height,
            cells: vec![value; capacity],
        }
    }

    /// Creates a grid by invoking `generate` for every cell in row-major order.
    #[must_use]
    pub fn from_fn<F>(width: u32, height: u32, mut generate: F) -> Self
    where
        F: FnMut(GridPosition) -> T,
    {
        let mut cells = Vec::with_capacity(cell_count(width, height));
        for y in 0..height {
            for x in 0..width {
                cells.push(generate(GridPosition::new(x, y)));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Width of the grid in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Retrieves the cell at `position`, or `None` outside the extent.
    #[must_use]
    pub fn get(&self, position: GridPosition) -> Option<&T> {
        self.index(position).map(|index| &self.cells[index])
    }

    /// Overwrites the cell at `position`.
    ///
    /// # Panics
    ///
    /// Panics when `position` lies outside the grid's extent.
    pub fn set(&mut self, position: GridPosition, value: T) {
        match self.index(position) {
            Some(index) => self.cells[index] = value,
            None => panic!(
                "grid write out of bounds: ({}, {}) in a {}x{} grid",
                position.x(),
                position.y(),
                self.width,
                self.height
            ),
        }
    }

    /// Resets every cell to a clone of `value`.
    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        for cell in &mut self.cells {
            *cell = value.clone();
        }
    }

    fn index(&self, position: GridPosition) -> Option<usize> {
        if position.x() < self.width && position.y() < self.height {
            let x = usize::try_from(position.x()).ok()?;
            let y = usize::try_from(position.y()).ok()?;
            let width = usize::try_from(self.width).ok()?;
            Some(y * width + x)
        } else {
            None
        }
    }
}

fn cell_count(width: u32, height: u32) -> usize {
    let count = u64::from(width) * u64::from(height);
    usize::try_from(count).unwrap_or(0)
}
