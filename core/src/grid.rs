pub const LAYOUT_BREAKPOINT: f32 = 768.0;
pub const ICON_WIDTH: f32 = 160.0;
pub const ICON_HEIGHT: f32 = 160.0;
pub const NARROW_COLUMNS_MAX: usize = 2;
pub const NARROW_GAP_X: f32 = 20.0;
pub const NARROW_GAP_Y: f32 = 40.0;
pub const WIDE_COLUMNS_MAX: usize = 3;
pub const WIDE_PITCH_X: f32 = 250.0;
pub const WIDE_PITCH_Y: f32 = 200.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
    Narrow,
    Wide,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridMetrics {
    pub breakpoint: f32,
    pub icon_width: f32,
    pub icon_height: f32,
    pub narrow_columns_max: usize,
    pub narrow_gap_x: f32,
    pub narrow_gap_y: f32,
    pub wide_columns_max: usize,
    pub wide_pitch_x: f32,
    pub wide_pitch_y: f32,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self {
            breakpoint: LAYOUT_BREAKPOINT,
            icon_width: ICON_WIDTH,
            icon_height: ICON_HEIGHT,
            narrow_columns_max: NARROW_COLUMNS_MAX,
            narrow_gap_x: NARROW_GAP_X,
            narrow_gap_y: NARROW_GAP_Y,
            wide_columns_max: WIDE_COLUMNS_MAX,
            wide_pitch_x: WIDE_PITCH_X,
            wide_pitch_y: WIDE_PITCH_Y,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridShape {
    pub mode: LayoutMode,
    pub cols: usize,
    pub rows: usize,
    pub pitch_x: f32,
    pub pitch_y: f32,
}

pub fn layout_mode(viewport_width: f32, metrics: &GridMetrics) -> LayoutMode {
    if viewport_width <= metrics.breakpoint {
        LayoutMode::Narrow
    } else {
        LayoutMode::Wide
    }
}

pub fn grid_shape(count: usize, viewport_width: f32, metrics: &GridMetrics) -> GridShape {
    let count = count.max(1);
    let mode = layout_mode(viewport_width, metrics);
    match mode {
        LayoutMode::Narrow => {
            let cols = metrics.narrow_columns_max.max(1).min(count);
            GridShape {
                mode,
                cols,
                rows: count.div_ceil(cols),
                pitch_x: metrics.icon_width + metrics.narrow_gap_x,
                pitch_y: metrics.icon_height + metrics.narrow_gap_y,
            }
        }
        LayoutMode::Wide => {
            // Spread items over as few rows as the column cap allows, then
            // balance the columns so four items form 2x2 rather than 3+1.
            let rows = count.div_ceil(metrics.wide_columns_max.max(1));
            let cols = count.div_ceil(rows);
            GridShape {
                mode,
                cols,
                rows,
                pitch_x: metrics.wide_pitch_x,
                pitch_y: metrics.wide_pitch_y,
            }
        }
    }
}

/// Top-left corner of every icon, row-major, with the block centered in the
/// viewport.
pub fn layout_positions(
    count: usize,
    viewport_width: f32,
    viewport_height: f32,
    metrics: &GridMetrics,
) -> Vec<(f32, f32)> {
    if count == 0 {
        return Vec::new();
    }
    let shape = grid_shape(count, viewport_width, metrics);
    let block_width = (shape.cols - 1) as f32 * shape.pitch_x + metrics.icon_width;
    let block_height = (shape.rows - 1) as f32 * shape.pitch_y + metrics.icon_height;
    let start_x = viewport_width * 0.5 - block_width * 0.5;
    let start_y = viewport_height * 0.5 - block_height * 0.5;
    (0..count)
        .map(|index| {
            let col = index % shape.cols;
            let row = index / shape.cols;
            (
                start_x + col as f32 * shape.pitch_x,
                start_y + row as f32 * shape.pitch_y,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_is_narrow_inclusive() {
        let metrics = GridMetrics::default();
        assert_eq!(layout_mode(768.0, &metrics), LayoutMode::Narrow);
        assert_eq!(layout_mode(769.0, &metrics), LayoutMode::Wide);
    }

    #[test]
    fn single_icon_is_centered() {
        let metrics = GridMetrics::default();
        let positions = layout_positions(1, 1280.0, 800.0, &metrics);
        assert_eq!(positions, vec![(560.0, 320.0)]);
        let positions = layout_positions(1, 400.0, 800.0, &metrics);
        assert_eq!(positions, vec![(120.0, 320.0)]);
    }

    #[test]
    fn wide_shapes_balance_columns() {
        let metrics = GridMetrics::default();
        let cols_rows = |count| {
            let shape = grid_shape(count, 1024.0, &metrics);
            (shape.cols, shape.rows)
        };
        assert_eq!(cols_rows(3), (3, 1));
        assert_eq!(cols_rows(4), (2, 2));
        assert_eq!(cols_rows(5), (3, 2));
        assert_eq!(cols_rows(7), (3, 3));
    }

    #[test]
    fn empty_set_has_no_positions() {
        assert!(layout_positions(0, 0.0, 0.0, &GridMetrics::default()).is_empty());
    }
}
