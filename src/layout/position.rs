use super::types::{Dims, Offset};
use crate::ir::Position;

/// Resolves a position keyword to pixel coordinates relative to the chart origin.
///
/// Edge keywords place text outside the plot area (`left` sits 100px left of the origin,
/// `side-left` 150px), `top` and `center` stay inside. Unknown keywords land horizontally
/// centred, 20px above the bottom edge. The offset is added last.
pub fn resolve_position(position: &Position, dims: Dims, offset: Offset) -> (f64, f64) {
    let Dims { width, height } = dims;
    let (x, y) = match position {
        Position::Left => (-100.0, height / 2.0),
        Position::Right => (width + 20.0, height / 2.0),
        Position::Top => (width / 2.0, 80.0),
        Position::Bottom => (width / 2.0, height + 40.0),
        Position::Center => (width / 2.0, height / 2.0),
        Position::SideLeft => (-150.0, height / 2.0),
        Position::SideRight => (width + 50.0, height / 2.0),
        Position::Other(_) => (width / 2.0, height - 20.0),
    };
    (x + offset.dx, y + offset.dy)
}
