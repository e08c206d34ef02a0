pub(crate) const WALL_THICKNESS: u32 = 1;

// Empty cells kept between a new piece and anything but its parent
pub(crate) const PLACEMENT_BUFFER: u32 = 1;

pub(crate) const CORRIDOR_WIDTH: u32 = 1 + WALL_THICKNESS * 2;

/// Cost of an orthogonal step, in fixed point.
pub const BASE_COST: u32 = 100;
/// Cost of a diagonal step, `BASE_COST * √2` rounded down.
pub const DIAGONAL_COST: u32 = 141;
/// Extra cost put on a cell holding an object.
pub const OBJECT_PENALTY: u32 = 1000 * BASE_COST;
