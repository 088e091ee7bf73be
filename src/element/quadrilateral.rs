/// 1D node indices per quadrilateral node. The first four rows are the `QUAD4` vertices.
pub(crate) const QUAD_TENSOR_INDICES: [[usize; 2]; 9] = [
    [0, 0],
    [1, 0],
    [1, 1],
    [0, 1],
    [2, 0],
    [1, 2],
    [2, 1],
    [0, 2],
    [2, 2],
];

/// Side nodes in `EDGE3` order: the two vertices followed by the mid-side node.
pub(crate) const QUAD_SIDES: [&[usize]; 4] = [&[0, 1, 4], &[1, 2, 5], &[2, 3, 6], &[3, 0, 7]];
