/// 1D node indices per hexahedron node.
///
/// Vertices run counter-clockwise around the bottom face and then the top face. Edge nodes
/// follow in the order bottom edges, vertical edges, top edges. Face nodes are listed in side
/// order and the centre node comes last.
pub(crate) const HEX_TENSOR_INDICES: [[usize; 3]; 27] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
    [2, 0, 0],
    [1, 2, 0],
    [2, 1, 0],
    [0, 2, 0],
    [0, 0, 2],
    [1, 0, 2],
    [1, 1, 2],
    [0, 1, 2],
    [2, 0, 1],
    [1, 2, 1],
    [2, 1, 1],
    [0, 2, 1],
    [2, 2, 0],
    [2, 0, 2],
    [1, 2, 2],
    [2, 1, 2],
    [0, 2, 2],
    [2, 2, 1],
    [2, 2, 2],
];

/// Side nodes in `QUAD9` order, oriented so that the side normal points outward.
pub(crate) const HEX_SIDES: [&[usize]; 6] = [
    &[0, 3, 2, 1, 11, 10, 9, 8, 20],
    &[0, 1, 5, 4, 8, 13, 16, 12, 21],
    &[1, 2, 6, 5, 9, 14, 17, 13, 22],
    &[2, 3, 7, 6, 10, 15, 18, 14, 23],
    &[3, 0, 4, 7, 11, 12, 19, 15, 24],
    &[4, 5, 6, 7, 16, 17, 18, 19, 25],
];
