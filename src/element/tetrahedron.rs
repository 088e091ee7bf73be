/// Vertex pairs of the mid-edge nodes of `TET10`, in node order starting at node 4.
pub(crate) const TET_EDGES: [(usize, usize); 6] = [(0, 1), (1, 2), (2, 0), (0, 3), (1, 3), (2, 3)];

/// Side nodes in `TRI6` order, oriented so that the side normal points outward.
pub(crate) const TET_SIDES: [&[usize]; 4] = [
    &[0, 2, 1, 6, 5, 4],
    &[0, 1, 3, 4, 8, 7],
    &[1, 2, 3, 5, 9, 8],
    &[2, 0, 3, 6, 7, 9],
];
