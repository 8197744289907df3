/// Rounds a row length up to a 4-byte boundary.
pub(crate) fn align_stride(n: usize) -> usize {
    (n + 3) & !3
}

/// Copies tightly packed rows into a buffer with `stride` bytes per row.
pub(crate) fn add_stride_padding(
    src: &[u8],
    row_bytes: usize,
    height: usize,
    stride: usize,
) -> Vec<u8> {
    debug_assert!(stride >= row_bytes);

    let mut padded = vec![0u8; stride * height];
    for (dst_row, src_row) in padded
        .chunks_exact_mut(stride)
        .zip(src.chunks_exact(row_bytes.max(1)))
    {
        dst_row[..row_bytes].copy_from_slice(src_row);
    }
    padded
}

/// Drops per-row padding, returning tightly packed rows.
pub(crate) fn strip_stride_padding(
    src: &[u8],
    row_bytes: usize,
    height: usize,
    stride: usize,
) -> Vec<u8> {
    let mut packed = Vec::with_capacity(row_bytes * height);
    for y in 0..height {
        packed.extend_from_slice(&src[y * stride..y * stride + row_bytes]);
    }
    packed
}
