use rayon::prelude::*;

use super::kernel::{KernelSolver, KERNEL_ALIGN};
use super::region::{BorderRegion, RegionBounds, WindowGeometry};
use super::SavitzkyGolay;
use crate::common::{AlignedArray, Result, Vec2usize};
use crate::image::{Image, ImageDesc};

/// Rounds half up, then saturates to the 8-bit range. Callers seed their
/// accumulators with this bias.
const ROUNDING_BIAS: f32 = 0.5;

#[inline]
fn saturate_u8(sum: f32) -> u8 {
    (sum as i32).clamp(0, 255) as u8
}

/// Smooths a validated `L_U8` image whose size is at least the window size.
pub(super) fn smooth(params: &SavitzkyGolay, source: &Image) -> Result<Image> {
    let desc = source.desc();
    let image_size = Vec2usize::new(desc.width, desc.height);
    let geometry = WindowGeometry::new(image_size, params.window_size);

    let mut output = Image::new_empty(ImageDesc::new_packed(
        desc.width,
        desc.height,
        desc.color_format,
    ))?;

    let mut solver = KernelSolver::new(
        params.window_size,
        geometry.center(),
        params.hor_degree,
        params.vert_degree,
    )?;
    for region in BorderRegion::ALL {
        let bounds = geometry.bounds(region);
        if bounds.is_empty() {
            continue;
        }
        tracing::trace!(
            "{:?}: {} pixels, x {:?}, y {:?}",
            region,
            bounds.pixel_count(),
            bounds.x,
            bounds.y
        );
        convolve_region(source, &mut output, &geometry, region, &bounds, &mut solver);
    }

    convolve_interior(params, source, &mut output, &geometry)?;

    Ok(output)
}

/// Direct 2D convolution over one border region, re-deriving the kernel
/// whenever the reference point moves.
fn convolve_region(
    source: &Image,
    output: &mut Image,
    geometry: &WindowGeometry,
    region: BorderRegion,
    bounds: &RegionBounds,
    solver: &mut KernelSolver,
) {
    let dst_stride = output.desc().stride;
    let dst = output.bytes_mut();

    let mut visit = |x: usize, y: usize| {
        let p = Vec2usize::new(x, y);
        let origin = geometry.origin_for(p);
        if origin != solver.origin() {
            solver.recalc_for_origin(origin);
        }
        dst[y * dst_stride + x] = convolve_at(source, geometry.window_corner(p), solver);
    };

    if region.column_major() {
        for x in bounds.x.clone() {
            for y in bounds.y.clone() {
                visit(x, y);
            }
        }
    } else {
        for y in bounds.y.clone() {
            for x in bounds.x.clone() {
                visit(x, y);
            }
        }
    }
}

/// Weighted sum of the window whose top-left corner is at `corner`.
#[inline]
fn convolve_at(source: &Image, corner: Vec2usize, solver: &KernelSolver) -> u8 {
    let stride = source.desc().stride;
    let src = source.bytes();
    let width = solver.width();

    let mut sum = ROUNDING_BIAS;
    for (wy, weights) in solver.data().chunks_exact(width).enumerate() {
        let start = (corner.y + wy) * stride + corner.x;
        let samples = &src[start..start + width];
        for (&weight, &sample) in weights.iter().zip(samples) {
            sum += sample as f32 * weight;
        }
    }

    saturate_u8(sum)
}

/// Separable evaluation of every pixel whose window stays centered.
///
/// The centered 2D kernel is the outer product of a horizontal kernel of
/// degree `hor_degree` and a vertical kernel of degree `vert_degree`, so the
/// interior costs `W + H` instead of `W * H` multiplications per pixel.
fn convolve_interior(
    params: &SavitzkyGolay,
    source: &Image,
    output: &mut Image,
    geometry: &WindowGeometry,
) -> Result<()> {
    let window = params.window_size;
    let center = geometry.center();

    let hor_kernel = KernelSolver::new(
        Vec2usize::new(window.x, 1),
        Vec2usize::new(center.x, 0),
        params.hor_degree,
        0,
    )?;
    let vert_kernel = KernelSolver::new(
        Vec2usize::new(1, window.y),
        Vec2usize::new(0, center.y),
        0,
        params.vert_degree,
    )?;

    let interior = geometry.interior();
    let temp_width = interior.x.len();
    let temp_stride = (temp_width + KERNEL_ALIGN - 1) & !(KERNEL_ALIGN - 1);
    let height = source.desc().height;

    let mut temp = AlignedArray::<f32, KERNEL_ALIGN>::new(temp_stride * height);
    horizontal_pass(source, &mut temp, temp_width, temp_stride, hor_kernel.data());
    vertical_pass(&temp, temp_stride, output, &interior, vert_kernel.data());

    Ok(())
}

/// Convolves every source row with `kernel`, keeping only positions where
/// the kernel fits entirely. Rows are written `temp_stride` apart.
fn horizontal_pass(
    source: &Image,
    temp: &mut [f32],
    temp_width: usize,
    temp_stride: usize,
    kernel: &[f32],
) {
    temp.par_chunks_mut(temp_stride)
        .enumerate()
        .for_each(|(y, temp_row)| {
            let src_row = source.row(y);
            for (i, out) in temp_row[..temp_width].iter_mut().enumerate() {
                let mut sum = 0.0f32;
                for (&weight, &sample) in kernel.iter().zip(&src_row[i..]) {
                    sum += sample as f32 * weight;
                }
                *out = sum;
            }
        });
}

/// Convolves columns of the horizontal pass result into the interior rows
/// of `output`.
fn vertical_pass(
    temp: &[f32],
    temp_stride: usize,
    output: &mut Image,
    interior: &RegionBounds,
    kernel: &[f32],
) {
    let dst_stride = output.desc().stride;
    let first_row = interior.y.start;
    let x_start = interior.x.start;
    let temp_width = interior.x.len();

    output.bytes_mut()[first_row * dst_stride..interior.y.end * dst_stride]
        .par_chunks_mut(dst_stride)
        .enumerate()
        .for_each(|(row, dst_row)| {
            // Output row `first_row + row` is centered on temp rows starting at `row`.
            let dst = &mut dst_row[x_start..x_start + temp_width];
            for (i, out) in dst.iter_mut().enumerate() {
                let mut sum = ROUNDING_BIAS;
                for (j, &weight) in kernel.iter().enumerate() {
                    sum += temp[(row + j) * temp_stride + i] * weight;
                }
                *out = saturate_u8(sum);
            }
        });
}
