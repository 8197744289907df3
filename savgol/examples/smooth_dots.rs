//! Smooths a synthetic scan of small dots and writes both images as PNG.
//!
//! ```text
//! cargo run --release -p savgol --example smooth_dots [params.yaml]
//! ```
//!
//! Without a parameter file the 300 dpi scan preset is used.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use common::log_setup::setup_logging;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use savgol::{Image, SavitzkyGolay};

const WIDTH: usize = 400;
const HEIGHT: usize = 400;
const DOT_COUNT: usize = 600;

fn main() -> anyhow::Result<()> {
    setup_logging("info")?;

    let params = match std::env::args().nth(1) {
        Some(file_name) => common::load_file::<SavitzkyGolay>(&file_name)
            .with_context(|| format!("loading parameters from {file_name}"))?,
        None => SavitzkyGolay::for_scan_dpi(300),
    };
    tracing::info!("Parameters: {:?}", params);

    let source = dots_image(WIDTH, HEIGHT, DOT_COUNT, 0x5eed)?;

    let start = Instant::now();
    let smoothed = params.apply(&source)?;
    tracing::info!(
        "Smoothed {} in {:.2} ms",
        source.desc(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    let source_path = common::test_utils::output_path("examples", "dots.png")?;
    let smoothed_path = common::test_utils::output_path("examples", "dots_smoothed.png")?;
    write_png(&source, &source_path)?;
    write_png(&smoothed, &smoothed_path)?;
    tracing::info!("Wrote {} and {}", source_path.display(), smoothed_path.display());

    Ok(())
}

/// Dark background, a little sensor noise and randomly placed 3x3 dots.
fn dots_image(width: usize, height: usize, dots: usize, seed: u64) -> savgol::Result<Image> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut pixels: Vec<u8> = (0..width * height)
        .map(|_| rng.random_range(0..24u8))
        .collect();

    for _ in 0..dots {
        let cx = rng.random_range(1..width - 1);
        let cy = rng.random_range(1..height - 1);
        let value = rng.random_range(180..=255u8);
        for y in cy - 1..=cy + 1 {
            pixels[y * width + cx - 1..=y * width + cx + 1].fill(value);
        }
    }

    Image::from_gray_u8(width, height, pixels)
}

fn write_png(image: &Image, path: &Path) -> anyhow::Result<()> {
    let image = image.clone().packed();
    let desc = *image.desc();

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), desc.width as u32, desc.height as u32);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.bytes())?;

    Ok(())
}
