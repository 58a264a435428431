use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::env;
use std::io::Cursor;
use std::time::Instant;
use tilemosaic::{MemoryArchive, MosaicReader, PyramidMetadata, ReferenceSystem, DEFAULT_TILE_SIZE};
use tracing::*;

const PYRAMID: &str = "checkerboard";
const MAX_ZOOM: u32 = 3;
const OUTPUT_FILE: &str = "mosaic.png";

// Builds a small in-memory world pyramid and reads a mosaic out of it
// Use
// cargo run -- min_x min_y max_x max_y width height output.png

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .init();

    let args: Vec<String> = env::args().collect();
    let (envelope, dimensions) = if args.len() > 6 {
        let v: Vec<f64> = args[1..7].iter().map(|a| a.parse().unwrap()).collect();
        ((v[0], v[1], v[2], v[3]), (v[4] as u32, v[5] as u32))
    } else {
        ((-30.0, -10.0, 60.0, 50.0), (600, 400))
    };
    let output_file = if args.len() > 7 {
        args[7].clone()
    } else {
        String::from(OUTPUT_FILE)
    };

    let t0 = Instant::now();
    let archive = checkerboard_archive();
    info!(
        "Built {} tiles in {:.3}s",
        archive.tile_count(),
        t0.elapsed().as_secs_f64()
    );

    let reader = MosaicReader::open(archive).unwrap();
    let coverage = reader
        .request(PYRAMID)
        .with_envelope(envelope.0, envelope.1, envelope.2, envelope.3)
        .with_dimensions(dimensions.0, dimensions.1)
        .read()
        .unwrap();
    println!("{coverage}");

    let img: DynamicImage = coverage.raster.try_into().unwrap();
    img.save(&output_file).unwrap();
    println!("Mosaic saved to {output_file}");
}

fn checkerboard_archive() -> MemoryArchive {
    let crs = ReferenceSystem::wgs84();
    let pyramid =
        PyramidMetadata::quadtree(PYRAMID, crs.axes, &crs, (2, 1), MAX_ZOOM, DEFAULT_TILE_SIZE)
            .unwrap();
    let levels = pyramid.levels().to_vec();

    let mut archive = MemoryArchive::new();
    archive.add_pyramid(pyramid);
    for level in levels {
        for row in 0..level.matrix_height {
            for col in 0..level.matrix_width {
                let shade = if (row + col) % 2 == 0 { 220 } else { 60 };
                let tint = (level.zoom_level * 60) as u8;
                let img = RgbImage::from_pixel(
                    level.tile_width,
                    level.tile_height,
                    Rgb([shade, tint, 255 - shade]),
                );
                let mut data = Vec::new();
                DynamicImage::ImageRgb8(img)
                    .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
                    .unwrap();
                archive
                    .insert_tile(PYRAMID, level.zoom_level, col as i64, row as i64, data)
                    .unwrap();
            }
        }
    }
    archive
}
