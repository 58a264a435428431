mod common;

use common::*;
use image::{Rgb, RgbImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use tilemosaic::{
    ArchiveStats, Coverage, MemoryArchive, MosaicError, MosaicReader, MosaicResult, PixelFormat,
    RawTile, Raster, TileDecoder, TileIndexRange,
};

// Fully populated 4x4 block of tiles at zoom 8, columns 170-173 rows 47-50
fn block_archive() -> MemoryArchive {
    let mut archive = MemoryArchive::new();
    archive.add_pyramid(degree_pyramid());
    for row in 47..=50 {
        for col in 170..=173 {
            let color = Rgb([col as u8, row as u8, 0]);
            archive
                .insert_tile(DEGREES, 8, col, row, png(RgbImage::from_pixel(256, 256, color)))
                .unwrap();
        }
    }
    archive
}

#[test]
fn corrupt_tile_fails_and_releases() {
    init_logging();
    let mut archive = block_archive();
    archive
        .insert_tile(DEGREES, 8, 171, 48, b"not an image".to_vec())
        .unwrap();
    let reader = MosaicReader::open(archive).unwrap();
    let result = reader
        .request(DEGREES)
        .with_envelope(-9.5, 40.5, -6.5, 42.5)
        .with_dimensions(768, 512)
        .read();

    match result {
        Err(MosaicError::DecodeFailure {
            column, row, zoom, ..
        }) => assert_eq!((column, row, zoom), (171, 48, 8)),
        other => panic!("Expected decode failure, got {other:?}"),
    }
    let stats = reader.archive().stats();
    assert_eq!(stats.handles_opened, 2);
    assert_eq!(stats.cursors_opened, 1);
    assert!(stats.all_released());
}

#[test]
fn archive_failure_mid_read_releases() {
    init_logging();
    let faults = Faults {
        fail_after: Some(3),
        ..Default::default()
    };
    let archive = FlakyArchive::new(block_archive(), faults);
    let reader = MosaicReader::open(archive).unwrap();
    let result = reader
        .request(DEGREES)
        .with_envelope(-10.0, 37.0, -6.0, 43.0)
        .with_dimensions(1024, 1024)
        .read();

    assert!(matches!(result, Err(MosaicError::IoFailure(_))));
    let stats = reader.archive().inner.stats();
    assert_eq!(stats.cursors_opened, 1);
    assert!(stats.all_released());
}

#[test]
fn archive_failure_before_first_tile_releases() {
    let faults = Faults {
        fail_after: Some(0),
        ..Default::default()
    };
    let archive = FlakyArchive::new(block_archive(), faults);
    let reader = MosaicReader::open(archive).unwrap();
    let result = reader
        .request(DEGREES)
        .with_envelope(-10.0, 40.0, -9.0, 41.0)
        .with_dimensions(256, 256)
        .read();

    assert!(matches!(result, Err(MosaicError::IoFailure(_))));
    assert!(reader.archive().inner.stats().all_released());
}

fn read_block(faults: Faults) -> (MosaicResult<Coverage>, ArchiveStats) {
    let reader = MosaicReader::open(FlakyArchive::new(block_archive(), faults)).unwrap();
    let result = reader
        .request(DEGREES)
        .with_envelope(-9.5, 40.5, -6.5, 42.5)
        .with_dimensions(768, 512)
        .read();
    (result, reader.archive().inner.stats())
}

#[test]
fn bound_query_failure_releases_handle() {
    let (result, stats) = read_block(Faults {
        tile_bound: true,
        ..Default::default()
    });
    assert!(matches!(result, Err(MosaicError::IoFailure(_))));
    assert_eq!(stats.handles_opened, 2);
    assert_eq!(stats.cursors_opened, 0);
    assert!(stats.all_released());
}

#[test]
fn cursor_open_failure_releases_handle() {
    let (result, stats) = read_block(Faults {
        open_cursor: true,
        ..Default::default()
    });
    assert!(matches!(result, Err(MosaicError::IoFailure(_))));
    assert_eq!(stats.handles_opened, 2);
    assert_eq!(stats.cursors_opened, 0);
    assert!(stats.all_released());
}

#[test]
fn cursor_close_failure_fails_a_good_read() {
    let (result, stats) = read_block(Faults {
        cursor_close: true,
        ..Default::default()
    });
    match result {
        Err(MosaicError::IoFailure(e)) => assert!(e.to_string().contains("cursor close")),
        other => panic!("Expected close failure, got {other:?}"),
    }
    assert!(stats.all_released());
}

#[test]
fn handle_close_failure_fails_a_good_read() {
    let (result, stats) = read_block(Faults {
        handle_close: true,
        ..Default::default()
    });
    match result {
        Err(MosaicError::IoFailure(e)) => assert!(e.to_string().contains("handle close")),
        other => panic!("Expected close failure, got {other:?}"),
    }
    assert!(stats.all_released());
}

#[test]
fn iteration_failure_wins_over_close_failures() {
    let (result, stats) = read_block(Faults {
        fail_after: Some(2),
        cursor_close: true,
        handle_close: true,
        ..Default::default()
    });
    match result {
        Err(MosaicError::IoFailure(e)) => assert!(e.to_string().contains("iteration")),
        other => panic!("Expected iteration failure, got {other:?}"),
    }
    assert!(stats.all_released());
}

struct CountingDecoder {
    calls: AtomicUsize,
    fail_at: usize,
}

impl TileDecoder for CountingDecoder {
    fn decode(&self, tile: &RawTile) -> MosaicResult<Raster> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.fail_at {
            return Err(MosaicError::DecodeFailure {
                column: tile.column,
                row: tile.row,
                zoom: tile.zoom,
                reason: "refused".into(),
            });
        }
        Ok(Raster::blank((256, 256), PixelFormat::GRAY8))
    }
}

#[test]
fn decoder_failure_stops_the_read() {
    let reader = MosaicReader::open(block_archive())
        .unwrap()
        .with_decoder(CountingDecoder {
            calls: AtomicUsize::new(0),
            fail_at: 2,
        });
    let result = reader
        .request(DEGREES)
        .with_envelope(-10.0, 37.0, -6.0, 43.0)
        .with_dimensions(1024, 1024)
        .read();

    assert!(matches!(result, Err(MosaicError::DecodeFailure { .. })));
    assert!(reader.archive().stats().all_released());
}

#[test]
fn concurrent_reads_share_one_reader() {
    init_logging();
    let reader = MosaicReader::open(block_archive()).unwrap();
    let requests = [
        (-10.0, 40.0, -9.0, 41.0, 256),
        (-9.5, 39.5, -7.5, 41.5, 512),
        (-10.0, 37.0, -6.0, 43.0, 1024),
        (-7.0, 39.0, -6.0, 40.0, 256),
    ];

    let coverages = thread::scope(|scope| {
        let handles: Vec<_> = requests
            .iter()
            .map(|&(min_x, min_y, max_x, max_y, size)| {
                let reader = &reader;
                scope.spawn(move || {
                    reader
                        .request(DEGREES)
                        .with_envelope(min_x, min_y, max_x, max_y)
                        .with_dimensions(size, size)
                        .read()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(coverages[0].range, TileIndexRange::single(170, 49));
    assert_eq!(coverages[0].raster.format, PixelFormat::RGB8);
    assert_eq!(coverages[3].range, TileIndexRange::single(173, 50));
    assert_eq!(coverages[3].raster.get_pixel(0, 0), Some(&[173, 50, 0][..]));
    for coverage in coverages.iter() {
        assert_eq!(coverage.zoom_level, 8);
        assert!(!coverage.raster.is_blank());
    }
    let stats = reader.archive().stats();
    assert_eq!(stats.handles_opened, 1 + requests.len());
    assert!(stats.all_released());
}
