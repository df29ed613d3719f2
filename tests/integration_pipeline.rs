//! Integration tests for the pipeline.
//!
//! These tests run full traversal → worker → aggregation passes over real
//! directory trees:
//! - SVG, PNG and JPEG optimization with outputs on disk
//! - Nested layout, filters and dry runs
//! - Fatal vs per-file errors

use assert_fs::prelude::*;
use image::{ImageFormat, Rgb, RgbImage};
use photon_optimizer::core::pipeline::{Pipeline, RunStatistics};
use photon_optimizer::core::reporter::{ReportContext, RunReport, REPORT_FILE_NAME};
use photon_optimizer::core::scanner::AssetKind;
use photon_optimizer::OptimizerError;
use predicates::prelude::*;
use std::path::Path;

const SVG: &str = r#"<?xml version="1.0"?>
<!-- comment -->
<svg>
  <circle/>
</svg>
"#;

/// A gradient image large enough for quantization to make a difference
fn write_image(path: &Path, format: ImageFormat) {
    let image = RgbImage::from_fn(96, 64, |x, y| {
        Rgb([(x * 2) as u8, (y * 3) as u8, ((x + y) % 256) as u8])
    });
    image.save_with_format(path, format).unwrap();
}

fn run(input: &Path, output: &Path, dry_run: bool) -> RunStatistics {
    Pipeline::builder()
        .input(input)
        .output(output)
        .concurrency(2)
        .dry_run(dry_run)
        .build()
        .unwrap()
        .run()
        .unwrap()
}

#[test]
fn svg_in_place_succeeds() {
    let dir = assert_fs::TempDir::new().unwrap();
    let svg = dir.child("test.svg");
    svg.write_str(SVG).unwrap();

    let stats = Pipeline::builder()
        .input(dir.path())
        .output(dir.path())
        .concurrency(1)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(stats.successful, 1);
    assert_eq!(stats.failed, 0);
    svg.assert(r#"<?xml version="1.0"?><svg><circle/></svg>"#);
}

#[test]
fn optimizes_mixed_assets_into_output_dir() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();

    input.child("logo.svg").write_str(SVG).unwrap();
    write_image(input.child("photo.jpg").path(), ImageFormat::Jpeg);
    write_image(input.child("banner.png").path(), ImageFormat::Png);
    input.child("README.md").write_str("# not an asset").unwrap();

    let stats = run(input.path(), output.path(), false);

    assert_eq!(stats.total_files(), 3);
    assert_eq!(
        stats.successful,
        3,
        "failures: {:?}",
        stats.failures().collect::<Vec<_>>()
    );

    output.child("logo.svg").assert(predicate::path::is_file());
    output.child("photo.jpg").assert(predicate::path::is_file());
    output.child("banner.png").assert(predicate::path::is_file());
    output.child("README.md").assert(predicate::path::missing());

    let jpeg = image::open(output.child("photo.jpg").path()).unwrap();
    assert_eq!((jpeg.width(), jpeg.height()), (96, 64));

    let svg_record = stats
        .records
        .iter()
        .find(|r| r.kind == AssetKind::Vector)
        .unwrap();
    assert!(svg_record.bytes_saved > 0);
    assert_eq!(
        svg_record.bytes_saved,
        svg_record.original_size as i64 - svg_record.processed_size as i64
    );
}

#[test]
fn nested_layout_is_preserved() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();

    input.child("icons/dark/moon.svg").write_str(SVG).unwrap();
    input.child("icons/sun.svg").write_str(SVG).unwrap();
    input.child("top.svg").write_str(SVG).unwrap();

    let stats = run(input.path(), output.path(), false);

    assert_eq!(stats.successful, 3);
    output
        .child("icons/dark/moon.svg")
        .assert(predicate::str::contains("<circle/>"));
    output.child("icons/sun.svg").assert(predicate::path::is_file());
    output.child("top.svg").assert(predicate::path::is_file());
}

#[test]
fn filters_apply_end_to_end() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();

    input.child("keep.svg").write_str(SVG).unwrap();
    input.child("node_modules/pkg/icon.svg").write_str(SVG).unwrap();
    input.child("a/b/deep.svg").write_str(SVG).unwrap();
    input.child("tiny.svg").write_str("<svg/>").unwrap();

    let stats = Pipeline::builder()
        .input(input.path())
        .output(output.path())
        .ignore_patterns("node_modules")
        .max_depth(2)
        .min_size(16)
        .build()
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(stats.total_files(), 1);
    assert!(stats.records[0].path.ends_with("keep.svg"));
    output.child("node_modules").assert(predicate::path::missing());
    output.child("a").assert(predicate::path::missing());
}

#[test]
fn dry_run_writes_nothing_and_is_repeatable() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = input.child("out");

    input.child("logo.svg").write_str(SVG).unwrap();
    input.child("nested/icon.svg").write_str(SVG).unwrap();
    write_image(input.child("banner.png").path(), ImageFormat::Png);

    let first = run(input.path(), output.path(), true);
    let second = run(input.path(), output.path(), true);

    assert_eq!(first.total_files(), 3);
    assert_eq!(first.successful, second.successful);
    assert_eq!(first.total_bytes_saved, second.total_bytes_saved);
    output.assert(predicate::path::missing());
    input.child("logo.svg").assert(SVG);
}

#[test]
fn corrupt_files_fail_without_stopping_the_run() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();

    input.child("good.svg").write_str(SVG).unwrap();
    input.child("broken.png").write_binary(b"not a png at all").unwrap();
    input.child("broken.jpg").write_binary(b"not a jpeg either").unwrap();

    let stats = run(input.path(), output.path(), false);

    assert_eq!(stats.total_files(), 3);
    assert_eq!(stats.successful, 1);
    assert_eq!(stats.failed, 2);
    assert!(stats
        .failures()
        .all(|r| r.error.is_some() && r.output_path.is_none() && r.bytes_saved == 0));
    assert!(stats.failures().all(|r| r.original_size > 0));
    output.child("broken.png").assert(predicate::path::missing());
}

#[test]
fn concurrency_does_not_change_the_outcome() {
    let input = assert_fs::TempDir::new().unwrap();
    for i in 0..30 {
        input
            .child(format!("dir{}/icon{}.svg", i % 4, i))
            .write_str(SVG)
            .unwrap();
    }

    let baseline = run(input.path(), input.child("out").path(), true);
    for workers in [1, 3, 8] {
        let stats = Pipeline::builder()
            .input(input.path())
            .output(input.child("out").path())
            .concurrency(workers)
            .queue_capacity(1)
            .dry_run(true)
            .build()
            .unwrap()
            .run()
            .unwrap();

        assert_eq!(stats.total_files(), 30);
        assert_eq!(stats.successful, baseline.successful);
        assert_eq!(stats.total_bytes_saved, baseline.total_bytes_saved);
    }
}

#[test]
fn rerun_does_not_pick_up_previous_outputs() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = input.child("out");
    input.child("a.svg").write_str(SVG).unwrap();
    input.child("icons/b.svg").write_str(SVG).unwrap();

    let first = run(input.path(), output.path(), false);
    let second = run(input.path(), output.path(), false);

    assert_eq!(first.total_files(), 2);
    assert_eq!(second.total_files(), first.total_files());
    output.child("icons/b.svg").assert(predicate::path::is_file());
    output.child("out").assert(predicate::path::missing());
}

#[test]
fn missing_root_is_fatal() {
    let dir = assert_fs::TempDir::new().unwrap();
    let result = Pipeline::builder()
        .input(dir.child("does-not-exist").path())
        .output(dir.child("out").path())
        .build()
        .unwrap()
        .run();

    assert!(matches!(result, Err(OptimizerError::Scan(_))));
    dir.child("out").assert(predicate::path::missing());
}

#[test]
fn report_is_written_for_a_run() {
    let input = assert_fs::TempDir::new().unwrap();
    let output = assert_fs::TempDir::new().unwrap();
    input.child("logo.svg").write_str(SVG).unwrap();

    let stats = run(input.path(), output.path(), false);
    let report = RunReport::new(
        &ReportContext {
            quality: 80,
            width: 0,
            webp: false,
            concurrency: 2,
            input: input.path().to_path_buf(),
            output: output.path().to_path_buf(),
        },
        &stats,
    );
    report
        .write_to_file(&output.path().join(REPORT_FILE_NAME))
        .unwrap();

    output
        .child(REPORT_FILE_NAME)
        .assert(predicate::str::contains("\"total_files\": 1"))
        .assert(predicate::str::contains("\"compression_ratio\""))
        .assert(predicate::str::contains("\"file_type\": \"svg\""));
}
