use sobel_sweep::{
    util::image::{ImageRGB8, ImageY8, InputImage, Luma, Rgb},
    NormalizationScope,
    Sweep,
    SweepBuilder,
    VerticalSupport,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Vertical step edge whose contrast grows with the row index
fn graded_edges(width: usize, height: usize) -> InputImage {
    InputImage::Gray(ImageY8::from_fn(width, height, |x, y| {
        let contrast = ((y + 1) * 20).min(255);
        Luma([if x < width / 2 { 0 } else { contrast as u8 }])
    }))
}

fn run(sweep: &Sweep, input: &InputImage, threads: usize) -> ImageY8 {
    let mut output = Sweep::output_for(input);
    sweep.run_entry(input, &mut output, threads).unwrap();
    output
}

fn builder(scope: NormalizationScope, vertical: VerticalSupport) -> SweepBuilder {
    let mut builder = SweepBuilder::default();
    builder.set_normalization(scope);
    builder.set_vertical_support(vertical);
    builder.set_unsharp(None);
    builder
}

#[test]
fn band_normalization_shows_seams() {
    init();
    let sweep = builder(NormalizationScope::Band, VerticalSupport::Row).build().unwrap();
    let input = graded_edges(16, 8);

    let single = run(&sweep, &input, 1);
    let banded = run(&sweep, &input, 4);
    assert_ne!(single, banded);

    // every band reaches full intensity on its own
    for band_last_row in [1, 3, 5, 7] {
        assert_eq!(banded[(8, band_last_row)], 255);
    }
    assert!(single[(8, 1)] < 255);
}

#[test]
fn global_normalization_removes_seams() {
    init();
    for vertical in [VerticalSupport::Row, VerticalSupport::Image] {
        let sweep = builder(NormalizationScope::Global, vertical).build().unwrap();
        let input = graded_edges(16, 8);

        let single = run(&sweep, &input, 1);
        for threads in [2, 3, 4, 8] {
            assert_eq!(run(&sweep, &input, threads), single, "{vertical:?} with {threads} threads");
        }
    }
}

#[test]
fn image_support_without_sharpening_is_partition_independent_globally() {
    init();
    let sweep = builder(NormalizationScope::Global, VerticalSupport::Image).build().unwrap();
    let input = InputImage::Rgb(ImageRGB8::from_fn(24, 17, |x, y| {
        Rgb([(x * 10) as u8, (y * 15) as u8, ((x * y) % 256) as u8])
    }));
    let single = run(&sweep, &input, 1);
    assert_eq!(run(&sweep, &input, 5), single);
}

#[test]
fn more_threads_than_rows_writes_everything() {
    init();
    let sweep = SweepBuilder::default().build().unwrap();
    let input = graded_edges(10, 3);
    let expected = run(&sweep, &input, 1);

    let mut output = ImageY8::from_fn(10, 3, |_, _| Luma([200]));
    let m = sweep.run_entry(&input, &mut output, 16).unwrap();
    assert_eq!((m.bands, m.active_bands), (16, 1));
    assert_eq!(output, expected);
}

#[test]
fn repeated_entries_are_identical() {
    init();
    let sweep = SweepBuilder::default().build().unwrap();
    let input = graded_edges(32, 20);
    assert_eq!(run(&sweep, &input, 1), run(&sweep, &input, 1));
    assert_eq!(run(&sweep, &input, 4), run(&sweep, &input, 4));
}

#[test]
fn uniform_image_is_black() {
    init();
    let sweep = SweepBuilder::default().build().unwrap();
    let input = InputImage::Gray(ImageY8::from_fn(4, 4, |_, _| Luma([90])));
    for threads in [1, 2, 4, 8] {
        assert!(run(&sweep, &input, threads).to_packed_vec().iter().all(|v| *v == 0));
    }
}

#[test]
fn full_default_sweep() {
    init();
    let sweep = SweepBuilder::default().build().unwrap();
    let input = graded_edges(40, 30);
    let mut output = Sweep::output_for(&input);
    let mut count = 0;
    let report = sweep.run(&input, &mut output, |_| count += 1).unwrap();
    assert_eq!(count, 14);
    let threads = report.measurements.iter().map(|m| m.threads).collect::<Vec<_>>();
    assert_eq!(threads, sobel_sweep::DEFAULT_THREAD_COUNTS.to_vec());
    // 64 workers on 30 rows: only the last band has rows
    assert_eq!(report.measurements[13].active_bands, 1);
    assert_eq!(output, run(&sweep, &input, 64));
}
