use criterion::{Criterion, black_box, criterion_group, criterion_main};
use orbis_core::{
    Body, CachedProvider, GeoLocation, LinearProvider, LinearTrack, MeanElementsProvider,
    SiderealHorizon, TimeWindow, calendar_to_jd,
};
use orbis_search::{
    NatalContext, ReturnConfig, RiseSetConfig, ScanOptions, VisibilityConstraints,
    extract_visibility_windows, find_all_returns_in_window, find_return_instant, find_rise_set,
    scan_returns,
};

fn returns_bench(c: &mut Criterion) {
    let window = TimeWindow::new(calendar_to_jd(2024, 1, 1.0), calendar_to_jd(2025, 1, 1.0))
        .expect("valid window");
    let config = ReturnConfig::default();

    let mut group = c.benchmark_group("search_returns");
    group.sample_size(20);
    group.bench_function("solar_return", |b| {
        b.iter(|| {
            find_return_instant(
                black_box(&MeanElementsProvider),
                Body::Sun,
                black_box(0.0),
                black_box(&window),
                &config,
            )
            .expect("search should succeed")
        })
    });
    group.bench_function("lunar_returns_year", |b| {
        b.iter(|| {
            find_all_returns_in_window(
                black_box(&MeanElementsProvider),
                Body::Moon,
                black_box(120.0),
                black_box(&window),
                &config,
            )
            .expect("search should succeed")
        })
    });
    group.finish();
}

fn riseset_bench(c: &mut Criterion) {
    let day = calendar_to_jd(2024, 6, 21.0);
    let location = GeoLocation::new(28.6139, 77.2090, 0.0);
    let horizon = SiderealHorizon::with_delta_t(69.2);
    let config = RiseSetConfig::default();

    let mut group = c.benchmark_group("search_riseset");
    group.sample_size(20);
    group.bench_function("sunrise_sunset", |b| {
        b.iter(|| {
            find_rise_set(
                black_box(&MeanElementsProvider),
                &horizon,
                Body::Sun,
                black_box(day),
                &location,
                &config,
            )
            .expect("search should succeed")
        })
    });
    group.finish();
}

fn visibility_bench(c: &mut Criterion) {
    let start = calendar_to_jd(2024, 3, 1.0);
    let range = TimeWindow::from_duration(start, 7.0).expect("valid window");
    let constraints = VisibilityConstraints::new(GeoLocation::new(51.4769, 0.0, 0.0))
        .with_min_altitude(20.0)
        .with_max_solar_altitude(-12.0);
    let horizon = SiderealHorizon::with_delta_t(69.2);

    let mut group = c.benchmark_group("search_visibility");
    group.sample_size(20);
    group.bench_function("moon_week", |b| {
        b.iter(|| {
            extract_visibility_windows(
                black_box(&MeanElementsProvider),
                &horizon,
                Body::Moon,
                black_box(&range),
                10.0 / 1440.0,
                &constraints,
            )
            .expect("search should succeed")
        })
    });
    group.finish();
}

fn scan_bench(c: &mut Criterion) {
    let provider = LinearProvider::new()
        .with_track(Body::Sun, LinearTrack::new(0.0, 10.0, 0.9856))
        .with_track(Body::Moon, LinearTrack::new(0.0, 50.0, 13.176))
        .with_track(Body::Mars, LinearTrack::new(0.0, 200.0, 0.524));
    let cached = CachedProvider::new(provider, 8192).expect("capacity > 0");
    let mut natal = NatalContext::new(0.0);
    natal.points = vec![Body::Sun, Body::Moon, Body::Mars];
    natal.location = Some(GeoLocation::new(40.7128, -74.0060, 10.0));
    let window = TimeWindow::new(3_650.0, 7_300.0).expect("valid window");
    let options = ScanOptions::default();

    let mut group = c.benchmark_group("search_scan");
    group.sample_size(10);
    group.bench_function("three_bodies_ten_years", |b| {
        b.iter(|| {
            scan_returns(
                black_box(&cached),
                &[Body::Sun, Body::Moon, Body::Mars],
                black_box(&window),
                &natal,
                &options,
            )
            .expect("scan should succeed")
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    returns_bench,
    riseset_bench,
    visibility_bench,
    scan_bench
);
criterion_main!(benches);
