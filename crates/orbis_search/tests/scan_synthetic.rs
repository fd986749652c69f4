//! Multi-body return scan against a synthetic natal chart.

use orbis_angle::angular_distance;
use orbis_core::{Body, GeoLocation, LinearProvider, LinearTrack, TimeWindow};
use orbis_search::{
    Decorators, EqualHouses, HouseCalculator, HouseCusps, NatalContext, ReturnInstant,
    ScanOptions, SearchError, scan_returns, scan_returns_with,
};

const ONE_SECOND: f64 = 1.0 / 86_400.0;
const LUNAR_PERIOD: f64 = 360.0 / 13.0;

fn provider() -> LinearProvider {
    LinearProvider::new()
        .with_track(Body::Sun, LinearTrack::new(0.0, 10.0, 1.0))
        .with_track(Body::Moon, LinearTrack::new(0.0, 50.0, 13.0))
}

fn window(a: f64, b: f64) -> TimeWindow {
    TimeWindow::new(a, b).unwrap()
}

fn scan_sun(
    w: &TimeWindow,
    natal: &NatalContext,
    options: &ScanOptions,
) -> Result<Vec<ReturnInstant>, SearchError> {
    scan_returns(&provider(), &[Body::Sun], w, natal, options)
}

#[test]
fn solar_returns_skip_the_natal_instant() {
    let natal = NatalContext::new(0.0);
    let hits = scan_sun(&window(-100.0, 1000.0), &natal, &ScanOptions::default()).unwrap();
    let jds: Vec<f64> = hits.iter().map(|h| h.exact_jd).collect();
    assert_eq!(jds.len(), 2, "{jds:?}");
    assert!((jds[0] - 360.0).abs() < ONE_SECOND);
    assert!((jds[1] - 720.0).abs() < ONE_SECOND);
    assert!(hits.iter().all(|h| h.target_longitude_deg == 10.0));
}

#[test]
fn bodies_are_merged_in_time_order() {
    let natal = NatalContext::new(0.0);
    let hits = scan_returns(
        &provider(),
        &[Body::Sun, Body::Moon],
        &window(100.0, 400.0),
        &natal,
        &ScanOptions::default(),
    )
    .unwrap();

    let lunar: Vec<f64> = hits
        .iter()
        .filter(|h| h.body == Body::Moon)
        .map(|h| h.exact_jd)
        .collect();
    assert_eq!(lunar.len(), 11, "{lunar:?}");
    for (i, jd) in lunar.iter().enumerate() {
        let expected = LUNAR_PERIOD * (i as f64 + 4.0);
        assert!((jd - expected).abs() < ONE_SECOND, "i={i} jd={jd}");
    }
    assert_eq!(hits.iter().filter(|h| h.body == Body::Sun).count(), 1);
    assert_eq!(hits.len(), 12);
    assert!(hits.windows(2).all(|w| w[0].exact_jd <= w[1].exact_jd));
    assert!(hits.iter().all(|h| h.residual_arcsec <= 5.0));
}

#[test]
fn hits_are_decorated() {
    let mut natal = NatalContext::new(0.0);
    natal.points = vec![Body::Sun, Body::Moon];
    natal.location = Some(GeoLocation::new(40.0, -74.0, 10.0));
    let options = ScanOptions {
        utc_offset_hours: Some(-5.0),
        aspect_bodies: vec![Body::Sun],
        ..ScanOptions::default()
    };

    let hits = scan_sun(&window(100.0, 400.0), &natal, &options).unwrap();
    assert_eq!(hits.len(), 1);
    let hit = &hits[0];

    let local = hit.local_jd.expect("local jd");
    assert!((local - (hit.exact_jd - 5.0 / 24.0)).abs() < 1e-9);

    let houses = hit.houses.expect("houses");
    assert_eq!(houses.cusps_deg[0], houses.ascendant_deg);

    // Transiting Sun back on natal Sun; natal Moon sits 40° away.
    assert_eq!(hit.aspects.len(), 1, "{:?}", hit.aspects);
    let a = &hit.aspects[0];
    assert_eq!((a.transiting, a.natal), (Body::Sun, Body::Sun));
    assert_eq!(a.harmonic, 1);
    assert!(a.orb_deg < 1e-3);
}

#[test]
fn empty_harmonics_disable_aspects() {
    let mut natal = NatalContext::new(0.0);
    natal.points = vec![Body::Sun];
    let options = ScanOptions {
        harmonics: Vec::new(),
        ..ScanOptions::default()
    };
    let hits = scan_sun(&window(100.0, 400.0), &natal, &options).unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].aspects.is_empty());
    assert!(hits[0].houses.is_none());
    assert!(hits[0].local_jd.is_none());
}

#[test]
fn decoration_follows_the_provider_time_scale() {
    let mut natal = NatalContext::new(0.0);
    let here = GeoLocation::new(51.5, 0.0, 0.0);
    natal.location = Some(here);
    let options = ScanOptions {
        delta_t_seconds: 69.2,
        utc_offset_hours: Some(0.0),
        ..ScanOptions::default()
    };

    let hit = scan_sun(&window(100.0, 400.0), &natal, &options).unwrap().remove(0);
    let expected = EqualHouses {
        delta_t_seconds: 69.2,
        ..EqualHouses::default()
    }
    .houses(hit.exact_jd, &here)
    .unwrap();
    assert_eq!(hit.houses, Some(expected));
    let ut_houses = EqualHouses::default().houses(hit.exact_jd, &here).unwrap();
    // 69.2 s of Earth rotation moves the midheaven by about 0.29°.
    assert!(angular_distance(expected.midheaven_deg, ut_houses.midheaven_deg) > 0.2);

    let local = hit.local_jd.unwrap();
    assert!((hit.exact_jd - local - 69.2 / 86_400.0).abs() < 1e-9);
}

struct FixedHouses;

impl HouseCalculator for FixedHouses {
    fn houses(&self, _jd: f64, _location: &GeoLocation) -> Result<HouseCusps, SearchError> {
        let mut cusps_deg = [0.0; 12];
        for (i, c) in cusps_deg.iter_mut().enumerate() {
            *c = 30.0 * i as f64;
        }
        Ok(HouseCusps {
            ascendant_deg: 0.0,
            midheaven_deg: 270.0,
            cusps_deg,
        })
    }
}

#[test]
fn custom_decorators_are_used() {
    let mut natal = NatalContext::new(0.0);
    natal.location = Some(GeoLocation::new(51.5, 0.0, 0.0));
    let decorators = Decorators {
        houses: Some(&FixedHouses),
        aspects: None,
    };
    let hits = scan_returns_with(
        &provider(),
        &[Body::Sun],
        &window(100.0, 400.0),
        &natal,
        &ScanOptions::default(),
        &decorators,
    )
    .unwrap();
    assert_eq!(hits[0].houses.unwrap().midheaven_deg, 270.0);

    let bare = scan_returns_with(
        &provider(),
        &[Body::Sun],
        &window(100.0, 400.0),
        &natal,
        &ScanOptions::default(),
        &Decorators::default(),
    )
    .unwrap();
    assert!(bare[0].houses.is_none());
}

#[test]
fn invalid_inputs_are_errors() {
    let natal = NatalContext::new(0.0);
    let options = ScanOptions::default();
    let err = scan_returns(&provider(), &[Body::Mars], &window(0.0, 10.0), &natal, &options);
    assert_eq!(err, Err(SearchError::UnsupportedBody(Body::Mars)));

    let err = scan_returns(
        &provider(),
        &[Body::Sun],
        &window(0.0, 10.0),
        &NatalContext::new(f64::NAN),
        &ScanOptions::default(),
    );
    assert!(matches!(err, Err(SearchError::InvalidConfig(_))));

    let mut natal = NatalContext::new(0.0);
    natal.location = Some(GeoLocation::new(120.0, 0.0, 0.0));
    let err = scan_sun(&window(0.0, 10.0), &natal, &ScanOptions::default());
    assert!(matches!(err, Err(SearchError::InvalidLocation(_))));

    let options = ScanOptions {
        delta_t_seconds: f64::NAN,
        ..ScanOptions::default()
    };
    let err = scan_sun(&window(0.0, 10.0), &NatalContext::new(0.0), &options);
    assert!(matches!(err, Err(SearchError::InvalidConfig(_))));
}
