//! JSON and text rendering of search results.

use orbis_core::format_iso_utc;
use orbis_search::{
    HorizonEvent, ReturnInstant, ReturnOutcome, RiseSetEvents, TransitEvent, VisibilityWindow,
};
use serde::Serialize;

/// Converts provider-scale epochs back to UTC for display.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    pub delta_t_seconds: f64,
}

impl Clock {
    pub fn to_utc(self, jd: f64) -> f64 {
        jd - self.delta_t_seconds / 86_400.0
    }

    pub fn to_provider(self, jd_utc: f64) -> f64 {
        jd_utc + self.delta_t_seconds / 86_400.0
    }

    pub fn iso(self, jd: f64) -> String {
        format_iso_utc(self.to_utc(jd))
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => crate::fail(format!("failed to serialize output: {e}")),
    }
}

pub fn return_line(hit: &ReturnInstant, clock: Clock) -> String {
    let mut line = format!(
        "{:<10} {:>9.4}°  {}  jd={:.6}  residual={:.3}\"  {:?}",
        hit.body.name(),
        hit.target_longitude_deg,
        clock.iso(hit.exact_jd),
        hit.exact_jd,
        hit.residual_arcsec,
        hit.status,
    );
    if let Some(h) = &hit.houses {
        line.push_str(&format!("  asc={:.2}° mc={:.2}°", h.ascendant_deg, h.midheaven_deg));
    }
    for a in &hit.aspects {
        line.push_str(&format!(
            "  {}-{}@{:.0}°({:.2}°)",
            a.transiting.name(),
            a.natal.name(),
            a.aspect_angle_deg,
            a.orb_deg
        ));
    }
    line
}

pub fn outcome_text(outcome: &ReturnOutcome, clock: Clock) -> String {
    match outcome {
        ReturnOutcome::Found(hit) => return_line(hit, clock),
        ReturnOutcome::NotFound(nf) => format!(
            "{} does not reach {:.4}° between {} and {}",
            nf.body.name(),
            nf.target_longitude_deg,
            clock.iso(nf.window_start_jd),
            clock.iso(nf.window_end_jd),
        ),
    }
}

pub fn riseset_text(ev: &RiseSetEvents, clock: Clock) -> String {
    let show = |jd: Option<f64>| jd.map_or_else(|| "-".to_string(), |jd| clock.iso(jd));
    format!(
        "rise {}  set {}  ({:?}, threshold {:.3}°)",
        show(ev.rise_jd),
        show(ev.set_jd),
        ev.condition,
        ev.threshold_altitude_deg
    )
}

pub fn event_text(event: HorizonEvent, jd: Option<f64>, clock: Clock) -> String {
    match jd {
        Some(jd) => format!("{event:?} {}", clock.iso(jd)),
        None => format!("{event:?}: no crossing in this day"),
    }
}

pub fn transit_text(ev: Option<&TransitEvent>, clock: Clock) -> String {
    match ev {
        Some(t) => format!(
            "transit {}  altitude {:.3}°  {:?}",
            clock.iso(t.jd),
            t.altitude_deg,
            t.status
        ),
        None => "no upper transit in this day".to_string(),
    }
}

pub fn visibility_text(windows: &[VisibilityWindow], clock: Clock) -> String {
    if windows.is_empty() {
        return "no visibility windows".to_string();
    }
    windows
        .iter()
        .map(|w| {
            format!(
                "{} → {}  {:.2} h  peak {:.1}° at {}  score {:.1}",
                clock.iso(w.start_jd),
                clock.iso(w.end_jd),
                w.duration_hours,
                w.peak_altitude_deg,
                clock.iso(w.peak_jd),
                w.score
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_round_trips_delta_t() {
        let clock = Clock {
            delta_t_seconds: 69.2,
        };
        let jd = 2_460_389.5;
        assert!((clock.to_utc(clock.to_provider(jd)) - jd).abs() < 1e-9);
        assert_eq!(clock.iso(clock.to_provider(jd)), "2024-03-20T00:00:00Z");
    }

    #[test]
    fn single_event_line() {
        let clock = Clock {
            delta_t_seconds: 0.0,
        };
        assert_eq!(
            event_text(HorizonEvent::CivilDusk, Some(2_460_389.5), clock),
            "CivilDusk 2024-03-20T00:00:00Z"
        );
        assert_eq!(
            event_text(HorizonEvent::Sunrise, None, clock),
            "Sunrise: no crossing in this day"
        );
    }
}
