//! Body identifiers.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bodies the search engine can be asked about.
///
/// Names are resolved to this enum once, at the boundary (see the
/// [`FromStr`] impl); everything below works on the closed type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    /// Numbered minor planet (e.g. `Asteroid(2060)` for Chiron).
    Asteroid(u32),
}

/// Sun through Pluto, in the order used for default scans.
pub const CLASSICAL_BODIES: [Body; 10] = [
    Body::Sun,
    Body::Moon,
    Body::Mercury,
    Body::Venus,
    Body::Mars,
    Body::Jupiter,
    Body::Saturn,
    Body::Uranus,
    Body::Neptune,
    Body::Pluto,
];

impl Body {
    /// Approximate mean period of the body's geocentric longitude, in days.
    ///
    /// Mercury and Venus follow the Sun on average, so their mean return
    /// period is one year. `None` for bodies without a table entry.
    pub const fn mean_period_days(self) -> Option<f64> {
        match self {
            Self::Sun => Some(365.242_19),
            Self::Moon => Some(27.321_582),
            Self::Mercury | Self::Venus => Some(365.25),
            Self::Mars => Some(686.98),
            Self::Jupiter => Some(4_332.59),
            Self::Saturn => Some(10_759.22),
            Self::Uranus => Some(30_688.5),
            Self::Neptune => Some(60_182.0),
            Self::Pluto => Some(90_560.0),
            Self::Asteroid(_) => None,
        }
    }

    /// Standard altitude of the body's center at rise/set, in degrees.
    ///
    /// Sun: -50' (34' refraction + 16' semidiameter). Moon: +0.125°, the
    /// mean parallax outweighing refraction and semidiameter. Point-like
    /// bodies: -34' (refraction only).
    pub const fn standard_altitude_deg(self) -> f64 {
        match self {
            Self::Sun => -50.0 / 60.0,
            Self::Moon => 0.125,
            _ => -34.0 / 60.0,
        }
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> String {
        match self {
            Self::Sun => "sun".into(),
            Self::Moon => "moon".into(),
            Self::Mercury => "mercury".into(),
            Self::Venus => "venus".into(),
            Self::Mars => "mars".into(),
            Self::Jupiter => "jupiter".into(),
            Self::Saturn => "saturn".into(),
            Self::Uranus => "uranus".into(),
            Self::Neptune => "neptune".into(),
            Self::Pluto => "pluto".into(),
            Self::Asteroid(n) => format!("asteroid:{n}"),
        }
    }
}

impl Display for Body {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// A body name that does not resolve to a [`Body`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown body name: {0:?}")]
pub struct ParseBodyError(pub String);

impl FromStr for Body {
    type Err = ParseBodyError;

    /// Case-insensitive. Minor planets: `asteroid:<number>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let body = match lower.as_str() {
            "sun" => Self::Sun,
            "moon" => Self::Moon,
            "mercury" => Self::Mercury,
            "venus" => Self::Venus,
            "mars" => Self::Mars,
            "jupiter" => Self::Jupiter,
            "saturn" => Self::Saturn,
            "uranus" => Self::Uranus,
            "neptune" => Self::Neptune,
            "pluto" => Self::Pluto,
            other => {
                let number = other
                    .strip_prefix("asteroid:")
                    .and_then(|n| n.parse::<u32>().ok())
                    .ok_or_else(|| ParseBodyError(s.to_string()))?;
                Self::Asteroid(number)
            }
        };
        Ok(body)
    }
}
