//! Orbital element records and their validation
//!
//! Loaders hand over loosely-typed JSON records (`RawElementRecord`). Angles in
//! those records are degrees, and numbers may arrive as JSON numbers or as
//! numeric strings (NASA's NeoWs feed sends strings). `validate` is the only
//! way to obtain `OrbitalElements`: it converts every angle to radians in one
//! pass, so no consumer can observe a half-converted record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::f64::consts::TAU;

use crate::core::coordinates::J2000_JD;
use crate::orbital::error::OrbitError;
use crate::orbital::propagation::{self, mean_motion};

/// Eccentricities at or above 1 are pulled back to this value.
///
/// Known approximation: parabolic and hyperbolic records are drawn as very
/// elongated ellipses instead of being rejected.
pub const ECCENTRICITY_CLAMP: f64 = 0.999;

/// Epoch values below this are read as Modified Julian Dates when the record
/// does not say which scale it uses.
const MJD_EPOCH_THRESHOLD: f64 = 1_000_000.0;

const UNNAMED_BODY: &str = "unnamed body";

const NAME_KEYS: &[&str] = &["name", "full_name", "designation"];
const CLASS_KEYS: &[&str] = &["class", "bodyClass", "body_class"];
const SEMI_MAJOR_AXIS_KEYS: &[&str] = &["semiMajorAxis", "semi_major_axis", "a"];
const ECCENTRICITY_KEYS: &[&str] = &["eccentricity", "e"];
const INCLINATION_KEYS: &[&str] = &["inclination", "i"];
const NODE_KEYS: &[&str] = &[
    "longitudeOfAscendingNode",
    "longitude_of_ascending_node",
    "ascending_node_longitude",
    "node",
];
const PERIAPSIS_KEYS: &[&str] = &[
    "argumentOfPeriapsis",
    "argument_of_periapsis",
    "perihelion_argument",
    "peri",
];
const MEAN_ANOMALY_KEYS: &[&str] = &[
    "meanAnomaly",
    "mean_anomaly",
    "meanAnomalyAtEpoch",
    "mean_anomaly_at_epoch",
];
const EPOCH_KEYS: &[&str] = &["epoch", "epoch_osculation", "epochJd"];
const EPOCH_SCALE_KEYS: &[&str] = &["epochScale", "epoch_scale"];
const PERIOD_KEYS: &[&str] = &["orbitalPeriod", "orbital_period", "period"];
const RADIUS_KEYS: &[&str] = &["radius_km", "radiusKm", "radius"];

/// Kind of body a record describes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyClass {
    Planet,
    DwarfPlanet,
    #[default]
    Asteroid,
    Comet,
}

impl BodyClass {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "planet" => Some(Self::Planet),
            "dwarf_planet" | "dwarf planet" | "dwarfplanet" => Some(Self::DwarfPlanet),
            "asteroid" | "neo" => Some(Self::Asteroid),
            "comet" | "shower_parent" => Some(Self::Comet),
            _ => None,
        }
    }

    /// Asteroid feeds always carry a mean anomaly; a record without one is broken.
    fn requires_mean_anomaly(self) -> bool {
        matches!(self, Self::Asteroid)
    }
}

/// Time axis an element epoch is expressed on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpochScale {
    #[default]
    Julian,
    ModifiedJulian,
}

impl EpochScale {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jd" | "julian" => Some(Self::Julian),
            "mjd" | "modified_julian" => Some(Self::ModifiedJulian),
            _ => None,
        }
    }

    /// Express a Julian Date on this scale.
    pub fn from_julian(self, jd: f64) -> f64 {
        match self {
            Self::Julian => jd,
            Self::ModifiedJulian => crate::core::coordinates::julian_to_modified(jd),
        }
    }
}

/// A loosely-typed element record as produced by a loader.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawElementRecord {
    fields: Map<String, Value>,
}

impl RawElementRecord {
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Builder used by the built-in catalog and tests.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Name carried by the record itself, if any.
    pub fn explicit_name(&self) -> Option<String> {
        self.lookup(NAME_KEYS)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Name for log messages; nameless records read as "unnamed body".
    pub fn name(&self) -> String {
        self.explicit_name()
            .unwrap_or_else(|| UNNAMED_BODY.to_string())
    }

    fn lookup(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .find_map(|k| self.fields.get(*k))
            .filter(|v| !v.is_null())
    }

    /// Read a numeric field. `Ok(None)` means absent; non-numeric, NaN and
    /// infinite values are errors.
    fn number(&self, label: &str, keys: &[&str]) -> Result<Option<f64>, String> {
        let Some(value) = self.lookup(keys) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed {
            Some(v) if v.is_finite() => Ok(Some(v)),
            Some(v) => Err(format!("{label} is not finite ({v})")),
            None => Err(format!("{label} is not numeric ({value})")),
        }
    }

    fn required(&self, label: &str, keys: &[&str]) -> Result<f64, String> {
        self.number(label, keys)?
            .ok_or_else(|| format!("{label} is missing"))
    }
}

/// Keplerian elements, angles in radians. Immutable once validated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitalElements {
    /// AU
    pub semi_major_axis: f64,
    /// Always in [0, 1)
    pub eccentricity: f64,
    pub inclination: f64,
    pub longitude_of_ascending_node: f64,
    pub argument_of_periapsis: f64,
    pub mean_anomaly_at_epoch: f64,
    /// Reference time, on `epoch_scale`
    pub epoch: f64,
    pub epoch_scale: EpochScale,
    /// Explicit period in days; derived from the semi-major axis when absent
    pub orbital_period_days: Option<f64>,
}

impl OrbitalElements {
    /// Elements at J2000 with zero mean anomaly; angles in radians.
    pub fn new(
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        longitude_of_ascending_node: f64,
        argument_of_periapsis: f64,
    ) -> Self {
        Self {
            semi_major_axis,
            eccentricity,
            inclination,
            longitude_of_ascending_node,
            argument_of_periapsis,
            mean_anomaly_at_epoch: 0.0,
            epoch: J2000_JD,
            epoch_scale: EpochScale::Julian,
            orbital_period_days: None,
        }
    }

    pub fn with_mean_anomaly(mut self, mean_anomaly: f64, epoch: f64, scale: EpochScale) -> Self {
        self.mean_anomaly_at_epoch = mean_anomaly;
        self.epoch = epoch;
        self.epoch_scale = scale;
        self
    }

    pub fn with_period(mut self, period_days: f64) -> Self {
        self.orbital_period_days = Some(period_days);
        self
    }
}

/// Display metadata carried alongside the elements; the orbital core ignores it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BodyMetadata {
    pub radius_km: Option<f64>,
}

/// Output of a successful validation.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedRecord {
    pub name: String,
    /// False when `name` is a placeholder; such records never match by name
    pub named: bool,
    pub class: BodyClass,
    pub elements: OrbitalElements,
    /// The source eccentricity was >= 1 and has been clamped
    pub eccentricity_clamped: bool,
    pub metadata: BodyMetadata,
}

/// Sanitize a raw record. Pure: the input is never modified.
pub fn validate(raw: &RawElementRecord) -> Result<ValidatedRecord, OrbitError> {
    let name = raw.name();
    let named = raw.explicit_name().is_some();
    validate_fields(raw).map_err(|reason| OrbitError::invalid(&name, reason)).map(
        |(class, elements, eccentricity_clamped, metadata)| ValidatedRecord {
            name,
            named,
            class,
            elements,
            eccentricity_clamped,
            metadata,
        },
    )
}

fn validate_fields(
    raw: &RawElementRecord,
) -> Result<(BodyClass, OrbitalElements, bool, BodyMetadata), String> {
    let class = match raw.lookup(CLASS_KEYS) {
        Some(Value::String(s)) => {
            BodyClass::parse(s).ok_or_else(|| format!("unknown body class {s:?}"))?
        }
        Some(other) => return Err(format!("body class is not a string ({other})")),
        None => BodyClass::default(),
    };

    let a = raw.required("semi-major axis", SEMI_MAJOR_AXIS_KEYS)?;
    if a <= 0.0 {
        return Err(format!("semi-major axis must be positive (got {a})"));
    }

    let e_raw = raw.required("eccentricity", ECCENTRICITY_KEYS)?;
    if e_raw < 0.0 {
        return Err(format!("eccentricity must not be negative (got {e_raw})"));
    }
    let eccentricity_clamped = e_raw >= 1.0;
    let e = if eccentricity_clamped {
        ECCENTRICITY_CLAMP
    } else {
        e_raw
    };

    let inclination = raw.required("inclination", INCLINATION_KEYS)?;
    let node = raw.required("longitude of ascending node", NODE_KEYS)?;
    let periapsis = raw.required("argument of periapsis", PERIAPSIS_KEYS)?;

    let mean_anomaly = match raw.number("mean anomaly", MEAN_ANOMALY_KEYS)? {
        Some(m) => m,
        None if class.requires_mean_anomaly() => return Err("mean anomaly is missing".into()),
        None => 0.0,
    };

    let epoch = raw.number("epoch", EPOCH_KEYS)?.unwrap_or(J2000_JD);
    let epoch_scale = match raw.lookup(EPOCH_SCALE_KEYS) {
        Some(Value::String(s)) => {
            EpochScale::parse(s).ok_or_else(|| format!("unknown epoch scale {s:?}"))?
        }
        Some(other) => return Err(format!("epoch scale is not a string ({other})")),
        None if epoch < MJD_EPOCH_THRESHOLD => EpochScale::ModifiedJulian,
        None => EpochScale::Julian,
    };

    let orbital_period_days = match raw.number("orbital period", PERIOD_KEYS)? {
        Some(p) if p <= 0.0 => return Err(format!("orbital period must be positive (got {p})")),
        other => other,
    };

    let radius_km = raw
        .number("radius", RADIUS_KEYS)
        .ok()
        .flatten()
        .filter(|r| *r > 0.0);

    let mut elements = OrbitalElements::new(
        a,
        e,
        inclination.to_radians(),
        node.to_radians().rem_euclid(TAU),
        periapsis.to_radians().rem_euclid(TAU),
    )
    .with_mean_anomaly(mean_anomaly.to_radians().rem_euclid(TAU), epoch, epoch_scale);
    if let Some(period) = orbital_period_days {
        elements = elements.with_period(period);
    }
    let n = mean_motion(&elements);
    if !n.is_finite() || n <= 0.0 {
        return Err(format!(
            "mean motion is not finite (period {} days)",
            propagation::orbital_period_days(&elements)
        ));
    }

    Ok((
        class,
        elements,
        eccentricity_clamped,
        BodyMetadata { radius_km },
    ))
}
