//! Element catalog parsing
//!
//! Accepts three JSON shapes:
//! - a bare array of records
//! - `{ "bodies": [...] }`
//! - the NeoWs browse/feed shape `{ "near_earth_objects": [ { "name", "orbital_data": {...} } ] }`
//!
//! Records are passed through untyped; validation happens when they are handed
//! to the simulation.

use anyhow::{Result, bail};
use bevy::prelude::*;
use serde_json::{Map, Value};

use crate::orbital::RawElementRecord;

const PLANETS_JSON: &str = include_str!("planets.json");

/// Parse a catalog document into raw records.
pub fn parse_records(body: &str) -> Result<Vec<RawElementRecord>> {
    let value: Value = serde_json::from_str(body)?;
    records_from_value(value)
}

pub fn records_from_value(value: Value) -> Result<Vec<RawElementRecord>> {
    match value {
        Value::Array(items) => Ok(plain_records(items)),
        Value::Object(mut map) => {
            if let Some(bodies) = map.remove("bodies") {
                let Value::Array(items) = bodies else {
                    bail!("\"bodies\" is not an array");
                };
                return Ok(plain_records(items));
            }
            match map.remove("near_earth_objects") {
                Some(Value::Array(items)) => Ok(items.into_iter().filter_map(neo_record).collect()),
                // The date-keyed feed endpoint nests arrays under each date
                Some(Value::Object(by_date)) => Ok(by_date
                    .into_iter()
                    .filter_map(|(_, v)| match v {
                        Value::Array(items) => Some(items),
                        _ => None,
                    })
                    .flatten()
                    .filter_map(neo_record)
                    .collect()),
                Some(_) => bail!("\"near_earth_objects\" is not an array"),
                None => bail!("expected an array, \"bodies\" or \"near_earth_objects\""),
            }
        }
        other => bail!("unexpected catalog document ({})", type_name(&other)),
    }
}

/// The eight major planets at J2000, embedded in the binary.
pub fn builtin_planet_records() -> Vec<RawElementRecord> {
    parse_records(PLANETS_JSON).unwrap_or_else(|err| {
        warn!("Built-in planet catalog unreadable: {}", err);
        Vec::new()
    })
}

fn plain_records(items: Vec<Value>) -> Vec<RawElementRecord> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(RawElementRecord::from_map(map)),
            other => {
                warn!("Skipping catalog entry that is not an object ({})", type_name(&other));
                None
            }
        })
        .collect()
}

/// Flatten one NeoWs object: `orbital_data` fields plus the outer name and size.
fn neo_record(item: Value) -> Option<RawElementRecord> {
    let Value::Object(mut outer) = item else {
        return None;
    };
    let mut fields = match outer.remove("orbital_data") {
        Some(Value::Object(map)) => map,
        _ => {
            let name = outer.get("name").and_then(Value::as_str).unwrap_or("unnamed");
            warn!("Skipping {}: no orbital_data", name);
            return None;
        }
    };
    if let Some(name) = outer.remove("name") {
        fields.insert("name".into(), name);
    }
    fields
        .entry("class")
        .or_insert_with(|| Value::String("asteroid".into()));
    if let Some(radius) = estimated_radius_km(&outer) {
        fields.insert("radius_km".into(), radius.into());
    }
    Some(RawElementRecord::from_map(fields))
}

fn estimated_radius_km(outer: &Map<String, Value>) -> Option<f64> {
    let km = outer.get("estimated_diameter")?.get("kilometers")?;
    let min = get_f64(km, "estimated_diameter_min")?;
    let max = get_f64(km, "estimated_diameter_max").unwrap_or(min);
    Some((min + max) / 4.0)
}

fn get_f64(value: &Value, key: &str) -> Option<f64> {
    match value.get(key) {
        Some(Value::Number(num)) => num.as_f64(),
        Some(Value::String(val)) => val.parse::<f64>().ok(),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
