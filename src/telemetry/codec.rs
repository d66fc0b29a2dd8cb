//! # Telemetry Codec
//!
//! Per-sensor payload packing and the outer MessagePack envelope.
//!
//! The envelope is a MessagePack map from integer sid (0-255) to a
//! sensor-defined payload. The time sid maps to a bare integer of UTC
//! seconds, never a nested structure. Location uses fixed-point big-endian
//! fields to stay compact on bandwidth-constrained links; most other
//! sensors use small scalar or array encodings.
//!
//! Decode is forward-compatible and lenient: unknown sids and malformed
//! per-sensor payloads are skipped, and only a wholly malformed envelope
//! yields no telemetry at all.

use rmpv::Value;
use tracing::{debug, warn};

use super::readings::*;
use super::SensorKind;
use crate::error::{GeotelError, Result};

/// Round to a fixed number of decimal places
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn opt_f64(value: Option<f64>, decimals: i32) -> Value {
    match value {
        Some(v) => Value::F64(round_to(v, decimals)),
        None => Value::Nil,
    }
}

fn as_opt_f64(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(v) if !v.is_nil() => v.as_f64(),
        _ => None,
    }
}

fn be_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Binary(b) if b.len() == 4 => Some(i32::from_be_bytes([b[0], b[1], b[2], b[3]])),
        _ => None,
    }
}

fn be_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Binary(b) if b.len() == 4 => Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]])),
        _ => None,
    }
}

fn be_u16(value: &Value) -> Option<u16> {
    match value {
        Value::Binary(b) if b.len() == 2 => Some(u16::from_be_bytes([b[0], b[1]])),
        _ => None,
    }
}

/// Pack a reading into its sensor-defined envelope payload
pub fn pack_value(value: &SensorValue) -> Value {
    match value {
        SensorValue::Time(t) => Value::from(t.utc),

        SensorValue::Location(l) => pack_location(l),

        SensorValue::Information(i) => Value::from(i.contents.clone()),

        SensorValue::Received(r) => Value::Array(vec![
            Value::Binary(r.by.clone()),
            Value::Binary(r.via.clone()),
            opt_f64(r.geodesic_distance, 2),
            opt_f64(r.euclidian_distance, 2),
        ]),

        SensorValue::Battery(b) => Value::Array(vec![
            Value::F64(round_to(b.charge_percent, 1)),
            Value::from(b.charging),
            opt_f64(b.temperature, 1),
        ]),

        SensorValue::Pressure(p) => Value::F64(round_to(p.mbar, 2)),

        SensorValue::PhysicalLink(l) => Value::Array(vec![
            opt_f64(l.rssi, 1),
            opt_f64(l.snr, 1),
            opt_f64(l.quality, 1),
        ]),

        SensorValue::Temperature(t) => Value::F64(round_to(t.celsius, 1)),

        SensorValue::Humidity(h) => Value::F64(round_to(h.percent_relative, 1)),

        SensorValue::MagneticField(v)
        | SensorValue::Gravity(v)
        | SensorValue::AngularVelocity(v)
        | SensorValue::Acceleration(v) => Value::Array(vec![
            Value::F64(round_to(v.x, 2)),
            Value::F64(round_to(v.y, 2)),
            Value::F64(round_to(v.z, 2)),
        ]),

        SensorValue::AmbientLight(l) => Value::F64(round_to(l.lux, 2)),

        SensorValue::Proximity(p) => Value::from(p.near),

        SensorValue::PowerConsumption(entries) | SensorValue::PowerProduction(entries) => {
            Value::Array(
                entries
                    .iter()
                    .map(|e| {
                        Value::Array(vec![
                            Value::from(e.label.clone()),
                            Value::F64(round_to(e.watts, 2)),
                        ])
                    })
                    .collect(),
            )
        }

        SensorValue::Processor(entries) | SensorValue::Ram(entries) | SensorValue::Nvm(entries) => {
            Value::Array(
                entries
                    .iter()
                    .map(|e| {
                        Value::Array(vec![
                            Value::from(e.label.clone()),
                            Value::F64(round_to(e.percent, 1)),
                            Value::F64(e.current),
                            Value::F64(e.total),
                        ])
                    })
                    .collect(),
            )
        }

        SensorValue::Tank(entries) | SensorValue::Fuel(entries) => Value::Array(
            entries
                .iter()
                .map(|e| {
                    Value::Array(vec![
                        Value::from(e.label.clone()),
                        match &e.unit {
                            Some(u) => Value::from(u.clone()),
                            None => Value::Nil,
                        },
                        Value::F64(round_to(e.percent, 1)),
                        Value::F64(e.capacity),
                        Value::F64(e.level),
                    ])
                })
                .collect(),
        ),

        SensorValue::Custom(c) => Value::Array(vec![
            Value::from(c.contents.clone()),
            match &c.type_label {
                Some(l) => Value::from(l.clone()),
                None => Value::Nil,
            },
        ]),
    }
}

/// Location payload: a 7-element sequence of fixed-point big-endian fields.
///
/// | # | field       | encoding            | scale |
/// |---|-------------|---------------------|-------|
/// | 0 | latitude    | be signed 32-bit    | 1e6   |
/// | 1 | longitude   | be signed 32-bit    | 1e6   |
/// | 2 | altitude    | be unsigned 32-bit  | 1e2   |
/// | 3 | speed       | be unsigned 32-bit  | 1e2   |
/// | 4 | bearing     | be unsigned 32-bit  | 1e2   |
/// | 5 | accuracy    | be unsigned 16-bit  | 1e2   |
/// | 6 | last_update | raw integer seconds | --    |
///
/// Unset optional fields are zero-filled before packing.
fn pack_location(l: &LocationReading) -> Value {
    let lat = (round_to(l.latitude.clamp(-90.0, 90.0), 6) * 1e6).round() as i32;
    let lon = (round_to(l.longitude.clamp(-180.0, 180.0), 6) * 1e6).round() as i32;
    let alt = (round_to(l.altitude.unwrap_or(0.0).max(0.0), 2) * 1e2).round() as u32;
    let speed = (round_to(l.speed.unwrap_or(0.0).max(0.0), 2) * 1e2).round() as u32;
    let bearing = (round_to(l.bearing.unwrap_or(0.0).max(0.0), 2) * 1e2).round() as u32;
    let accuracy = (round_to(l.accuracy.unwrap_or(0.0).max(0.0), 2) * 1e2).round() as u16;

    Value::Array(vec![
        Value::Binary(lat.to_be_bytes().to_vec()),
        Value::Binary(lon.to_be_bytes().to_vec()),
        Value::Binary(alt.to_be_bytes().to_vec()),
        Value::Binary(speed.to_be_bytes().to_vec()),
        Value::Binary(bearing.to_be_bytes().to_vec()),
        Value::Binary(accuracy.to_be_bytes().to_vec()),
        Value::from(l.last_update),
    ])
}

fn unpack_location(payload: &Value) -> Option<SensorValue> {
    let fields = payload.as_array()?;
    if fields.len() < 7 {
        return None;
    }

    Some(SensorValue::Location(LocationReading {
        latitude: be_i32(&fields[0])? as f64 / 1e6,
        longitude: be_i32(&fields[1])? as f64 / 1e6,
        altitude: Some(be_u32(&fields[2])? as f64 / 1e2),
        speed: Some(be_u32(&fields[3])? as f64 / 1e2),
        bearing: Some(be_u32(&fields[4])? as f64 / 1e2),
        accuracy: Some(be_u16(&fields[5])? as f64 / 1e2),
        last_update: fields[6].as_i64()?,
    }))
}

fn unpack_power(payload: &Value) -> Option<Vec<PowerReading>> {
    payload
        .as_array()?
        .iter()
        .map(|entry| {
            let fields = entry.as_array()?;
            Some(PowerReading {
                label: fields.first()?.as_str()?.to_string(),
                watts: fields.get(1)?.as_f64()?,
            })
        })
        .collect()
}

fn unpack_usage(payload: &Value) -> Option<Vec<UsageReading>> {
    payload
        .as_array()?
        .iter()
        .map(|entry| {
            let fields = entry.as_array()?;
            if fields.len() < 4 {
                return None;
            }
            Some(UsageReading {
                label: fields[0].as_str()?.to_string(),
                percent: fields[1].as_f64()?,
                current: fields[2].as_f64()?,
                total: fields[3].as_f64()?,
            })
        })
        .collect()
}

fn unpack_tank(payload: &Value) -> Option<Vec<TankReading>> {
    payload
        .as_array()?
        .iter()
        .map(|entry| {
            let fields = entry.as_array()?;
            if fields.len() < 5 {
                return None;
            }
            Some(TankReading {
                label: fields[0].as_str()?.to_string(),
                unit: if fields[1].is_nil() {
                    None
                } else {
                    Some(fields[1].as_str()?.to_string())
                },
                percent: fields[2].as_f64()?,
                capacity: fields[3].as_f64()?,
                level: fields[4].as_f64()?,
            })
        })
        .collect()
}

fn unpack_vector3(payload: &Value) -> Option<Vector3Reading> {
    let fields = payload.as_array()?;
    if fields.len() < 3 {
        return None;
    }
    Some(Vector3Reading {
        x: fields[0].as_f64()?,
        y: fields[1].as_f64()?,
        z: fields[2].as_f64()?,
    })
}

fn as_binary(value: &Value) -> Option<Vec<u8>> {
    match value {
        Value::Binary(b) => Some(b.clone()),
        _ => None,
    }
}

/// Unpack a sensor-defined payload back into a reading.
///
/// Returns `None` on any shape mismatch; the caller skips the sensor and
/// continues with the rest of the envelope.
pub fn unpack_value(kind: SensorKind, payload: &Value) -> Option<SensorValue> {
    match kind {
        SensorKind::Time => Some(SensorValue::Time(TimeReading {
            utc: payload.as_i64()?,
        })),

        SensorKind::Location => unpack_location(payload),

        SensorKind::Information => Some(SensorValue::Information(InformationReading {
            contents: payload.as_str()?.to_string(),
        })),

        SensorKind::Received => {
            let fields = payload.as_array()?;
            if fields.len() < 2 {
                return None;
            }
            Some(SensorValue::Received(ReceivedReading {
                by: as_binary(&fields[0])?,
                via: as_binary(&fields[1])?,
                geodesic_distance: as_opt_f64(fields.get(2)),
                euclidian_distance: as_opt_f64(fields.get(3)),
            }))
        }

        SensorKind::Battery => {
            let fields = payload.as_array()?;
            if fields.len() < 2 {
                return None;
            }
            Some(SensorValue::Battery(BatteryReading {
                charge_percent: fields[0].as_f64()?,
                charging: fields[1].as_bool()?,
                temperature: as_opt_f64(fields.get(2)),
            }))
        }

        SensorKind::Pressure => Some(SensorValue::Pressure(PressureReading {
            mbar: payload.as_f64()?,
        })),

        SensorKind::PhysicalLink => {
            let fields = payload.as_array()?;
            if fields.len() < 3 {
                return None;
            }
            Some(SensorValue::PhysicalLink(PhysicalLinkReading {
                rssi: as_opt_f64(fields.first()),
                snr: as_opt_f64(fields.get(1)),
                quality: as_opt_f64(fields.get(2)),
            }))
        }

        SensorKind::Temperature => Some(SensorValue::Temperature(TemperatureReading {
            celsius: payload.as_f64()?,
        })),

        SensorKind::Humidity => Some(SensorValue::Humidity(HumidityReading {
            percent_relative: payload.as_f64()?,
        })),

        SensorKind::MagneticField => Some(SensorValue::MagneticField(unpack_vector3(payload)?)),
        SensorKind::Gravity => Some(SensorValue::Gravity(unpack_vector3(payload)?)),
        SensorKind::AngularVelocity => {
            Some(SensorValue::AngularVelocity(unpack_vector3(payload)?))
        }
        SensorKind::Acceleration => Some(SensorValue::Acceleration(unpack_vector3(payload)?)),

        SensorKind::AmbientLight => Some(SensorValue::AmbientLight(AmbientLightReading {
            lux: payload.as_f64()?,
        })),

        SensorKind::Proximity => Some(SensorValue::Proximity(ProximityReading {
            near: payload.as_bool()?,
        })),

        SensorKind::PowerConsumption => Some(SensorValue::PowerConsumption(unpack_power(payload)?)),
        SensorKind::PowerProduction => Some(SensorValue::PowerProduction(unpack_power(payload)?)),

        SensorKind::Processor => Some(SensorValue::Processor(unpack_usage(payload)?)),
        SensorKind::Ram => Some(SensorValue::Ram(unpack_usage(payload)?)),
        SensorKind::Nvm => Some(SensorValue::Nvm(unpack_usage(payload)?)),

        SensorKind::Tank => Some(SensorValue::Tank(unpack_tank(payload)?)),
        SensorKind::Fuel => Some(SensorValue::Fuel(unpack_tank(payload)?)),

        SensorKind::Custom => {
            let fields = payload.as_array()?;
            Some(SensorValue::Custom(CustomReading {
                contents: fields.first()?.as_str()?.to_string(),
                type_label: match fields.get(1) {
                    Some(v) if !v.is_nil() => Some(v.as_str()?.to_string()),
                    _ => None,
                },
            }))
        }
    }
}

/// Encode the outer envelope: a MessagePack map from sid to payload
pub fn encode_envelope(entries: Vec<(u8, Value)>) -> Result<Vec<u8>> {
    let map = Value::Map(
        entries
            .into_iter()
            .map(|(sid, payload)| (Value::from(sid), payload))
            .collect(),
    );

    let mut buffer = Vec::new();
    rmpv::encode::write_value(&mut buffer, &map)
        .map_err(|e| GeotelError::Codec(format!("envelope encode failed: {}", e)))?;
    Ok(buffer)
}

/// Decode the outer envelope into (sid, payload) pairs.
///
/// Returns `None` (logged) when the bytes are not a MessagePack map at all.
/// Map keys that are not integers in the sid range are dropped.
pub fn decode_envelope(bytes: &[u8]) -> Option<Vec<(u8, Value)>> {
    let mut cursor = bytes;
    let value = match rmpv::decode::read_value(&mut cursor) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "malformed telemetry envelope");
            return None;
        }
    };

    let map = match value.as_map() {
        Some(m) => m,
        None => {
            warn!("telemetry envelope is not a map");
            return None;
        }
    };

    let mut entries = Vec::with_capacity(map.len());
    for (key, payload) in map {
        match key.as_u64() {
            Some(sid) if sid <= u8::MAX as u64 => entries.push((sid as u8, payload.clone())),
            _ => debug!(?key, "dropping envelope entry with non-sid key"),
        }
    }
    Some(entries)
}
