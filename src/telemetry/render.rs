//! # Telemetry Rendering
//!
//! Turns sensor readings into display-oriented structures for UI and MQTT
//! consumers. When a peer telemeter is supplied, comparable sensors report
//! deltas and the location sensor reports the full geodesic relationship
//! (distances, look angle, shared radio horizon).
//!
//! Unknown derived quantities (a non-converged geodesic distance) are
//! omitted from the output rather than reported as errors.

use serde_json::{json, Value as Json};

use super::readings::{LocationReading, SensorValue};
use super::sensor::Sensor;
use super::telemeter::Telemeter;
use super::SensorKind;
use crate::geodesy::{
    angle_to_horizon, azalt, euclidian_distance, orthodromic_distance, radio_horizon,
    shared_radio_horizon,
};

/// Geoid lookup converting ellipsoidal height to altitude above mean sea
/// level. The model behind it (source data, interpolation) lives outside
/// this subsystem; implementations are expected to be pure and
/// deterministic.
pub trait GeoidModel: Send + Sync {
    fn altitude_amsl(&self, altitude: f64, latitude: f64, longitude: f64) -> f64;
}

/// Display-oriented view of one sensor reading
#[derive(Debug, Clone, serde::Serialize)]
pub struct RenderedReading {
    /// Display icon hint
    pub icon: &'static str,

    /// Sensor registry name
    pub name: &'static str,

    /// Flattenable value tree (numbers, strings, booleans, nested maps)
    pub values: Json,
}

/// Render a sensor's current reading, if any.
///
/// `relative_to` is the observer's own telemeter; when it holds a sensor of
/// the same kind, comparable sensors add deltas and the location sensor
/// adds the derived geometry.
pub fn render_sensor(
    sensor: &Sensor,
    relative_to: Option<&Telemeter>,
    geoid: Option<&dyn GeoidModel>,
) -> Option<RenderedReading> {
    let value = sensor.data()?;
    let kind = sensor.kind();

    let values = match value {
        SensorValue::Time(t) => json!({ "utc": t.utc }),

        SensorValue::Location(fix) => render_location(fix, relative_to, geoid),

        SensorValue::Information(i) => json!({ "contents": i.contents }),

        SensorValue::Received(r) => {
            let mut values = json!({
                "by": hex_string(&r.by),
                "via": hex_string(&r.via),
            });
            if let Some(d) = r.geodesic_distance {
                values["distance"]["geodesic"] = json!(d);
            }
            if let Some(d) = r.euclidian_distance {
                values["distance"]["euclidian"] = json!(d);
            }
            values
        }

        SensorValue::Battery(b) => {
            let mut values = json!({
                "charge_percent": b.charge_percent,
                "charging": b.charging,
            });
            if let Some(t) = b.temperature {
                values["temperature"] = json!(t);
            }
            values
        }

        SensorValue::Pressure(p) => {
            let mut values = json!({ "mbar": p.mbar });
            if let Some(SensorValue::Pressure(own)) =
                peer_value(relative_to, SensorKind::Pressure)
            {
                values["delta"] = json!(p.mbar - own.mbar);
            }
            values
        }

        SensorValue::PhysicalLink(l) => {
            let mut values = json!({});
            if let Some(rssi) = l.rssi {
                values["rssi"] = json!(rssi);
            }
            if let Some(snr) = l.snr {
                values["snr"] = json!(snr);
            }
            if let Some(quality) = l.quality {
                values["quality"] = json!(quality);
            }
            values
        }

        SensorValue::Temperature(t) => json!({ "celsius": t.celsius }),

        SensorValue::Humidity(h) => json!({ "percent_relative": h.percent_relative }),

        SensorValue::MagneticField(v)
        | SensorValue::Gravity(v)
        | SensorValue::AngularVelocity(v)
        | SensorValue::Acceleration(v) => json!({ "x": v.x, "y": v.y, "z": v.z }),

        SensorValue::AmbientLight(l) => {
            let mut values = json!({ "lux": l.lux });
            if let Some(SensorValue::AmbientLight(own)) =
                peer_value(relative_to, SensorKind::AmbientLight)
            {
                values["delta"] = json!(l.lux - own.lux);
            }
            values
        }

        SensorValue::Proximity(p) => json!({ "near": p.near }),

        SensorValue::PowerConsumption(entries) | SensorValue::PowerProduction(entries) => {
            json!(entries)
        }

        SensorValue::Processor(entries) | SensorValue::Ram(entries) | SensorValue::Nvm(entries) => {
            json!(entries)
        }

        SensorValue::Tank(entries) | SensorValue::Fuel(entries) => json!(entries),

        SensorValue::Custom(c) => {
            let mut values = json!({ "contents": c.contents });
            if let Some(label) = &c.type_label {
                values["type_label"] = json!(label);
            }
            values
        }
    };

    Some(RenderedReading {
        icon: kind.icon(),
        name: kind.name(),
        values,
    })
}

/// Location rendering: the fix itself, own horizon figures, and (when the
/// observer also has a fix) the full relationship between the two.
fn render_location(
    fix: &LocationReading,
    relative_to: Option<&Telemeter>,
    geoid: Option<&dyn GeoidModel>,
) -> Json {
    let target = fix.coordinate();

    let mut values = json!({
        "latitude": fix.latitude,
        "longitude": fix.longitude,
        "altitude": fix.altitude.unwrap_or(0.0),
        "speed": fix.speed.unwrap_or(0.0),
        "bearing": fix.bearing.unwrap_or(0.0),
        "accuracy": fix.accuracy.unwrap_or(0.0),
        "updated": fix.last_update,
        "angle_to_horizon": angle_to_horizon(target.altitude),
        "radio_horizon": radio_horizon(target.altitude),
    });

    if let Some(geoid) = geoid {
        values["altitude_amsl"] =
            json!(geoid.altitude_amsl(target.altitude, fix.latitude, fix.longitude));
    }

    if let Some(SensorValue::Location(own)) = peer_value(relative_to, SensorKind::Location) {
        let observer = own.coordinate();
        let look = azalt(observer, target, true);

        let mut relative = json!({
            "euclidian_distance": euclidian_distance(observer, target, true),
            "azimuth": look.azimuth,
            "altitude_angle": look.altitude,
            "altitude_delta": target.altitude - observer.altitude,
            "above_horizon": look.altitude >= -angle_to_horizon(observer.altitude),
        });

        // A non-converged geodesic distance is simply omitted.
        if let Some(d) = orthodromic_distance(observer, target, true) {
            relative["orthodromic_distance"] = json!(d);
        }

        let sh = shared_radio_horizon(observer, target);
        relative["shared_radio_horizon"] = json!({
            "own": sh.horizon1,
            "peer": sh.horizon2,
            "combined": sh.combined,
            "within": sh.within,
            "geodesic_distance": sh.geodesic_distance,
            "antenna_distance": sh.antenna_distance,
        });

        values["relative"] = relative;
    }

    values
}

fn peer_value(telemeter: Option<&Telemeter>, kind: SensorKind) -> Option<&SensorValue> {
    telemeter?.peek(kind.name())
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
