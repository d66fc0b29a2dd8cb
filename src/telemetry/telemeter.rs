//! # Telemeter
//!
//! The aggregate holding a named set of sensors and the encode/decode
//! logic for the wire envelope.
//!
//! A live telemeter always contains the time sensor; a telemeter decoded
//! from an envelope is permanently synthesized and may contain any subset
//! of the registry. Telemeters perform no internal locking; confine each
//! instance to one thread or lock around it externally.

use std::collections::BTreeMap;

use chrono::Utc;
use rmpv::Value;
use tracing::{debug, warn};

use super::codec;
use super::readings::SensorValue;
use super::render::{render_sensor, GeoidModel, RenderedReading};
use super::sensor::Sensor;
use super::{SensorKind, SID_TIME};
use crate::config::Config;
use crate::error::{GeotelError, Result};

/// Named sensor registry plus the envelope codec
pub struct Telemeter {
    sensors: BTreeMap<SensorKind, Sensor>,
    synthesized: bool,
    config: Config,
    geoid: Option<Box<dyn GeoidModel>>,
}

impl Telemeter {
    /// Create a live telemeter holding the time sensor
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a live telemeter with location policies and staleness windows
    /// taken from `config`
    pub fn with_config(config: Config) -> Self {
        let mut telemeter = Self {
            sensors: BTreeMap::new(),
            synthesized: false,
            config,
            geoid: None,
        };

        let mut time = telemeter.new_sensor(SensorKind::Time);
        if let Err(e) = time.start() {
            warn!(error = %e, "time sensor failed to start");
        }
        telemeter.sensors.insert(SensorKind::Time, time);
        telemeter
    }

    /// Whether this telemeter was decoded from an envelope (permanently
    /// synthesized, never polls hardware)
    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    /// Install a geoid model used by location rendering for
    /// altitude-above-mean-sea-level
    pub fn set_geoid(&mut self, geoid: Box<dyn GeoidModel>) {
        self.geoid = Some(geoid);
    }

    fn new_sensor(&self, kind: SensorKind) -> Sensor {
        let mut sensor = Sensor::new(kind);
        sensor.set_stale_time(self.config.stale_time_for(kind));
        if kind == SensorKind::Location {
            sensor.set_accuracy_target(self.config.location.accuracy_target);
            sensor.set_minimum_distance(self.config.location.minimum_distance);
        }
        sensor
    }

    fn resolve(name: &str) -> Result<SensorKind> {
        SensorKind::from_name(name)
            .ok_or_else(|| GeotelError::Sensor(format!("unknown sensor: {}", name)))
    }

    /// Instantiate (if absent) and start a sensor. Idempotent for already
    /// active sensors. Refused on a decoded telemeter, which cannot poll
    /// hardware.
    pub fn enable(&mut self, name: &str) -> Result<()> {
        if self.synthesized {
            return Err(GeotelError::Sensor(
                "decoded telemetry cannot enable hardware sensors".to_string(),
            ));
        }
        let kind = Self::resolve(name)?;
        if !self.sensors.contains_key(&kind) {
            let sensor = self.new_sensor(kind);
            self.sensors.insert(kind, sensor);
        }
        if let Some(sensor) = self.sensors.get_mut(&kind) {
            sensor.start()?;
        }
        Ok(())
    }

    /// Instantiate a sensor already marked synthesized: active, but with
    /// data injected via [`set_value`](Telemeter::set_value) instead of
    /// hardware polling
    pub fn synthesize(&mut self, name: &str) -> Result<()> {
        let kind = Self::resolve(name)?;
        if !self.sensors.contains_key(&kind) {
            let sensor = self.new_sensor(kind);
            self.sensors.insert(kind, sensor);
        }
        if let Some(sensor) = self.sensors.get_mut(&kind) {
            sensor.start_synthesized();
        }
        Ok(())
    }

    /// Inject a reading into a sensor, creating it (synthesized) if absent
    pub fn set_value(&mut self, name: &str, value: SensorValue) -> Result<()> {
        let kind = Self::resolve(name)?;
        if value.kind() != kind {
            return Err(GeotelError::Sensor(format!(
                "reading of kind {} cannot be set on sensor {}",
                value.kind().name(),
                name
            )));
        }
        if !self.sensors.contains_key(&kind) {
            let sensor = self.new_sensor(kind);
            self.sensors.insert(kind, sensor);
        }
        if let Some(sensor) = self.sensors.get_mut(&kind) {
            sensor.synthesize_value(value);
        }
        Ok(())
    }

    /// Stop and remove a sensor. The time sensor of a live telemeter is
    /// kept; unknown or absent sensors are ignored.
    pub fn disable(&mut self, name: &str) {
        let Ok(kind) = Self::resolve(name) else {
            debug!(name, "ignoring disable of unknown sensor");
            return;
        };
        if kind == SensorKind::Time && !self.synthesized {
            debug!("the time sensor of a live telemeter cannot be disabled");
            return;
        }
        if let Some(mut sensor) = self.sensors.remove(&kind) {
            if sensor.is_active() {
                sensor.stop();
            }
        }
    }

    /// Hang a platform hardware source behind an instantiated sensor
    pub fn attach_source(
        &mut self,
        name: &str,
        source: Box<dyn super::sensor::SensorSource>,
    ) -> Result<()> {
        let kind = Self::resolve(name)?;
        let sensor = self.sensors.get_mut(&kind).ok_or_else(|| {
            GeotelError::Sensor(format!("sensor {} is not instantiated", name))
        })?;
        sensor.attach_source(source)
    }

    /// Read one sensor, refreshing it if stale
    pub fn read(&mut self, name: &str) -> Option<SensorValue> {
        let kind = SensorKind::from_name(name)?;
        self.sensors.get_mut(&kind)?.read()
    }

    /// Current reading of one sensor without triggering a refresh
    pub fn peek(&self, name: &str) -> Option<&SensorValue> {
        let kind = SensorKind::from_name(name)?;
        self.sensors.get(&kind)?.data()
    }

    /// Whether a sensor is instantiated and active
    pub fn is_enabled(&self, name: &str) -> bool {
        SensorKind::from_name(name)
            .and_then(|kind| self.sensors.get(&kind))
            .map(Sensor::is_active)
            .unwrap_or(false)
    }

    /// Name-keyed snapshot of all active sensors that hold data
    pub fn read_all(&mut self) -> BTreeMap<&'static str, SensorValue> {
        let mut readings = BTreeMap::new();
        for sensor in self.sensors.values_mut() {
            if !sensor.is_active() {
                continue;
            }
            if let Some(value) = sensor.read() {
                readings.insert(sensor.kind().name(), value);
            }
        }
        readings
    }

    /// Encode all active sensors into the wire envelope.
    ///
    /// The envelope always carries a time entry: the time sensor's reading
    /// when present, the current UTC seconds otherwise.
    pub fn packed(&mut self) -> Result<Vec<u8>> {
        let mut entries = Vec::with_capacity(self.sensors.len());
        let mut has_time = false;

        for sensor in self.sensors.values_mut() {
            if !sensor.is_active() {
                continue;
            }
            let _ = sensor.read();
            if sensor.kind() == SensorKind::Time && sensor.data().is_none() {
                continue;
            }
            has_time |= sensor.kind() == SensorKind::Time;
            entries.push((sensor.sid(), sensor.pack()));
        }

        if !has_time {
            entries.insert(0, (SID_TIME, Value::from(Utc::now().timestamp())));
        }

        codec::encode_envelope(entries)
    }

    /// Decode an envelope into a permanently synthesized telemeter.
    ///
    /// Unknown sids and malformed per-sensor payloads are skipped; `None`
    /// is returned only when the bytes are not an envelope at all.
    pub fn from_packed(bytes: &[u8]) -> Option<Self> {
        let entries = codec::decode_envelope(bytes)?;

        let mut telemeter = Self {
            sensors: BTreeMap::new(),
            synthesized: true,
            config: Config::default(),
            geoid: None,
        };

        for (sid, payload) in entries {
            let Some(kind) = SensorKind::from_sid(sid) else {
                debug!(sid, "ignoring unknown sid in envelope");
                continue;
            };

            if payload.is_nil() {
                // Present in the envelope but holding no data.
                let mut sensor = telemeter.new_sensor(kind);
                sensor.start_synthesized();
                telemeter.sensors.insert(kind, sensor);
                continue;
            }

            match codec::unpack_value(kind, &payload) {
                Some(value) => {
                    telemeter
                        .sensors
                        .insert(kind, Sensor::synthesized(kind, value));
                }
                None => warn!(sensor = kind.name(), "skipping malformed sensor payload"),
            }
        }

        Some(telemeter)
    }

    /// Render all active sensors for display. `relative_to` is the
    /// observer's own telemeter; comparable sensors report deltas and
    /// derived geometry against it.
    pub fn render(&self, relative_to: Option<&Telemeter>) -> Vec<RenderedReading> {
        self.sensors
            .values()
            .filter(|sensor| sensor.is_active())
            .filter_map(|sensor| render_sensor(sensor, relative_to, self.geoid.as_deref()))
            .collect()
    }

    /// Names of all instantiated sensors
    pub fn sensor_names(&self) -> Vec<&'static str> {
        self.sensors.keys().map(|kind| kind.name()).collect()
    }
}

impl Default for Telemeter {
    fn default() -> Self {
        Self::new()
    }
}
