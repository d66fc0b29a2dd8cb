//! # Sensor Runtime
//!
//! One [`Sensor`] per enabled kind: lifecycle state, staleness-aware
//! refresh, and the [`SensorSource`] seam behind which platform hardware
//! bindings live.
//!
//! Sensors are ordinary mutable state with no internal locking. Confine a
//! sensor (and its owning telemeter) to one thread, or lock around it
//! externally; `refresh_if_stale` blocks on the hardware source.

use chrono::Utc;
use rmpv::Value;
use tracing::debug;

use super::codec;
use super::readings::{LocationReading, SensorValue, TimeReading};
use super::SensorKind;
use crate::error::Result;

/// Default accuracy gate for location fixes in meters
pub const DEFAULT_ACCURACY_TARGET: f64 = 250.0;

/// Default minimum-movement threshold for location sources in meters
pub const DEFAULT_MINIMUM_DISTANCE: f64 = 4.0;

/// Platform hardware binding for one sensor.
///
/// Implementations block in `poll`; errors are swallowed by the owning
/// sensor, which keeps its last reading.
#[cfg_attr(test, mockall::automock)]
pub trait SensorSource: Send {
    /// Arm the hardware for polling
    fn setup(&mut self) -> Result<()>;

    /// Release the hardware
    fn teardown(&mut self);

    /// Poll for a fresh reading. `Ok(None)` means no new reading was
    /// available.
    fn poll(&mut self) -> Result<Option<SensorValue>>;

    /// Configure a minimum-movement threshold in meters, for sources that
    /// support suppressing updates below it (location hardware).
    fn set_minimum_distance(&mut self, _meters: f64) {}
}

/// Built-in source for the time sensor: polling it reads the system clock.
struct ClockSource;

impl SensorSource for ClockSource {
    fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    fn teardown(&mut self) {}

    fn poll(&mut self) -> Result<Option<SensorValue>> {
        Ok(Some(SensorValue::Time(TimeReading {
            utc: Utc::now().timestamp(),
        })))
    }
}

/// Runtime state for one enabled sensor.
///
/// Lifecycle: constructed inactive, [`start`](Sensor::start) arms the
/// hardware source and activates the sensor, [`stop`](Sensor::stop)
/// deactivates it. A synthesized sensor holds externally injected data
/// (a decoded envelope, a manual fix) and never polls hardware.
pub struct Sensor {
    kind: SensorKind,
    stale_time: Option<u64>,
    data: Option<SensorValue>,
    active: bool,
    synthesized: bool,
    last_update: i64,
    last_read: i64,
    source: Option<Box<dyn SensorSource>>,
    accuracy_target: f64,
    minimum_distance: f64,
}

impl std::fmt::Debug for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sensor")
            .field("kind", &self.kind)
            .field("active", &self.active)
            .field("synthesized", &self.synthesized)
            .field("stale_time", &self.stale_time)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

impl Sensor {
    /// Create an inactive sensor with the kind's default staleness window.
    /// The time sensor gets the built-in clock source.
    pub fn new(kind: SensorKind) -> Self {
        let source: Option<Box<dyn SensorSource>> = match kind {
            SensorKind::Time => Some(Box::new(ClockSource)),
            _ => None,
        };

        Self {
            kind,
            stale_time: kind.default_stale_time(),
            data: None,
            active: false,
            synthesized: false,
            last_update: 0,
            last_read: 0,
            source,
            accuracy_target: DEFAULT_ACCURACY_TARGET,
            minimum_distance: DEFAULT_MINIMUM_DISTANCE,
        }
    }

    /// Create an active, synthesized sensor holding a decoded reading
    pub fn synthesized(kind: SensorKind, value: SensorValue) -> Self {
        let mut sensor = Self::new(kind);
        sensor.source = None;
        sensor.active = true;
        sensor.synthesized = true;
        sensor.last_update = now();
        sensor.data = Some(value);
        sensor
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn sid(&self) -> u8 {
        self.kind.sid()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_synthesized(&self) -> bool {
        self.synthesized
    }

    /// UTC seconds of the last committed reading (0 = never)
    pub fn last_update(&self) -> i64 {
        self.last_update
    }

    /// UTC seconds of the last read (0 = never)
    pub fn last_read(&self) -> i64 {
        self.last_read
    }

    /// Override the staleness window (`None` = never stale)
    pub fn set_stale_time(&mut self, stale_time: Option<u64>) {
        self.stale_time = stale_time;
    }

    /// Set the accuracy gate for hardware location fixes
    pub fn set_accuracy_target(&mut self, meters: f64) {
        self.accuracy_target = meters;
    }

    /// Set the minimum-movement threshold, forwarded to the source
    pub fn set_minimum_distance(&mut self, meters: f64) {
        self.minimum_distance = meters;
        if let Some(source) = self.source.as_mut() {
            source.set_minimum_distance(meters);
        }
    }

    /// Attach a hardware source. If the sensor is already active the
    /// source is set up immediately.
    pub fn attach_source(&mut self, mut source: Box<dyn SensorSource>) -> Result<()> {
        source.set_minimum_distance(self.minimum_distance);
        if self.active && !self.synthesized {
            source.setup()?;
        }
        self.source = Some(source);
        Ok(())
    }

    /// Arm the hardware source (if any) and activate the sensor
    pub fn start(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }
        if !self.synthesized {
            if let Some(source) = self.source.as_mut() {
                source.setup()?;
            }
        }
        self.active = true;
        Ok(())
    }

    /// Release the hardware source and deactivate the sensor
    pub fn stop(&mut self) {
        if let Some(source) = self.source.as_mut() {
            source.teardown();
        }
        self.active = false;
    }

    /// Plain accessor; never triggers a refresh
    pub fn data(&self) -> Option<&SensorValue> {
        self.data.as_ref()
    }

    /// Activate the sensor as synthesized, without arming any hardware.
    /// Data arrives via [`synthesize_value`](Sensor::synthesize_value).
    pub fn start_synthesized(&mut self) {
        self.synthesized = true;
        self.active = true;
    }

    /// Inject a reading from outside (decoded envelope, manual fix). The
    /// sensor becomes synthesized and stops polling hardware; location
    /// injections bypass accuracy gating.
    pub fn synthesize_value(&mut self, value: SensorValue) {
        self.synthesized = true;
        self.active = true;
        self.last_update = now();
        self.data = Some(value);
    }

    /// Poll the hardware source if the current reading is stale.
    ///
    /// A read failure leaves the data unchanged and never propagates to the
    /// caller.
    pub fn refresh_if_stale(&mut self) {
        self.refresh_if_stale_at(now());
    }

    fn refresh_if_stale_at(&mut self, now: i64) {
        if self.synthesized {
            return;
        }
        let Some(stale_time) = self.stale_time else {
            return;
        };
        if self.data.is_some() && now <= self.last_update + stale_time as i64 {
            return;
        }
        let Some(source) = self.source.as_mut() else {
            return;
        };

        match source.poll() {
            Ok(Some(value)) => self.commit(value, now),
            Ok(None) => {}
            Err(e) => {
                debug!(sensor = self.kind.name(), error = %e, "poll failed, keeping last reading");
            }
        }
    }

    /// Commit a hardware reading, applying the location accuracy gate
    fn commit(&mut self, value: SensorValue, now: i64) {
        if value.kind() != self.kind {
            debug!(
                sensor = self.kind.name(),
                got = value.kind().name(),
                "source returned reading of wrong kind, dropping"
            );
            return;
        }

        if let SensorValue::Location(LocationReading {
            accuracy: Some(accuracy),
            ..
        }) = value
        {
            if accuracy > self.accuracy_target {
                debug!(
                    accuracy,
                    target = self.accuracy_target,
                    "fix accuracy above target, retaining previous fix"
                );
                return;
            }
        }

        self.data = Some(value);
        self.last_update = now;
    }

    /// Refresh if stale, then return a copy of the reading
    pub fn read(&mut self) -> Option<SensorValue> {
        self.refresh_if_stale();
        self.last_read = now();
        self.data.clone()
    }

    /// Envelope payload for this sensor; explicit nil when it holds no
    /// data, which decodes as "present but empty" rather than absent
    pub fn pack(&self) -> Value {
        match &self.data {
            Some(value) => codec::pack_value(value),
            None => Value::Nil,
        }
    }
}

fn now() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeotelError;
    use crate::telemetry::readings::PressureReading;

    fn pressure(mbar: f64) -> SensorValue {
        SensorValue::Pressure(PressureReading { mbar })
    }

    fn fix(accuracy: Option<f64>) -> SensorValue {
        SensorValue::Location(LocationReading {
            latitude: 51.5,
            longitude: -0.12,
            altitude: Some(35.0),
            speed: None,
            bearing: None,
            accuracy,
            last_update: 1_700_000_000,
        })
    }

    #[test]
    fn test_lifecycle() {
        let mut sensor = Sensor::new(SensorKind::Pressure);
        assert!(!sensor.is_active());
        sensor.start().unwrap();
        assert!(sensor.is_active());
        sensor.stop();
        assert!(!sensor.is_active());
    }

    #[test]
    fn test_time_sensor_reads_clock() {
        let mut sensor = Sensor::new(SensorKind::Time);
        sensor.start().unwrap();
        let Some(SensorValue::Time(t)) = sensor.read() else {
            panic!("no time reading");
        };
        assert!(t.utc > 1_700_000_000);
    }

    #[test]
    fn test_poll_failure_keeps_last_reading() {
        crate::test_support::init_tracing();
        let mut source = MockSensorSource::new();
        source.expect_setup().returning(|| Ok(()));
        source
            .expect_poll()
            .times(1)
            .returning(|| Ok(Some(SensorValue::Pressure(PressureReading { mbar: 1010.0 }))));
        source
            .expect_poll()
            .returning(|| Err(GeotelError::Sensor("bus timeout".to_string())));
        source.expect_set_minimum_distance().return_const(());

        let mut sensor = Sensor::new(SensorKind::Pressure);
        sensor.set_stale_time(Some(0));
        sensor.attach_source(Box::new(source)).unwrap();
        sensor.start().unwrap();

        assert_eq!(sensor.read(), Some(pressure(1010.0)));
        // Force staleness and fail the next poll: the reading survives.
        sensor.refresh_if_stale_at(i64::MAX - 1);
        assert_eq!(sensor.data(), Some(&pressure(1010.0)));
    }

    #[test]
    fn test_not_stale_does_not_poll() {
        let mut source = MockSensorSource::new();
        source.expect_setup().returning(|| Ok(()));
        source.expect_set_minimum_distance().return_const(());
        source
            .expect_poll()
            .times(1)
            .returning(|| Ok(Some(SensorValue::Pressure(PressureReading { mbar: 998.0 }))));

        let mut sensor = Sensor::new(SensorKind::Pressure);
        sensor.set_stale_time(Some(3600));
        sensor.attach_source(Box::new(source)).unwrap();
        sensor.start().unwrap();

        // First read polls (no data yet), second is served from cache; the
        // mock panics if polled more than once.
        assert_eq!(sensor.read(), Some(pressure(998.0)));
        assert_eq!(sensor.read(), Some(pressure(998.0)));
    }

    #[test]
    fn test_synthesized_never_polls() {
        let mut source = MockSensorSource::new();
        source.expect_set_minimum_distance().return_const(());
        // No poll expectation: any poll would panic the mock.

        let mut sensor = Sensor::new(SensorKind::Pressure);
        sensor.set_stale_time(Some(0));
        sensor.attach_source(Box::new(source)).unwrap();
        sensor.synthesize_value(pressure(1002.5));

        assert!(sensor.is_synthesized());
        assert!(sensor.is_active());
        assert_eq!(sensor.read(), Some(pressure(1002.5)));
    }

    #[test]
    fn test_accuracy_gating() {
        let mut source = MockSensorSource::new();
        source.expect_setup().returning(|| Ok(()));
        source.expect_set_minimum_distance().return_const(());
        source.expect_poll().times(1).returning(|| Ok(Some(fix(Some(400.0)))));

        let mut sensor = Sensor::new(SensorKind::Location);
        sensor.set_stale_time(Some(0));
        sensor.attach_source(Box::new(source)).unwrap();
        sensor.start().unwrap();

        // 400 m accuracy is worse than the 250 m default target.
        assert_eq!(sensor.read(), None);

        // A synthesized fix bypasses the gate entirely.
        sensor.synthesize_value(fix(Some(400.0)));
        assert_eq!(sensor.read(), Some(fix(Some(400.0))));
    }

    #[test]
    fn test_accuracy_gate_accepts_good_fix() {
        let mut source = MockSensorSource::new();
        source.expect_setup().returning(|| Ok(()));
        source.expect_set_minimum_distance().return_const(());
        source.expect_poll().returning(|| Ok(Some(fix(Some(5.0)))));

        let mut sensor = Sensor::new(SensorKind::Location);
        sensor.set_stale_time(Some(0));
        sensor.attach_source(Box::new(source)).unwrap();
        sensor.start().unwrap();

        assert_eq!(sensor.read(), Some(fix(Some(5.0))));
    }

    #[test]
    fn test_wrong_kind_reading_dropped() {
        let mut source = MockSensorSource::new();
        source.expect_setup().returning(|| Ok(()));
        source.expect_set_minimum_distance().return_const(());
        source.expect_poll().returning(|| Ok(Some(pressure(1000.0))));

        let mut sensor = Sensor::new(SensorKind::Temperature);
        sensor.set_stale_time(Some(0));
        sensor.attach_source(Box::new(source)).unwrap();
        sensor.start().unwrap();

        assert_eq!(sensor.read(), None);
    }

    #[test]
    fn test_pack_without_data_is_nil() {
        let sensor = Sensor::new(SensorKind::Battery);
        assert_eq!(sensor.pack(), Value::Nil);
    }

    #[test]
    fn test_no_stale_time_never_polls() {
        let mut source = MockSensorSource::new();
        source.expect_setup().returning(|| Ok(()));
        source.expect_set_minimum_distance().return_const(());

        let mut sensor = Sensor::new(SensorKind::Information);
        assert_eq!(sensor.kind().default_stale_time(), None);
        sensor.attach_source(Box::new(source)).unwrap();
        sensor.start().unwrap();
        assert_eq!(sensor.read(), None);
    }
}
