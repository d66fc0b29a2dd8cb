//! # Sensor Reading Types
//!
//! One reading shape per sensor kind, collected under the [`SensorValue`]
//! tagged union. Readings are plain data; packing lives in
//! [`codec`](super::codec) and display logic in [`render`](super::render).

use serde::{Deserialize, Serialize};

use super::SensorKind;

/// UTC timestamp reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeReading {
    /// UTC unix seconds
    pub utc: i64,
}

/// Free-text information reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationReading {
    pub contents: String,
}

/// Reception metadata for a relayed telemetry message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceivedReading {
    /// Address of the peer the message was received from
    pub by: Vec<u8>,

    /// Address of the relay the message travelled via
    pub via: Vec<u8>,

    /// Geodesic distance the message was relayed over, if known
    pub geodesic_distance: Option<f64>,

    /// Straight-line distance the message was relayed over, if known
    pub euclidian_distance: Option<f64>,
}

/// Battery state reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryReading {
    /// Charge level in percent
    pub charge_percent: f64,

    pub charging: bool,

    /// Battery temperature in degrees Celsius, when reported
    pub temperature: Option<f64>,
}

/// Barometric pressure reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureReading {
    /// Pressure in millibar
    pub mbar: f64,
}

/// Position fix.
///
/// Optional fields are unset when the fix source did not report them; they
/// are zero-filled at packing time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationReading {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Altitude above the reference ellipsoid in meters
    pub altitude: Option<f64>,

    /// Ground speed in meters per second
    pub speed: Option<f64>,

    /// Bearing in degrees
    pub bearing: Option<f64>,

    /// Reported accuracy radius in meters
    pub accuracy: Option<f64>,

    /// UTC unix seconds of the fix
    pub last_update: i64,
}

impl LocationReading {
    /// The fix as a geodesy coordinate (unset altitude becomes 0)
    pub fn coordinate(&self) -> crate::geodesy::Coordinate {
        crate::geodesy::Coordinate::with_altitude(
            self.latitude,
            self.longitude,
            self.altitude.unwrap_or(0.0),
        )
    }
}

/// Radio link quality reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalLinkReading {
    /// Received signal strength in dBm
    pub rssi: Option<f64>,

    /// Signal-to-noise ratio in dB
    pub snr: Option<f64>,

    /// Link quality in percent
    pub quality: Option<f64>,
}

/// Ambient temperature reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    pub celsius: f64,
}

/// Relative humidity reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HumidityReading {
    pub percent_relative: f64,
}

/// Three-axis vector reading, used by the magnetic field (uT), gravity and
/// acceleration (m/s^2) and angular velocity (deg/s) sensors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3Reading {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Ambient light reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientLightReading {
    pub lux: f64,
}

/// Proximity detector reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProximityReading {
    pub near: bool,
}

/// One labelled entry of a power consumption/production sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerReading {
    pub label: String,
    pub watts: f64,
}

/// One labelled entry of a processor/RAM/NVM utilisation sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageReading {
    pub label: String,

    /// Utilisation in percent
    pub percent: f64,

    /// Currently used amount, sensor-defined unit
    pub current: f64,

    /// Total available amount, sensor-defined unit
    pub total: f64,
}

/// One labelled entry of a tank or fuel level sensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankReading {
    pub label: String,

    /// Display unit for capacity and level, when set
    pub unit: Option<String>,

    /// Fill level in percent
    pub percent: f64,

    pub capacity: f64,

    pub level: f64,
}

/// User-defined sensor reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomReading {
    pub contents: String,

    /// Optional label describing what the contents represent
    pub type_label: Option<String>,
}

/// Tagged union over all sensor reading shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SensorValue {
    Time(TimeReading),
    Location(LocationReading),
    Information(InformationReading),
    Received(ReceivedReading),
    Battery(BatteryReading),
    Pressure(PressureReading),
    PhysicalLink(PhysicalLinkReading),
    Temperature(TemperatureReading),
    Humidity(HumidityReading),
    MagneticField(Vector3Reading),
    AmbientLight(AmbientLightReading),
    Gravity(Vector3Reading),
    AngularVelocity(Vector3Reading),
    Acceleration(Vector3Reading),
    Proximity(ProximityReading),
    PowerConsumption(Vec<PowerReading>),
    PowerProduction(Vec<PowerReading>),
    Processor(Vec<UsageReading>),
    Ram(Vec<UsageReading>),
    Nvm(Vec<UsageReading>),
    Tank(Vec<TankReading>),
    Fuel(Vec<TankReading>),
    Custom(CustomReading),
}

impl SensorValue {
    /// The sensor kind this reading belongs to
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorValue::Time(_) => SensorKind::Time,
            SensorValue::Location(_) => SensorKind::Location,
            SensorValue::Information(_) => SensorKind::Information,
            SensorValue::Received(_) => SensorKind::Received,
            SensorValue::Battery(_) => SensorKind::Battery,
            SensorValue::Pressure(_) => SensorKind::Pressure,
            SensorValue::PhysicalLink(_) => SensorKind::PhysicalLink,
            SensorValue::Temperature(_) => SensorKind::Temperature,
            SensorValue::Humidity(_) => SensorKind::Humidity,
            SensorValue::MagneticField(_) => SensorKind::MagneticField,
            SensorValue::AmbientLight(_) => SensorKind::AmbientLight,
            SensorValue::Gravity(_) => SensorKind::Gravity,
            SensorValue::AngularVelocity(_) => SensorKind::AngularVelocity,
            SensorValue::Acceleration(_) => SensorKind::Acceleration,
            SensorValue::Proximity(_) => SensorKind::Proximity,
            SensorValue::PowerConsumption(_) => SensorKind::PowerConsumption,
            SensorValue::PowerProduction(_) => SensorKind::PowerProduction,
            SensorValue::Processor(_) => SensorKind::Processor,
            SensorValue::Ram(_) => SensorKind::Ram,
            SensorValue::Nvm(_) => SensorKind::Nvm,
            SensorValue::Tank(_) => SensorKind::Tank,
            SensorValue::Fuel(_) => SensorKind::Fuel,
            SensorValue::Custom(_) => SensorKind::Custom,
        }
    }
}
