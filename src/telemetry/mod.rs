//! # Telemetry Module
//!
//! Sensor framework and wire codec for compact telemetry envelopes.
//!
//! This module handles:
//! - The closed set of sensor kinds and their stable 1-byte identifiers
//! - Sensor runtime state (staleness, hardware polling, synthesized data)
//! - Per-sensor payload packing and the MessagePack envelope
//! - Display-oriented rendering, including geodesic relationships between
//!   two telemetry snapshots

pub mod codec;
pub mod readings;
pub mod render;
pub mod sensor;
pub mod telemeter;

pub use readings::SensorValue;
pub use render::{GeoidModel, RenderedReading};
pub use sensor::{Sensor, SensorSource};
pub use telemeter::Telemeter;

/// Reserved null sid, never assigned to a sensor
pub const SID_NONE: u8 = 0x00;

/// Timestamp sid; its envelope value is a bare integer of UTC seconds
pub const SID_TIME: u8 = 0x01;

pub const SID_LOCATION: u8 = 0x02;
pub const SID_INFORMATION: u8 = 0x03;
pub const SID_RECEIVED: u8 = 0x04;
pub const SID_BATTERY: u8 = 0x05;
pub const SID_PRESSURE: u8 = 0x06;
pub const SID_PHYSICAL_LINK: u8 = 0x07;
pub const SID_TEMPERATURE: u8 = 0x08;
pub const SID_HUMIDITY: u8 = 0x09;
pub const SID_MAGNETIC_FIELD: u8 = 0x0A;
pub const SID_AMBIENT_LIGHT: u8 = 0x0B;
pub const SID_GRAVITY: u8 = 0x0C;
pub const SID_ANGULAR_VELOCITY: u8 = 0x0D;
pub const SID_ACCELERATION: u8 = 0x0E;
pub const SID_PROXIMITY: u8 = 0x0F;
pub const SID_POWER_CONSUMPTION: u8 = 0x10;
pub const SID_POWER_PRODUCTION: u8 = 0x11;
pub const SID_PROCESSOR: u8 = 0x12;
pub const SID_RAM: u8 = 0x13;
pub const SID_NVM: u8 = 0x14;
pub const SID_TANK: u8 = 0x15;
pub const SID_FUEL: u8 = 0x16;

/// Reserved sid for user-defined sensors
pub const SID_CUSTOM: u8 = 0xFF;

/// The closed set of sensor kinds.
///
/// Every kind carries a stable sid used as the wire-format map key and a
/// human-readable name used as the registry key. Unknown sids encountered
/// on decode are ignored for forward compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SensorKind {
    Time,
    Location,
    Information,
    Received,
    Battery,
    Pressure,
    PhysicalLink,
    Temperature,
    Humidity,
    MagneticField,
    AmbientLight,
    Gravity,
    AngularVelocity,
    Acceleration,
    Proximity,
    PowerConsumption,
    PowerProduction,
    Processor,
    Ram,
    Nvm,
    Tank,
    Fuel,
    Custom,
}

impl SensorKind {
    /// All sensor kinds, in sid order (custom last)
    pub const ALL: [SensorKind; 23] = [
        SensorKind::Time,
        SensorKind::Location,
        SensorKind::Information,
        SensorKind::Received,
        SensorKind::Battery,
        SensorKind::Pressure,
        SensorKind::PhysicalLink,
        SensorKind::Temperature,
        SensorKind::Humidity,
        SensorKind::MagneticField,
        SensorKind::AmbientLight,
        SensorKind::Gravity,
        SensorKind::AngularVelocity,
        SensorKind::Acceleration,
        SensorKind::Proximity,
        SensorKind::PowerConsumption,
        SensorKind::PowerProduction,
        SensorKind::Processor,
        SensorKind::Ram,
        SensorKind::Nvm,
        SensorKind::Tank,
        SensorKind::Fuel,
        SensorKind::Custom,
    ];

    /// Stable 1-byte identifier used as the envelope map key
    pub fn sid(self) -> u8 {
        match self {
            SensorKind::Time => SID_TIME,
            SensorKind::Location => SID_LOCATION,
            SensorKind::Information => SID_INFORMATION,
            SensorKind::Received => SID_RECEIVED,
            SensorKind::Battery => SID_BATTERY,
            SensorKind::Pressure => SID_PRESSURE,
            SensorKind::PhysicalLink => SID_PHYSICAL_LINK,
            SensorKind::Temperature => SID_TEMPERATURE,
            SensorKind::Humidity => SID_HUMIDITY,
            SensorKind::MagneticField => SID_MAGNETIC_FIELD,
            SensorKind::AmbientLight => SID_AMBIENT_LIGHT,
            SensorKind::Gravity => SID_GRAVITY,
            SensorKind::AngularVelocity => SID_ANGULAR_VELOCITY,
            SensorKind::Acceleration => SID_ACCELERATION,
            SensorKind::Proximity => SID_PROXIMITY,
            SensorKind::PowerConsumption => SID_POWER_CONSUMPTION,
            SensorKind::PowerProduction => SID_POWER_PRODUCTION,
            SensorKind::Processor => SID_PROCESSOR,
            SensorKind::Ram => SID_RAM,
            SensorKind::Nvm => SID_NVM,
            SensorKind::Tank => SID_TANK,
            SensorKind::Fuel => SID_FUEL,
            SensorKind::Custom => SID_CUSTOM,
        }
    }

    /// Resolve a sid back to a kind. Unknown sids yield `None` and are
    /// skipped on decode.
    pub fn from_sid(sid: u8) -> Option<Self> {
        SensorKind::ALL.iter().copied().find(|kind| kind.sid() == sid)
    }

    /// Human-readable registry name
    pub fn name(self) -> &'static str {
        match self {
            SensorKind::Time => "time",
            SensorKind::Location => "location",
            SensorKind::Information => "information",
            SensorKind::Received => "received",
            SensorKind::Battery => "battery",
            SensorKind::Pressure => "pressure",
            SensorKind::PhysicalLink => "physical_link",
            SensorKind::Temperature => "temperature",
            SensorKind::Humidity => "humidity",
            SensorKind::MagneticField => "magnetic_field",
            SensorKind::AmbientLight => "ambient_light",
            SensorKind::Gravity => "gravity",
            SensorKind::AngularVelocity => "angular_velocity",
            SensorKind::Acceleration => "acceleration",
            SensorKind::Proximity => "proximity",
            SensorKind::PowerConsumption => "power_consumption",
            SensorKind::PowerProduction => "power_production",
            SensorKind::Processor => "processor",
            SensorKind::Ram => "ram",
            SensorKind::Nvm => "nvm",
            SensorKind::Tank => "tank",
            SensorKind::Fuel => "fuel",
            SensorKind::Custom => "custom",
        }
    }

    /// Resolve a registry name back to a kind
    pub fn from_name(name: &str) -> Option<Self> {
        SensorKind::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Default staleness window in seconds before a read triggers a fresh
    /// hardware poll. `None` means the reading never goes stale.
    pub fn default_stale_time(self) -> Option<u64> {
        match self {
            SensorKind::Time => Some(0),
            SensorKind::Location => Some(15),
            SensorKind::Information => None,
            SensorKind::Received => None,
            SensorKind::Battery => Some(10),
            SensorKind::Pressure => Some(5),
            SensorKind::PhysicalLink => Some(5),
            SensorKind::Temperature
            | SensorKind::Humidity
            | SensorKind::MagneticField
            | SensorKind::AmbientLight
            | SensorKind::Gravity
            | SensorKind::AngularVelocity
            | SensorKind::Acceleration
            | SensorKind::Proximity => Some(5),
            SensorKind::PowerConsumption | SensorKind::PowerProduction => Some(5),
            SensorKind::Processor | SensorKind::Ram | SensorKind::Nvm => Some(5),
            SensorKind::Tank | SensorKind::Fuel => Some(10),
            SensorKind::Custom => None,
        }
    }

    /// Display icon hint for rendered readings
    pub fn icon(self) -> &'static str {
        match self {
            SensorKind::Time => "clock-time-ten-outline",
            SensorKind::Location => "map-marker",
            SensorKind::Information => "information-variant",
            SensorKind::Received => "arrow-down-bold-hexagon-outline",
            SensorKind::Battery => "battery-outline",
            SensorKind::Pressure => "gauge",
            SensorKind::PhysicalLink => "network-strength-2",
            SensorKind::Temperature => "thermometer",
            SensorKind::Humidity => "water-percent",
            SensorKind::MagneticField => "magnet",
            SensorKind::AmbientLight => "white-balance-sunny",
            SensorKind::Gravity => "arrow-down-thin-circle-outline",
            SensorKind::AngularVelocity => "rotate-orbit",
            SensorKind::Acceleration => "motion",
            SensorKind::Proximity => "signal-distance-variant",
            SensorKind::PowerConsumption => "power-plug-outline",
            SensorKind::PowerProduction => "lightning-bolt",
            SensorKind::Processor => "chip",
            SensorKind::Ram => "memory",
            SensorKind::Nvm => "harddisk",
            SensorKind::Tank => "storage-tank",
            SensorKind::Fuel => "fuel",
            SensorKind::Custom => "ruler",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sid_round_trip() {
        for kind in SensorKind::ALL {
            assert_eq!(SensorKind::from_sid(kind.sid()), Some(kind));
        }
    }

    #[test]
    fn test_name_round_trip() {
        for kind in SensorKind::ALL {
            assert_eq!(SensorKind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_sids_unique() {
        for (i, a) in SensorKind::ALL.iter().enumerate() {
            for b in &SensorKind::ALL[i + 1..] {
                assert_ne!(a.sid(), b.sid(), "{:?} and {:?} share a sid", a, b);
            }
        }
    }

    #[test]
    fn test_reserved_sids() {
        assert_eq!(SensorKind::from_sid(SID_NONE), None);
        assert_eq!(SensorKind::Custom.sid(), 0xFF);
        assert_eq!(SensorKind::Time.sid(), 0x01);
        assert_eq!(SensorKind::Location.sid(), 0x02);
    }

    #[test]
    fn test_unknown_sid_ignored() {
        assert_eq!(SensorKind::from_sid(0x7F), None);
        assert_eq!(SensorKind::from_name("thermocouple"), None);
    }
}
