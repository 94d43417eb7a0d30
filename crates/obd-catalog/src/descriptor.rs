//! Probe Descriptors and Decode Formulas
//!
//! A descriptor ties a command identity to its request encoding and the
//! formula that turns payload bytes into a value with a unit.

use crate::category::Category;
use crate::error::DecodeError;
use crate::response;
use std::fmt;

/// Formula applied to a command's payload bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    /// ((A*256)+B)/4 rpm
    EngineRpm,
    /// A km/h
    Speed,
    /// A*100/255 %
    Percentage,
    /// A*256+B seconds
    RuntimeSeconds,
    /// ((A*256)+B)/100 g/s
    MassAirFlow,
    /// (A-128)*100/128 %, signed around zero
    FuelTrim,
    /// ((A*256)+B)/32768*14.64 ratio
    AirFuelRatio,
    /// A kPa
    Kilopascal,
    /// A*3 kPa
    FuelPressure,
    /// ((A*256)+B)*10 kPa
    RailPressure,
    /// A-40 degrees Celsius
    TemperatureC,
}

impl Decoder {
    /// Unit suffix for formatted output
    pub fn unit(&self) -> &'static str {
        match self {
            Decoder::EngineRpm => "RPM",
            Decoder::Speed => "km/h",
            Decoder::Percentage | Decoder::FuelTrim => "%",
            Decoder::RuntimeSeconds => "s",
            Decoder::MassAirFlow => "g/s",
            Decoder::AirFuelRatio => ":1",
            Decoder::Kilopascal | Decoder::FuelPressure | Decoder::RailPressure => "kPa",
            Decoder::TemperatureC => "C",
        }
    }

    /// Number of payload bytes the formula consumes
    pub fn payload_len(&self) -> usize {
        match self {
            Decoder::EngineRpm
            | Decoder::RuntimeSeconds
            | Decoder::MassAirFlow
            | Decoder::AirFuelRatio
            | Decoder::RailPressure => 2,
            _ => 1,
        }
    }

    /// Apply the formula to payload bytes
    pub fn decode(&self, bytes: &[u8]) -> Result<f64, DecodeError> {
        if bytes.len() < self.payload_len() {
            return Err(DecodeError::ShortPayload {
                expected: self.payload_len(),
                actual: bytes.len(),
            });
        }

        let a = bytes[0] as f64;
        let b = bytes.get(1).copied().unwrap_or(0) as f64;

        Ok(match self {
            Decoder::EngineRpm => (a * 256.0 + b) / 4.0,
            Decoder::Speed => a,
            Decoder::Percentage => a * 100.0 / 255.0,
            Decoder::RuntimeSeconds => a * 256.0 + b,
            Decoder::MassAirFlow => (a * 256.0 + b) / 100.0,
            Decoder::FuelTrim => (a - 128.0) * 100.0 / 128.0,
            Decoder::AirFuelRatio => (a * 256.0 + b) / 32768.0 * 14.64,
            Decoder::Kilopascal => a,
            Decoder::FuelPressure => a * 3.0,
            Decoder::RailPressure => (a * 256.0 + b) * 10.0,
            Decoder::TemperatureC => a - 40.0,
        })
    }
}

/// Decoded value with its unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedValue {
    /// Numeric value after applying the formula
    pub value: f64,
    /// Unit suffix
    pub unit: &'static str,
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.fract() == 0.0 {
            write!(f, "{:.0} {}", self.value, self.unit)
        } else {
            write!(f, "{:.2} {}", self.value, self.unit)
        }
    }
}

/// A single candidate command: identity, request encoding, decode formula.
///
/// Immutable once constructed; the registry hands out `'static` references.
#[derive(Debug, PartialEq, Eq)]
pub struct ProbeDescriptor {
    /// Catalog category this command belongs to
    pub category: Category,
    /// Unique name within the catalog
    pub name: &'static str,
    /// OBD service (mode) byte
    pub mode: u8,
    /// Parameter ID within the mode
    pub pid: u8,
    /// Formula for the payload bytes
    pub decoder: Decoder,
}

impl ProbeDescriptor {
    /// Mode-01 descriptor
    pub const fn new(category: Category, name: &'static str, pid: u8, decoder: Decoder) -> Self {
        Self {
            category,
            name,
            mode: 0x01,
            pid,
            decoder,
        }
    }

    /// Identity string, `category/name`
    pub fn id(&self) -> String {
        format!("{}/{}", self.category.as_str(), self.name)
    }

    /// Request bytes for this command, CR-terminated
    pub fn request(&self) -> String {
        format!("{:02X}{:02X}\r", self.mode, self.pid)
    }

    /// Decode a raw adapter response into a value
    pub fn decode(&self, raw: &str) -> Result<DecodedValue, DecodeError> {
        let payload = response::payload_bytes(&response::clean(raw), self.mode, self.pid)?;
        let value = self.decoder.decode(&payload)?;
        Ok(DecodedValue {
            value,
            unit: self.decoder.unit(),
        })
    }
}
