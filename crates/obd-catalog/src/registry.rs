//! Static Command Registry
//!
//! Explicit, ordered catalogs of candidate commands per category. The
//! declaration order below is the probe order during discovery and is part
//! of the contract; tests pin it.

use crate::category::Category;
use crate::descriptor::{Decoder, ProbeDescriptor};

/// Engine category, in probe order
pub const ENGINE: &[ProbeDescriptor] = &[
    ProbeDescriptor::new(Category::Engine, "engine_rpm", 0x0C, Decoder::EngineRpm),
    ProbeDescriptor::new(Category::Engine, "vehicle_speed", 0x0D, Decoder::Speed),
    ProbeDescriptor::new(Category::Engine, "engine_load", 0x04, Decoder::Percentage),
    ProbeDescriptor::new(Category::Engine, "engine_runtime", 0x1F, Decoder::RuntimeSeconds),
    ProbeDescriptor::new(Category::Engine, "mass_air_flow", 0x10, Decoder::MassAirFlow),
    ProbeDescriptor::new(Category::Engine, "throttle_position", 0x11, Decoder::Percentage),
];

/// Fuel category, in probe order
pub const FUEL: &[ProbeDescriptor] = &[
    ProbeDescriptor::new(Category::Fuel, "fuel_level", 0x2F, Decoder::Percentage),
    ProbeDescriptor::new(Category::Fuel, "short_fuel_trim", 0x06, Decoder::FuelTrim),
    ProbeDescriptor::new(Category::Fuel, "long_fuel_trim", 0x07, Decoder::FuelTrim),
    ProbeDescriptor::new(Category::Fuel, "air_fuel_ratio", 0x44, Decoder::AirFuelRatio),
];

/// Pressure category, in probe order
pub const PRESSURE: &[ProbeDescriptor] = &[
    ProbeDescriptor::new(
        Category::Pressure,
        "intake_manifold_pressure",
        0x0B,
        Decoder::Kilopascal,
    ),
    ProbeDescriptor::new(Category::Pressure, "fuel_pressure", 0x0A, Decoder::FuelPressure),
    ProbeDescriptor::new(
        Category::Pressure,
        "barometric_pressure",
        0x33,
        Decoder::Kilopascal,
    ),
    ProbeDescriptor::new(
        Category::Pressure,
        "fuel_rail_pressure",
        0x23,
        Decoder::RailPressure,
    ),
];

/// Temperature category, in probe order
pub const TEMPERATURE: &[ProbeDescriptor] = &[
    ProbeDescriptor::new(Category::Temperature, "coolant_temp", 0x05, Decoder::TemperatureC),
    ProbeDescriptor::new(
        Category::Temperature,
        "intake_air_temp",
        0x0F,
        Decoder::TemperatureC,
    ),
    ProbeDescriptor::new(
        Category::Temperature,
        "ambient_air_temp",
        0x46,
        Decoder::TemperatureC,
    ),
    ProbeDescriptor::new(
        Category::Temperature,
        "engine_oil_temp",
        0x5C,
        Decoder::TemperatureC,
    ),
];

/// Ordered catalog for a category
pub fn catalog(category: Category) -> &'static [ProbeDescriptor] {
    match category {
        Category::Engine => ENGINE,
        Category::Fuel => FUEL,
        Category::Pressure => PRESSURE,
        Category::Temperature => TEMPERATURE,
    }
}
