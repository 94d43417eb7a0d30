//! Command Categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named grouping of related commands with its own ordered catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Engine operation (RPM, speed, load, air flow)
    Engine,
    /// Fuel system (level, trims, air/fuel ratio)
    Fuel,
    /// Pressures (manifold, fuel, barometric)
    Pressure,
    /// Temperatures (coolant, intake, ambient, oil)
    Temperature,
}

impl Category {
    /// Canonical walk order during discovery
    pub const ALL: [Category; 4] = [
        Category::Engine,
        Category::Fuel,
        Category::Pressure,
        Category::Temperature,
    ];

    /// Lowercase category name
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Engine => "engine",
            Category::Fuel => "fuel",
            Category::Pressure => "pressure",
            Category::Temperature => "temperature",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
