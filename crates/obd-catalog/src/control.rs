//! Adapter Control Commands
//!
//! AT-style setup commands sent during session initialization.

use serde::{Deserialize, Serialize};

/// Wire protocol the adapter should use toward the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Protocol {
    /// Automatic protocol detection
    #[default]
    Auto,
    /// SAE J1850 PWM
    J1850Pwm,
    /// SAE J1850 VPW
    J1850Vpw,
    /// ISO 9141-2
    Iso9141_2,
    /// ISO 14230-4 KWP, slow init
    Kwp2000Slow,
    /// ISO 14230-4 KWP, fast init
    Kwp2000Fast,
    /// ISO 15765-4 CAN, 11-bit ID, 500 kbaud
    Can11Bit500K,
    /// ISO 15765-4 CAN, 29-bit ID, 500 kbaud
    Can29Bit500K,
    /// ISO 15765-4 CAN, 11-bit ID, 250 kbaud
    Can11Bit250K,
    /// ISO 15765-4 CAN, 29-bit ID, 250 kbaud
    Can29Bit250K,
}

impl Protocol {
    /// ELM `ATSP` digit selecting this protocol
    pub fn elm_digit(&self) -> char {
        match self {
            Protocol::Auto => '0',
            Protocol::J1850Pwm => '1',
            Protocol::J1850Vpw => '2',
            Protocol::Iso9141_2 => '3',
            Protocol::Kwp2000Slow => '4',
            Protocol::Kwp2000Fast => '5',
            Protocol::Can11Bit500K => '6',
            Protocol::Can29Bit500K => '7',
            Protocol::Can11Bit250K => '8',
            Protocol::Can29Bit250K => '9',
        }
    }
}

/// Adapter setup command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Reset the adapter (`ATZ`)
    Reset,
    /// Disable command echo (`ATE0`)
    EchoOff,
    /// Disable line feeds (`ATL0`)
    LineFeedOff,
    /// Response timeout in 4ms units (`ATST hh`)
    Timeout(u8),
    /// Select the vehicle protocol (`ATSP n`)
    SelectProtocol(Protocol),
}

impl ControlCommand {
    /// Request bytes, CR-terminated
    pub fn request(&self) -> String {
        match self {
            ControlCommand::Reset => "ATZ\r".to_string(),
            ControlCommand::EchoOff => "ATE0\r".to_string(),
            ControlCommand::LineFeedOff => "ATL0\r".to_string(),
            ControlCommand::Timeout(units) => format!("ATST{units:02X}\r"),
            ControlCommand::SelectProtocol(protocol) => format!("ATSP{}\r", protocol.elm_digit()),
        }
    }

    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            ControlCommand::Reset => "reset",
            ControlCommand::EchoOff => "echo_off",
            ControlCommand::LineFeedOff => "line_feed_off",
            ControlCommand::Timeout(_) => "timeout",
            ControlCommand::SelectProtocol(_) => "select_protocol",
        }
    }
}

/// The fixed setup sequence sent after opening a channel.
///
/// Mirrors common adapter bring-up: echo off, line feeds off, maximum
/// response timeout, automatic protocol selection. Failures of individual
/// commands are tolerated by the session.
pub fn init_sequence() -> [ControlCommand; 4] {
    [
        ControlCommand::EchoOff,
        ControlCommand::LineFeedOff,
        ControlCommand::Timeout(0xFF),
        ControlCommand::SelectProtocol(Protocol::Auto),
    ]
}
