//! Service configuration.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bufr_conversion::command::{DEFAULT_BRIDGE_SCRIPT, DEFAULT_ENGINE_PROGRAM};
use bufr_conversion::CommandEngineConfig;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5001;

pub const PORT_VAR: &str = "CSV2BUFR_PORT";
pub const DEBUG_VAR: &str = "CSV2BUFR_DEBUG";
/// Read when `CSV2BUFR_DEBUG` is unset, for existing compose files.
pub const FLASK_DEBUG_VAR: &str = "FLASK_DEBUG";
pub const ENGINE_PROGRAM_VAR: &str = "CSV2BUFR_ENGINE_PROGRAM";
pub const BRIDGE_SCRIPT_VAR: &str = "CSV2BUFR_BRIDGE_SCRIPT";

/// Runtime configuration for the csv2bufr service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Port to listen on (all interfaces)
    pub port: u16,
    /// Verbose, human-readable logging
    pub debug: bool,
    /// Interpreter used to run the bridge
    pub engine_program: String,
    /// Bridge script wrapping the csv2bufr library
    pub bridge_script: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            debug: false,
            engine_program: DEFAULT_ENGINE_PROGRAM.to_string(),
            bridge_script: PathBuf::from(DEFAULT_BRIDGE_SCRIPT),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup(PORT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("{} must be a port number, got '{}'", PORT_VAR, raw))?,
            None => defaults.port,
        };

        Ok(Self {
            port,
            debug: parse_debug_flag(
                lookup(DEBUG_VAR)
                    .or_else(|| lookup(FLASK_DEBUG_VAR))
                    .as_deref(),
            ),
            engine_program: lookup(ENGINE_PROGRAM_VAR).unwrap_or(defaults.engine_program),
            bridge_script: lookup(BRIDGE_SCRIPT_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.bridge_script),
        })
    }

    pub fn engine_config(&self) -> CommandEngineConfig {
        CommandEngineConfig::bridge(self.engine_program.clone(), self.bridge_script.clone())
    }
}

/// Only the literal `true` (any case) turns debug mode on.
pub fn parse_debug_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}
