//! Logger wiring. In the browser `log` records go to the developer console
//! through `console_log`; native hosts install their own backend.

use epeek_core::{EpeekError, Result};

use crate::error::wasm_result;

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

fn set_up(level: &str) -> Result<String> {
    let level: log::Level = level
        .parse()
        .map_err(|_| EpeekError::InvalidInput(format!("unknown log level: {level:?}")))?;
    #[cfg(feature = "wasm")]
    console_log::init_with_level(level).map_err(|e| EpeekError::Other(e.to_string()))?;
    #[cfg(not(feature = "wasm"))]
    log::set_max_level(level.to_level_filter());
    Ok(level.to_string())
}

/// Start logging at `level` (`error`, `warn`, `info`, `debug` or `trace`).
#[cfg_attr(feature = "wasm", wasm_bindgen)]
pub fn init_logging(level: &str) -> String {
    wasm_result(set_up(level))
}
