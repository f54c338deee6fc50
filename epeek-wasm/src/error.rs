//! JSON result envelope for the browser boundary.
//!
//! Every exported function returns a `String` containing JSON.
//! Success → `{"ok": <value>}`, failure → `{"error": "<message>"}`.

use std::fmt::Display;

use serde::Serialize;

/// Serialize a success value as `{"ok": val}`.
pub fn wasm_ok<T: Serialize>(val: &T) -> String {
    #[derive(Serialize)]
    struct Ok<'a, T: Serialize> {
        ok: &'a T,
    }
    serde_json::to_string(&Ok { ok: val }).unwrap_or_else(wasm_err)
}

/// Serialize an error as `{"error": "msg"}`.
pub fn wasm_err(msg: impl Display) -> String {
    #[derive(Serialize)]
    struct Err {
        error: String,
    }
    serde_json::to_string(&Err {
        error: msg.to_string(),
    })
    .unwrap_or_else(|_| r#"{"error":"serialization failed"}"#.into())
}

/// Map an `epeek_core::Result<T>` into the envelope.
pub fn wasm_result<T: Serialize>(r: epeek_core::Result<T>) -> String {
    match r {
        Ok(val) => wasm_ok(&val),
        Err(e) => wasm_err(e),
    }
}

/// Decode a JSON argument, reporting failures as input errors.
pub(crate) fn from_json<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> epeek_core::Result<T> {
    serde_json::from_str(json)
        .map_err(|e| epeek_core::EpeekError::InvalidInput(format!("{what}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_serialization() {
        let json = wasm_ok(&42);
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["ok"], 42);
    }

    #[test]
    fn err_serialization() {
        let json = wasm_err("region too wide");
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["error"], "region too wide");
    }

    #[test]
    fn result_err_variant() {
        let r: epeek_core::Result<i32> = Err(epeek_core::EpeekError::parse(3, "bad length"));
        let json = wasm_result(r);
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["error"], "parse error at byte 3: bad length");
    }

    #[test]
    fn from_json_reports_argument() {
        let r: epeek_core::Result<Vec<String>> = from_json("names", "{");
        assert!(r.unwrap_err().to_string().contains("names"));
    }
}
