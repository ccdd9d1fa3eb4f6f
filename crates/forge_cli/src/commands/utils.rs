// Console output helpers

use anyhow::Result;
use serde::Serialize;

pub fn success(msg: &str) {
    println!("[OK] {msg}");
}

pub fn info(msg: &str) {
    println!("[INFO] {msg}");
}

pub fn warn(msg: &str) {
    eprintln!("[WARN] {msg}");
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print `value` as JSON in `--json` mode, otherwise run `human`.
pub fn emit<T: Serialize + ?Sized>(json: bool, value: &T, human: impl FnOnce(&T)) -> Result<()> {
    if json {
        print_json(value)
    } else {
        human(value);
        Ok(())
    }
}
