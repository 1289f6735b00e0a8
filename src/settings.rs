use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::AppError;
use crate::models::Settings;

const KEY_CURRENCY: &str = "currency";
const KEY_VAT_RATE: &str = "vat_rate";
const KEY_VAT_INCLUSIVE: &str = "vat_inclusive";
const KEY_POWER_COST: &str = "power_cost_per_kwh";
const KEY_EXPORT_BASE: &str = "export_base_folder";

pub fn ensure_defaults(conn: &Connection, export_base: &Path) -> Result<(), AppError> {
  conn.execute(
    "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_CURRENCY, "USD"],
  )?;
  conn.execute(
    "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_VAT_RATE, "18"],
  )?;
  conn.execute(
    "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_VAT_INCLUSIVE, "false"],
  )?;
  conn.execute(
    "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_POWER_COST, "0.15"],
  )?;
  conn.execute(
    "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_EXPORT_BASE, export_base.to_string_lossy().to_string()],
  )?;
  Ok(())
}

pub fn get_settings(conn: &Connection) -> Result<Settings, AppError> {
  let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
  let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

  let mut currency = "USD".to_string();
  let mut vat_rate = 18.0_f64;
  let mut vat_inclusive = false;
  let mut power_cost_per_kwh = 0.15_f64;
  let mut export_base_folder = String::new();

  for row in rows {
    let (key, value) = row?;
    match key.as_str() {
      KEY_CURRENCY => {
        currency = value;
      }
      KEY_VAT_RATE => {
        vat_rate = value.parse().unwrap_or(vat_rate);
      }
      KEY_VAT_INCLUSIVE => {
        vat_inclusive = value == "true" || value == "1";
      }
      KEY_POWER_COST => {
        power_cost_per_kwh = value.parse().unwrap_or(power_cost_per_kwh);
      }
      KEY_EXPORT_BASE => {
        export_base_folder = value;
      }
      _ => {}
    }
  }

  Ok(Settings {
    currency,
    vat_rate,
    vat_inclusive,
    power_cost_per_kwh,
    export_base_folder,
  })
}

pub fn update_settings(conn: &Connection, settings: &Settings) -> Result<(), AppError> {
  conn.execute(
    "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_CURRENCY, settings.currency.clone()],
  )?;
  conn.execute(
    "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_VAT_RATE, settings.vat_rate.to_string()],
  )?;
  conn.execute(
    "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_VAT_INCLUSIVE, if settings.vat_inclusive { "true" } else { "false" }],
  )?;
  conn.execute(
    "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_POWER_COST, settings.power_cost_per_kwh.to_string()],
  )?;
  conn.execute(
    "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_EXPORT_BASE, settings.export_base_folder.clone()],
  )?;
  Ok(())
}
