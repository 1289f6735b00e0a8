use std::fs;
use std::path::PathBuf;

use base64::Engine;
use chrono::{Datelike, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use tauri::State;

use crate::audit::append_audit;
use crate::db;
use crate::domain::{pricing, quote, validation, whatif};
use crate::error::AppError;
use crate::export::{excel, pdf};
use crate::files::{backup, exports};
use crate::models::*;
use crate::reports;
use crate::settings;
use crate::store;
use crate::AppState;

#[tauri::command]
pub fn get_settings(state: State<AppState>) -> Result<Settings, AppError> {
  db::with_conn(&state.db, |conn| {
    let mut settings = settings::get_settings(conn)?;
    if settings.export_base_folder.trim().is_empty()
      || !PathBuf::from(&settings.export_base_folder).exists()
    {
      settings.export_base_folder = state.export_base.to_string_lossy().to_string();
    }
    Ok(settings)
  })
}

#[tauri::command]
pub fn update_settings(state: State<AppState>, settings_input: Settings, actor: Option<String>) -> Result<Settings, AppError> {
  validation::ensure_currency(&settings_input.currency)?;
  validation::ensure_vat_rate(settings_input.vat_rate)?;
  if settings_input.power_cost_per_kwh < 0.0 {
    return Err(AppError::new("INVALID_POWER_COST", "Power cost cannot be negative"));
  }
  let export_path = PathBuf::from(&settings_input.export_base_folder);
  if !settings_input.export_base_folder.trim().is_empty() {
    fs::create_dir_all(&export_path)?;
  }

  db::with_conn(&state.db, |conn| {
    settings::update_settings(conn, &settings_input)?;
    append_audit(
      conn,
      actor,
      "UPDATE_SETTINGS",
      "SETTINGS",
      None,
      None,
      serde_json::to_string(&settings_input).unwrap_or_else(|_| "{}".to_string()),
      None,
    )?;
    Ok(settings_input)
  })
}

#[tauri::command]
pub fn calculate_pricing(state: State<AppState>, input: PricingInput) -> Result<PricingCalculations, AppError> {
  validation::ensure_pricing_input(&input)?;
  let input = with_power_cost(&state, input)?;
  Ok(pricing::calculate_pricing(&input))
}

#[tauri::command]
pub fn calculate_what_if(
  state: State<AppState>,
  input: PricingInput,
  scale_with_quantity: bool,
) -> Result<WhatIfMatrix, AppError> {
  validation::ensure_pricing_input(&input)?;
  let input = with_power_cost(&state, input)?;
  Ok(whatif::what_if_matrix(&input, scale_with_quantity))
}

#[tauri::command]
pub fn preview_quote(state: State<AppState>, input: SaveQuoteInput) -> Result<FinalizedQuote, AppError> {
  validation::ensure_save_quote_input(&input)?;
  let input = quote_with_power_cost(&state, input)?;

  let priced: Vec<quote::PricedProduct> = input
    .products
    .iter()
    .map(|product| {
      let calc = pricing::calculate_pricing(&product.pricing);
      quote::PricedProduct::from_calculations(product.name.clone(), &calc)
    })
    .collect();

  let number = input.quote_number.clone().unwrap_or_else(|| "PREVIEW".to_string());
  Ok(quote::finalize(
    &number,
    input.customer_type,
    &input.currency,
    &priced,
    input.discount.as_ref(),
    input.shipping.as_ref(),
  ))
}

#[tauri::command]
pub fn save_quote(state: State<AppState>, input: SaveQuoteInput, actor: Option<String>) -> Result<QuoteSummary, AppError> {
  validation::ensure_save_quote_input(&input)?;
  let payload_json = serde_json::to_string(&input).unwrap_or_else(|_| "{}".to_string());
  let input = quote_with_power_cost(&state, input)?;

  db::with_conn(&state.db, |conn| {
    let summary = store::save_quote(conn, &input)?;
    append_audit(
      conn,
      actor,
      "SAVE_QUOTE",
      "QUOTE",
      Some(summary.quote_number.clone()),
      None,
      payload_json,
      None,
    )?;
    Ok(summary)
  })
}

#[tauri::command]
pub fn list_quotes(state: State<AppState>, filter: QuoteFilter) -> Result<Paginated<QuoteSummary>, AppError> {
  db::with_conn(&state.db, |conn| store::list_quotes(conn, &filter))
}

#[tauri::command]
pub fn get_quote(state: State<AppState>, quote_number: String) -> Result<QuoteDetail, AppError> {
  db::with_conn(&state.db, |conn| store::get_quote_detail(conn, &quote_number))
}

#[tauri::command]
pub fn next_quote_number(state: State<AppState>) -> Result<String, AppError> {
  db::with_conn(&state.db, |conn| store::next_quote_number(conn))
}

#[tauri::command]
pub fn delete_quote(state: State<AppState>, quote_number: String, actor: Option<String>) -> Result<i64, AppError> {
  let quote_number = quote_number.trim().to_string();
  if quote_number.is_empty() {
    return Err(AppError::new("INVALID_ID", "Quote number is missing"));
  }

  db::with_conn(&state.db, |conn| {
    let deleted = store::delete_quote(conn, &quote_number)?;
    let payload_json = serde_json::to_string(&serde_json::json!({
      "quote_number": quote_number,
      "deleted": deleted,
    }))
    .unwrap_or_else(|_| "{}".to_string());
    append_audit(
      conn,
      actor,
      "DELETE_QUOTE",
      "QUOTE",
      Some(quote_number.clone()),
      None,
      payload_json,
      Some("Quote deleted".to_string()),
    )?;
    Ok(deleted)
  })
}

#[tauri::command]
pub fn finalize_quote(state: State<AppState>, quote_number: String, actor: Option<String>) -> Result<FinalizedQuote, AppError> {
  db::with_conn(&state.db, |conn| {
    let detail = store::get_quote_detail(conn, &quote_number)?;
    store::mark_finalized(conn, &quote_number)?;
    append_audit(
      conn,
      actor,
      "FINALIZE_QUOTE",
      "QUOTE",
      Some(quote_number.clone()),
      None,
      serde_json::to_string(&detail.finalized.totals).unwrap_or_else(|_| "{}".to_string()),
      None,
    )?;
    Ok(detail.finalized)
  })
}

#[tauri::command]
pub fn get_dashboard(state: State<AppState>, year: i32) -> Result<Dashboard, AppError> {
  db::with_conn(&state.db, |conn| reports::get_dashboard(conn, year))
}

#[tauri::command]
pub fn seed_demo_quotes(state: State<AppState>, count: i64, actor: Option<String>) -> Result<i64, AppError> {
  let count = count.clamp(1, 500) as usize;
  let seed = Utc::now().timestamp_millis() as u64;
  let mut rng = MockRng::new(seed);

  db::with_conn(&state.db, |conn| {
    let settings = settings::get_settings(conn)?;
    let year = Utc::now().year();

    for _ in 0..count {
      let input = demo_quote_input(&mut rng, &settings);
      let summary = store::save_quote(conn, &input)?;
      scatter_quote_date(conn, &summary.quote_number, year, &mut rng)?;
      if rng.next_u32() % 100 < 30 {
        store::mark_finalized(conn, &summary.quote_number)?;
      }
    }

    let payload_json = serde_json::to_string(&serde_json::json!({
      "count": count,
      "year": year,
    }))
    .unwrap_or_else(|_| "{}".to_string());
    append_audit(
      conn,
      actor,
      "SEED_DEMO",
      "QUOTE",
      Some(format!("demo:{count}")),
      None,
      payload_json,
      Some("Demo quotes created".to_string()),
    )?;

    Ok(count as i64)
  })
}

#[tauri::command]
pub fn clear_demo_quotes(state: State<AppState>, actor: Option<String>) -> Result<i64, AppError> {
  db::with_conn(&state.db, |conn| {
    let deleted = store::clear_demo_quotes(conn)?;
    let payload_json = serde_json::to_string(&serde_json::json!({
      "deleted": deleted,
    }))
    .unwrap_or_else(|_| "{}".to_string());
    append_audit(
      conn,
      actor,
      "CLEAR_DEMO",
      "QUOTE",
      None,
      None,
      payload_json,
      Some("Demo quotes deleted".to_string()),
    )?;
    Ok(deleted)
  })
}

#[tauri::command]
pub fn export_quote_excel(
  state: State<AppState>,
  quote_number: String,
  output_path: Option<String>,
  actor: Option<String>,
) -> Result<String, AppError> {
  db::with_conn(&state.db, |conn| {
    let detail = store::get_quote_detail(conn, &quote_number)?;
    let settings = settings::get_settings(conn)?;
    let base = exports::resolve_export_base(&settings, &state.export_base);

    let excel_path = match output_path.clone() {
      Some(path) => {
        if let Some(parent) = PathBuf::from(&path).parent() {
          fs::create_dir_all(parent)?;
        }
        PathBuf::from(path)
      }
      None => {
        let dir = exports::quote_export_dir(&base, &quote_number)?;
        dir.join(format!("quote-{}-internal.xlsx", exports::sanitize_file_name(&quote_number)))
      }
    };

    excel::export_quote_workbook(&detail, excel_path.as_path())?;

    let payload_json = serde_json::to_string(&serde_json::json!({
      "quote_number": quote_number,
      "output_path": excel_path.to_string_lossy(),
    }))
    .unwrap_or_else(|_| "{}".to_string());
    append_audit(
      conn,
      actor,
      "EXPORT_EXCEL",
      "EXPORT",
      Some(excel_path.to_string_lossy().to_string()),
      Some(quote_number.clone()),
      payload_json,
      None,
    )?;

    Ok(excel_path.to_string_lossy().to_string())
  })
}

#[tauri::command]
pub fn export_quote_pdf(
  state: State<AppState>,
  quote_number: String,
  output_path: Option<String>,
  actor: Option<String>,
) -> Result<String, AppError> {
  db::with_conn(&state.db, |conn| {
    let detail = store::get_quote_detail(conn, &quote_number)?;
    let settings = settings::get_settings(conn)?;
    let base = exports::resolve_export_base(&settings, &state.export_base);

    let pdf_path = match output_path.clone() {
      Some(path) => {
        if let Some(parent) = PathBuf::from(&path).parent() {
          fs::create_dir_all(parent)?;
        }
        PathBuf::from(path)
      }
      None => {
        let dir = exports::quote_export_dir(&base, &quote_number)?;
        dir.join(format!("quote-{}.pdf", exports::sanitize_file_name(&quote_number)))
      }
    };

    pdf::export_quote_pdf(&detail, pdf_path.as_path())?;

    let payload_json = serde_json::to_string(&serde_json::json!({
      "quote_number": quote_number,
      "output_path": pdf_path.to_string_lossy(),
    }))
    .unwrap_or_else(|_| "{}".to_string());
    append_audit(
      conn,
      actor,
      "EXPORT_PDF",
      "EXPORT",
      Some(pdf_path.to_string_lossy().to_string()),
      Some(quote_number.clone()),
      payload_json,
      None,
    )?;

    Ok(pdf_path.to_string_lossy().to_string())
  })
}

#[tauri::command]
pub fn open_export(state: State<AppState>, path: String, actor: Option<String>) -> Result<(), AppError> {
  exports::open_export(&path)?;
  let payload = serde_json::to_string(&serde_json::json!({ "path": path.clone() }))
    .unwrap_or_else(|_| "{}".to_string());
  db::with_conn(&state.db, |conn| {
    append_audit(
      conn,
      actor,
      "OPEN_EXPORT",
      "EXPORT",
      Some(path.clone()),
      None,
      payload,
      None,
    )?;
    Ok(())
  })?;
  Ok(())
}

#[derive(Serialize)]
pub struct ReadFileResponse {
  pub data_base64: String,
  pub content_type: String,
}

#[tauri::command]
pub fn read_export_file(path: String) -> Result<ReadFileResponse, AppError> {
  let file_path = PathBuf::from(&path);
  if !file_path.exists() {
    return Err(AppError::new("EXPORT_NOT_FOUND", "Export file not found"));
  }
  let content_type = exports::content_type_for(&file_path)
    .ok_or_else(|| AppError::new("EXPORT_TYPE", "Unsupported file format"))?;
  let metadata = fs::metadata(&file_path)?;
  if metadata.len() > EXPORT_FILE_MAX_BYTES {
    return Err(AppError::new("EXPORT_SIZE", "File is too large for preview"));
  }
  let bytes = fs::read(&file_path)?;
  let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
  Ok(ReadFileResponse {
    data_base64: encoded,
    content_type: content_type.to_string(),
  })
}

#[tauri::command]
pub fn create_backup(state: State<AppState>, request: BackupRequest) -> Result<String, AppError> {
  let app_dir = state.app_dir.clone();
  db::with_conn(&state.db, |conn| {
    db::checkpoint(conn)?;
    let settings = settings::get_settings(conn)?;
    let export_base = exports::resolve_export_base(&settings, &state.export_base);
    let path = backup::create_backup(
      &app_dir,
      &state.db.db_path,
      &export_base,
      request.include_exports,
      request.output_path.clone(),
    )?;
    let payload_json = serde_json::to_string(&request).unwrap_or_else(|_| "{}".to_string());
    append_audit(
      conn,
      request.actor,
      "BACKUP",
      "EXPORT",
      Some(path.clone()),
      None,
      payload_json,
      None,
    )?;
    Ok(path)
  })
}

#[tauri::command]
pub fn restore_backup(state: State<AppState>, request: RestoreRequest) -> Result<(), AppError> {
  let export_base = db::with_conn(&state.db, |conn| {
    let settings = settings::get_settings(conn)?;
    Ok(exports::resolve_export_base(&settings, &state.export_base))
  })?;

  backup::restore_backup(&request.archive_path, &state.db.db_path, &export_base)?;
  db::reload_connection(&state.db)?;

  db::with_conn(&state.db, |conn| {
    append_audit(
      conn,
      request.actor.clone(),
      "RESTORE",
      "EXPORT",
      Some(request.archive_path.clone()),
      None,
      serde_json::to_string(&request).unwrap_or_else(|_| "{}".to_string()),
      None,
    )?;
    Ok(())
  })?;

  Ok(())
}

#[tauri::command]
pub fn list_audit_log(state: State<AppState>, page: i64, page_size: i64) -> Result<Paginated<AuditLogEntry>, AppError> {
  db::with_conn(&state.db, |conn| crate::audit::list_audit(conn, page, page_size))
}

fn with_power_cost(state: &State<AppState>, mut input: PricingInput) -> Result<PricingInput, AppError> {
  if input.power_cost_per_kwh.is_none() {
    let settings = db::with_conn(&state.db, |conn| settings::get_settings(conn))?;
    input.power_cost_per_kwh = Some(settings.power_cost_per_kwh);
  }
  Ok(input)
}

fn quote_with_power_cost(state: &State<AppState>, mut input: SaveQuoteInput) -> Result<SaveQuoteInput, AppError> {
  if input.products.iter().any(|p| p.pricing.power_cost_per_kwh.is_none()) {
    let settings = db::with_conn(&state.db, |conn| settings::get_settings(conn))?;
    for product in &mut input.products {
      if product.pricing.power_cost_per_kwh.is_none() {
        product.pricing.power_cost_per_kwh = Some(settings.power_cost_per_kwh);
      }
    }
  }
  Ok(input)
}

fn scatter_quote_date(conn: &Connection, quote_number: &str, year: i32, rng: &mut MockRng) -> Result<(), AppError> {
  let month = (rng.next_u32() % 12 + 1) as u32;
  let day = (rng.next_u32() % days_in_month(year, month) + 1) as u32;
  let date = chrono::NaiveDate::from_ymd_opt(year, month, day)
    .unwrap_or_else(|| chrono::NaiveDate::from_ymd_opt(year, month, 1).unwrap());
  let stamp = format!("{}T09:00:00+00:00", date.format("%Y-%m-%d"));
  conn.execute(
    "UPDATE quotes SET year = ?1, month = ?2, created_at = ?3, updated_at = ?4 WHERE quote_number = ?5",
    params![year, month as i32, stamp, stamp, quote_number],
  )?;
  Ok(())
}

fn days_in_month(year: i32, month: u32) -> u32 {
  let next = if month == 12 {
    chrono::NaiveDate::from_ymd_opt(year + 1, 1, 1)
  } else {
    chrono::NaiveDate::from_ymd_opt(year, month + 1, 1)
  };
  let next_date = next.unwrap_or_else(|| chrono::NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap());
  (next_date - chrono::Duration::days(1)).day()
}

fn demo_quote_input(rng: &mut MockRng, settings: &Settings) -> SaveQuoteInput {
  let projects = [
    "Coaster batch",
    "Walnut lamp run",
    "Ceramic mug series",
    "Laser-cut signage",
    "Resin jewelry set",
    "Plywood shelf kit",
  ];
  let clients = [
    "Atelier Nord",
    "Hilltop Ceramics",
    "Acme Interiors",
    "Studio Brill",
    "Corner Market",
  ];
  let product_names = ["Standard set", "Large set", "Custom engraving", "Gift box"];
  let main_materials = ["walnut board", "resin", "stoneware clay", "3mm plywood"];
  let units = ["board", "kg", "kg", "sheet"];

  let project = projects[(rng.next_u32() as usize) % projects.len()];
  let client = clients[(rng.next_u32() as usize) % clients.len()];
  let product_count = (rng.next_u32() % 3 + 1) as usize;

  let mut products = Vec::new();
  for i in 0..product_count {
    let material_idx = (rng.next_u32() as usize) % main_materials.len();
    let mut materials = vec![Material {
      name: main_materials[material_idx].to_string(),
      category: MaterialCategory::Main,
      cost_type: CostType::PerUnit,
      unit_cost: Some(random_amount(rng, 2.0, 12.0)),
      total_cost: None,
      quantity: random_amount(rng, 2.0, 15.0),
      unit: units[material_idx].to_string(),
      waste_percentage: if rng.next_u32() % 2 == 0 {
        Some((rng.next_u32() % 16) as f64)
      } else {
        None
      },
    }];
    if rng.next_u32() % 100 < 70 {
      materials.push(Material {
        name: "kraft box".to_string(),
        category: MaterialCategory::Packaging,
        cost_type: CostType::PerUnit,
        unit_cost: Some(random_amount(rng, 0.3, 2.0)),
        total_cost: None,
        quantity: random_amount(rng, 5.0, 50.0),
        unit: "pcs".to_string(),
        waste_percentage: None,
      });
    }
    if rng.next_u32() % 100 < 40 {
      materials.push(Material {
        name: "ribbon".to_string(),
        category: MaterialCategory::Decorations,
        cost_type: CostType::TotalCost,
        unit_cost: None,
        total_cost: Some(random_amount(rng, 3.0, 20.0)),
        quantity: 1.0,
        unit: "roll".to_string(),
        waste_percentage: None,
      });
    }

    let machines = if rng.next_u32() % 100 < 60 {
      vec![Machine {
        name: "laser cutter".to_string(),
        purchase_price: random_amount(rng, 2000.0, 15000.0),
        depreciation_percentage: random_amount(rng, 15.0, 25.0),
        hours_per_year: random_amount(rng, 800.0, 2000.0),
        maintenance_cost_per_year: random_amount(rng, 200.0, 800.0),
        power_consumption_kw: random_amount(rng, 0.5, 3.5),
        electricity_included_in_overhead: rng.next_u32() % 2 == 0,
        usage_hours: random_amount(rng, 0.5, 4.0),
      }]
    } else {
      Vec::new()
    };

    products.push(QuoteProductInput {
      name: format!("{} {}", product_names[(rng.next_u32() as usize) % product_names.len()], i + 1),
      pricing: PricingInput {
        materials,
        cost_parameters: CostParameters {
          labor: LaborInfo {
            hours: random_amount(rng, 1.0, 6.0),
            rate_per_hour: random_amount(rng, 18.0, 40.0),
          },
          machines,
          overhead: OverheadInfo {
            rate_per_hour: random_amount(rng, 3.0, 9.0),
          },
        },
        sale_price: SalePriceInfo {
          amount: random_amount(rng, 8.0, 60.0),
          is_per_unit: true,
          units_count: (rng.next_u32() % 46 + 5) as f64,
          fixed_charge: if rng.next_u32() % 100 < 30 {
            random_amount(rng, 10.0, 50.0)
          } else {
            0.0
          },
        },
        vat_settings: VatSettings {
          rate: settings.vat_rate,
          is_inclusive: settings.vat_inclusive,
        },
        power_cost_per_kwh: Some(settings.power_cost_per_kwh),
      },
    });
  }

  let discount = if rng.next_u32() % 100 < 35 {
    Some(DiscountInfo {
      discount_type: if rng.next_u32() % 2 == 0 {
        DiscountType::Percentage
      } else {
        DiscountType::Fixed
      },
      amount: if rng.next_u32() % 2 == 0 {
        (rng.next_u32() % 15 + 5) as f64
      } else {
        random_amount(rng, 10.0, 60.0)
      },
    })
  } else {
    None
  };

  let shipping = if rng.next_u32() % 100 < 45 {
    Some(ShippingInfo {
      cost: random_amount(rng, 5.0, 40.0),
      charge_to_customer: rng.next_u32() % 100 < 80,
      is_free_shipping: rng.next_u32() % 100 < 15,
      includes_vat: rng.next_u32() % 2 == 0,
    })
  } else {
    None
  };

  SaveQuoteInput {
    quote_number: None,
    project_name: Some(format!("Demo: {project}")),
    client_name: Some(client.to_string()),
    customer_type: if rng.next_u32() % 2 == 0 {
      CustomerType::Private
    } else {
      CustomerType::Business
    },
    currency: settings.currency.clone(),
    products,
    discount,
    shipping,
  }
}

fn random_amount(rng: &mut MockRng, min: f64, max: f64) -> f64 {
  let range = (max - min).max(1.0);
  let base = min + (rng.next_u32() as f64 % range);
  let cents = (rng.next_u32() % 100) as f64 / 100.0;
  ((base + cents) * 100.0).round() / 100.0
}

struct MockRng {
  state: u64,
}

impl MockRng {
  fn new(seed: u64) -> Self {
    Self { state: seed }
  }

  fn next_u32(&mut self) -> u32 {
    self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
    (self.state >> 32) as u32
  }
}

const EXPORT_FILE_MAX_BYTES: u64 = 25 * 1024 * 1024;
