#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod audit;
mod commands;
mod db;
mod domain;
mod error;
mod export;
mod files;
mod format;
mod models;
mod reports;
mod settings;
mod store;

use std::path::PathBuf;

use db::Db;

pub struct AppState {
  pub db: Db,
  pub app_dir: PathBuf,
  pub export_base: PathBuf,
}

fn main() {
  let app_dir = db::resolve_app_dir().expect("Failed to resolve app data directory");
  let (db, export_base) = db::init_db(&app_dir).expect("Failed to initialize database");

  tauri::Builder::default()
    .plugin(tauri_plugin_dialog::init())
    .manage(AppState {
      db,
      app_dir,
      export_base,
    })
    .invoke_handler(tauri::generate_handler![
      commands::get_settings,
      commands::update_settings,
      commands::calculate_pricing,
      commands::calculate_what_if,
      commands::preview_quote,
      commands::save_quote,
      commands::list_quotes,
      commands::get_quote,
      commands::next_quote_number,
      commands::delete_quote,
      commands::finalize_quote,
      commands::get_dashboard,
      commands::seed_demo_quotes,
      commands::clear_demo_quotes,
      commands::export_quote_excel,
      commands::export_quote_pdf,
      commands::open_export,
      commands::read_export_file,
      commands::create_backup,
      commands::restore_backup,
      commands::list_audit_log,
    ])
    .run(tauri::generate_context!())
    .expect("error while running tauri application");
}
