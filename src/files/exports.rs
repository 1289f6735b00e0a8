use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::models::Settings;

pub fn ensure_export_base(app_dir: &Path) -> Result<PathBuf, AppError> {
  let export_dir = app_dir.join("Exports");
  fs::create_dir_all(&export_dir)?;
  Ok(export_dir)
}

/// Falls back to the app-managed folder when the configured one is
/// missing or blank.
pub fn resolve_export_base(settings: &Settings, default_base: &Path) -> PathBuf {
  if settings.export_base_folder.trim().is_empty() {
    return default_base.to_path_buf();
  }
  let path = PathBuf::from(&settings.export_base_folder);
  if path.exists() {
    path
  } else {
    default_base.to_path_buf()
  }
}

pub fn quote_export_dir(base: &Path, quote_number: &str) -> Result<PathBuf, AppError> {
  let dir = base.join(sanitize_file_name(quote_number));
  fs::create_dir_all(&dir)?;
  Ok(dir)
}

pub fn sanitize_file_name(value: &str) -> String {
  let mut out = String::with_capacity(value.len());
  for ch in value.chars() {
    let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.';
    out.push(if ok { ch } else { '_' });
  }
  let trimmed = out.trim_matches('_').to_string();
  if trimmed.is_empty() {
    "quote".to_string()
  } else {
    trimmed
  }
}

pub fn open_export(path: &str) -> Result<(), AppError> {
  if path.trim().is_empty() {
    return Err(AppError::new("EXPORT_PATH_EMPTY", "Export path is missing"));
  }
  open::that(path).map_err(|err| AppError::new("EXPORT_OPEN", err.to_string()))?;
  Ok(())
}

pub fn content_type_for(path: &Path) -> Option<&'static str> {
  let ext = path
    .extension()
    .and_then(|ext| ext.to_str())
    .unwrap_or("")
    .to_lowercase();
  match ext.as_str() {
    "pdf" => Some("application/pdf"),
    "xlsx" => Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    "zip" => Some("application/zip"),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sanitizes_awkward_quote_numbers() {
    assert_eq!(sanitize_file_name("Q-2026-0001"), "Q-2026-0001");
    assert_eq!(sanitize_file_name("Q/2026 0001"), "Q_2026_0001");
    assert_eq!(sanitize_file_name("///"), "quote");
  }

  #[test]
  fn recognizes_export_content_types() {
    assert_eq!(content_type_for(Path::new("q.pdf")), Some("application/pdf"));
    assert!(content_type_for(Path::new("q.xlsx")).is_some());
    assert_eq!(content_type_for(Path::new("q.exe")), None);
  }
}
