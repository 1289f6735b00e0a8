use chrono::Utc;
use rusqlite::{params, Connection};

use crate::error::AppError;
use crate::models::{AuditLogEntry, Paginated};

pub fn append_audit(
  conn: &Connection,
  actor: Option<String>,
  action: &str,
  entity_type: &str,
  entity_id: Option<String>,
  ref_id: Option<String>,
  payload_json: String,
  details: Option<String>,
) -> Result<(), AppError> {
  let ts = Utc::now().to_rfc3339();
  conn.execute(
    "INSERT INTO audit_log (ts, actor, action, entity_type, entity_id, ref_id, payload_json, details) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    params![
      ts,
      actor,
      action,
      entity_type,
      entity_id,
      ref_id,
      payload_json,
      details
    ],
  )?;
  Ok(())
}

pub fn list_audit(conn: &Connection, page: i64, page_size: i64) -> Result<Paginated<AuditLogEntry>, AppError> {
  let page = if page < 1 { 1 } else { page };
  let page_size = if page_size < 1 { 100 } else { page_size };
  let offset = (page - 1) * page_size;

  let total: i64 = conn.query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))?;
  let mut stmt = conn.prepare(
    "SELECT id, ts, actor, action, entity_type, entity_id, ref_id, payload_json, details
     FROM audit_log
     ORDER BY ts DESC
     LIMIT ?1 OFFSET ?2",
  )?;
  let rows = stmt.query_map(params![page_size, offset], |row| {
    Ok(AuditLogEntry {
      id: row.get(0)?,
      ts: row.get(1)?,
      actor: row.get(2)?,
      action: row.get(3)?,
      entity_type: row.get(4)?,
      entity_id: row.get(5)?,
      ref_id: row.get(6)?,
      payload_json: row.get(7)?,
      details: row.get(8)?,
    })
  })?;

  let mut items = Vec::new();
  for row in rows {
    items.push(row?);
  }

  Ok(Paginated { total, items })
}
