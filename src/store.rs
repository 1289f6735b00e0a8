use chrono::{Datelike, Utc};
use rusqlite::{params, Connection, Row};

use crate::domain::{pricing, quote};
use crate::error::AppError;
use crate::models::{
  DiscountInfo, FinalizedQuote, Paginated, PricingInput, QuoteDetail, QuoteFilter,
  QuoteProductDetail, QuoteSummary, SaveQuoteInput, ShippingInfo,
};

pub fn next_quote_number(conn: &Connection) -> Result<String, AppError> {
  let year = Utc::now().year();
  let prefix = format!("Q-{year}-");
  let max_seq: Option<i64> = conn.query_row(
    "SELECT MAX(CAST(SUBSTR(quote_number, ?1) AS INTEGER)) FROM quotes WHERE quote_number LIKE ?2",
    params![prefix.len() as i64 + 1, format!("{prefix}%")],
    |row| row.get(0),
  )?;
  Ok(format!("{prefix}{:04}", max_seq.unwrap_or(0) + 1))
}

pub fn save_quote(conn: &mut Connection, input: &SaveQuoteInput) -> Result<QuoteSummary, AppError> {
  let quote_number = match input.quote_number.clone().filter(|n| !n.trim().is_empty()) {
    Some(number) => number,
    None => next_quote_number(conn)?,
  };

  let existing: Option<(i64, String, String)> = conn
    .query_row(
      "SELECT id, status, created_at FROM quotes WHERE quote_number = ?1",
      params![quote_number],
      |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )
    .map(Some)
    .or_else(|err| match err {
      rusqlite::Error::QueryReturnedNoRows => Ok(None),
      other => Err(other),
    })?;

  if let Some((_, status, _)) = &existing {
    if status == "finalized" {
      return Err(AppError::new("QUOTE_FINALIZED", "Finalized quotes cannot be changed"));
    }
  }

  let calculations: Vec<_> = input
    .products
    .iter()
    .map(|product| pricing::calculate_pricing(&product.pricing))
    .collect();
  let priced: Vec<quote::PricedProduct> = input
    .products
    .iter()
    .zip(&calculations)
    .map(|(product, calc)| quote::PricedProduct::from_calculations(product.name.clone(), calc))
    .collect();
  let finalized = quote::finalize(
    &quote_number,
    input.customer_type,
    &input.currency,
    &priced,
    input.discount.as_ref(),
    input.shipping.as_ref(),
  );

  let discount_net = finalized.discount.as_ref().map(|l| l.net_amount).unwrap_or(0.0);
  let net_profit: f64 = calculations.iter().map(|calc| calc.net_profit).sum::<f64>() - discount_net;

  let now = Utc::now();
  let now_str = now.to_rfc3339();
  let created_at = existing
    .as_ref()
    .map(|(_, _, created)| created.clone())
    .unwrap_or_else(|| now_str.clone());
  let discount_json = input.discount.as_ref().map(serde_json::to_string).transpose()?;
  let shipping_json = input.shipping.as_ref().map(serde_json::to_string).transpose()?;

  let tx = conn.transaction()?;

  let quote_id = if let Some((id, _, _)) = existing {
    tx.execute(
      "UPDATE quotes SET project_name = ?1, client_name = ?2, customer_type = ?3, currency = ?4,
              discount_json = ?5, shipping_json = ?6, net_total = ?7, vat_total = ?8,
              gross_total = ?9, net_profit = ?10, updated_at = ?11
       WHERE id = ?12",
      params![
        input.project_name,
        input.client_name,
        input.customer_type.as_str(),
        input.currency,
        discount_json,
        shipping_json,
        finalized.totals.total_ex_vat,
        finalized.totals.vat_amount,
        finalized.totals.total_inc_vat,
        net_profit,
        now_str,
        id
      ],
    )?;
    tx.execute("DELETE FROM quote_products WHERE quote_id = ?1", params![id])?;
    id
  } else {
    tx.execute(
      "INSERT INTO quotes (quote_number, project_name, client_name, customer_type, currency, status,
              year, month, discount_json, shipping_json, net_total, vat_total, gross_total,
              net_profit, created_at, updated_at)
       VALUES (?1, ?2, ?3, ?4, ?5, 'draft', ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
      params![
        quote_number,
        input.project_name,
        input.client_name,
        input.customer_type.as_str(),
        input.currency,
        now.year(),
        now.month() as i32,
        discount_json,
        shipping_json,
        finalized.totals.total_ex_vat,
        finalized.totals.vat_amount,
        finalized.totals.total_inc_vat,
        net_profit,
        created_at,
        now_str
      ],
    )?;
    tx.last_insert_rowid()
  };

  {
    let mut stmt = tx.prepare(
      "INSERT INTO quote_products (quote_id, position, name, units_count, input_json, net_sale_price, net_profit, created_at)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for (position, (product, calc)) in input.products.iter().zip(&calculations).enumerate() {
      stmt.execute(params![
        quote_id,
        position as i64,
        product.name,
        product.pricing.sale_price.units_count,
        serde_json::to_string(&product.pricing)?,
        calc.net_sale_price,
        calc.net_profit,
        now_str
      ])?;
    }
  }

  tx.commit()?;
  fetch_summary(conn, &quote_number)
}

pub fn fetch_summary(conn: &Connection, quote_number: &str) -> Result<QuoteSummary, AppError> {
  let mut stmt = conn.prepare(&format!("{SUMMARY_SELECT} WHERE q.quote_number = ?1"))?;
  let summary = stmt
    .query_row(params![quote_number], map_summary_row)
    .map_err(|_| AppError::new("QUOTE_NOT_FOUND", "Quote not found"))?;
  Ok(summary)
}

pub fn list_quotes(conn: &Connection, filter: &QuoteFilter) -> Result<Paginated<QuoteSummary>, AppError> {
  let search = filter.search.clone().unwrap_or_default();
  let search_trimmed = search.trim().to_string();
  let like = format!("%{}%", search_trimmed);
  let page = if filter.page < 1 { 1 } else { filter.page };
  let page_size = if filter.page_size < 1 { 50 } else { filter.page_size.min(200) };
  let offset = (page - 1) * page_size;

  let total: i64 = conn.query_row(
    "SELECT COUNT(*) FROM quotes q
     WHERE (?1 IS NULL OR q.year = ?1)
       AND (?2 IS NULL OR q.status = ?2)
       AND (?3 = '' OR q.quote_number LIKE ?4 OR q.project_name LIKE ?4 OR q.client_name LIKE ?4)",
    params![filter.year, filter.status, search_trimmed, like],
    |row| row.get(0),
  )?;

  let mut stmt = conn.prepare(&format!(
    "{SUMMARY_SELECT}
     WHERE (?1 IS NULL OR q.year = ?1)
       AND (?2 IS NULL OR q.status = ?2)
       AND (?3 = '' OR q.quote_number LIKE ?4 OR q.project_name LIKE ?4 OR q.client_name LIKE ?4)
     ORDER BY q.created_at DESC, q.quote_number DESC
     LIMIT ?5 OFFSET ?6"
  ))?;
  let rows = stmt.query_map(
    params![filter.year, filter.status, search_trimmed, like, page_size, offset],
    map_summary_row,
  )?;

  let mut items = Vec::new();
  for row in rows {
    items.push(row?);
  }

  Ok(Paginated { total, items })
}

pub fn get_quote_detail(conn: &Connection, quote_number: &str) -> Result<QuoteDetail, AppError> {
  let summary = fetch_summary(conn, quote_number)?;

  let (discount, shipping) = {
    let (discount_json, shipping_json): (Option<String>, Option<String>) = conn.query_row(
      "SELECT discount_json, shipping_json FROM quotes WHERE id = ?1",
      params![summary.id],
      |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    let discount: Option<DiscountInfo> = discount_json
      .map(|json| serde_json::from_str(&json))
      .transpose()?;
    let shipping: Option<ShippingInfo> = shipping_json
      .map(|json| serde_json::from_str(&json))
      .transpose()?;
    (discount, shipping)
  };

  let mut stmt = conn.prepare(
    "SELECT name, input_json FROM quote_products WHERE quote_id = ?1 ORDER BY position",
  )?;
  let rows = stmt.query_map(params![summary.id], |row| {
    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
  })?;

  let mut products = Vec::new();
  for row in rows {
    let (name, input_json) = row?;
    let pricing_input: PricingInput = serde_json::from_str(&input_json)?;
    let calculations = pricing::calculate_pricing(&pricing_input);
    products.push(QuoteProductDetail {
      name,
      pricing: pricing_input,
      calculations,
    });
  }

  let finalized = finalize_detail(&summary, &products, discount.as_ref(), shipping.as_ref());

  Ok(QuoteDetail {
    summary,
    products,
    discount,
    shipping,
    finalized,
  })
}

pub fn finalize_detail(
  summary: &QuoteSummary,
  products: &[QuoteProductDetail],
  discount: Option<&DiscountInfo>,
  shipping: Option<&ShippingInfo>,
) -> FinalizedQuote {
  let priced: Vec<quote::PricedProduct> = products
    .iter()
    .map(|product| quote::PricedProduct::from_calculations(product.name.clone(), &product.calculations))
    .collect();
  quote::finalize(
    &summary.quote_number,
    summary.customer_type,
    &summary.currency,
    &priced,
    discount,
    shipping,
  )
}

pub fn mark_finalized(conn: &Connection, quote_number: &str) -> Result<(), AppError> {
  let changed = conn.execute(
    "UPDATE quotes SET status = 'finalized', updated_at = ?1 WHERE quote_number = ?2",
    params![Utc::now().to_rfc3339(), quote_number],
  )?;
  if changed == 0 {
    return Err(AppError::new("QUOTE_NOT_FOUND", "Quote not found"));
  }
  Ok(())
}

pub fn delete_quote(conn: &mut Connection, quote_number: &str) -> Result<i64, AppError> {
  let id: i64 = conn
    .query_row(
      "SELECT id FROM quotes WHERE quote_number = ?1",
      params![quote_number],
      |row| row.get(0),
    )
    .map_err(|_| AppError::new("QUOTE_NOT_FOUND", "Quote not found"))?;

  let tx = conn.transaction()?;
  let mut deleted = 0_i64;
  deleted += tx.execute("DELETE FROM quote_products WHERE quote_id = ?1", params![id])? as i64;
  deleted += tx.execute("DELETE FROM quotes WHERE id = ?1", params![id])? as i64;
  tx.commit()?;
  Ok(deleted)
}

pub fn clear_demo_quotes(conn: &mut Connection) -> Result<i64, AppError> {
  let tx = conn.transaction()?;
  let mut deleted = 0_i64;
  deleted += tx.execute(
    "DELETE FROM quote_products WHERE quote_id IN (SELECT id FROM quotes WHERE project_name LIKE 'Demo:%')",
    [],
  )? as i64;
  deleted += tx.execute("DELETE FROM quotes WHERE project_name LIKE 'Demo:%'", [])? as i64;
  tx.commit()?;
  Ok(deleted)
}

const SUMMARY_SELECT: &str = "SELECT q.id, q.quote_number, q.project_name, q.client_name, q.customer_type, q.currency,
        q.status, (SELECT COUNT(*) FROM quote_products p WHERE p.quote_id = q.id),
        q.net_total, q.vat_total, q.gross_total, q.net_profit, q.created_at, q.updated_at
 FROM quotes q";

fn map_summary_row(row: &Row) -> Result<QuoteSummary, rusqlite::Error> {
  let customer_type: String = row.get(4)?;
  Ok(QuoteSummary {
    id: row.get(0)?,
    quote_number: row.get(1)?,
    project_name: row.get(2)?,
    client_name: row.get(3)?,
    customer_type: customer_type.parse().unwrap_or(crate::models::CustomerType::Private),
    currency: row.get(5)?,
    status: row.get(6)?,
    product_count: row.get(7)?,
    net_total: row.get(8)?,
    vat_total: row.get(9)?,
    gross_total: row.get(10)?,
    net_profit: row.get(11)?,
    created_at: row.get(12)?,
    updated_at: row.get(13)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{
    CostParameters, CostType, CustomerType, LaborInfo, Material, MaterialCategory, OverheadInfo,
    QuoteProductInput, SalePriceInfo, VatSettings,
  };

  fn test_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
    conn.execute_batch(include_str!("../migrations/001_init.sql")).unwrap();
    conn
  }

  fn sample_input(quote_number: Option<&str>) -> SaveQuoteInput {
    SaveQuoteInput {
      quote_number: quote_number.map(str::to_string),
      project_name: Some("Walnut coasters".to_string()),
      client_name: Some("Acme Interiors".to_string()),
      customer_type: CustomerType::Business,
      currency: "USD".to_string(),
      products: vec![QuoteProductInput {
        name: "Coaster set".to_string(),
        pricing: PricingInput {
          materials: vec![Material {
            name: "walnut".to_string(),
            category: MaterialCategory::Main,
            cost_type: CostType::PerUnit,
            unit_cost: Some(2.5),
            total_cost: None,
            quantity: 8.0,
            unit: "board".to_string(),
            waste_percentage: Some(10.0),
          }],
          cost_parameters: CostParameters {
            labor: LaborInfo { hours: 2.0, rate_per_hour: 25.0 },
            machines: Vec::new(),
            overhead: OverheadInfo { rate_per_hour: 4.0 },
          },
          sale_price: SalePriceInfo {
            amount: 15.0,
            is_per_unit: true,
            units_count: 12.0,
            fixed_charge: 0.0,
          },
          vat_settings: VatSettings { rate: 18.0, is_inclusive: false },
          power_cost_per_kwh: None,
        },
      }],
      discount: None,
      shipping: None,
    }
  }

  #[test]
  fn quote_numbers_are_sequential_per_year() {
    let mut conn = test_conn();
    let first = save_quote(&mut conn, &sample_input(None)).unwrap();
    let second = save_quote(&mut conn, &sample_input(None)).unwrap();
    let year = Utc::now().year();
    assert_eq!(first.quote_number, format!("Q-{year}-0001"));
    assert_eq!(second.quote_number, format!("Q-{year}-0002"));
  }

  #[test]
  fn save_and_load_round_trip() {
    let mut conn = test_conn();
    let summary = save_quote(&mut conn, &sample_input(Some("Q-2026-0042"))).unwrap();
    assert_eq!(summary.product_count, 1);
    assert!((summary.net_total - 180.0).abs() < 1e-9);

    let detail = get_quote_detail(&conn, "Q-2026-0042").unwrap();
    assert_eq!(detail.products.len(), 1);
    assert_eq!(detail.products[0].name, "Coaster set");
    assert!((detail.finalized.totals.total_ex_vat - 180.0).abs() < 1e-9);
    assert!((detail.products[0].calculations.cogs.main - 22.0).abs() < 1e-9);
  }

  #[test]
  fn resaving_replaces_products_and_keeps_created_at() {
    let mut conn = test_conn();
    let first = save_quote(&mut conn, &sample_input(Some("Q-2026-0050"))).unwrap();

    let mut update = sample_input(Some("Q-2026-0050"));
    update.products.push(QuoteProductInput {
      name: "Gift box".to_string(),
      pricing: update.products[0].pricing.clone(),
    });
    let second = save_quote(&mut conn, &update).unwrap();
    assert_eq!(second.product_count, 2);
    assert_eq!(second.created_at, first.created_at);
  }

  #[test]
  fn finalized_quotes_reject_changes() {
    let mut conn = test_conn();
    save_quote(&mut conn, &sample_input(Some("Q-2026-0060"))).unwrap();
    mark_finalized(&conn, "Q-2026-0060").unwrap();

    let err = save_quote(&mut conn, &sample_input(Some("Q-2026-0060"))).unwrap_err();
    assert_eq!(err.code, "QUOTE_FINALIZED");
  }

  #[test]
  fn delete_removes_quote_and_products() {
    let mut conn = test_conn();
    save_quote(&mut conn, &sample_input(Some("Q-2026-0070"))).unwrap();
    let deleted = delete_quote(&mut conn, "Q-2026-0070").unwrap();
    assert_eq!(deleted, 2);
    assert!(fetch_summary(&conn, "Q-2026-0070").is_err());
  }
}
