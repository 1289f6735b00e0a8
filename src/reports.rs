use rusqlite::{params, Connection};

use crate::domain::vat;
use crate::error::AppError;
use crate::models::{ClientSplit, Dashboard, DashboardStats, MonthSeriesPoint};

pub fn get_dashboard(conn: &Connection, year: i32) -> Result<Dashboard, AppError> {
  Ok(Dashboard {
    stats: get_stats(conn, year)?,
    monthly: get_month_series(conn, year)?,
    top_clients: get_top_clients(conn, year, 8)?,
  })
}

pub fn get_stats(conn: &Connection, year: i32) -> Result<DashboardStats, AppError> {
  let (quote_count, draft_count, finalized_count, revenue_net, vat_total, net_profit) = conn
    .query_row(
      "SELECT
          COUNT(*),
          COALESCE(SUM(CASE WHEN status = 'draft' THEN 1 ELSE 0 END), 0),
          COALESCE(SUM(CASE WHEN status = 'finalized' THEN 1 ELSE 0 END), 0),
          COALESCE(SUM(net_total), 0),
          COALESCE(SUM(vat_total), 0),
          COALESCE(SUM(net_profit), 0)
       FROM quotes WHERE year = ?1",
      params![year],
      |row| {
        Ok((
          row.get::<_, i64>(0)?,
          row.get::<_, i64>(1)?,
          row.get::<_, i64>(2)?,
          row.get::<_, f64>(3)?,
          row.get::<_, f64>(4)?,
          row.get::<_, f64>(5)?,
        ))
      },
    )?;

  Ok(DashboardStats {
    quote_count,
    draft_count,
    finalized_count,
    revenue_net,
    vat_total,
    net_profit,
    avg_margin: vat::safe_share(net_profit, revenue_net),
  })
}

pub fn get_month_series(conn: &Connection, year: i32) -> Result<Vec<MonthSeriesPoint>, AppError> {
  let mut stmt = conn.prepare(
    "SELECT month,
        COALESCE(SUM(net_total), 0),
        COALESCE(SUM(net_profit), 0),
        COUNT(*)
     FROM quotes
     WHERE year = ?1
     GROUP BY month
     ORDER BY month",
  )?;
  let rows = stmt.query_map(params![year], |row| {
    Ok(MonthSeriesPoint {
      month: row.get(0)?,
      revenue_net: row.get(1)?,
      net_profit: row.get(2)?,
      quote_count: row.get(3)?,
    })
  })?;
  Ok(rows.filter_map(Result::ok).collect())
}

pub fn get_top_clients(conn: &Connection, year: i32, limit: i64) -> Result<Vec<ClientSplit>, AppError> {
  let mut stmt = conn.prepare(
    "SELECT COALESCE(client_name, 'Unknown') as client, COALESCE(SUM(net_total), 0)
     FROM quotes
     WHERE year = ?1
     GROUP BY client
     ORDER BY SUM(net_total) DESC
     LIMIT ?2",
  )?;
  let rows = stmt.query_map(params![year, limit], |row| {
    Ok(ClientSplit {
      client: row.get(0)?,
      revenue_net: row.get(1)?,
    })
  })?;

  let mut data = Vec::new();
  for row in rows {
    data.push(row?);
  }
  Ok(data)
}
