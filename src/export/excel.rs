use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};

use crate::domain::whatif;
use crate::error::AppError;
use crate::models::QuoteDetail;

pub fn export_quote_workbook(detail: &QuoteDetail, path: &Path) -> Result<(), AppError> {
  let mut workbook = Workbook::new();
  write_summary_sheet(&mut workbook, detail)?;
  write_products_sheet(&mut workbook, detail)?;
  write_materials_sheet(&mut workbook, detail)?;
  write_what_if_sheet(&mut workbook, detail)?;

  workbook
    .save(path)
    .map_err(|err| AppError::new("EXPORT", err.to_string()))?;
  Ok(())
}

fn money_format(currency: &str) -> Format {
  Format::new().set_num_format(format!("[${currency}] #,##0.00"))
}

fn write_summary_sheet(workbook: &mut Workbook, detail: &QuoteDetail) -> Result<(), AppError> {
  let sheet = workbook.add_worksheet();
  sheet
    .set_name("SUMMARY")
    .map_err(|err| AppError::new("EXPORT", err.to_string()))?;

  let header = Format::new()
    .set_bold()
    .set_font_color(Color::White)
    .set_background_color(Color::RGB(0x1A2433));
  let label = Format::new().set_bold();
  let money = money_format(&detail.summary.currency);
  let percent = Format::new().set_num_format("0.00%");

  let title = match &detail.summary.project_name {
    Some(project) => format!("Quote {} - {}", detail.summary.quote_number, project),
    None => format!("Quote {}", detail.summary.quote_number),
  };
  sheet.merge_range(0, 0, 0, 3, &title, &header)?;

  sheet.write_string_with_format(2, 0, "Client", &label)?;
  sheet.write_string(2, 1, detail.summary.client_name.as_deref().unwrap_or(""))?;
  sheet.write_string_with_format(3, 0, "Customer type", &label)?;
  sheet.write_string(3, 1, detail.summary.customer_type.as_str())?;
  sheet.write_string_with_format(4, 0, "Currency", &label)?;
  sheet.write_string(4, 1, &detail.summary.currency)?;
  sheet.write_string_with_format(5, 0, "Status", &label)?;
  sheet.write_string(5, 1, &detail.summary.status)?;
  sheet.write_string_with_format(6, 0, "Created", &label)?;
  sheet.write_string(6, 1, &detail.summary.created_at)?;

  let totals = &detail.finalized.totals;
  let quote_profit: f64 = detail
    .products
    .iter()
    .map(|product| product.calculations.net_profit)
    .sum();
  let rows = vec![
    ("Subtotal", totals.subtotal),
    ("Discount", -totals.discount),
    ("Shipping", totals.shipping),
    ("Total excl. VAT", totals.total_ex_vat),
    ("VAT", totals.vat_amount),
    ("Total incl. VAT", totals.total_inc_vat),
    ("Net profit", quote_profit),
  ];

  let mut row = 8;
  for (label_text, value) in rows {
    sheet.write_string_with_format(row, 0, label_text, &label)?;
    sheet.write_number_with_format(row, 1, value, &money)?;
    row += 1;
  }

  sheet.write_string_with_format(row, 0, "Average VAT rate", &label)?;
  sheet.write_number_with_format(row, 1, detail.finalized.average_vat_rate / 100.0, &percent)?;

  sheet.set_column_width(0, 24)?;
  sheet.set_column_width(1, 18)?;
  Ok(())
}

fn write_products_sheet(workbook: &mut Workbook, detail: &QuoteDetail) -> Result<(), AppError> {
  let sheet = workbook.add_worksheet();
  sheet
    .set_name("PRODUCTS")
    .map_err(|err| AppError::new("EXPORT", err.to_string()))?;

  let header = Format::new()
    .set_bold()
    .set_background_color(Color::RGB(0xE2E8F0))
    .set_align(FormatAlign::Center);
  let money = money_format(&detail.summary.currency);
  let percent = Format::new().set_num_format("0.0\"%\"");

  let headers = [
    "Product",
    "Units",
    "Net sales",
    "COGS",
    "Machines",
    "Labor",
    "Overhead",
    "Gross profit",
    "Net profit",
    "Margin %",
  ];
  for (idx, label) in headers.iter().enumerate() {
    sheet.write_string_with_format(0, idx as u16, *label, &header)?;
  }

  let mut row = 1;
  for product in &detail.products {
    let calc = &product.calculations;
    sheet.write_string(row, 0, &product.name)?;
    sheet.write_number(row, 1, calc.units_count)?;
    sheet.write_number_with_format(row, 2, calc.net_sale_price, &money)?;
    sheet.write_number_with_format(row, 3, calc.cogs.total, &money)?;
    sheet.write_number_with_format(row, 4, calc.machine_costs, &money)?;
    sheet.write_number_with_format(row, 5, calc.labor_costs, &money)?;
    sheet.write_number_with_format(row, 6, calc.overhead_costs, &money)?;
    sheet.write_number_with_format(row, 7, calc.gross_profit, &money)?;
    sheet.write_number_with_format(row, 8, calc.net_profit, &money)?;
    sheet.write_number_with_format(row, 9, calc.share_of_net_sales.net_profit, &percent)?;
    row += 1;
  }

  sheet.set_column_width(0, 26)?;
  for col in 1..=9 {
    sheet.set_column_width(col, 14)?;
  }
  if row > 1 {
    sheet.autofilter(0, 0, row - 1, 9)?;
  }
  sheet.set_freeze_panes(1, 0)?;
  Ok(())
}

fn write_materials_sheet(workbook: &mut Workbook, detail: &QuoteDetail) -> Result<(), AppError> {
  let sheet = workbook.add_worksheet();
  sheet
    .set_name("MATERIALS")
    .map_err(|err| AppError::new("EXPORT", err.to_string()))?;

  let header = Format::new()
    .set_bold()
    .set_background_color(Color::RGB(0xE2E8F0))
    .set_align(FormatAlign::Center);
  let money = money_format(&detail.summary.currency);
  let percent = Format::new().set_num_format("0.0\"%\"");

  let headers = [
    "Product",
    "Material",
    "Category",
    "Cost type",
    "Quantity",
    "Unit",
    "Unit cost",
    "Waste %",
    "Cost",
  ];
  for (idx, label) in headers.iter().enumerate() {
    sheet.write_string_with_format(0, idx as u16, *label, &header)?;
  }

  let mut row = 1;
  for product in &detail.products {
    for line in &product.calculations.material_lines {
      sheet.write_string(row, 0, &product.name)?;
      sheet.write_string(row, 1, &line.name)?;
      sheet.write_string(row, 2, category_label(line))?;
      sheet.write_string(row, 3, cost_type_label(line))?;
      sheet.write_number(row, 4, line.quantity)?;
      sheet.write_string(row, 5, &line.unit)?;
      if let Some(unit_cost) = line.unit_cost {
        sheet.write_number_with_format(row, 6, unit_cost, &money)?;
      }
      if let Some(waste) = line.waste_percentage {
        sheet.write_number_with_format(row, 7, waste, &percent)?;
      }
      sheet.write_number_with_format(row, 8, line.cost, &money)?;
      row += 1;
    }
  }

  sheet.set_column_width(0, 24)?;
  sheet.set_column_width(1, 24)?;
  for col in 2..=8 {
    sheet.set_column_width(col, 12)?;
  }
  if row > 1 {
    sheet.autofilter(0, 0, row - 1, 8)?;
  }
  sheet.set_freeze_panes(1, 0)?;
  Ok(())
}

fn write_what_if_sheet(workbook: &mut Workbook, detail: &QuoteDetail) -> Result<(), AppError> {
  let sheet = workbook.add_worksheet();
  sheet
    .set_name("WHATIF")
    .map_err(|err| AppError::new("EXPORT", err.to_string()))?;

  let header = Format::new()
    .set_bold()
    .set_background_color(Color::RGB(0xE2E8F0))
    .set_align(FormatAlign::Center);
  let money = money_format(&detail.summary.currency);
  let percent = Format::new().set_num_format("0.0\"%\"");

  let headers = ["Product", "Scenario", "Sale amount", "Net sales", "Net profit", "Margin %"];
  for (idx, label) in headers.iter().enumerate() {
    sheet.write_string_with_format(0, idx as u16, *label, &header)?;
  }

  let mut row = 1;
  for product in &detail.products {
    for scenario in whatif::fixed_scenarios(&product.pricing) {
      sheet.write_string(row, 0, &product.name)?;
      sheet.write_string(row, 1, &scenario.label)?;
      sheet.write_number_with_format(row, 2, scenario.sale_amount, &money)?;
      sheet.write_number_with_format(row, 3, scenario.net_sale_price, &money)?;
      sheet.write_number_with_format(row, 4, scenario.net_profit, &money)?;
      sheet.write_number_with_format(row, 5, scenario.margin, &percent)?;
      row += 1;
    }
  }

  sheet.set_column_width(0, 24)?;
  sheet.set_column_width(1, 14)?;
  for col in 2..=5 {
    sheet.set_column_width(col, 14)?;
  }
  sheet.set_freeze_panes(1, 0)?;
  Ok(())
}

fn category_label(line: &crate::models::MaterialCostLine) -> &'static str {
  match line.category {
    crate::models::MaterialCategory::Main => "main",
    crate::models::MaterialCategory::Packaging => "packaging",
    crate::models::MaterialCategory::Decorations => "decorations",
  }
}

fn cost_type_label(line: &crate::models::MaterialCostLine) -> &'static str {
  match line.cost_type {
    crate::models::CostType::PerUnit => "per-unit",
    crate::models::CostType::TotalCost => "total-cost",
  }
}
