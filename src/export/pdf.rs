use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::error::AppError;
use crate::format;
use crate::models::{CustomerType, QuoteDetail};

pub fn export_quote_pdf(detail: &QuoteDetail, path: &Path) -> Result<(), AppError> {
  let (doc, page1, layer1) = PdfDocument::new("Quote", Mm(210.0), Mm(297.0), "Layer 1");
  let layer = doc.get_page(page1).get_layer(layer1);

  let font = doc
    .add_builtin_font(BuiltinFont::Helvetica)
    .map_err(|err| AppError::new("PDF_EXPORT", err.to_string()))?;
  let font_bold = doc
    .add_builtin_font(BuiltinFont::HelveticaBold)
    .map_err(|err| AppError::new("PDF_EXPORT", err.to_string()))?;

  let summary = &detail.summary;
  let finalized = &detail.finalized;
  let currency = summary.currency.as_str();

  let mut y: f32 = 285.0;

  push_line(&layer, &font_bold, "QUOTE", 24.0, 15.0, y);
  push_line(&layer, &font_bold, &summary.quote_number, 12.0, 145.0, y);
  y -= 7.0;
  if let Some(project) = &summary.project_name {
    push_line(&layer, &font, project, 11.0, 15.0, y);
  }
  push_line(&layer, &font, &format!("Date: {}", date_only(&summary.updated_at)), 10.0, 145.0, y);

  y = 270.0;
  divider(&layer, y);

  y -= 10.0;
  push_line(&layer, &font_bold, "Client:", 12.0, 15.0, y);
  push_line(&layer, &font_bold, "Details:", 12.0, 120.0, y);
  y -= 7.0;
  push_line(&layer, &font, summary.client_name.as_deref().unwrap_or("-"), 10.0, 15.0, y);
  push_line(&layer, &font, &format!("Currency: {}", currency), 10.0, 120.0, y);
  y -= 5.0;
  let basis = match summary.customer_type {
    CustomerType::Private => "Prices incl. VAT",
    CustomerType::Business => "Prices excl. VAT",
  };
  push_line(&layer, &font, basis, 10.0, 120.0, y);

  y -= 12.0;
  push_line(&layer, &font_bold, "Items", 12.0, 15.0, y);
  y -= 6.0;

  let x_name = 15.0;
  let x_qty = 110.0;
  let x_unit = 135.0;
  let x_total = 170.0;

  push_line(&layer, &font_bold, "Description", 10.0, x_name, y);
  push_line(&layer, &font_bold, "Qty", 10.0, x_qty, y);
  push_line(&layer, &font_bold, "Unit price", 10.0, x_unit, y);
  push_line(&layer, &font_bold, "Total", 10.0, x_total, y);

  y -= 3.5;
  divider(&layer, y);
  y -= 7.0;

  for (idx, item) in finalized.line_items.iter().enumerate() {
    if y < 60.0 {
      return Err(AppError::new("PDF_EXPORT", "Too many line items for a single page"));
    }
    push_line(&layer, &font, &format!("{}. {}", idx + 1, item.name), 10.0, x_name, y);
    push_line(&layer, &font, &format!("{:.0}", item.quantity), 10.0, x_qty, y);
    push_line(&layer, &font, &format::format_currency(item.unit_price, currency), 10.0, x_unit, y);
    push_line(&layer, &font_bold, &format::format_currency(item.line_total, currency), 10.0, x_total, y);
    y -= 6.0;
  }

  if let Some(discount) = &finalized.discount {
    push_line(&layer, &font, &discount.label, 10.0, x_name, y);
    push_line(
      &layer,
      &font,
      &format::format_currency(-discount.amount, currency),
      10.0,
      x_total,
      y,
    );
    y -= 6.0;
  }
  if let Some(shipping) = &finalized.shipping {
    push_line(&layer, &font, &shipping.label, 10.0, x_name, y);
    push_line(&layer, &font, &format::format_currency(shipping.amount, currency), 10.0, x_total, y);
    y -= 6.0;
  }

  y -= 4.0;
  divider(&layer, y);
  y -= 10.0;

  push_line(&layer, &font, "Total excl. VAT:", 11.0, 135.0, y);
  push_line(
    &layer,
    &font,
    &format::format_currency_whole(finalized.totals.total_ex_vat, currency),
    11.0,
    x_total,
    y,
  );
  y -= 6.0;
  push_line(
    &layer,
    &font,
    &format!("VAT ({}%):", round_rate(finalized.average_vat_rate)),
    11.0,
    135.0,
    y,
  );
  push_line(
    &layer,
    &font,
    &format::format_currency_whole(finalized.totals.vat_amount, currency),
    11.0,
    x_total,
    y,
  );
  y -= 8.0;
  push_line(&layer, &font_bold, "TOTAL:", 13.0, 135.0, y);
  push_line(
    &layer,
    &font_bold,
    &format::format_currency_whole(finalized.totals.total_inc_vat, currency),
    13.0,
    x_total,
    y,
  );

  push_line(&layer, &font, "Generated with MakerCost.", 9.0, 15.0, 12.0);

  let file = File::create(path)?;
  let mut writer = BufWriter::new(file);
  doc
    .save(&mut writer)
    .map_err(|err| AppError::new("PDF_EXPORT", err.to_string()))?;
  Ok(())
}

fn push_line(
  layer: &PdfLayerReference,
  font: &IndirectFontRef,
  text: &str,
  font_size: f32,
  x: f32,
  y: f32,
) {
  layer.use_text(text, font_size, Mm(x), Mm(y), font);
}

fn divider(layer: &PdfLayerReference, y: f32) {
  layer.add_line(printpdf::Line {
    points: vec![
      (printpdf::Point::new(Mm(15.0), Mm(y)), false),
      (printpdf::Point::new(Mm(195.0), Mm(y)), false),
    ],
    is_closed: false,
  });
}

fn date_only(timestamp: &str) -> &str {
  timestamp.split('T').next().unwrap_or(timestamp)
}

fn round_rate(rate: f64) -> String {
  if (rate - rate.round()).abs() < 1e-9 {
    format!("{:.0}", rate)
  } else {
    format!("{:.1}", rate)
  }
}
