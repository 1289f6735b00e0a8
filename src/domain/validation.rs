use crate::error::AppError;
use crate::format;
use crate::models::{PricingInput, SaveQuoteInput};

pub fn ensure_amount_positive(amount: f64) -> Result<(), AppError> {
  if amount <= 0.0 || !amount.is_finite() {
    Err(AppError::new("INVALID_AMOUNT", "Amount must be greater than 0"))
  } else {
    Ok(())
  }
}

pub fn ensure_vat_rate(rate: f64) -> Result<(), AppError> {
  if !(0.0..100.0).contains(&rate) {
    Err(AppError::new("INVALID_VAT", "VAT rate must be between 0 and 100"))
  } else {
    Ok(())
  }
}

pub fn ensure_units_count(units: f64) -> Result<(), AppError> {
  if units <= 0.0 || !units.is_finite() {
    Err(AppError::new("INVALID_UNITS", "Units count must be greater than 0"))
  } else {
    Ok(())
  }
}

pub fn ensure_percentage(value: f64) -> Result<(), AppError> {
  if !(0.0..=100.0).contains(&value) {
    Err(AppError::new("INVALID_PERCENTAGE", "Percentage must be between 0 and 100"))
  } else {
    Ok(())
  }
}

pub fn ensure_currency(code: &str) -> Result<(), AppError> {
  if format::currency_spec(code).is_none() {
    Err(AppError::new("INVALID_CURRENCY", format!("Unsupported currency: {code}")))
  } else {
    Ok(())
  }
}

pub fn ensure_pricing_input(input: &PricingInput) -> Result<(), AppError> {
  ensure_amount_positive(input.sale_price.amount)?;
  ensure_units_count(input.sale_price.units_count)?;
  ensure_vat_rate(input.vat_settings.rate)?;
  if input.sale_price.fixed_charge < 0.0 {
    return Err(AppError::new("INVALID_AMOUNT", "Fixed charge cannot be negative"));
  }
  for material in &input.materials {
    if material.quantity < 0.0 {
      return Err(AppError::new("INVALID_MATERIAL", "Material quantity cannot be negative"));
    }
    if let Some(waste) = material.waste_percentage {
      ensure_percentage(waste)?;
    }
  }
  for machine in &input.cost_parameters.machines {
    if machine.purchase_price < 0.0 {
      return Err(AppError::new("INVALID_MACHINE", "Please enter a valid purchase price"));
    }
    if machine.usage_hours < 0.0 {
      return Err(AppError::new("INVALID_MACHINE", "Machine usage hours cannot be negative"));
    }
  }
  Ok(())
}

pub fn ensure_save_quote_input(input: &SaveQuoteInput) -> Result<(), AppError> {
  ensure_currency(&input.currency)?;
  if input.products.is_empty() {
    return Err(AppError::new("QUOTE_EMPTY", "A quote needs at least one product"));
  }
  for product in &input.products {
    if product.name.trim().is_empty() {
      return Err(AppError::new("INVALID_PRODUCT", "Product name is required"));
    }
    ensure_pricing_input(&product.pricing)?;
  }
  if let Some(discount) = &input.discount {
    if discount.amount < 0.0 {
      return Err(AppError::new("INVALID_DISCOUNT", "Discount cannot be negative"));
    }
    if discount.discount_type == crate::models::DiscountType::Percentage {
      ensure_percentage(discount.amount)?;
    }
  }
  if let Some(shipping) = &input.shipping {
    if shipping.cost < 0.0 {
      return Err(AppError::new("INVALID_SHIPPING", "Shipping cost cannot be negative"));
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_non_positive_amounts() {
    assert!(ensure_amount_positive(0.0).is_err());
    assert!(ensure_amount_positive(-5.0).is_err());
    assert!(ensure_amount_positive(f64::NAN).is_err());
    assert!(ensure_amount_positive(10.0).is_ok());
  }

  #[test]
  fn rejects_out_of_range_vat() {
    assert!(ensure_vat_rate(-1.0).is_err());
    assert!(ensure_vat_rate(100.0).is_err());
    assert!(ensure_vat_rate(0.0).is_ok());
    assert!(ensure_vat_rate(18.0).is_ok());
  }

  #[test]
  fn rejects_unknown_currency() {
    assert!(ensure_currency("USD").is_ok());
    assert!(ensure_currency("XXX").is_err());
  }
}
