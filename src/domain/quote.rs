use crate::domain::vat;
use crate::models::{
  ChargeLine, CustomerType, DiscountInfo, DiscountType, FinalizedQuote, FinalizedTotals,
  PricingCalculations, QuoteLineItem, ShippingInfo,
};

pub struct PricedProduct {
  pub name: String,
  pub units_count: f64,
  pub net_total: f64,
  pub vat_total: f64,
  pub gross_total: f64,
}

impl PricedProduct {
  pub fn from_calculations(name: impl Into<String>, calc: &PricingCalculations) -> Self {
    Self {
      name: name.into(),
      units_count: calc.units_count,
      net_total: calc.net_sale_price,
      vat_total: calc.vat_amount,
      gross_total: calc.total_sale_price,
    }
  }
}

/// Weighted across products; an approximation when products carry
/// different VAT rates.
pub fn average_vat_rate(products: &[PricedProduct]) -> f64 {
  let net: f64 = products.iter().map(|p| p.net_total).sum();
  let gross: f64 = products.iter().map(|p| p.gross_total).sum();
  if net.abs() < f64::EPSILON {
    0.0
  } else {
    (gross / net - 1.0) * 100.0
  }
}

pub fn finalize(
  quote_number: &str,
  customer_type: CustomerType,
  currency: &str,
  products: &[PricedProduct],
  discount: Option<&DiscountInfo>,
  shipping: Option<&ShippingInfo>,
) -> FinalizedQuote {
  let subtotal_net: f64 = products.iter().map(|p| p.net_total).sum();
  let subtotal_vat: f64 = products.iter().map(|p| p.vat_total).sum();
  let subtotal_gross: f64 = products.iter().map(|p| p.gross_total).sum();
  let avg_rate = average_vat_rate(products);

  let line_items: Vec<QuoteLineItem> = products
    .iter()
    .map(|product| {
      let line_total = display_amount(customer_type, product.net_total, product.gross_total);
      QuoteLineItem {
        name: product.name.clone(),
        quantity: product.units_count,
        unit_price: if product.units_count > 0.0 {
          line_total / product.units_count
        } else {
          line_total
        },
        line_total,
        net_total: product.net_total,
        vat_total: product.vat_total,
        gross_total: product.gross_total,
      }
    })
    .collect();

  let discount_line = discount.and_then(|info| {
    if info.amount <= 0.0 {
      return None;
    }
    let (label, net, vat_amount, gross) = match info.discount_type {
      DiscountType::Percentage => {
        let fraction = info.amount / 100.0;
        (
          format!("Discount ({}%)", trim_percent(info.amount)),
          subtotal_net * fraction,
          subtotal_vat * fraction,
          subtotal_gross * fraction,
        )
      }
      // A fixed discount is stated in the basis the customer sees, so the
      // other basis is derived through the average VAT rate.
      DiscountType::Fixed => match customer_type {
        CustomerType::Business => {
          let gross = vat::gross_from_net(info.amount, avg_rate);
          ("Discount".to_string(), info.amount, gross - info.amount, gross)
        }
        CustomerType::Private => {
          let net = vat::net_from_gross(info.amount, avg_rate);
          ("Discount".to_string(), net, info.amount - net, info.amount)
        }
      },
    };
    Some(ChargeLine {
      label,
      amount: display_amount(customer_type, net, gross),
      net_amount: net,
      vat_amount,
      gross_amount: gross,
    })
  });

  let shipping_line = shipping.and_then(|info| {
    if !info.charge_to_customer || info.is_free_shipping || info.cost <= 0.0 {
      return None;
    }
    let (net, gross) = if info.includes_vat {
      (vat::net_from_gross(info.cost, avg_rate), info.cost)
    } else {
      (info.cost, vat::gross_from_net(info.cost, avg_rate))
    };
    Some(ChargeLine {
      label: "Shipping".to_string(),
      amount: display_amount(customer_type, net, gross),
      net_amount: net,
      vat_amount: gross - net,
      gross_amount: gross,
    })
  });

  let discount_net = discount_line.as_ref().map(|l| l.net_amount).unwrap_or(0.0);
  let discount_vat = discount_line.as_ref().map(|l| l.vat_amount).unwrap_or(0.0);
  let shipping_net = shipping_line.as_ref().map(|l| l.net_amount).unwrap_or(0.0);
  let shipping_vat = shipping_line.as_ref().map(|l| l.vat_amount).unwrap_or(0.0);

  let total_ex_vat = subtotal_net - discount_net + shipping_net;
  let vat_amount = subtotal_vat - discount_vat + shipping_vat;

  let totals = FinalizedTotals {
    subtotal: display_amount(customer_type, subtotal_net, subtotal_gross),
    discount: discount_line.as_ref().map(|l| l.amount).unwrap_or(0.0),
    shipping: shipping_line.as_ref().map(|l| l.amount).unwrap_or(0.0),
    total_ex_vat,
    vat_amount,
    total_inc_vat: total_ex_vat + vat_amount,
  };

  FinalizedQuote {
    quote_number: quote_number.to_string(),
    customer_type,
    currency: currency.to_string(),
    average_vat_rate: avg_rate,
    line_items,
    discount: discount_line,
    shipping: shipping_line,
    totals,
  }
}

fn display_amount(customer_type: CustomerType, net: f64, gross: f64) -> f64 {
  match customer_type {
    CustomerType::Private => gross,
    CustomerType::Business => net,
  }
}

fn trim_percent(value: f64) -> String {
  if (value - value.round()).abs() < 1e-9 {
    format!("{:.0}", value)
  } else {
    format!("{}", value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn product(name: &str, units: f64, net: f64, rate: f64) -> PricedProduct {
    PricedProduct {
      name: name.to_string(),
      units_count: units,
      net_total: net,
      vat_total: net * rate / 100.0,
      gross_total: net * (1.0 + rate / 100.0),
    }
  }

  #[test]
  fn business_lines_display_ex_vat() {
    let products = vec![product("Coaster set", 10.0, 200.0, 18.0)];
    let quote = finalize("Q-2026-0001", CustomerType::Business, "USD", &products, None, None);
    let line = &quote.line_items[0];
    assert!((line.line_total - 200.0).abs() < 1e-9);
    assert!((line.unit_price - 20.0).abs() < 1e-9);
    assert!((quote.totals.subtotal - 200.0).abs() < 1e-9);
    assert!((quote.totals.total_inc_vat - 236.0).abs() < 1e-9);
  }

  #[test]
  fn private_lines_display_inc_vat() {
    let products = vec![product("Coaster set", 10.0, 200.0, 18.0)];
    let quote = finalize("Q-2026-0001", CustomerType::Private, "USD", &products, None, None);
    let line = &quote.line_items[0];
    assert!((line.line_total - 236.0).abs() < 1e-9);
    assert!((line.unit_price - 23.6).abs() < 1e-9);
    assert!((quote.totals.subtotal - 236.0).abs() < 1e-9);
  }

  #[test]
  fn percentage_discount_uses_ex_vat_basis_for_business() {
    let products = vec![product("Lamp", 5.0, 100.0, 18.0), product("Shade", 5.0, 100.0, 18.0)];
    let discount = DiscountInfo { discount_type: DiscountType::Percentage, amount: 10.0 };
    let quote = finalize(
      "Q-2026-0002",
      CustomerType::Business,
      "EUR",
      &products,
      Some(&discount),
      None,
    );
    let line = quote.discount.as_ref().unwrap();
    assert!((line.amount - 20.0).abs() < 1e-9);
    assert!((quote.totals.total_ex_vat - 180.0).abs() < 1e-9);
    assert!((quote.totals.vat_amount - 32.4).abs() < 1e-9);
    assert!((quote.totals.total_inc_vat - 212.4).abs() < 1e-9);
  }

  #[test]
  fn percentage_discount_uses_inc_vat_basis_for_private() {
    let products = vec![product("Lamp", 5.0, 100.0, 18.0), product("Shade", 5.0, 100.0, 18.0)];
    let discount = DiscountInfo { discount_type: DiscountType::Percentage, amount: 10.0 };
    let quote = finalize(
      "Q-2026-0002",
      CustomerType::Private,
      "EUR",
      &products,
      Some(&discount),
      None,
    );
    let line = quote.discount.as_ref().unwrap();
    assert!((line.amount - 23.6).abs() < 1e-9);
    assert!((quote.totals.subtotal - 236.0).abs() < 1e-9);
    assert!((quote.totals.total_inc_vat - 212.4).abs() < 1e-9);
  }

  #[test]
  fn fixed_discount_is_net_for_business_and_gross_for_private() {
    let products = vec![product("Bench", 1.0, 100.0, 18.0)];
    let discount = DiscountInfo { discount_type: DiscountType::Fixed, amount: 50.0 };

    let business = finalize(
      "Q-2026-0003",
      CustomerType::Business,
      "USD",
      &products,
      Some(&discount),
      None,
    );
    let line = business.discount.as_ref().unwrap();
    assert!((line.net_amount - 50.0).abs() < 1e-9);
    assert!((line.gross_amount - 59.0).abs() < 1e-9);

    let private = finalize(
      "Q-2026-0003",
      CustomerType::Private,
      "USD",
      &products,
      Some(&discount),
      None,
    );
    let line = private.discount.as_ref().unwrap();
    assert!((line.gross_amount - 50.0).abs() < 1e-9);
    assert!((line.net_amount - 50.0 / 1.18).abs() < 1e-9);
  }

  #[test]
  fn free_shipping_adds_no_line() {
    let products = vec![product("Mug", 4.0, 80.0, 10.0)];
    let shipping = ShippingInfo {
      cost: 12.0,
      charge_to_customer: true,
      is_free_shipping: true,
      includes_vat: false,
    };
    let quote = finalize(
      "Q-2026-0004",
      CustomerType::Private,
      "USD",
      &products,
      None,
      Some(&shipping),
    );
    assert!(quote.shipping.is_none());
    assert!((quote.totals.shipping - 0.0).abs() < 1e-9);
  }

  #[test]
  fn shipping_respects_its_own_vat_flag() {
    let products = vec![product("Mug", 4.0, 100.0, 20.0)];
    let shipping = ShippingInfo {
      cost: 12.0,
      charge_to_customer: true,
      is_free_shipping: false,
      includes_vat: true,
    };
    let quote = finalize(
      "Q-2026-0005",
      CustomerType::Business,
      "GBP",
      &products,
      None,
      Some(&shipping),
    );
    let line = quote.shipping.as_ref().unwrap();
    assert!((line.gross_amount - 12.0).abs() < 1e-9);
    assert!((line.net_amount - 10.0).abs() < 1e-9);
    assert!((quote.totals.total_ex_vat - 110.0).abs() < 1e-9);
    assert!((quote.totals.total_inc_vat - 132.0).abs() < 1e-9);
  }

  #[test]
  fn totals_stay_internally_consistent() {
    let products = vec![product("A", 3.0, 150.0, 18.0), product("B", 2.0, 90.0, 8.0)];
    let discount = DiscountInfo { discount_type: DiscountType::Fixed, amount: 25.0 };
    let shipping = ShippingInfo {
      cost: 15.0,
      charge_to_customer: true,
      is_free_shipping: false,
      includes_vat: false,
    };
    let quote = finalize(
      "Q-2026-0006",
      CustomerType::Private,
      "EUR",
      &products,
      Some(&discount),
      Some(&shipping),
    );
    let totals = &quote.totals;
    assert!((totals.total_inc_vat - (totals.total_ex_vat + totals.vat_amount)).abs() < 1e-9);
  }

  #[test]
  fn average_vat_rate_is_weighted() {
    let products = vec![product("A", 1.0, 100.0, 0.0), product("B", 1.0, 100.0, 20.0)];
    assert!((average_vat_rate(&products) - 10.0).abs() < 1e-9);
    assert_eq!(average_vat_rate(&[]), 0.0);
  }
}
