use crate::models::VatSettings;

pub struct VatSplit {
  pub net: f64,
  pub vat: f64,
  pub gross: f64,
}

pub fn vat_from_gross(gross: f64, rate: f64) -> f64 {
  if rate <= 0.0 {
    0.0
  } else {
    gross * (rate / (100.0 + rate))
  }
}

pub fn net_from_gross(gross: f64, rate: f64) -> f64 {
  if rate <= 0.0 {
    gross
  } else {
    gross / (1.0 + rate / 100.0)
  }
}

pub fn gross_from_net(net: f64, rate: f64) -> f64 {
  if rate <= 0.0 {
    net
  } else {
    net * (1.0 + rate / 100.0)
  }
}

pub fn split_amount(amount: f64, vat: &VatSettings) -> VatSplit {
  if vat.is_inclusive {
    let net = net_from_gross(amount, vat.rate);
    VatSplit {
      net,
      vat: amount - net,
      gross: amount,
    }
  } else {
    let gross = gross_from_net(amount, vat.rate);
    VatSplit {
      net: amount,
      vat: gross - amount,
      gross,
    }
  }
}

pub fn safe_share(value: f64, basis: f64) -> f64 {
  if basis.abs() < f64::EPSILON {
    0.0
  } else {
    value / basis
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn inclusive_split_round_trips() {
    let split = split_amount(118.0, &VatSettings { rate: 18.0, is_inclusive: true });
    assert!((split.net - 100.0).abs() < 1e-9);
    assert!((split.vat - 18.0).abs() < 1e-9);
    assert!((split.net * 1.18 - split.gross).abs() < 1e-9);
  }

  #[test]
  fn exclusive_split_adds_vat_on_top() {
    let split = split_amount(100.0, &VatSettings { rate: 18.0, is_inclusive: false });
    assert!((split.net - 100.0).abs() < 1e-9);
    assert!((split.vat - 18.0).abs() < 1e-9);
    assert!((split.gross - 118.0).abs() < 1e-9);
  }

  #[test]
  fn zero_rate_is_a_no_op() {
    let split = split_amount(50.0, &VatSettings { rate: 0.0, is_inclusive: true });
    assert_eq!(split.net, 50.0);
    assert_eq!(split.vat, 0.0);
    assert_eq!(split.gross, 50.0);
    assert_eq!(vat_from_gross(50.0, 0.0), 0.0);
  }

  #[test]
  fn safe_share_guards_zero_basis() {
    assert_eq!(safe_share(10.0, 0.0), 0.0);
    assert!((safe_share(25.0, 100.0) - 0.25).abs() < 1e-12);
  }
}
