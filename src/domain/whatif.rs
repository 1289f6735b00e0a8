use crate::domain::pricing;
use crate::models::{PricingInput, ScenarioRow, WhatIfCell, WhatIfMatrix};

const PERCENT_STEPS: [f64; 13] = [
  -30.0, -25.0, -20.0, -15.0, -10.0, -5.0, 0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0,
];
const SMALL_PRICE_THRESHOLD: f64 = 20.0;
const SMALL_PRICE_STEP: f64 = 0.5;
const SMALL_QUANTITY_THRESHOLD: f64 = 12.0;

/// Absolute steps near zero, percentage steps once the base is large
/// enough for them to be meaningful. Always 13 steps before clamping,
/// centered on 0.
pub fn price_deltas(base: f64) -> Vec<f64> {
  if base < SMALL_PRICE_THRESHOLD {
    (-6..=6)
      .map(|step| step as f64 * SMALL_PRICE_STEP)
      .filter(|delta| base + delta > 0.0)
      .collect()
  } else {
    PERCENT_STEPS.iter().map(|pct| base * pct / 100.0).collect()
  }
}

pub fn quantity_deltas(base: f64) -> Vec<f64> {
  if base <= SMALL_QUANTITY_THRESHOLD {
    (-6..=6)
      .map(|step| step as f64)
      .filter(|delta| base + delta >= 1.0)
      .collect()
  } else {
    PERCENT_STEPS.iter().map(|pct| base * pct / 100.0).collect()
  }
}

pub fn what_if_matrix(input: &PricingInput, scale_with_quantity: bool) -> WhatIfMatrix {
  let base_calc = pricing::calculate_pricing(input);
  let price_deltas = price_deltas(input.sale_price.amount);
  let quantity_deltas = quantity_deltas(input.sale_price.units_count);

  let rows = price_deltas
    .iter()
    .map(|&price_delta| {
      quantity_deltas
        .iter()
        .map(|&quantity_delta| {
          let scenario = scenario_input(input, price_delta, quantity_delta, scale_with_quantity);
          let calc = pricing::calculate_pricing(&scenario);
          WhatIfCell {
            price_delta,
            quantity_delta,
            sale_amount: scenario.sale_price.amount,
            units_count: scenario.sale_price.units_count,
            net_profit: calc.net_profit,
            is_current: price_delta == 0.0 && quantity_delta == 0.0,
          }
        })
        .collect()
    })
    .collect();

  WhatIfMatrix {
    base_net_profit: base_calc.net_profit,
    price_deltas,
    quantity_deltas,
    rows,
  }
}

/// Fixed +-10/20% price scenarios for the internal Excel export.
pub fn fixed_scenarios(input: &PricingInput) -> Vec<ScenarioRow> {
  [-20.0_f64, -10.0, 0.0, 10.0, 20.0]
    .iter()
    .map(|&pct| {
      let delta = input.sale_price.amount * pct / 100.0;
      let scenario = scenario_input(input, delta, 0.0, false);
      let calc = pricing::calculate_pricing(&scenario);
      ScenarioRow {
        label: if pct == 0.0 {
          "Current".to_string()
        } else {
          format!("{:+.0}% price", pct)
        },
        sale_amount: scenario.sale_price.amount,
        net_sale_price: calc.net_sale_price,
        net_profit: calc.net_profit,
        margin: calc.share_of_net_sales.net_profit,
      }
    })
    .collect()
}

fn scenario_input(
  input: &PricingInput,
  price_delta: f64,
  quantity_delta: f64,
  scale_with_quantity: bool,
) -> PricingInput {
  let mut scenario = input.clone();
  scenario.sale_price.amount = input.sale_price.amount + price_delta;
  let new_units = input.sale_price.units_count + quantity_delta;
  scenario.sale_price.units_count = new_units;

  if scale_with_quantity && input.sale_price.units_count > 0.0 {
    let multiplier = new_units / input.sale_price.units_count;
    for material in &mut scenario.materials {
      material.quantity *= multiplier;
      if let Some(total) = material.total_cost {
        material.total_cost = Some(total * multiplier);
      }
    }
    scenario.cost_parameters.labor.hours *= multiplier;
    for machine in &mut scenario.cost_parameters.machines {
      machine.usage_hours *= multiplier;
    }
  }

  scenario
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{
    CostParameters, CostType, LaborInfo, Material, MaterialCategory, OverheadInfo, SalePriceInfo,
    VatSettings,
  };

  fn base_input() -> PricingInput {
    PricingInput {
      materials: vec![Material {
        name: "plywood".to_string(),
        category: MaterialCategory::Main,
        cost_type: CostType::PerUnit,
        unit_cost: Some(2.0),
        total_cost: None,
        quantity: 10.0,
        unit: "sheet".to_string(),
        waste_percentage: None,
      }],
      cost_parameters: CostParameters {
        labor: LaborInfo { hours: 2.0, rate_per_hour: 20.0 },
        machines: Vec::new(),
        overhead: OverheadInfo { rate_per_hour: 5.0 },
      },
      sale_price: SalePriceInfo {
        amount: 8.0,
        is_per_unit: true,
        units_count: 20.0,
        fixed_charge: 0.0,
      },
      vat_settings: VatSettings { rate: 18.0, is_inclusive: false },
      power_cost_per_kwh: None,
    }
  }

  #[test]
  fn small_price_uses_absolute_steps() {
    let deltas = price_deltas(8.0);
    assert_eq!(deltas.len(), 13);
    assert!(deltas.contains(&0.0));
    assert!(deltas.contains(&-3.0));
    assert!(deltas.contains(&3.0));
  }

  #[test]
  fn large_price_uses_percentage_steps() {
    let deltas = price_deltas(100.0);
    assert_eq!(deltas.len(), 13);
    assert!(deltas.contains(&-30.0));
    assert!(deltas.contains(&30.0));
  }

  #[test]
  fn tiny_price_clamps_to_positive() {
    let deltas = price_deltas(1.0);
    assert!(deltas.iter().all(|delta| 1.0 + delta > 0.0));
    assert!(deltas.contains(&0.0));
  }

  #[test]
  fn quantity_never_drops_below_one() {
    let deltas = quantity_deltas(3.0);
    assert!(deltas.iter().all(|delta| 3.0 + delta >= 1.0));
    assert!(deltas.len() <= 13);
  }

  #[test]
  fn current_cell_equals_baseline_exactly() {
    let input = base_input();
    let matrix = what_if_matrix(&input, true);
    let current = matrix
      .rows
      .iter()
      .flatten()
      .find(|cell| cell.is_current)
      .expect("current cell present");
    assert_eq!(current.net_profit, matrix.base_net_profit);
  }

  #[test]
  fn grid_stays_within_13_by_13() {
    let matrix = what_if_matrix(&base_input(), false);
    assert!(matrix.rows.len() <= 13);
    assert!(matrix.rows.iter().all(|row| row.len() <= 13));
  }

  #[test]
  fn scaling_moves_costs_with_quantity() {
    let input = base_input();
    let matrix = what_if_matrix(&input, true);
    // More units at the same per-unit price: revenue and costs both scale,
    // so profit grows but less than revenue alone would.
    let bigger = matrix
      .rows
      .iter()
      .flatten()
      .find(|cell| cell.price_delta == 0.0 && cell.quantity_delta > 0.0)
      .expect("scaled cell present");
    assert!(bigger.net_profit > matrix.base_net_profit);

    let unscaled = what_if_matrix(&input, false);
    let unscaled_cell = unscaled
      .rows
      .iter()
      .flatten()
      .find(|cell| cell.price_delta == 0.0 && cell.quantity_delta == bigger.quantity_delta)
      .expect("matching cell present");
    // Without scaling, material/labor stay flat and profit grows faster.
    assert!(unscaled_cell.net_profit > bigger.net_profit);
  }

  #[test]
  fn fixed_scenarios_cover_plus_minus_20() {
    let rows = fixed_scenarios(&base_input());
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[2].label, "Current");
    assert!(rows[0].net_profit < rows[4].net_profit);
  }
}
