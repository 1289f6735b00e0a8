use crate::domain::vat;
use crate::models::{
  CogsBreakdown, CostType, Machine, Material, MaterialCategory, MaterialCostLine, NetSalesShare,
  PerUnitFigures, PricingCalculations, PricingInput, SalePriceInfo,
};

pub fn material_cost(material: &Material) -> f64 {
  let base = match material.cost_type {
    CostType::PerUnit => material.unit_cost.unwrap_or(0.0) * material.quantity,
    CostType::TotalCost => material.total_cost.unwrap_or(0.0),
  };
  // Waste only ever applies to main materials.
  if material.category == MaterialCategory::Main {
    base * (1.0 + material.waste_percentage.unwrap_or(0.0) / 100.0)
  } else {
    base
  }
}

pub fn machine_cost(machine: &Machine, power_cost_per_kwh: f64) -> f64 {
  if machine.hours_per_year <= 0.0 {
    return 0.0;
  }
  let depreciation_per_hour =
    machine.purchase_price * machine.depreciation_percentage / 100.0 / machine.hours_per_year;
  let maintenance_per_hour = machine.maintenance_cost_per_year / machine.hours_per_year;
  let mut cost = (depreciation_per_hour + maintenance_per_hour) * machine.usage_hours;
  if !machine.electricity_included_in_overhead {
    cost += machine.power_consumption_kw * power_cost_per_kwh * machine.usage_hours;
  }
  cost
}

pub fn total_sale_price(sale: &SalePriceInfo) -> f64 {
  let base = if sale.is_per_unit {
    sale.amount * sale.units_count
  } else {
    sale.amount
  };
  base + sale.fixed_charge
}

pub fn calculate_pricing(input: &PricingInput) -> PricingCalculations {
  let power_cost = input.power_cost_per_kwh.unwrap_or(0.0);

  let material_lines: Vec<MaterialCostLine> = input
    .materials
    .iter()
    .map(|material| MaterialCostLine {
      name: material.name.clone(),
      category: material.category,
      cost_type: material.cost_type,
      quantity: material.quantity,
      unit: material.unit.clone(),
      unit_cost: material.unit_cost,
      waste_percentage: material.waste_percentage,
      cost: material_cost(material),
    })
    .collect();

  let mut cogs = CogsBreakdown {
    main: 0.0,
    packaging: 0.0,
    decorations: 0.0,
    total: 0.0,
  };
  for line in &material_lines {
    match line.category {
      MaterialCategory::Main => cogs.main += line.cost,
      MaterialCategory::Packaging => cogs.packaging += line.cost,
      MaterialCategory::Decorations => cogs.decorations += line.cost,
    }
  }
  cogs.total = cogs.main + cogs.packaging + cogs.decorations;

  let sale_total = total_sale_price(&input.sale_price);
  let sale_split = vat::split_amount(sale_total, &input.vat_settings);
  let fixed_split = vat::split_amount(input.sale_price.fixed_charge, &input.vat_settings);

  let machine_costs: f64 = input
    .cost_parameters
    .machines
    .iter()
    .map(|machine| machine_cost(machine, power_cost))
    .sum();
  let labor_costs = input.cost_parameters.labor.hours * input.cost_parameters.labor.rate_per_hour;
  let overhead_costs = input.cost_parameters.overhead.rate_per_hour * input.cost_parameters.labor.hours;
  let operating_costs = machine_costs + labor_costs + overhead_costs;

  let gross_profit = sale_split.net - fixed_split.net - cogs.total;
  let net_profit = gross_profit - operating_costs;

  let units = input.sale_price.units_count;
  let per_unit = PerUnitFigures {
    net_sale_price: per_unit_value(sale_split.net, units),
    cogs: per_unit_value(cogs.total, units),
    operating_costs: per_unit_value(operating_costs, units),
    gross_profit: per_unit_value(gross_profit, units),
    net_profit: per_unit_value(net_profit, units),
  };

  let net_basis = sale_split.net;
  let share_of_net_sales = NetSalesShare {
    cogs_main: share_percent(cogs.main, net_basis),
    cogs_packaging: share_percent(cogs.packaging, net_basis),
    cogs_decorations: share_percent(cogs.decorations, net_basis),
    cogs_total: share_percent(cogs.total, net_basis),
    machine_costs: share_percent(machine_costs, net_basis),
    labor_costs: share_percent(labor_costs, net_basis),
    overhead_costs: share_percent(overhead_costs, net_basis),
    gross_profit: share_percent(gross_profit, net_basis),
    net_profit: share_percent(net_profit, net_basis),
  };

  PricingCalculations {
    units_count: units,
    total_sale_price: sale_split.gross,
    vat_amount: sale_split.vat,
    net_sale_price: sale_split.net,
    fixed_charge_gross: fixed_split.gross,
    fixed_charge_net: fixed_split.net,
    material_lines,
    cogs,
    machine_costs,
    labor_costs,
    overhead_costs,
    operating_costs,
    gross_profit,
    net_profit,
    per_unit,
    share_of_net_sales,
  }
}

fn per_unit_value(total: f64, units: f64) -> f64 {
  if units <= 0.0 {
    0.0
  } else {
    total / units
  }
}

fn share_percent(value: f64, net_basis: f64) -> f64 {
  vat::safe_share(value, net_basis) * 100.0
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{CostParameters, LaborInfo, OverheadInfo, VatSettings};

  fn material(category: MaterialCategory, cost_type: CostType) -> Material {
    Material {
      name: "test".to_string(),
      category,
      cost_type,
      unit_cost: Some(10.0),
      total_cost: Some(40.0),
      quantity: 2.0,
      unit: "pcs".to_string(),
      waste_percentage: None,
    }
  }

  fn empty_cost_parameters() -> CostParameters {
    CostParameters {
      labor: LaborInfo { hours: 0.0, rate_per_hour: 0.0 },
      machines: Vec::new(),
      overhead: OverheadInfo { rate_per_hour: 0.0 },
    }
  }

  #[test]
  fn per_unit_material_cost_multiplies_quantity() {
    let m = material(MaterialCategory::Packaging, CostType::PerUnit);
    assert!((material_cost(&m) - 20.0).abs() < 1e-9);
  }

  #[test]
  fn total_cost_material_ignores_quantity() {
    let m = material(MaterialCategory::Packaging, CostType::TotalCost);
    assert!((material_cost(&m) - 40.0).abs() < 1e-9);
  }

  #[test]
  fn waste_applies_only_to_main_materials() {
    let mut m = material(MaterialCategory::Main, CostType::PerUnit);
    m.waste_percentage = Some(10.0);
    assert!((material_cost(&m) - 22.0).abs() < 1e-9);

    let mut p = material(MaterialCategory::Packaging, CostType::PerUnit);
    p.waste_percentage = Some(10.0);
    assert!((material_cost(&p) - 20.0).abs() < 1e-9);
  }

  #[test]
  fn machine_cost_sums_depreciation_maintenance_and_power() {
    let machine = Machine {
      name: "laser".to_string(),
      purchase_price: 10000.0,
      depreciation_percentage: 20.0,
      hours_per_year: 1000.0,
      maintenance_cost_per_year: 500.0,
      power_consumption_kw: 2.0,
      electricity_included_in_overhead: false,
      usage_hours: 3.0,
    };
    // 2.0/h depreciation + 0.5/h maintenance + 2kW * 0.25/kWh, over 3h.
    assert!((machine_cost(&machine, 0.25) - 9.0).abs() < 1e-9);
  }

  #[test]
  fn machine_electricity_skipped_when_in_overhead() {
    let machine = Machine {
      name: "press".to_string(),
      purchase_price: 10000.0,
      depreciation_percentage: 20.0,
      hours_per_year: 1000.0,
      maintenance_cost_per_year: 500.0,
      power_consumption_kw: 2.0,
      electricity_included_in_overhead: true,
      usage_hours: 3.0,
    };
    assert!((machine_cost(&machine, 0.25) - 7.5).abs() < 1e-9);
  }

  #[test]
  fn machine_with_zero_yearly_hours_costs_nothing() {
    let machine = Machine {
      name: "idle".to_string(),
      purchase_price: 10000.0,
      depreciation_percentage: 20.0,
      hours_per_year: 0.0,
      maintenance_cost_per_year: 500.0,
      power_consumption_kw: 2.0,
      electricity_included_in_overhead: false,
      usage_hours: 3.0,
    };
    assert_eq!(machine_cost(&machine, 0.25), 0.0);
  }

  #[test]
  fn total_sale_price_per_unit_and_fixed() {
    let per_unit = SalePriceInfo {
      amount: 25.0,
      is_per_unit: true,
      units_count: 4.0,
      fixed_charge: 10.0,
    };
    assert!((total_sale_price(&per_unit) - 110.0).abs() < 1e-9);

    let fixed = SalePriceInfo {
      amount: 25.0,
      is_per_unit: false,
      units_count: 4.0,
      fixed_charge: 10.0,
    };
    assert!((total_sale_price(&fixed) - 35.0).abs() < 1e-9);
  }

  #[test]
  fn worked_example_exclusive_vat() {
    let input = PricingInput {
      materials: vec![Material {
        name: "resin".to_string(),
        category: MaterialCategory::Main,
        cost_type: CostType::PerUnit,
        unit_cost: Some(10.0),
        total_cost: None,
        quantity: 2.0,
        unit: "kg".to_string(),
        waste_percentage: None,
      }],
      cost_parameters: empty_cost_parameters(),
      sale_price: SalePriceInfo {
        amount: 100.0,
        is_per_unit: false,
        units_count: 1.0,
        fixed_charge: 0.0,
      },
      vat_settings: VatSettings { rate: 18.0, is_inclusive: false },
      power_cost_per_kwh: None,
    };

    let calc = calculate_pricing(&input);
    assert!((calc.total_sale_price - 118.0).abs() < 1e-9);
    assert!((calc.vat_amount - 18.0).abs() < 1e-9);
    assert!((calc.net_sale_price - 100.0).abs() < 1e-9);
    assert!((calc.cogs.main - 20.0).abs() < 1e-9);
    assert!((calc.gross_profit - 80.0).abs() < 1e-9);
    assert!((calc.net_profit - 80.0).abs() < 1e-9);
    assert!((calc.share_of_net_sales.gross_profit - 80.0).abs() < 1e-9);
  }

  #[test]
  fn fixed_charge_is_excluded_from_gross_profit() {
    let input = PricingInput {
      materials: Vec::new(),
      cost_parameters: empty_cost_parameters(),
      sale_price: SalePriceInfo {
        amount: 100.0,
        is_per_unit: false,
        units_count: 1.0,
        fixed_charge: 18.0,
      },
      vat_settings: VatSettings { rate: 0.0, is_inclusive: true },
      power_cost_per_kwh: None,
    };

    let calc = calculate_pricing(&input);
    assert!((calc.total_sale_price - 118.0).abs() < 1e-9);
    assert!((calc.fixed_charge_net - 18.0).abs() < 1e-9);
    assert!((calc.gross_profit - 100.0).abs() < 1e-9);
  }

  #[test]
  fn degenerate_inputs_do_not_produce_nan() {
    let input = PricingInput {
      materials: Vec::new(),
      cost_parameters: empty_cost_parameters(),
      sale_price: SalePriceInfo {
        amount: 0.0,
        is_per_unit: true,
        units_count: 0.0,
        fixed_charge: 0.0,
      },
      vat_settings: VatSettings { rate: 18.0, is_inclusive: true },
      power_cost_per_kwh: None,
    };

    let calc = calculate_pricing(&input);
    assert_eq!(calc.per_unit.net_profit, 0.0);
    assert_eq!(calc.share_of_net_sales.net_profit, 0.0);
    assert!(calc.net_profit.is_finite());
  }

  #[test]
  fn overhead_uses_labor_hours() {
    let input = PricingInput {
      materials: Vec::new(),
      cost_parameters: CostParameters {
        labor: LaborInfo { hours: 4.0, rate_per_hour: 30.0 },
        machines: Vec::new(),
        overhead: OverheadInfo { rate_per_hour: 5.0 },
      },
      sale_price: SalePriceInfo {
        amount: 500.0,
        is_per_unit: false,
        units_count: 10.0,
        fixed_charge: 0.0,
      },
      vat_settings: VatSettings { rate: 0.0, is_inclusive: false },
      power_cost_per_kwh: None,
    };

    let calc = calculate_pricing(&input);
    assert!((calc.labor_costs - 120.0).abs() < 1e-9);
    assert!((calc.overhead_costs - 20.0).abs() < 1e-9);
    assert!((calc.net_profit - 360.0).abs() < 1e-9);
    assert!((calc.per_unit.net_profit - 36.0).abs() < 1e-9);
  }
}
