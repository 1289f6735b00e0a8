use std::path::PathBuf;

use chrono::{Datelike, Utc};
use rusqlite::{params, Connection};

use makercost::db;
use makercost::error::AppError;
use makercost::models::{
  CostParameters, CostType, CustomerType, DiscountInfo, DiscountType, LaborInfo, Machine, Material,
  MaterialCategory, OverheadInfo, PricingInput, QuoteProductInput, SalePriceInfo, SaveQuoteInput,
  Settings, ShippingInfo, VatSettings,
};
use makercost::settings;
use makercost::store;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  let count = std::env::args()
    .nth(1)
    .and_then(|value| value.parse::<usize>().ok())
    .unwrap_or(60);

  let app_dir = if let Ok(path) = std::env::var("MAKERCOST_SEED_DIR") {
    PathBuf::from(path)
  } else {
    db::resolve_app_dir()?
  };

  let (db, _export_base) = db::init_db(&app_dir)?;

  let created = db::with_conn(&db, |conn| seed_demo_quotes(conn, count))?;

  println!("Seeded {} demo quotes in {}", created, app_dir.display());
  Ok(())
}

fn seed_demo_quotes(conn: &mut Connection, count: usize) -> Result<usize, AppError> {
  let settings = settings::get_settings(conn)?;
  let year = Utc::now().year();
  let mut rng = MockRng::new(Utc::now().timestamp_millis() as u64);

  for _ in 0..count {
    let input = demo_quote_input(&mut rng, &settings);
    let summary = store::save_quote(conn, &input)?;

    let month = (rng.next_u32() % 12 + 1) as u32;
    let day = (rng.next_u32() % days_in_month(year, month) + 1) as u32;
    let date = chrono::NaiveDate::from_ymd_opt(year, month, day)
      .unwrap_or_else(|| chrono::NaiveDate::from_ymd_opt(year, month, 1).unwrap());
    let stamp = format!("{}T09:00:00+00:00", date.format("%Y-%m-%d"));
    conn.execute(
      "UPDATE quotes SET year = ?1, month = ?2, created_at = ?3, updated_at = ?4 WHERE quote_number = ?5",
      params![year, month as i32, stamp, stamp, summary.quote_number],
    )?;

    if rng.next_u32() % 100 < 30 {
      store::mark_finalized(conn, &summary.quote_number)?;
    }
  }

  Ok(count)
}

fn demo_quote_input(rng: &mut MockRng, settings: &Settings) -> SaveQuoteInput {
  let projects = [
    "Coaster batch",
    "Walnut lamp run",
    "Ceramic mug series",
    "Laser-cut signage",
    "Resin jewelry set",
  ];
  let clients = [
    "Atelier Nord",
    "Hilltop Ceramics",
    "Acme Interiors",
    "Studio Brill",
    "Corner Market",
  ];

  let project = projects[(rng.next_u32() as usize) % projects.len()];
  let client = clients[(rng.next_u32() as usize) % clients.len()];
  let product_count = (rng.next_u32() % 3 + 1) as usize;

  let mut products = Vec::new();
  for i in 0..product_count {
    let mut materials = vec![Material {
      name: "walnut board".to_string(),
      category: MaterialCategory::Main,
      cost_type: CostType::PerUnit,
      unit_cost: Some(random_amount(rng, 2.0, 12.0)),
      total_cost: None,
      quantity: random_amount(rng, 2.0, 15.0),
      unit: "board".to_string(),
      waste_percentage: if rng.next_u32() % 2 == 0 {
        Some((rng.next_u32() % 16) as f64)
      } else {
        None
      },
    }];
    if rng.next_u32() % 100 < 70 {
      materials.push(Material {
        name: "kraft box".to_string(),
        category: MaterialCategory::Packaging,
        cost_type: CostType::PerUnit,
        unit_cost: Some(random_amount(rng, 0.3, 2.0)),
        total_cost: None,
        quantity: random_amount(rng, 5.0, 50.0),
        unit: "pcs".to_string(),
        waste_percentage: None,
      });
    }

    let machines = if rng.next_u32() % 100 < 60 {
      vec![Machine {
        name: "laser cutter".to_string(),
        purchase_price: random_amount(rng, 2000.0, 15000.0),
        depreciation_percentage: random_amount(rng, 15.0, 25.0),
        hours_per_year: random_amount(rng, 800.0, 2000.0),
        maintenance_cost_per_year: random_amount(rng, 200.0, 800.0),
        power_consumption_kw: random_amount(rng, 0.5, 3.5),
        electricity_included_in_overhead: rng.next_u32() % 2 == 0,
        usage_hours: random_amount(rng, 0.5, 4.0),
      }]
    } else {
      Vec::new()
    };

    products.push(QuoteProductInput {
      name: format!("Demo product {}", i + 1),
      pricing: PricingInput {
        materials,
        cost_parameters: CostParameters {
          labor: LaborInfo {
            hours: random_amount(rng, 1.0, 6.0),
            rate_per_hour: random_amount(rng, 18.0, 40.0),
          },
          machines,
          overhead: OverheadInfo {
            rate_per_hour: random_amount(rng, 3.0, 9.0),
          },
        },
        sale_price: SalePriceInfo {
          amount: random_amount(rng, 8.0, 60.0),
          is_per_unit: true,
          units_count: (rng.next_u32() % 46 + 5) as f64,
          fixed_charge: 0.0,
        },
        vat_settings: VatSettings {
          rate: settings.vat_rate,
          is_inclusive: settings.vat_inclusive,
        },
        power_cost_per_kwh: Some(settings.power_cost_per_kwh),
      },
    });
  }

  let discount = if rng.next_u32() % 100 < 35 {
    Some(DiscountInfo {
      discount_type: DiscountType::Percentage,
      amount: (rng.next_u32() % 15 + 5) as f64,
    })
  } else {
    None
  };

  let shipping = if rng.next_u32() % 100 < 45 {
    Some(ShippingInfo {
      cost: random_amount(rng, 5.0, 40.0),
      charge_to_customer: true,
      is_free_shipping: rng.next_u32() % 100 < 15,
      includes_vat: rng.next_u32() % 2 == 0,
    })
  } else {
    None
  };

  SaveQuoteInput {
    quote_number: None,
    project_name: Some(format!("Demo: {project}")),
    client_name: Some(client.to_string()),
    customer_type: if rng.next_u32() % 2 == 0 {
      CustomerType::Private
    } else {
      CustomerType::Business
    },
    currency: settings.currency.clone(),
    products,
    discount,
    shipping,
  }
}

fn days_in_month(year: i32, month: u32) -> u32 {
  let next = if month == 12 {
    chrono::NaiveDate::from_ymd_opt(year + 1, 1, 1)
  } else {
    chrono::NaiveDate::from_ymd_opt(year, month + 1, 1)
  };
  let next_date = next.unwrap_or_else(|| chrono::NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap());
  (next_date - chrono::Duration::days(1)).day()
}

fn random_amount(rng: &mut MockRng, min: f64, max: f64) -> f64 {
  let range = (max - min).max(1.0);
  let base = min + (rng.next_u32() as f64 % range);
  let cents = (rng.next_u32() % 100) as f64 / 100.0;
  ((base + cents) * 100.0).round() / 100.0
}

struct MockRng {
  state: u64,
}

impl MockRng {
  fn new(seed: u64) -> Self {
    Self { state: seed }
  }

  fn next_u32(&mut self) -> u32 {
    self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
    (self.state >> 32) as u32
  }
}
