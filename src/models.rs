use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialCategory {
  Main,
  Packaging,
  Decorations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CostType {
  PerUnit,
  TotalCost,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Material {
  pub name: String,
  pub category: MaterialCategory,
  pub cost_type: CostType,
  pub unit_cost: Option<f64>,
  pub total_cost: Option<f64>,
  pub quantity: f64,
  pub unit: String,
  pub waste_percentage: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Machine {
  pub name: String,
  pub purchase_price: f64,
  pub depreciation_percentage: f64,
  pub hours_per_year: f64,
  pub maintenance_cost_per_year: f64,
  pub power_consumption_kw: f64,
  pub electricity_included_in_overhead: bool,
  pub usage_hours: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LaborInfo {
  pub hours: f64,
  pub rate_per_hour: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OverheadInfo {
  pub rate_per_hour: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CostParameters {
  pub labor: LaborInfo,
  pub machines: Vec<Machine>,
  pub overhead: OverheadInfo,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SalePriceInfo {
  pub amount: f64,
  pub is_per_unit: bool,
  pub units_count: f64,
  pub fixed_charge: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VatSettings {
  pub rate: f64,
  pub is_inclusive: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PricingInput {
  pub materials: Vec<Material>,
  pub cost_parameters: CostParameters,
  pub sale_price: SalePriceInfo,
  pub vat_settings: VatSettings,
  pub power_cost_per_kwh: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MaterialCostLine {
  pub name: String,
  pub category: MaterialCategory,
  pub cost_type: CostType,
  pub quantity: f64,
  pub unit: String,
  pub unit_cost: Option<f64>,
  pub waste_percentage: Option<f64>,
  pub cost: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CogsBreakdown {
  pub main: f64,
  pub packaging: f64,
  pub decorations: f64,
  pub total: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PerUnitFigures {
  pub net_sale_price: f64,
  pub cogs: f64,
  pub operating_costs: f64,
  pub gross_profit: f64,
  pub net_profit: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NetSalesShare {
  pub cogs_main: f64,
  pub cogs_packaging: f64,
  pub cogs_decorations: f64,
  pub cogs_total: f64,
  pub machine_costs: f64,
  pub labor_costs: f64,
  pub overhead_costs: f64,
  pub gross_profit: f64,
  pub net_profit: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PricingCalculations {
  pub units_count: f64,
  pub total_sale_price: f64,
  pub vat_amount: f64,
  pub net_sale_price: f64,
  pub fixed_charge_gross: f64,
  pub fixed_charge_net: f64,
  pub material_lines: Vec<MaterialCostLine>,
  pub cogs: CogsBreakdown,
  pub machine_costs: f64,
  pub labor_costs: f64,
  pub overhead_costs: f64,
  pub operating_costs: f64,
  pub gross_profit: f64,
  pub net_profit: f64,
  pub per_unit: PerUnitFigures,
  pub share_of_net_sales: NetSalesShare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
  Fixed,
  Percentage,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DiscountInfo {
  #[serde(rename = "type")]
  pub discount_type: DiscountType,
  pub amount: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ShippingInfo {
  pub cost: f64,
  pub charge_to_customer: bool,
  pub is_free_shipping: bool,
  pub includes_vat: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
  Private,
  Business,
}

impl CustomerType {
  pub fn as_str(&self) -> &'static str {
    match self {
      CustomerType::Private => "private",
      CustomerType::Business => "business",
    }
  }
}

impl std::str::FromStr for CustomerType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "private" => Ok(CustomerType::Private),
      "business" => Ok(CustomerType::Business),
      other => Err(format!("unknown customer type: {other}")),
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WhatIfCell {
  pub price_delta: f64,
  pub quantity_delta: f64,
  pub sale_amount: f64,
  pub units_count: f64,
  pub net_profit: f64,
  pub is_current: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WhatIfMatrix {
  pub base_net_profit: f64,
  pub price_deltas: Vec<f64>,
  pub quantity_deltas: Vec<f64>,
  pub rows: Vec<Vec<WhatIfCell>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScenarioRow {
  pub label: String,
  pub sale_amount: f64,
  pub net_sale_price: f64,
  pub net_profit: f64,
  pub margin: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QuoteLineItem {
  pub name: String,
  pub quantity: f64,
  pub unit_price: f64,
  pub line_total: f64,
  pub net_total: f64,
  pub vat_total: f64,
  pub gross_total: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChargeLine {
  pub label: String,
  pub amount: f64,
  pub net_amount: f64,
  pub vat_amount: f64,
  pub gross_amount: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FinalizedTotals {
  pub subtotal: f64,
  pub discount: f64,
  pub shipping: f64,
  pub total_ex_vat: f64,
  pub vat_amount: f64,
  pub total_inc_vat: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FinalizedQuote {
  pub quote_number: String,
  pub customer_type: CustomerType,
  pub currency: String,
  pub average_vat_rate: f64,
  pub line_items: Vec<QuoteLineItem>,
  pub discount: Option<ChargeLine>,
  pub shipping: Option<ChargeLine>,
  pub totals: FinalizedTotals,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QuoteProductInput {
  pub name: String,
  pub pricing: PricingInput,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SaveQuoteInput {
  pub quote_number: Option<String>,
  pub project_name: Option<String>,
  pub client_name: Option<String>,
  pub customer_type: CustomerType,
  pub currency: String,
  pub products: Vec<QuoteProductInput>,
  pub discount: Option<DiscountInfo>,
  pub shipping: Option<ShippingInfo>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QuoteSummary {
  pub id: i64,
  pub quote_number: String,
  pub project_name: Option<String>,
  pub client_name: Option<String>,
  pub customer_type: CustomerType,
  pub currency: String,
  pub status: String,
  pub product_count: i64,
  pub net_total: f64,
  pub vat_total: f64,
  pub gross_total: f64,
  pub net_profit: f64,
  pub created_at: String,
  pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QuoteProductDetail {
  pub name: String,
  pub pricing: PricingInput,
  pub calculations: PricingCalculations,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QuoteDetail {
  pub summary: QuoteSummary,
  pub products: Vec<QuoteProductDetail>,
  pub discount: Option<DiscountInfo>,
  pub shipping: Option<ShippingInfo>,
  pub finalized: FinalizedQuote,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteFilter {
  pub year: Option<i32>,
  pub status: Option<String>,
  pub search: Option<String>,
  pub page: i64,
  pub page_size: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
  pub total: i64,
  pub items: Vec<T>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardStats {
  pub quote_count: i64,
  pub draft_count: i64,
  pub finalized_count: i64,
  pub revenue_net: f64,
  pub vat_total: f64,
  pub net_profit: f64,
  pub avg_margin: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MonthSeriesPoint {
  pub month: i32,
  pub revenue_net: f64,
  pub net_profit: f64,
  pub quote_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClientSplit {
  pub client: String,
  pub revenue_net: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Dashboard {
  pub stats: DashboardStats,
  pub monthly: Vec<MonthSeriesPoint>,
  pub top_clients: Vec<ClientSplit>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
  pub currency: String,
  pub vat_rate: f64,
  pub vat_inclusive: bool,
  pub power_cost_per_kwh: f64,
  pub export_base_folder: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditLogEntry {
  pub id: i64,
  pub ts: String,
  pub actor: Option<String>,
  pub action: String,
  pub entity_type: String,
  pub entity_id: Option<String>,
  pub ref_id: Option<String>,
  pub payload_json: String,
  pub details: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackupRequest {
  pub include_exports: bool,
  pub output_path: Option<String>,
  pub actor: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RestoreRequest {
  pub archive_path: String,
  pub actor: Option<String>,
}
