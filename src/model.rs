use crate::error::Result;
use crate::layout::{ColumnKey, KpiFormat, KpiKey, KpiSlot};
use crate::text::{CurrencyStyle, finite_or_zero, normalize_to_one_line};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::io::Read;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(value) => write!(f, "{}", finite_or_zero(*value)),
            CellValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    #[serde(default, deserialize_with = "lenient_cell")]
    pub ventas: Option<CellValue>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub efectivo: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub transferencia: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub a_cobrar: f64,
}

impl KpiSummary {
    pub fn amount(&self, key: KpiKey) -> Option<f64> {
        match key {
            KpiKey::Ventas => match &self.ventas {
                Some(CellValue::Number(value)) => Some(finite_or_zero(*value)),
                _ => None,
            },
            KpiKey::Total => Some(self.total),
            KpiKey::Efectivo => Some(self.efectivo),
            KpiKey::Transferencia => Some(self.transferencia),
            KpiKey::ACobrar => Some(self.a_cobrar),
        }
    }

    pub fn display_value(&self, slot: &KpiSlot, currency: &CurrencyStyle) -> String {
        match slot.format {
            KpiFormat::Currency => currency.format(self.amount(slot.key).unwrap_or(0.0)),
            KpiFormat::Plain => match (slot.key, &self.ventas) {
                (KpiKey::Ventas, Some(value)) => value.to_string(),
                (KpiKey::Ventas, None) => "-".to_string(),
                _ => self
                    .amount(slot.key)
                    .map(|value| CellValue::Number(value).to_string())
                    .unwrap_or_else(|| "-".to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRowRecord")]
pub struct RowRecord {
    pub date: String,
    pub time: String,
    pub client: String,
    pub product: String,
    pub qty: Option<CellValue>,
    pub payment_method: String,
    pub total: f64,
    // <= 0 renders as an empty cell.
    pub debt: f64,
}

impl RowRecord {
    pub fn cell_text(&self, key: ColumnKey, currency: &CurrencyStyle) -> String {
        match key {
            ColumnKey::Date => normalize_to_one_line(Some(&self.date)),
            ColumnKey::Time => normalize_to_one_line(Some(&self.time)),
            ColumnKey::Client => normalize_to_one_line(Some(&self.client)),
            ColumnKey::Product => normalize_to_one_line(Some(&self.product)),
            ColumnKey::Qty => self
                .qty
                .as_ref()
                .map(|value| normalize_to_one_line(Some(&value.to_string())))
                .unwrap_or_default(),
            ColumnKey::Pay => normalize_to_one_line(Some(&self.payment_method)),
            ColumnKey::Total => currency.format(self.total),
            ColumnKey::Debt => {
                let debt = finite_or_zero(self.debt);
                if debt > 0.0 {
                    currency.format(debt)
                } else {
                    String::new()
                }
            }
        }
    }
}

// Wire shape accepted for rows. Besides the canonical names it takes the
// field names sale listings already carry (`dayISO`, `client_name`,
// `final_price`, ...) so callers can pass them through untouched.
#[derive(Debug, Default, Deserialize)]
struct RawRowRecord {
    date: Option<Value>,
    #[serde(rename = "dayISO")]
    day_iso: Option<Value>,
    fecha: Option<Value>,
    time: Option<Value>,
    client: Option<Value>,
    client_name: Option<Value>,
    product: Option<Value>,
    product_name: Option<Value>,
    qty: Option<Value>,
    payment_method: Option<Value>,
    #[serde(rename = "paymentMethod")]
    payment_method_camel: Option<Value>,
    total: Option<Value>,
    final_price: Option<Value>,
    debt: Option<Value>,
}

impl From<RawRowRecord> for RowRecord {
    fn from(raw: RawRowRecord) -> Self {
        let total = [raw.final_price, raw.total]
            .into_iter()
            .flatten()
            .find(|value| !value.is_null())
            .map(|value| coerce_f64(&value))
            .unwrap_or(0.0);
        Self {
            date: first_text([raw.date, raw.day_iso, raw.fecha]),
            time: first_text([raw.time]),
            client: first_text([raw.client, raw.client_name]),
            product: first_text([raw.product, raw.product_name]),
            qty: raw.qty.and_then(cell_from_value),
            payment_method: first_text([raw.payment_method, raw.payment_method_camel]),
            total,
            debt: raw.debt.as_ref().map(coerce_f64).unwrap_or(0.0),
        }
    }
}

fn first_text<const N: usize>(candidates: [Option<Value>; N]) -> String {
    candidates
        .into_iter()
        .flatten()
        .map(|value| value_text(&value))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

fn cell_from_value(value: Value) -> Option<CellValue> {
    match value {
        Value::Null => None,
        Value::Number(n) => Some(CellValue::Number(n.as_f64().unwrap_or(0.0))),
        Value::String(s) => Some(CellValue::Text(s)),
        other => Some(CellValue::Text(other.to_string())),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(false) => String::new(),
        other => other.to_string(),
    }
}

fn coerce_f64(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    finite_or_zero(parsed)
}

fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_f64(&value))
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_text(&value))
}

fn lenient_cell<'de, D>(deserializer: D) -> std::result::Result<Option<CellValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(cell_from_value(value))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub subtitle: String,
    #[serde(default)]
    pub kpis: Option<KpiSummary>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rows: Vec<RowRecord>,
}

impl ReportRequest {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            kpis: None,
            rows: Vec::new(),
        }
    }

    pub fn with_kpis(mut self, kpis: KpiSummary) -> Self {
        self.kpis = Some(kpis);
        self
    }

    pub fn with_rows(mut self, rows: Vec<RowRecord>) -> Self {
        self.rows = rows;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}
