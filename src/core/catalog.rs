use crate::domain::model::Destination;
use crate::domain::ports::DestinationRepository;
use crate::utils::error::{CargoError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

/// API 或 CSV 讀入的原始目的地資料列，欄位皆可缺漏，單筆壞資料不影響整份清單
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DestinationRow {
    #[serde(default, deserialize_with = "id_as_string")]
    pub id: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub airport_code: Option<String>,
    #[serde(default)]
    pub rate_per_lb_1_50: Option<f64>,
    #[serde(default)]
    pub rate_per_lb_51_100: Option<f64>,
    #[serde(default)]
    pub rate_per_lb_101_200: Option<f64>,
    #[serde(default)]
    pub rate_per_lb_201_plus: Option<f64>,
    #[serde(default)]
    pub express_surcharge_percent: Option<f64>,
    #[serde(default)]
    pub transit_days_min: Option<i64>,
    #[serde(default)]
    pub transit_days_max: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
}

fn id_as_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
    }))
}

fn required_text(field: &str, value: Option<String>) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CargoError::validation(format!("destination row missing {}", field))),
    }
}

fn required_rate(field: &str, value: Option<f64>) -> Result<f64> {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(CargoError::validation(format!(
            "destination row has invalid {}: {}",
            field, v
        ))),
        None => Err(CargoError::validation(format!("destination row missing {}", field))),
    }
}

fn transit_day(field: &str, value: Option<i64>) -> Result<u32> {
    match value {
        Some(v) if v >= 1 => u32::try_from(v)
            .map_err(|_| CargoError::validation(format!("destination row has invalid {}", field))),
        Some(v) => Err(CargoError::validation(format!(
            "destination row has invalid {}: {}",
            field, v
        ))),
        None => Err(CargoError::validation(format!("destination row missing {}", field))),
    }
}

impl TryFrom<DestinationRow> for Destination {
    type Error = CargoError;

    fn try_from(row: DestinationRow) -> Result<Self> {
        let transit_days_min = transit_day("transit_days_min", row.transit_days_min)?;
        let transit_days_max = transit_day("transit_days_max", row.transit_days_max)?;
        if transit_days_max < transit_days_min {
            return Err(CargoError::validation(
                "destination row has transit_days_max below transit_days_min",
            ));
        }

        Ok(Destination {
            id: required_text("id", row.id)?,
            country_name: required_text("country_name", row.country_name)?,
            city_name: required_text("city_name", row.city_name)?,
            airport_code: required_text("airport_code", row.airport_code)?.to_ascii_uppercase(),
            rate_per_lb_1_50: required_rate("rate_per_lb_1_50", row.rate_per_lb_1_50)?,
            rate_per_lb_51_100: required_rate("rate_per_lb_51_100", row.rate_per_lb_51_100)?,
            rate_per_lb_101_200: required_rate("rate_per_lb_101_200", row.rate_per_lb_101_200)?,
            rate_per_lb_201_plus: required_rate("rate_per_lb_201_plus", row.rate_per_lb_201_plus)?,
            // 未設定附加費時視為 0
            express_surcharge_percent: required_rate(
                "express_surcharge_percent",
                Some(row.express_surcharge_percent.unwrap_or(0.0)),
            )?,
            transit_days_min,
            transit_days_max,
            is_active: row.is_active.unwrap_or(true),
        })
    }
}

/// 轉換原始資料列，驗證失敗者記錄後略過
pub fn accept_rows(rows: impl IntoIterator<Item = DestinationRow>) -> Vec<Destination> {
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let id = row.id.clone().unwrap_or_else(|| "<none>".to_string());
            match Destination::try_from(row) {
                Ok(destination) => Some(destination),
                Err(e) => {
                    tracing::warn!("⚠️ Skipping destination row {} (id {}): {}", index, id, e);
                    None
                }
            }
        })
        .collect()
}

pub fn sort_for_listing(destinations: &mut [Destination]) {
    destinations.sort_by(|a, b| {
        a.country_name
            .cmp(&b.country_name)
            .then_with(|| a.city_name.cmp(&b.city_name))
    });
}

/// 記憶體中的目的地表，載入後唯讀
#[derive(Debug, Clone, Default)]
pub struct DestinationCatalog {
    destinations: Vec<Destination>,
}

impl DestinationCatalog {
    pub fn new(mut destinations: Vec<Destination>) -> Self {
        sort_for_listing(&mut destinations);
        Self { destinations }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut rows = Vec::new();
        for row in csv_reader.deserialize::<DestinationRow>() {
            match row {
                Ok(row) => rows.push(row),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => tracing::warn!("⚠️ Skipping unreadable CSV row: {}", e),
            }
        }
        let destinations = accept_rows(rows);
        tracing::info!("📦 Loaded {} destinations from CSV", destinations.len());
        Ok(Self::new(destinations))
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_csv_reader(file)
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    pub fn active(&self) -> impl Iterator<Item = &Destination> {
        self.destinations.iter().filter(|d| d.is_active)
    }

    pub fn get(&self, id: &str) -> Option<&Destination> {
        self.destinations.iter().find(|d| d.id == id)
    }
}

#[async_trait]
impl DestinationRepository for DestinationCatalog {
    async fn list_active_destinations(&self) -> Result<Vec<Destination>> {
        Ok(self.active().cloned().collect())
    }

    async fn find_active_destination(&self, id: &str) -> Result<Option<Destination>> {
        Ok(self.get(id).filter(|d| d.is_active).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
id,country_name,city_name,airport_code,rate_per_lb_1_50,rate_per_lb_51_100,rate_per_lb_101_200,rate_per_lb_201_plus,express_surcharge_percent,transit_days_min,transit_days_max,is_active
3,Trinidad and Tobago,Port of Spain,pos,5.25,4.75,4.25,3.75,30,4,6,true
1,Jamaica,Kingston,KIN,4.50,4.00,3.50,3.00,25,3,5,true
2,Barbados,Bridgetown,BGI,5.00,4.50,4.00,3.50,25,3,5,false
4,Guyana,Georgetown,GEO,,4.50,4.00,3.50,25,5,7,true
";

    #[test]
    fn test_csv_catalog_orders_and_filters() {
        let catalog = DestinationCatalog::from_csv_reader(CSV.as_bytes()).unwrap();
        // Guyana 缺少 1-50 費率，應被略過
        assert_eq!(catalog.len(), 3);

        let active: Vec<_> = tokio_test::block_on(catalog.list_active_destinations()).unwrap();
        let countries: Vec<_> = active.iter().map(|d| d.country_name.as_str()).collect();
        assert_eq!(countries, vec!["Jamaica", "Trinidad and Tobago"]);
        assert_eq!(active[1].airport_code, "POS");
    }

    #[test]
    fn test_inactive_destination_not_found() {
        let catalog = DestinationCatalog::from_csv_reader(CSV.as_bytes()).unwrap();
        let found = tokio_test::block_on(catalog.find_active_destination("2")).unwrap();
        assert!(found.is_none());
        let found = tokio_test::block_on(catalog.find_active_destination("1")).unwrap();
        assert_eq!(found.unwrap().city_name, "Kingston");
    }

    #[test]
    fn test_row_rejects_inverted_transit_window() {
        let row: DestinationRow = serde_json::from_value(serde_json::json!({
            "id": 9,
            "country_name": "Haiti",
            "city_name": "Port-au-Prince",
            "airport_code": "PAP",
            "rate_per_lb_1_50": 5.0,
            "rate_per_lb_51_100": 4.5,
            "rate_per_lb_101_200": 4.0,
            "rate_per_lb_201_plus": 3.5,
            "transit_days_min": 6,
            "transit_days_max": 4
        }))
        .unwrap();
        assert_eq!(row.id.as_deref(), Some("9"));
        assert!(Destination::try_from(row).is_err());
    }
}
