use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A product as stored in the Directus `products` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProduct {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient_images")]
    pub images: Vec<String>,
}

/// A Directus row that could not be read as a [`SourceProduct`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub id: Option<String>,
    pub name: Option<String>,
    pub error: String,
}

/// Everything a source listing returned, readable or not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceListing {
    pub products: Vec<SourceProduct>,
    pub rejected: Vec<RejectedRow>,
}

impl SourceListing {
    /// Decodes each row on its own so one bad row cannot sink the rest.
    pub fn from_rows(rows: Vec<serde_json::Value>) -> Self {
        let mut listing = Self::default();
        for row in rows {
            let id = row.get("id").and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            });
            let name = row.get("name").and_then(|v| v.as_str()).map(str::to_string);

            match serde_json::from_value::<SourceProduct>(row) {
                Ok(product) => listing.products.push(product),
                Err(e) => listing.rejected.push(RejectedRow {
                    id,
                    name,
                    error: e.to_string(),
                }),
            }
        }
        listing
    }

    pub fn len(&self) -> usize {
        self.products.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every name the source holds, including names on rejected rows.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.products
            .iter()
            .map(|p| p.name.as_str())
            .chain(self.rejected.iter().filter_map(|r| r.name.as_deref()))
    }
}

impl From<Vec<SourceProduct>> for SourceListing {
    fn from(products: Vec<SourceProduct>) -> Self {
        Self {
            products,
            rejected: Vec::new(),
        }
    }
}

/// The part of a Medusa product the sync cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProduct {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePayload {
    pub amount: i64,
    pub currency_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantPayload {
    pub prices: Vec<PricePayload>,
}

/// Body of a Medusa create or update call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPayload {
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<VariantPayload>>,
}

#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncAction {
    Create { title: String },
    Update { id: String, title: String },
    Delete { id: String, title: String },
    /// The lookup that decides between create and update failed.
    Match { title: String },
    /// The source row could not be decoded.
    Read { title: String },
}

impl SyncAction {
    pub fn kind(&self) -> &'static str {
        match self {
            SyncAction::Create { .. } => "create",
            SyncAction::Update { .. } => "update",
            SyncAction::Delete { .. } => "delete",
            SyncAction::Match { .. } => "match",
            SyncAction::Read { .. } => "read",
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SyncAction::Create { title }
            | SyncAction::Update { title, .. }
            | SyncAction::Delete { title, .. }
            | SyncAction::Match { title }
            | SyncAction::Read { title } => title,
        }
    }

    pub fn target_id(&self) -> Option<&str> {
        match self {
            SyncAction::Update { id, .. } | SyncAction::Delete { id, .. } => Some(id),
            SyncAction::Create { .. } | SyncAction::Match { .. } | SyncAction::Read { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionOutcome {
    Applied { id: String },
    Planned,
    Failed { error: String },
}

impl ActionOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            ActionOutcome::Applied { .. } => "applied",
            ActionOutcome::Planned => "planned",
            ActionOutcome::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub action: SyncAction,
    pub outcome: ActionOutcome,
    pub images_uploaded: usize,
    pub images_failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub source_products: usize,
    pub actions: Vec<ActionRecord>,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            dry_run,
            source_products: 0,
            actions: Vec::new(),
        }
    }

    pub fn record(&mut self, record: ActionRecord) {
        self.actions.push(record);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn count(&self, kind: &str) -> usize {
        self.actions
            .iter()
            .filter(|r| r.action.kind() == kind && !matches!(r.outcome, ActionOutcome::Failed { .. }))
            .count()
    }

    pub fn failures(&self) -> usize {
        self.actions
            .iter()
            .filter(|r| matches!(r.outcome, ActionOutcome::Failed { .. }))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failures() > 0
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Directus returns decimal fields as strings.
fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(0.0),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64().unwrap_or_default()),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid price '{}': {}", s, e))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid price: {}",
            other
        ))),
    }
}

/// Accepts plain URLs / file ids, or junction rows from a files relation.
fn lenient_images<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    let images = value
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            serde_json::Value::Object(obj) => obj
                .get("directus_files_id")
                .or_else(|| obj.get("id"))
                .and_then(|v| v.as_str())
                .map(str::to_string),
            _ => None,
        })
        .collect();
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_product_accepts_directus_shapes() {
        let product: SourceProduct = serde_json::from_value(serde_json::json!({
            "id": 12,
            "name": "Linen Shirt",
            "description": null,
            "price": "39.90",
            "images": [
                "https://cdn.example.com/shirt.jpg",
                {"directus_files_id": "4f1c"},
                null
            ]
        }))
        .unwrap();

        assert_eq!(product.id.as_deref(), Some("12"));
        assert_eq!(product.description, "");
        assert!((product.price - 39.9).abs() < f64::EPSILON);
        assert_eq!(
            product.images,
            vec!["https://cdn.example.com/shirt.jpg".to_string(), "4f1c".to_string()]
        );
    }

    #[test]
    fn test_source_product_missing_fields_default() {
        let product: SourceProduct =
            serde_json::from_value(serde_json::json!({"name": "Mug"})).unwrap();
        assert_eq!(product.price, 0.0);
        assert!(product.images.is_empty());
    }

    #[test]
    fn test_invalid_price_is_rejected() {
        let result: std::result::Result<SourceProduct, _> =
            serde_json::from_value(serde_json::json!({"name": "Mug", "price": "cheap"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_null_name_reads_as_blank() {
        let product: SourceProduct =
            serde_json::from_value(serde_json::json!({"id": 3, "name": null, "price": 4})).unwrap();
        assert_eq!(product.name, "");
    }

    #[test]
    fn test_listing_keeps_good_rows_next_to_bad_ones() {
        let listing = SourceListing::from_rows(vec![
            serde_json::json!({"id": 1, "name": "Mug", "price": "9.50"}),
            serde_json::json!({"id": 2, "name": "Shirt", "price": ""}),
            serde_json::json!({"id": "7", "price": {"amount": 1}}),
        ]);

        assert_eq!(listing.len(), 3);
        assert_eq!(listing.products.len(), 1);
        assert_eq!(listing.products[0].name, "Mug");
        assert_eq!(listing.rejected.len(), 2);
        assert_eq!(listing.rejected[0].id.as_deref(), Some("2"));
        assert_eq!(listing.rejected[0].name.as_deref(), Some("Shirt"));
        assert!(listing.rejected[0].error.contains("invalid price"));
        assert_eq!(listing.rejected[1].name, None);
        assert_eq!(listing.names().collect::<Vec<_>>(), vec!["Mug", "Shirt"]);
    }

    #[test]
    fn test_update_payload_omits_variants() {
        let payload = ProductPayload {
            title: "Mug".to_string(),
            description: String::new(),
            images: vec![],
            variants: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("variants").is_none());
    }

    #[test]
    fn test_report_counts_ignore_failures() {
        let mut report = SyncReport::new(false);
        report.record(ActionRecord {
            action: SyncAction::Create { title: "A".to_string() },
            outcome: ActionOutcome::Applied { id: "prod_1".to_string() },
            images_uploaded: 0,
            images_failed: 0,
        });
        report.record(ActionRecord {
            action: SyncAction::Create { title: "B".to_string() },
            outcome: ActionOutcome::Failed { error: "boom".to_string() },
            images_uploaded: 0,
            images_failed: 0,
        });

        assert_eq!(report.count("create"), 1);
        assert_eq!(report.failures(), 1);
        assert!(report.has_failures());
    }
}
