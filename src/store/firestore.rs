//! Firestore REST backend.
//!
//! Talks to the Firestore v1 documents API with its typed-value field
//! encoding. The SDK's push-based listen channel is gRPC-only, so
//! `subscribe` emulates the push feed: a long-lived poll loop fetches the
//! full collection and forwards a snapshot event whenever the contents
//! changed. Consumers of the trait cannot tell the difference.

use std::time::Duration;

use serde_json::{json, Map, Value};
use tokio::sync::mpsc;
use url::Url;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::types::{CustomerRecord, CustomerUpdate, Period, ProductType};

use super::{feed_channel, DocumentStore, FeedEvent};

/// Fields written by an update; doubles as the PATCH updateMask so the
/// immutable `createdAt` and `seq` are never clobbered.
const UPDATE_FIELDS: [&str; 7] = [
    "name",
    "maskedName",
    "salesperson",
    "orderMonth",
    "productType",
    "amount",
    "updatedAt",
];

/// Well above the assumed tens-to-low-hundreds of records. No pagination.
const PAGE_SIZE: &str = "300";

#[derive(Clone)]
pub struct FirestoreStore {
    http: reqwest::Client,
    /// `.../databases/(default)/documents/`, trailing slash included.
    documents_base: Url,
    collection: String,
    api_key: Option<String>,
    poll_interval: Duration,
}

impl FirestoreStore {
    pub fn new(config: &StoreConfig) -> Result<Self, String> {
        let project_id = config
            .project_id
            .as_deref()
            .ok_or("store.projectId is not configured")?;
        let documents_base = Url::parse(&format!(
            "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents/",
            project_id
        ))
        .map_err(|e| format!("Invalid Firestore endpoint: {}", e))?;

        Ok(Self {
            http: reqwest::Client::new(),
            documents_base,
            collection: config.collection.clone(),
            api_key: config.api_key.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
        })
    }

    fn collection_url(&self) -> Url {
        let mut url = self.documents_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&self.collection);
        }
        self.apply_key(&mut url);
        url
    }

    fn doc_url(&self, id: &str) -> Url {
        let mut url = self.documents_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&self.collection).push(id);
        }
        self.apply_key(&mut url);
        url
    }

    fn apply_key(&self, url: &mut Url) {
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
    }
}

/// Map a non-success HTTP response to the error taxonomy.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(match status.as_u16() {
        401 | 403 => StoreError::PermissionDenied(format!("{}: {}", status, body)),
        _ => StoreError::Other(format!("{}: {}", status, body)),
    })
}

#[async_trait::async_trait]
impl DocumentStore for FirestoreStore {
    async fn create(&self, record: &CustomerRecord) -> Result<String, StoreError> {
        let resp = self
            .http
            .post(self.collection_url())
            .json(&record_to_fields(record))
            .send()
            .await?;
        let body: Value = check(resp).await?.json().await?;
        let id = body
            .get("name")
            .and_then(Value::as_str)
            .and_then(|name| name.rsplit('/').next())
            .ok_or_else(|| StoreError::Other("create response missing document name".into()))?;
        Ok(id.to_string())
    }

    async fn update(&self, id: &str, update: &CustomerUpdate) -> Result<(), StoreError> {
        let mut url = self.doc_url(id);
        for field in UPDATE_FIELDS {
            url.query_pairs_mut()
                .append_pair("updateMask.fieldPaths", field);
        }
        let resp = self
            .http
            .patch(url)
            .json(&update_to_fields(update))
            .send()
            .await?;
        check(resp).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let resp = self.http.delete(self.doc_url(id)).send().await?;
        check(resp).await?;
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<CustomerRecord>, StoreError> {
        let mut url = self.collection_url();
        url.query_pairs_mut()
            .append_pair("pageSize", PAGE_SIZE)
            .append_pair("orderBy", "createdAt");
        let resp = self.http.get(url).send().await?;
        let body: Value = check(resp).await?.json().await?;
        Ok(parse_documents(&body))
    }

    fn subscribe(&self) -> mpsc::Receiver<FeedEvent> {
        let (tx, rx) = feed_channel();
        let store = self.clone();
        tokio::spawn(async move {
            let mut last: Option<Vec<CustomerRecord>> = None;
            let mut lapsed = false;
            loop {
                let event = match store.fetch_all().await {
                    Ok(records) => {
                        lapsed = false;
                        if last.as_ref() == Some(&records) {
                            None
                        } else {
                            last = Some(records.clone());
                            Some(FeedEvent::Snapshot(records))
                        }
                    }
                    Err(e) => {
                        log::warn!("firestore feed: poll failed: {}", e);
                        // Report the lapse once per outage, not once per cycle
                        if lapsed {
                            None
                        } else {
                            lapsed = true;
                            Some(FeedEvent::Lapsed(e.to_string()))
                        }
                    }
                };
                if let Some(event) = event {
                    if tx.send(event).await.is_err() {
                        log::debug!("firestore feed: subscriber gone, stopping poll loop");
                        break;
                    }
                }
                tokio::time::sleep(store.poll_interval).await;
            }
        });
        rx
    }
}

// ---------------------------------------------------------------------------
// Typed-value field encoding
// ---------------------------------------------------------------------------

fn string_value(value: &str) -> Value {
    json!({ "stringValue": value })
}

fn integer_value(value: i64) -> Value {
    // Firestore carries 64-bit integers as JSON strings
    json!({ "integerValue": value.to_string() })
}

fn record_to_fields(record: &CustomerRecord) -> Value {
    let mut fields = Map::new();
    fields.insert("name".into(), string_value(&record.name));
    fields.insert("maskedName".into(), string_value(&record.masked_name));
    fields.insert("salesperson".into(), string_value(&record.salesperson));
    fields.insert("orderMonth".into(), string_value(record.order_month.key()));
    fields.insert(
        "productType".into(),
        string_value(record.product_type.as_str()),
    );
    fields.insert("amount".into(), integer_value(record.amount));
    if let Some(seq) = record.seq {
        fields.insert("seq".into(), integer_value(seq as i64));
    }
    fields.insert("createdAt".into(), string_value(&record.created_at));
    if let Some(updated_at) = &record.updated_at {
        fields.insert("updatedAt".into(), string_value(updated_at));
    }
    json!({ "fields": fields })
}

fn update_to_fields(update: &CustomerUpdate) -> Value {
    let mut fields = Map::new();
    fields.insert("name".into(), string_value(&update.name));
    fields.insert("maskedName".into(), string_value(&update.masked_name));
    fields.insert("salesperson".into(), string_value(&update.salesperson));
    fields.insert("orderMonth".into(), string_value(update.order_month.key()));
    fields.insert(
        "productType".into(),
        string_value(update.product_type.as_str()),
    );
    fields.insert("amount".into(), integer_value(update.amount));
    fields.insert("updatedAt".into(), string_value(&update.updated_at));
    json!({ "fields": fields })
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Result<String, String> {
    fields
        .get(key)
        .and_then(|v| v.get("stringValue"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| format!("missing string field: {}", key))
}

fn opt_string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(|v| v.get("stringValue"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn int_field(fields: &Map<String, Value>, key: &str) -> Result<i64, String> {
    let value = fields
        .get(key)
        .ok_or_else(|| format!("missing integer field: {}", key))?;
    if let Some(raw) = value.get("integerValue").and_then(Value::as_str) {
        return raw
            .parse::<i64>()
            .map_err(|e| format!("bad integer field {}: {}", key, e));
    }
    // Documents written by loosely-typed clients may carry doubles
    value
        .get("doubleValue")
        .and_then(Value::as_f64)
        .map(|f| f as i64)
        .ok_or_else(|| format!("missing integer field: {}", key))
}

fn opt_int_field(fields: &Map<String, Value>, key: &str) -> Option<i64> {
    int_field(fields, key).ok()
}

/// Decode one REST document into a record.
fn doc_to_record(doc: &Value) -> Result<CustomerRecord, String> {
    let resource_name = doc
        .get("name")
        .and_then(Value::as_str)
        .ok_or("document missing resource name")?;
    let id = resource_name
        .rsplit('/')
        .next()
        .unwrap_or(resource_name)
        .to_string();
    let fields = doc
        .get("fields")
        .and_then(Value::as_object)
        .ok_or("document has no fields")?;

    let order_key = string_field(fields, "orderMonth")?;
    let order_month =
        Period::from_key(&order_key).ok_or_else(|| format!("unknown orderMonth: {}", order_key))?;

    Ok(CustomerRecord {
        id,
        name: string_field(fields, "name")?,
        masked_name: string_field(fields, "maskedName")?,
        salesperson: string_field(fields, "salesperson")?,
        order_month,
        product_type: ProductType::from_str(&string_field(fields, "productType")?),
        amount: int_field(fields, "amount")?,
        seq: opt_int_field(fields, "seq").and_then(|n| u64::try_from(n).ok()),
        created_at: string_field(fields, "createdAt")?,
        updated_at: opt_string_field(fields, "updatedAt"),
    })
}

/// Decode a list response. A document that fails to decode is skipped with
/// a warning; one malformed remote document must not blank the snapshot.
fn parse_documents(body: &Value) -> Vec<CustomerRecord> {
    let docs = match body.get("documents").and_then(Value::as_array) {
        Some(docs) => docs,
        None => return Vec::new(), // empty collection
    };
    docs.iter()
        .filter_map(|doc| match doc_to_record(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("firestore: skipping malformed document: {}", e);
                None
            }
        })
        .collect()
}
