use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A raw record as returned by `search_read`, in server key order
pub type Record = Map<String, Value>;

/// Server timestamp format
const ODOO_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const ODOO_DATE_FORMAT: &str = "%Y-%m-%d";

/// A many2one reference, encoded by the server as `[id, "label"]`.
///
/// Unset references arrive as `false` and deserialize to `None` when wrapped in
/// an `Option`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Many2One {
    pub id: i64,
    pub label: String,
}

impl Many2One {
    pub fn from_value(value: &Value) -> Option<Self> {
        let pair = value.as_array()?;
        let id = pair.first()?.as_i64()?;
        let label = pair
            .get(1)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(Self { id, label })
    }
}

impl Serialize for Many2One {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (self.id, &self.label).serialize(serializer)
    }
}

fn deserialize_many2one<'de, D>(deserializer: D) -> std::result::Result<Option<Many2One>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Many2One::from_value(&value))
}

/// Serialize unset references back as `false`, as the server does.
fn serialize_many2one<S>(value: &Option<Many2One>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(reference) => reference.serialize(serializer),
        None => serializer.serialize_bool(false),
    }
}

/// Parse a server timestamp, accepting bare dates as midnight.
pub fn parse_odoo_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, ODOO_DATETIME_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, ODOO_DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Server strings are `false` when empty.
fn text(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn id_list(value: Option<&Value>) -> Vec<i64> {
    value
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(
        default,
        deserialize_with = "deserialize_many2one",
        serialize_with = "serialize_many2one"
    )]
    pub user_id: Option<Many2One>,
    #[serde(
        default,
        deserialize_with = "deserialize_many2one",
        serialize_with = "serialize_many2one"
    )]
    pub company_id: Option<Many2One>,
    #[serde(default)]
    pub create_date: Value,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Project {
    pub fn created_at(&self) -> Option<NaiveDateTime> {
        self.create_date.as_str().and_then(parse_odoo_datetime)
    }

    /// Flatten back into a record for export
    pub fn to_record(&self) -> Record {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Record::new(),
        }
    }
}

/// A task record whose key set depends on which fields the server accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Task {
    record: Record,
}

impl Task {
    pub fn from_record(record: Record) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record.get(field)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.record.contains_key(field)
    }

    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(Value::as_i64)
    }

    pub fn name(&self) -> Option<&str> {
        text(self.get("name"))
    }

    pub fn stage(&self) -> Option<Many2One> {
        self.get("stage_id").and_then(Many2One::from_value)
    }

    pub fn creator(&self) -> Option<Many2One> {
        self.get("create_uid").and_then(Many2One::from_value)
    }

    pub fn project(&self) -> Option<Many2One> {
        self.get("project_id").and_then(Many2One::from_value)
    }

    pub fn priority(&self) -> Option<&str> {
        text(self.get("priority"))
    }

    pub fn child_ids(&self) -> Vec<i64> {
        id_list(self.get("child_ids"))
    }

    pub fn tag_ids(&self) -> Vec<i64> {
        id_list(self.get("tag_ids"))
    }

    pub fn user_ids(&self) -> Vec<i64> {
        id_list(self.get("user_ids"))
    }

    pub fn deadline(&self) -> Option<NaiveDateTime> {
        text(self.get("date_deadline")).and_then(parse_odoo_datetime)
    }

    pub fn created_at(&self) -> Option<NaiveDateTime> {
        text(self.get("create_date")).and_then(parse_odoo_datetime)
    }
}
