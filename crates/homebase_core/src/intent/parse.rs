//! Intent parsing from upstream JSON.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

static FENCE_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^```(?:json)?").expect("valid fence open regex"));
static FENCE_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```$").expect("valid fence close regex"));

const MAX_ECHOED_VALUE_CHARS: usize = 60;

/// Intent parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentError {
    /// Text contains no `{...}` object at all.
    NoJsonObject,
    /// Candidate object is not valid JSON.
    Json(String),
    /// Top-level value is not an object.
    NotAnObject,
    /// Required field is absent or blank.
    MissingField(&'static str),
    /// Field is present with an unusable value.
    InvalidField { field: &'static str, value: String },
}

impl Display for IntentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoJsonObject => write!(f, "no JSON object found in intent text"),
            Self::Json(message) => write!(f, "intent is not valid JSON: {message}"),
            Self::NotAnObject => write!(f, "intent must be a JSON object"),
            Self::MissingField(field) => write!(f, "missing `{field}` field"),
            Self::InvalidField { field, value } => {
                write!(f, "invalid `{field}` value: {value}")
            }
        }
    }
}

impl Error for IntentError {}

/// The `item` field: one name or an ordered list of names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSpec {
    Single(String),
    Many(Vec<String>),
}

impl ItemSpec {
    /// Non-blank, trimmed names in input order.
    pub fn names(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::Single(name) => vec![name.as_str()],
            Self::Many(names) => names.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }
}

/// Typed intent, one per inbound command.
///
/// `action` stays as wire text so the dispatcher owns the allowed-action
/// check; `date` stays as text so the dispatcher owns date validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Intent {
    pub action: String,
    pub item: Option<ItemSpec>,
    pub location: Option<String>,
    /// Free text before room normalization.
    pub room: Option<String>,
    /// Positive when present.
    pub quantity: Option<u32>,
    /// `DD-MM-YYYY` when present.
    pub date: Option<String>,
    /// Names of fields that were present but not understood.
    pub ignored_fields: Vec<String>,
}

impl Intent {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn item(mut self, name: impl Into<String>) -> Self {
        self.item = Some(ItemSpec::Single(name.into()));
        self
    }

    pub fn items<I, T>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.item = Some(ItemSpec::Many(names.into_iter().map(Into::into).collect()));
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Item names in input order; empty when `item` is absent or blank.
    pub fn item_names(&self) -> Vec<String> {
        self.item.as_ref().map(ItemSpec::names).unwrap_or_default()
    }

    /// Parses raw upstream text, tolerating markdown fences and prose around
    /// the JSON object.
    pub fn from_json_str(raw: &str) -> Result<Intent, IntentError> {
        let candidate = extract_intent_json(raw)?;
        let value: Value =
            serde_json::from_str(&candidate).map_err(|err| IntentError::Json(err.to_string()))?;
        Self::from_value(value)
    }

    /// Parses an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Intent, IntentError> {
        let Value::Object(fields) = value else {
            return Err(IntentError::NotAnObject);
        };
        parse_fields(fields)
    }
}

fn parse_fields(fields: Map<String, Value>) -> Result<Intent, IntentError> {
    let mut intent = Intent::default();
    for (key, value) in fields {
        match key.as_str() {
            "action" => intent.action = optional_text("action", value)?.unwrap_or_default(),
            "item" => intent.item = parse_item(value)?,
            "location" => intent.location = optional_text("location", value)?,
            "room" => intent.room = optional_text("room", value)?,
            "quantity" => intent.quantity = parse_quantity(value)?,
            "date" => intent.date = optional_text("date", value)?,
            _ => intent.ignored_fields.push(key),
        }
    }

    if intent.action.is_empty() {
        return Err(IntentError::MissingField("action"));
    }
    Ok(intent)
}

fn optional_text(field: &'static str, value: Value) -> Result<Option<String>, IntentError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => {
            let trimmed = text.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        other => Err(invalid(field, &other)),
    }
}

fn parse_item(value: Value) -> Result<Option<ItemSpec>, IntentError> {
    match value {
        Value::Null => Ok(None),
        Value::String(name) => Ok(Some(ItemSpec::Single(name))),
        Value::Array(values) => {
            let mut names = Vec::with_capacity(values.len());
            for value in values {
                match value {
                    Value::String(name) => names.push(name),
                    other => return Err(invalid("item", &other)),
                }
            }
            Ok(Some(ItemSpec::Many(names)))
        }
        other => Err(invalid("item", &other)),
    }
}

fn parse_quantity(value: Value) -> Result<Option<u32>, IntentError> {
    let parsed = match &value {
        Value::Null => return Ok(None),
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.fract() == 0.0 && *float >= 0.0)
                .map(|float| float as u64)
        }),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    };

    match parsed.and_then(|raw| u32::try_from(raw).ok()) {
        Some(quantity) if quantity >= 1 => Ok(Some(quantity)),
        _ => Err(invalid("quantity", &value)),
    }
}

fn invalid(field: &'static str, value: &Value) -> IntentError {
    let rendered = value.to_string();
    let mut echoed = rendered
        .chars()
        .take(MAX_ECHOED_VALUE_CHARS)
        .collect::<String>();
    if rendered.chars().count() > MAX_ECHOED_VALUE_CHARS {
        echoed.push_str("...");
    }
    IntentError::InvalidField {
        field,
        value: echoed,
    }
}

/// Extracts the outermost JSON object from model output.
///
/// Leading/trailing markdown code fences are stripped first, then everything
/// outside the first `{` and the last `}` is discarded.
pub fn extract_intent_json(text: &str) -> Result<String, IntentError> {
    let trimmed = text.trim();
    let without_open = FENCE_OPEN_RE.replace(trimmed, "");
    let unfenced = FENCE_CLOSE_RE.replace(without_open.trim(), "");
    let unfenced: &str = unfenced.as_ref();

    let start = unfenced.find('{').ok_or(IntentError::NoJsonObject)?;
    let end = unfenced.rfind('}').ok_or(IntentError::NoJsonObject)?;
    if end < start {
        return Err(IntentError::NoJsonObject);
    }
    Ok(unfenced[start..=end].to_string())
}

#[cfg(test)]
mod tests {
    use super::{extract_intent_json, Intent, IntentError, ItemSpec};
    use serde_json::json;

    #[test]
    fn parses_scalar_and_list_items() {
        let single = Intent::from_value(json!({"action": "add_inventory", "item": " milk "}))
            .expect("scalar intent");
        assert_eq!(single.item, Some(ItemSpec::Single(" milk ".to_string())));
        assert_eq!(single.item_names(), vec!["milk".to_string()]);

        let many = Intent::from_value(json!({"action": "add_inventory", "item": ["milk", "", "eggs"]}))
            .expect("list intent");
        assert_eq!(many.item_names(), vec!["milk".to_string(), "eggs".to_string()]);
    }

    #[test]
    fn quantity_accepts_numbers_and_numeric_strings() {
        let from_number = Intent::from_value(json!({"action": "a", "quantity": 3})).unwrap();
        assert_eq!(from_number.quantity, Some(3));
        let from_string = Intent::from_value(json!({"action": "a", "quantity": " 4 "})).unwrap();
        assert_eq!(from_string.quantity, Some(4));
        let from_float = Intent::from_value(json!({"action": "a", "quantity": 2.0})).unwrap();
        assert_eq!(from_float.quantity, Some(2));
    }

    #[test]
    fn quantity_rejects_zero_negative_and_text() {
        for bad in [json!(0), json!(-2), json!("lots"), json!(1.5), json!(true)] {
            let err = Intent::from_value(json!({"action": "a", "quantity": bad}))
                .expect_err("bad quantity must fail");
            assert!(matches!(err, IntentError::InvalidField { field: "quantity", .. }));
        }
    }

    #[test]
    fn unknown_fields_are_recorded_not_rejected() {
        let intent = Intent::from_value(json!({
            "action": "update_inventory",
            "item": "drill",
            "location_from": "garage",
            "location_to": "shed"
        }))
        .expect("unknown fields tolerated");
        assert_eq!(intent.ignored_fields.len(), 2);
        assert!(intent.ignored_fields.contains(&"location_from".to_string()));
    }

    #[test]
    fn missing_action_and_non_objects_fail() {
        assert_eq!(
            Intent::from_value(json!({"item": "milk"})),
            Err(IntentError::MissingField("action"))
        );
        assert_eq!(
            Intent::from_value(json!(["add_inventory"])),
            Err(IntentError::NotAnObject)
        );
    }

    #[test]
    fn extracts_object_from_fenced_model_output() {
        let raw = "```json\n{\"action\": \"add_todo\", \"item\": \"call mum\"}\n```";
        assert_eq!(
            extract_intent_json(raw).unwrap(),
            "{\"action\": \"add_todo\", \"item\": \"call mum\"}"
        );

        let chatty = "Sure! Here you go: {\"action\": \"query_todo\"} Hope that helps.";
        let intent = Intent::from_json_str(chatty).expect("object inside prose");
        assert_eq!(intent.action, "query_todo");

        assert_eq!(
            extract_intent_json("no braces here"),
            Err(IntentError::NoJsonObject)
        );
    }
}
