use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use dialdex_core::domain::Partner;

use crate::source::PartnerSource;
use crate::xmlrpc::{self, Value};
use crate::{Result, RpcError};

const OBJECT_PATH: &str = "/xmlrpc/2/object";
const PARTNER_MODEL: &str = "res.partner";
const PARTNER_FIELDS: [&str; 3] = ["name", "phone", "phone_sanitized"];

/// Client for the remote object endpoint. One outbound call per run, no
/// retries.
#[derive(Debug, Clone)]
pub struct OdooClient {
    object_url: Url,
    database: String,
    user_id: i64,
    password: String,
    result_limit: i64,
    http: Client,
}

impl OdooClient {
    pub fn new(
        url: &str,
        database: String,
        user_id: i64,
        password: String,
        result_limit: i64,
    ) -> Result<Self> {
        let object_url = Url::parse(url)?.join(OBJECT_PATH)?;
        let http = Client::builder()
            .user_agent("dialdex")
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            object_url,
            database,
            user_id,
            password,
            result_limit,
            http,
        })
    }

    /// Invokes `method` on `model` with positional `args` and keyword
    /// `kwargs`, authenticated as the configured user.
    pub fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> Result<Value> {
        let params = [
            Value::string(self.database.as_str()),
            Value::Int(self.user_id),
            Value::string(self.password.as_str()),
            Value::string(model),
            Value::string(method),
            Value::Array(args),
            Value::Struct(kwargs),
        ];
        let body = xmlrpc::method_call("execute_kw", &params);

        let response = self
            .http
            .post(self.object_url.clone())
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body)
            .send()?
            .error_for_status()?;
        let text = response.text()?;
        xmlrpc::parse_method_response(&text)
    }
}

impl PartnerSource for OdooClient {
    fn source_name(&self) -> &'static str {
        "odoo"
    }

    fn fetch_partners(&self) -> Result<Vec<Partner>> {
        let domain = Value::Array(vec![Value::Array(vec![
            Value::string("active"),
            Value::string("="),
            Value::Bool(true),
        ])]);
        let fields = Value::Array(
            PARTNER_FIELDS
                .iter()
                .map(|field| Value::string(*field))
                .collect(),
        );
        let kwargs = vec![
            ("fields".to_string(), fields),
            ("limit".to_string(), Value::Int(self.result_limit)),
        ];

        let response = self.execute_kw(PARTNER_MODEL, "search_read", vec![domain], kwargs)?;
        let records = response
            .as_array()
            .ok_or_else(|| RpcError::Parse("search_read response is not an array".to_string()))?;
        Ok(records.iter().map(partner_from_record).collect())
    }
}

/// The remote encodes unset text fields as boolean `false`; anything that
/// is not a string counts as absent.
fn partner_from_record(record: &Value) -> Partner {
    Partner {
        name: record
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        phone: field_text(record, "phone"),
        phone_sanitized: field_text(record, "phone_sanitized"),
    }
}

fn field_text(record: &Value, field: &str) -> Option<String> {
    record.get(field).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::partner_from_record;
    use crate::xmlrpc::Value;

    fn record(members: Vec<(&str, Value)>) -> Value {
        Value::Struct(
            members
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }

    #[test]
    fn unset_fields_become_absent() {
        let partner = partner_from_record(&record(vec![
            ("name", Value::string("Amal")),
            ("phone", Value::Bool(false)),
            ("phone_sanitized", Value::Bool(false)),
        ]));
        assert_eq!(partner.name, "Amal");
        assert!(partner.phone.is_none());
        assert!(partner.phone_sanitized.is_none());
    }

    #[test]
    fn string_fields_are_kept() {
        let partner = partner_from_record(&record(vec![
            ("name", Value::string("Amal")),
            ("phone", Value::string("+968 9234 5678")),
            ("phone_sanitized", Value::string("96892345678")),
        ]));
        assert_eq!(partner.phone.as_deref(), Some("+968 9234 5678"));
        assert_eq!(partner.phone_sanitized.as_deref(), Some("96892345678"));
    }

    #[test]
    fn missing_name_becomes_empty() {
        let partner = partner_from_record(&record(vec![("phone", Value::string("92345678"))]));
        assert_eq!(partner.name, "");
        assert_eq!(partner.phone.as_deref(), Some("92345678"));
    }
}
