use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::{Result, RpcError};

/// XML-RPC value model, limited to the types the object endpoint actually
/// exchanges.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
    Double(f64),
    Array(Vec<Value>),
    Struct(Vec<(String, Value)>),
    Nil,
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Value::Str(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Struct member lookup by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Struct(members) => members
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

pub fn method_call(method: &str, params: &[Value]) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\"?>");
    out.push_str("<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match value {
        Value::Int(v) => {
            out.push_str("<int>");
            out.push_str(&v.to_string());
            out.push_str("</int>");
        }
        Value::Bool(v) => {
            out.push_str("<boolean>");
            out.push(if *v { '1' } else { '0' });
            out.push_str("</boolean>");
        }
        Value::Str(v) => {
            out.push_str("<string>");
            out.push_str(&escape(v.as_str()));
            out.push_str("</string>");
        }
        Value::Double(v) => {
            out.push_str("<double>");
            out.push_str(&v.to_string());
            out.push_str("</double>");
        }
        Value::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        Value::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

#[derive(Debug, Clone, Copy)]
enum Scalar {
    Int,
    Bool,
    Str,
    Double,
}

enum Frame {
    Value { typed: Option<Value>, text: String },
    Array(Vec<Value>),
    Struct(Vec<(String, Value)>),
    Member { name: String, value: Option<Value> },
}

/// Parses a `<methodResponse>` document. A `<fault>` response becomes
/// `RpcError::Fault`.
pub fn parse_method_response(body: &str) -> Result<Value> {
    let mut reader = Reader::from_str(body);
    let mut buf = Vec::new();

    let mut stack: Vec<Frame> = Vec::new();
    let mut scalar: Option<Scalar> = None;
    let mut in_name = false;
    let mut is_fault = false;
    let mut result: Option<Value> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref event)) => match event.local_name().as_ref() {
                b"value" => stack.push(Frame::Value {
                    typed: None,
                    text: String::new(),
                }),
                b"array" => stack.push(Frame::Array(Vec::new())),
                b"struct" => stack.push(Frame::Struct(Vec::new())),
                b"member" => stack.push(Frame::Member {
                    name: String::new(),
                    value: None,
                }),
                b"name" => in_name = true,
                b"fault" => is_fault = true,
                b"int" | b"i4" | b"i8" => start_scalar(&mut stack, &mut scalar, Scalar::Int)?,
                b"boolean" => start_scalar(&mut stack, &mut scalar, Scalar::Bool)?,
                b"string" | b"base64" | b"dateTime.iso8601" => {
                    start_scalar(&mut stack, &mut scalar, Scalar::Str)?
                }
                b"double" => start_scalar(&mut stack, &mut scalar, Scalar::Double)?,
                _ => {}
            },
            Ok(Event::End(ref event)) => match event.local_name().as_ref() {
                b"value" => match stack.pop() {
                    Some(Frame::Value { typed, text }) => {
                        let value = typed.unwrap_or(Value::Str(text));
                        attach(&mut stack, &mut result, value)?;
                    }
                    _ => return Err(RpcError::Parse("mismatched value end tag".to_string())),
                },
                b"array" => match stack.pop() {
                    Some(Frame::Array(items)) => set_typed(&mut stack, Value::Array(items))?,
                    _ => return Err(RpcError::Parse("mismatched array end tag".to_string())),
                },
                b"struct" => match stack.pop() {
                    Some(Frame::Struct(members)) => set_typed(&mut stack, Value::Struct(members))?,
                    _ => return Err(RpcError::Parse("mismatched struct end tag".to_string())),
                },
                b"member" => match stack.pop() {
                    Some(Frame::Member { name, value }) => {
                        let value = value.ok_or_else(|| {
                            RpcError::Parse("struct member without value".to_string())
                        })?;
                        match stack.last_mut() {
                            Some(Frame::Struct(members)) => members.push((name, value)),
                            _ => {
                                return Err(RpcError::Parse(
                                    "member outside of struct".to_string(),
                                ))
                            }
                        }
                    }
                    _ => return Err(RpcError::Parse("mismatched member end tag".to_string())),
                },
                b"name" => in_name = false,
                b"int" | b"i4" | b"i8" | b"boolean" | b"string" | b"base64"
                | b"dateTime.iso8601" | b"double" => finish_scalar(&mut stack, &mut scalar)?,
                _ => {}
            },
            Ok(Event::Empty(ref event)) => match event.local_name().as_ref() {
                b"nil" => set_typed(&mut stack, Value::Nil)?,
                b"string" | b"base64" | b"dateTime.iso8601" => {
                    set_typed(&mut stack, Value::Str(String::new()))?
                }
                b"value" => attach(&mut stack, &mut result, Value::Str(String::new()))?,
                _ => {}
            },
            Ok(Event::Text(event)) => {
                let text = event
                    .unescape()
                    .map_err(|err| RpcError::Parse(err.to_string()))?;
                if in_name {
                    if let Some(Frame::Member { name, .. }) = stack.last_mut() {
                        name.push_str(&text);
                    }
                } else if let Some(Frame::Value {
                    text: value_text, ..
                }) = stack.last_mut()
                {
                    value_text.push_str(&text);
                }
            }
            Ok(Event::CData(event)) => {
                let text = String::from_utf8_lossy(event.as_ref());
                if let Some(Frame::Value {
                    text: value_text, ..
                }) = stack.last_mut()
                {
                    value_text.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => return Err(RpcError::Parse(err.to_string())),
        }
        buf.clear();
    }

    let value = result.ok_or_else(|| RpcError::Parse("empty method response".to_string()))?;
    if is_fault {
        let code = value.get("faultCode").and_then(Value::as_i64).unwrap_or(0);
        let message = value
            .get("faultString")
            .and_then(Value::as_str)
            .unwrap_or("unknown fault")
            .to_string();
        return Err(RpcError::Fault { code, message });
    }
    Ok(value)
}

fn start_scalar(stack: &mut [Frame], scalar: &mut Option<Scalar>, kind: Scalar) -> Result<()> {
    match stack.last_mut() {
        Some(Frame::Value { text, .. }) => {
            text.clear();
            *scalar = Some(kind);
            Ok(())
        }
        _ => Err(RpcError::Parse("type tag outside of value".to_string())),
    }
}

fn finish_scalar(stack: &mut [Frame], scalar: &mut Option<Scalar>) -> Result<()> {
    let kind = match scalar.take() {
        Some(kind) => kind,
        None => return Err(RpcError::Parse("mismatched type end tag".to_string())),
    };
    match stack.last_mut() {
        Some(Frame::Value { typed, text }) => {
            let raw = std::mem::take(text);
            *typed = Some(scalar_value(kind, &raw)?);
            Ok(())
        }
        _ => Err(RpcError::Parse("type tag outside of value".to_string())),
    }
}

fn scalar_value(kind: Scalar, raw: &str) -> Result<Value> {
    match kind {
        Scalar::Int => raw
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| RpcError::Parse(format!("invalid integer value: {raw}"))),
        Scalar::Bool => match raw.trim() {
            "1" | "true" => Ok(Value::Bool(true)),
            "0" | "false" => Ok(Value::Bool(false)),
            other => Err(RpcError::Parse(format!("invalid boolean value: {other}"))),
        },
        Scalar::Str => Ok(Value::Str(raw.to_string())),
        Scalar::Double => raw
            .trim()
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| RpcError::Parse(format!("invalid double value: {raw}"))),
    }
}

fn set_typed(stack: &mut [Frame], value: Value) -> Result<()> {
    match stack.last_mut() {
        Some(Frame::Value { typed, .. }) => {
            *typed = Some(value);
            Ok(())
        }
        _ => Err(RpcError::Parse("composite value outside of value".to_string())),
    }
}

fn attach(stack: &mut Vec<Frame>, result: &mut Option<Value>, value: Value) -> Result<()> {
    match stack.last_mut() {
        Some(Frame::Array(items)) => {
            items.push(value);
            Ok(())
        }
        Some(Frame::Member { value: slot, .. }) => {
            *slot = Some(value);
            Ok(())
        }
        None => {
            if result.is_none() {
                *result = Some(value);
            }
            Ok(())
        }
        Some(Frame::Value { .. }) | Some(Frame::Struct(_)) => {
            Err(RpcError::Parse("misplaced value end tag".to_string()))
        }
    }
}
