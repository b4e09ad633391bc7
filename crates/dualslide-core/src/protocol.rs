//! Wire format for presenter/audience messages.
//!
//! Every message travels in an envelope `{ sessionId, type, payload }`.
//! Decoding maps the `type` string onto the closed [`Message`] enum; unknown
//! or missing types decode to `None` and are dropped by the caller.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::layout::NotesLocation;
use crate::session::{DisplayMode, PointerState};

/// Protocol errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Full snapshot pushed on handshake and on layout changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatePayload {
    pub page: u32,
    pub total_pages: u32,
    pub location: NotesLocation,
    pub split: f64,
    pub mode: DisplayMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigatePayload {
    pub page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModePayload {
    pub mode: DisplayMode,
}

/// Document bytes plus the layout needed to cut them.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfDataPayload {
    /// Base64 in JSON.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    pub location: NotesLocation,
    pub split: f64,
}

impl std::fmt::Debug for PdfDataPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDataPayload")
            .field("data", &format_args!("<{} bytes>", self.data.len()))
            .field("location", &self.location)
            .field("split", &self.split)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    pub active: bool,
}

impl From<PointerState> for PointerPayload {
    fn from(pointer: PointerState) -> Self {
        Self {
            x: pointer.position.map(|p| p.x),
            y: pointer.position.map(|p| p.y),
            active: pointer.active,
        }
    }
}

impl From<PointerPayload> for PointerState {
    fn from(payload: PointerPayload) -> Self {
        match (payload.active, payload.x, payload.y) {
            (true, Some(x), Some(y)) => PointerState::at(x, y),
            _ => PointerState::hidden(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// Every message either window can send.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Audience → presenter, once per audience window lifetime.
    Hello,
    /// Presenter → audience.
    State(StatePayload),
    /// Presenter → audience.
    Navigate(NavigatePayload),
    /// Presenter → audience.
    Mode(ModePayload),
    /// Presenter → audience.
    PdfData(PdfDataPayload),
    /// Presenter → audience.
    Pointer(PointerPayload),
    /// Audience → presenter, diagnostic only.
    Error(ErrorPayload),
}

impl Message {
    /// Wire discriminator.
    pub fn type_name(&self) -> &'static str {
        match self {
            Message::Hello => "HELLO",
            Message::State(_) => "STATE",
            Message::Navigate(_) => "NAVIGATE",
            Message::Mode(_) => "MODE",
            Message::PdfData(_) => "PDF_DATA",
            Message::Pointer(_) => "POINTER",
            Message::Error(_) => "ERROR",
        }
    }

    fn payload(&self) -> ProtocolResult<Value> {
        let value = match self {
            Message::Hello => Value::Object(Default::default()),
            Message::State(p) => serde_json::to_value(p)?,
            Message::Navigate(p) => serde_json::to_value(p)?,
            Message::Mode(p) => serde_json::to_value(p)?,
            Message::PdfData(p) => serde_json::to_value(p)?,
            Message::Pointer(p) => serde_json::to_value(p)?,
            Message::Error(p) => serde_json::to_value(p)?,
        };
        Ok(value)
    }

    fn from_parts(kind: &str, payload: Value) -> ProtocolResult<Option<Self>> {
        let message = match kind {
            "HELLO" => Message::Hello,
            "STATE" => Message::State(serde_json::from_value(payload)?),
            "NAVIGATE" => Message::Navigate(serde_json::from_value(payload)?),
            "MODE" => Message::Mode(serde_json::from_value(payload)?),
            "PDF_DATA" => Message::PdfData(serde_json::from_value(payload)?),
            "POINTER" => Message::Pointer(serde_json::from_value(payload)?),
            "ERROR" => Message::Error(serde_json::from_value(payload)?),
            _ => return Ok(None),
        };
        Ok(Some(message))
    }
}

/// A message tagged with the sender's session.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub session_id: String,
    pub message: Message,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEnvelope {
    #[serde(default)]
    session_id: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    payload: Value,
}

impl Envelope {
    pub fn new(session_id: impl Into<String>, message: Message) -> Self {
        Self {
            session_id: session_id.into(),
            message,
        }
    }

    pub fn to_value(&self) -> ProtocolResult<Value> {
        let raw = RawEnvelope {
            session_id: self.session_id.clone(),
            kind: Some(self.message.type_name().to_string()),
            payload: self.message.payload()?,
        };
        Ok(serde_json::to_value(raw)?)
    }

    pub fn to_json(&self) -> ProtocolResult<String> {
        Ok(serde_json::to_string(&self.to_value()?)?)
    }

    /// Decode a structured value. `Ok(None)` for unrecognized types.
    pub fn from_value(value: Value) -> ProtocolResult<Option<Self>> {
        Self::from_raw(serde_json::from_value(value)?)
    }

    /// Decode a JSON string. `Ok(None)` for unrecognized types.
    pub fn from_json(json: &str) -> ProtocolResult<Option<Self>> {
        Self::from_raw(serde_json::from_str(json)?)
    }

    fn from_raw(raw: RawEnvelope) -> ProtocolResult<Option<Self>> {
        let Some(kind) = raw.kind else {
            log::debug!("Ignoring message without a type");
            return Ok(None);
        };
        let payload = match raw.payload {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        match Message::from_parts(&kind, payload)? {
            Some(message) => Ok(Some(Envelope::new(raw.session_id, message))),
            None => {
                log::debug!("Ignoring message with unknown type {}", kind);
                Ok(None)
            }
        }
    }
}

mod base64_bytes {
    use super::{Engine, STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(de::Error::custom)
    }
}
