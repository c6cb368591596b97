//! Host message payloads.
//!
//! The generic message channel carries JSON objects; the topic travels
//! inside the payload under [`MESSAGE_ID_FIELD`]. Topic strings are agreed
//! with the host out of band as request/response pairs.

use serde::{Deserialize, Serialize};

use overtone_core::{EditorError, EditorResult};

/// Generic message payload.
pub type Message = serde_json::Value;

/// Payload field carrying the topic.
pub const MESSAGE_ID_FIELD: &str = "messageId";

/// Request/response topic pair for the harmonics analysis buffer.
pub const REQUEST_HARMONICS_TOPIC: &str = "RequestHarmonicsBuffer";
pub const RESPONSE_HARMONICS_TOPIC: &str = "ResponseHarmonicsBuffer";

/// Request/response topic pair for the spectrum analysis buffer.
pub const REQUEST_SPECTRUM_TOPIC: &str = "RequestSpectrumBuffer";
pub const RESPONSE_SPECTRUM_TOPIC: &str = "ResponseSpectrumBuffer";

/// Extract the topic from a payload, if present.
pub fn topic_of(payload: &Message) -> Option<&str> {
    payload.get(MESSAGE_ID_FIELD)?.as_str()
}

/// Request for an analysis buffer of one generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub sample_rate: f64,
    pub gennum: u8,
    pub buffer_size: usize,
    pub frequency: f64,
}

/// Analysis buffer pushed back by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisBuffer {
    pub sample_rate: f64,
    pub gennum: u8,
    pub buffer_size: usize,
    pub frequency: f64,
    pub buffer_data: Vec<f64>,
}

/// Serialize a payload struct into a [`Message`] stamped with the topic.
pub fn into_message<T: Serialize>(topic: &str, payload: &T) -> EditorResult<Message> {
    let mut value = serde_json::to_value(payload)
        .map_err(|err| EditorError::MalformedMessage(err.to_string()))?;
    match value.as_object_mut() {
        Some(object) => {
            object.insert(MESSAGE_ID_FIELD.to_owned(), topic.into());
            Ok(value)
        }
        None => Err(EditorError::MalformedMessage(
            "payload is not a JSON object".to_owned(),
        )),
    }
}

/// Decode a [`Message`] back into a payload struct.
pub fn from_message<T: for<'de> Deserialize<'de>>(payload: &Message) -> EditorResult<T> {
    serde_json::from_value(payload.clone())
        .map_err(|err| EditorError::MalformedMessage(err.to_string()))
}
