//! JSON frames exchanged with the conversational agent.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::VoiceError;

#[derive(Debug, Serialize)]
struct UserAudioChunk<'a> {
	user_audio_chunk: &'a str,
}

/// Encodes one captured audio slice as an outbound frame.
pub fn encode_audio_chunk(bytes: &[u8]) -> String {
	let chunk = STANDARD.encode(bytes);
	// a struct of one borrowed string cannot fail to serialize
	serde_json::to_string(&UserAudioChunk { user_audio_chunk: &chunk })
		.unwrap_or_else(|_| format!("{{\"user_audio_chunk\":\"{chunk}\"}}"))
}

#[derive(Debug, Deserialize)]
struct AudioPayload {
	chunk: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Frame {
	Audio { audio: AudioPayload },
	Interruption,
	#[serde(other)]
	Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentMessage {
	/// Base64 payload, decoded lazily when it reaches the head of the queue.
	Audio(String),
	Interruption,
	/// Any other frame type; ignored.
	Other,
}

pub fn parse_agent_message(text: &str) -> Result<AgentMessage, VoiceError> {
	let frame: Frame = serde_json::from_str(text).map_err(|e| VoiceError::Protocol(e.to_string()))?;
	Ok(match frame {
		Frame::Audio { audio } => AgentMessage::Audio(audio.chunk),
		Frame::Interruption => AgentMessage::Interruption,
		Frame::Other => AgentMessage::Other,
	})
}

#[derive(Debug, Deserialize)]
struct SignedUrl {
	signed_url: String,
}

/// Extracts the websocket address from the signed-URL endpoint's response body.
pub fn parse_signed_url(body: &str) -> Result<String, VoiceError> {
	serde_json::from_str::<SignedUrl>(body)
		.map(|r| r.signed_url)
		.map_err(|e| VoiceError::Auth(format!("unexpected signed-url response: {e}")))
}

pub fn decode_audio(chunk: &str) -> Result<Vec<u8>, VoiceError> {
	STANDARD.decode(chunk).map_err(|e| VoiceError::Decode(e.to_string()))
}

/// Little-endian signed 16-bit PCM to `[-1, 1)` floats. A trailing odd byte is
/// dropped.
pub fn pcm16_to_f32(bytes: &[u8]) -> Vec<f32> {
	bytes
		.chunks_exact(2)
		.map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
		.collect()
}
