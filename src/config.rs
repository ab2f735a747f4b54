//! App-wide tuning plus the voice agent credentials baked in at build time.

use crate::error::VoiceError;
use crate::layout::LayoutConfig;
use crate::scene::SceneConfig;
use crate::visual::LabelStyle;

pub const SIGNED_URL_ENDPOINT: &str =
	"https://api.elevenlabs.io/v1/convai/conversation/get_signed_url";

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
	pub layout: LayoutConfig,
	pub scene: SceneConfig,
	pub label: LabelStyle,
	pub voice: VoiceConfig,
}

#[derive(Clone, Debug)]
pub struct VoiceConfig {
	pub agent_id: Option<String>,
	pub api_key: Option<String>,
	pub endpoint: String,
	/// Capture slice length in milliseconds.
	pub chunk_ms: i32,
	/// Sample rate of the agent's PCM16 audio.
	pub sample_rate: f32,
}

impl Default for VoiceConfig {
	fn default() -> Self {
		Self::from_env()
	}
}

/// Agent id and key, both present and non-empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
	pub agent_id: String,
	pub api_key: String,
}

impl VoiceConfig {
	pub fn from_env() -> Self {
		Self::with_credentials(
			option_env!("ELEVENLABS_AGENT_ID"),
			option_env!("ELEVENLABS_API_KEY"),
		)
	}

	pub fn with_credentials(agent_id: Option<&str>, api_key: Option<&str>) -> Self {
		let present = |v: Option<&str>| {
			v.map(str::trim)
				.filter(|v| !v.is_empty())
				.map(String::from)
		};
		Self {
			agent_id: present(agent_id),
			api_key: present(api_key),
			endpoint: SIGNED_URL_ENDPOINT.into(),
			chunk_ms: 100,
			sample_rate: 16_000.0,
		}
	}

	pub fn credentials(&self) -> Result<Credentials, VoiceError> {
		match (&self.agent_id, &self.api_key) {
			(Some(agent_id), Some(api_key)) => Ok(Credentials {
				agent_id: agent_id.clone(),
				api_key: api_key.clone(),
			}),
			_ => Err(VoiceError::Config),
		}
	}

	pub fn signed_url_request(&self, credentials: &Credentials) -> String {
		format!("{}?agent_id={}", self.endpoint, credentials.agent_id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_or_blank_credentials_are_a_config_error() {
		let missing = VoiceConfig::with_credentials(None, Some("k"));
		assert_eq!(missing.credentials(), Err(VoiceError::Config));
		let blank = VoiceConfig::with_credentials(Some("a"), Some("  "));
		assert_eq!(blank.credentials(), Err(VoiceError::Config));
	}

	#[test]
	fn request_carries_agent_id() {
		let config = VoiceConfig::with_credentials(Some("agent_42"), Some("secret"));
		let credentials = config.credentials().unwrap();
		assert_eq!(credentials.api_key, "secret");
		assert_eq!(
			config.signed_url_request(&credentials),
			format!("{SIGNED_URL_ENDPOINT}?agent_id=agent_42")
		);
	}

	#[test]
	fn defaults_match_product_tuning() {
		let config = AppConfig {
			voice: VoiceConfig::with_credentials(None, None),
			..AppConfig::default()
		};
		assert_eq!(config.layout.warmup_ticks, 100);
		assert_eq!(config.layout.cooldown_ticks, 200);
		assert_eq!(config.scene.standoff, 150.0);
		assert!(!config.scene.enable_node_drag);
		assert_eq!(config.label.world_scale, 14.12);
		assert_eq!(config.voice.chunk_ms, 100);
	}
}
