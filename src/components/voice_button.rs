use leptos::prelude::*;
use log::warn;
use wasm_bindgen_futures::spawn_local;

use crate::config::VoiceConfig;
use crate::voice::{BrowserVoiceSession, SessionState, WebBackend};

/// Call-to-action that starts and ends the voice session and reflects its state.
#[component]
pub fn VoiceButton(config: VoiceConfig) -> impl IntoView {
	let session = BrowserVoiceSession::new(WebBackend, config);
	let status = RwSignal::new(session.status());
	session.on_status(move |s| status.set(s.clone()));

	let on_click = move |_| {
		if status.with_untracked(|s| s.state.is_busy()) {
			session.end();
			return;
		}
		let session = session.clone();
		spawn_local(async move {
			if let Err(err) = session.start().await {
				warn!("voice session did not start: {err}");
			}
		});
	};

	let label = move || {
		status.with(|s| match (&s.state, s.speaking) {
			(SessionState::Connecting, _) => "Connecting…",
			(SessionState::Connected, true) => "Agent speaking · End call",
			(SessionState::Connected, false) => "Listening · End call",
			_ => "Talk to Norvan",
		})
	};
	let class = move || {
		status.with(|s| match s.state {
			SessionState::Connected => "voice-cta live",
			SessionState::Connecting => "voice-cta pending",
			_ => "voice-cta",
		})
	};
	let failure = move || {
		status.with(|s| match &s.state {
			SessionState::Failed(err) => {
				Some(view! { <p class="voice-error">{err.to_string()}</p> })
			}
			_ => None,
		})
	};

	view! {
		<div class="voice-panel">
			<button class=class on:click=on_click>
				{label}
			</button>
			{failure}
		</div>
	}
}
