use std::sync::Arc;

use leptos::prelude::*;

use crate::components::{HudCard, UniverseCanvas, VoiceButton};
use crate::config::AppConfig;
use crate::graph::brand_universe;
use crate::selection::Selection;

/// Brand universe page: the 3D canvas, the detail overlay and the voice call-to-action.
#[component]
pub fn Home() -> impl IntoView {
	let config = AppConfig::default();
	let selection = RwSignal::new(Selection::default());
	let universe = brand_universe().map(Arc::new);

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{universe
				.map(|graph| {
					view! {
						<div class="universe">
							<UniverseCanvas
								graph=graph.clone()
								config=config.clone()
								selection=selection
							/>
							<div class="universe-overlay">
								<h1>"Norvan Universe"</h1>
								<p class="subtitle">
									"Click a node to explore. Drag to orbit, right-drag to pan, "
									"scroll to zoom."
								</p>
							</div>
							<HudCard
								graph=graph
								selection=selection
								brand_prefix=config.label.brand_prefix
							/>
							<VoiceButton config=config.voice.clone() />
						</div>
					}
				})}
		</ErrorBoundary>
	}
}
