use std::sync::Arc;

use leptos::prelude::*;

use crate::color::Accent;
use crate::graph::Graph;
use crate::selection::Selection;
use crate::visual::{resolve_accent, split_brand};

/// Overlay describing the selected node. Clicking a listed tool selects it;
/// the close button and the backdrop clear the selection.
#[component]
pub fn HudCard(
	graph: Arc<Graph>,
	selection: RwSignal<Selection>,
	brand_prefix: &'static str,
) -> impl IntoView {
	move || {
		let idx = selection.with(|sel| sel.current())?;
		let node = graph.node(idx);
		let accent = resolve_accent(node, &*graph);
		let card_style = Accent::from_color(accent).card_style();
		let suffix_style = format!("color: {}", accent.to_hex());
		let (prefix, suffix) = split_brand(&node.label, brand_prefix);
		let (prefix, suffix) = (prefix.to_owned(), suffix.to_owned());

		let tools = graph
			.tools_of(node)
			.into_iter()
			.map(|(_, tool)| {
				let (graph, id, label) = (graph.clone(), tool.id.clone(), tool.label.clone());
				view! {
					<li>
						<button
							class="hud-tool"
							on:click=move |_| selection.update(|sel| {
								sel.select(&graph, &id);
							})
						>
							{label}
						</button>
					</li>
				}
			})
			.collect_view();
		let strengths = node
			.strengths
			.iter()
			.map(|s| view! { <li>{s.clone()}</li> })
			.collect_view();
		let has_tools = !node.tools.is_empty();
		let has_strengths = !node.strengths.is_empty();

		Some(view! {
			<div class="hud-backdrop" on:click=move |_| selection.update(|sel| sel.clear()) />
			<aside class="hud-card" style=card_style>
				<button class="hud-close" on:click=move |_| selection.update(|sel| sel.clear())>
					"×"
				</button>
				<h2 class="hud-title">
					<span class="hud-prefix">{prefix}</span>
					<span class="hud-suffix" style=suffix_style>
							{suffix}
						</span>
				</h2>
				{node.tagline.clone().map(|t| view! { <p class="hud-tagline">{t}</p> })}
				{node.description.clone().map(|d| view! { <p class="hud-desc">{d}</p> })}
				{has_strengths.then(|| view! { <h3>"Strengths"</h3> })}
				<ul class="hud-strengths">{strengths}</ul>
				{has_tools.then(|| view! { <h3>"Tools"</h3> })}
				<ul class="hud-tools">{tools}</ul>
			</aside>
		})
	}
}
