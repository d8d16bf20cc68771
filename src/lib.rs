//! topology-diff: dependency graph diffing for microservice topologies.
//!
//! The [`graph`] module compares two snapshots of a service dependency graph,
//! groups the changes by service and classifies how two selected services
//! relate. The WASM front end renders both versions side by side on
//! force-directed canvases with the differences highlighted.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;

pub mod components;
pub mod graph;
pub mod source;

pub use components::force_graph::{ForceGraphCanvas, Theme};
pub use graph::{GraphData, GraphLink, GraphNode};

use graph::{
	DisplayNodeInfo, GraphDifferenceInfo, GroupedChanges, RenderDirectives, ServiceChangeGroup, ServicePairGraph,
	compare, group_changes, pairwise, process,
};
use source::{
	CONFIG_ELEMENT, LATEST_GRAPH_ELEMENT, LATEST_TAG, TAGGED_GRAPHS_ELEMENT, TagStore,
	TaggedGraphData, ViewConfig,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("topology-diff: logging initialized");
}

/// Parses an embedded JSON element, logging and defaulting on failure.
fn load_or_default<T: DeserializeOwned + Default>(id: &str) -> T {
	source::load_json(id).unwrap_or_else(|e| {
		warn!("topology-diff: {e}");
		T::default()
	})
}

fn load_store() -> TagStore {
	let latest: GraphData = load_or_default(LATEST_GRAPH_ELEMENT);
	let tagged: Vec<TaggedGraphData> = load_or_default(TAGGED_GRAPHS_ELEMENT);
	let mut store = TagStore::new(latest, tagged);

	// `latest` always resolves to the live snapshot, so a tag spelled that way
	// could never be selected.
	let shadowed: Vec<String> = store
		.tags()
		.filter(|tag| tag.eq_ignore_ascii_case(LATEST_TAG))
		.map(str::to_string)
		.collect();
	for tag in shadowed {
		if store.remove(&tag).is_some() {
			warn!("topology-diff: dropped tagged snapshot {tag:?}, it collides with the latest version");
		}
	}

	info!(
		"topology-diff: loaded latest snapshot ({} nodes, {} links) and {} tagged snapshots",
		store.latest().nodes.len(),
		store.latest().links.len(),
		store.tags().count()
	);
	store
}

/// Main application component.
///
/// Loads the snapshots and view configuration from the DOM, compares the two
/// selected versions and renders them side by side, followed by the grouped
/// changes and the service pair view.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config: ViewConfig = load_or_default(CONFIG_ELEMENT);
	let store = load_store();
	let versions: Vec<String> = std::iter::once(LATEST_TAG)
		.chain(store.tags())
		.map(str::to_string)
		.collect();
	let initial_older = config
		.older_version(&store)
		.unwrap_or(LATEST_TAG)
		.to_string();
	let store = StoredValue::new(store);
	let theme = Theme::by_name(&config.theme);

	let (newer, set_newer) = signal(config.newer.clone());
	let (older, set_older) = signal(initial_older);
	let (show_difference, set_show_difference) = signal(config.show_difference);
	let (show_endpoints, set_show_endpoints) = signal(config.show_endpoints);
	let (pair, set_pair) = signal(config.service_pair.clone());
	let (selected, set_selected) = signal(None::<DisplayNodeInfo>);
	let on_select = Callback::new(move |info: Option<DisplayNodeInfo>| set_selected.set(info));

	let snapshot = move |version: ReadSignal<String>| {
		Memo::new(move |_| {
			let version = version.get();
			store.with_value(|s| s.resolve(&version).cloned())
		})
	};
	let newer_graph = snapshot(newer);
	let older_graph = snapshot(older);

	let difference = Memo::new(move |_| {
		newer_graph.with(|a| older_graph.with(|b| compare(a.as_ref(), b.as_ref())))
	});
	let grouped = Memo::new(move |_| {
		newer_graph.with(|a| {
			older_graph.with(|b| match (a, b) {
				(Some(a), Some(b)) => difference.with(|info| group_changes(info, a, b)),
				_ => GroupedChanges::default(),
			})
		})
	});

	let displayed = move |graph: Memo<Option<GraphData>>| {
		Memo::new(move |_| {
			let show = show_endpoints.get();
			graph.with(|g| {
				let g = g.as_ref().map(|g| if show { g.clone() } else { g.without_endpoints() });
				process(g.unwrap_or_default())
			})
		})
	};
	let newer_view = displayed(newer_graph);
	let older_view = displayed(older_graph);

	let newer_directives = Signal::derive(move || {
		if show_difference.get() {
			difference.with(RenderDirectives::for_diff)
		} else {
			RenderDirectives::plain()
		}
	});
	let older_directives = Signal::derive(move || {
		difference.with(|info| RenderDirectives::with_difference(show_difference.get(), info))
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme=theme.name />
		<Title text="Dependency Graph Diff" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="diff-page">
			<header class="diff-controls">
				<VersionSelect label="Newer" versions=versions.clone() selected=newer set_selected=set_newer />
				<VersionSelect label="Older" versions=versions selected=older set_selected=set_older />
				<label>
					<input
						type="checkbox"
						prop:checked=show_difference
						on:change=move |ev| set_show_difference.set(event_target_checked(&ev))
					/>
					"Show difference"
				</label>
				<label>
					<input
						type="checkbox"
						prop:checked=show_endpoints
						on:change=move |ev| set_show_endpoints.set(event_target_checked(&ev))
					/>
					"Show endpoints"
				</label>
			</header>

			{move || difference.with(GraphDifferenceInfo::is_empty).then(|| view! {
				<p class="no-changes">"The two versions have the same nodes and links."</p>
			})}

			<div class="diff-graphs">
				<section class="diff-graph">
					<h2>{move || newer.get()}</h2>
					<ForceGraphCanvas data=newer_view directives=newer_directives theme=theme.clone() on_select=on_select height=Some(600.0) />
				</section>
				<section class="diff-graph">
					<h2>{move || older.get()}</h2>
					<ForceGraphCanvas data=older_view directives=older_directives theme=theme.clone() on_select=on_select height=Some(600.0) />
				</section>
			</div>

			<NodeInfoPanel selected=selected />
			<ChangeList grouped=grouped />
			<PairView
				newer_graph=newer_graph
				older_graph=older_graph
				difference=difference
				pair=pair
				set_pair=set_pair
				theme=theme
			/>
		</div>
	}
}

#[component]
fn VersionSelect(
	label: &'static str,
	versions: Vec<String>,
	selected: ReadSignal<String>,
	set_selected: WriteSignal<String>,
) -> impl IntoView {
	let options = versions
		.into_iter()
		.map(|version| {
			let text = version.clone();
			view! { <option value=version>{text}</option> }
		})
		.collect_view();
	view! {
		<label class="version-select">
			{label}
			<select
				prop:value=move || selected.get()
				on:change=move |ev| set_selected.set(event_target_value(&ev))
			>
				{options}
			</select>
		</label>
	}
}

/// Details of the node pinned by a click on either canvas.
#[component]
fn NodeInfoPanel(selected: ReadSignal<Option<DisplayNodeInfo>>) -> impl IntoView {
	let row = |label: &'static str, value: Option<String>| {
		value.map(|value| view! { <dt>{label}</dt><dd>{value}</dd> })
	};
	move || {
		selected.get().map(|info| {
			view! {
				<section class="node-info">
					<h2>{info.name.clone()}" "<span class="node-type">{info.kind.badge()}</span></h2>
					<dl>
						{row("Service", info.service)}
						{row("Namespace", info.namespace)}
						{row("Version", info.version)}
						{row("Method", info.method)}
						{row("Label", info.label_name)}
						{row("Unique service name", info.unique_service_name.map(|n| n.replace('\t', " / ")))}
					</dl>
				</section>
			}
		})
	}
}

/// Added and deleted nodes grouped by service.
#[component]
fn ChangeList(grouped: Memo<GroupedChanges>) -> impl IntoView {
	view! {
		<section class="change-list">
			<h2>"Added"</h2>
			<ul>{move || grouped.with(|g| g.added.iter().map(change_item).collect_view())}</ul>
			<h2>"Deleted"</h2>
			<ul>{move || grouped.with(|g| g.deleted.iter().map(change_item).collect_view())}</ul>
		</section>
	}
}

fn change_item(group: &ServiceChangeGroup) -> impl IntoView + use<> {
	let endpoints = group
		.endpoints
		.iter()
		.map(|e| {
			let (id, name) = (e.id.clone(), e.name.clone());
			view! { <li title=id>{name}</li> }
		})
		.collect_view();
	let class = format!("change change-{}", group.state.as_str());
	let (name, state) = (group.display_name.clone(), group.state.as_str());
	view! {
		<li class=class>
			<span class="service-name">{name}</span>
			" "
			<span class="service-state">{state}</span>
			<ul class="endpoints">{endpoints}</ul>
		</li>
	}
}

/// Two selected services isolated in both versions.
#[component]
fn PairView(
	newer_graph: Memo<Option<GraphData>>,
	older_graph: Memo<Option<GraphData>>,
	difference: Memo<GraphDifferenceInfo>,
	pair: ReadSignal<Option<[String; 2]>>,
	set_pair: WriteSignal<Option<[String; 2]>>,
	theme: Theme,
) -> impl IntoView {
	let first = move || pair.with(|p| p.as_ref().map(|[a, _]| a.clone()).unwrap_or_default());
	let second = move || pair.with(|p| p.as_ref().map(|[_, b]| b.clone()).unwrap_or_default());
	let select = move |index: usize| {
		move |ev: leptos::ev::Event| {
			let value = event_target_value(&ev);
			set_pair.update(|p| {
				let mut current = p.take().unwrap_or_default();
				current[index] = value;
				*p = Some(current);
			});
		}
	};
	let isolate = move |graph: Memo<Option<GraphData>>| {
		Memo::new(move |_| {
			let (a, b) = (first(), second());
			graph.with(|g| g.as_ref().map(|g| pairwise(g, &a, &b)).unwrap_or_default())
		})
	};
	let directives = Signal::derive(move || {
		difference.with(|info| RenderDirectives::for_service_pair(info, &first(), &second()))
	});
	let options = move || {
		difference.with(|d| {
			d.all_service_node_ids
				.iter()
				.map(|id| {
					let (value, text) = (id.clone(), id.clone());
					view! { <option value=value>{text}</option> }
				})
				.collect_view()
		})
	};

	view! {
		<section class="pair-view">
			<h2>"Service pair"</h2>
			<select prop:value=first on:change=select(0)>
				<option value="">"Select a service"</option>
				{options}
			</select>
			<select prop:value=second on:change=select(1)>
				<option value="">"Select a service"</option>
				{options}
			</select>
			<div class="diff-graphs">
				<PairGraph pair=isolate(newer_graph) directives=directives theme=theme.clone() />
				<PairGraph pair=isolate(older_graph) directives=directives theme=theme />
			</div>
		</section>
	}
}

#[component]
fn PairGraph(
	pair: Memo<ServicePairGraph>,
	directives: Signal<RenderDirectives>,
	theme: Theme,
) -> impl IntoView {
	let data = Memo::new(move |_| pair.with(|p| process(p.graph.clone())));
	view! {
		<div class="pair-graph">
			<p class="relationship">{move || pair.with(|p| p.relationship.as_str())}</p>
			{move || pair.with(|p| p.relationship.message()).map(|message| view! {
				<p class="relationship-message">{message}</p>
			})}
			<ForceGraphCanvas data=data directives=directives theme=theme height=Some(400.0) />
		</div>
	}
}
