//! Browser entry point: mounts the app.

fn main() {
	norvan_universe::init_logging();
	leptos::mount::mount_to_body(norvan_universe::App);
}
