use mars_photo_index::{app, config};

fn main() -> std::io::Result<()> {
    let config = config::load();
    app::enable_tracing(&config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Could not build tokio runtime");

    runtime.block_on(async {
        let pool = mars_photo_index::db::build_pool();
        let state = app::AppState::new(pool, config);
        if let Err(err) = app::initialize(&state) {
            eprintln!("Failed to initialize server: {err}");
            std::process::exit(1);
        }
        app::run(state).await
    })
}
