use part_viewer::app::winit::App;
use part_viewer::config::ViewerConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewerConfig::load()?;
    log::info!("Starting part viewer for {}", config.asset);

    App::new(config).run()?;
    Ok(())
}
