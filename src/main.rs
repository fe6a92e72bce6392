use std::path::PathBuf;

fn main()
{
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(demo::config::DEFAULT_CONFIG_PATH));

    if let Err(e) = demo::run(&config_path)
    {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
