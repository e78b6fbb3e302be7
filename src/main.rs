use clap::Parser;
use env_logger::Env;

use glyphgrid::cli::{self, Args, Command};

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let config_path = args.config.as_deref();
    let result = match args.command {
        Command::Render {
            image,
            render,
            format,
            png,
            seed,
            cursor,
            worker,
        } => cli::render(config_path, image, &render, format, png, seed, cursor, worker),
        Command::Animate {
            image,
            render,
            static_ms,
            frames,
            seed,
        } => cli::animate(config_path, image, &render, static_ms, frames, seed),
        Command::Palettes => cli::list_palettes(config_path),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
