use atomlife::cli::{self, Args};
use atomlife::plugins::{
    camera::CameraPlugin, controls::ControlsPlugin, simulation::SimulationPlugin,
    trails::TrailsPlugin, visualization::VisualizationPlugin,
};
use atomlife::prelude::*;
use bevy::log::{Level, LogPlugin};
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match cli::load_and_apply_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let resume = match cli::load_saved_state(&args) {
        Ok(resume) => resume,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(ticks) = args.headless {
        return match cli::run_headless(&config, ticks, resume, args.save_state.as_deref()) {
            Ok(summary) => {
                println!("{summary}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("Error: {err}");
                ExitCode::FAILURE
            }
        };
    }

    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "atomlife".into(),
                    ..default()
                }),
                ..default()
            })
            .set(LogPlugin {
                level: if args.verbose {
                    Level::DEBUG
                } else {
                    Level::INFO
                },
                ..default()
            }),
    );

    app.insert_resource(config);
    app.insert_resource(StateFile(args.save_state.clone()));

    let simulation = match resume {
        Some(saved) => SimulationPlugin::resuming(saved),
        None => SimulationPlugin::new(),
    };

    app.add_plugins((
        simulation,
        ControlsPlugin,
        VisualizationPlugin,
        TrailsPlugin,
        CameraPlugin,
    ));

    app.run();
    ExitCode::SUCCESS
}
