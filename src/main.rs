use anyhow::Result;
use bevy::{prelude::*, window::WindowResolution};
use clap::Parser;
use gridlife::{
    camera::CamPlugin,
    config::{CliArgs, Settings},
    life::LifePlugin,
    state::GameState,
};

fn main() -> Result<()> {
    let settings = Settings::try_from(CliArgs::parse())?;
    let resolution = settings.window_resolution();

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(ImagePlugin::default_nearest())
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Conway's Game of Life".into(),
                        resizable: true,
                        focused: true,
                        present_mode: bevy::window::PresentMode::AutoNoVsync,
                        mode: bevy::window::WindowMode::Windowed,
                        resolution: WindowResolution::new(resolution.x, resolution.y),
                        ..default()
                    }),
                    ..default()
                }),
        )
        .insert_resource(Time::<Fixed>::from_hz(settings.step_rate as f64))
        .insert_resource(settings)
        .init_state::<GameState>()
        .add_plugins((CamPlugin, LifePlugin))
        .run();

    Ok(())
}
