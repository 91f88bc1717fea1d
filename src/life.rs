use bevy::{prelude::*, utils::HashMap, window::PrimaryWindow};

use crate::{
    config::Settings,
    engine::Stepper,
    grid::{Grid, Layout},
    prelude::*,
    state::GameState,
};

pub struct LifePlugin;

impl Plugin for LifePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(GameState::Load),
            (load_meshes_and_materials, load_board).chain(),
        )
        .add_systems(
            FixedUpdate,
            tick.run_if(in_state(GameState::Ready).and(simulation_running)),
        )
        .add_systems(
            Update,
            (
                handle_keyboard,
                paint_cells,
                apply_step_rate.run_if(resource_changed::<StepRate>),
                sync_cell_colors.run_if(resource_changed::<Simulation>),
                update_window_title
                    .run_if(resource_changed::<Simulation>.or(resource_changed::<StepRate>)),
            )
                .chain()
                .run_if(in_state(GameState::Ready)),
        );
    }
}

// ——> SIMULATION STATE

/// Owns the cell grid and decides when generations advance.
///
/// Starts paused. The grid is double-buffered: `advance` writes the next
/// generation into the spare buffer and swaps, so every cell of a generation
/// is computed from the same snapshot and no full-grid copy is ever made.
#[derive(Resource)]
pub struct Simulation {
    front: Grid,
    back: Grid,
    stepper: Box<dyn Stepper>,
    generation: u64,
    running: bool,
    seed_probability: f64,
    rng: fastrand::Rng,
}

impl Simulation {
    pub fn new(
        rows: usize,
        columns: usize,
        seed_probability: f64,
        stepper: Box<dyn Stepper>,
        mut rng: fastrand::Rng,
    ) -> Self {
        let mut front = Grid::new(rows, columns);
        front.randomize(seed_probability, &mut rng);
        Self {
            back: Grid::new(rows, columns),
            front,
            stepper,
            generation: 0,
            running: false,
            seed_probability,
            rng,
        }
    }

    /// Read-only view of the current generation.
    pub fn grid(&self) -> &Grid {
        &self.front
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn toggle_pause(&mut self) {
        self.running = !self.running;
    }

    /// Kills every cell. The generation counter keeps its value; clearing is
    /// a content edit, not a restart.
    pub fn clear(&mut self) {
        self.front.fill(false);
    }

    /// Reseeds the grid and restarts the generation count. The running flag
    /// is left as it is.
    pub fn reinitialize(&mut self) {
        self.generation = 0;
        self.front.randomize(self.seed_probability, &mut self.rng);
    }

    /// Writes one cell's liveness directly. Allowed while running; the edit
    /// is picked up by the next tick.
    pub fn set_cell(&mut self, row: usize, column: usize, alive: bool) {
        self.front.set(row, column, alive);
    }

    /// Advances one generation. Does nothing while paused.
    pub fn advance(&mut self) {
        if !self.running {
            return;
        }
        self.stepper.advance_into(&self.front, &mut self.back);
        std::mem::swap(&mut self.front, &mut self.back);
        self.generation += 1;
    }

    pub fn stepper_label(&self) -> &'static str {
        self.stepper.label()
    }
}

/// Target generations per second, clamped to [MIN_STEP_RATE, MAX_STEP_RATE].
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRate(u32);

impl StepRate {
    pub fn new(rate: u32) -> Self {
        Self(rate.clamp(MIN_STEP_RATE, MAX_STEP_RATE))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn hz(self) -> f64 {
        self.0 as f64
    }

    pub fn set(&mut self, rate: u32) {
        self.0 = rate.clamp(MIN_STEP_RATE, MAX_STEP_RATE);
    }

    pub fn increase(&mut self) {
        self.0 = self.0.saturating_mul(2).min(MAX_STEP_RATE);
    }

    pub fn decrease(&mut self) {
        self.0 = (self.0 / 2).max(MIN_STEP_RATE);
    }
}

fn simulation_running(sim: Res<Simulation>) -> bool {
    sim.is_running()
}

// ——> SYSTEMS

/// create material & mesh handles for the board and store them in a resource
fn load_meshes_and_materials(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    settings: Res<Settings>,
) {
    let layout = settings.layout();
    let cell_mesh = meshes.add(Rectangle::from_size(Vec2::splat(layout.cell_edge)));
    let backdrop_mesh = meshes.add(Rectangle::from_size(layout.pixel_size()));

    let alive_mat = materials.add(ColorMaterial::from_color(CELL_ALIVE_COLOR));
    let dead_mat = materials.add(ColorMaterial::from_color(CELL_DEAD_COLOR));
    let lines_mat = materials.add(ColorMaterial::from_color(GRID_LINE_COLOR));

    let meshes = HashMap::from([("cell", cell_mesh), ("backdrop", backdrop_mesh)]);
    let materials = HashMap::from([
        ("alive", alive_mat),
        ("dead", dead_mat),
        ("lines", lines_mat),
    ]);
    commands.insert_resource(MeshAndMats { meshes, materials });
}

/// spawn the board and set up the simulation resources
fn load_board(
    mut commands: Commands,
    meshes_and_mats: Res<MeshAndMats>,
    settings: Res<Settings>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let layout = settings.layout();

    // backdrop quad behind the cells; the gap left by the cell scale reads
    // as grid lines
    commands.spawn((
        Mesh2d(meshes_and_mats.meshes["backdrop"].clone()),
        MeshMaterial2d(meshes_and_mats.materials["lines"].clone()),
        Transform::from_translation(layout.center.extend(0.0)),
    ));

    let cell_mesh = &meshes_and_mats.meshes["cell"];
    let dead_mat = &meshes_and_mats.materials["dead"];
    let cells_to_spawn = (0..layout.rows)
        .flat_map(|row| (0..layout.columns).map(move |column| (row, column)))
        .map(|(row, column)| {
            (
                CellCoord { row, column },
                Mesh2d(cell_mesh.clone()),
                MeshMaterial2d(dead_mat.clone()),
                Transform::from_translation(layout.cell_to_translation(row, column))
                    .with_scale(CELL_SCALE.extend(1.0)),
            )
        })
        .collect::<Vec<_>>();
    commands.spawn_batch(cells_to_spawn);

    let stepper = settings.stepper.build();
    info!(
        "{}x{} grid, {} stepper, seed probability {}",
        settings.rows,
        settings.columns,
        stepper.label(),
        settings.seed_probability,
    );
    let keys = &settings.keys;
    info!("{:?} - play / pause", keys.pause);
    info!("{:?} - clear the grid", keys.clear);
    info!("{:?} - reseed the grid", keys.reinitialize);
    info!("{:?} / {:?} - speed up / slow down", keys.faster, keys.slower);
    info!("left / right mouse - draw / erase cells");
    info!("{:?} - quit", keys.quit);

    commands.insert_resource(Simulation::new(
        settings.rows,
        settings.columns,
        settings.seed_probability,
        stepper,
        fastrand::Rng::new(),
    ));
    commands.insert_resource(StepRate::new(settings.step_rate));
    commands.insert_resource(BoardLayout(layout));

    next_state.set(GameState::Ready);
}

/// advance one generation per elapsed step interval
fn tick(mut sim: ResMut<Simulation>) {
    sim.advance();
}

/// keep the fixed timestep in sync with the step rate
fn apply_step_rate(rate: Res<StepRate>, mut time: ResMut<Time<Fixed>>) {
    time.set_timestep_hz(rate.hz());
}

fn handle_keyboard(
    keyboard_input: Res<ButtonInput<KeyCode>>,
    settings: Res<Settings>,
    mut sim: ResMut<Simulation>,
    mut rate: ResMut<StepRate>,
    mut app_exit: EventWriter<AppExit>,
) {
    let keys = &settings.keys;
    if keyboard_input.just_pressed(keys.quit) {
        app_exit.send(AppExit::Success);
        return;
    }

    let mut command_ran = false;
    if keyboard_input.just_pressed(keys.pause) {
        sim.toggle_pause();
        command_ran = true;
    }
    if keyboard_input.just_pressed(keys.clear) {
        sim.clear();
        command_ran = true;
    }
    if keyboard_input.just_pressed(keys.reinitialize) {
        sim.reinitialize();
        command_ran = true;
    }
    if keyboard_input.just_pressed(keys.faster) {
        rate.increase();
        command_ran = true;
    }
    if keyboard_input.just_pressed(keys.slower) {
        rate.decrease();
        command_ran = true;
    }

    if command_ran {
        info!(
            "running: {}, rate: {} gen/s, generation: {}, population: {}",
            sim.is_running(),
            rate.get(),
            sim.generation(),
            sim.grid().population(),
        );
    }
}

/// paint cells under the cursor: left button draws, right button erases
fn paint_cells(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    camera: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    layout: Res<BoardLayout>,
    mut sim: ResMut<Simulation>,
) {
    let alive = if buttons.pressed(MouseButton::Left) {
        true
    } else if buttons.pressed(MouseButton::Right) {
        false
    } else {
        return;
    };

    let Some(cursor) = windows.single().cursor_position() else {
        return;
    };
    let (camera, camera_transform) = camera.single();
    let Ok(world) = camera.viewport_to_world_2d(camera_transform, cursor) else {
        return;
    };
    // the camera can be panned off the board; ignore those positions
    if let Some((row, column)) = layout.cell_at(world) {
        if sim.grid().get(row, column) != alive {
            sim.set_cell(row, column, alive);
        }
    }
}

fn sync_cell_colors(
    sim: Res<Simulation>,
    meshes_and_mats: Res<MeshAndMats>,
    mut cells: Query<(&CellCoord, &mut MeshMaterial2d<ColorMaterial>)>,
) {
    let alive_mat = &meshes_and_mats.materials["alive"];
    let dead_mat = &meshes_and_mats.materials["dead"];
    for (coord, mut material) in cells.iter_mut() {
        let target = if sim.grid().get(coord.row, coord.column) {
            alive_mat
        } else {
            dead_mat
        };
        if material.0 != *target {
            material.0 = target.clone();
        }
    }
}

fn update_window_title(
    sim: Res<Simulation>,
    rate: Res<StepRate>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let status = if sim.is_running() { "running" } else { "paused" };
    windows.single_mut().title = format!(
        "Conway's Game of Life | {status} | gen {} | {} gen/s | pop {} | {}",
        sim.generation(),
        rate.get(),
        sim.grid().population(),
        sim.stepper_label(),
    );
}

// ——> COMPONENTS

/// Grid position of one cell sprite.
#[derive(Component, Debug, Clone, Copy)]
struct CellCoord {
    row: usize,
    column: usize,
}

// ——> RESOURCES

/// hold handles for meshes and materials
#[derive(Resource, Clone)]
struct MeshAndMats {
    meshes: HashMap<&'static str, Handle<Mesh>>,
    materials: HashMap<&'static str, Handle<ColorMaterial>>,
}

/// World-space board geometry, fixed at startup.
#[derive(Resource, Deref, Clone, Copy)]
pub struct BoardLayout(pub Layout);

#[cfg(test)]
mod test {
    use crate::engine::StepperKind;

    use super::*;

    fn seeded(rows: usize, columns: usize, probability: f64) -> Simulation {
        Simulation::new(
            rows,
            columns,
            probability,
            StepperKind::Scalar.build(),
            fastrand::Rng::with_seed(42),
        )
    }

    fn place_blinker(sim: &mut Simulation) {
        sim.set_cell(2, 1, true);
        sim.set_cell(2, 2, true);
        sim.set_cell(2, 3, true);
    }

    #[test]
    fn starts_paused_at_generation_zero() {
        let sim = seeded(6, 6, 1.0);
        assert!(!sim.is_running());
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.grid().population(), 36);
    }

    #[test]
    fn advance_is_a_noop_while_paused() {
        let mut sim = seeded(8, 8, 0.5);
        let before = sim.grid().clone();
        for _ in 0..5 {
            sim.advance();
        }
        assert_eq!(*sim.grid(), before);
        assert_eq!(sim.generation(), 0);
    }

    #[test]
    fn advance_applies_the_rule_and_counts_generations() {
        let mut sim = seeded(5, 5, 0.0);
        place_blinker(&mut sim);
        sim.toggle_pause();

        sim.advance();
        assert_eq!(sim.generation(), 1);
        // rotated to a vertical blinker
        assert!(sim.grid().get(1, 2));
        assert!(sim.grid().get(2, 2));
        assert!(sim.grid().get(3, 2));
        assert_eq!(sim.grid().population(), 3);

        sim.advance();
        assert_eq!(sim.generation(), 2);
        // and back to horizontal
        assert!(sim.grid().get(2, 1));
        assert!(sim.grid().get(2, 2));
        assert!(sim.grid().get(2, 3));
        assert_eq!(sim.grid().population(), 3);
    }

    #[test]
    fn toggle_pause_flips_without_touching_the_grid() {
        let mut sim = seeded(6, 6, 1.0);
        sim.toggle_pause();
        assert!(sim.is_running());
        assert_eq!(sim.grid().population(), 36);
        sim.toggle_pause();
        assert!(!sim.is_running());
        assert_eq!(sim.grid().population(), 36);
    }

    #[test]
    fn editing_is_allowed_while_running() {
        let mut sim = seeded(5, 5, 0.0);
        sim.toggle_pause();
        sim.set_cell(0, 0, true);
        assert!(sim.grid().get(0, 0));
        sim.set_cell(0, 0, false);
        assert!(!sim.grid().get(0, 0));
    }

    #[test]
    fn clear_keeps_the_generation_counter() {
        let mut sim = seeded(6, 6, 1.0);
        sim.toggle_pause();
        sim.advance();
        sim.advance();
        sim.advance();
        sim.clear();
        assert_eq!(sim.grid().population(), 0);
        assert_eq!(sim.generation(), 3);
    }

    #[test]
    fn reinitialize_resets_the_generation_counter() {
        let mut sim = seeded(6, 6, 1.0);
        sim.toggle_pause();
        sim.advance();
        sim.advance();
        assert_eq!(sim.generation(), 2);

        sim.reinitialize();
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.grid().population(), 36);
        // the running flag is untouched
        assert!(sim.is_running());
    }

    #[test]
    fn step_rate_doubles_and_halves() {
        let mut rate = StepRate::new(8);
        rate.increase();
        assert_eq!(rate.get(), 16);
        rate.increase();
        assert_eq!(rate.get(), 32);
        rate.decrease();
        rate.decrease();
        assert_eq!(rate.get(), 8);
    }

    #[test]
    fn step_rate_clamps_at_both_ends() {
        let mut rate = StepRate::new(8);
        for _ in 0..20 {
            rate.increase();
        }
        assert_eq!(rate.get(), MAX_STEP_RATE);
        for _ in 0..20 {
            rate.decrease();
        }
        assert_eq!(rate.get(), MIN_STEP_RATE);
    }

    #[test]
    fn step_rate_construction_clamps() {
        assert_eq!(StepRate::new(0).get(), MIN_STEP_RATE);
        assert_eq!(StepRate::new(1_000).get(), MAX_STEP_RATE);
    }

    #[test]
    fn step_rate_set_clamps() {
        let mut rate = StepRate::new(8);
        rate.set(64);
        assert_eq!(rate.get(), 64);
        rate.set(300);
        assert_eq!(rate.get(), MAX_STEP_RATE);
        rate.set(0);
        assert_eq!(rate.get(), MIN_STEP_RATE);
    }
}
