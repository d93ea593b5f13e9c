//! Scene model: static field geometry plus robots and balls by identifier.
//!
//! `ArenaScene` owns every entity it spawns. It is built once per connection
//! from the constants message (`setup`), updated in place by state messages
//! (`set_state`), and torn down completely when the connection drops
//! (`clear`). Robots and balls are created the first time their identifier
//! appears and are never duplicated afterwards.

use arena_events::{ArenaConstants, BallState, EntityId, RobotCameraModel, RobotState, WorldState};
use bevy::prelude::*;
use bevy::render::camera::ClearColorConfig;
use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

use crate::camera::OrbitController;
use crate::connection::{poll_link, ArenaCommand};
use crate::field::{self, Surface, RIM_SEGMENTS};

/// Plugin for scene synchronization.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(idle_ambient_light())
            .init_resource::<ArenaScene>()
            .init_resource::<ArenaMaterials>()
            .add_systems(Update, apply_arena_commands.after(poll_link));
    }
}

/// Ambient light color of a set-up scene.
const AMBIENT_COLOR: Color = Color::srgb(0.384, 0.384, 0.384);
const AMBIENT_BRIGHTNESS: f32 = 400.0;
const SPOT_INTENSITY: f32 = 4_000_000.0;

/// Ambient light while no arena is built, before the first connection and
/// after every teardown.
pub fn idle_ambient_light() -> AmbientLight {
    AmbientLight {
        color: AMBIENT_COLOR,
        brightness: 0.0,
    }
}

/// Shared material handles, one per surface.
#[derive(Resource)]
pub struct ArenaMaterials {
    handles: HashMap<Surface, Handle<StandardMaterial>>,
}

impl ArenaMaterials {
    pub fn get(&self, surface: Surface) -> Handle<StandardMaterial> {
        self.handles.get(&surface).cloned().unwrap_or_default()
    }
}

impl FromWorld for ArenaMaterials {
    fn from_world(world: &mut World) -> Self {
        let mut materials = world.resource_mut::<Assets<StandardMaterial>>();
        let handles = Surface::ALL
            .into_iter()
            .map(|surface| (surface, materials.add(surface.material())))
            .collect();
        Self { handles }
    }
}

/// Marker for everything spawned by the scene.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePart {
    Light,
    Carpet,
    Basket,
    Robot,
    Ball,
}

/// Root of a robot: body and camera are its children.
#[derive(Component, Debug, Clone)]
pub struct RobotMarker {
    pub id: EntityId,
}

/// Camera attached to a robot.
#[derive(Component, Debug, Clone)]
pub struct RobotCamera {
    pub id: EntityId,
}

#[derive(Component, Debug, Clone)]
pub struct BallMarker {
    pub id: EntityId,
}

/// Entities making up one robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotEntities {
    pub root: Entity,
    pub camera: Entity,
}

/// Identifier-keyed entity map that remembers insertion order.
#[derive(Debug)]
pub struct EntityRegistry<T> {
    index: HashMap<EntityId, usize>,
    entries: Vec<(EntityId, T)>,
}

impl<T> Default for EntityRegistry<T> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<T> EntityRegistry<T> {
    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.index.get(id).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.index.contains_key(id)
    }

    /// Returns the entry for `id`, creating it with `create` on first sight.
    ///
    /// The bool is true when the entry was created by this call.
    pub fn ensure(&mut self, id: &EntityId, create: impl FnOnce(usize) -> T) -> (&T, bool) {
        if let Some(&i) = self.index.get(id) {
            return (&self.entries[i].1, false);
        }
        let i = self.entries.len();
        self.entries.push((id.clone(), create(i)));
        self.index.insert(id.clone(), i);
        (&self.entries[i].1, true)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &T)> {
        self.entries.iter().map(|(id, value)| (id, value))
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (EntityId, T)> + '_ {
        self.index.clear();
        self.entries.drain(..)
    }
}

/// Meshes sized from the current constants.
#[derive(Debug, Clone)]
struct EntityMeshes {
    robot_body: Handle<Mesh>,
    ball: Handle<Mesh>,
}

/// The live scene of one connection.
#[derive(Resource, Default)]
pub struct ArenaScene {
    constants: Option<ArenaConstants>,
    vision: Option<RobotCameraModel>,
    meshes: Option<EntityMeshes>,
    statics: Vec<Entity>,
    robots: EntityRegistry<RobotEntities>,
    balls: EntityRegistry<Entity>,
    warned_unconfigured: bool,
}

impl ArenaScene {
    pub fn constants(&self) -> Option<&ArenaConstants> {
        self.constants.as_ref()
    }

    pub fn is_set_up(&self) -> bool {
        self.constants.is_some()
    }

    /// Robots in the order they first appeared.
    pub fn robots(&self) -> impl Iterator<Item = &RobotEntities> {
        self.robots.iter().map(|(_, robot)| robot)
    }

    pub fn robot(&self, id: &EntityId) -> Option<&RobotEntities> {
        self.robots.get(id)
    }

    pub fn ball(&self, id: &EntityId) -> Option<Entity> {
        self.balls.get(id).copied()
    }

    pub fn robot_count(&self) -> usize {
        self.robots.len()
    }

    pub fn ball_count(&self) -> usize {
        self.balls.len()
    }

    /// Static entities: lights, carpet, baskets.
    pub fn statics(&self) -> &[Entity] {
        &self.statics
    }

    /// Builds the static scene from `constants`.
    ///
    /// Ignored if the scene is already set up; rejected if the constants do
    /// not describe a buildable arena.
    pub fn setup(
        &mut self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &ArenaMaterials,
        ambient: &mut AmbientLight,
        constants: ArenaConstants,
    ) {
        if self.is_set_up() {
            tracing::warn!("Ignoring constants for an already built scene");
            return;
        }
        if let Err(e) = constants.validate() {
            tracing::warn!("Rejecting arena constants: {}", e);
            return;
        }

        let c = &constants;

        self.statics.push(
            commands
                .spawn((
                    SpotLightBundle {
                        spot_light: SpotLight {
                            color: Color::WHITE,
                            intensity: SPOT_INTENSITY,
                            range: c.backboard_height * 20.0,
                            outer_angle: FRAC_PI_3,
                            inner_angle: 0.0,
                            shadows_enabled: false,
                            ..default()
                        },
                        transform: Transform::from_xyz(0.0, 0.0, c.backboard_height * 5.0)
                            .looking_at(Vec3::ZERO, Vec3::Y),
                        ..default()
                    },
                    ScenePart::Light,
                ))
                .id(),
        );
        ambient.color = AMBIENT_COLOR;
        ambient.brightness = AMBIENT_BRIGHTNESS;

        for piece in field::carpet_layout(c) {
            let id = commands
                .spawn((
                    PbrBundle {
                        mesh: meshes.add(Rectangle::from_size(piece.size)),
                        material: materials.get(piece.surface),
                        transform: Transform::from_translation(piece.center.extend(0.0)),
                        ..default()
                    },
                    ScenePart::Carpet,
                ))
                .id();
            self.statics.push(id);
        }

        let backboard = meshes.add(Cuboid::from_size(field::backboard_size(c)));
        let rim = meshes.add(field::tube_mesh(
            c.basket_outer_radius,
            c.basket_inner_radius,
            c.basket_height,
            RIM_SEGMENTS,
        ));
        for placement in field::basket_placements(c) {
            let id = commands
                .spawn((
                    SpatialBundle::from_transform(placement.transform()),
                    ScenePart::Basket,
                    Name::new(format!("{} basket", placement.basket.name())),
                ))
                .with_children(|parent| {
                    parent.spawn(PbrBundle {
                        mesh: backboard.clone(),
                        material: materials.get(Surface::Backboard),
                        transform: Transform::from_translation(field::backboard_center(c)),
                        ..default()
                    });
                    parent.spawn(PbrBundle {
                        mesh: rim.clone(),
                        material: materials.get(Surface::rim(placement.basket)),
                        transform: Transform::from_translation(field::rim_center(c)),
                        ..default()
                    });
                })
                .id();
            self.statics.push(id);
        }

        self.meshes = Some(EntityMeshes {
            robot_body: meshes.add(Cylinder::new(c.robot_radius, c.robot_height)),
            ball: meshes.add(Sphere::new(c.ball_radius).mesh().uv(32, 32)),
        });
        self.vision = Some(RobotCameraModel::new(c));
        self.constants = Some(constants);
        self.warned_unconfigured = false;

        tracing::info!("Built arena with {} static objects", self.statics.len());
    }

    /// Applies a state snapshot, creating robots and balls on first sight.
    pub fn set_state(
        &mut self,
        commands: &mut Commands,
        materials: &ArenaMaterials,
        state: &WorldState,
    ) {
        let (Some(constants), Some(meshes)) = (self.constants.as_ref(), self.meshes.as_ref())
        else {
            if !self.warned_unconfigured {
                tracing::warn!("Dropping state received before arena constants");
                self.warned_unconfigured = true;
            }
            return;
        };

        for robot in &state.robots {
            let (entities, created) = self.robots.ensure(&robot.id, |index| {
                spawn_robot(commands, constants, meshes, materials, robot, index)
            });
            if created {
                tracing::debug!("New robot {}", robot.id);
            } else {
                commands.entity(entities.root).insert(robot_transform(robot));
            }
        }

        for ball in &state.balls {
            let (&entity, created) = self
                .balls
                .ensure(&ball.id, |_| spawn_ball(commands, meshes, materials, ball));
            if created {
                tracing::debug!("New ball {}", ball.id);
            } else {
                commands.entity(entity).insert(ball_transform(ball));
            }
        }

        if let Some(vision) = &self.vision {
            for robot in &state.robots {
                tracing::debug!(
                    "Robot {} sees {} balls, {} baskets",
                    robot.id,
                    vision.visible_balls(robot, &state.balls, constants).len(),
                    vision.visible_baskets(robot, constants).len()
                );
            }
        }
    }

    /// Despawns everything and returns to the idle state.
    pub fn clear(&mut self, commands: &mut Commands, ambient: &mut AmbientLight) {
        let owned = self.statics.len() + self.robots.len() + self.balls.len();

        for entity in self.statics.drain(..) {
            commands.entity(entity).despawn_recursive();
        }
        for (_, robot) in self.robots.drain() {
            commands.entity(robot.root).despawn_recursive();
        }
        for (_, entity) in self.balls.drain() {
            commands.entity(entity).despawn_recursive();
        }

        *ambient = idle_ambient_light();
        self.constants = None;
        self.vision = None;
        self.meshes = None;
        self.warned_unconfigured = false;

        tracing::info!("Cleared scene ({} objects)", owned);
    }
}

/// Pose of a robot root: translation plus heading about Z.
pub fn robot_transform(robot: &RobotState) -> Transform {
    Transform::from_xyz(robot.x, robot.y, robot.z).with_rotation(Quat::from_rotation_z(robot.r))
}

pub fn ball_transform(ball: &BallState) -> Transform {
    Transform::from_xyz(ball.x, ball.y, ball.z)
}

/// Robot camera transform relative to the robot root.
pub fn robot_camera_mount(c: &ArenaConstants) -> Transform {
    Transform::from_xyz(c.robot_camera_x, c.robot_camera_y, c.robot_camera_z)
        .with_rotation(Quat::from_rotation_x(c.robot_camera_r))
}

fn spawn_robot(
    commands: &mut Commands,
    c: &ArenaConstants,
    meshes: &EntityMeshes,
    materials: &ArenaMaterials,
    robot: &RobotState,
    index: usize,
) -> RobotEntities {
    let mut camera = Entity::PLACEHOLDER;

    let root = commands
        .spawn((
            SpatialBundle::from_transform(robot_transform(robot)),
            RobotMarker {
                id: robot.id.clone(),
            },
            ScenePart::Robot,
            Name::new(format!("robot {}", robot.id)),
        ))
        .with_children(|parent| {
            // Cylinder meshes run along Y; stand the body up on Z.
            parent.spawn(PbrBundle {
                mesh: meshes.robot_body.clone(),
                material: materials.get(Surface::Robot),
                transform: Transform::from_xyz(0.0, 0.0, c.robot_height / 2.0)
                    .with_rotation(Quat::from_rotation_x(FRAC_PI_2)),
                ..default()
            });

            camera = parent
                .spawn((
                    Camera3dBundle {
                        camera: Camera {
                            order: 1 + index as isize,
                            // Starts hidden; the tile layout activates it.
                            is_active: false,
                            clear_color: ClearColorConfig::None,
                            ..default()
                        },
                        projection: Projection::Perspective(PerspectiveProjection {
                            fov: c.robot_camera_fov_radians(),
                            aspect_ratio: c.robot_camera_aspect,
                            near: c.robot_camera_near,
                            far: c.robot_camera_far,
                        }),
                        transform: robot_camera_mount(c),
                        ..default()
                    },
                    RobotCamera {
                        id: robot.id.clone(),
                    },
                ))
                .id();
        })
        .id();

    RobotEntities { root, camera }
}

fn spawn_ball(
    commands: &mut Commands,
    meshes: &EntityMeshes,
    materials: &ArenaMaterials,
    ball: &BallState,
) -> Entity {
    commands
        .spawn((
            PbrBundle {
                mesh: meshes.ball.clone(),
                material: materials.get(Surface::Ball),
                transform: ball_transform(ball),
                ..default()
            },
            BallMarker {
                id: ball.id.clone(),
            },
            ScenePart::Ball,
            Name::new(format!("ball {}", ball.id)),
        ))
        .id()
}

/// Applies scene commands in the order they arrived.
pub fn apply_arena_commands(
    mut commands: Commands,
    mut events: EventReader<ArenaCommand>,
    mut scene: ResMut<ArenaScene>,
    mut meshes: ResMut<Assets<Mesh>>,
    materials: Res<ArenaMaterials>,
    mut ambient: ResMut<AmbientLight>,
    mut orbit: Option<ResMut<OrbitController>>,
) {
    for command in events.read() {
        match command {
            ArenaCommand::Setup(constants) => {
                scene.setup(
                    &mut commands,
                    &mut meshes,
                    &materials,
                    &mut ambient,
                    constants.clone(),
                );
                if let (Some(orbit), Some(c)) = (orbit.as_mut(), scene.constants()) {
                    let height = c.competition_area_height;
                    orbit.look_from(Vec3::new(0.0, -height, height));
                }
            }
            ArenaCommand::Update(state) => {
                scene.set_state(&mut commands, &materials, state);
            }
            ArenaCommand::Teardown => {
                scene.clear(&mut commands, &mut ambient);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_ensure_is_idempotent() {
        let mut registry: EntityRegistry<u32> = EntityRegistry::default();
        let a = EntityId::from("a");

        let (&value, created) = registry.ensure(&a, |i| i as u32 + 10);
        assert!(created);
        assert_eq!(value, 10);

        let (&value, created) = registry.ensure(&a, |_| panic!("created twice"));
        assert!(!created);
        assert_eq!(value, 10);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_keeps_insertion_order() {
        let mut registry: EntityRegistry<usize> = EntityRegistry::default();
        for id in ["r2", "r0", "r1", "r0", "r2"] {
            registry.ensure(&EntityId::from(id), |i| i);
        }

        let order: Vec<_> = registry.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, vec!["r2", "r0", "r1"]);
    }

    #[test]
    fn test_registry_drain_empties() {
        let mut registry: EntityRegistry<usize> = EntityRegistry::default();
        registry.ensure(&EntityId::from("x"), |i| i);

        assert_eq!(registry.drain().count(), 1);
        assert!(registry.is_empty());
        assert!(!registry.contains(&EntityId::from("x")));
    }

    #[test]
    fn test_robot_transform_heading() {
        let robot = RobotState::new("r0", 1.0, 2.0, 0.0, FRAC_PI_2);
        let transform = robot_transform(&robot);

        assert_eq!(transform.translation, Vec3::new(1.0, 2.0, 0.0));
        // Robot-forward (+Y) turns to -X.
        let forward = transform.rotation * Vec3::Y;
        assert!((forward - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_camera_mount_matches_vision_model() {
        let constants = ArenaConstants::default();
        let robot = RobotState::new("r0", 0.5, -1.0, 0.0, 0.3);
        let model = RobotCameraModel::new(&constants);

        let world = robot_transform(&robot).compute_matrix()
            * robot_camera_mount(&constants).compute_matrix();
        let expected = model.camera_to_world(&robot);

        for (a, b) in world
            .to_cols_array()
            .iter()
            .zip(expected.to_cols_array().iter())
        {
            assert!((a - b).abs() < 1e-5);
        }
    }
}
