//! Integrator and resolver working together against small tile maps.

use ledge::components::{Boots, Collision, Health, Physics, Projectile, Transform};
use ledge::config::CollisionConfig;
use ledge::{CollisionSystem, DeathSystem, EventBus, Level, PhysicsSystem, Vec2};
use ledge_core::{Entity, World};

const TS: f32 = 1.0 / 60.0;

struct Rig {
    world: World,
    physics: PhysicsSystem,
    collision: CollisionSystem,
    level: Level,
}

impl Rig {
    fn new(map: &str) -> Self {
        let mut world = World::new(64);
        let physics = PhysicsSystem::new(&mut world).unwrap();
        let collision = CollisionSystem::new(&mut world, CollisionConfig::default()).unwrap();
        Self {
            world,
            physics,
            collision,
            level: Level::from_ascii(map, 16).unwrap(),
        }
    }

    fn body(&mut self, position: Vec2, velocity: Vec2, size: i32) -> Entity {
        let e = self.world.create_entity().unwrap();
        let transform = Transform::at(position);
        let mut collision = Collision::new(Vec2::ZERO, size, size);
        collision.sync(&transform);
        self.world.add_component(e, transform).unwrap();
        self.world
            .add_component(
                e,
                Physics {
                    velocity,
                    max_velocity: Vec2::new(1000.0, 1000.0),
                    ..Physics::default()
                },
            )
            .unwrap();
        self.world.add_component(e, collision).unwrap();
        e
    }

    fn step_x(&mut self) -> Option<Entity> {
        self.physics.update_x(&mut self.world, TS).unwrap();
        self.collision.resolve_x(&mut self.world, &self.level).unwrap()
    }

    fn step_y(&mut self) -> Option<Entity> {
        self.physics.update_y(&mut self.world, TS).unwrap();
        self.collision.resolve_y(&mut self.world, &self.level, TS).unwrap()
    }
}

const WALL: &str = "
..........
......#...
##########
";

#[test]
fn moving_right_into_a_wall_stops_flush() {
    let mut rig = Rig::new(WALL);
    let e = rig.body(Vec2::new(85.0, 20.0), Vec2::new(300.0, 0.0), 8);

    assert_eq!(rig.step_x(), None);

    let collision = rig.world.get_component::<Collision>(e).unwrap();
    assert_eq!(collision.rect.right(), 6 * 16);
    assert!(collision.colliding_right);
    assert_eq!(rig.world.get_component::<Physics>(e).unwrap().velocity.x, 0.0);
}

#[test]
fn projectile_into_a_wall_is_destroyed_and_ends_the_pass() {
    let mut rig = Rig::new(WALL);
    let shot = rig.body(Vec2::new(85.0, 20.0), Vec2::new(300.0, 0.0), 8);
    rig.world.add_component(shot, Projectile::default()).unwrap();
    // Later in the pass; would be snapped if the pass kept going
    let bystander = rig.body(Vec2::new(85.0, 20.0), Vec2::new(300.0, 0.0), 8);

    assert_eq!(rig.step_x(), Some(shot));
    assert!(!rig.world.is_alive(shot));

    let collision = rig.world.get_component::<Collision>(bystander).unwrap();
    assert!(!collision.colliding_right);
    assert_eq!(collision.rect.x, 90);
    assert_eq!(rig.world.get_component::<Physics>(bystander).unwrap().velocity.x, 300.0);
}

const SPIKES: &str = "
..........
..........
..........
..........
..^^^.....
##########
";

#[test]
fn falling_onto_spikes_without_boots_is_lethal() {
    let mut rig = Rig::new(SPIKES);
    let bus = EventBus::new(8);
    let death = DeathSystem::new(&mut rig.world).unwrap();
    let e = rig.body(Vec2::new(36.0, 0.0), Vec2::new(20.0, 0.0), 8);
    rig.world.add_component(e, Health { hitpoints: 5 }).unwrap();

    for _ in 0..120 {
        rig.step_x();
        rig.step_y();
        if rig.world.get_component::<Health>(e).unwrap().hitpoints <= 0 {
            break;
        }
    }

    assert_eq!(rig.world.get_component::<Health>(e).unwrap().hitpoints, 0);
    assert_eq!(rig.world.get_component::<Physics>(e).unwrap().velocity, Vec2::ZERO);
    assert!(rig.world.is_alive(e));

    let removed = death.update(&mut rig.world, &bus.sender()).unwrap();
    assert_eq!(removed, vec![e]);
}

#[test]
fn hazard_death_does_not_end_the_pass() {
    let mut rig = Rig::new(SPIKES);
    // Lower id: lands on the spikes this tick
    let doomed = rig.body(Vec2::new(36.0, 56.0), Vec2::new(0.0, 120.0), 8);
    rig.world.add_component(doomed, Health { hitpoints: 2 }).unwrap();
    // Higher id: lands on the floor in the same pass
    let lander = rig.body(Vec2::new(120.0, 71.0), Vec2::new(0.0, 120.0), 8);

    assert_eq!(rig.step_y(), None);

    assert_eq!(rig.world.get_component::<Health>(doomed).unwrap().hitpoints, 0);
    let physics = rig.world.get_component::<Physics>(lander).unwrap();
    assert!(physics.touching_ground);
    assert_eq!(physics.velocity.y, 0.0);
    let collision = rig.world.get_component::<Collision>(lander).unwrap();
    assert!(collision.colliding_down);
    assert_eq!(collision.rect.bottom(), 80);
}

#[test]
fn boots_stand_on_spikes_like_ground() {
    let mut rig = Rig::new(SPIKES);
    // Resting on the spike row (top at y = 64)
    let e = rig.body(Vec2::new(40.0, 56.0), Vec2::ZERO, 8);
    rig.world.add_component(e, Health { hitpoints: 1 }).unwrap();
    rig.world.add_component(e, Boots).unwrap();

    for _ in 0..30 {
        rig.step_y();
    }

    let physics = rig.world.get_component::<Physics>(e).unwrap();
    assert!(physics.touching_ground);
    assert_eq!(physics.velocity.y, 0.0);
    assert_eq!(rig.world.get_component::<Health>(e).unwrap().hitpoints, 1);
    assert_eq!(rig.world.get_component::<Collision>(e).unwrap().rect.bottom(), 64);
}

#[test]
fn resting_body_settles_and_stays_put() {
    let mut rig = Rig::new(SPIKES);
    let e = rig.body(Vec2::new(120.0, 40.0), Vec2::ZERO, 8);

    for _ in 0..120 {
        rig.step_x();
        rig.step_y();
    }
    let settled = *rig.world.get_component::<Transform>(e).unwrap();
    assert_eq!(settled.position.y, 72.0);

    for _ in 0..10 {
        rig.step_x();
        rig.step_y();
    }
    assert_eq!(*rig.world.get_component::<Transform>(e).unwrap(), settled);
    assert!(rig.world.get_component::<Physics>(e).unwrap().touching_ground);
}
