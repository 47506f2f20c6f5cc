use std::time::{Duration, Instant};

use cgmath::{Point3, Vector3};
use fastrand::Rng;

use voxel_arena::{
    core::config::{GameConfig, WeaponConfig, WorldConfig},
    engine_state::{
        audio::SoundId,
        buffer_state::HeadlessMeshBackend,
        entities::{
            explosion::{blast_cells, detonate, Explosion},
            projectile::{block_at, Rocket, RocketOutcome, ROCKET_BLAST_RADIUS},
            weapon::{Arsenal, WeaponKind},
        },
        voxels::{
            block::block_type::BlockType, bullet_marks::BulletMark, chunk::ChunkLayout,
            terrain::Terrain,
        },
        EngineState, TickInput,
    },
};

const DT: f32 = 1.0 / 60.0;

fn solid_slab(terrain: &mut Terrain, x: std::ops::RangeInclusive<i32>, z: std::ops::RangeInclusive<i32>) {
    for bx in x {
        for by in -4..=4 {
            for bz in z.clone() {
                terrain.place_block(Point3::new(bx, by, bz), BlockType::SOLID);
            }
        }
    }
    terrain.take_dirty_chunks();
}

#[test]
fn rocket_into_wall_carves_a_sphere() {
    let mut terrain = Terrain::new(ChunkLayout::new(16));
    solid_slab(&mut terrain, -4..=4, -12..=-5);
    let mark_block = Point3::new(0, 1, -5);
    terrain.add_bullet_mark(
        mark_block,
        BulletMark {
            point: Point3::new(0.5, 1.5, -4.0),
            normal: Vector3::unit_z(),
        },
    );

    let mut rocket = Rocket::new(Point3::new(0.5, 0.5, 0.5), Vector3::new(0.0, 0.0, -1.0));
    let center = loop {
        match rocket.update(DT, terrain.world(), &[]) {
            RocketOutcome::Flying => continue,
            RocketOutcome::Detonated(center) => break center,
            RocketOutcome::Expired => panic!("rocket flew through the wall"),
        }
    };
    assert_eq!(block_at(center), Point3::new(0, 0, -5));

    let removed = detonate(center, ROCKET_BLAST_RADIUS, &mut terrain, &mut []);
    assert!(!removed.is_empty());
    for cell in blast_cells(center, ROCKET_BLAST_RADIUS) {
        assert!(!terrain.world().contains(cell), "{:?} survived the blast", cell);
    }
    assert!(terrain.world().contains(Point3::new(0, 0, -9)));
    assert!(terrain.world().contains(Point3::new(4, 0, -5)));
    assert!(terrain.bullet_marks().marks_on(mark_block).is_empty());
    assert!(terrain.has_dirty_chunks());

    let mut explosion = Explosion::new(center, &mut Rng::with_seed(5));
    assert!(explosion.update(DT));
    assert!(explosion.visible_particles().count() > 0);
    for _ in 0..120 {
        explosion.update(DT);
    }
    assert!(!explosion.is_alive());
    assert_eq!(explosion.visible_particles().count(), 0);
}

#[test]
fn shotgun_pellets_stay_inside_the_cone() {
    let config = WeaponConfig::default();
    let mut arsenal = Arsenal::new(&config);
    arsenal.select(WeaponKind::Shotgun);
    let (yaw, pitch) = (30.0f32, 5.0f32);

    let volley = arsenal
        .fire(0.0, Point3::new(0.0, 2.0, 0.0), yaw, pitch, &mut Rng::with_seed(11))
        .expect("a loaded shotgun fires");
    assert_eq!(volley.bullets.len(), config.shotgun_pellets as usize);

    for pellet in &volley.bullets {
        let d = pellet.direction();
        let pellet_yaw = d.x.atan2(-d.z).to_degrees();
        let pellet_pitch = d.y.clamp(-1.0, 1.0).asin().to_degrees();
        assert!((pellet_yaw - yaw).abs() <= config.shotgun_spread_horizontal + 1e-3);
        assert!((pellet_pitch - pitch).abs() <= config.shotgun_spread_vertical + 1e-3);
    }
    assert_eq!(arsenal.slot(WeaponKind::Shotgun).ammo, 9);
}

fn booted_session() -> EngineState<HeadlessMeshBackend> {
    let config = GameConfig {
        world: WorldConfig {
            render_distance: 1,
            loads_per_frame: 9,
            generation_workers: 2,
            ..WorldConfig::default()
        },
        ..GameConfig::default()
    };
    let mut session = EngineState::with_seed(config, HeadlessMeshBackend::new(), 3);
    let deadline = Instant::now() + Duration::from_secs(20);
    while !session.is_booted() {
        session.tick(&TickInput::default(), DT).unwrap();
        assert!(Instant::now() < deadline, "session never booted");
        std::thread::sleep(Duration::from_millis(1));
    }
    session
}

#[test]
fn rocket_fired_at_the_feet_removes_ground() {
    let mut session = booted_session();
    for _ in 0..120 {
        session.tick(&TickInput::default(), DT).unwrap();
    }
    session.drain_sound_requests();
    let blocks_before = session.terrain().world().len();

    let aim_down = TickInput {
        select: Some(WeaponKind::RocketLauncher),
        look_delta: (0.0, 1000.0),
        fire: true,
        ..TickInput::default()
    };
    session.tick(&aim_down, DT).unwrap();
    assert_eq!(session.rockets().len(), 1);
    assert_eq!(session.arsenal().slot(WeaponKind::RocketLauncher).ammo, 4);

    let mut ticks = 0;
    while !session.rockets().is_empty() {
        session.tick(&TickInput::default(), DT).unwrap();
        ticks += 1;
        assert!(ticks <= 20, "rocket never hit the ground");
    }
    assert!(!session.explosions().is_empty());
    assert!(session.terrain().world().len() < blocks_before);
    let sounds = session.drain_sound_requests();
    assert!(sounds.iter().any(|request| request.id == SoundId::RocketLauncher));
    assert!(sounds.iter().any(|request| request.id == SoundId::Explosion));

    for _ in 0..72 {
        session.tick(&TickInput::default(), DT).unwrap();
    }
    assert!(session.explosions().is_empty());
}

#[test]
fn resident_blocks_always_belong_to_loaded_chunks() {
    let mut session = booted_session();
    let walk = TickInput {
        forward: 1.0,
        sprint: true,
        ..TickInput::default()
    };
    for _ in 0..240 {
        session.tick(&walk, DT).unwrap();
        let layout = session.terrain().layout();
        for (position, _) in session.terrain().world().iter() {
            let owner = layout.chunk_of_block(position);
            assert!(session.streamer().is_loaded(owner));
        }
        for pickup in session.pickups() {
            assert!(session.streamer().is_loaded(pickup.chunk));
        }
        for enemy in session.enemies() {
            assert!(session.streamer().is_loaded(enemy.chunk()));
        }
    }
}
