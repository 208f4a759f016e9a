//! # Scene Contract Tests
//!
//! Exercises the scheduling guarantees end to end:
//!
//! 1. **Ordering**: systems run in insertion order, strictly sequentially
//! 2. **Delivery**: messages posted during delivery wait exactly one pass
//! 3. **Commands**: only live, intersecting tags are reached
//! 4. **Handles**: destroyed handles stay invalid after slot reuse
//! 5. **Relay**: selected messages cross into a second scene

use glam::Vec3;
use tessera_core::{
    AccessError, Command, CommandTarget, Component, Director, EntityId, InputEvent, Message,
    MessageId, MessageRelay, Requirements, Scene, SceneContext, System, Transform,
};

// ============================================================================
// ORDERING
// ============================================================================

#[derive(Default)]
struct Counter {
    value: u32,
}

impl Component for Counter {}

/// Records what it reads and optionally bumps the counter.
struct Observer<const N: usize> {
    increments: bool,
    seen: Vec<u32>,
}

impl<const N: usize> Observer<N> {
    fn new(increments: bool) -> Self {
        Self {
            increments,
            seen: Vec::new(),
        }
    }
}

impl<const N: usize> System for Observer<N> {
    fn requirements(&self) -> Requirements {
        Requirements::new().with::<Counter>()
    }

    fn process(&mut self, entities: &[EntityId], ctx: &mut SceneContext<'_>) {
        for &entity in entities {
            let mut counter = ctx.world().component_mut::<Counter>(entity);
            self.seen.push(counter.value);
            if self.increments {
                counter.value += 1;
            }
        }
    }
}

#[test]
fn writes_are_visible_to_later_systems_same_tick() {
    let mut scene = Scene::with_capacity(8);
    scene.add_system(Observer::<1>::new(true));
    scene.add_system(Observer::<2>::new(false));
    scene.add_system(Observer::<3>::new(false));

    let e = scene.world_mut().create();
    scene.world_mut().add_component(e, Counter::default());

    scene.simulate(0.016);
    scene.simulate(0.016);

    // S1 sees its own write only on the next tick
    assert_eq!(scene.system::<Observer<1>>().unwrap().seen, vec![0, 1]);
    assert_eq!(scene.system::<Observer<2>>().unwrap().seen, vec![1, 2]);
    assert_eq!(scene.system::<Observer<3>>().unwrap().seen, vec![1, 2]);
}

// ============================================================================
// DELIVERY
// ============================================================================

const PING: MessageId = 1;
const PONG: MessageId = 2;

#[derive(Default, Debug, PartialEq)]
struct Ping {
    sequence: u32,
}

/// Answers every ping with a pong, from inside delivery.
struct Echo;

impl System for Echo {
    fn requirements(&self) -> Requirements {
        Requirements::new()
    }

    fn process(&mut self, _entities: &[EntityId], _ctx: &mut SceneContext<'_>) {}

    fn handle_message(&mut self, message: &Message, _: &[EntityId], ctx: &mut SceneContext<'_>) {
        if message.id() != PING {
            return;
        }
        if let Some(ping) = message.data::<Ping>() {
            let sequence = ping.sequence;
            ctx.post::<Ping>(PONG).sequence = sequence + 1;
        }
    }
}

/// Groups delivered ids by tick.
#[derive(Default)]
struct Recorder {
    current: Vec<MessageId>,
    ticks: Vec<Vec<MessageId>>,
}

impl System for Recorder {
    fn requirements(&self) -> Requirements {
        Requirements::new()
    }

    fn process(&mut self, _entities: &[EntityId], _ctx: &mut SceneContext<'_>) {
        self.ticks.push(std::mem::take(&mut self.current));
    }

    fn handle_message(&mut self, message: &Message, _: &[EntityId], _: &mut SceneContext<'_>) {
        self.current.push(message.id());
    }
}

#[derive(Default)]
struct DirectorLog {
    received: Vec<(MessageId, u32)>,
}

impl Director for DirectorLog {
    fn handle_message(&mut self, message: &Message, _ctx: &mut SceneContext<'_>) {
        if let Some(ping) = message.data::<Ping>() {
            self.received.push((message.id(), ping.sequence));
        }
    }
}

#[test]
fn messages_posted_during_delivery_wait_one_pass() {
    let mut scene = Scene::with_capacity(4);
    scene.add_system(Echo);
    scene.add_system(Recorder::default());
    scene.add_director(DirectorLog::default());

    scene.post_message::<Ping>(PING).sequence = 7;
    for _ in 0..3 {
        scene.simulate(0.016);
    }

    let recorder = scene.system::<Recorder>().unwrap();
    assert_eq!(recorder.ticks, vec![vec![PING], vec![PONG], vec![]]);

    let log = scene.director::<DirectorLog>().unwrap();
    assert_eq!(log.received, vec![(PING, 7), (PONG, 8)]);
}

#[test]
fn messages_posted_during_process_arrive_next_tick_in_order() {
    struct Poster;

    impl System for Poster {
        fn requirements(&self) -> Requirements {
            Requirements::new()
        }

        fn process(&mut self, _: &[EntityId], ctx: &mut SceneContext<'_>) {
            ctx.post_value(10, ());
            ctx.post_value(11, ());
        }
    }

    let mut scene = Scene::with_capacity(4);
    scene.add_system(Recorder::default());
    scene.add_system(Poster);

    scene.simulate(0.016);
    scene.simulate(0.016);

    let recorder = scene.system::<Recorder>().unwrap();
    assert_eq!(recorder.ticks, vec![vec![], vec![10, 11]]);
}

#[test]
fn inactive_systems_still_receive_messages() {
    let mut scene = Scene::with_capacity(4);
    scene.add_system(Recorder::default());
    scene.set_system_active::<Recorder>(false);

    scene.post_message::<Ping>(PING);
    scene.simulate(0.016);

    let recorder = scene.system::<Recorder>().unwrap();
    assert_eq!(recorder.current, vec![PING]);
    assert!(recorder.ticks.is_empty());
}

// ============================================================================
// COMMANDS
// ============================================================================

#[derive(Default)]
struct Broadcaster {
    flags: u32,
    reached: Vec<EntityId>,
}

impl Director for Broadcaster {
    fn process(&mut self, ctx: &mut SceneContext<'_>) {
        let reached = &mut self.reached;
        let mut cmd = Command::new(self.flags, |entity, world, dt| {
            reached.push(entity);
            if let Some(mut tx) = world.get_mut::<Transform>(entity) {
                tx.translate(Vec3::Y * dt);
            }
        });
        ctx.send_command(&mut cmd);
    }
}

#[test]
fn commands_reach_exactly_the_intersecting_tags() {
    let mut scene = Scene::with_capacity(16);
    scene.add_director(Broadcaster {
        flags: 0b100,
        reached: Vec::new(),
    });

    let world = scene.world_mut();
    let mut spawn = |flags: Option<u32>| {
        let e = world.create();
        world.add_component(e, Transform::default());
        if let Some(flags) = flags {
            world.add_component(e, CommandTarget::new(flags));
        }
        e
    };
    let exact = spawn(Some(0b100));
    let overlap = spawn(Some(0b110));
    let _other = spawn(Some(0b001));
    let _untagged = spawn(None);
    let dead = spawn(Some(0b100));
    world.destroy(dead);

    scene.simulate(1.0);

    let director = scene.director::<Broadcaster>().unwrap();
    assert_eq!(director.reached, vec![exact, overlap]);
    assert_eq!(scene.world().component::<Transform>(exact).position, Vec3::Y);
    assert_eq!(scene.dispatch_stats().invocations, 2);
}

// ============================================================================
// INPUT
// ============================================================================

#[derive(Default)]
struct KeyLog {
    pressed: Vec<u32>,
}

impl Director for KeyLog {
    fn handle_event(&mut self, event: &InputEvent, _ctx: &mut SceneContext<'_>) {
        if let InputEvent::KeyPressed { code } = *event {
            self.pressed.push(code);
        }
    }
}

#[test]
fn input_is_forwarded_immediately() {
    let mut scene = Scene::with_capacity(4);
    scene.add_director(KeyLog::default());
    scene.forward_event(&InputEvent::KeyPressed { code: 32 });
    scene.forward_event(&InputEvent::KeyReleased { code: 32 });
    assert_eq!(scene.director::<KeyLog>().unwrap().pressed, vec![32]);
}

// ============================================================================
// HANDLES
// ============================================================================

#[test]
fn destroyed_handles_stay_invalid_after_reuse() {
    let mut scene = Scene::with_capacity(2);
    let world = scene.world_mut();

    let old = world.create();
    world.add_component(old, Transform::default());
    assert!(world.destroy(old));
    assert!(!world.is_valid(old));

    let new = world.create();
    assert_eq!(new.index(), old.index());
    assert_ne!(new.generation(), old.generation());
    assert!(!world.is_valid(old));

    assert_eq!(
        world.try_component::<Transform>(old).err(),
        Some(AccessError::StaleHandle(old))
    );
    assert!(matches!(
        world.try_component::<Transform>(new),
        Err(AccessError::MissingComponent { .. })
    ));
}

// ============================================================================
// RELAY
// ============================================================================

#[test]
fn relay_forwards_selected_ids_to_second_scene() {
    let relay = MessageRelay::new(16);
    let receiver = relay.receiver();

    let mut game = Scene::with_capacity(4);
    game.attach_relay(relay.sender(), &[PING]);

    let mut hud = Scene::with_capacity(4);
    hud.add_system(Recorder::default());

    game.post_message::<Ping>(PING).sequence = 1;
    game.post_message::<Ping>(PONG).sequence = 2;
    game.simulate(0.016);

    for message in receiver.drain() {
        hud.forward_message(message);
    }
    hud.simulate(0.016);

    assert_eq!(hud.system::<Recorder>().unwrap().ticks, vec![vec![PING]]);
}
