//! Integration tests for decoding the simulator's message stream.

use arena_events::{decode_envelope, ArenaMessage, Basket, EntityId, RobotCameraModel};

fn frames() -> Vec<&'static str> {
    include_str!("fixtures/state_stream.jsonl")
        .lines()
        .filter(|l| !l.trim().is_empty())
        .collect()
}

/// Test that the constants fixture decodes and validates.
#[test]
fn test_parse_constants_fixture() {
    let json = include_str!("fixtures/constants.json");
    let Some(ArenaMessage::Constants(constants)) = decode_envelope(json).unwrap() else {
        panic!("expected constants");
    };

    constants.validate().unwrap();
    assert!((constants.competition_area_width - 4.6).abs() < 1e-6);
    assert_eq!(constants.robot_camera_fov, 45.0);
    assert!((constants.robot_camera_aspect - 16.0 / 9.0).abs() < 1e-6);
}

/// Test that the stream decodes frame by frame, skipping unknown tags.
#[test]
fn test_parse_state_stream() {
    let decoded: Vec<_> = frames()
        .into_iter()
        .map(|frame| decode_envelope(frame).unwrap())
        .collect();

    assert_eq!(decoded.len(), 4);
    assert!(decoded[2].is_none(), "vision frames are not for viewers");

    let states: Vec<_> = decoded
        .into_iter()
        .flatten()
        .map(|msg| match msg {
            ArenaMessage::State(state) => state,
            other => panic!("unexpected message: {:?}", other),
        })
        .collect();

    assert_eq!(states.len(), 3);
    for state in &states {
        assert_eq!(state.robots.len(), 2);
        assert_eq!(state.balls.len(), 3);
    }
    assert_eq!(states[1].robots[0].id, EntityId::from("r1"));
}

/// Test that every robot in the first frame starts facing into the field
/// with at least one basket or ball in view.
#[test]
fn test_starting_robots_see_the_field() {
    let Some(ArenaMessage::Constants(constants)) =
        decode_envelope(include_str!("fixtures/constants.json")).unwrap()
    else {
        panic!("expected constants");
    };
    let Some(ArenaMessage::State(state)) = decode_envelope(frames()[0]).unwrap() else {
        panic!("expected state");
    };

    let model = RobotCameraModel::new(&constants);
    for robot in &state.robots {
        let baskets = model.visible_baskets(robot, &constants);
        let balls = model.visible_balls(robot, &state.balls, &constants);
        assert!(
            !baskets.is_empty() || !balls.is_empty(),
            "robot {} sees nothing",
            robot.id
        );
    }
}

/// Test basket placement helpers against the fixture arena.
#[test]
fn test_basket_positions() {
    let Some(ArenaMessage::Constants(constants)) =
        decode_envelope(include_str!("fixtures/constants.json")).unwrap()
    else {
        panic!("expected constants");
    };

    assert!((Basket::Magenta.backboard_x(&constants) + 2.3).abs() < 1e-6);
    assert!((Basket::Blue.tube_center_x(&constants) - 2.22).abs() < 1e-6);
}
