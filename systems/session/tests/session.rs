use dimlight_core::{Direction, Event, Intent};
use dimlight_system_session::{GameSession, DEFAULT_WORLD_SEED};
use dimlight_world::query;

#[test]
fn unseeded_sessions_use_the_documented_default() {
    let session = GameSession::new(None);
    assert_eq!(session.seed(), DEFAULT_WORLD_SEED);

    let seeded = GameSession::new(Some(77));
    assert_eq!(seeded.seed(), 77);
}

#[test]
fn unseeded_sessions_are_reproducible() {
    let mut first = GameSession::new(None);
    let mut second = GameSession::new(None);

    let script = [
        Intent::Move(Direction::East),
        Intent::Move(Direction::South),
        Intent::Interact,
        Intent::Move(Direction::North),
    ];

    for intent in script {
        let first_events: Vec<Event> = first.play_turn(intent).to_vec();
        let second_events: Vec<Event> = second.play_turn(intent).to_vec();
        assert_eq!(first_events, second_events);
    }

    assert_eq!(
        query::player_position(first.world()),
        query::player_position(second.world())
    );
}

#[test]
fn a_fresh_session_lights_the_spawn_area() {
    let session = GameSession::new(Some(5));
    let spawn = query::player_position(session.world());

    assert!(query::is_lit(session.world(), spawn));
    assert!(query::is_mapped(session.world(), spawn));
    assert!(!session.player_dead());
}

#[test]
fn play_turn_reports_the_events_it_returned() {
    let mut session = GameSession::new(Some(5));
    let events: Vec<Event> = session.play_turn(Intent::Move(Direction::East)).to_vec();

    assert_eq!(session.last_events(), events.as_slice());
    assert!(
        matches!(events.last(), Some(Event::VisibilityRefreshed { .. })),
        "a played turn closes with a visibility refresh"
    );
}

#[test]
fn render_queries_cover_the_lit_viewport() {
    let session = GameSession::new(Some(5));
    let center = query::player_position(session.world());
    let radius = query::player_light_radius(session.world()).ceil() as i32;

    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let position = dimlight_core::Position::new(center.x() + dx, center.y() + dy);
            if query::is_lit(session.world(), position) {
                let tile = query::tile(session.world(), position)
                    .expect("lit tiles always have a generated chunk");
                assert!(tile.lit);
                assert!(tile.mapped);
            }
        }
    }
}
