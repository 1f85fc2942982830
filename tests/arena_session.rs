//! End-to-end tests: the session actor through its public API, and the
//! WebSocket server over a real socket.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use uuid::Uuid;

use duel_arena::game::tuning::{BLUE_START, MAX_HEALTH, RED_START};
use duel_arena::network::{
    ArenaSession, ClientMessage, GameServer, Role, ServerConfig, ServerMessage, SessionInput,
};
use duel_arena::{PlayerSlot, Vec2};

fn connect(session: &mut ArenaSession, port: u16) -> (Uuid, mpsc::Receiver<ServerMessage>) {
    let (tx, rx) = mpsc::channel(1024);
    let id = Uuid::new_v4();
    session.handle(SessionInput::Connected {
        id,
        addr: format!("10.0.0.1:{port}").parse().unwrap(),
        sender: tx,
    });
    (id, rx)
}

fn send(session: &mut ArenaSession, id: Uuid, message: ClientMessage) {
    session.handle(SessionInput::Message { id, message });
}

fn drain(rx: &mut mpsc::Receiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

#[test]
fn test_match_flow_through_session() {
    let mut session = ArenaSession::new(2024);
    let (display, mut display_rx) = connect(&mut session, 1);
    let (red, mut red_rx) = connect(&mut session, 2);
    let (blue, mut blue_rx) = connect(&mut session, 3);

    send(&mut session, display, ClientMessage::Register { role: Role::Display, player: None });
    send(&mut session, red, ClientMessage::Register { role: Role::Player, player: None });
    send(&mut session, blue, ClientMessage::Register { role: Role::Player, player: None });

    assert!(matches!(drain(&mut red_rx)[..], [ServerMessage::PlayerAssigned { player: PlayerSlot::Red }]));
    assert!(matches!(drain(&mut blue_rx)[..], [ServerMessage::PlayerAssigned { player: PlayerSlot::Blue }]));

    // Both step up out of line with the ball, then stop
    for _ in 0..10 {
        send(&mut session, red, ClientMessage::Move { angle: 90.0, power: 1.0 });
        send(&mut session, blue, ClientMessage::Move { angle: 90.0, power: 1.0 });
        session.run_tick();
    }
    send(&mut session, red, ClientMessage::Move { angle: 90.0, power: 0.0 });
    send(&mut session, blue, ClientMessage::Move { angle: 90.0, power: 0.0 });

    // Red fires straight at blue
    send(&mut session, red, ClientMessage::Shoot { is_super: false });
    for _ in 0..30 {
        session.run_tick();
    }

    let blue_state = session.state().player(PlayerSlot::Blue);
    assert_eq!(blue_state.health, MAX_HEALTH - 10);
    assert!(blue_state.freeze > 0);

    let messages = drain(&mut display_rx);
    assert!(matches!(messages[0], ServerMessage::Init { .. }));
    let updates: Vec<_> = messages
        .iter()
        .filter_map(|m| match m {
            ServerMessage::Update(snapshot) => Some(snapshot),
            _ => None,
        })
        .collect();
    assert_eq!(updates.len(), 40);
    let last = updates[updates.len() - 1];
    assert_eq!(last.tick, 40);
    assert_eq!(last.players[1].health, MAX_HEALTH - 10);
    assert!(last.bullets.is_empty());
}

#[test]
fn test_controller_replaced_after_disconnect() {
    let mut session = ArenaSession::new(7);
    let (first, _first_rx) = connect(&mut session, 1);
    send(&mut session, first, ClientMessage::Register { role: Role::Player, player: Some(PlayerSlot::Blue) });
    send(&mut session, first, ClientMessage::Move { angle: 180.0, power: 1.0 });
    session.run_tick();
    let moved = session.state().player(PlayerSlot::Blue).position;
    assert!(moved.x < BLUE_START.x);

    session.handle(SessionInput::Disconnected { id: first });
    session.run_tick();

    let (second, mut second_rx) = connect(&mut session, 2);
    send(&mut session, second, ClientMessage::Register { role: Role::Player, player: Some(PlayerSlot::Blue) });
    assert!(matches!(drain(&mut second_rx)[..], [ServerMessage::PlayerAssigned { player: PlayerSlot::Blue }]));

    // The simulation kept running and the state was not reset
    assert_eq!(session.state().tick, 2);
    assert_eq!(session.state().player(PlayerSlot::Red).position, RED_START);
    assert_ne!(session.state().player(PlayerSlot::Blue).position, BLUE_START);
}

#[test]
fn test_explosive_goal_through_commands() {
    let mut session = ArenaSession::new(11);
    let (red, _red_rx) = connect(&mut session, 1);
    let (blue, _blue_rx) = connect(&mut session, 2);
    send(&mut session, red, ClientMessage::Register { role: Role::Player, player: Some(PlayerSlot::Red) });
    send(&mut session, blue, ClientMessage::Register { role: Role::Player, player: Some(PlayerSlot::Blue) });

    // Blue lays dynamite right next to the ball; red lays one far away
    send(&mut session, blue, ClientMessage::PlaceDynamite { x: Some(0.5), y: Some(0.5) });
    send(&mut session, red, ClientMessage::PlaceDynamite { x: Some(0.2), y: Some(0.8) });
    assert_eq!(session.state().dynamites.len(), 2);

    // Red runs onto it
    let mut scored = false;
    for _ in 0..40 {
        send(&mut session, red, ClientMessage::Move { angle: 0.0, power: 1.0 });
        if session.run_tick().score_changed {
            scored = true;
            break;
        }
    }

    assert!(scored);
    assert_eq!(session.state().score.blue, 1);
    assert!(session.state().dynamites.is_empty());
    // No round reset: red is still near the centre
    assert!(session.state().player(PlayerSlot::Red).position.distance(Vec2::new(0.5, 0.5)) < 0.1);
}

#[tokio::test]
async fn test_websocket_roundtrip() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = Arc::new(GameServer::new(ServerConfig {
        rng_seed: Some(1),
        ..Default::default()
    }));
    let running = server.clone();
    let handle = tokio::spawn(async move { running.serve(listener).await });

    let (mut display, _) = connect_async(format!("ws://{addr}")).await.unwrap();
    display
        .send(Message::Text(r#"{"type":"register","role":"display"}"#.to_string()))
        .await
        .unwrap();

    let (mut phone, _) = connect_async(format!("ws://{addr}")).await.unwrap();
    phone
        .send(Message::Text(r#"{"role":"mobile","angle":0,"power":1}"#.to_string()))
        .await
        .unwrap();

    let reply = tokio::time::timeout(Duration::from_secs(2), phone.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let Message::Text(text) = reply else {
        panic!("expected text frame");
    };
    assert!(matches!(
        ServerMessage::from_json(&text).unwrap(),
        ServerMessage::PlayerAssigned { player: PlayerSlot::Red }
    ));

    let mut saw_init = false;
    let mut saw_update = false;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !(saw_init && saw_update) {
        let frame = tokio::time::timeout_at(deadline, display.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let Message::Text(text) = frame {
            match ServerMessage::from_json(&text).unwrap() {
                ServerMessage::Init { .. } => saw_init = true,
                ServerMessage::Update(_) if saw_init => saw_update = true,
                _ => {}
            }
        }
    }

    server.shutdown();
    let result = tokio::time::timeout(Duration::from_secs(2), handle).await;
    assert!(matches!(result, Ok(Ok(Ok(())))));
}
