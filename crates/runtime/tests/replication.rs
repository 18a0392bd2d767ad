//! Server → transport → client replication through the public API.
use std::time::Duration;

use game_core::action::MoveData;
use game_core::fixtures::{self, BLUE, Fixture, INFANTRY, RED};
use game_core::{
    ActionIntent, EntityId, GameState, NullPresenter, PlanData, PlanFlags, PlanRecord, Position,
};
use runtime::{
    BatchSink, BatchSource, ChannelTransport, ClientRouter, Desync, Event, MatchEvent,
    OracleBundle, ReplayError, Runtime, RuntimeConfig, RuntimeError, ServerRouter,
    SkirmishProvider, TickBatch, Topic, TracingPresenter, TransportError, TurnEvent,
};

fn oracles(fixture: &Fixture) -> OracleBundle {
    OracleBundle::new(
        fixture.map.clone(),
        fixture.types.clone(),
        fixture.config.clone(),
    )
}

/// Two infantry per side on the 8x8 fixture board.
fn opening(fixture: &Fixture) -> GameState {
    let mut state = fixture.state();
    fixtures::place(&mut state, fixture, 1, RED, INFANTRY, (1, 1));
    fixtures::place(&mut state, fixture, 2, RED, INFANTRY, (2, 0));
    fixtures::place(&mut state, fixture, 3, BLUE, INFANTRY, (6, 6));
    fixtures::place(&mut state, fixture, 4, BLUE, INFANTRY, (5, 7));
    state
}

fn fast_config() -> RuntimeConfig {
    RuntimeConfig {
        server_tick_ms: 5,
        client_frame_ms: 1,
        command_buffer: 32,
        event_buffer: 4096,
        transport_buffer: 4096,
    }
}

#[tokio::test]
async fn replay_clients_converge_on_the_server_state() {
    let fixture = Fixture::skirmish();
    let mut runtime = Runtime::builder()
        .config(fast_config())
        .oracles(oracles(&fixture))
        .initial_state(opening(&fixture))
        .default_provider(SkirmishProvider)
        .replay_clients(2)
        .build()
        .await
        .unwrap();
    let mut turns = runtime.handle().subscribe(Topic::Turn);

    let played = runtime.run(30).await.unwrap();
    assert!(played > 0);

    let mut started = 0;
    while let Ok(event) = turns.try_recv() {
        if let Event::Turn(TurnEvent::TurnStarted { .. }) = event {
            started += 1;
        }
    }
    assert!(started >= played);

    let server = runtime.handle().query_state().await.unwrap();
    for client in runtime.clients() {
        let state = client.settle().await.unwrap();
        assert_eq!(state.state_root().unwrap(), server.state_root().unwrap());
    }

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn denied_intents_are_published() {
    let fixture = Fixture::skirmish();
    let runtime = Runtime::builder()
        .config(fast_config())
        .oracles(oracles(&fixture))
        .initial_state(opening(&fixture))
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    handle.begin_match().await.unwrap();
    let mut events = handle.subscribe(Topic::Match);
    handle
        .submit(ActionIntent::move_unit(RED, EntityId(1), fixtures::WALL))
        .await
        .unwrap();
    handle.pump_now().await.unwrap();

    let denial = loop {
        match events.recv().await.unwrap() {
            Event::Match(MatchEvent::IntentDenied(denial)) => break denial,
            _ => continue,
        }
    };
    assert_eq!(denial.reason, game_core::Rejection::Blocked(fixtures::WALL));

    let state = handle.query_state().await.unwrap();
    assert_eq!(state.unit(EntityId(1)).unwrap().position, Position::new(1, 1));
    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn shutdown_stops_workers_behind_live_handles() {
    let fixture = Fixture::skirmish();
    let runtime = Runtime::builder()
        .config(fast_config())
        .oracles(oracles(&fixture))
        .initial_state(opening(&fixture))
        .replay_clients(1)
        .build()
        .await
        .unwrap();
    let server = runtime.handle();
    let client = runtime.clients()[0].clone();

    tokio::time::timeout(Duration::from_secs(5), runtime.shutdown())
        .await
        .expect("workers outlived shutdown")
        .unwrap();

    assert!(matches!(
        server.query_state().await,
        Err(RuntimeError::CommandChannelClosed)
    ));
    assert!(matches!(
        client.settle().await,
        Err(RuntimeError::CommandChannelClosed)
    ));
}

#[tokio::test]
async fn batches_survive_the_wire() {
    let fixture = Fixture::skirmish();
    let initial = opening(&fixture);
    let transport = ChannelTransport::new(16);
    let mut receiver = transport.subscribe();

    let mut server = ServerRouter::new(initial.clone(), oracles(&fixture));
    let mut client = ClientRouter::new(initial, oracles(&fixture), TracingPresenter::new(0));

    server.begin_match().unwrap();
    server
        .submit(ActionIntent::move_unit(RED, EntityId(1), Position::new(1, 3)))
        .unwrap();
    server.submit(ActionIntent::end_turn(RED)).unwrap();
    server.pump();
    transport.send(&server.take_batch().unwrap()).await.unwrap();

    let batch = receiver.recv().await.unwrap();
    client.accept_batch(batch).unwrap();
    while !client.is_idle() {
        client.tick(16);
    }
    assert_eq!(client.state(), server.state());
}

#[tokio::test]
async fn unknown_units_desync_the_client() {
    let fixture = Fixture::skirmish();
    let initial = opening(&fixture);
    let transport = ChannelTransport::new(4);
    let mut receiver = transport.subscribe();
    let mut client = ClientRouter::new(initial.clone(), oracles(&fixture), NullPresenter);

    let phantom = PlanRecord::new(PlanData::Move(MoveData {
        entity: EntityId(42),
        actor: RED,
        path: vec![Position::new(0, 0), Position::new(0, 1)],
        flags: PlanFlags::CONSUMES_ACTION,
        trigger: None,
    }));
    transport
        .send(&TickBatch {
            plans: vec![phantom],
            events: Vec::new(),
        })
        .await
        .unwrap();

    let err = client
        .accept_batch(receiver.recv().await.unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        ReplayError::ProtocolDesync(Desync::UnknownEntity {
            entity: EntityId(42),
            ..
        })
    ));
    assert_eq!(client.state(), &initial);

    drop(transport);
    assert!(matches!(receiver.recv().await, Err(TransportError::Closed)));
}
