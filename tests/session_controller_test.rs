//! Session controller behavior against an in-memory server.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Call, FakeServer, Fixture, after_center_move, controller, target};
use strictly_ultimate::{
    ActiveSubBoard, Activity, BoardView, ClientError, ClientErrorKind, Dispatch, GameId,
    GameState, Intent, Mark, Outcome, SessionController, SessionPhase, SkipReason,
};

fn g1() -> GameId {
    GameId::new("g1")
}

#[tokio::test]
async fn test_start_loads_fresh_board() {
    let server = FakeServer::new();
    let session = controller(&server);
    assert_eq!(session.phase(), SessionPhase::Uninitialized);

    let outcome = session.start().await.expect("start failed");
    assert_eq!(outcome, Dispatch::Sent);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.game_id, Some(g1()));
    assert_eq!(snapshot.state, Some(GameState::new()));
    assert!(!snapshot.pending);
    assert_eq!(snapshot.phase, SessionPhase::Ready);
    assert!(session.is_pinging());
    assert_eq!(server.mutations(), vec![Call::Create, Call::Fetch(g1())]);

    let BoardView::Board(game) = BoardView::render(&snapshot) else {
        panic!("expected a board");
    };
    let playable = game
        .sub_boards()
        .iter()
        .flat_map(|sub| sub.cells())
        .filter(|cell| cell.playable())
        .count();
    assert_eq!(playable, 81);
    assert!(game.sub_boards().iter().all(|sub| !sub.highlighted()));
}

#[tokio::test]
async fn test_start_twice_is_skipped() {
    let server = FakeServer::new();
    let session = controller(&server);
    session.start().await.expect("start failed");

    let second = session.start().await.expect("second start failed");
    assert_eq!(second, Dispatch::Skipped(SkipReason::AlreadyStarted));
    assert_eq!(server.mutations(), vec![Call::Create, Call::Fetch(g1())]);
}

#[tokio::test]
async fn test_submit_move_applies_server_state() {
    let server = FakeServer::new();
    let session = controller(&server);
    session.start().await.expect("start failed");

    server.queue(Ok(after_center_move().build()));
    let outcome = session.submit_move(4, 4).await.expect("move failed");
    assert_eq!(outcome, Dispatch::Sent);
    assert_eq!(server.mutations().last(), Some(&Call::Play(g1(), 40)));

    let BoardView::Board(game) = BoardView::render(&session.snapshot()) else {
        panic!("expected a board");
    };
    assert_eq!(game.cell(target(4, 4)).symbol(), "X");
    assert_eq!(*game.sub_boards()[4].activity(), Activity::ActivePlayable);
    assert_eq!(*game.sub_boards()[0].activity(), Activity::Inactive);
    assert_eq!(game.status(), "Next player: O");
    assert_eq!(game.steps().len(), 2);
}

#[tokio::test]
async fn test_move_outside_active_sub_board_is_not_sent() {
    let server = FakeServer::with_state(after_center_move().build());
    let session = controller(&server);
    session.start().await.expect("start failed");

    let outcome = session.submit_move(0, 0).await.expect("move failed");
    assert_eq!(outcome, Dispatch::Skipped(SkipReason::InactiveSubBoard));
    assert!(!server.mutations().iter().any(|c| matches!(c, Call::Play(..))));
    assert_eq!(session.snapshot().state, Some(after_center_move().build()));
}

#[tokio::test]
async fn test_out_of_bounds_move_is_not_sent() {
    let server = FakeServer::new();
    let session = controller(&server);
    session.start().await.expect("start failed");

    let outcome = session.submit_move(9, 0).await.expect("move failed");
    assert_eq!(outcome, Dispatch::Skipped(SkipReason::OutOfBounds));
    assert_eq!(server.mutations().len(), 2);
}

#[tokio::test]
async fn test_move_after_game_over_is_not_sent() {
    let finished = Fixture::new()
        .winner(Outcome::Won(Mark::O))
        .history(30)
        .build();
    let server = FakeServer::with_state(finished);
    let session = controller(&server);
    session.start().await.expect("start failed");

    let outcome = session.submit_move(4, 4).await.expect("move failed");
    assert_eq!(outcome, Dispatch::Skipped(SkipReason::GameOver));
    assert!(!server.mutations().iter().any(|c| matches!(c, Call::Play(..))));
}

#[tokio::test]
async fn test_ai_move_allowed_after_game_over() {
    // The server decides what an AI move means for a finished game.
    let finished = Fixture::new().winner(Outcome::Draw).build();
    let server = FakeServer::with_state(finished);
    let session = controller(&server);
    session.start().await.expect("start failed");

    let outcome = session.request_ai_move().await.expect("ai move failed");
    assert_eq!(outcome, Dispatch::Sent);
    assert_eq!(server.mutations().last(), Some(&Call::PlayAi(g1())));
}

#[tokio::test]
async fn test_single_request_in_flight() {
    let server = FakeServer::new();
    let session = controller(&server);
    session.start().await.expect("start failed");

    let gate = server.gate();
    server.queue(Ok(after_center_move().build()));
    let first = tokio::spawn({
        let session = session.clone();
        async move { session.submit_move(4, 4).await }
    });
    gate.entered().await;

    assert!(session.is_pending());
    assert_eq!(session.phase(), SessionPhase::Mutating);
    assert_eq!(BoardView::render(&session.snapshot()), BoardView::Loading);

    let pending = Dispatch::Skipped(SkipReason::Pending);
    assert_eq!(session.submit_move(4, 0).await.expect("move failed"), pending);
    assert_eq!(session.request_ai_move().await.expect("ai failed"), pending);
    assert_eq!(session.jump_to_step(0).await.expect("jump failed"), pending);
    assert_eq!(session.terminate().await.expect("terminate failed"), pending);

    gate.release();
    let outcome = first.await.expect("task panicked").expect("move failed");
    assert_eq!(outcome, Dispatch::Sent);
    assert!(!session.is_pending());

    let plays = server
        .mutations()
        .into_iter()
        .filter(|c| !matches!(c, Call::Create | Call::Fetch(_)))
        .collect::<Vec<_>>();
    assert_eq!(plays, vec![Call::Play(g1(), 40)]);
}

#[tokio::test]
async fn test_jump_to_start_restores_empty_board() {
    let midgame = after_center_move()
        .cell(target(4, 0), Mark::O)
        .active(ActiveSubBoard::Board(0))
        .player(Mark::X)
        .history(3)
        .build();
    let server = FakeServer::with_state(midgame);
    let session = controller(&server);
    session.start().await.expect("start failed");

    server.queue(Ok(Fixture::new().history(3).build()));
    let outcome = session.jump_to_step(0).await.expect("jump failed");
    assert_eq!(outcome, Dispatch::Sent);
    assert_eq!(server.mutations().last(), Some(&Call::Jump(g1(), 0)));

    let BoardView::Board(game) = BoardView::render(&session.snapshot()) else {
        panic!("expected a board");
    };
    assert!(
        game.sub_boards()
            .iter()
            .flat_map(|sub| sub.cells())
            .all(|cell| cell.symbol().is_empty())
    );
    // History is whatever the server reports; nothing is truncated locally.
    assert_eq!(game.steps().len(), 3);
}

#[tokio::test]
async fn test_jump_twice_is_idempotent() {
    let server = FakeServer::with_state(after_center_move().history(3).build());
    let session = controller(&server);
    session.start().await.expect("start failed");

    let rewound = Fixture::new().history(3).build();
    server.queue(Ok(rewound.clone()));
    session.jump_to_step(0).await.expect("first jump failed");
    let first = session.snapshot();

    session.jump_to_step(0).await.expect("second jump failed");
    let second = session.snapshot();

    assert_eq!(first, second);
    assert_eq!(second.state, Some(rewound));
}

#[tokio::test]
async fn test_jump_beyond_current_step_is_not_sent() {
    let server = FakeServer::with_state(after_center_move().build());
    let session = controller(&server);
    session.start().await.expect("start failed");

    let outcome = session.jump_to_step(2).await.expect("jump failed");
    assert_eq!(outcome, Dispatch::Skipped(SkipReason::StepOutOfRange));
    assert!(!server.mutations().iter().any(|c| matches!(c, Call::Jump(..))));
}

#[tokio::test]
async fn test_server_error_keeps_cached_state() {
    let server = FakeServer::new();
    let session = controller(&server);
    session.start().await.expect("start failed");

    server.queue(Err(ClientError::server(400, "Error: Illegal move.")));
    let err = session.submit_move(4, 4).await.expect_err("move should fail");
    assert_eq!(err.kind, ClientErrorKind::Server { status: 400 });

    let snapshot = session.snapshot();
    assert!(!snapshot.pending);
    assert_eq!(snapshot.phase, SessionPhase::Ready);
    assert_eq!(snapshot.state, Some(GameState::new()));
    assert_eq!(snapshot.last_error.as_deref(), Some("Error: Illegal move."));

    server.queue(Ok(after_center_move().build()));
    session.submit_move(4, 4).await.expect("retry failed");
    assert_eq!(session.snapshot().last_error, None);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_clears_pending() {
    let server = FakeServer::new();
    let session = controller(&server);
    session.start().await.expect("start failed");

    server.hang_mutations();
    let err = session.submit_move(4, 4).await.expect_err("move should time out");
    assert_eq!(err.kind, ClientErrorKind::Timeout);

    let snapshot = session.snapshot();
    assert!(!snapshot.pending);
    assert_eq!(snapshot.phase, SessionPhase::Ready);
    assert_eq!(snapshot.state, Some(GameState::new()));
}

#[tokio::test]
async fn test_cancelled_request_clears_pending() {
    let server = FakeServer::new();
    let session = SessionController::new(
        Arc::clone(&server),
        Duration::from_secs(60),
        Duration::from_secs(60),
    );
    session.start().await.expect("start failed");

    let gate = server.gate();
    let task = tokio::spawn({
        let session = session.clone();
        async move { session.request_ai_move().await }
    });
    gate.entered().await;
    assert!(session.is_pending());

    task.abort();
    let _ = task.await;
    assert!(!session.is_pending());
    assert_eq!(session.phase(), SessionPhase::Ready);
}

#[tokio::test]
async fn test_failed_create_leaves_session_uninitialized() {
    let server = FakeServer::new();
    server.fail_next_create(ClientError::network("connection refused"));
    let session = controller(&server);

    let err = session.start().await.expect_err("start should fail");
    assert_eq!(err.kind, ClientErrorKind::Network);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Uninitialized);
    assert_eq!(snapshot.game_id, None);
    assert!(!snapshot.pending);
    assert!(!session.is_pinging());
    assert_eq!(BoardView::render(&snapshot), BoardView::Empty);

    session.start().await.expect("retry failed");
    assert_eq!(session.phase(), SessionPhase::Ready);
}

#[tokio::test]
async fn test_failed_fetch_retries_with_same_game() {
    let server = FakeServer::new();
    server.fail_next_fetch(ClientError::server(404, "not found"));
    let session = controller(&server);

    session.start().await.expect_err("start should fail");
    let snapshot = session.snapshot();
    assert_eq!(snapshot.game_id, Some(g1()));
    assert_eq!(snapshot.state, None);
    assert_eq!(snapshot.phase, SessionPhase::Uninitialized);

    session.start().await.expect("retry failed");
    assert_eq!(
        server.mutations(),
        vec![Call::Create, Call::Fetch(g1()), Call::Fetch(g1())]
    );
}

#[tokio::test]
async fn test_operations_before_start_are_skipped() {
    let server = FakeServer::new();
    let session = controller(&server);

    let not_ready = Dispatch::Skipped(SkipReason::NotReady);
    assert_eq!(session.submit_move(4, 4).await.expect("move"), not_ready);
    assert_eq!(session.request_ai_move().await.expect("ai"), not_ready);
    assert_eq!(session.jump_to_step(0).await.expect("jump"), not_ready);
    assert_eq!(session.terminate().await.expect("terminate"), not_ready);
    assert!(server.calls().is_empty());
}

#[tokio::test]
async fn test_terminate_clears_session() {
    let server = FakeServer::new();
    let session = controller(&server);
    session.start().await.expect("start failed");

    let outcome = session.terminate().await.expect("terminate failed");
    assert_eq!(outcome, Dispatch::Sent);
    assert_eq!(server.mutations().last(), Some(&Call::Delete(g1())));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.game_id, None);
    assert_eq!(snapshot.state, None);
    assert_eq!(snapshot.phase, SessionPhase::Terminated);
    assert!(!session.is_pinging());
    assert_eq!(BoardView::render(&snapshot), BoardView::Empty);

    assert_eq!(
        session.submit_move(4, 4).await.expect("move"),
        Dispatch::Skipped(SkipReason::NotReady)
    );
    assert_eq!(
        session.start().await.expect("start"),
        Dispatch::Skipped(SkipReason::AlreadyStarted)
    );
    assert_eq!(
        session.terminate().await.expect("terminate"),
        Dispatch::Skipped(SkipReason::NotReady)
    );
}

#[tokio::test]
async fn test_dispatch_routes_intents() {
    let server = FakeServer::new();
    let session = controller(&server);
    session.start().await.expect("start failed");

    server.queue(Ok(after_center_move().build()));
    session
        .dispatch(Intent::SubmitMove(target(4, 4)))
        .await
        .expect("move failed");
    session
        .dispatch(Intent::RequestAiMove)
        .await
        .expect("ai move failed");
    session
        .dispatch(Intent::JumpToStep(0))
        .await
        .expect("jump failed");

    assert_eq!(
        server.mutations()[2..],
        [Call::Play(g1(), 40), Call::PlayAi(g1()), Call::Jump(g1(), 0)]
    );
}

#[tokio::test]
async fn test_start_in_flight_rejects_everything() {
    let server = FakeServer::new();
    let gate = server.gate();
    let session = controller(&server);

    let starting = tokio::spawn({
        let session = session.clone();
        async move { session.start().await }
    });
    gate.entered().await;

    assert_eq!(session.phase(), SessionPhase::Initializing);
    assert_eq!(BoardView::render(&session.snapshot()), BoardView::Loading);

    let pending = Dispatch::Skipped(SkipReason::Pending);
    assert_eq!(session.start().await.expect("start"), pending);
    assert_eq!(session.submit_move(4, 4).await.expect("move"), pending);
    assert_eq!(session.request_ai_move().await.expect("ai"), pending);
    assert_eq!(session.jump_to_step(0).await.expect("jump"), pending);
    assert_eq!(session.terminate().await.expect("terminate"), pending);

    // Create answers, then the fetch parks at the same gate.
    gate.release();
    gate.entered().await;
    assert_eq!(session.phase(), SessionPhase::Initializing);
    assert_eq!(session.submit_move(4, 4).await.expect("move"), pending);

    gate.release();
    let outcome = starting.await.expect("task panicked").expect("start failed");
    assert_eq!(outcome, Dispatch::Sent);
    assert_eq!(session.phase(), SessionPhase::Ready);
    assert_eq!(server.mutations(), vec![Call::Create, Call::Fetch(g1())]);
}

#[tokio::test]
async fn test_close_waits_for_start_then_deletes() {
    let server = FakeServer::new();
    let gate = server.gate();
    let session = controller(&server);

    let starting = tokio::spawn({
        let session = session.clone();
        async move { session.start().await }
    });
    gate.entered().await;

    let closing = tokio::spawn({
        let session = session.clone();
        async move { session.close(Duration::from_secs(10)).await }
    });
    gate.release();
    gate.entered().await;
    gate.release();

    starting.await.expect("task panicked").expect("start failed");
    let outcome = closing.await.expect("task panicked").expect("close failed");
    assert_eq!(outcome, Dispatch::Sent);
    assert_eq!(server.mutations().last(), Some(&Call::Delete(g1())));
    assert_eq!(session.phase(), SessionPhase::Terminated);
}

#[tokio::test(start_paused = true)]
async fn test_close_gives_up_while_start_in_flight() {
    let server = FakeServer::new();
    let gate = server.gate();
    let session = SessionController::new(
        Arc::clone(&server),
        Duration::from_secs(60),
        Duration::from_secs(60),
    );

    let _starting = tokio::spawn({
        let session = session.clone();
        async move { session.start().await }
    });
    gate.entered().await;

    let outcome = session.close(Duration::from_secs(1)).await.expect("close failed");
    assert_eq!(outcome, Dispatch::Skipped(SkipReason::Pending));
    assert!(!server.mutations().iter().any(|c| matches!(c, Call::Delete(_))));
    assert_eq!(session.phase(), SessionPhase::Initializing);
}
