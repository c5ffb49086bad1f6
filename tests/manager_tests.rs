use std::sync::Arc;

use scout_engine::domain::player::PlayerState;
use scout_engine::domain::rules::RulesConfig;
use scout_engine::domain::table::TableState;
use scout_engine::domain::TableId;
use scout_engine::engine::{
    DrawRequest, EngineError, GameTable, ManagerError, TableEvent, TableManager, TurnAction,
    TurnActionKind,
};
use scout_engine::infra::{DeterministicRng, RecordingEventSink};

const SEED: u64 = 42;

fn make_manager() -> (TableManager<DeterministicRng>, Arc<RecordingEventSink>) {
    let sink = Arc::new(RecordingEventSink::new());
    let manager = TableManager::new(
        RulesConfig::standard(),
        |id| DeterministicRng::for_table(SEED, id),
        sink.clone(),
    )
    .unwrap();
    (manager, sink)
}

/// Стол с игроками `names`: первый создаёт, остальные подсаживаются.
fn seat_all(manager: &TableManager<DeterministicRng>, names: &[String]) -> TableId {
    let (table_id, _) = manager.join(&names[0], None).unwrap();
    for name in &names[1..] {
        manager.join(name, Some(table_id)).unwrap();
    }
    table_id
}

/// Ход бота: самая длинная комбинация, которая бьёт стол, иначе добор сверху.
fn bot_action(game: &GameTable, actor: &str) -> TurnAction {
    let player = game.table.player(actor).unwrap();
    let round = game.round.as_ref().unwrap();
    let len = player.hand.len();
    for size in (1..=len).rev() {
        for begin in 0..=(len - size) {
            if let Ok(combo) = player.select_range(begin, begin + size, &round.pool) {
                if combo.is_playable() && combo.outranks(&round.displayed) {
                    return TurnAction {
                        player: actor.to_string(),
                        kind: TurnActionKind::Play {
                            begin,
                            end: begin + size,
                        },
                    };
                }
            }
        }
    }
    TurnAction {
        player: actor.to_string(),
        kind: TurnActionKind::Draw(DrawRequest {
            from_top: true,
            flip: false,
            insert_at: 0,
        }),
    }
}

/// Посадить, раздать, сыграть ботами до конца раунда (или до лимита ходов).
fn run_bot_table(manager: &TableManager<DeterministicRng>, names: &[String]) -> TableId {
    let table_id = seat_all(manager, names);
    for name in names {
        manager.ready(name).unwrap();
    }
    for name in names {
        manager.choose_orientation(name, false).unwrap();
    }

    for _ in 0..500 {
        let game = manager.snapshot(table_id).unwrap();
        if game.state() != TableState::Playing {
            break;
        }
        let actor = game
            .table
            .seats
            .iter()
            .find(|p| p.state == PlayerState::OnTurn)
            .map(|p| p.name.clone())
            .unwrap();
        manager.apply_turn(&bot_action(&game, &actor)).unwrap();
    }
    table_id
}

fn names(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| format!("{prefix}{i}")).collect()
}

// ----------------------
// посадка через менеджер
// ----------------------

#[test]
fn join_without_id_creates_table() {
    let (manager, _) = make_manager();
    let (first, _) = manager.join("alice", None).unwrap();
    let (second, _) = manager.join("bob", None).unwrap();

    assert_ne!(first, second);
    assert_eq!(manager.table_count(), 2);
    assert_eq!(manager.table_ids(), vec![first, second]);
    assert_eq!(manager.table_of("alice"), Some(first));
}

#[test]
fn join_existing_and_missing_table() {
    let (manager, _) = make_manager();
    let (table_id, _) = manager.join("alice", None).unwrap();

    let (joined, events) = manager.join("bob", Some(table_id)).unwrap();
    assert_eq!(joined, table_id);
    assert!(matches!(events[..], [TableEvent::PlayerJoined { .. }]));

    let err = manager.join("carol", Some(999)).unwrap_err();
    assert_eq!(err, ManagerError::TableNotFound(999));
    // Неудачная посадка не оставляет следов в справочнике.
    assert_eq!(manager.table_of("carol"), None);
}

#[test]
fn player_cannot_join_two_tables() {
    let (manager, _) = make_manager();
    let (table_id, _) = manager.join("alice", None).unwrap();

    let err = manager.join("alice", None).unwrap_err();
    assert_eq!(
        err,
        ManagerError::AlreadyAtTable {
            player: "alice".into(),
            table_id
        }
    );
    assert_eq!(manager.table_count(), 1);
}

#[test]
fn empty_name_is_rejected() {
    let (manager, _) = make_manager();
    assert!(matches!(
        manager.join("  ", None).unwrap_err(),
        ManagerError::InvalidPlayerName(_)
    ));
    assert_eq!(manager.table_count(), 0);
}

#[test]
fn rejected_join_on_full_table_frees_name() {
    let (manager, _) = make_manager();
    let table_id = seat_all(&manager, &names("p", 5));

    let err = manager.join("late", Some(table_id)).unwrap_err();
    assert_eq!(err, ManagerError::Engine(EngineError::TableFull(table_id)));
    assert_eq!(manager.table_of("late"), None);

    // Имя свободно: можно сесть за другой стол.
    manager.join("late", None).unwrap();
}

#[test]
fn last_player_leaving_destroys_table() {
    let (manager, _) = make_manager();
    let table_id = seat_all(&manager, &names("p", 2));

    manager.leave("p0").unwrap();
    assert!(manager.has_table(table_id));

    manager.leave("p1").unwrap();
    assert!(!manager.has_table(table_id));
    assert_eq!(manager.snapshot(table_id).unwrap_err(), ManagerError::TableNotFound(table_id));
    assert_eq!(
        manager.leave("p1").unwrap_err(),
        ManagerError::PlayerNotSeated("p1".into())
    );
}

#[test]
fn commands_from_unseated_players_are_rejected() {
    let (manager, _) = make_manager();
    assert_eq!(
        manager.ready("ghost").unwrap_err(),
        ManagerError::PlayerNotSeated("ghost".into())
    );
}

#[test]
fn invalid_rules_are_rejected_up_front() {
    let mut rules = RulesConfig::standard();
    rules.min_seats = 4;
    rules.max_seats = 3;
    let result = TableManager::new(
        rules,
        |id| DeterministicRng::for_table(SEED, id),
        Arc::new(RecordingEventSink::new()),
    );
    assert!(matches!(result, Err(ManagerError::Config(_))));
}

// ----------------------
// события и откат
// ----------------------

#[test]
fn events_reach_the_sink() {
    let (manager, sink) = make_manager();
    let table_id = seat_all(&manager, &names("p", 3));
    for name in names("p", 3) {
        manager.ready(&name).unwrap();
    }

    let recorded = sink.for_table(table_id);
    let kinds: Vec<&str> = recorded.iter().map(|e| e.name()).collect();
    assert_eq!(&kinds[..3], &["player_joined", "player_joined", "player_joined"]);
    assert_eq!(kinds.last(), Some(&"round_initialized"));
    assert_eq!(kinds.iter().filter(|k| **k == "player_ready").count(), 3);
}

#[test]
fn rejected_command_leaves_table_untouched() {
    let (manager, sink) = make_manager();
    let players = names("p", 3);
    let table_id = seat_all(&manager, &players);
    for name in &players {
        manager.ready(name).unwrap();
    }
    for name in &players {
        manager.choose_orientation(name, false).unwrap();
    }

    let before = manager.snapshot(table_id).unwrap();
    let events_before = sink.len();
    let idle = before
        .table
        .seats
        .iter()
        .find(|p| p.state == PlayerState::WaitingTurn)
        .map(|p| p.name.clone())
        .unwrap();

    assert!(manager.play(&idle, 0, 1).is_err());
    assert!(manager.leave(&idle).is_err());
    assert!(manager.lock_table(&idle).is_err());

    assert_eq!(manager.snapshot(table_id).unwrap(), before);
    assert_eq!(sink.len(), events_before);
}

#[test]
fn queries_see_committed_state() {
    let (manager, _) = make_manager();
    let table_id = seat_all(&manager, &names("p", 2));

    let notice = manager.read_table(table_id, |g| Ok(g.table.notice.clone())).unwrap();
    assert_eq!(notice, "Готовы 0/2");

    let state = manager.read_for_player("p1", |g| Ok(g.state())).unwrap();
    assert_eq!(state, TableState::Recruiting);
}

#[test]
fn bot_round_keeps_cards_partitioned() {
    let (manager, _) = make_manager();
    let table_id = run_bot_table(&manager, &names("b", 3));

    let game = manager.snapshot(table_id).unwrap();
    game.check_invariants().unwrap();
    assert!(matches!(game.state(), TableState::Playing | TableState::RoundEnded));
}

// ----------------------
// конкурентность
// ----------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tables_run_in_parallel() {
    let (manager, _) = make_manager();
    let manager = Arc::new(manager);

    let mut workers = Vec::new();
    for t in 0..4 {
        let manager = Arc::clone(&manager);
        let seats = 3 + t % 3;
        workers.push(tokio::task::spawn_blocking(move || {
            run_bot_table(&manager, &names(&format!("t{t}_"), seats))
        }));
    }

    let reader = {
        let manager = Arc::clone(&manager);
        tokio::task::spawn_blocking(move || {
            for _ in 0..200 {
                for id in manager.table_ids() {
                    if let Ok(game) = manager.snapshot(id) {
                        game.check_invariants().unwrap();
                    }
                }
            }
        })
    };

    let mut ids = Vec::new();
    for worker in workers {
        ids.push(worker.await.unwrap());
    }
    reader.await.unwrap();

    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 4);
    for id in ids {
        manager.snapshot(id).unwrap().check_invariants().unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_joins_never_overfill_a_table() {
    let (manager, _) = make_manager();
    let manager = Arc::new(manager);
    let (table_id, _) = manager.join("host", None).unwrap();

    let mut joiners = Vec::new();
    for i in 0..8 {
        let manager = Arc::clone(&manager);
        joiners.push(tokio::task::spawn_blocking(move || {
            manager.join(&format!("j{i}"), Some(table_id)).is_ok()
        }));
    }

    let mut seated = 0;
    for joiner in joiners {
        if joiner.await.unwrap() {
            seated += 1;
        }
    }

    assert_eq!(seated, 4);
    let game = manager.snapshot(table_id).unwrap();
    assert_eq!(game.table.seated_count(), 5);
    assert_eq!(game.state(), TableState::Full);
}
