use std::sync::Arc;

use scout_engine::api::{
    execute_command, parse_command, parse_query, run_query, ApiError, Command, Query, QueryResponse,
    TableCommand,
};
use scout_engine::domain::rules::RulesConfig;
use scout_engine::domain::TableId;
use scout_engine::engine::{EngineError, ManagerError, OperationType, TableEvent, TableManager};
use scout_engine::infra::{event_to_dto, DeterministicRng, RecordingEventSink};

fn make_manager() -> (TableManager<DeterministicRng>, Arc<RecordingEventSink>) {
    let sink = Arc::new(RecordingEventSink::new());
    let manager = TableManager::new(
        RulesConfig::standard(),
        |id| DeterministicRng::for_table(7, id),
        sink.clone(),
    )
    .unwrap();
    (manager, sink)
}

fn send(manager: &TableManager<DeterministicRng>, player: &str, command: TableCommand) -> TableId {
    let cmd = Command {
        player: player.to_string(),
        command,
    };
    execute_command(manager, &cmd).unwrap().table_id
}

/// Трое за столом, раздача прошла, ориентация выбрана: идёт игра.
fn playing_table(manager: &TableManager<DeterministicRng>) -> TableId {
    let table_id = send(manager, "alice", TableCommand::Join { table_id: None });
    for name in ["bob", "carol"] {
        send(manager, name, TableCommand::Join { table_id: Some(table_id) });
    }
    for name in ["alice", "bob", "carol"] {
        send(manager, name, TableCommand::Ready);
    }
    for name in ["alice", "bob", "carol"] {
        send(manager, name, TableCommand::ChooseOrientation { reverse: false });
    }
    table_id
}

// ----------------------
// разбор команд
// ----------------------

#[test]
fn parses_draw_command() {
    let raw = r#"{"player":"alice","command":{"type":"draw","from_top":true,"flip":false,"insert_at":3}}"#;
    let cmd = parse_command(raw).unwrap();
    assert_eq!(cmd.player, "alice");
    assert_eq!(
        cmd.command,
        TableCommand::Draw {
            from_top: true,
            flip: false,
            insert_at: 3
        }
    );
}

#[test]
fn join_without_table_id_means_new_table() {
    let cmd = parse_command(r#"{"player":"bob","command":{"type":"join"}}"#).unwrap();
    assert_eq!(cmd.command, TableCommand::Join { table_id: None });

    let cmd = parse_command(r#"{"player":"bob","command":{"type":"join","table_id":4}}"#).unwrap();
    assert_eq!(cmd.command, TableCommand::Join { table_id: Some(4) });
}

#[test]
fn parses_unit_and_named_commands() {
    let cmd = parse_command(r#"{"player":"a","command":{"type":"acknowledge_round_end"}}"#).unwrap();
    assert_eq!(cmd.command, TableCommand::AcknowledgeRoundEnd);

    let cmd = parse_command(r#"{"player":"a","command":{"type":"transfer_host","target":"b"}}"#).unwrap();
    assert_eq!(cmd.command, TableCommand::TransferHost { target: "b".into() });
}

#[test]
fn malformed_commands_are_bad_requests() {
    let cases = [
        // лишнее поле внутри команды
        r#"{"player":"a","command":{"type":"play","begin":0,"end":1,"extra":true}}"#,
        // лишнее поле в конверте
        r#"{"player":"a","command":{"type":"ready"},"sig":"x"}"#,
        // не тот тип
        r#"{"player":"a","command":{"type":"play","begin":"zero","end":1}}"#,
        // пропущенное поле
        r#"{"player":"a","command":{"type":"draw","from_top":true,"flip":false}}"#,
        // неизвестная команда
        r#"{"player":"a","command":{"type":"fold"}}"#,
        // пустое имя
        r#"{"player":"  ","command":{"type":"ready"}}"#,
        "not json at all",
    ];
    for raw in cases {
        assert!(
            matches!(parse_command(raw), Err(ApiError::BadRequest(_))),
            "ожидали BadRequest для {raw}"
        );
    }
}

#[test]
fn parses_queries() {
    assert_eq!(parse_query(r#"{"type":"list_tables"}"#).unwrap(), Query::ListTables);
    assert_eq!(
        parse_query(r#"{"type":"get_hand","player":"alice"}"#).unwrap(),
        Query::GetHand {
            player: "alice".into()
        }
    );
    assert!(matches!(
        parse_query(r#"{"type":"get_round_info"}"#),
        Err(ApiError::BadRequest(_))
    ));
}

// ----------------------
// команды и запросы end-to-end
// ----------------------

#[test]
fn response_shows_only_own_hand() {
    let (manager, _) = make_manager();
    let table_id = send(&manager, "alice", TableCommand::Join { table_id: None });
    send(&manager, "bob", TableCommand::Join { table_id: Some(table_id) });
    send(&manager, "alice", TableCommand::Ready);

    let response = execute_command(
        &manager,
        &Command {
            player: "bob".into(),
            command: TableCommand::Ready,
        },
    )
    .unwrap();

    let dealt = response
        .events
        .iter()
        .find(|e| e.kind == "round_initialized")
        .unwrap();
    assert_eq!(dealt.player.as_deref(), Some("bob"));

    let hand = match run_query(&manager, &Query::GetHand { player: "bob".into() }).unwrap() {
        QueryResponse::Hand(hand) => hand,
        other => panic!("ожидали руку, получили {other:?}"),
    };
    assert_eq!(dealt.detail.as_deref(), Some(hand.as_str()));
}

#[test]
fn dealt_event_is_filtered_per_viewer() {
    let (manager, sink) = make_manager();
    let table_id = playing_table(&manager);

    let dealt = sink
        .for_table(table_id)
        .into_iter()
        .find(|e| matches!(e, TableEvent::RoundInitialized { .. }))
        .unwrap();

    let for_alice = event_to_dto(&dealt, "alice");
    let for_carol = event_to_dto(&dealt, "carol");
    assert_eq!(for_alice.player.as_deref(), Some("alice"));
    assert_ne!(for_alice.detail, for_carol.detail);

    let outsider = event_to_dto(&dealt, "mallory");
    assert_eq!(outsider.player, None);
    assert_eq!(outsider.detail, None);
}

#[test]
fn turn_event_carries_table_and_operation() {
    let (manager, sink) = make_manager();
    let table_id = playing_table(&manager);

    let opening = sink
        .for_table(table_id)
        .into_iter()
        .find(|e| matches!(e, TableEvent::TurnAdvanced { .. }))
        .unwrap();
    let opening = event_to_dto(&opening, "bob");
    assert_eq!(opening.displayed.as_deref(), Some(","));
    let start = opening.operation.unwrap();
    assert_eq!(start.kind, OperationType::GameStart);
    assert_eq!(start.detail, None);

    // На пустой стол любая одиночная карта проходит, но только у того, кто ходит.
    let response = ["alice", "bob", "carol"]
        .into_iter()
        .find_map(|name| {
            let cmd = Command {
                player: name.into(),
                command: TableCommand::Play { begin: 0, end: 1 },
            };
            execute_command(&manager, &cmd).ok()
        })
        .unwrap();

    let turn = response
        .events
        .iter()
        .find(|e| e.kind == "turn_advanced")
        .unwrap();
    let info = match run_query(&manager, &Query::GetRoundInfo { table_id }).unwrap() {
        QueryResponse::RoundInfo(info) => info,
        other => panic!("ожидали раунд, получили {other:?}"),
    };
    assert_eq!(turn.displayed.as_deref(), Some(info.displayed.as_str()));

    let played = turn.operation.as_ref().unwrap();
    assert_eq!(played.kind, OperationType::Play);
    assert_eq!(played.detail.as_deref(), Some(info.displayed.as_str()));
    assert_eq!(Some(played), info.last_operation.as_ref());
}

#[test]
fn queries_during_play() {
    let (manager, _) = make_manager();
    let table_id = playing_table(&manager);

    match run_query(&manager, &Query::GetHistory { table_id }).unwrap() {
        QueryResponse::History(history) => assert!(history.is_empty()),
        other => panic!("ожидали историю, получили {other:?}"),
    }

    match run_query(&manager, &Query::GetRoundInfo { table_id }).unwrap() {
        QueryResponse::RoundInfo(info) => {
            assert_eq!(info.turn, 1);
            assert_eq!(info.players, vec!["alice", "bob", "carol"]);
            assert!(info.seats.iter().all(|s| s.remaining_cards == 12 && s.goal_cards == 0));
            let last = info.last_operation.unwrap();
            assert_eq!(last.kind, OperationType::GameStart);
        }
        other => panic!("ожидали раунд, получили {other:?}"),
    }

    match run_query(&manager, &Query::GetTableInfo { table_id }).unwrap() {
        QueryResponse::TableInfo(notice) => assert!(notice.starts_with("Ходит ")),
        other => panic!("ожидали сообщение стола, получили {other:?}"),
    }

    assert_eq!(
        run_query(&manager, &Query::GetLiveScore { player: "alice".into() }).unwrap(),
        QueryResponse::LiveScore(-12)
    );

    match run_query(&manager, &Query::GetSeating { table_id }).unwrap() {
        QueryResponse::Seating(seating) => {
            assert_eq!(seating.host.as_deref(), Some("alice"));
            assert_eq!(seating.seats.len(), 3);
            assert!(seating.seats[0].is_host);
            assert!(!seating.seats[1].is_host);
        }
        other => panic!("ожидали рассадку, получили {other:?}"),
    }

    match run_query(&manager, &Query::GetCumulativeScore { table_id }).unwrap() {
        QueryResponse::CumulativeScore(scores) => assert!(scores.values().all(|&s| s == 0)),
        other => panic!("ожидали очки, получили {other:?}"),
    }

    assert_eq!(
        run_query(&manager, &Query::ListTables).unwrap(),
        QueryResponse::Tables(vec![table_id])
    );
}

#[test]
fn round_info_before_deal_is_rejected() {
    let (manager, _) = make_manager();
    let table_id = send(&manager, "alice", TableCommand::Join { table_id: None });
    assert!(matches!(
        run_query(&manager, &Query::GetRoundInfo { table_id }),
        Err(ApiError::Rejected(_))
    ));
}

#[test]
fn unknown_targets_map_to_client_errors() {
    let (manager, _) = make_manager();
    assert_eq!(
        run_query(&manager, &Query::GetTableInfo { table_id: 77 }).unwrap_err(),
        ApiError::TableNotFound(77)
    );
    assert_eq!(
        run_query(&manager, &Query::GetHand { player: "nobody".into() }).unwrap_err(),
        ApiError::PlayerNotAtTable("nobody".into())
    );

    let cmd = Command {
        player: "nobody".into(),
        command: TableCommand::Ready,
    };
    assert_eq!(
        execute_command(&manager, &cmd).unwrap_err(),
        ApiError::PlayerNotAtTable("nobody".into())
    );
}

#[test]
fn out_of_turn_command_is_rejected() {
    let (manager, _) = make_manager();
    playing_table(&manager);

    // Кто-то из троих точно не на ходу: все три попытки не могут пройти.
    let mut rejected = 0;
    for name in ["alice", "bob", "carol"] {
        let cmd = Command {
            player: name.into(),
            command: TableCommand::Draw {
                from_top: true,
                flip: false,
                insert_at: 0,
            },
        };
        if let Err(e) = execute_command(&manager, &cmd) {
            assert!(matches!(e, ApiError::Rejected(_)));
            rejected += 1;
        }
    }
    // Стол пуст в начале раунда: добирать нечего никому.
    assert_eq!(rejected, 3);
}

#[test]
fn error_mapping() {
    assert_eq!(
        ApiError::from(EngineError::Structural("сломалась раскладка".into())),
        ApiError::Internal("сломалась раскладка".into())
    );
    assert!(matches!(
        ApiError::from(EngineError::NotHost("bob".into())),
        ApiError::Rejected(_)
    ));
    assert_eq!(
        ApiError::from(ManagerError::PlayerNotSeated("bob".into())),
        ApiError::PlayerNotAtTable("bob".into())
    );
    assert!(matches!(
        ApiError::from(ManagerError::InvalidPlayerName(String::new())),
        ApiError::BadRequest(_)
    ));
}
