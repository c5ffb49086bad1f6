// src/bin/scout_dev_cli.rs

use std::sync::Arc;

use scout_engine::api::{execute_command, run_query, Command, Query, QueryResponse, TableCommand};
use scout_engine::domain::player::PlayerState;
use scout_engine::domain::rules::RulesConfig;
use scout_engine::domain::table::TableState;
use scout_engine::domain::TableId;
use scout_engine::engine::{GameTable, TableManager};
use scout_engine::infra::{DeterministicRng, RecordingEventSink};
use tracing_subscriber::EnvFilter;

const SEED: u64 = 2024;
const MAX_TURNS: usize = 400;

/// Что бот решил сделать на своём ходу.
enum BotMove {
    Play { begin: usize, end: usize },
    Draw,
    Stuck,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("scout_dev_cli: стартуем мульти-табличную симуляцию…");

    let sink = Arc::new(RecordingEventSink::new());
    let manager = match TableManager::new(
        RulesConfig::standard(),
        |id| DeterministicRng::for_table(SEED, id),
        sink.clone(),
    ) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("не удалось создать менеджер: {e}");
            return;
        }
    };

    let line_ups: [&[&str]; 3] = [
        &["anna", "boris", "vera"],
        &["gleb", "dina", "egor", "zoya"],
        &["ilya", "kira", "lev", "mila", "nick"],
    ];

    for names in line_ups {
        println!();
        println!("================ НОВЫЙ СТОЛ: {} игрока(ов) ================", names.len());
        match play_table(&manager, names) {
            Ok(table_id) => print_summary(&manager, table_id),
            Err(e) => eprintln!("стол остановлен: {e}"),
        }
    }

    println!();
    println!("Всего событий записано: {}", sink.len());
}

fn send(manager: &TableManager<DeterministicRng>, player: &str, command: TableCommand) -> Result<TableId, String> {
    let cmd = Command {
        player: player.to_string(),
        command,
    };
    execute_command(manager, &cmd)
        .map(|r| r.table_id)
        .map_err(|e| e.to_string())
}

/// Рассадить игроков, сыграть один раунд ботами, подтвердить конец.
fn play_table(manager: &TableManager<DeterministicRng>, names: &[&str]) -> Result<TableId, String> {
    let table_id = send(manager, names[0], TableCommand::Join { table_id: None })?;
    for name in &names[1..] {
        send(manager, name, TableCommand::Join { table_id: Some(table_id) })?;
    }
    for name in names {
        send(manager, name, TableCommand::Ready)?;
    }
    for (i, name) in names.iter().enumerate() {
        send(manager, name, TableCommand::ChooseOrientation { reverse: i % 2 == 1 })?;
    }

    for _ in 0..MAX_TURNS {
        let game = manager.snapshot(table_id).map_err(|e| e.to_string())?;
        if !matches!(game.state(), TableState::Playing) {
            break;
        }
        let Some(actor) = game
            .table
            .seats
            .iter()
            .find(|p| p.state == PlayerState::OnTurn)
            .map(|p| p.name.clone())
        else {
            return Err("никто не на ходу".into());
        };

        match choose_move(&game, &actor) {
            BotMove::Play { begin, end } => {
                send(manager, &actor, TableCommand::Play { begin, end })?;
            }
            BotMove::Draw => {
                send(
                    manager,
                    &actor,
                    TableCommand::Draw {
                        from_top: true,
                        flip: false,
                        insert_at: 0,
                    },
                )?;
            }
            BotMove::Stuck => return Err(format!("у игрока {actor} нет допустимого хода")),
        }
    }

    let state = manager.snapshot(table_id).map_err(|e| e.to_string())?.state();
    if state != TableState::RoundEnded {
        eprintln!("стол {table_id}: раунд не закончился за {MAX_TURNS} ходов ({state:?}), подтверждать нечего");
        return Ok(table_id);
    }
    for name in names {
        if let Err(e) = send(manager, name, TableCommand::AcknowledgeRoundEnd) {
            eprintln!("стол {table_id}: {name} не смог подтвердить конец раунда: {e}");
        }
    }
    Ok(table_id)
}

/// Самая длинная комбинация, которая бьёт стол; иначе добор.
fn choose_move(game: &GameTable, actor: &str) -> BotMove {
    let (Some(player), Some(round)) = (game.table.player(actor), game.round.as_ref()) else {
        return BotMove::Stuck;
    };
    let len = player.hand.len();
    for size in (1..=len).rev() {
        for begin in 0..=(len - size) {
            if let Ok(combo) = player.select_range(begin, begin + size, &round.pool) {
                if combo.is_playable() && combo.outranks(&round.displayed) {
                    return BotMove::Play {
                        begin,
                        end: begin + size,
                    };
                }
            }
        }
    }
    if round.displayed.is_empty() {
        BotMove::Stuck
    } else {
        BotMove::Draw
    }
}

fn print_summary(manager: &TableManager<DeterministicRng>, table_id: TableId) {
    let queries = [
        Query::GetTableInfo { table_id },
        Query::GetCumulativeScore { table_id },
        Query::GetSeating { table_id },
    ];
    for query in queries {
        match run_query(manager, &query) {
            Ok(QueryResponse::TableInfo(notice)) => println!("  Стол {table_id}: {notice}"),
            Ok(QueryResponse::CumulativeScore(scores)) => {
                for (name, score) in scores {
                    println!("  {name:>6}: {score:+}");
                }
            }
            Ok(QueryResponse::Seating(seating)) => {
                println!("  Состояние: {:?}, хозяин: {:?}", seating.state, seating.host);
            }
            Ok(other) => println!("  {other:?}"),
            Err(e) => println!("  ошибка запроса: {e}"),
        }
    }
}
