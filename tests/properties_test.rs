use std::collections::BTreeSet;

use proptest::prelude::*;

use scout_engine::domain::card::{Card, CardState, FacePair};
use scout_engine::domain::combination::{parse_rendered, ComboCategory, Combination};
use scout_engine::domain::deck::Deck;
use scout_engine::domain::player::PlayerState;
use scout_engine::domain::rules::RulesConfig;
use scout_engine::engine::GameTable;
use scout_engine::infra::DeterministicRng;

const NAMES: [&str; 5] = ["a", "b", "c", "d", "e"];

fn dealt_table(seed: u64, seats: usize) -> GameTable {
    let mut game = GameTable::new(1, RulesConfig::standard());
    let mut rng = DeterministicRng::from_seed(seed);
    for name in &NAMES[..seats] {
        game.add_player(name).unwrap();
    }
    for name in &NAMES[..seats] {
        game.player_ready(name, &mut rng).unwrap();
    }
    for name in &NAMES[..seats] {
        game.choose_orientation(name, false, &mut rng).unwrap();
    }
    game
}

fn face_pair() -> impl Strategy<Value = (u8, u8)> {
    (1u8..=9).prop_flat_map(|low| (Just(low), (low + 1)..=10u8))
}

fn combo_values() -> impl Strategy<Value = Vec<(u8, u8)>> {
    prop::collection::vec((1u8..=10, 1u8..=10), 1..6)
}

/// Длина и вид: ряд (`true`) или набор.
fn shaped_combo() -> impl Strategy<Value = (usize, bool)> {
    (1usize..=5, any::<bool>())
}

/// Ряд или набор длины `len` с минимумом `low`; ряд может идти вниз.
fn build_shaped(len: usize, run: bool, low: u8, descending: bool) -> Combination {
    let mut values: Vec<u8> = (0..len as u8).map(|i| if run { low + i } else { low }).collect();
    if descending {
        values.reverse();
    }
    let faces: Vec<(u8, u8)> = values.iter().map(|&v| (v, 1)).collect();
    Combination::from_faces(&faces)
}

proptest! {
    #[test]
    fn deal_partitions_the_deck(seed in any::<u64>(), seats in 2usize..=5) {
        let game = dealt_table(seed, seats);
        prop_assert!(game.check_invariants().is_ok());

        let per_player = RulesConfig::standard().cards_per_player(seats).unwrap();
        let round = game.round().unwrap();
        let mut ids = BTreeSet::new();
        for player in &game.table.seats {
            prop_assert_eq!(player.hand.len(), per_player);
            for &id in &player.hand {
                prop_assert!(ids.insert(id));
            }
        }
        let hidden = round.pool.cards.iter().filter(|c| c.state == CardState::Hidden).count();
        prop_assert_eq!(hidden, seats * per_player);
    }

    #[test]
    fn rank_comparison_is_antisymmetric(a in combo_values(), b in combo_values()) {
        let a = Combination::from_faces(&a);
        let b = Combination::from_faces(&b);
        prop_assert_eq!(a.compare_rank(&b), b.compare_rank(&a).reverse());
        prop_assert!(!(a.outranks(&b) && b.outranks(&a)));
    }

    #[test]
    fn longer_combination_always_wins(len in 1usize..5, start in 1u8..=5) {
        let short: Vec<(u8, u8)> = (0..len as u8).map(|i| (start + i, 1)).collect();
        let long: Vec<(u8, u8)> = (0..=len as u8).map(|_| (1, 2)).collect();
        let short = Combination::from_faces(&short);
        let long = Combination::from_faces(&long);
        prop_assert!(long.outranks(&short));
    }

    #[test]
    fn ascending_values_form_a_run(start in 1u8..=6, len in 2u8..=5) {
        prop_assume!(start + len - 1 <= 10);
        let faces: Vec<(u8, u8)> = (0..len).map(|i| (start + i, 1)).collect();
        prop_assert_eq!(Combination::from_faces(&faces).category(), ComboCategory::Run);

        let reversed: Vec<(u8, u8)> = faces.iter().rev().copied().collect();
        prop_assert_eq!(Combination::from_faces(&reversed).category(), ComboCategory::Run);
    }

    #[test]
    fn rendered_card_is_recognised((low, high) in face_pair(), up_active in any::<bool>()) {
        let card = Card::new(0, low, high, up_active);
        let text = format!("{},{}", card.value(), card.other_value());
        let pair: FacePair = text.parse().unwrap();
        prop_assert!(pair.matches(low, high));
        prop_assert!(card.matches_text(&text));

        let symbols = Combination::from_cards([&card]).render();
        prop_assert!(card.matches_text(&symbols));
    }

    #[test]
    fn rejected_play_changes_nothing(seed in any::<u64>(), begin in 0usize..12) {
        let mut game = dealt_table(seed, 3);
        let before = game.clone();
        let idle = game
            .table
            .seats
            .iter()
            .find(|p| p.state == PlayerState::WaitingTurn)
            .map(|p| p.name.clone())
            .unwrap();

        prop_assert!(game.play(&idle, begin, begin + 1).is_err());
        prop_assert_eq!(game, before);
    }

    #[test]
    fn rendered_combination_identifies_every_card(
        ids in prop::sample::subsequence((0..45usize).collect::<Vec<_>>(), 1..=6).prop_shuffle(),
        flips in prop::collection::vec(any::<bool>(), 6),
    ) {
        let deck = Deck::full();
        let cards: Vec<Card> = ids
            .iter()
            .zip(&flips)
            .map(|(&i, &flip)| {
                let c = &deck.cards[i];
                Card::new(c.id, c.up, c.down, !flip)
            })
            .collect();

        let text = Combination::from_cards(cards.iter()).render();
        let pairs = parse_rendered(&text).unwrap();
        prop_assert_eq!(pairs.len(), cards.len());

        for (pair, card) in pairs.iter().zip(&cards) {
            let found = deck.find_by_faces(pair.0, pair.1).unwrap();
            prop_assert_eq!(found.id, card.id);
            prop_assert_eq!(pair.0, card.value());
            prop_assert_eq!(pair.1, card.other_value());
        }
    }

    #[test]
    fn equal_shape_ranks_by_minimum(
        (len, run) in shaped_combo(),
        low_a in 1u8..=6,
        low_b in 1u8..=6,
        down_a in any::<bool>(),
        down_b in any::<bool>(),
    ) {
        let a = build_shaped(len, run, low_a, down_a);
        let b = build_shaped(len, run, low_b, down_b);
        prop_assert_eq!(a.len(), b.len());
        prop_assert_eq!(a.category(), b.category());

        prop_assert_eq!(a.outranks(&b), a.min_value() > b.min_value());
        prop_assert_eq!(b.outranks(&a), b.min_value() > a.min_value());
    }
}
