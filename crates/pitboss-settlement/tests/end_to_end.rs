//! Integration test: full match lifecycle
//!
//! OPEN → bets → LOCKED → SETTLED
//!
//! Drives the controllers over one shared ledger and checks balances,
//! bet rows, ratings, and receipts after each step.

use std::sync::Arc;

use pitboss_ledger::{LedgerStore, MemoryLedger};
use pitboss_settlement::{Accounts, MatchController, NoBonus, Queries, Settings, WagerController};
use pitboss_types::*;
use rust_decimal::Decimal;

struct Table {
    store: Arc<MemoryLedger>,
    accounts: Accounts<MemoryLedger>,
    matches: MatchController<MemoryLedger>,
    wagers: WagerController<MemoryLedger>,
    queries: Queries<MemoryLedger>,
}

impl Table {
    fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    fn with_settings(settings: Settings) -> Self {
        let store = Arc::new(MemoryLedger::new());
        let accounts = Accounts::new(Arc::clone(&store), settings.clone());
        for name in ["Glorp", "Zorb"] {
            accounts.register_user(name).unwrap();
        }
        for name in ["Alice", "Bob", "Cara", "Dan"] {
            accounts.register_user(name).unwrap();
            accounts.grant_base(name, 1000).unwrap();
        }
        Self {
            matches: MatchController::new(Arc::clone(&store), settings.clone()),
            wagers: WagerController::new(Arc::clone(&store), settings.clone()),
            queries: Queries::new(Arc::clone(&store), settings),
            accounts,
            store,
        }
    }

    fn balance(&self, name: &str) -> Decimal {
        self.store
            .read(|v| {
                let user = v.user_by_name(name).unwrap();
                Ok(v.wallet_balance(user.id, "DSC"))
            })
            .unwrap()
    }

    fn bet(&self, match_id: MatchId, name: &str, winner: Side, loser_score: u8, amount: u64) -> Bet {
        self.wagers
            .place_bet(&BetRequest::fixture(match_id, name, winner, loser_score, amount))
            .unwrap()
    }
}

fn main_channel() -> ChannelId {
    ChannelId::new("main")
}

fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

#[test]
fn full_cycle_pays_exact_winners_from_the_pool() {
    let t = Table::new();
    let id = t.matches.open_match(&main_channel(), "Glorp", "Zorb").unwrap();

    // =====================================================================
    // Bets: two exact (P1 10-3), two wrong
    // =====================================================================
    t.bet(id, "Alice", Side::P1, 3, 100);
    t.bet(id, "Dan", Side::P1, 3, 400);
    t.bet(id, "Bob", Side::P1, 4, 500);
    t.bet(id, "Cara", Side::P2, 3, 500);
    assert_eq!(t.balance("Alice"), dec(900));

    let snap = t.queries.current_match_snapshot(&main_channel()).unwrap();
    assert_eq!(snap.totals, SideTotals { p1: 1000, p2: 500 });

    t.matches.lock_match(&main_channel()).unwrap();
    t.matches.adjust_score(&main_channel(), 10, 3).unwrap();
    let receipt = t.matches.settle_match(&main_channel(), Side::P1, 3).unwrap();

    // =====================================================================
    // Receipt: winners pool 500, losers pool 1000, ratio 2
    // =====================================================================
    assert_eq!(receipt.winners_pool, 500);
    assert_eq!(receipt.losers_pool, 1000);
    assert_eq!(receipt.exact_winners(), 2);
    assert_eq!(receipt.total_paid(), 1000);
    assert!(receipt.lines.iter().filter(|l| !l.exact).all(|l| l.payout == 0));
    assert_eq!(receipt.payout_root, compute_payout_root(id, &receipt.lines));

    assert_eq!(t.balance("Alice"), dec(1100));
    assert_eq!(t.balance("Dan"), dec(1400));
    assert_eq!(t.balance("Bob"), dec(500));
    assert_eq!(t.balance("Cara"), dec(500));

    // =====================================================================
    // Ledger rows
    // =====================================================================
    let (bets, m, deltas) = t
        .store
        .read(|v| Ok((v.bets_for_match(id), v.match_by_id(id).unwrap(), v.rating_deltas(id))))
        .unwrap();
    assert!(bets.iter().all(|b| b.status == BetStatus::Settled && b.payout.is_some()));
    assert_eq!(m.state, MatchState::Settled);
    assert_eq!((m.winner, m.loser_score), (Some(Side::P1), Some(3)));
    assert_eq!(deltas.len(), 2);
    assert_eq!(deltas[0].delta, 16);
    assert_eq!(deltas[1].delta, -16);

    let glorp = t.queries.player_stats("glorp").unwrap();
    assert_eq!((glorp.rating.rating, glorp.rating.wins), (1216, 1));
    let zorb = t.queries.player_stats("zorb").unwrap();
    assert_eq!((zorb.rating.rating, zorb.rating.losses), (1184, 1));
}

#[test]
fn streak_and_shutout_bonuses_apply_on_the_next_win() {
    let t = Table::new();
    let first = t.matches.open_match(&main_channel(), "Glorp", "Zorb").unwrap();
    t.bet(first, "Alice", Side::P1, 3, 100);
    t.bet(first, "Bob", Side::P1, 4, 200);
    t.matches.lock_match(&main_channel()).unwrap();
    t.matches.settle_match(&main_channel(), Side::P1, 3).unwrap();
    // 100 × 200 / 100 = 200
    assert_eq!(t.balance("Alice"), dec(1100));

    let second = t.matches.open_match(&main_channel(), "Glorp", "Zorb").unwrap();
    t.bet(second, "Alice", Side::P2, 0, 100);
    t.bet(second, "Bob", Side::P1, 5, 100);
    t.matches.lock_match(&main_channel()).unwrap();
    let receipt = t.matches.settle_match(&main_channel(), Side::P2, 0).unwrap();

    // ratio 1 → 100, one combo stack → 101.5, shutout ×2 → 203
    let alice_line = receipt.lines.iter().find(|l| l.exact).unwrap();
    assert_eq!(alice_line.payout, 203);
    assert_eq!(t.balance("Alice"), dec(1203));
}

#[test]
fn no_bonus_policy_pays_plain_ratio() {
    let t = Table::new();
    let matches = t.matches.clone().with_bonus_policy(Arc::new(NoBonus));
    let id = matches.open_match(&main_channel(), "Glorp", "Zorb").unwrap();
    t.bet(id, "Alice", Side::P2, 0, 100);
    t.bet(id, "Bob", Side::P1, 1, 100);
    matches.lock_match(&main_channel()).unwrap();
    let receipt = matches.settle_match(&main_channel(), Side::P2, 0).unwrap();
    assert_eq!(receipt.total_paid(), 100);
}

#[test]
fn lone_exact_winner_gets_stake_back_from_empty_losers_pool() {
    let t = Table::new();
    let id = t.matches.open_match(&main_channel(), "Glorp", "Zorb").unwrap();
    t.bet(id, "Cara", Side::P1, 6, 250);
    t.matches.lock_match(&main_channel()).unwrap();
    let receipt = t.matches.settle_match(&main_channel(), Side::P1, 6).unwrap();
    assert_eq!(receipt.losers_pool, 0);
    assert_eq!(receipt.total_paid(), 250);
    assert_eq!(t.balance("Cara"), dec(1000));
}

#[test]
fn nobody_exact_keeps_the_pool() {
    let t = Table::new();
    let id = t.matches.open_match(&main_channel(), "Glorp", "Zorb").unwrap();
    t.bet(id, "Alice", Side::P1, 2, 300);
    t.bet(id, "Bob", Side::P2, 2, 300);
    t.matches.lock_match(&main_channel()).unwrap();
    let receipt = t.matches.settle_match(&main_channel(), Side::P1, 9).unwrap();
    assert_eq!(receipt.winners_pool, 0);
    assert_eq!(receipt.total_paid(), 0);
    assert_eq!(t.balance("Alice"), dec(700));
    assert_eq!(t.balance("Bob"), dec(700));
}

#[test]
fn double_settlement_changes_nothing_twice() {
    let t = Table::new();
    let id = t.matches.open_match(&main_channel(), "Glorp", "Zorb").unwrap();
    t.bet(id, "Alice", Side::P1, 3, 100);
    t.bet(id, "Bob", Side::P2, 3, 100);
    t.matches.lock_match(&main_channel()).unwrap();
    t.matches.settle_match(&main_channel(), Side::P1, 3).unwrap();
    let after_first = (t.balance("Alice"), t.queries.player_stats("Glorp").unwrap().rating);

    let err = t.matches.settle_match(&main_channel(), Side::P1, 3).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    let err = t.matches.settle_match_by_id(id, Side::P2, 0).unwrap_err();
    assert!(matches!(err, PitbossError::AlreadySettled(_)));

    let after_retry = (t.balance("Alice"), t.queries.player_stats("Glorp").unwrap().rating);
    assert_eq!(after_first, after_retry);
}

#[test]
fn failed_payout_rolls_back_the_whole_settlement() {
    // Any combo stack overflows the multiplier; streak-free winners still pay.
    let mut settings = Settings::default();
    settings.payout.combo_step = Decimal::MAX;
    let t = Table::with_settings(settings);

    let first = t.matches.open_match(&main_channel(), "Glorp", "Zorb").unwrap();
    t.bet(first, "Alice", Side::P1, 3, 100);
    t.bet(first, "Bob", Side::P1, 4, 200);
    t.matches.lock_match(&main_channel()).unwrap();
    t.matches.settle_match(&main_channel(), Side::P1, 3).unwrap();
    assert_eq!(t.balance("Alice"), dec(1100));

    // Bob is paid first, then Alice's streak stack overflows.
    let second = t.matches.open_match(&main_channel(), "Glorp", "Zorb").unwrap();
    t.bet(second, "Bob", Side::P1, 0, 100);
    t.bet(second, "Alice", Side::P1, 0, 100);
    t.bet(second, "Cara", Side::P2, 5, 100);
    t.matches.lock_match(&main_channel()).unwrap();

    let before: Vec<Decimal> = ["Alice", "Bob", "Cara"].iter().map(|n| t.balance(n)).collect();
    let glorp_before = t.queries.player_stats("glorp").unwrap().rating;

    let err = t.matches.settle_match(&main_channel(), Side::P1, 0).unwrap_err();
    assert!(matches!(err, PitbossError::InvalidAmount { .. }));

    let after: Vec<Decimal> = ["Alice", "Bob", "Cara"].iter().map(|n| t.balance(n)).collect();
    assert_eq!(after, before);
    let (bets, m, deltas) = t
        .store
        .read(|v| Ok((v.bets_for_match(second), v.match_by_id(second).unwrap(), v.rating_deltas(second))))
        .unwrap();
    assert_eq!(m.state, MatchState::Locked);
    assert_eq!((m.winner, m.loser_score), (None, None));
    assert!(bets.iter().all(|b| b.status == BetStatus::Pending && b.payout.is_none()));
    assert!(deltas.is_empty());
    assert_eq!(t.queries.player_stats("glorp").unwrap().rating, glorp_before);
}

#[test]
fn superseded_match_refunds_pending_stakes() {
    let t = Table::new();
    let stale = t.matches.open_match(&main_channel(), "Glorp", "Zorb").unwrap();
    t.bet(stale, "Alice", Side::P1, 3, 400);
    t.bet(stale, "Bob", Side::P2, 1, 150);
    t.wagers.refund_bet(stale, "Bob").unwrap();

    t.matches.open_match(&main_channel(), "Zorb", "Glorp").unwrap();
    assert_eq!(t.balance("Alice"), dec(1000));
    assert_eq!(t.balance("Bob"), dec(1000));

    let bets = t.store.read(|v| Ok(v.bets_for_match(stale))).unwrap();
    assert!(bets.iter().all(|b| b.status == BetStatus::Refunded && b.payout == Some(0)));
    // The stale match no longer takes bets.
    let err = t
        .wagers
        .place_bet(&BetRequest::fixture(stale, "Cara", Side::P1, 3, 10))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn recorded_result_refunds_and_rates_without_payouts() {
    let t = Table::new();
    let id = t.matches.open_match(&main_channel(), "Glorp", "Zorb").unwrap();
    t.bet(id, "Alice", Side::P2, 5, 300);

    let out = t.matches.record_result(&main_channel(), "Zorb", "Glorp", 5).unwrap();
    assert_eq!(out.match_id, id);
    assert_eq!(out.refunded_bets, 1);
    assert_eq!(out.rating.winner.delta, 16);
    assert_eq!(t.balance("Alice"), dec(1000));

    let history = t.queries.match_history("Alice", None);
    assert!(history.unwrap().is_empty());
    let history = t.queries.match_history("Glorp", None).unwrap();
    assert_eq!(history[0].winner_name.as_deref(), Some("Zorb"));
}

#[test]
fn receipts_serialize_for_audit_export() {
    let t = Table::new();
    let id = t.matches.open_match(&main_channel(), "Glorp", "Zorb").unwrap();
    t.bet(id, "Alice", Side::P1, 3, 100);
    t.matches.lock_match(&main_channel()).unwrap();
    let receipt = t.matches.settle_match(&main_channel(), Side::P1, 3).unwrap();

    let json = serde_json::to_value(&receipt).unwrap();
    assert_eq!(json["winner"], "p1");
    assert_eq!(json["lines"].as_array().unwrap().len(), 1);
    assert_eq!(receipt.payout_root_hex().len(), 64);
}

#[test]
fn accounts_start_empty_until_granted() {
    let t = Table::new();
    t.accounts.ensure_user("Newcomer").unwrap();
    let wallet = t.queries.wallet("newcomer").unwrap();
    assert!(wallet.balances.is_empty());
}
