use victory_engine::{
    Faction, FactionStanding, GameStateSnapshot, ModifierStatus, TieBreakRule, VictoryModifier,
    VictorySession,
};

fn session() -> VictorySession {
    VictorySession::builtin().expect("builtin session should build")
}

fn agenda_tie(turn: u32) -> GameStateSnapshot {
    GameStateSnapshot::new(Faction::FactionA, turn)
        .with_standing(Faction::FactionA, FactionStanding::new(100, 5, 100))
        .with_standing(Faction::FactionB, FactionStanding::new(100, 5, 100))
}

#[test]
fn resource_dominance_progress_and_win() {
    let session = session();
    let halfway = GameStateSnapshot::new(Faction::FactionA, 4)
        .with_points(Faction::FactionA, 150)
        .with_points(Faction::FactionB, 150);

    let result = session.check(&halfway);
    assert!(!result.has_winner);
    assert_eq!(result.progress_of("resource_dominance"), Some(50.0));

    let reached = halfway.with_points(Faction::FactionA, 300).with_points(Faction::FactionB, 200);
    let result = session.check(&reached);
    assert!(result.has_winner);
    assert_eq!(result.winning_condition_id.as_deref(), Some("resource_dominance"));
    assert_eq!(result.winning_faction, Some(Faction::FactionA));
    assert_eq!(result.progress_of("resource_dominance"), Some(100.0));
}

#[test]
fn lower_priority_number_beats_territorial_control() {
    let session = session();
    let snapshot = GameStateSnapshot::new(Faction::FactionB, 11)
        .with_standing(Faction::FactionA, FactionStanding::new(250, 2, 0))
        .with_standing(Faction::FactionB, FactionStanding::new(310, 10, 0));

    let result = session.check(&snapshot);

    assert_eq!(result.winning_condition_id.as_deref(), Some("resource_dominance"));
    assert_eq!(result.winning_faction, Some(Faction::FactionB));
    assert_eq!(result.progress_of("territorial_control"), Some(100.0));
    assert!(result.tie_break.is_none());
}

#[test]
fn secret_agenda_tie_resolved_by_resource_metric() {
    let session = session();
    let snapshot = agenda_tie(7)
        .with_points(Faction::FactionA, 120)
        .with_points(Faction::FactionB, 95);

    let result = session.check(&snapshot);

    assert_eq!(result.winning_faction, Some(Faction::FactionA));
    assert_eq!(result.winning_condition_id.as_deref(), Some("secret_agenda_a"));
    let outcome = result.tie_break.as_ref().expect("agenda tie expected");
    assert_eq!(outcome.rule, TieBreakRule::ResourceMetric);
    assert!(result.message.contains("resource metric"), "{}", result.message);
}

#[test]
fn fully_tied_agendas_fall_back_to_turn_parity() {
    let session = session();

    let odd = session.check(&agenda_tie(7));
    let even = session.check(&agenda_tie(8));

    assert_eq!(odd.tie_break.as_ref().map(|o| o.rule), Some(TieBreakRule::TurnParity));
    assert_eq!(odd.winning_faction, Some(Faction::FactionA));
    assert_eq!(odd.winning_condition_id.as_deref(), Some("secret_agenda_a"));

    assert_eq!(even.tie_break.as_ref().map(|o| o.rule), Some(TieBreakRule::TurnParity));
    assert_eq!(even.winning_faction, Some(Faction::FactionB));
    assert_eq!(even.winning_condition_id.as_deref(), Some("secret_agenda_b"));

    assert_eq!(session.check(&agenda_tie(7)), odd, "parity fallback must be reproducible");
}

#[test]
fn map_expansion_raises_and_restores_territory_threshold() {
    let mut session = session();
    let threshold = |session: &VictorySession| {
        session
            .effective_conditions()
            .iter()
            .find(|condition| condition.id == "territorial_control")
            .and_then(|condition| condition.threshold())
    };
    let snapshot = GameStateSnapshot::new(Faction::FactionA, 12).with_territories(Faction::FactionA, 11);

    assert_eq!(threshold(&session), Some(10.0));
    assert!(session.check(&snapshot).has_winner);

    let status = session.add_modifier(
        VictoryModifier::new("territorial_control", "mapExpansion").with_threshold(12.0),
    );
    assert_eq!(status, ModifierStatus::Applied);
    assert_eq!(threshold(&session), Some(12.0));
    let patched = session.check(&snapshot);
    assert!(!patched.has_winner);
    let expected = 11.0 / 12.0 * 100.0;
    assert_eq!(patched.progress_of("territorial_control"), Some(expected));

    assert_eq!(session.remove_modifier("mapExpansion"), 1);
    assert_eq!(threshold(&session), Some(10.0));
    assert!(session.check(&snapshot).has_winner);
}

#[test]
fn degenerate_modifier_threshold_counts_as_met() {
    let mut session = session();
    session.add_modifier(VictoryModifier::new("resource_dominance", "brokenPack").with_threshold(0.0));
    let snapshot = GameStateSnapshot::new(Faction::FactionB, 2);

    let result = session.check(&snapshot);

    assert_eq!(result.progress_of("resource_dominance"), Some(100.0));
    assert_eq!(result.winning_condition_id.as_deref(), Some("resource_dominance"));
    assert_eq!(result.winning_faction, Some(Faction::FactionB));
    assert!(result.progress.values().all(|value| value.is_finite()));
}

#[test]
fn meter_suppression_awards_faction_b() {
    let session = session();
    let snapshot = GameStateSnapshot::new(Faction::FactionA, 20).with_meter(8);

    let result = session.check(&snapshot);

    assert_eq!(result.winning_condition_id.as_deref(), Some("meter_suppression"));
    assert_eq!(result.winning_faction, Some(Faction::FactionB));
    assert_eq!(result.progress_of("meter_supremacy"), Some(8.0 / 90.0 * 100.0));
}
