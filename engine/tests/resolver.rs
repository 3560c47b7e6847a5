mod common;

use common::*;
use engine::combat::resolver::compute_damage;
use engine::combat::InvalidReason;
use engine::content::ContentCatalog;
use engine::{
    has_status, resolve, CombatAction, CombatEvent, CombatState, Combatant, Element, Inventory,
    ResolveContext, Side, StatusTag, TargetMode,
};

fn ctx<'a>(content: &'a ContentCatalog, inventory: &'a Inventory) -> ResolveContext<'a> {
    ResolveContext {
        skills: &content.skills,
        items: &content.items,
        inventory,
    }
}

fn numbers(state: &CombatState) -> Vec<(String, i32, i32)> {
    state
        .combatants
        .values()
        .map(|c| (c.id.clone(), c.hp, c.sp))
        .collect()
}

#[test]
fn weakness_attack_scenario_grants_one_extra_turn_and_wins() {
    let content = content(vec![], vec![]);
    let mut s = session(vec![dreamer()], vec![nightmare()], &content, Inventory::new());
    assert_eq!(s.active().unwrap().id, "a1");

    let events = s.submit(&CombatAction::attack("a1", "e1"));
    assert!(events.contains(&CombatEvent::Damaged {
        source: "a1".into(),
        target: "e1".into(),
        element: Element::Physical,
        amount: 31,
        hp_left: 9,
        weakness: true,
        resisted: false,
    }));
    assert!(events.contains(&CombatEvent::ExtraTurn {
        combatant: "a1".into()
    }));
    assert_eq!(s.state().get("e1").unwrap().hp, 9);
    assert_eq!(s.active().unwrap().id, "a1");
    assert_eq!(s.state().round, 1);

    s.submit(&CombatAction::attack("a1", "e1"));
    let st = s.state();
    assert_eq!(st.get("e1").unwrap().hp, 0);
    assert!(st.ended);
    assert_eq!(st.winner, Some(Side::Ally));
    assert_eq!(st.telemetry.extra_turns, 1);
    assert_eq!(st.telemetry.weakness_hits, 2);

    let log = st.log.iter().cloned().collect::<Vec<_>>().join("\n");
    insta::assert_snapshot!(log, @r"
    [START] Party (Dreamer) vs Test Grounds (Nightmare)
    [ROUND] 1 → Dreamer, Nightmare
    [TURN][Dreamer] round 1
    [DMG][Nightmare] 40 → 9 (−31)
    [TURN][Dreamer] weakness struck → extra turn
    [TURN][Dreamer] round 1
    [DMG][Nightmare] 9 → 0 (−31)
    [STATE][Nightmare] drops to 0 HP → Defeated
    [END] winner=ally round=1
    ");
}

#[test]
fn guard_halves_exactly_one_hit_then_is_spent() {
    let content = content(vec![], vec![]);
    let mut ally = actor("warden", "Warden", stats(50, 0, 10, 5, 10, 5, 10, 5));
    ally.skills.clear();
    let brute = actor("brute", "Brute", stats(60, 0, 20, 5, 5, 5, 5, 5));
    let mut s = session(vec![ally], vec![brute], &content, Inventory::new());

    s.submit(&CombatAction::guard("a1"));
    assert!(has_status(s.state().get("a1").unwrap(), StatusTag::Guarded));
    assert_eq!(s.state().telemetry.guards_used, 1);
    assert_eq!(s.active().unwrap().id, "e1");

    // base = round(20 * 1.4 - 10 * 0.8) = 20, guarded → 10
    let events = s.submit(&CombatAction::attack("e1", "a1"));
    assert_eq!(s.state().get("a1").unwrap().hp, 40);
    assert!(!has_status(s.state().get("a1").unwrap(), StatusTag::Guarded));
    assert!(events.contains(&CombatEvent::StatusCleared {
        target: "a1".into(),
        status: StatusTag::Guarded
    }));

    // round 2: no second discount
    assert_eq!(s.state().round, 2);
    s.submit(&CombatAction::end("a1"));
    s.submit(&CombatAction::attack("e1", "a1"));
    assert_eq!(s.state().get("a1").unwrap().hp, 20);
}

#[test]
fn guard_lapses_when_owner_starts_next_turn() {
    let content = content(vec![], vec![]);
    let ally = actor("warden", "Warden", stats(50, 0, 10, 5, 10, 5, 10, 5));
    let idler = actor("idler", "Idler", stats(60, 0, 20, 5, 5, 5, 5, 5));
    let mut s = session(vec![ally], vec![idler], &content, Inventory::new());

    s.submit(&CombatAction::guard("a1"));
    let events = s.submit(&CombatAction::end("e1"));
    assert_eq!(s.active().unwrap().id, "a1");
    assert!(!has_status(s.state().get("a1").unwrap(), StatusTag::Guarded));
    assert!(events.contains(&CombatEvent::StatusCleared {
        target: "a1".into(),
        status: StatusTag::Guarded
    }));
}

#[test]
fn modifiers_stack_in_order_and_floor_at_one() {
    let mut attacker = Combatant::new("a1", Side::Ally, dreamer());
    let mut target = Combatant::new("e1", Side::Enemy, nightmare());
    let plain = compute_damage(&attacker, &target, Element::Physical, None);
    assert_eq!(plain.amount, 31);

    engine::add_status(&mut attacker, StatusTag::Weakened);
    engine::add_status(&mut target, StatusTag::Vulnerable);
    engine::add_status(&mut target, StatusTag::Guarded);
    // 22 * 0.8 * 1.3 * 0.5 * 1.4 = 16.016
    let stacked = compute_damage(&attacker, &target, Element::Physical, None);
    assert_eq!(stacked.amount, 16);

    let feeble = Combatant::new(
        "a2",
        Side::Ally,
        actor("feeble", "Feeble", stats(10, 0, 0, 0, 0, 0, 0, 0)),
    );
    let mut wall = actor("wall", "Wall", stats(10, 0, 0, 0, 99, 99, 0, 0));
    wall.resistances = vec![Element::Physical];
    let wall = Combatant::new("e2", Side::Enemy, wall);
    // floor 4, then power 0.1 → round(0.4) = 0, resisted → floor 1
    let roll = compute_damage(&feeble, &wall, Element::Physical, Some(0.1));
    assert!(roll.resisted);
    assert_eq!(roll.amount, 1);
}

#[test]
fn magic_elements_use_magic_against_resistance() {
    let mut mage = dreamer();
    mage.stats.magic = 30;
    let attacker = Combatant::new("a1", Side::Ally, mage);
    let target = Combatant::new("e1", Side::Enemy, nightmare());
    // round(30 * 1.4 - 5 * 0.8) = 38, power 1.5 → 57
    let roll = compute_damage(&attacker, &target, Element::Fire, Some(1.5));
    assert_eq!(roll.amount, 57);
    assert!(!roll.weakness);
}

#[test]
fn all_target_skill_costs_sp_once() {
    let wave = skill("wave", 10, Element::Fire, 1.0, TargetMode::All, vec![]);
    let content = content(vec![wave], vec![]);
    let mut caster = actor("caster", "Caster", stats(50, 30, 5, 20, 5, 5, 10, 5));
    caster.skills = vec!["wave".into()];
    let dummy = |id: &str| actor(id, id, stats(100, 0, 5, 5, 5, 0, 1, 1));
    let mut s = session(
        vec![caster],
        vec![dummy("d1"), dummy("d2"), dummy("d3")],
        &content,
        Inventory::new(),
    );

    let events = s.submit(&CombatAction::skill("a1", "wave", vec![]));
    assert_eq!(s.state().get("a1").unwrap().sp, 20);
    let used = events
        .iter()
        .filter(|e| matches!(e, CombatEvent::SkillUsed { .. }))
        .count();
    assert_eq!(used, 1);
    for id in ["e1", "e2", "e3"] {
        // round(20 * 1.4 - 0) = 28
        assert_eq!(s.state().get(id).unwrap().hp, 72);
    }
}

#[test]
fn all_target_skill_only_hits_opponents_alive_at_resolution() {
    let wave = skill("wave", 0, Element::Wind, 1.0, TargetMode::All, vec![]);
    let content = content(vec![wave], vec![]);
    let mut caster = actor("caster", "Caster", stats(50, 30, 5, 20, 5, 5, 10, 5));
    caster.skills = vec!["wave".into()];
    let dummy = |id: &str| actor(id, id, stats(100, 0, 5, 5, 5, 0, 1, 1));
    let s = session(vec![caster], vec![dummy("d1"), dummy("d2")], &content, Inventory::new());

    let mut state = s.state().clone();
    let e2 = state.combatants.get_mut("e2").unwrap();
    e2.hp = 0;
    e2.alive = false;
    state.queue.retain(|id| id != "e2");

    let inv = Inventory::new();
    let out = resolve(
        &state,
        &CombatAction::skill("a1", "wave", vec!["e1".into(), "e2".into()]),
        &ctx(&content, &inv),
    );
    let hits: Vec<_> = out
        .events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::Damaged { target, .. } => Some(target.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(hits, vec!["e1".to_string()]);
    assert_eq!(out.state.get("e2").unwrap().hp, 0);
}

#[test]
fn insufficient_sp_is_a_reported_no_op() {
    let bolt = skill("bolt", 10, Element::Thunder, 1.0, TargetMode::One, vec![]);
    let content = content(vec![bolt], vec![]);
    let mut caster = actor("caster", "Caster", stats(50, 5, 5, 20, 5, 5, 10, 5));
    caster.skills = vec!["bolt".into()];
    let s = session(vec![caster], vec![nightmare()], &content, Inventory::new());

    let inv = Inventory::new();
    let before = s.state().clone();
    let out = resolve(
        &before,
        &CombatAction::skill("a1", "bolt", vec!["e1".into()]),
        &ctx(&content, &inv),
    );
    assert_eq!(
        out.events,
        vec![CombatEvent::NoSp {
            source: "a1".into(),
            skill: "bolt".into(),
            cost: 10,
            available: 5,
        }]
    );
    assert_eq!(numbers(&out.state), numbers(&before));
    assert_eq!(out.state.active, before.active);
    assert_eq!(out.inventory, inv);
}

#[test]
fn attacking_a_dead_target_changes_nothing() {
    let content = content(vec![], vec![]);
    let s = session(
        vec![dreamer()],
        vec![nightmare(), actor("imp", "Imp", stats(20, 0, 5, 5, 5, 5, 2, 2))],
        &content,
        Inventory::new(),
    );
    let mut state = s.state().clone();
    let e1 = state.combatants.get_mut("e1").unwrap();
    e1.hp = 0;
    e1.alive = false;
    state.queue.retain(|id| id != "e1");

    let inv = Inventory::new();
    let out = resolve(&state, &CombatAction::attack("a1", "e1"), &ctx(&content, &inv));
    assert_eq!(
        out.events,
        vec![CombatEvent::Invalid {
            source: "a1".into(),
            reason: InvalidReason::TargetDefeated { target: "e1".into() },
        }]
    );
    assert_eq!(numbers(&out.state), numbers(&state));
    assert_eq!(out.state.queue, state.queue);
}

#[test]
fn attacking_an_ally_is_refused() {
    let content = content(vec![], vec![]);
    let s = session(
        vec![dreamer(), actor("buddy", "Buddy", stats(30, 0, 5, 5, 5, 5, 2, 2))],
        vec![nightmare()],
        &content,
        Inventory::new(),
    );
    let inv = Inventory::new();
    let out = resolve(s.state(), &CombatAction::attack("a1", "a2"), &ctx(&content, &inv));
    assert!(out.events[0].is_failure());
    assert_eq!(numbers(&out.state), numbers(s.state()));
}

#[test]
fn ended_session_and_dead_source_return_input_unchanged() {
    let content = content(vec![], vec![]);
    let s = session(vec![dreamer()], vec![nightmare()], &content, Inventory::new());
    let inv = Inventory::new();

    let mut ended = s.state().clone();
    ended.ended = true;
    ended.winner = Some(Side::Enemy);
    let out = resolve(&ended, &CombatAction::attack("a1", "e1"), &ctx(&content, &inv));
    assert!(out.events.is_empty());
    assert_eq!(out.state, ended);

    let mut dead = s.state().clone();
    let a1 = dead.combatants.get_mut("a1").unwrap();
    a1.hp = 0;
    a1.alive = false;
    let out = resolve(&dead, &CombatAction::attack("a1", "e1"), &ctx(&content, &inv));
    assert!(out.events.is_empty());
    assert_eq!(out.state, dead);

    let out = resolve(s.state(), &CombatAction::guard("ghost"), &ctx(&content, &inv));
    assert!(out.events.is_empty());
    assert_eq!(&out.state, s.state());
}

#[test]
fn only_the_active_combatant_may_act() {
    let content = content(vec![], vec![]);
    let s = session(vec![dreamer()], vec![nightmare()], &content, Inventory::new());
    let inv = Inventory::new();
    let out = resolve(s.state(), &CombatAction::attack("e1", "a1"), &ctx(&content, &inv));
    assert_eq!(
        out.events,
        vec![CombatEvent::Invalid {
            source: "e1".into(),
            reason: InvalidReason::NotActive,
        }]
    );
    assert_eq!(out.state.get("a1").unwrap().hp, 50);
}

#[test]
fn extra_turn_is_granted_at_most_once_per_round() {
    let content = content(vec![], vec![]);
    let weak = |id: &str, agi: i32| {
        let mut a = actor(id, id, stats(100, 0, 5, 5, 8, 5, agi, 1));
        a.weaknesses = vec![Element::Physical];
        a
    };
    let mut s = session(
        vec![dreamer()],
        vec![weak("slow", 1), weak("slower", 2)],
        &content,
        Inventory::new(),
    );
    assert_eq!(s.state().queue, vec!["a1", "e2", "e1"]);

    s.submit(&CombatAction::attack("a1", "e1"));
    assert_eq!(s.active().unwrap().id, "a1");
    let events = s.submit(&CombatAction::attack("a1", "e2"));
    assert!(!events
        .iter()
        .any(|e| matches!(e, CombatEvent::ExtraTurn { .. })));
    assert_eq!(s.active().unwrap().id, "e2");
    assert_eq!(s.state().telemetry.extra_turns, 1);
    assert_eq!(s.state().telemetry.weakness_hits, 2);

    // next round replenishes the flag
    s.submit(&CombatAction::end("e2"));
    s.submit(&CombatAction::end("e1"));
    assert_eq!(s.state().round, 2);
    assert_eq!(s.active().unwrap().id, "a1");
    s.submit(&CombatAction::attack("a1", "e1"));
    assert_eq!(s.active().unwrap().id, "a1");
    assert_eq!(s.state().telemetry.extra_turns, 2);
}

#[test]
fn skill_statuses_land_only_on_survivors() {
    let rend = skill(
        "rend",
        0,
        Element::Physical,
        1.0,
        TargetMode::One,
        vec![StatusTag::Vulnerable],
    );
    let content = content(vec![rend], vec![]);
    let mut hero = dreamer();
    hero.skills = vec!["rend".into()];
    let sturdy = actor("sturdy", "Sturdy", stats(100, 0, 5, 5, 8, 5, 1, 1));
    let frail = actor("frail", "Frail", stats(10, 0, 5, 5, 8, 5, 2, 1));
    let s = session(vec![hero], vec![sturdy, frail], &content, Inventory::new());
    let inv = Inventory::new();

    let out = resolve(
        s.state(),
        &CombatAction::skill("a1", "rend", vec!["e1".into()]),
        &ctx(&content, &inv),
    );
    assert!(has_status(out.state.get("e1").unwrap(), StatusTag::Vulnerable));

    let out = resolve(
        s.state(),
        &CombatAction::skill("a1", "rend", vec!["e2".into()]),
        &ctx(&content, &inv),
    );
    let frail = out.state.get("e2").unwrap();
    assert_eq!(frail.hp, 0);
    assert!(!has_status(frail, StatusTag::Vulnerable));
    assert!(!out.state.queue.contains(&"e2".to_string()));
}

#[test]
fn unknown_or_unlearned_skills_are_refused() {
    let bolt = skill("bolt", 0, Element::Thunder, 1.0, TargetMode::One, vec![]);
    let content = content(vec![bolt], vec![]);
    let s = session(vec![dreamer()], vec![nightmare()], &content, Inventory::new());
    let inv = Inventory::new();

    let out = resolve(
        s.state(),
        &CombatAction::skill("a1", "meteor", vec!["e1".into()]),
        &ctx(&content, &inv),
    );
    assert_eq!(
        out.events,
        vec![CombatEvent::Invalid {
            source: "a1".into(),
            reason: InvalidReason::UnknownSkill {
                skill: "meteor".into()
            },
        }]
    );

    let out = resolve(
        s.state(),
        &CombatAction::skill("a1", "bolt", vec!["e1".into()]),
        &ctx(&content, &inv),
    );
    assert_eq!(
        out.events,
        vec![CombatEvent::Invalid {
            source: "a1".into(),
            reason: InvalidReason::SkillNotKnown {
                skill: "bolt".into()
            },
        }]
    );
}

#[test]
fn item_heals_clamped_and_consumes_one_unit() {
    let content = content(vec![], vec![item("tonic", 30, 5)]);
    let s = session(
        vec![dreamer(), actor("buddy", "Buddy", stats(40, 10, 5, 5, 5, 5, 2, 2))],
        vec![nightmare()],
        &content,
        Inventory::new(),
    );
    let mut state = s.state().clone();
    state.combatants.get_mut("a2").unwrap().hp = 5;
    state.combatants.get_mut("a1").unwrap().hp = 45;
    let inv = Inventory::from([("tonic".to_string(), 2)]);

    let out = resolve(&state, &CombatAction::item("a1", "tonic", "a2"), &ctx(&content, &inv));
    assert_eq!(out.state.get("a2").unwrap().hp, 35);
    assert_eq!(out.state.get("a2").unwrap().sp, 10);
    assert_eq!(out.inventory["tonic"], 1);
    assert_eq!(inv["tonic"], 2, "caller's inventory is not touched");
    assert_ne!(out.state.active.as_deref(), Some("a1"));

    let out = resolve(&state, &CombatAction::item("a1", "tonic", "a1"), &ctx(&content, &inv));
    assert_eq!(out.state.get("a1").unwrap().hp, 50);
    assert!(out.events.contains(&CombatEvent::Healed {
        target: "a1".into(),
        hp: 5,
        sp: 0,
    }));
}

#[test]
fn item_failures_leave_everything_in_place() {
    let content = content(vec![], vec![item("tonic", 30, 0)]);
    let s = session(vec![dreamer()], vec![nightmare()], &content, Inventory::new());
    let mut state = s.state().clone();
    state.combatants.get_mut("a1").unwrap().hp = 10;

    let empty = Inventory::from([("tonic".to_string(), 0)]);
    let out = resolve(&state, &CombatAction::item("a1", "tonic", "a1"), &ctx(&content, &empty));
    assert_eq!(
        out.events,
        vec![CombatEvent::OutOfStock {
            source: "a1".into(),
            item: "tonic".into(),
        }]
    );
    assert_eq!(out.inventory, empty);
    assert_eq!(out.state.get("a1").unwrap().hp, 10);

    let stocked = Inventory::from([("tonic".to_string(), 3)]);
    let out = resolve(&state, &CombatAction::item("a1", "tonic", "e1"), &ctx(&content, &stocked));
    assert_eq!(
        out.events,
        vec![CombatEvent::Invalid {
            source: "a1".into(),
            reason: InvalidReason::TargetNotAlly { target: "e1".into() },
        }]
    );
    assert_eq!(out.inventory, stocked);
    assert_eq!(numbers(&out.state), numbers(&state));
}
