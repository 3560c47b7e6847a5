use anyhow::{Context, Result};
use engine::api::{simulate_encounter, EncounterConfig};
use engine::content::ContentCatalog;
use engine::{choose_action, resolve, CombatAction, CombatState, Inventory, ItemCatalog, ResolveContext, SkillCatalog};
use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use serde::Deserialize;
use serde_json::{json, Value};

/// Body of a `resolveJson` call. Catalogs default to the built-in content.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub state: CombatState,
    pub action: CombatAction,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub skills: Option<SkillCatalog>,
    #[serde(default)]
    pub items: Option<ItemCatalog>,
}

fn envelope(result: Result<Value>) -> String {
    let payload = match result {
        Ok(value) => json!({ "ok": true, "result": value }),
        Err(e) => json!({ "ok": false, "error": format!("{:#}", e) }),
    };
    payload.to_string()
}

fn respond(env: &JNIEnv, result: Result<Value>) -> jstring {
    match env.new_string(envelope(result)) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn read_input(env: &mut JNIEnv, json: &JString) -> Result<String> {
    let s: String = env.get_string(json).context("get_string failed")?.into();
    Ok(s)
}

/// Resolve one action against a caller-held state snapshot.
pub fn resolve_json(input: &str) -> Result<Value> {
    let req: ResolveRequest = serde_json::from_str(input).context("invalid_request")?;
    let builtin = match (&req.skills, &req.items) {
        (Some(_), Some(_)) => None,
        _ => Some(ContentCatalog::builtin()?),
    };
    let skills = req
        .skills
        .as_ref()
        .or(builtin.as_ref().map(|c| &c.skills))
        .context("no skill catalog")?;
    let items = req
        .items
        .as_ref()
        .or(builtin.as_ref().map(|c| &c.items))
        .context("no item catalog")?;

    let ctx = ResolveContext {
        skills,
        items,
        inventory: &req.inventory,
    };
    let out = resolve(&req.state, &req.action, &ctx);
    Ok(serde_json::to_value(out)?)
}

/// The AI's action for the active enemy in a state snapshot, or null.
pub fn choose_enemy_action_json(input: &str) -> Result<Value> {
    let state: CombatState = serde_json::from_str(input).context("invalid_state")?;
    let content = ContentCatalog::builtin()?;
    Ok(serde_json::to_value(choose_action(&state, &content.skills))?)
}

pub fn simulate_encounter_json(input: &str) -> Result<Value> {
    let cfg: EncounterConfig = serde_json::from_str(input).context("invalid_config")?;
    Ok(serde_json::to_value(simulate_encounter(cfg)?)?)
}

#[no_mangle]
pub extern "system" fn Java_com_dreamcombat_Ffi_version<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    match env.new_string(concat!("dream-ffi ", env!("CARGO_PKG_VERSION"))) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "system" fn Java_com_dreamcombat_Ffi_resolveJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let result = read_input(&mut env, &json).and_then(|input| resolve_json(&input));
    respond(&env, result)
}

#[no_mangle]
pub extern "system" fn Java_com_dreamcombat_Ffi_chooseEnemyActionJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let result = read_input(&mut env, &json).and_then(|input| choose_enemy_action_json(&input));
    respond(&env, result)
}

#[no_mangle]
pub extern "system" fn Java_com_dreamcombat_Ffi_simulateEncounterJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let result = read_input(&mut env, &json).and_then(|input| simulate_encounter_json(&input));
    respond(&env, result)
}
