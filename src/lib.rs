pub mod game;
pub mod victory;

use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

pub use game::{Faction, FactionStanding, GameStateSnapshot, SnapshotError, AGENDA_MAX, METER_MAX};
pub use victory::{
    Attribution, CatalogError, Comparison, ConditionCatalog, ConditionId, ConditionRule,
    CustomRule, CustomRuleRegistry, Evaluator, FactionAffinity, FactionScope, Metric,
    ModifierLayer, ModifierStatus, SessionConfig, SessionError, StandingMetric, TieBreakConfig,
    TieBreakOutcome, TieBreakRule, VictoryConditionDef, VictoryModifier, VictoryResult,
    VictorySession,
};

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    set_panic_hook();
}

fn to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn snapshot_to_js_error(error: SnapshotError) -> JsValue {
    to_js(&error).unwrap_or_else(|serialize_err| serialize_err)
}

// 进度表是 BTreeMap，按 JSON 兼容方式序列化为普通对象而不是 Map。
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(JsValue::from)
}

fn parse_config(config_json: Option<String>) -> Result<SessionConfig, JsValue> {
    match config_json {
        Some(json) => serde_json::from_str(&json).map_err(to_js_error),
        None => Ok(SessionConfig::default()),
    }
}

#[wasm_bindgen]
pub struct VictoryEngine {
    session: VictorySession,
}

#[wasm_bindgen]
impl VictoryEngine {
    /// 不传目录时使用内置胜利条件目录。
    #[wasm_bindgen(constructor)]
    pub fn new(
        catalog_json: Option<String>,
        config_json: Option<String>,
    ) -> Result<VictoryEngine, JsValue> {
        let catalog = match catalog_json {
            Some(json) => ConditionCatalog::from_json(&json),
            None => ConditionCatalog::builtin(),
        }
        .map_err(to_js_error)?;
        let config = parse_config(config_json)?;
        let session = VictorySession::new(catalog, CustomRuleRegistry::with_builtins(), config)
            .map_err(to_js_error)?;
        Ok(VictoryEngine { session })
    }

    #[wasm_bindgen(js_name = "addModifier")]
    pub fn add_modifier(&mut self, modifier: JsValue) -> Result<bool, JsValue> {
        let modifier: VictoryModifier = from_value(modifier).map_err(JsValue::from)?;
        Ok(self.register_modifier(modifier))
    }

    pub fn add_modifier_json(&mut self, modifier_json: &str) -> Result<bool, JsValue> {
        let modifier: VictoryModifier =
            serde_json::from_str(modifier_json).map_err(to_js_error)?;
        Ok(self.register_modifier(modifier))
    }

    #[wasm_bindgen(js_name = "removeModifier")]
    pub fn remove_modifier(&mut self, source: &str) -> u32 {
        self.session.remove_modifier(source) as u32
    }

    #[wasm_bindgen(js_name = "effectiveConditions")]
    pub fn effective_conditions(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.effective_conditions())
    }

    pub fn effective_conditions_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.effective_conditions()).map_err(to_js_error)
    }

    pub fn check(&self, snapshot: JsValue) -> Result<JsValue, JsValue> {
        let snapshot: GameStateSnapshot = from_value(snapshot).map_err(JsValue::from)?;
        to_js(&self.session.check(&snapshot))
    }

    pub fn check_json(&self, snapshot_json: &str) -> Result<String, JsValue> {
        let snapshot: GameStateSnapshot =
            serde_json::from_str(snapshot_json).map_err(to_js_error)?;
        serde_json::to_string(&self.session.check(&snapshot)).map_err(to_js_error)
    }

    fn register_modifier(&mut self, modifier: VictoryModifier) -> bool {
        let target = modifier.target_condition_id.clone();
        let source = modifier.source.clone();
        match self.session.add_modifier(modifier) {
            ModifierStatus::Applied => true,
            ModifierStatus::UnknownTarget => {
                let message = format!(
                    "victory modifier from `{source}` targets unknown condition `{target}`; ignored"
                );
                web_sys::console::warn_1(&message.into());
                false
            }
        }
    }
}

/// 使用内置目录、无扩展包补丁判定一次胜负。
#[wasm_bindgen(js_name = "checkVictory")]
pub fn check_victory(snapshot: JsValue) -> Result<JsValue, JsValue> {
    let snapshot: GameStateSnapshot = from_value(snapshot).map_err(JsValue::from)?;
    let session = VictorySession::builtin().map_err(to_js_error)?;
    to_js(&session.check(&snapshot))
}

#[wasm_bindgen(js_name = "builtinConditions")]
pub fn builtin_conditions() -> Result<JsValue, JsValue> {
    let catalog = ConditionCatalog::builtin().map_err(to_js_error)?;
    to_js(&catalog.definitions())
}

#[wasm_bindgen(js_name = "validateSnapshot")]
pub fn validate_snapshot(snapshot: JsValue) -> Result<(), JsValue> {
    let snapshot: GameStateSnapshot = from_value(snapshot).map_err(JsValue::from)?;
    snapshot.integrity_check().map_err(snapshot_to_js_error)
}

#[cfg(feature = "console_error_panic_hook")]
fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
fn set_panic_hook() {}
