use js_sys::Function;
use serde::Deserialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use unveil_core::{
    Config, CounterId, CounterOptions, Disposer, ElementDecl, Engine, Inputs, MotionQuery,
    Outputs, ParallaxOptions, Rect, RevealOptions, SubscriptionId,
};

#[wasm_bindgen]
pub struct UnveilEngine {
    core: Engine,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Deserialize `value`, or fall back to `T::default()` for undefined/null.
fn from_js_or_default<T>(value: JsValue, what: &str) -> Result<T, JsError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if jsvalue_is_undefined_or_null(&value) {
        return Ok(T::default());
    }
    swb::from_value(value).map_err(|e| JsError::new(&format!("{what} error: {e}")))
}

fn rect_from_js(value: JsValue) -> Result<Rect, JsError> {
    swb::from_value(value).map_err(|e| JsError::new(&format!("rect error: {e}")))
}

#[derive(Deserialize)]
struct GroupMember {
    element: String,
    rect: Rect,
}

/// `prefers-reduced-motion` probe backed by a JS callback returning a boolean
/// (or undefined/null when the query is unsupported).
struct JsMotionQuery {
    f: Function,
}

impl MotionQuery for JsMotionQuery {
    fn prefers_reduced_motion(&self) -> Option<bool> {
        match self.f.call0(&JsValue::UNDEFINED) {
            Ok(val) => val.as_bool(),
            Err(_) => None,
        }
    }
}

#[wasm_bindgen]
impl UnveilEngine {
    /// Create a new engine instance. Pass a config object or undefined/null for defaults.
    /// Example:
    ///   new UnveilEngine({ reveal_safety_net: 5, reveal: { stagger: 0.15 } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<UnveilEngine, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = from_js_or_default(config, "config")?;
        cfg.validate()
            .map_err(|e| JsError::new(&format!("config error: {e}")))?;
        Ok(UnveilEngine {
            core: Engine::new(cfg),
        })
    }

    /// Read the motion preference once through `query() -> boolean | undefined`.
    /// Call before registering anything.
    #[wasm_bindgen(js_name = init_motion)]
    pub fn init_motion(&mut self, query: Function) {
        let query = JsMotionQuery { f: query };
        self.core = std::mem::take(&mut self.core).with_motion_query(&query);
    }

    /// Register one element for a one-shot reveal. Returns the group id.
    #[wasm_bindgen(js_name = register_reveal)]
    pub fn register_reveal(
        &mut self,
        element: String,
        rect: JsValue,
        options: JsValue,
    ) -> Result<u32, JsError> {
        let rect = rect_from_js(rect)?;
        let opts: RevealOptions = from_js_or_default(options, "reveal options")?;
        let gid = self
            .core
            .register_reveal(element, rect, opts)
            .map_err(|e| JsError::new(&format!("register_reveal: {e}")))?;
        Ok(gid.0)
    }

    /// Register `[{ element, rect }, ...]` as one staggered group. Returns the group id.
    #[wasm_bindgen(js_name = register_reveal_group)]
    pub fn register_reveal_group(&mut self, members: JsValue, options: JsValue) -> Result<u32, JsError> {
        let members: Vec<GroupMember> = swb::from_value(members)
            .map_err(|e| JsError::new(&format!("group members error: {e}")))?;
        let opts: RevealOptions = from_js_or_default(options, "reveal options")?;
        let gid = self
            .core
            .register_reveal_group(members.into_iter().map(|m| (m.element, m.rect)), opts)
            .map_err(|e| JsError::new(&format!("register_reveal_group: {e}")))?;
        Ok(gid.0)
    }

    /// Register a count-up counter. `target` must be an integer. Returns the counter id.
    #[wasm_bindgen(js_name = register_counter)]
    pub fn register_counter(
        &mut self,
        element: String,
        rect: JsValue,
        target: f64,
        options: JsValue,
    ) -> Result<u32, JsError> {
        if !target.is_finite() || target.fract() != 0.0 {
            return Err(JsError::new(&format!(
                "register_counter: target must be an integer, got {target}"
            )));
        }
        // i64::MAX is not exactly representable; 2^63 rounds onto it.
        if target < i64::MIN as f64 || target >= i64::MAX as f64 {
            return Err(JsError::new(&format!(
                "register_counter: target {target} is out of range"
            )));
        }
        let rect = rect_from_js(rect)?;
        let opts: CounterOptions = from_js_or_default(options, "counter options")?;
        let cid = self
            .core
            .register_counter(element, rect, target as i64, opts)
            .map_err(|e| JsError::new(&format!("register_counter: {e}")))?;
        Ok(cid.0)
    }

    /// Register a scroll-linked parallax binding. Returns the binding id.
    #[wasm_bindgen(js_name = register_parallax)]
    pub fn register_parallax(
        &mut self,
        element: String,
        rect: JsValue,
        options: JsValue,
    ) -> Result<u32, JsError> {
        let rect = rect_from_js(rect)?;
        let opts: ParallaxOptions = from_js_or_default(options, "parallax options")?;
        let pid = self
            .core
            .register_parallax(element, rect, opts)
            .map_err(|e| JsError::new(&format!("register_parallax: {e}")))?;
        Ok(pid.0)
    }

    /// Register every unknown declaration. Returns the created disposers
    /// (`{ kind: "reveal" | "counter" | "parallax", id }`).
    #[wasm_bindgen]
    pub fn scan(&mut self, decls: JsValue) -> Result<JsValue, JsError> {
        let decls: Vec<ElementDecl> =
            swb::from_value(decls).map_err(|e| JsError::new(&format!("scan parse error: {e}")))?;
        let registered = self.core.scan(&decls);
        swb::to_value(&registered).map_err(|e| JsError::new(&format!("scan output error: {e}")))
    }

    /// Same as `scan`, for declarations embedded in the page as a JSON string.
    #[wasm_bindgen(js_name = scan_json)]
    pub fn scan_json(&mut self, json: &str) -> Result<JsValue, JsError> {
        let decls: Vec<ElementDecl> = serde_json::from_str(json)
            .map_err(|e| JsError::new(&format!("scan_json parse error: {e}")))?;
        let registered = self.core.scan(&decls);
        swb::to_value(&registered).map_err(|e| JsError::new(&format!("scan output error: {e}")))
    }

    /// Tear down a registration given a disposer object. Returns false for stale disposers.
    #[wasm_bindgen]
    pub fn dispose(&mut self, disposer: JsValue) -> Result<bool, JsError> {
        let disposer: Disposer = swb::from_value(disposer)
            .map_err(|e| JsError::new(&format!("disposer error: {e}")))?;
        Ok(self.core.dispose(disposer))
    }

    /// Dispose every registration (client-side navigation away from the page).
    #[wasm_bindgen(js_name = reset_page)]
    pub fn reset_page(&mut self) {
        self.core.reset_page();
    }

    /// Forward a `prefers-reduced-motion` change notification.
    #[wasm_bindgen(js_name = set_reduced_motion)]
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        self.core.set_reduced_motion(reduced);
    }

    /// Call `listener(reduced: boolean)` whenever the preference changes. Returns a subscription id.
    #[wasm_bindgen(js_name = subscribe_motion)]
    pub fn subscribe_motion(&mut self, listener: Function) -> u32 {
        let id = self.core.motion_mut().subscribe(move |reduced| {
            let _ = listener.call1(&JsValue::UNDEFINED, &JsValue::from_bool(reduced));
        });
        id.0
    }

    /// Drop a listener added with `subscribe_motion`. Returns false for unknown ids.
    #[wasm_bindgen(js_name = unsubscribe_motion)]
    pub fn unsubscribe_motion(&mut self, id: u32) -> bool {
        self.core.motion_mut().unsubscribe(SubscriptionId(id))
    }

    #[wasm_bindgen(js_name = prefers_reduced_motion)]
    pub fn prefers_reduced_motion(&self) -> bool {
        self.core.motion().prefers_reduced()
    }

    /// Live display text of a counter, or undefined for unknown ids.
    #[wasm_bindgen(js_name = counter_text)]
    pub fn counter_text(&self, counter_id: u32) -> Option<String> {
        self.core
            .counter_text(CounterId(counter_id))
            .map(str::to_string)
    }

    /// Changes produced by registrations since the last update (e.g. initial hidden styles),
    /// for hosts that apply them before the first paint.
    #[wasm_bindgen(js_name = drain_pending)]
    pub fn drain_pending(&mut self) -> Result<JsValue, JsError> {
        let out: Outputs = self.core.drain_pending();
        swb::to_value(&out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// Step the engine by dt (seconds) with inputs JSON. Returns Outputs JSON.
    #[wasm_bindgen]
    pub fn update(&mut self, dt: f32, inputs_json: JsValue) -> Result<JsValue, JsError> {
        let inputs: Inputs = from_js_or_default(inputs_json, "inputs")?;
        let out: &Outputs = self.core.update(dt, inputs);
        swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
