//! Browser presentation layer (wasm32 only).
//!
//! Owns every DOM, canvas and audio concern. Game logic lives entirely in
//! `crate::quiz`; this module feeds inputs into the engine and renders the
//! `GameEvent`s it emits. State is held in a thread-local `RefCell`, mutated
//! only from UI callbacks and timer ticks on the single JS thread.

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, Element, HtmlImageElement};

use crate::quiz::{
    provider, Difficulty, GameEvent, Outcome, Phase, PowerupKind, ProviderConfig, QuizEngine,
    TimerGeneration,
};

mod effects;
use effects::EffectsLayer;

const HIGH_SCORE_KEY: &str = "hq-high-score";

// Generic silhouette shown when the whole fallback chain fails. Deliberately
// answer-neutral.
const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml;utf8,\
<svg xmlns='http://www.w3.org/2000/svg' width='300' height='420'>\
<rect width='300' height='420' fill='%23222233'/>\
<text x='150' y='230' font-size='120' fill='%23555577' text-anchor='middle'>?</text>\
</svg>";

struct WebState {
    engine: QuizEngine,
    effects: EffectsLayer,
    /// Generation of the countdown run the 1 Hz interval is ticking for.
    timer_generation: TimerGeneration,
    /// Exact `src` attribute we last set on the question image; error events
    /// for any other src belong to an abandoned question and are ignored.
    current_image_src: String,
    image_queue: Vec<String>,
    high_score: i64,
}

thread_local! {
    static QUIZ_STATE: RefCell<Option<WebState>> = RefCell::new(None);
}

/// Keys are baked in at build time; missing keys disable the remote fetch and
/// the provider silently uses the pinned fallback list.
fn provider_config() -> ProviderConfig {
    let public_key = option_env!("HERO_QUIZ_PUBLIC_KEY").unwrap_or("");
    let private_key = option_env!("HERO_QUIZ_PRIVATE_KEY").unwrap_or("");
    ProviderConfig {
        remote_enabled: !public_key.is_empty() && !private_key.is_empty(),
        public_key: public_key.to_string(),
        private_key: private_key.to_string(),
        ..ProviderConfig::default()
    }
}

pub fn start_quiz_mode() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    build_ui(&doc)?;

    let fx_canvas: web_sys::HtmlCanvasElement = doc
        .get_element_by_id("hq-fx-canvas")
        .ok_or_else(|| JsValue::from_str("no effects canvas"))?
        .dyn_into()?;
    let effects = EffectsLayer::new(fx_canvas)?;

    let high_score = read_high_score();
    set_text(&doc, "hq-highscore", &format!("High score: {high_score}"));

    let engine = QuizEngine::new(
        provider_config(),
        provider::fallback_pool(crate::FALLBACK_CHARACTERS),
    );

    QUIZ_STATE.with(|cell| {
        cell.replace(Some(WebState {
            engine,
            effects,
            timer_generation: 0,
            current_image_src: String::new(),
            image_queue: Vec::new(),
            high_score,
        }))
    });

    show_screen(&doc, Phase::Welcome);
    register_listeners(&doc)?;
    start_tick_interval(&win)?;
    start_effects_loop();
    Ok(())
}

// --- DOM construction --------------------------------------------------------

fn ensure_div(doc: &Document, id: &str, style: &str) -> Result<Element, JsValue> {
    if let Some(el) = doc.get_element_by_id(id) {
        return Ok(el);
    }
    let el = doc.create_element("div")?;
    el.set_id(id);
    el.set_attribute("style", style).ok();
    doc.body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&el)?;
    Ok(el)
}

fn build_ui(doc: &Document) -> Result<(), JsValue> {
    let screen_style = "position:fixed; left:50%; top:45%; transform:translate(-50%,-50%); \
        width:420px; padding:24px; background:#181824; border:2px solid #333; \
        border-radius:18px; color:#eee; font-family:'Fira Code', monospace; \
        text-align:center; z-index:20; display:none;";
    let button_style = "display:block; margin:8px auto; padding:10px 16px; width:85%; \
        background:#242438; border:1px solid #444; border-radius:8px; cursor:pointer; \
        color:#ffd166; font-size:16px;";

    // Welcome screen
    let welcome = ensure_div(doc, "hq-welcome", screen_style)?;
    welcome.set_inner_html(&format!(
        "<h1 style='margin:0 0 6px'>Hero Quiz</h1>\
         <div id='hq-highscore' style='color:#8f8'>High score: 0</div>\
         <div id='hq-error' style='color:#f66; min-height:20px'></div>\
         <div id='hq-diff-easy' style=\"{button_style}\">Easy</div>\
         <div id='hq-diff-normal' style=\"{button_style}\">Normal</div>\
         <div id='hq-diff-hard' style=\"{button_style}\">Hard</div>"
    ));

    // Loading screen
    let loading = ensure_div(doc, "hq-loading", screen_style)?;
    loading.set_inner_html("<h2>Assembling characters…</h2>");

    // Game screen
    let game = ensure_div(doc, "hq-game", screen_style)?;
    game.set_inner_html(&format!(
        "<div style='display:flex; justify-content:space-between'>\
           <span id='hq-progress'></span>\
           <span id='hq-timer' style='color:#ffd166'></span>\
           <span id='hq-score'>0</span>\
         </div>\
         <div id='hq-streak' style='min-height:18px; color:#8cf'></div>\
         <img id='hq-image' style='width:220px; height:300px; object-fit:cover; \
             border-radius:10px; margin:10px 0' alt='Who is this?'/>\
         <div id='hq-hint' style='min-height:20px; font-size:13px; color:#cc9'></div>\
         <div id='hq-opt-0' class='hq-opt' style=\"{button_style}\"></div>\
         <div id='hq-opt-1' class='hq-opt' style=\"{button_style}\"></div>\
         <div id='hq-opt-2' class='hq-opt' style=\"{button_style}\"></div>\
         <div id='hq-opt-3' class='hq-opt' style=\"{button_style}\"></div>\
         <div style='display:flex; gap:6px; justify-content:center; margin-top:10px'>\
           <span id='hq-pw-fifty' style='cursor:pointer; padding:6px; border:1px solid #555; border-radius:6px'></span>\
           <span id='hq-pw-extend' style='cursor:pointer; padding:6px; border:1px solid #555; border-radius:6px'></span>\
           <span id='hq-pw-hint' style='cursor:pointer; padding:6px; border:1px solid #555; border-radius:6px'></span>\
         </div>"
    ));

    // Results screen
    let results = ensure_div(doc, "hq-results", screen_style)?;
    results.set_inner_html(&format!(
        "<h2>Results</h2>\
         <div id='hq-summary'></div>\
         <div id='hq-review' style='text-align:left; max-height:180px; overflow-y:auto; \
             font-size:13px; margin:10px 0'></div>\
         <div id='hq-review-btn' style=\"{button_style}\">Review answers</div>\
         <div id='hq-again' style=\"{button_style}\">Play again</div>"
    ));

    // Full-viewport effects canvas above the screens, transparent to input.
    if doc.get_element_by_id("hq-fx-canvas").is_none() {
        let c: web_sys::HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id("hq-fx-canvas");
        c.set_width(640);
        c.set_height(640);
        c.set_attribute(
            "style",
            "position:fixed; left:50%; top:45%; transform:translate(-50%,-50%); \
             pointer-events:none; z-index:30;",
        )
        .ok();
        doc.body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&c)?;
    }
    Ok(())
}

// --- Listeners ---------------------------------------------------------------

fn on_click<F: FnMut() + 'static>(doc: &Document, id: &str, mut f: F) -> Result<(), JsValue> {
    let el = doc
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(id))?;
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| f()) as Box<dyn FnMut(_)>);
    el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn register_listeners(doc: &Document) -> Result<(), JsValue> {
    on_click(doc, "hq-diff-easy", || start_with(Difficulty::Easy))?;
    on_click(doc, "hq-diff-normal", || start_with(Difficulty::Normal))?;
    on_click(doc, "hq-diff-hard", || start_with(Difficulty::Hard))?;

    for i in 0..provider::OPTION_COUNT {
        let id = format!("hq-opt-{i}");
        on_click(doc, &id, move || {
            let Some(doc) = window().and_then(|w| w.document()) else {
                return;
            };
            let chosen = doc
                .get_element_by_id(&format!("hq-opt-{i}"))
                .and_then(|el| el.text_content())
                .unwrap_or_default();
            if !chosen.is_empty() {
                dispatch(move |engine| engine.answer(&chosen));
            }
        })?;
    }

    on_click(doc, "hq-pw-fifty", || {
        dispatch(|e| e.use_powerup(PowerupKind::FiftyFifty))
    })?;
    on_click(doc, "hq-pw-extend", || {
        dispatch(|e| e.use_powerup(PowerupKind::ExtendTime))
    })?;
    on_click(doc, "hq-pw-hint", || {
        dispatch(|e| e.use_powerup(PowerupKind::Hint))
    })?;

    on_click(doc, "hq-again", || dispatch(|e| e.reset()))?;
    on_click(doc, "hq-review-btn", || dispatch(|e| e.review_answers()))?;

    // Image fallback chain: step to the next URL on load error, placeholder
    // once exhausted. Errors from a previously shown question are stale.
    if let Some(img) = doc.get_element_by_id("hq-image") {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::Event| {
            let Some(target) = evt.target() else { return };
            let Ok(img) = target.dyn_into::<HtmlImageElement>() else {
                return;
            };
            QUIZ_STATE.with(|cell| {
                if let Some(state) = cell.borrow_mut().as_mut() {
                    let failing = img.get_attribute("src").unwrap_or_default();
                    if failing != state.current_image_src
                        || state.current_image_src == PLACEHOLDER_IMAGE
                    {
                        return;
                    }
                    let next = if state.image_queue.is_empty() {
                        PLACEHOLDER_IMAGE.to_string()
                    } else {
                        state.image_queue.remove(0)
                    };
                    state.current_image_src = next.clone();
                    img.set_attribute("src", &next).ok();
                }
            });
        }) as Box<dyn FnMut(_)>);
        img.add_event_listener_with_callback("error", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn start_with(difficulty: Difficulty) {
    dispatch(move |engine| engine.start(difficulty));
}

// --- Engine plumbing ---------------------------------------------------------

fn dispatch<F: FnOnce(&mut QuizEngine) -> Vec<GameEvent>>(f: F) {
    QUIZ_STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            let events = f(&mut state.engine);
            apply_events(state, events);
        }
    });
}

/// Single persistent 1 Hz tick source. The engine discards ticks whose
/// generation no longer matches the active countdown run, so the interval
/// itself never needs to be torn down mid-session.
fn start_tick_interval(win: &web_sys::Window) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move || {
        QUIZ_STATE.with(|cell| {
            if let Some(state) = cell.borrow_mut().as_mut() {
                let generation = state.timer_generation;
                let events = state.engine.tick(generation);
                apply_events(state, events);
            }
        });
    }) as Box<dyn FnMut()>);
    win.set_interval_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        1000,
    )?;
    closure.forget();
    Ok(())
}

type FrameCallback = std::rc::Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_effects_loop() {
    let f: FrameCallback = std::rc::Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        QUIZ_STATE.with(|cell| {
            if let Some(state) = cell.borrow_mut().as_mut() {
                state.effects.render(ts);
            }
        });
        if let Some(w) = window() {
            let _ =
                w.request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        let _ = w.request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}

async fn fetch_pool(url: String) {
    let fetched = async {
        let response = gloo_net::http::Request::get(&url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.ok() {
            return Err(format!("character endpoint returned {}", response.status()));
        }
        let body = response.text().await.map_err(|e| e.to_string())?;
        provider::parse_pool_payload(&body).map_err(|e| e.to_string())
    }
    .await;
    match fetched {
        Ok(pool) => dispatch(move |engine| engine.pool_ready(pool)),
        Err(message) => {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "character fetch failed, using fallback list: {message}"
            )));
            dispatch(|engine| engine.pool_failed());
        }
    }
}

// --- Event rendering ---------------------------------------------------------

fn apply_events(state: &mut WebState, events: Vec<GameEvent>) {
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    let now = window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0);

    for event in events {
        match event {
            GameEvent::PhaseChanged(phase) => {
                show_screen(&doc, phase);
                if phase == Phase::Welcome {
                    set_text(&doc, "hq-highscore", &format!("High score: {}", state.high_score));
                }
            }
            GameEvent::LoadRequested => {
                if let Some(url) = state.engine.load_url(now as u64) {
                    wasm_bindgen_futures::spawn_local(fetch_pool(url));
                }
            }
            GameEvent::LoadFailed { message } => {
                web_sys::console::warn_1(&JsValue::from_str(&message));
                set_text(&doc, "hq-error", &message);
            }
            GameEvent::QuestionPresented {
                index,
                total,
                options,
                image_url,
            } => {
                set_text(&doc, "hq-error", "");
                set_text(&doc, "hq-hint", "");
                set_text(&doc, "hq-progress", &format!("{} / {}", index + 1, total));
                set_text(&doc, "hq-score", &format!("{}", state.engine.score()));
                render_options(&doc, &options);
                render_powerups(&doc, &state.engine);
                state.image_queue = state
                    .engine
                    .current_question()
                    .map(|q| q.fallback_image_urls.clone())
                    .unwrap_or_default();
                state.current_image_src = image_url.clone();
                if let Some(img) = doc.get_element_by_id("hq-image") {
                    img.set_attribute("src", &image_url).ok();
                }
            }
            GameEvent::TimerStarted { generation, seconds } => {
                state.timer_generation = generation;
                if state.engine.phase() == Phase::Playing {
                    render_timer(&doc, seconds);
                }
            }
            GameEvent::TimerTick { remaining } => render_timer(&doc, remaining),
            GameEvent::TimerStopped => {}
            GameEvent::AnswerJudged {
                correct,
                chosen,
                correct_answer,
            } => {
                mark_options(&doc, chosen.as_deref(), &correct_answer);
                if correct {
                    state.effects.burst("#ffd166", 36, now);
                    state.effects.tone(880.0, 180.0);
                } else if chosen.is_none() {
                    state.effects.tone(150.0, 350.0);
                } else {
                    state.effects.tone(196.0, 300.0);
                }
            }
            GameEvent::ScoreChanged { score, delta: _ } => {
                set_text(&doc, "hq-score", &format!("{score}"));
            }
            GameEvent::StreakChanged { length, kind } => {
                let label = match kind {
                    Outcome::Win if length >= 3 => format!("Streak: {length} ✦ focus"),
                    Outcome::Win if length > 1 => format!("Streak: {length}"),
                    _ => String::new(),
                };
                set_text(&doc, "hq-streak", &label);
            }
            GameEvent::PowerupSpent { .. } => render_powerups(&doc, &state.engine),
            GameEvent::OptionsReduced { removed } => {
                for i in 0..provider::OPTION_COUNT {
                    if let Some(el) = doc.get_element_by_id(&format!("hq-opt-{i}")) {
                        let text = el.text_content().unwrap_or_default();
                        if removed.contains(&text) {
                            el.set_text_content(Some(""));
                        }
                    }
                }
            }
            GameEvent::TimeExtended { remaining } => {
                render_timer(&doc, remaining);
                state.effects.tone(660.0, 120.0);
            }
            GameEvent::HintShown { text } => set_text(&doc, "hq-hint", &text),
            GameEvent::Finished { summary } => {
                let mut line = format!(
                    "Score {} — {}/{} correct ({}%) — Rank: {} — Best streak {}",
                    summary.score,
                    summary.correct,
                    summary.total,
                    summary.accuracy_percent,
                    summary.rank.label(),
                    summary.best_streak
                );
                if summary.score > state.high_score {
                    state.high_score = summary.score;
                    write_high_score(summary.score);
                    line.push_str(" — New high score!");
                    state.effects.burst("#8cf7ff", 60, now);
                }
                set_text(&doc, "hq-summary", &line);
                set_text(&doc, "hq-review", "");
            }
            GameEvent::ReviewShown => render_review(&doc, &state.engine),
        }
    }
}

fn show_screen(doc: &Document, phase: Phase) {
    let visible = match phase {
        Phase::Welcome => "hq-welcome",
        Phase::Loading => "hq-loading",
        Phase::Playing | Phase::Reviewing => "hq-game",
        Phase::Results => "hq-results",
    };
    for id in ["hq-welcome", "hq-loading", "hq-game", "hq-results"] {
        if let Some(el) = doc.get_element_by_id(id) {
            let style = el.get_attribute("style").unwrap_or_default();
            let base = style
                .replace("display:none;", "")
                .replace("display:block;", "");
            let display = if id == visible { "display:block;" } else { "display:none;" };
            el.set_attribute("style", &format!("{base}{display}")).ok();
        }
    }
}

fn set_text(doc: &Document, id: &str, text: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

fn render_timer(doc: &Document, remaining: u32) {
    set_text(doc, "hq-timer", &format!("⏱ {remaining}s"));
}

fn render_options(doc: &Document, options: &[String]) {
    for i in 0..provider::OPTION_COUNT {
        if let Some(el) = doc.get_element_by_id(&format!("hq-opt-{i}")) {
            match options.get(i) {
                Some(option) => {
                    el.set_text_content(Some(option));
                    restyle(&el, "background:#242438", "color:#ffd166");
                }
                // Degraded question (tiny pool): fewer than 4 options.
                None => {
                    el.set_text_content(Some(""));
                }
            }
        }
    }
}

fn mark_options(doc: &Document, chosen: Option<&str>, correct_answer: &str) {
    for i in 0..provider::OPTION_COUNT {
        if let Some(el) = doc.get_element_by_id(&format!("hq-opt-{i}")) {
            let text = el.text_content().unwrap_or_default();
            if text == correct_answer {
                restyle(&el, "background:#1d4a2a", "color:#9f9");
            } else if Some(text.as_str()) == chosen {
                restyle(&el, "background:#55222a", "color:#f99");
            }
        }
    }
}

// Swap the accent colors on an option button while keeping its base layout.
fn restyle(el: &Element, background: &str, color: &str) {
    let style = el.get_attribute("style").unwrap_or_default();
    let kept: String = style
        .split(';')
        .filter(|rule| {
            let rule = rule.trim();
            !rule.starts_with("background") && !rule.starts_with("color")
        })
        .collect::<Vec<_>>()
        .join(";");
    el.set_attribute("style", &format!("{kept};{background};{color}"))
        .ok();
}

fn render_powerups(doc: &Document, engine: &QuizEngine) {
    let labels = [
        ("hq-pw-fifty", PowerupKind::FiftyFifty, "50/50"),
        ("hq-pw-extend", PowerupKind::ExtendTime, "+10s"),
        ("hq-pw-hint", PowerupKind::Hint, "Hint"),
    ];
    for (id, kind, label) in labels {
        let count = engine.powerup_count(kind);
        set_text(doc, id, &format!("{label} ×{count}"));
        if let Some(el) = doc.get_element_by_id(id) {
            let opacity = if count == 0 { "0.35" } else { "1.0" };
            let style = el.get_attribute("style").unwrap_or_default();
            let kept: String = style
                .split(';')
                .filter(|rule| !rule.trim().starts_with("opacity"))
                .collect::<Vec<_>>()
                .join(";");
            el.set_attribute("style", &format!("{kept};opacity:{opacity}"))
                .ok();
        }
    }
}

fn render_review(doc: &Document, engine: &QuizEngine) {
    let questions = engine.questions();
    let mut html = String::new();
    for record in engine.answers() {
        let correct_answer = questions
            .get(record.question_index)
            .map(|q| q.correct_answer.as_str())
            .unwrap_or("?");
        let line = match (&record.chosen, record.correct) {
            (Some(chosen), true) => format!("✓ Q{}: {chosen}", record.question_index + 1),
            (Some(chosen), false) => format!(
                "✗ Q{}: {chosen} (was {correct_answer})",
                record.question_index + 1
            ),
            (None, _) => format!(
                "✗ Q{}: out of time (was {correct_answer})",
                record.question_index + 1
            ),
        };
        html.push_str(&format!("<div>{line}</div>"));
    }
    if let Some(el) = doc.get_element_by_id("hq-review") {
        el.set_inner_html(&html);
    }
}

// --- High score persistence --------------------------------------------------

fn read_high_score() -> i64 {
    window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item(HIGH_SCORE_KEY).ok().flatten())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

fn write_high_score(score: i64) {
    if let Some(storage) = window().and_then(|w| w.local_storage().ok().flatten()) {
        storage.set_item(HIGH_SCORE_KEY, &score.to_string()).ok();
    }
}
