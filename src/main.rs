//! Day Roulette entry point
//!
//! On the web this wires the page to a session. Natively it runs a seeded
//! batch of spins against the headless renderer and prints the totals.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{
        AddEventListenerOptions, Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement,
        HtmlSelectElement, Response,
    };

    use day_roulette::bootstrap::{self, BootstrapSource, INIT_FILE};
    use day_roulette::persistence::LocalStore;
    use day_roulette::platform::{entropy_seed, now_ms};
    use day_roulette::renderer::{CompletionCause, CompletionLatch, DomRenderer, WheelRenderer};
    use day_roulette::totals::format_day_sum;
    use day_roulette::{EditBuffer, SessionError, Session, Sign, SpinError, SpinHandle};

    const DEV_TOOLS_HASH: &str = "#dev";

    /// Everything the page handlers share
    struct App {
        session: Session<LocalStore>,
        renderer: DomRenderer,
        buffer: EditBuffer,
        document: Document,
    }

    type Shared = Rc<RefCell<App>>;

    fn window() -> web_sys::Window {
        web_sys::window().expect("no window")
    }

    fn alert(message: &str) {
        let _ = window().alert_with_message(message);
    }

    fn confirm(message: &str) -> bool {
        window().confirm_with_message(message).unwrap_or(false)
    }

    fn escape(text: &str) -> String {
        day_roulette::renderer::shapes::escape_markup(text)
    }

    impl App {
        fn by_id(&self, id: &str) -> Option<Element> {
            self.document.get_element_by_id(id)
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_display(&self, id: &str, visible: bool, shown_as: &str) {
            if let Some(el) = self.by_id(id).and_then(|e| e.dyn_into::<HtmlElement>().ok()) {
                let _ = el
                    .style()
                    .set_property("display", if visible { shown_as } else { "none" });
            }
        }

        fn set_spin_enabled(&self, enabled: bool) {
            if let Some(btn) = self
                .by_id("spin-button")
                .and_then(|e| e.dyn_into::<HtmlButtonElement>().ok())
            {
                btn.set_disabled(!enabled);
            }
        }

        fn render_all(&mut self) {
            self.render_roulette_buttons();
            self.render_item_list();
            self.render_wheel();
            self.render_totals();
            self.render_history();
            let deletable = self.session.current_name() != day_roulette::consts::DEFAULT_ROULETTE_NAME;
            self.set_display("delete-roulette-button", deletable, "block");
        }

        fn render_roulette_buttons(&self) {
            let current = self.session.current_name();
            let html: String = self
                .session
                .roulette_names()
                .iter()
                .map(|name| {
                    let active = if name == current { " active" } else { "" };
                    let name = escape(name);
                    format!(r#"<button class="roulette-button{active}" data-name="{name}">{name}</button>"#)
                })
                .collect();
            if let Some(el) = self.by_id("roulette-buttons") {
                el.set_inner_html(&html);
            }
        }

        fn render_item_list(&self) {
            let html: String = self
                .buffer
                .items()
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    format!(
                        r#"<li><span class="item-name">{} (ratio: {}%)</span><button class="delete-item-button" data-index="{}">Delete</button></li>"#,
                        escape(&item.key.display_label()),
                        item.weight,
                        i
                    )
                })
                .collect();
            if let Some(el) = self.by_id("item-list") {
                el.set_inner_html(&html);
            }
        }

        fn render_wheel(&mut self) {
            let partition = self.session.partition().ok();
            self.renderer.draw(partition.as_ref());
        }

        fn render_totals(&self) {
            let totals = self.session.totals();
            let html: String = totals
                .iter()
                .map(|(key, count)| {
                    format!(
                        r#"<div class="total-item">{}: {}</div>"#,
                        escape(&key.display_label()),
                        count
                    )
                })
                .collect();
            if let Some(el) = self.by_id("totals") {
                el.set_inner_html(&html);
            }
            self.set_text("total-days-summary", &format!("：{}", format_day_sum(totals.day_sum())));
        }

        fn render_history(&self) {
            let html: String = self
                .session
                .history()
                .entries()
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let text = format!("{}: {}", entry.display_time(), entry.describe());
                    if entry.deleted {
                        format!(r#"<li class="deleted">{}</li>"#, escape(&text))
                    } else {
                        format!(
                            r#"<li>{}<button class="delete-history-button" data-index="{}">Delete</button></li>"#,
                            escape(&text),
                            i
                        )
                    }
                })
                .collect();
            if let Some(el) = self.by_id("history-list") {
                el.set_inner_html(&html);
            }
        }

        fn select(&mut self, name: &str) {
            if let Err(e) = self.session.select_roulette(name) {
                log::warn!("{}", e);
                return;
            }
            self.buffer = self.session.edit_buffer();
            self.render_all();
        }
    }

    /// Report a session error; a failed save still keeps the change
    fn report(err: &SessionError) {
        log::error!("{}", err);
        alert(&err.to_string());
    }

    fn on_click<F>(document: &Document, id: &str, mut handler: F)
    where
        F: FnMut(web_sys::Event) + 'static,
    {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("Missing #{}", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| handler(event));
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// `data-*` attribute of the clicked element, if it carries `class`
    fn clicked_data(event: &web_sys::Event, class: &str, attr: &str) -> Option<String> {
        let target = event.target()?.dyn_into::<Element>().ok()?;
        if !target.class_list().contains(class) {
            return None;
        }
        target.get_attribute(attr)
    }

    fn request_animation_frame(f: impl FnOnce() + 'static) {
        let closure = Closure::once_into_js(move |_time: f64| f());
        let _ = window().request_animation_frame(closure.unchecked_ref());
    }

    fn set_timeout(f: impl FnOnce() + 'static, ms: u32) {
        let closure = Closure::once_into_js(f);
        let _ = window().set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.unchecked_ref(),
            i32::try_from(ms).unwrap_or(i32::MAX),
        );
    }

    fn spin(app: &Shared) {
        let pending = {
            let mut a = app.borrow_mut();
            let rotation = a.renderer.rotation_deg();
            match a.session.begin_spin(rotation) {
                Ok(p) => p,
                Err(SpinError::InProgress) => return,
                Err(e) => {
                    alert(&e.to_string());
                    return;
                }
            }
        };

        {
            let mut a = app.borrow_mut();
            a.set_spin_enabled(false);
            a.set_text("result", "-");
            a.renderer.snap_to(pending.reset_deg);
        }

        let latch = Rc::new(RefCell::new(CompletionLatch::new()));
        let handle = pending.handle;

        // Two frames so the snap is painted before the transition starts
        {
            let app = app.clone();
            let target = pending.target_deg();
            let duration = pending.duration_ms;
            request_animation_frame(move || {
                request_animation_frame(move || {
                    app.borrow_mut().renderer.animate_to(target, duration);
                })
            });
        }

        {
            let app2 = app.clone();
            let latch = latch.clone();
            let closure = Closure::once_into_js(move |_event: web_sys::Event| {
                if latch.borrow_mut().fire(CompletionCause::AnimationEnd).is_some() {
                    finish_spin(&app2, handle);
                }
            });
            let options = AddEventListenerOptions::new();
            options.set_once(true);
            let _ = app
                .borrow()
                .renderer
                .element()
                .add_event_listener_with_callback_and_add_event_listener_options(
                    "transitionend",
                    closure.unchecked_ref(),
                    &options,
                );
        }

        {
            let app = app.clone();
            set_timeout(
                move || {
                    if latch.borrow_mut().fire(CompletionCause::Timeout).is_some() {
                        finish_spin(&app, handle);
                    }
                },
                pending.timeout_ms,
            );
        }
    }

    fn finish_spin(app: &Shared, handle: SpinHandle) {
        let mut a = app.borrow_mut();
        let rotation = a.renderer.rotation_deg();
        match a.session.complete_spin(handle, rotation, now_ms()) {
            Ok(outcome) => {
                a.set_text("result", &outcome.result.determined_key.to_string());
                a.renderer.counter_rotate_labels(rotation);
                a.render_totals();
                a.render_history();
                if let Some(e) = outcome.persist_error {
                    alert(&format!("Failed to save the result: {}", e));
                }
            }
            Err(e) => log::warn!("Ignoring spin completion: {}", e),
        }
        a.set_spin_enabled(true);
    }

    fn add_item(app: &Shared) {
        let mut a = app.borrow_mut();
        let input = |id: &str| {
            a.by_id(id)
                .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
        };
        let (Some(days_el), Some(ratio_el)) = (input("item-days"), input("item-value")) else {
            return;
        };
        let sign = a
            .by_id("item-type")
            .and_then(|e| e.dyn_into::<HtmlSelectElement>().ok())
            .and_then(|s| s.value().chars().next())
            .and_then(Sign::from_char)
            .unwrap_or(Sign::Plus);

        let Ok(days) = days_el.value().trim().parse::<i64>() else {
            alert("Days must be a number, 0 or more.");
            return;
        };
        let Ok(ratio) = ratio_el.value().trim().parse::<i64>() else {
            alert("Ratio must be a number from 1 to 100.");
            return;
        };

        if let Err(e) = a.buffer.add_item(sign, days, ratio) {
            alert(&e.to_string());
            return;
        }
        days_el.set_value("");
        ratio_el.set_value("");
        let _ = days_el.focus();
        a.render_item_list();
    }

    fn commit(app: &Shared) {
        let mut a = app.borrow_mut();
        let a = &mut *a;
        match a.session.commit_edit(&mut a.buffer) {
            Ok(adjustment) => {
                if let Some(adj) = adjustment {
                    alert(&adj.to_string());
                }
                a.render_item_list();
                a.render_wheel();
                alert(&format!("Roulette \"{}\" updated.", a.session.current_name()));
            }
            Err(e @ SessionError::Store(_)) => {
                a.render_item_list();
                a.render_wheel();
                report(&e);
            }
            Err(e) => report(&e),
        }
    }

    fn wire(app: &Shared, document: &Document) {
        {
            let app = app.clone();
            on_click(document, "spin-button", move |_| spin(&app));
        }
        {
            let app = app.clone();
            on_click(document, "roulette-buttons", move |event| {
                if let Some(name) = clicked_data(&event, "roulette-button", "data-name") {
                    app.borrow_mut().select(&name);
                }
            });
        }
        {
            let app = app.clone();
            on_click(document, "add-roulette", move |_| {
                let Ok(Some(name)) = window().prompt_with_message("Name of the new roulette:") else {
                    return;
                };
                if name.trim().is_empty() {
                    return;
                }
                let mut a = app.borrow_mut();
                match a.session.add_roulette(&name) {
                    Ok(name) => {
                        a.buffer = a.session.edit_buffer();
                        a.render_all();
                        alert(&format!("Created roulette \"{}\". Add some items.", name));
                    }
                    Err(e @ SessionError::Store(_)) => {
                        a.buffer = a.session.edit_buffer();
                        a.render_all();
                        report(&e);
                    }
                    Err(e) => report(&e),
                }
            });
        }
        {
            let app = app.clone();
            on_click(document, "add-item-button", move |_| add_item(&app));
        }
        {
            let app = app.clone();
            on_click(document, "item-list", move |event| {
                let Some(index) = clicked_data(&event, "delete-item-button", "data-index")
                    .and_then(|i| i.parse::<usize>().ok())
                else {
                    return;
                };
                let mut a = app.borrow_mut();
                if a.buffer.remove_item(index).is_ok() {
                    a.render_item_list();
                }
            });
        }
        {
            let app = app.clone();
            on_click(document, "update-roulette-button", move |_| commit(&app));
        }
        {
            let app = app.clone();
            on_click(document, "delete-roulette-button", move |_| {
                let mut a = app.borrow_mut();
                let name = a.session.current_name().to_string();
                if !confirm(&format!("Delete roulette \"{}\"? This cannot be undone.", name)) {
                    return;
                }
                let result = a.session.delete_current_roulette();
                a.buffer = a.session.edit_buffer();
                a.render_all();
                match result {
                    Ok(name) => alert(&format!("Deleted roulette \"{}\".", name)),
                    Err(e) => report(&e),
                }
            });
        }
        {
            let app = app.clone();
            on_click(document, "reset-totals-button", move |_| {
                if !confirm("Reset all totals? This cannot be undone.") {
                    return;
                }
                let mut a = app.borrow_mut();
                let result = a.session.reset_totals(now_ms());
                a.render_totals();
                a.render_history();
                if let Err(e) = result {
                    report(&e);
                }
            });
        }
        {
            let app = app.clone();
            on_click(document, "history-list", move |event| {
                let Some(index) = clicked_data(&event, "delete-history-button", "data-index")
                    .and_then(|i| i.parse::<usize>().ok())
                else {
                    return;
                };
                let mut a = app.borrow_mut();
                let result = a.session.delete_history_entry(index);
                a.render_totals();
                a.render_history();
                if let Err(e) = result {
                    report(&e);
                }
            });
        }
        {
            let app = app.clone();
            on_click(document, "full-reset-button", move |_| {
                if !confirm("Delete all stored data and start over? This cannot be undone.") {
                    return;
                }
                match app.borrow_mut().session.full_reset() {
                    Ok(()) => {
                        alert("Storage cleared. Reloading.");
                        let _ = window().location().reload();
                    }
                    Err(e) => report(&e),
                }
            });
        }
    }

    async fn fetch_init_file() -> Result<String, String> {
        let describe = |e: JsValue| e.as_string().unwrap_or_else(|| format!("{:?}", e));

        let response = JsFuture::from(window().fetch_with_str(INIT_FILE))
            .await
            .map_err(describe)?;
        let response: Response = response.dyn_into().map_err(describe)?;
        if !response.ok() {
            return Err(format!("HTTP error! status: {}", response.status()));
        }
        let text = JsFuture::from(response.text().map_err(describe)?)
            .await
            .map_err(describe)?;
        text.as_string().ok_or_else(|| "response body is not text".to_string())
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Day Roulette starting...");

        let document = window().document().ok_or_else(|| JsValue::from_str("no document"))?;
        let mut store = LocalStore::open();

        let outcome = if bootstrap::needs_import(&store) {
            let fetched = fetch_init_file().await;
            bootstrap::import(&mut store, fetched)
        } else {
            bootstrap::load_existing(&mut store)
        };
        if let BootstrapSource::Fallback { reason } = &outcome.source {
            alert(&format!(
                "Failed to load {}.\n\n{}\n\nContinuing with an empty default roulette; it will not be saved.",
                INIT_FILE, reason
            ));
        }
        if let Some(e) = &outcome.persist_error {
            alert(&format!("Failed to save the roulettes: {}", e));
        }

        let session = Session::with_roulettes(store, outcome.roulettes, entropy_seed());
        let renderer = DomRenderer::attach(&document)?;
        let buffer = session.edit_buffer();

        let app = Rc::new(RefCell::new(App {
            session,
            renderer,
            buffer,
            document: document.clone(),
        }));

        {
            let mut a = app.borrow_mut();
            let dev = window().location().hash().map(|h| h == DEV_TOOLS_HASH).unwrap_or(false);
            a.set_display("developer-tools", dev, "flex");
            a.render_all();
        }
        wire(&app, &document);

        log::info!("Day Roulette ready");
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    web_app::run().await
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use day_roulette::bootstrap;
    use day_roulette::persistence::MemoryStore;
    use day_roulette::renderer::SimulatedRenderer;
    use day_roulette::totals::format_day_sum;
    use day_roulette::Session;

    env_logger::init();
    log::info!("Day Roulette (native) starting...");

    let mut args = std::env::args().skip(1);
    let path = args.next();
    let spins: u32 = args.next().and_then(|n| n.parse().ok()).unwrap_or(1000);

    let mut store = MemoryStore::new();
    let outcome = bootstrap::initialize(&mut store, || match &path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e)),
        None => Ok(r#"{"default": {"+1日": 50, "-1日": 50}}"#.to_string()),
    });
    log::info!("Roulettes from {:?}", outcome.source);

    let mut session = Session::with_roulettes(store, outcome.roulettes, 0x5eed);
    let mut renderer = SimulatedRenderer::new();
    let mut mismatches = 0;

    for i in 0..spins {
        match session.spin_simulated(&mut renderer, f64::from(i)) {
            Ok((outcome, _)) => {
                if !outcome.result.is_consistent() {
                    mismatches += 1;
                }
            }
            Err(e) => {
                eprintln!("Cannot spin \"{}\": {}", session.current_name(), e);
                return;
            }
        }
    }

    println!("{} spins on \"{}\"", spins, session.current_name());
    for (key, count) in session.totals().iter() {
        println!("  {}: {}", key, count);
    }
    println!("Day sum: {}", format_day_sum(session.totals().day_sum()));
    println!("Geometric mismatches: {}", mismatches);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // wasm_main is the entry point
}
