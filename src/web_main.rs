use crate::{Game, GameConfig, Input, Renderer, Snapshot, WebRenderer};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

struct GameLoop {
    game: Game,
    renderer: WebRenderer,
    snapshot: Snapshot,
    tick_interval: f64,
    last_update: f64,
}

impl GameLoop {
    fn new() -> Result<Self, JsValue> {
        let game = Game::new(GameConfig::default()).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let mut renderer = WebRenderer::new("gameCanvas")?;
        renderer.init().map_err(|e| JsValue::from_str(&e.to_string()))?;

        let window = web_sys::window().ok_or("no window")?;
        let performance = window.performance().ok_or("no performance")?;
        let last_update = performance.now();

        Ok(Self {
            snapshot: game.snapshot(),
            tick_interval: game.config().tick_interval.as_secs_f64() * 1000.0,
            game,
            renderer,
            last_update,
        })
    }

    fn update_frame(&mut self, current_time: f64) -> Result<(), JsValue> {
        if let Some(input) = self
            .renderer
            .poll_input()
            .map_err(|e| JsValue::from_str(&e.to_string()))?
        {
            match input {
                Input::Direction(direction) => {
                    self.game.set_direction(direction);
                }
                Input::Quit => {
                    // In web, we can't really quit, just log it
                    web_sys::console::log_1(&"Game quit".into());
                }
                Input::Restart => {
                    self.game.reset();
                }
                Input::Tap if self.snapshot.is_over() => {
                    self.game.reset();
                }
                Input::Tap => {}
            }
            self.snapshot = self.game.snapshot();
        }

        if current_time - self.last_update >= self.tick_interval {
            self.game.tick();
            self.last_update = current_time;

            let was_over = self.snapshot.is_over();
            self.snapshot = self.game.snapshot();
            if !was_over && self.snapshot.is_over() {
                web_sys::console::log_1(&format!("[WASM] Game over, score {}", self.snapshot.score).into());
            }
        }

        // Render (renderer manages its own frame rate)
        self.renderer
            .render(&self.snapshot)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(())
    }
}

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    web_sys::console::log_1(&"[WASM] Starting snake...".into());

    let game_loop = match GameLoop::new() {
        Ok(gl) => Rc::new(RefCell::new(gl)),
        Err(e) => {
            web_sys::console::error_1(&format!("[WASM] Failed to create game loop: {:?}", e).into());
            return Err(e);
        }
    };

    let window = web_sys::window().ok_or("no window")?;
    let performance = window.performance().ok_or("no performance")?;

    // requestAnimationFrame loop; the closure reschedules itself
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let current_time = performance.now();

        if let Err(e) = game_loop.borrow_mut().update_frame(current_time) {
            web_sys::console::error_1(&e);
            return; // Stop loop on error
        }

        if let (Some(window), Some(callback)) = (web_sys::window(), f.borrow().as_ref()) {
            let _ = window.request_animation_frame(callback.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut()>));

    if let Some(callback) = g.borrow().as_ref() {
        window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    }

    web_sys::console::log_1(&"[WASM] Game loop started".into());

    Ok(())
}
