use crate::control_pad::{self, ControlPad, SWIPE_THRESHOLD};
use crate::entity::{Direction, Position};
use crate::game::{Cell, GameState, Snapshot};
use crate::renderer::{Input, Renderer};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, KeyboardEvent, TouchEvent};

const CELL_SIZE: f64 = 16.0;
const TARGET_FRAME_TIME: f64 = 16.0; // ~60 FPS
const STATUS_HEIGHT: f64 = 60.0;

const COLOR_EMPTY: &str = "#000000";
const COLOR_GRID: &str = "#1A1A1A";
const COLOR_HEAD: &str = "#FF8C00";
const COLOR_BODY: &str = "#FFA500";
const COLOR_FOOD: &str = "#FF5555";
const COLOR_UI: &str = "#FFFFFF";
const COLOR_BUTTON: &str = "#333333";

pub struct WebRenderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    window: web_sys::Window,
    device_pixel_ratio: f64,
    last_render_time: f64,

    // Laid out on first render, once the grid size is known
    control_pad: Rc<RefCell<Option<ControlPad>>>,

    // Input state
    pending_input: Rc<RefCell<Option<Input>>>,

    // Touch state
    touch_start_pos: Rc<RefCell<Option<(f64, f64)>>>,
}

impl WebRenderer {
    pub fn new(canvas_id: &str) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        let context = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        // Disable image smoothing for crisp pixels
        context.set_image_smoothing_enabled(false);

        // Get device pixel ratio for high DPI displays
        let device_pixel_ratio = window.device_pixel_ratio();

        Ok(Self {
            canvas,
            context,
            window,
            device_pixel_ratio,
            last_render_time: 0.0,
            control_pad: Rc::new(RefCell::new(None)),
            pending_input: Rc::new(RefCell::new(None)),
            touch_start_pos: Rc::new(RefCell::new(None)),
        })
    }

    fn setup_keyboard_listener(&self) {
        let pending_input = self.pending_input.clone();

        let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            let input = match event.key().as_str() {
                "ArrowUp" | "w" | "W" => Some(Input::Direction(Direction::Up)),
                "ArrowDown" | "s" | "S" => Some(Input::Direction(Direction::Down)),
                "ArrowLeft" | "a" | "A" => Some(Input::Direction(Direction::Left)),
                "ArrowRight" | "d" | "D" => Some(Input::Direction(Direction::Right)),
                "q" | "Q" => Some(Input::Quit),
                "r" | "R" => Some(Input::Restart),
                _ => None,
            };

            if let Some(input) = input {
                *pending_input.borrow_mut() = Some(input);
                event.prevent_default();
            }
        }) as Box<dyn FnMut(KeyboardEvent)>);

        self.window
            .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
            .unwrap();

        closure.forget(); // Keep listener alive
    }

    fn setup_touch_listeners(&self) {
        let pending_input = self.pending_input.clone();
        let touch_start_pos = self.touch_start_pos.clone();
        let pad_layout = self.control_pad.clone();
        let canvas = self.canvas.clone();

        // TouchStart: Record initial position
        let touch_start_pos_clone = touch_start_pos.clone();
        let touchstart_closure = Closure::wrap(Box::new(move |event: TouchEvent| {
            event.prevent_default(); // Prevent zooming, scrolling, etc.

            if let Some(touch) = event.touches().item(0) {
                let x = touch.client_x() as f64;
                let y = touch.client_y() as f64;
                *touch_start_pos_clone.borrow_mut() = Some((x, y));
            }
        }) as Box<dyn FnMut(TouchEvent)>);

        canvas
            .add_event_listener_with_callback("touchstart", touchstart_closure.as_ref().unchecked_ref())
            .unwrap();
        touchstart_closure.forget();

        // TouchMove: Prevent default to avoid scrolling
        let touchmove_closure = Closure::wrap(Box::new(move |event: TouchEvent| {
            event.prevent_default();
        }) as Box<dyn FnMut(TouchEvent)>);

        canvas
            .add_event_listener_with_callback("touchmove", touchmove_closure.as_ref().unchecked_ref())
            .unwrap();
        touchmove_closure.forget();

        // TouchEnd: pad button, swipe, or plain tap
        let touch_start_pos_clone = touch_start_pos.clone();
        let canvas_clone = canvas.clone();
        let touchend_closure = Closure::wrap(Box::new(move |event: TouchEvent| {
            event.prevent_default();

            let Some(touch) = event.changed_touches().item(0) else {
                return;
            };
            let Some((start_x, start_y)) = touch_start_pos_clone.borrow_mut().take() else {
                return;
            };

            let end_x = touch.client_x() as f64;
            let end_y = touch.client_y() as f64;

            // Pad buttons are hit-tested in canvas (CSS pixel) coordinates
            let rect = canvas_clone.get_bounding_client_rect();
            let pressed = pad_layout
                .borrow()
                .as_ref()
                .and_then(|pad| pad.hit_test(end_x - rect.left(), end_y - rect.top()));

            let input = match pressed
                .or_else(|| control_pad::swipe_direction(end_x - start_x, end_y - start_y, SWIPE_THRESHOLD))
            {
                Some(direction) => {
                    vibrate();
                    Input::Direction(direction)
                }
                None => Input::Tap,
            };

            *pending_input.borrow_mut() = Some(input);
        }) as Box<dyn FnMut(TouchEvent)>);

        canvas
            .add_event_listener_with_callback("touchend", touchend_closure.as_ref().unchecked_ref())
            .unwrap();
        touchend_closure.forget();

        // TouchCancel: Clear state if touch is cancelled
        let touchcancel_closure = Closure::wrap(Box::new(move |event: TouchEvent| {
            event.prevent_default();
            *touch_start_pos.borrow_mut() = None;
        }) as Box<dyn FnMut(TouchEvent)>);

        canvas
            .add_event_listener_with_callback("touchcancel", touchcancel_closure.as_ref().unchecked_ref())
            .unwrap();
        touchcancel_closure.forget();
    }

    fn current_time(&self) -> f64 {
        self.window.performance().map(|p| p.now()).unwrap_or(0.0)
    }

    fn draw_cell(&self, x: i32, y: i32, color: &str) {
        self.context.set_fill_style_str(color);
        self.context.fill_rect(
            x as f64 * CELL_SIZE + 1.0,
            y as f64 * CELL_SIZE + 1.0,
            CELL_SIZE - 2.0,
            CELL_SIZE - 2.0,
        );
    }

    fn draw_board(&self, snapshot: &Snapshot) {
        let board = snapshot.grid_size as f64 * CELL_SIZE;
        self.context.set_fill_style_str(COLOR_GRID);
        self.context.fill_rect(0.0, 0.0, board, board);

        for y in 0..snapshot.grid_size {
            for x in 0..snapshot.grid_size {
                let color = match snapshot.cell_at(Position::new(x, y)) {
                    Cell::Empty => COLOR_EMPTY,
                    Cell::Head => COLOR_HEAD,
                    Cell::Body => COLOR_BODY,
                    Cell::Food => COLOR_FOOD,
                };
                self.draw_cell(x, y, color);
            }
        }
    }

    fn draw_ui(&self, snapshot: &Snapshot) {
        let y_offset = (snapshot.grid_size as f64 * CELL_SIZE) + 10.0;

        self.context.set_fill_style_str(COLOR_UI);
        self.context.set_font("14px monospace");
        self.context.set_text_align("left");
        self.context.set_text_baseline("top");

        let info = format!("Score: {}  Length: {}", snapshot.score, snapshot.length);
        self.context.fill_text(&info, 5.0, y_offset).unwrap();

        if snapshot.state == GameState::Over {
            self.context.set_fill_style_str("#FF5555");
            self.context
                .fill_text("GAME OVER! Tap or press R to restart", 5.0, y_offset + 20.0)
                .unwrap();
        }
    }

    fn draw_control_pad(&self, pad: &ControlPad) {
        self.context.set_font("12px monospace");
        self.context.set_text_align("center");
        self.context.set_text_baseline("middle");

        for button in &pad.buttons {
            self.context.set_fill_style_str(COLOR_BUTTON);
            self.context.fill_rect(button.x, button.y, button.size, button.size);

            self.context.set_fill_style_str(COLOR_UI);
            self.context
                .fill_text(
                    button.label(),
                    button.x + button.size / 2.0,
                    button.y + button.size / 2.0,
                )
                .unwrap();
        }
    }

    fn resize(&mut self, snapshot: &Snapshot) {
        let board = snapshot.grid_size as f64 * CELL_SIZE;

        // Display size (CSS pixels)
        let display_width = board.max(ControlPad::width());
        let display_height = board + STATUS_HEIGHT + ControlPad::height();

        // Internal resolution (actual pixels, scaled for high DPI)
        let pixel_width = (display_width * self.device_pixel_ratio) as u32;
        let pixel_height = (display_height * self.device_pixel_ratio) as u32;

        if self.canvas.width() == pixel_width && self.canvas.height() == pixel_height {
            return;
        }

        self.canvas.set_width(pixel_width);
        self.canvas.set_height(pixel_height);

        let element: &HtmlElement = self.canvas.unchecked_ref();
        element.style().set_property("width", &format!("{}px", display_width)).unwrap();
        element.style().set_property("height", &format!("{}px", display_height)).unwrap();

        // Setting canvas width/height resets the context
        self.context.set_image_smoothing_enabled(false);
        self.context.scale(self.device_pixel_ratio, self.device_pixel_ratio).unwrap();

        *self.control_pad.borrow_mut() = Some(ControlPad::new(display_width, board + STATUS_HEIGHT));
    }
}

impl Renderer for WebRenderer {
    fn init(&mut self) -> io::Result<()> {
        self.setup_keyboard_listener();
        self.setup_touch_listeners();
        self.last_render_time = self.current_time();
        Ok(())
    }

    fn render(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        let now = self.current_time();

        // Frame rate limiting
        if now - self.last_render_time < TARGET_FRAME_TIME {
            return Ok(());
        }
        self.last_render_time = now;

        self.resize(snapshot);

        let width = self.canvas.width() as f64 / self.device_pixel_ratio;
        let height = self.canvas.height() as f64 / self.device_pixel_ratio;
        self.context.set_fill_style_str(COLOR_EMPTY);
        self.context.fill_rect(0.0, 0.0, width, height);

        self.draw_board(snapshot);
        self.draw_ui(snapshot);
        if let Some(pad) = self.control_pad.borrow().as_ref() {
            self.draw_control_pad(pad);
        }

        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        // No cleanup needed for web
        Ok(())
    }

    fn poll_input(&mut self) -> io::Result<Option<Input>> {
        Ok(self.pending_input.borrow_mut().take())
    }
}

// Haptic feedback (50ms); fails silently where unsupported
fn vibrate() {
    if let Some(window) = web_sys::window() {
        let navigator = window.navigator();
        let _ = js_sys::Reflect::get(&navigator, &JsValue::from_str("vibrate"))
            .ok()
            .and_then(|vibrate_fn| {
                let vibrate = vibrate_fn.dyn_ref::<js_sys::Function>()?;
                vibrate.call1(&navigator, &JsValue::from_f64(50.0)).ok()
            });
    }
}
