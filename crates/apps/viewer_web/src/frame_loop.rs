use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;

struct LoopState {
    callback: Option<Closure<dyn FnMut(f64)>>,
    request_id: Option<i32>,
}

/// `requestAnimationFrame` loop.
///
/// The callback receives the host timestamp in milliseconds and returns
/// whether another frame should be requested. Dropping the loop cancels any
/// pending frame. The loop must not be dropped from inside its own callback.
pub struct AnimationFrameLoop {
    state: Rc<RefCell<LoopState>>,
}

impl AnimationFrameLoop {
    pub fn start(mut on_frame: impl FnMut(f64) -> bool + 'static) -> Result<Self, JsValue> {
        let state = Rc::new(RefCell::new(LoopState {
            callback: None,
            request_id: None,
        }));

        let weak = Rc::downgrade(&state);
        let callback = Closure::<dyn FnMut(f64)>::new(move |host_ms: f64| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.borrow_mut().request_id = None;
            if on_frame(host_ms)
                && let Err(err) = request_frame(&state)
            {
                web_sys::console::error_1(&err);
            }
        });
        state.borrow_mut().callback = Some(callback);

        request_frame(&state)?;
        Ok(Self { state })
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().request_id.is_some()
    }

    /// Requests a frame if none is pending.
    pub fn resume(&self) -> Result<(), JsValue> {
        if self.is_running() {
            return Ok(());
        }
        request_frame(&self.state)
    }

    pub fn cancel(&self) {
        let Some(id) = self.state.borrow_mut().request_id.take() else {
            return;
        };
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(id);
        }
    }
}

impl Drop for AnimationFrameLoop {
    fn drop(&mut self) {
        self.cancel();
        self.state.borrow_mut().callback = None;
    }
}

fn request_frame(state: &Rc<RefCell<LoopState>>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let mut state = state.borrow_mut();
    let Some(callback) = state.callback.as_ref() else {
        return Ok(());
    };
    let id = window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    state.request_id = Some(id);
    Ok(())
}
