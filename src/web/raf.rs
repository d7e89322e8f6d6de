use crate::clock::{ClockError, FrameCallback, FrameClock, FrameRequestId};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// `requestAnimationFrame`-backed clock.
///
/// One persistent closure is handed to every request; the browser fires
/// requests in the order they were made, so each firing pops the oldest
/// queued callback. Cancelled requests are removed from the queue.
pub struct RafClock {
    window: web::Window,
    queue: Rc<RefCell<VecDeque<(i32, FrameCallback)>>>,
    dispatch: Closure<dyn FnMut(f64)>,
}

impl RafClock {
    pub fn new() -> Result<Self, ClockError> {
        let window = web::window().ok_or(ClockError::NoWindow)?;
        let queue: Rc<RefCell<VecDeque<(i32, FrameCallback)>>> = Rc::new(RefCell::new(VecDeque::new()));
        let queue_tick = queue.clone();
        let dispatch = Closure::wrap(Box::new(move |timestamp: f64| {
            let next = queue_tick.borrow_mut().pop_front();
            if let Some((_, on_frame)) = next {
                on_frame(timestamp);
            }
        }) as Box<dyn FnMut(f64)>);
        Ok(Self {
            window,
            queue,
            dispatch,
        })
    }
}

impl FrameClock for RafClock {
    fn now(&self) -> f64 {
        instant::now()
    }

    fn request_frame(&self, on_frame: FrameCallback) -> Result<FrameRequestId, ClockError> {
        let id = self
            .window
            .request_animation_frame(self.dispatch.as_ref().unchecked_ref())
            .map_err(|e| ClockError::Rejected(format!("{:?}", e)))?;
        self.queue.borrow_mut().push_back((id, on_frame));
        Ok(FrameRequestId(id))
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        _ = self.window.cancel_animation_frame(id.0);
        let cancelled: Vec<_> = {
            let mut queue = self.queue.borrow_mut();
            let (cancelled, kept) = std::mem::take(&mut *queue)
                .into_iter()
                .partition(|(qid, _)| *qid == id.0);
            *queue = kept;
            cancelled
        };
        drop(cancelled);
    }
}
