#[cfg(feature = "debug")]
use serde_json::json;

#[cfg(feature = "debug")]
thread_local!(
    static DEBUG_FRAME: std::cell::RefCell<Vec<serde_json::Value>> = Default::default();
);

#[allow(unused)]
pub(crate) fn debug_lane_change(id: u64, from: usize, to: usize, advantage: f64) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "lane_change",
            "id": id,
            "from": from,
            "to": to,
            "advantage": advantage,
        }))
    })
}

#[allow(unused)]
pub(crate) fn debug_spawn(id: u64, lane: usize) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "spawn",
            "id": id,
            "lane": lane,
        }))
    })
}

/// Drains the decision events recorded since the last call as a JSON array.
#[cfg(feature = "debug")]
pub fn take_debug_frame() -> serde_json::Value {
    json!(DEBUG_FRAME.with(|frame| frame.take()))
}
