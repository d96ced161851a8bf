//! Delivers status notifications to a JS callback

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::prelude::*;

use crate::transfer::Notification;

/// Convert to `{ category, message, mode }`
fn to_js(notification: &Notification) -> Result<JsValue, JsValue> {
    let obj = Object::new();
    Reflect::set(&obj, &"category".into(), &notification.category.as_str().into())?;
    Reflect::set(&obj, &"message".into(), &notification.message.as_str().into())?;
    let mode = notification
        .mode
        .map(|m| JsValue::from_str(m.as_str()))
        .unwrap_or(JsValue::NULL);
    Reflect::set(&obj, &"mode".into(), &mode)?;
    Ok(obj.into())
}

/// Call `handler` once per notification. Must run with no bridge state
/// borrowed, since the handler may call back into the module.
pub(crate) fn dispatch(handler: Option<&Function>, notifications: Vec<Notification>) {
    for notification in notifications {
        log::debug!("{}: {}", notification.category.as_str(), notification.message);
        let Some(handler) = handler else {
            continue;
        };
        let delivered = to_js(&notification).and_then(|v| handler.call1(&JsValue::NULL, &v));
        if let Err(err) = delivered {
            log::warn!("Notification handler threw: {:?}", err);
        }
    }
}
