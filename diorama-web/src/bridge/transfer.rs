//! Transfer backend backed by JavaScript hooks
//!
//! The page supplies an object with `exportModel()`, `upload(blob)`,
//! `getLatestFileId()`, `download(fileId)` and `importModel(blob)`. Each may
//! return a plain value or a Promise.

use std::future::Future;

use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::error::BridgeError;
use crate::transfer::{TransferBackend, TransferError};

#[derive(Clone)]
pub(crate) struct TransferHooks {
    export_model: Function,
    upload: Function,
    latest_file_id: Function,
    download: Function,
    import_model: Function,
}

impl TransferHooks {
    pub(crate) fn from_js(hooks: &JsValue) -> Result<Self, BridgeError> {
        Ok(Self {
            export_model: hook(hooks, "exportModel")?,
            upload: hook(hooks, "upload")?,
            latest_file_id: hook(hooks, "getLatestFileId")?,
            download: hook(hooks, "download")?,
            import_model: hook(hooks, "importModel")?,
        })
    }
}

fn hook(hooks: &JsValue, name: &'static str) -> Result<Function, BridgeError> {
    Reflect::get(hooks, &JsValue::from_str(name))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
        .ok_or(BridgeError::MissingHook(name))
}

fn describe(err: JsValue) -> String {
    err.as_string()
        .or_else(|| {
            Reflect::get(&err, &"message".into())
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", err))
}

/// Call `f` and await the result whether or not it returned a Promise
async fn call(f: &Function, arg: Option<&JsValue>) -> Result<JsValue, String> {
    let returned = match arg {
        Some(arg) => f.call1(&JsValue::NULL, arg),
        None => f.call0(&JsValue::NULL),
    }
    .map_err(describe)?;
    JsFuture::from(Promise::resolve(&returned))
        .await
        .map_err(describe)
}

/// `upload` may resolve to a bare id or to `{ fileId }`
fn file_id_of(value: &JsValue) -> Option<String> {
    value.as_string().or_else(|| {
        Reflect::get(value, &"fileId".into())
            .ok()
            .and_then(|id| id.as_string())
    })
}

pub(crate) struct JsTransferBackend {
    hooks: TransferHooks,
}

impl JsTransferBackend {
    pub(crate) fn new(hooks: TransferHooks) -> Self {
        Self { hooks }
    }
}

impl TransferBackend for JsTransferBackend {
    type Blob = JsValue;

    fn export_model(&self) -> impl Future<Output = Result<JsValue, TransferError>> {
        let f = self.hooks.export_model.clone();
        async move { call(&f, None).await.map_err(TransferError::Export) }
    }

    fn upload(&self, blob: JsValue) -> impl Future<Output = Result<String, TransferError>> {
        let f = self.hooks.upload.clone();
        async move {
            let response = call(&f, Some(&blob)).await.map_err(TransferError::Upload)?;
            file_id_of(&response)
                .ok_or_else(|| TransferError::Upload("response has no fileId".to_string()))
        }
    }

    fn latest_file_id(&self) -> impl Future<Output = Result<Option<String>, TransferError>> {
        let f = self.hooks.latest_file_id.clone();
        async move {
            let id = call(&f, None).await.map_err(TransferError::FetchLatest)?;
            if id.is_null() || id.is_undefined() {
                return Ok(None);
            }
            file_id_of(&id)
                .map(Some)
                .ok_or_else(|| TransferError::FetchLatest("file id is not a string".to_string()))
        }
    }

    fn download(&self, file_id: &str) -> impl Future<Output = Result<JsValue, TransferError>> {
        let f = self.hooks.download.clone();
        let file_id = JsValue::from_str(file_id);
        async move { call(&f, Some(&file_id)).await.map_err(TransferError::Download) }
    }

    fn import_model(&self, blob: JsValue) -> impl Future<Output = Result<(), TransferError>> {
        let f = self.hooks.import_model.clone();
        async move {
            call(&f, Some(&blob))
                .await
                .map(|_| ())
                .map_err(TransferError::Import)
        }
    }
}
