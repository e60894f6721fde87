//! 浏览器定位
//!
//! 把 `navigator.geolocation.getCurrentPosition` 的回调接口转成一次性的 future。

use futures::channel::oneshot;
use seatrack::external::{GeolocationProvider, LocationError};
use seatrack_shared::Coordinate;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Position as GeolocationPosition, PositionError as GeolocationPositionError};

type Reply = Rc<RefCell<Option<oneshot::Sender<Result<Coordinate, LocationError>>>>>;

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserGeolocation;

fn location_error(err: &GeolocationPositionError) -> LocationError {
    match err.code() {
        GeolocationPositionError::PERMISSION_DENIED => LocationError::PermissionDenied,
        GeolocationPositionError::TIMEOUT => LocationError::Timeout,
        _ => LocationError::Unavailable,
    }
}

fn answer(reply: &Reply, result: Result<Coordinate, LocationError>) {
    if let Some(tx) = reply.borrow_mut().take() {
        let _ = tx.send(result);
    }
}

#[async_trait::async_trait(?Send)]
impl GeolocationProvider for BrowserGeolocation {
    async fn current_position(&self) -> Result<Coordinate, LocationError> {
        let geolocation = web_sys::window()
            .ok_or(LocationError::Unsupported)?
            .navigator()
            .geolocation()
            .map_err(|_| LocationError::Unsupported)?;

        let (tx, rx) = oneshot::channel();
        let reply: Reply = Rc::new(RefCell::new(Some(tx)));

        let on_success = {
            let reply = reply.clone();
            Closure::once(move |position: GeolocationPosition| {
                let coords = position.coords();
                answer(&reply, Ok(Coordinate::new(coords.latitude(), coords.longitude())));
            })
        };
        let on_error = {
            let reply = reply.clone();
            Closure::once(move |err: GeolocationPositionError| {
                answer(&reply, Err(location_error(&err)));
            })
        };

        geolocation
            .get_current_position_with_error_callback(
                on_success.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
            )
            .map_err(|_| LocationError::Unavailable)?;

        // 回调闭包必须活到浏览器应答为止
        let result = rx.await.unwrap_or(Err(LocationError::Unavailable));
        drop((on_success, on_error));
        result
    }
}
