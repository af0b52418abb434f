//! Logged JSON data guard that captures and logs request bodies.
//!
//! A drop-in replacement for `Json<T>` on mutating endpoints. The parsed
//! body is re-serialized and logged at `info`, with the value of every
//! object key containing `password` replaced by `"***"`.

use rocket::serde::json::Json;
use rocket::{
    Data, Request,
    data::{self, FromData},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MASK: &str = "***";

/// `Json<T>` that logs the parsed body before handing it over.
pub struct LoggedJson<T>(pub T);

impl<T> LoggedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for LoggedJson<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

/// Replaces password-like values anywhere in the document.
pub fn mask_secrets(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map.iter_mut() {
                if key.to_ascii_lowercase().contains("password") {
                    *inner = Value::String(MASK.to_string());
                } else {
                    mask_secrets(inner);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask_secrets),
        _ => {}
    }
}

fn masked_body<T: Serialize>(body: &T) -> String {
    match serde_json::to_value(body) {
        Ok(mut value) => {
            mask_secrets(&mut value);
            value.to_string()
        }
        Err(_) => "<unserializable>".to_string(),
    }
}

#[rocket::async_trait]
impl<'r, T: Deserialize<'r> + Serialize> FromData<'r> for LoggedJson<T> {
    type Error = rocket::serde::json::Error<'r>;

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> data::Outcome<'r, Self> {
        Json::<T>::from_data(req, data).await.map(|Json(body)| {
            info!("{} {} body: {}", req.method(), req.uri().path(), masked_body(&body));
            LoggedJson(body)
        })
    }
}
