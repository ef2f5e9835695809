#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod cancel;
pub mod client;
pub mod download;
pub mod endpoint;
mod error;
pub mod model;

pub use client::Client;
pub use error::{Error, Result};
pub use model::{PageNum, Photo, PhotoDetail, PhotoQuery, Size, User};
pub use reqwest;
