//! Token-budgeted rate limiting for chat-completion APIs: normalize caller messages, estimate
//! their cost, wait out the current window when the budget would overflow, then forward the
//! request and account for it.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod completion;
pub mod config;
pub mod error;
pub mod estimate;
#[cfg(feature = "reqwest")] pub mod http;
pub mod limiter;
pub mod message;
pub mod obs;
pub mod window;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		num::NonZeroU64,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use tokio::time::Instant;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
