#![allow(dead_code)]

// std
use std::{
	io::{Error as IoError, ErrorKind},
	sync::atomic::{AtomicUsize, Ordering},
};
// crates.io
use parking_lot::Mutex;
// self
use chat_throttle::{
	completion::{CompletionBackend, CompletionFuture, CompletionRequest},
	config::LimiterConfig,
	error::TransportError,
	limiter::TokenRateLimiter,
};

/// Backend that records every request and answers with a canned reply.
#[derive(Default)]
pub struct RecordingBackend {
	calls: AtomicUsize,
	requests: Mutex<Vec<CompletionRequest>>,
}
impl RecordingBackend {
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn requests(&self) -> Vec<CompletionRequest> {
		self.requests.lock().clone()
	}
}
impl CompletionBackend for RecordingBackend {
	fn complete<'a>(&'a self, request: &'a CompletionRequest) -> CompletionFuture<'a> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.requests.lock().push(request.clone());

		Box::pin(async { Ok("ack".to_owned()) })
	}
}

/// Backend whose every call fails at the transport layer.
#[derive(Default)]
pub struct RefusingBackend {
	calls: AtomicUsize,
}
impl RefusingBackend {
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl CompletionBackend for RefusingBackend {
	fn complete<'a>(&'a self, _request: &'a CompletionRequest) -> CompletionFuture<'a> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async {
			Err(TransportError::network(IoError::new(ErrorKind::ConnectionRefused, "refused")).into())
		})
	}
}

pub fn config(budget: u64) -> LimiterConfig {
	LimiterConfig::builder("test-key")
		.token_budget(budget)
		.build()
		.expect("Test configuration should build.")
}

pub fn recording_limiter(budget: u64) -> TokenRateLimiter<RecordingBackend> {
	TokenRateLimiter::new(config(budget), RecordingBackend::default())
}

pub fn refusing_limiter(budget: u64) -> TokenRateLimiter<RefusingBackend> {
	TokenRateLimiter::new(config(budget), RefusingBackend::default())
}
