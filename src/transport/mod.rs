use std::future::Future;
use std::pin::Pin;

pub mod rest;
pub mod ws;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
