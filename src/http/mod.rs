// HTTP transport for the element backend

pub mod client;


pub use client::HttpCreationService;
