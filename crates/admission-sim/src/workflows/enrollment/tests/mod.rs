mod common;
mod export;
mod service;
