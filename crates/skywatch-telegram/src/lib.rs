//! Telegram Bot API delivery for Skywatch.

pub mod client;

pub use client::TelegramClient;
