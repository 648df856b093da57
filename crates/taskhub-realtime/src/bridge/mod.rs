//! Bridges between domain events and the real-time push system.

pub mod notification;

pub use notification::NotificationListener;
