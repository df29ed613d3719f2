//! # Events Module
//!
//! Event-driven progress reporting.
//!
//! ## Design
//! Traversal and worker threads emit events through a channel, allowing any
//! UI (CLI progress bar, logs, tests) to subscribe without the pipeline
//! knowing who listens.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Optimize(OptimizeEvent::Processed(p)) = event {
//!             println!("{} done", p.current_path.display());
//!         }
//!     }
//! });
//!
//! pipeline.run_with_events(&sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
