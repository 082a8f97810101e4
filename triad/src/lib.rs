//! Concurrency core for a real-time, multi-player triple-matching game.
//!
//! Players race to spot three items on a shared board that form a match
//! under the game's [`Rules`](core::rules::Rules). Every player runs on its own
//! thread; computer players additionally run a driver thread producing
//! random selections. A single arbiter thread owns the deck, deals items,
//! judges candidates in arrival order and runs the round timer.
//!
//! - **[`core`]**: Pure, deterministic logic (board table, match rules, winners).
//!   No I/O or locking, fully testable in isolation.
//! - **[`io`]**: Configuration, display, human input and summaries.
//!
//! Threads coordinate through [`shared::Shared`]: one board lock, the
//! [`queue::CandidateQueue`], one [`seat::Seat`] per player and a
//! [`sync::Shutdown`] flag that wakes every sleeper. [`game::Game`] wires it
//! all together.

pub mod agent;
pub mod arbiter;
pub mod core;
pub mod driver;
pub mod exit_codes;
pub mod game;
pub mod io;
pub mod logging;
pub mod queue;
pub mod seat;
pub mod shared;
pub mod sync;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
