//! The iSenior assistant: answers staff questions from live facility data.
//!
//! One chat turn is a straight line, with no tool calls and no loop:
//!
//! 1. **Receive** the caller's message and username
//! 2. **Assemble context** (a bounded sample of every table, foreign keys
//!    resolved to names)
//! 3. **Send to the LLM** once, system instruction and context first
//! 4. **Return** the reply text
//!
//! The store is never touched after step 2 finishes.

pub mod context;
pub mod mediator;

pub use context::{AssembledContext, ContextAssembler, SectionStats, MAX_SAMPLE_ROWS};
pub use mediator::{ChatMediator, FALLBACK_REPLY, SYSTEM_INSTRUCTION};
