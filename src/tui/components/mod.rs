//! # TUI Components
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: model name, status and gate label
//! - `Message`: a single transcript entry
//!
//! ### Stateful Components (Event-Driven)
//!
//! - `InputBox`: trip description editor
//! - `MessageList`: scrollable transcript with layout caching
//! - `PackingListView`: scrollable checklist of the latest result
//!
//! Stateful components are split into a persistent `*State` (kept in
//! `TuiState`) and a per-frame view that borrows it together with its props.
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs
//! ├── message.rs
//! ├── message_list.rs
//! ├── packing_list.rs
//! └── input_box.rs
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub mod message;
pub use input_box::{InputBox, InputEvent};
pub mod message_list;
pub use message_list::{MessageList, MessageListState};
pub mod packing_list;
pub use packing_list::{PackingListState, PackingListView};
