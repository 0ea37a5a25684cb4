//! # TUI Components
//!
//! This module contains all UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! Components in this directory follow two patterns:
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as parameters:
//! - `TitleBar`: Top status line with flags and the newest notification
//! - `Message`: A single chat message
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that keep local state in `TuiState` and emit events:
//! - `InputBox`: Single-line message input
//! - `MessageList`: Scrollable thread view
//! - `Sidebar`: Session list with new chat and delete
//!
//! Components receive external data as "props" rather than reading `App`
//! directly, so each one can be rendered against a `TestBackend` in isolation.
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── title_bar.rs     (Top status line)
//! ├── sidebar.rs       (Session list)
//! ├── message.rs       (Single message renderer)
//! ├── message_list.rs  (Scrollable message container)
//! └── input_box.rs     (Message input)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub mod message;
pub use input_box::{InputBox, InputEvent};
pub mod message_list;
pub use message_list::{MessageList, MessageListState, ThreadView};
pub mod sidebar;
pub use sidebar::{Sidebar, SidebarEvent, SidebarState};
