pub mod arrangement;
pub mod catalog;
pub mod keybindings;
pub mod library;
pub mod lyrics;
pub mod palette;
pub mod persist;
pub mod session;
pub mod sim;
pub mod state;
pub mod store;

pub use arrangement::Arrangement;
pub use keybindings::{KeyPress, Shortcut};
pub use library::LibraryFilter;
pub use palette::{Palette, PaletteCommand};
pub use persist::{partialize, restore};
pub use session::SessionTracks;
pub use state::{
    Action, AudioFile, EngineState, Modals, Panels, Slice, Slices, StudioState, Transport,
};
pub use store::{Store, Subscriber, SubscriptionId};

pub use onbeat_project::{FileStorage, MemoryStorage, PersistedState, ProjectError, Storage};
