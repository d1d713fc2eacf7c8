pub mod clock;
pub mod error;
pub mod generator;
pub mod link_store;


pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{StoreError, StoreResult};
pub use generator::{
    is_reserved_shortcode, is_valid_custom_shortcode, RandomShortcodeGenerator, ShortcodeGenerator,
    RESERVED_SHORTCODES,
};
pub use link_store::{LinkStore, DEFAULT_MAX_GENERATION_ATTEMPTS};
