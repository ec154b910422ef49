pub mod expand;
pub mod export;
pub mod grid;
pub mod id;
pub mod lint;
pub mod marker;
pub mod model;
pub mod palette;
pub mod path;
pub mod render;
pub mod viewport;

pub use expand::{ExpandConfig, expand, preview};
pub use export::{EXPORT_FILE_NAME, SnapshotError, export_json, import_json};
pub use grid::{GRID_SIZE, GridConfig};
pub use id::BlockId;
pub use lint::{LintDiagnostic, LintSeverity, lint_blocks, lint_template};
pub use model::*;
pub use palette::{PaletteMode, advanced_palette, sample_palette};
pub use path::{SlotPath, get_slot, set_slot, try_set_slot};
pub use render::{Rendered, TypesetOptions, Typesetter, render_block};
pub use viewport::{Viewport, ZoomLimits};
