//! Default pipeline stages.
//!
//! 1. **CleanStage** - Empty the target directory except for preserved entries
//! 2. **CopyStage** - Copy build files with allowed extensions into the target
//! 3. **ReplaceStage** - Literal search/replace in files matching a name pattern
//! 4. **MarkupStage** - Apply the hosting edits to the index file
//! 5. **DuplicateStage** - Copy the index file to its hosted name

mod clean;
mod copy;
mod duplicate;
mod markup;
mod replace;

pub use clean::CleanStage;
pub use copy::CopyStage;
pub use duplicate::DuplicateStage;
pub use markup::MarkupStage;
pub use replace::ReplaceStage;
