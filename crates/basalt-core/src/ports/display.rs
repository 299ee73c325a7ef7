use std::path::Path;

use async_trait::async_trait;

use crate::display::DisplayTarget;
use crate::ports::errors::DisplayError;

/// OS display enumeration and desktop background primitive.
#[async_trait]
pub trait DisplayPort: Send + Sync {
    async fn enumerate(&self) -> Result<Vec<DisplayTarget>, DisplayError>;

    async fn set_wallpaper(&self, display: &DisplayTarget, path: &Path)
        -> Result<(), DisplayError>;
}
