// ---------------------------------------------------------------------------
// App extension for registering Saveable resources
// ---------------------------------------------------------------------------

use bevy::prelude::*;
use simulation::{Saveable, SaveableRegistry};

/// One-line registration of a host resource in the progress file.
///
/// ```ignore
/// use save::SaveableAppExt;
///
/// fn build(&self, app: &mut App) {
///     app.init_resource::<MapStyle>()
///        .register_saveable::<MapStyle>();
/// }
/// ```
pub trait SaveableAppExt {
    fn register_saveable<T: Saveable>(&mut self) -> &mut Self;
}

impl SaveableAppExt for App {
    fn register_saveable<T: Saveable>(&mut self) -> &mut Self {
        self.init_resource::<SaveableRegistry>();
        self.world_mut()
            .resource_mut::<SaveableRegistry>()
            .register::<T>();
        self
    }
}
