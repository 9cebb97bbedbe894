mod attachment;
mod de;
mod doc;
mod space;
mod task;
mod task_query;

pub use attachment::*;
pub use doc::*;
pub use space::*;
pub use task::*;
pub use task_query::*;
