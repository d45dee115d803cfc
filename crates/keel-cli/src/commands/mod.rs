pub mod context;
pub mod decide;
pub mod dispatch;
pub mod rebuild;
pub mod schema;
pub mod search;
pub mod shared;
pub mod sql;
pub mod status;
pub mod supersede;
pub mod why;
