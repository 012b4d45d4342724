//! Role-based access control: the role/permission registry, the route
//! classifier, and the decision engine shared by the edge middleware and
//! the page shell.

pub mod classify;
pub mod decide;
pub mod registry;

pub use classify::{classify, RouteClass};
pub use decide::{decide, Decision};
pub use registry::{AccessPolicy, PrefixRule, Role, RoleClaim};
