pub mod check;
pub mod drag;
pub mod hierarchy;
pub mod import;
pub mod order;
pub mod task_ops;
