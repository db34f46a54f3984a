pub mod audit;
pub mod can_transition;
pub mod dispatch;
pub mod init;
pub mod notifications;
pub mod proxy;
pub mod reopen;
pub mod save;
pub mod seed;
pub mod shared;
pub mod submit;
pub mod transition;
pub mod validate;
