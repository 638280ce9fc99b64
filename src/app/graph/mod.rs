mod interaction;
pub(in crate::app) mod style;
mod view;
