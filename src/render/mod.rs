pub(crate) mod composite;
pub(crate) mod panel;
pub(crate) mod strip;
