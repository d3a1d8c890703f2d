/// Hit-testing, gestures and preview nodes.
pub mod adapter;
